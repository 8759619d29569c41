//! DAG Module - task dependency graph
//!
//! - `flow`: FlowGraph built from task `depends_on` lists
//! - `validate`: template references checked against the graph
//!
//! FlowGraph is immutable after construction.

mod flow;
mod validate;

// Re-export public types
pub use flow::{DepVec, FlowGraph};
pub use validate::validate_references;
