//! Store Module - run state
//!
//! Write-once storage for task results of a single pipeline run.
//!
//! Key types:
//! - `PipelineContext`: run inputs + task results in execution order
//! - `TaskResult`: raw text and parsed value of one task
//! - `RunInputs`: positional and named run-level inputs

mod context;

// Re-export all public types
pub use context::{canonical_json, PipelineContext, RunInputs, TaskResult};
