//! Runtime Module - pipeline construction and execution
//!
//! - `pipeline`: validated, compiled task graph (`Pipeline`, `PipelineBuilder`)
//! - `file`: YAML pipeline definitions (`PipelineFile`)
//! - `runner`: sequential execution against a provider (`Runner`)
//!
//! A `Pipeline` is immutable once built; every structural and template
//! check happens in `build()`, so a run can only fail on generation,
//! extraction, missing inputs or cancellation.

mod file;
mod pipeline;
mod runner;

// Re-export public types
pub use file::{PipelineDefaults, PipelineFile};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use runner::{RunOutput, Runner};
