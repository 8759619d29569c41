//! Plotline - premise to screenplay through a pipeline of LLM tasks
//!
//! ## Module Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        DOMAIN MODEL                          │
//! │  task/      TaskSpec, OutputFormat, SamplingConfig           │
//! │  schema/    Record schemas (Outline, CharacterList, ...)     │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      APPLICATION LAYER                       │
//! │  runtime/   Pipeline, PipelineFile, Runner                   │
//! │  dag/       Dependency graph (FlowGraph, validate)           │
//! │  binding/   Prompt templates ({{ task.output.field }})       │
//! │  extract/   Raw text → validated JSON value                  │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    INFRASTRUCTURE LAYER                      │
//! │  store/     Run inputs and task results (PipelineContext)    │
//! │  event/     Event sourcing for traces (EventLog, EventKind)  │
//! │  provider/  LLM abstraction (OpenAI, mock)                   │
//! │  util/      Constants                                        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Responsibilities
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`task`] | Task declarations and sampling settings |
//! | [`schema`] | Field specs, coercion, JSON Schema export |
//! | [`runtime`] | Build-time validation and sequential execution |
//! | [`dag`] | Dependency graph with FxHashMap optimization |
//! | [`binding`] | Reference grammar and single-pass resolution |
//! | [`extract`] | Fence stripping, object scanning, schema conformance |
//! | [`store`] | Per-run context of task results |
//! | [`event`] | Event sourcing for audit trail |
//! | [`provider`] | Provider trait, OpenAI chat completions, mock |
//! | [`screenplay`] | The four-stage screenplay pipeline |
//! | [`error`] | Error types with fix suggestions |

// ═══════════════════════════════════════════════════════════════
// DOMAIN MODEL - Tasks and records
// ═══════════════════════════════════════════════════════════════
pub mod schema;
pub mod task;

// ═══════════════════════════════════════════════════════════════
// APPLICATION LAYER - Validation and execution
// ═══════════════════════════════════════════════════════════════
pub mod binding;
pub mod dag;
pub mod extract;
pub mod runtime;
pub mod screenplay;

// ═══════════════════════════════════════════════════════════════
// INFRASTRUCTURE LAYER - Storage, events, providers
// ═══════════════════════════════════════════════════════════════
pub mod event;
pub mod provider;
pub mod store;
pub mod util;

// ═══════════════════════════════════════════════════════════════
// CROSS-CUTTING - Error handling, configuration
// ═══════════════════════════════════════════════════════════════
pub mod config;
pub mod error;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod test_fixtures;

// ═══════════════════════════════════════════════════════════════
// PUBLIC API RE-EXPORTS
// ═══════════════════════════════════════════════════════════════

// Error types
pub use error::{FixSuggestion, PlotlineError, Result};

// Config types
pub use config::{mask_api_key, PlotlineConfig};

// Domain types
pub use schema::{Record, Schema};
pub use task::{OutputFormat, SamplingConfig, TaskDef, TaskSpec};

// Runtime types
pub use runtime::{Pipeline, PipelineBuilder, PipelineFile, RunOutput, Runner};
pub use screenplay::{screenplay_pipeline, StoryBundle};

// Store and event types
pub use event::{Event, EventKind, EventLog};
pub use store::{PipelineContext, RunInputs, TaskResult};

// Provider types
pub use provider::{create_provider, GenerationRequest, MockProvider, OpenAIProvider, Provider};
