//! # Provider Abstraction Layer
//!
//! One stable async interface between the scheduler and text generation.
//!
//! - [`Provider`] - core trait: prompt in, raw text out
//! - [`OpenAIProvider`] - chat-completions over HTTP
//! - [`MockProvider`] - canned responses per task, records every request
//!
//! Providers never retry; a failed call aborts the run and is reported as
//! `GenerationTransport`.
//!
//! ```rust
//! use plotline::config::PlotlineConfig;
//! use plotline::provider::create_provider;
//!
//! let config = PlotlineConfig::default();
//! assert!(create_provider("mock", &config).is_ok());
//! assert!(create_provider("invalid", &config).is_err());
//! ```

mod mock;
mod openai;

pub use mock::MockProvider;
pub use openai::OpenAIProvider;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::PlotlineConfig;
use crate::error::{PlotlineError, Result};
use crate::task::TaskSpec;

// ============================================================================
// PROVIDER TRAIT (ASYNC)
// ============================================================================

/// Core trait that all generation backends implement
///
/// The runner awaits one call per task; implementations return the raw text
/// exactly as generated.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Returns the provider name (e.g., "openai", "mock")
    fn name(&self) -> &str;

    /// Generate text for one task
    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<String>;
}

// ============================================================================
// REQUEST TYPE
// ============================================================================

/// One generation call: resolved prompt plus sampling settings
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Task issuing the call
    pub task_id: String,
    /// Fully resolved prompt
    pub prompt: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenerationRequest {
    /// Request for `task` with its sampling settings
    pub fn for_task(task: &TaskSpec, prompt: impl Into<String>) -> Self {
        let sampling = task.sampling();
        Self {
            task_id: task.id().to_string(),
            prompt: prompt.into(),
            model: sampling.model.clone(),
            temperature: sampling.temperature,
            max_tokens: sampling.max_tokens,
        }
    }
}

// ============================================================================
// PROVIDER FACTORY
// ============================================================================

/// Create a provider instance by name
///
/// | Name | Requires |
/// |------|----------|
/// | `openai` | `OPENAI_API_KEY` or `api_keys.openai` |
/// | `mock` | Nothing |
pub fn create_provider(name: &str, config: &PlotlineConfig) -> Result<Arc<dyn Provider>> {
    match name.to_lowercase().as_str() {
        "openai" => Ok(Arc::new(OpenAIProvider::from_config(config)?)),
        "mock" => Ok(Arc::new(MockProvider::new())),
        _ => Err(PlotlineError::UnknownProvider {
            name: name.to_string(),
        }),
    }
}

// ============================================================================
// TESTS
// ============================================================================
