//! Mock provider for testing
//!
//! Returns canned responses per task id without network access.
//! Deterministic: the same request always yields the same text.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;

use super::{GenerationRequest, Provider};

/// Mock provider that returns predefined responses
pub struct MockProvider {
    /// task_id -> response text
    responses: HashMap<String, String>,
    /// task_id -> simulated transport failure
    failures: HashMap<String, String>,
    /// Response for tasks without a canned entry
    default_response: String,
    /// Every request received (for assertions)
    requests: Mutex<Vec<GenerationRequest>>,
    calls: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            failures: HashMap::new(),
            default_response: "Mock response".to_string(),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Canned response for one task
    pub fn with_response(mut self, task_id: impl Into<String>, text: impl Into<String>) -> Self {
        self.responses.insert(task_id.into(), text.into());
        self
    }

    /// Fail generation for one task with `message`
    pub fn with_failure(mut self, task_id: impl Into<String>, message: impl Into<String>) -> Self {
        self.failures.insert(task_id.into(), message.into());
        self
    }

    /// Set the response for tasks without a canned entry
    pub fn with_default(mut self, response: impl Into<String>) -> Self {
        self.default_response = response.into();
        self
    }

    /// Number of `generate` calls so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// All requests made to this provider, in call order
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().clone()
    }

    /// Last request for `task_id`
    pub fn request_for(&self, task_id: &str) -> Option<GenerationRequest> {
        self.requests
            .lock()
            .iter()
            .rev()
            .find(|r| r.task_id == task_id)
            .cloned()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        if let Some(message) = self.failures.get(&request.task_id) {
            anyhow::bail!("{}", message);
        }

        Ok(self
            .responses
            .get(&request.task_id)
            .unwrap_or(&self.default_response)
            .clone())
    }
}
