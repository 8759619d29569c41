//! OpenAI provider using the Chat Completions API
//!
//! One user message per call; the assistant message content is returned
//! verbatim. The base URL is configurable for compatible endpoints and tests.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{GenerationRequest, Provider};
use crate::config::PlotlineConfig;
use crate::error::PlotlineError;
use crate::util::{CONNECT_TIMEOUT, INFER_TIMEOUT};

/// OpenAI provider that uses the chat-completions endpoint
pub struct OpenAIProvider {
    client: reqwest::Client,
    api_key: String,
    /// Endpoint root, e.g. `https://api.openai.com/v1`
    base_url: String,
}

impl OpenAIProvider {
    /// Create with an explicit key and endpoint root
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(INFER_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create from config (env vars merged first via `with_env()`)
    pub fn from_config(config: &PlotlineConfig) -> crate::error::Result<Self> {
        let api_key = config
            .openai_key()
            .ok_or_else(|| PlotlineError::MissingApiKey {
                provider: "openai".to_string(),
            })?;

        Self::new(api_key, config.base_url()).map_err(|e| PlotlineError::Config {
            reason: format!("{:#}", e),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl Provider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let payload = ChatCompletionRequest {
            model: &request.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Some(request.prompt.clone()),
            }],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        tracing::debug!(
            provider = "openai",
            task = %request.task_id,
            model = %payload.model,
            "Sending request to OpenAI API"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("Failed to send request to OpenAI API")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                provider = "openai",
                status = %status,
                error = %error_text,
                "OpenAI API error"
            );
            anyhow::bail!("OpenAI API error ({}): {}", status, error_text);
        }

        let api_response: ChatCompletionResponse = response
            .json()
            .await
            .context("Failed to parse OpenAI API response")?;

        let content = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("OpenAI API response has no message content")?;

        if let Some(usage) = api_response.usage {
            tracing::debug!(
                provider = "openai",
                task = %request.task_id,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "OpenAI API response received"
            );
        }

        Ok(content)
    }
}

// ============================================================================
// API TYPES
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<UsageInfo>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct UsageInfo {
    prompt_tokens: u32,
    completion_tokens: u32,
}
