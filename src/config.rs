//! Plotline Configuration Module
//!
//! API keys and generation defaults, stored in
//! `~/.config/plotline/config.toml`.
//!
//! ## Priority Order (highest to lowest)
//!
//! 1. Environment variables (`OPENAI_API_KEY`, `OPENAI_MODEL`, `OPENAI_BASE_URL`)
//! 2. Config file
//! 3. Built-in defaults (`util::constants`)
//!
//! ```toml
//! [api_keys]
//! openai = "sk-..."
//!
//! [defaults]
//! provider = "openai"
//! model = "gpt-4o"
//! temperature = 0.3
//! scene_temperature = 0.7
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PlotlineError, Result};
use crate::task::SamplingConfig;
use crate::util::{
    DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_SCENE_TEMPERATURE, DEFAULT_TEMPERATURE,
    OPENAI_BASE_URL,
};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlotlineConfig {
    /// API keys for generation providers
    #[serde(default)]
    pub api_keys: ApiKeys,

    /// Provider, model and sampling defaults
    #[serde(default)]
    pub defaults: Defaults,
}

/// API keys configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ApiKeys {
    /// OpenAI API key (sk-proj-... or sk-...)
    pub openai: Option<String>,
}

/// Default settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Defaults {
    /// Default provider (openai, mock)
    pub provider: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    /// Temperature for scene writing
    pub scene_temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Chat-completions endpoint root
    pub base_url: Option<String>,
}

impl PlotlineConfig {
    /// Returns `~/.config/plotline/` on Unix, `%APPDATA%/plotline/` on Windows
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("plotline")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load from the default location (default config if the file is absent)
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load from `path`; a missing file yields the default config
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| PlotlineError::Config {
            reason: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        toml::from_str(&content).map_err(|e| PlotlineError::Config {
            reason: format!("Failed to parse config file {}: {}", path.display(), e),
        })
    }

    /// Merge with process environment variables
    pub fn with_env(self) -> Self {
        self.with_env_vars(|key| std::env::var(key).ok())
    }

    /// Merge with variables from `lookup`; empty values are ignored
    pub fn with_env_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = var("OPENAI_API_KEY") {
            self.api_keys.openai = Some(key);
        }
        if let Some(model) = var("OPENAI_MODEL") {
            self.defaults.model = Some(model);
        }
        if let Some(url) = var("OPENAI_BASE_URL") {
            self.defaults.base_url = Some(url);
        }

        self
    }

    pub fn openai_key(&self) -> Option<&str> {
        self.api_keys.openai.as_deref()
    }

    /// Provider name (falls back to `openai`)
    pub fn provider(&self) -> &str {
        self.defaults.provider.as_deref().unwrap_or("openai")
    }

    pub fn model(&self) -> &str {
        self.defaults.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn base_url(&self) -> &str {
        self.defaults.base_url.as_deref().unwrap_or(OPENAI_BASE_URL)
    }

    /// Sampling for analytical stages
    pub fn sampling(&self) -> SamplingConfig {
        SamplingConfig {
            model: self.model().to_string(),
            temperature: self.defaults.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: self.defaults.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        }
    }

    /// Sampling for scene writing
    pub fn scene_sampling(&self) -> SamplingConfig {
        self.sampling().with_temperature(
            self.defaults
                .scene_temperature
                .unwrap_or(DEFAULT_SCENE_TEMPERATURE),
        )
    }
}

/// Mask an API key for display, e.g. "sk-proj***"
pub fn mask_api_key(key: &str, visible_chars: usize) -> String {
    if key.is_empty() {
        return String::new();
    }

    let visible: String = key.chars().take(visible_chars).collect();
    format!("{}***", visible)
}
