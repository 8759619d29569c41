//! Task Node - one pipeline stage
//!
//! A [`TaskSpec`] is fixed at pipeline-build time: id, upstream
//! dependencies, prompt template, output format and sampling settings.
//! Fields are private and read through accessors once built.
//!
//! ```yaml
//! tasks:
//!   - id: outline
//!     prompt: "Outline a story about {{ args[0] }}"
//!     output: outline
//!   - id: blurb
//!     depends_on: [outline]
//!     prompt: "Write a blurb for {{ outline.output.title }}"
//!     output: text
//!     temperature: 0.9
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schema::{self, Schema};
use crate::util::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE};

/// What shape a task's output must take
#[derive(Clone, Copy)]
pub enum OutputFormat {
    /// Free text, kept as-is (trimmed)
    Text,
    /// A JSON record validated against a published schema
    Structured(&'static Schema),
}

impl OutputFormat {
    /// Parse `text` or a published schema name
    pub fn from_name(name: &str) -> Result<Self> {
        if name.eq_ignore_ascii_case("text") {
            return Ok(OutputFormat::Text);
        }
        schema::lookup(name).map(OutputFormat::Structured)
    }

    pub fn schema(&self) -> Option<&'static Schema> {
        match self {
            OutputFormat::Text => None,
            OutputFormat::Structured(schema) => Some(schema),
        }
    }
}

impl fmt::Debug for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "Text"),
            OutputFormat::Structured(schema) => write!(f, "Structured({})", schema.name),
        }
    }
}

impl PartialEq for OutputFormat {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (OutputFormat::Text, OutputFormat::Text) => true,
            (OutputFormat::Structured(a), OutputFormat::Structured(b)) => a.name == b.name,
            _ => false,
        }
    }
}

/// Model and sampling parameters for one generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl SamplingConfig {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// One stage of a pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSpec {
    id: String,
    depends_on: Vec<String>,
    prompt: String,
    output: OutputFormat,
    sampling: SamplingConfig,
}

impl TaskSpec {
    pub fn new(id: impl Into<String>, prompt: impl Into<String>, output: OutputFormat) -> Self {
        Self {
            id: id.into(),
            depends_on: Vec::new(),
            prompt: prompt.into(),
            output,
            sampling: SamplingConfig::default(),
        }
    }

    /// Set upstream task ids (order matters for `parent_output`)
    pub fn depends_on<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingConfig) -> Self {
        self.sampling = sampling;
        self
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn dependencies(&self) -> &[String] {
        &self.depends_on
    }

    #[inline]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[inline]
    pub fn output(&self) -> &OutputFormat {
        &self.output
    }

    #[inline]
    pub fn sampling(&self) -> &SamplingConfig {
        &self.sampling
    }
}

/// Task as written in a pipeline YAML file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TaskDef {
    pub id: String,
    #[serde(default)]
    pub depends_on: Vec<String>,
    pub prompt: String,
    /// `text` or a published schema name
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_output() -> String {
    "text".to_string()
}

impl TaskDef {
    /// Build the task, filling unset sampling fields from `defaults`
    pub fn into_spec(self, defaults: &SamplingConfig) -> Result<TaskSpec> {
        let output = OutputFormat::from_name(&self.output)?;
        let sampling = SamplingConfig {
            model: self.model.unwrap_or_else(|| defaults.model.clone()),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
        };
        Ok(TaskSpec::new(self.id, self.prompt, output)
            .depends_on(self.depends_on)
            .with_sampling(sampling))
    }
}
