//! PipelineFile - custom pipelines written in YAML
//!
//! ```yaml
//! name: logline
//! terminal: blurb
//! defaults:
//!   temperature: 0.5
//! tasks:
//!   - id: outline
//!     prompt: "Outline a short film about {{ args[0] }}. Reply with JSON only."
//!     output: outline
//!   - id: blurb
//!     depends_on: [outline]
//!     prompt: "Write a one-line blurb for {{ outline.output.title }}"
//! ```
//!
//! Sampling precedence per task: task field, then file `defaults`, then the
//! caller's defaults (config).

use serde::{Deserialize, Serialize};

use super::pipeline::Pipeline;
use crate::error::Result;
use crate::task::{SamplingConfig, TaskDef};

/// Sampling overrides shared by every task in the file
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PipelineDefaults {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Top-level YAML document
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal: Option<String>,
    #[serde(default)]
    pub defaults: PipelineDefaults,
    pub tasks: Vec<TaskDef>,
}

impl PipelineFile {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Build and validate the pipeline
    pub fn into_pipeline(self, defaults: &SamplingConfig) -> Result<Pipeline> {
        let defaults = SamplingConfig {
            model: self.defaults.model.unwrap_or_else(|| defaults.model.clone()),
            temperature: self.defaults.temperature.unwrap_or(defaults.temperature),
            max_tokens: self.defaults.max_tokens.unwrap_or(defaults.max_tokens),
        };

        let tasks = self
            .tasks
            .into_iter()
            .map(|def| def.into_spec(&defaults))
            .collect::<Result<Vec<_>>>()?;

        let mut builder = Pipeline::builder().tasks(tasks);
        if let Some(terminal) = self.terminal {
            builder = builder.terminal(terminal);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlotlineError;
    use crate::schema::OUTLINE;
    use crate::task::OutputFormat;

    const YAML: &str = r#"
name: logline
terminal: blurb
defaults:
  temperature: 0.5
tasks:
  - id: outline
    prompt: "Outline a short film about {{ args[0] }}."
    output: outline
  - id: blurb
    depends_on: [outline]
    prompt: "Blurb for {{ outline.output.title }}"
    temperature: 0.9
  - id: notes
    depends_on: [outline]
    prompt: "Notes on {{ parent_output.theme }}"
"#;

    #[test]
    fn parses_and_builds() {
        let file = PipelineFile::from_yaml(YAML).unwrap();
        assert_eq!(file.name.as_deref(), Some("logline"));

        let pipeline = file.into_pipeline(&SamplingConfig::default()).unwrap();
        assert_eq!(pipeline.terminal().id(), "blurb");

        let outline = pipeline.task("outline").unwrap();
        assert_eq!(outline.output(), &OutputFormat::Structured(&OUTLINE));
        assert_eq!(outline.sampling().temperature, 0.5);
        assert_eq!(pipeline.task("blurb").unwrap().sampling().temperature, 0.9);
        assert_eq!(pipeline.task("notes").unwrap().sampling().model, "gpt-4");
    }

    #[test]
    fn invalid_yaml_is_yaml_error() {
        assert!(matches!(
            PipelineFile::from_yaml("tasks: [ {id: a"),
            Err(PlotlineError::Yaml(_))
        ));
    }

    #[test]
    fn unknown_output_schema() {
        let yaml = "tasks:\n  - id: a\n    prompt: x\n    output: haiku\n";
        let err = PipelineFile::from_yaml(yaml)
            .unwrap()
            .into_pipeline(&SamplingConfig::default())
            .unwrap_err();
        assert!(matches!(err, PlotlineError::UnknownSchema { .. }));
    }
}
