// The #[error] attribute from thiserror uses struct fields via string interpolation,
// but Rust's unused_assignments lint doesn't recognize this.
#![allow(unused_assignments)]

//! Plotline Error Types with Error Codes
//!
//! Error code ranges:
//! - PLOT-000-009: Run input errors
//! - PLOT-010-019: Run/task lifecycle errors
//! - PLOT-020-029: Pipeline graph errors (build time)
//! - PLOT-030-039: Provider/config errors
//! - PLOT-040-049: Template/reference errors
//! - PLOT-060-069: Output extraction errors

use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlotlineError>;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

/// All error variants are part of the public API.
///
/// Implements both `thiserror::Error` for std error compatibility
/// and `miette::Diagnostic` for terminal error display.
#[derive(Error, Debug, Diagnostic)]
pub enum PlotlineError {
    // ═══════════════════════════════════════════
    // RUN INPUT ERRORS (000-009)
    // ═══════════════════════════════════════════
    #[error("[PLOT-001] Premise must not be empty")]
    #[diagnostic(code(plotline::empty_premise), help("Pass a premise, e.g. plotline run \"A lighthouse keeper...\""))]
    EmptyPremise,

    // ═══════════════════════════════════════════
    // RUN/TASK ERRORS (010-019)
    // ═══════════════════════════════════════════
    #[error("[PLOT-011] Task '{task_id}' failed: {source}")]
    #[diagnostic(code(plotline::task_failed))]
    TaskFailed {
        task_id: String,
        /// Raw generated text, when the provider answered at all
        raw_text: Option<String>,
        #[source]
        source: Box<PlotlineError>,
    },

    #[error("[PLOT-012] Run cancelled before task '{next_task}'")]
    #[diagnostic(code(plotline::cancelled))]
    Cancelled { next_task: String },

    // ═══════════════════════════════════════════
    // GRAPH ERRORS (020-029)
    // ═══════════════════════════════════════════
    #[error("[PLOT-020] Cycle detected in pipeline: {cycle}")]
    #[diagnostic(code(plotline::graph_cycle))]
    GraphCycle { cycle: String },

    #[error("[PLOT-021] Missing dependency: task '{task_id}' depends on unknown '{dep_id}'")]
    #[diagnostic(code(plotline::missing_dependency))]
    MissingDependency { task_id: String, dep_id: String },

    #[error("[PLOT-022] Duplicate task id '{task_id}'")]
    #[diagnostic(code(plotline::duplicate_task))]
    DuplicateTask { task_id: String },

    #[error("[PLOT-023] Pipeline has no tasks")]
    #[diagnostic(code(plotline::empty_pipeline))]
    EmptyPipeline,

    #[error("[PLOT-024] Terminal task '{task_id}' is not declared")]
    #[diagnostic(code(plotline::unknown_terminal))]
    UnknownTerminal { task_id: String },

    #[error("[PLOT-025] Pipeline has several final tasks ({candidates}); declare a terminal task")]
    #[diagnostic(code(plotline::ambiguous_terminal))]
    AmbiguousTerminal { candidates: String },

    #[error("[PLOT-026] Task '{task_id}' references '{reference}' which is not upstream")]
    #[diagnostic(code(plotline::undeclared_reference))]
    UndeclaredReference { task_id: String, reference: String },

    #[error("[PLOT-027] Invalid task id '{id}': {reason}")]
    #[diagnostic(code(plotline::invalid_task_id))]
    InvalidTaskId { id: String, reason: String },

    // ═══════════════════════════════════════════
    // PROVIDER/CONFIG ERRORS (030-039)
    // ═══════════════════════════════════════════
    #[error("[PLOT-030] Provider '{provider}' failed: {message}")]
    #[diagnostic(code(plotline::generation_transport))]
    GenerationTransport { provider: String, message: String },

    #[error("[PLOT-031] Missing API key for provider '{provider}'")]
    #[diagnostic(code(plotline::missing_api_key))]
    MissingApiKey { provider: String },

    #[error("[PLOT-032] Unknown provider '{name}'. Available: openai, mock")]
    #[diagnostic(code(plotline::unknown_provider))]
    UnknownProvider { name: String },

    #[error("[PLOT-033] Configuration error: {reason}")]
    #[diagnostic(code(plotline::config))]
    Config { reason: String },

    // ═══════════════════════════════════════════
    // TEMPLATE/REFERENCE ERRORS (040-049)
    // ═══════════════════════════════════════════
    /// `task_id` is the task being read, not the one whose prompt failed
    #[error("[PLOT-040] Cannot resolve '{path}' from '{task_id}': {reason}")]
    #[diagnostic(code(plotline::reference))]
    Reference {
        task_id: String,
        path: String,
        reason: String,
    },

    #[error("[PLOT-041] Template error in task '{task_id}' at position {position}: {details}")]
    #[diagnostic(code(plotline::template_parse))]
    TemplateParse {
        task_id: String,
        position: usize,
        details: String,
    },

    #[error("[PLOT-042] Unknown schema '{name}'")]
    #[diagnostic(code(plotline::unknown_schema))]
    UnknownSchema { name: String },

    // ═══════════════════════════════════════════
    // OUTPUT ERRORS (060-069)
    // ═══════════════════════════════════════════
    #[error("[PLOT-060] Generated output is empty")]
    #[diagnostic(code(plotline::empty_output))]
    EmptyOutput,

    #[error("[PLOT-061] Malformed output: {details} (attempted: {literal})")]
    #[diagnostic(code(plotline::malformed_output))]
    MalformedOutput { details: String, literal: String },

    #[error("[PLOT-062] Schema validation failed at '{field}': expected {expected}, got {actual}")]
    #[diagnostic(code(plotline::schema_validation))]
    SchemaValidation {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("[PLOT-063] Result for task '{task_id}' was already written")]
    #[diagnostic(code(plotline::context_conflict))]
    ContextConflict { task_id: String },

    // ═══════════════════════════════════════════
    // WRAPPED
    // ═══════════════════════════════════════════
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl PlotlineError {
    /// The classified error beneath any `TaskFailed` wrapper
    pub fn root_cause(&self) -> &PlotlineError {
        match self {
            PlotlineError::TaskFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Id of the task that aborted the run, if any
    pub fn failed_task(&self) -> Option<&str> {
        match self {
            PlotlineError::TaskFailed { task_id, .. } => Some(task_id),
            _ => None,
        }
    }

    /// Raw generated text of the failing task, if the provider returned any
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            PlotlineError::TaskFailed { raw_text, .. } => raw_text.as_deref(),
            _ => None,
        }
    }

    /// Wrap a classified error with the task that produced it
    pub(crate) fn in_task(self, task_id: &str, raw_text: Option<String>) -> Self {
        PlotlineError::TaskFailed {
            task_id: task_id.to_string(),
            raw_text,
            source: Box::new(self),
        }
    }
}

impl FixSuggestion for PlotlineError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            PlotlineError::EmptyPremise => Some("Provide a non-empty premise string"),
            PlotlineError::TaskFailed { source, .. } => source.fix_suggestion(),
            PlotlineError::Cancelled { .. } => None,
            PlotlineError::GraphCycle { .. } => {
                Some("Remove circular depends_on entries from the pipeline")
            }
            PlotlineError::MissingDependency { .. } => {
                Some("Add the missing task or fix the depends_on entry")
            }
            PlotlineError::DuplicateTask { .. } => Some("Give every task a unique id"),
            PlotlineError::EmptyPipeline => Some("Declare at least one task"),
            PlotlineError::UnknownTerminal { .. } => {
                Some("Set terminal: to the id of a declared task")
            }
            PlotlineError::AmbiguousTerminal { .. } => {
                Some("Set terminal: to pick which final task is the pipeline output")
            }
            PlotlineError::UndeclaredReference { .. } => {
                Some("Add the referenced task to depends_on (directly or transitively)")
            }
            PlotlineError::InvalidTaskId { .. } => {
                Some("Use snake_case ids: lowercase letters, digits and underscores")
            }
            PlotlineError::GenerationTransport { .. } => {
                Some("Check network access, API key and model name")
            }
            PlotlineError::MissingApiKey { .. } => Some("Set OPENAI_API_KEY or add it to config.toml"),
            PlotlineError::UnknownProvider { .. } => Some("Use --provider openai or --provider mock"),
            PlotlineError::Config { .. } => Some("Check ~/.config/plotline/config.toml syntax"),
            PlotlineError::Reference { .. } => {
                Some("Check the field path exists in the upstream task's schema")
            }
            PlotlineError::TemplateParse { .. } => {
                Some("Use {{ args[0] }}, {{ input.name }}, {{ task.output }} or {{ task.output.field }}")
            }
            PlotlineError::UnknownSchema { .. } => Some(
                "Use one of: text, outline, scene, character, character_list, story_analysis, screenplay, screenplay_scene",
            ),
            PlotlineError::EmptyOutput => Some("The model returned nothing; retry or raise max_tokens"),
            PlotlineError::MalformedOutput { .. } => {
                Some("Ask the model to respond with a single JSON object only")
            }
            PlotlineError::SchemaValidation { .. } => {
                Some("Make the prompt list every required field with its type")
            }
            PlotlineError::ContextConflict { .. } => None,
            PlotlineError::Io(_) => Some("Check file path and permissions"),
            PlotlineError::Json(_) => None,
            PlotlineError::Yaml(_) => Some("Check YAML syntax: indentation and quoting"),
        }
    }
}
