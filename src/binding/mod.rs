//! Binding Module - data flow between tasks
//!
//! Prompt templates pull run inputs and upstream outputs through typed
//! `{{ ... }}` references:
//! - `reference`: the reference grammar (`Reference`)
//! - `template`: build-time parsing and run-time substitution (`Template`)
//! - `validate`: task id rules shared by the graph and the grammar
//!
//! ```yaml
//! prompt: |
//!   Premise: {{ args[0] }}
//!   Title: {{ plot_architect.output.title }}
//!   First scene: {{ plot_architect.output.scenes.0.description }}
//!   Cast: {{ parent_output }}
//! ```

mod reference;
mod template;
mod validate;

pub use reference::Reference;
pub use template::Template;
pub use validate::{validate_task_id, RESERVED_IDS};
