//! Screenplay pipeline - premise to scenes in four stages
//!
//! ```text
//! plot_architect ─→ character_designer ─→ thematic_analyst ─→ scene_shaper
//!   Outline            CharacterList         StoryAnalysis        Screenplay
//! ```
//!
//! Each stage asks for a single JSON object. Scene writing samples at a
//! higher temperature than the analytical stages.

use serde::{Deserialize, Serialize};

use crate::config::PlotlineConfig;
use crate::error::Result;
use crate::runtime::Pipeline;
use crate::schema::{CharacterList, Outline, Screenplay, StoryAnalysis};
use crate::schema::{CHARACTER_LIST, OUTLINE, SCREENPLAY, STORY_ANALYSIS};
use crate::store::PipelineContext;
use crate::task::{OutputFormat, TaskSpec};

pub const PLOT_ARCHITECT: &str = "plot_architect";
pub const CHARACTER_DESIGNER: &str = "character_designer";
pub const THEMATIC_ANALYST: &str = "thematic_analyst";
pub const SCENE_SHAPER: &str = "scene_shaper";

const PLOT_ARCHITECT_PROMPT: &str = r#"Act as a story architect. Build a feature screenplay outline on a three-act spine.

Premise: {{ args[0] }}

Act one sets up the inciting incident and what the protagonist wants and needs.
Act two raises the stakes through a midpoint into a crisis that forces the need.
Act three delivers the climax and the protagonist's change.

Every scene has an act, a number, a description, its conflict and the value that shifts.

Reply with one JSON object and nothing else:
{
  "title": "...",
  "theme": "...",
  "protagonist_desire": "...",
  "protagonist_need": "...",
  "scenes": [
    {"act": 1, "number": 1, "description": "...", "conflict": "...", "value_change": "..."}
  ]
}"#;

const CHARACTER_DESIGNER_PROMPT: &str = r#"Act as a character designer for this outline:

{{ parent_output }}

Create three to five characters who embody or push against the theme "{{ parent_output.theme }}".
Give each a name, role, backstory, desire, need and arc.

Reply with one JSON object and nothing else:
{"characters": [{"name": "...", "role": "...", "backstory": "...", "desire": "...", "need": "...", "arc": "..."}]}"#;

const THEMATIC_ANALYST_PROMPT: &str = r#"Act as a thematic analyst reviewing a screenplay in development.

Outline:
{{ plot_architect.output }}

Characters:
{{ character_designer.output }}

Check every scene for a clear conflict, a real value change and relevance to the theme.
Check that each character arc lands.

Reply with one JSON object and nothing else:
{"issues_found": true, "notes": ["..."]}"#;

const SCENE_SHAPER_PROMPT: &str = r#"Act as a screenwriter drafting scenes.

Premise: {{ args[0] }}

Outline:
{{ plot_architect.output }}

Characters:
{{ character_designer.output }}

Analyst notes:
{{ thematic_analyst.output.notes }}

Write each outlined scene in screenplay form: INT./EXT. headings, action lines and dialogue.
Dramatise the conflict and the value change; carry the theme in subtext.

Reply with one JSON object and nothing else:
{"scenes": [{"number": 1, "content": "INT. ..."}]}"#;

/// The four-stage pipeline, sampling settings taken from `config`
pub fn screenplay_pipeline(config: &PlotlineConfig) -> Result<Pipeline> {
    let sampling = config.sampling();

    Pipeline::builder()
        .task(
            TaskSpec::new(
                PLOT_ARCHITECT,
                PLOT_ARCHITECT_PROMPT,
                OutputFormat::Structured(&OUTLINE),
            )
            .with_sampling(sampling.clone()),
        )
        .task(
            TaskSpec::new(
                CHARACTER_DESIGNER,
                CHARACTER_DESIGNER_PROMPT,
                OutputFormat::Structured(&CHARACTER_LIST),
            )
            .depends_on([PLOT_ARCHITECT])
            .with_sampling(sampling.clone()),
        )
        .task(
            TaskSpec::new(
                THEMATIC_ANALYST,
                THEMATIC_ANALYST_PROMPT,
                OutputFormat::Structured(&STORY_ANALYSIS),
            )
            .depends_on([CHARACTER_DESIGNER])
            .with_sampling(sampling),
        )
        .task(
            TaskSpec::new(
                SCENE_SHAPER,
                SCENE_SHAPER_PROMPT,
                OutputFormat::Structured(&SCREENPLAY),
            )
            .depends_on([THEMATIC_ANALYST])
            .with_sampling(config.scene_sampling()),
        )
        .terminal(SCENE_SHAPER)
        .build()
}

/// Final story document: every stage's record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryBundle {
    pub outline: Outline,
    pub characters: CharacterList,
    pub analysis_notes: StoryAnalysis,
    pub scenes: Screenplay,
}

impl StoryBundle {
    /// Assemble from a completed screenplay run
    pub fn from_context(ctx: &PipelineContext) -> Result<Self> {
        Ok(Self {
            outline: ctx.record(PLOT_ARCHITECT)?,
            characters: ctx.record(CHARACTER_DESIGNER)?,
            analysis_notes: ctx.record(THEMATIC_ANALYST)?,
            scenes: ctx.record(SCENE_SHAPER)?,
        })
    }
}
