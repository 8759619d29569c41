//! Test Fixtures for Plotline
//!
//! Canned model responses for every screenplay stage, written the way real
//! models answer (prose, fences, extra fields), plus a ready-made mock.
//!
//! # Usage
//!
//! ```rust,ignore
//! use plotline::test_fixtures::*;
//!
//! let provider = screenplay_mock();
//! ```

use crate::provider::MockProvider;
use crate::screenplay::{CHARACTER_DESIGNER, PLOT_ARCHITECT, SCENE_SHAPER, THEMATIC_ANALYST};

// ═══════════════════════════════════════════════════════════════════════════
// INPUTS
// ═══════════════════════════════════════════════════════════════════════════

pub const TEST_PREMISE: &str =
    "A lighthouse keeper on a dying island receives radio calls from a ship that sank forty years ago.";

// ═══════════════════════════════════════════════════════════════════════════
// STAGE RESPONSES
// ═══════════════════════════════════════════════════════════════════════════

/// Outline wrapped in prose and a fenced block
pub const OUTLINE_RESPONSE: &str = r#"Here is the outline you asked for.

```json
{
  "title": "Static",
  "theme": "Grief keeps us tuned to the past",
  "protagonist_desire": "Rescue the crew she hears on the radio",
  "protagonist_need": "Let her drowned brother go",
  "scenes": [
    {"act": 1, "number": 1, "description": "Mara logs a distress call from the Halcyon.", "conflict": "The ship sank in 1984.", "value_change": "Routine to dread"},
    {"act": 2, "number": 2, "description": "Mara rows out to the wreck site at night.", "conflict": "The harbourmaster forbids it.", "value_change": "Safety to danger"},
    {"act": 3, "number": 3, "description": "Mara switches the radio off at dawn.", "conflict": "Her brother's voice begs her to stay.", "value_change": "Bondage to release"}
  ]
}
```

Let me know if you want a darker ending."#;

/// Characters with an extra field the schema drops
pub const CHARACTERS_RESPONSE: &str = r#"{"characters": [
  {"name": "Mara Quill", "role": "protagonist", "backstory": "Lost her brother on the Halcyon.", "desire": "Bring the crew home", "need": "Accept the loss", "arc": "From obsession to release", "age": 52},
  {"name": "Tomas Reyes", "role": "harbourmaster", "backstory": "Pulled bodies from the water in 1984.", "desire": "Keep the island quiet", "need": "Speak about that night", "arc": "From silence to testimony"},
  {"name": "The Voice", "role": "antagonist", "backstory": "A signal that sounds like Mara's brother.", "desire": "Keep Mara listening", "need": "None", "arc": "Fades as Mara heals"}
]}"#;

/// Analysis with a stringly boolean (coerced) and notes
pub const ANALYSIS_RESPONSE: &str = r#"Analysis follows: {"issues_found": "true", "notes": ["Act two needs a midpoint reversal.", "Tomas's arc resolves off screen."]}"#;

pub const SCENES_RESPONSE: &str = r#"```
{"scenes": [
  {"number": 1, "content": "INT. LIGHTHOUSE - NIGHT\nStatic. MARA leans into the radio.\nVOICE (V.O.)\nHalcyon calling. Anyone?"},
  {"number": 2, "content": "EXT. OPEN SEA - NIGHT\nA rowboat cuts through fog."},
  {"number": 3, "content": "INT. LIGHTHOUSE - DAWN\nMara's hand on the switch. Click. Silence."}
]}
```"#;

/// Mock provider answering every screenplay stage
pub fn screenplay_mock() -> MockProvider {
    MockProvider::new()
        .with_response(PLOT_ARCHITECT, OUTLINE_RESPONSE)
        .with_response(CHARACTER_DESIGNER, CHARACTERS_RESPONSE)
        .with_response(THEMATIC_ANALYST, ANALYSIS_RESPONSE)
        .with_response(SCENE_SHAPER, SCENES_RESPONSE)
}
