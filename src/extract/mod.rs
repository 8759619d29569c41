//! Structured Response Extractor
//!
//! Turns raw model text into a canonical value for the task's output format:
//!
//! 1. empty, whitespace-only or fence-only → `EmptyOutput`
//! 2. cut out the first balanced `{ ... }` literal; fence markers and prose
//!    around it are skipped, text inside JSON strings is never touched
//! 3. parse with serde_json → `MalformedOutput` on failure
//! 4. conform to the schema → `SchemaValidation` on failure
//!
//! Free-text tasks skip 2-4 and keep the trimmed text.

mod fence;
mod literal;

pub use fence::strip_fences;
pub use literal::{first_object, ScanError};

use serde_json::Value;

use crate::error::{PlotlineError, Result};
use crate::schema::{Record, Schema};
use crate::task::OutputFormat;

/// Longest literal kept in a `MalformedOutput` error
const LITERAL_PREVIEW_CHARS: usize = 2_000;

fn preview(literal: &str) -> String {
    match literal.char_indices().nth(LITERAL_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}…", &literal[..cut]),
        None => literal.to_string(),
    }
}

/// Extract the value for a task's declared output format
pub fn extract(raw: &str, format: &OutputFormat) -> Result<Value> {
    match format {
        OutputFormat::Text => {
            let text = raw.trim();
            if text.is_empty() {
                return Err(PlotlineError::EmptyOutput);
            }
            Ok(Value::String(text.to_string()))
        }
        OutputFormat::Structured(schema) => extract_structured(raw, schema),
    }
}

/// Extract and validate a record against `schema`
pub fn extract_structured(raw: &str, schema: &Schema) -> Result<Value> {
    if raw.trim().is_empty() {
        return Err(PlotlineError::EmptyOutput);
    }

    // Fences only decide emptiness; the literal is cut from the raw text
    let cleaned = strip_fences(raw);
    if cleaned.is_empty() {
        return Err(PlotlineError::EmptyOutput);
    }

    let literal = first_object(raw.trim()).map_err(|e| match e {
        ScanError::NotFound => PlotlineError::MalformedOutput {
            details: "no JSON object found".to_string(),
            literal: preview(&cleaned),
        },
        ScanError::Unterminated(partial) => PlotlineError::MalformedOutput {
            details: "unbalanced braces: object never closes".to_string(),
            literal: preview(&partial),
        },
        ScanError::Mismatched {
            literal,
            expected,
            found,
        } => PlotlineError::MalformedOutput {
            details: format!("expected '{}' but found '{}'", expected, found),
            literal: preview(&literal),
        },
    })?;

    let value: Value =
        serde_json::from_str(literal).map_err(|e| PlotlineError::MalformedOutput {
            details: e.to_string(),
            literal: preview(literal),
        })?;

    schema.conform(&value)
}

/// Extract straight into a typed record
pub fn extract_record<T: Record>(raw: &str) -> Result<T> {
    let value = extract_structured(raw, T::SCHEMA)?;
    T::from_value(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Outline, OUTLINE, STORY_ANALYSIS};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const OUTLINE_JSON: &str = r#"{"title":"X","theme":"Y","protagonist_desire":"D","protagonist_need":"N","scenes":[]}"#;

    #[test]
    fn prose_and_fence_around_outline() {
        let raw = format!("Sure! ```json\n{}\n``` Hope that helps!", OUTLINE_JSON);
        let value = extract_structured(&raw, &OUTLINE).unwrap();
        assert_eq!(
            value,
            json!({
                "title": "X",
                "theme": "Y",
                "protagonist_desire": "D",
                "protagonist_need": "N",
                "scenes": []
            })
        );
    }

    #[test]
    fn fence_text_inside_values_is_kept() {
        let outline = Outline {
            title: "The ```json Heist".to_string(),
            theme: "```".to_string(),
            protagonist_desire: "D".to_string(),
            protagonist_need: "N".to_string(),
            scenes: vec![],
        };
        let body = serde_json::to_string(&outline).unwrap();

        let bare: Outline = extract_record(&body).unwrap();
        assert_eq!(bare, outline);

        let fenced: Outline = extract_record(&format!("```json\n{}\n```", body)).unwrap();
        assert_eq!(fenced, outline);
    }

    #[test]
    fn stray_brace_before_answer_is_skipped() {
        let raw = format!("Sure {{ here it is: {}", OUTLINE_JSON);
        let value = extract_structured(&raw, &OUTLINE).unwrap();
        assert_eq!(value["title"], "X");
    }

    #[test]
    fn incomplete_literal_is_malformed() {
        match extract_structured("{incomplete", &OUTLINE) {
            Err(PlotlineError::MalformedOutput { literal, .. }) => {
                assert_eq!(literal, "{incomplete");
            }
            other => panic!("expected MalformedOutput, got {:?}", other),
        }
    }

    #[test]
    fn balanced_but_invalid_json_is_malformed() {
        match extract_structured("{title: 'X'}", &OUTLINE) {
            Err(PlotlineError::MalformedOutput { literal, details }) => {
                assert_eq!(literal, "{title: 'X'}");
                assert!(!details.is_empty());
            }
            other => panic!("expected MalformedOutput, got {:?}", other),
        }
    }

    #[test]
    fn prose_without_object_is_malformed() {
        assert!(matches!(
            extract_structured("I cannot help with that.", &OUTLINE),
            Err(PlotlineError::MalformedOutput { .. })
        ));
    }

    #[test]
    fn missing_fields_fail_validation() {
        match extract_structured(r#"{"title":"X"}"#, &OUTLINE) {
            Err(PlotlineError::SchemaValidation { field, .. }) => assert_eq!(field, "theme"),
            other => panic!("expected SchemaValidation, got {:?}", other),
        }
    }

    #[test]
    fn empty_and_fence_only_responses() {
        for raw in ["", "   \n\t", "```json\n```", "``` ```"] {
            assert!(
                matches!(extract_structured(raw, &OUTLINE), Err(PlotlineError::EmptyOutput)),
                "{:?}",
                raw
            );
        }
    }

    #[test]
    fn echoed_schema_before_answer_uses_first() {
        let raw = r#"Format: {"issues_found": "bool"} Answer: {"issues_found": true, "notes": []}"#;
        assert!(matches!(
            extract_structured(raw, &STORY_ANALYSIS),
            Err(PlotlineError::SchemaValidation { .. })
        ));
    }

    #[test]
    fn text_format_keeps_trimmed_text() {
        let value = extract("  INT. LIGHTHOUSE - NIGHT  \n", &OutputFormat::Text).unwrap();
        assert_eq!(value, json!("INT. LIGHTHOUSE - NIGHT"));
        assert!(matches!(
            extract(" ", &OutputFormat::Text),
            Err(PlotlineError::EmptyOutput)
        ));
    }

    #[test]
    fn typed_extraction() {
        let outline: Outline = extract_record(OUTLINE_JSON).unwrap();
        assert_eq!(outline.title, "X");
        assert!(outline.scenes.is_empty());
    }

    #[test]
    fn long_literals_are_truncated_in_errors() {
        let raw = format!("{{\"title\": \"{}", "a".repeat(5_000));
        match extract_structured(&raw, &OUTLINE) {
            Err(PlotlineError::MalformedOutput { literal, .. }) => {
                assert!(literal.chars().count() <= LITERAL_PREVIEW_CHARS + 1);
                assert!(literal.ends_with('…'));
            }
            other => panic!("expected MalformedOutput, got {:?}", other),
        }
    }
}
