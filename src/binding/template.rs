//! Prompt templates: parse once at build time, resolve per run
//!
//! A template is tokenized into literal ranges and typed references.
//! Resolution is a single pass over the tokens; substituted text is never
//! scanned again, so an upstream output containing `{{` stays literal.

use std::ops::Range;

use serde_json::Value;

use super::reference::Reference;
use crate::error::{PlotlineError, Result};
use crate::schema::json_type;
use crate::store::{canonical_json, PipelineContext};

/// Token representing a parsed template fragment
#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// Literal text (range in the source string)
    Literal(Range<usize>),
    Ref(Reference),
}

/// Parsed prompt template owned by one task
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    task_id: String,
    source: String,
    tokens: Vec<Token>,
}

impl Template {
    /// Tokenize `source`; errors name `task_id` and the byte position
    pub fn parse(task_id: &str, source: &str) -> Result<Self> {
        let mut tokens = Vec::new();
        let mut cursor = 0;

        while let Some(found) = source[cursor..].find("{{") {
            let open = cursor + found;
            if open > cursor {
                tokens.push(Token::Literal(cursor..open));
            }

            let inner_start = open + 2;
            let close = source[inner_start..]
                .find("}}")
                .map(|i| inner_start + i)
                .ok_or_else(|| parse_error(task_id, open, "unclosed '{{'"))?;

            let content = source[inner_start..close].trim();
            if content.is_empty() {
                return Err(parse_error(task_id, open, "empty '{{ }}' marker"));
            }
            if content.contains("{{") {
                return Err(parse_error(task_id, open, "nested '{{' inside marker"));
            }

            let reference =
                Reference::parse(content).map_err(|details| parse_error(task_id, open, &details))?;
            tokens.push(Token::Ref(reference));
            cursor = close + 2;
        }

        if cursor < source.len() {
            tokens.push(Token::Literal(cursor..source.len()));
        }

        Ok(Self {
            task_id: task_id.to_string(),
            source: source.to_string(),
            tokens,
        })
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// All references in template order
    pub fn references(&self) -> impl Iterator<Item = &Reference> {
        self.tokens.iter().filter_map(|token| match token {
            Token::Ref(reference) => Some(reference),
            Token::Literal(_) => None,
        })
    }

    /// Substitute every reference from `ctx`
    ///
    /// `parent` is the owning task's first dependency (target of `parent_output`).
    pub fn resolve(&self, ctx: &PipelineContext, parent: Option<&str>) -> Result<String> {
        let mut out = String::with_capacity(self.source.len() * 2);

        for token in &self.tokens {
            match token {
                Token::Literal(range) => out.push_str(&self.source[range.clone()]),
                Token::Ref(reference) => self.resolve_ref(reference, ctx, parent, &mut out)?,
            }
        }

        Ok(out)
    }

    fn resolve_ref(
        &self,
        reference: &Reference,
        ctx: &PipelineContext,
        parent: Option<&str>,
        out: &mut String,
    ) -> Result<()> {
        match reference {
            Reference::Arg(index) => {
                let arg = ctx
                    .inputs()
                    .arg(*index)
                    .ok_or_else(|| missing(reference, "no positional input at that index"))?;
                out.push_str(arg);
            }
            Reference::Input(name) => {
                let value = ctx
                    .inputs()
                    .input(name)
                    .ok_or_else(|| missing(reference, "no named input with that name"))?;
                out.push_str(value);
            }
            Reference::TaskOutput { task_id, path } => {
                resolve_output(ctx, task_id, path, reference, out)?;
            }
            Reference::ParentOutput { path } => {
                let parent = parent
                    .ok_or_else(|| missing(reference, "task has no dependencies"))?;
                resolve_output(ctx, parent, path, reference, out)?;
            }
        }
        Ok(())
    }

}

/// Error for a reference whose source has nothing to give
///
/// `task_id` names what was read: the referenced task, or `args`, `input`
/// or `parent_output` when there is no task to name. The owning task is
/// added by the runner through `TaskFailed`.
fn missing(reference: &Reference, reason: &str) -> PlotlineError {
    let source = match reference {
        Reference::Arg(_) => "args",
        Reference::Input(_) => "input",
        Reference::TaskOutput { task_id, .. } => task_id.as_str(),
        Reference::ParentOutput { .. } => "parent_output",
    };
    PlotlineError::Reference {
        task_id: source.to_string(),
        path: reference.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_error(task_id: &str, position: usize, details: &str) -> PlotlineError {
    PlotlineError::TemplateParse {
        task_id: task_id.to_string(),
        position,
        details: details.to_string(),
    }
}

fn resolve_output(
    ctx: &PipelineContext,
    task_id: &str,
    path: &[String],
    reference: &Reference,
    out: &mut String,
) -> Result<()> {
    let reference_error = |reason: String| PlotlineError::Reference {
        task_id: task_id.to_string(),
        path: reference.to_string(),
        reason,
    };

    let result = ctx
        .get(task_id)
        .ok_or_else(|| reference_error("task has not produced a result".to_string()))?;

    // Free text has no fields: any path yields the raw text
    if path.is_empty() || !result.is_structured() {
        out.push_str(&result.output_str());
        return Ok(());
    }

    let mut current = &result.value;
    for (depth, seg) in path.iter().enumerate() {
        let here = || {
            if depth == 0 {
                "output".to_string()
            } else {
                path[..depth].join(".")
            }
        };
        current = match current {
            Value::Object(map) => map
                .get(seg)
                .ok_or_else(|| reference_error(format!("field '{}' not found", seg)))?,
            Value::Array(items) => {
                let index = seg.parse::<usize>().map_err(|_| {
                    reference_error(format!("'{}' is a list; '{}' is not an index", here(), seg))
                })?;
                items.get(index).ok_or_else(|| {
                    reference_error(format!(
                        "index {} out of range (list has {} items)",
                        index,
                        items.len()
                    ))
                })?
            }
            scalar => {
                return Err(reference_error(format!(
                    "cannot read '{}' from {} at '{}'",
                    seg,
                    json_type(scalar),
                    here()
                )))
            }
        };
    }

    match current {
        Value::String(s) => out.push_str(s),
        other => out.push_str(&canonical_json(other)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{RunInputs, TaskResult};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn ctx() -> PipelineContext {
        let mut ctx = PipelineContext::new(RunInputs::premise("a robot learns to paint").unwrap());
        ctx.insert(TaskResult::new(
            "outline",
            "raw outline",
            json!({
                "title": "Brushstrokes",
                "theme": "art is practice",
                "scenes": [
                    {"act": 1, "number": 1, "description": "the studio"},
                    {"act": 2, "number": 2, "description": "the gallery"}
                ]
            }),
        ))
        .unwrap();
        ctx.insert(TaskResult::new(
            "logline",
            "  A robot paints.\n",
            json!("A robot paints."),
        ))
        .unwrap();
        ctx
    }

    // ═══════════════════════════════════════════════════════════════
    // Parsing
    // ═══════════════════════════════════════════════════════════════

    #[test]
    fn literal_only() {
        let t = Template::parse("t", "no markers { here }").unwrap();
        assert_eq!(t.references().count(), 0);
        assert_eq!(t.resolve(&ctx(), None).unwrap(), "no markers { here }");
    }

    #[test]
    fn collects_references_in_order() {
        let t = Template::parse("t", "{{args[0]}} then {{ outline.output.title }}").unwrap();
        let refs: Vec<String> = t.references().map(|r| r.to_string()).collect();
        assert_eq!(refs, vec!["args[0]", "outline.output.title"]);
    }

    #[test]
    fn unclosed_marker_reports_position() {
        match Template::parse("writer", "abc {{ args[0] ") {
            Err(PlotlineError::TemplateParse {
                task_id, position, ..
            }) => {
                assert_eq!(task_id, "writer");
                assert_eq!(position, 4);
            }
            other => panic!("expected TemplateParse, got {:?}", other),
        }
    }

    #[test]
    fn empty_and_unknown_markers_fail() {
        for source in ["{{ }}", "{{}}", "{{ env.HOME }}", "{{ outline }}", "{{ {{ a.output }}"] {
            assert!(
                matches!(
                    Template::parse("t", source),
                    Err(PlotlineError::TemplateParse { .. })
                ),
                "{}",
                source
            );
        }
    }

    // ═══════════════════════════════════════════════════════════════
    // Resolution
    // ═══════════════════════════════════════════════════════════════

    #[test]
    fn resolves_inputs() {
        let t = Template::parse("t", "Premise: {{ args[0] }} / {{input.premise}}").unwrap();
        assert_eq!(
            t.resolve(&ctx(), None).unwrap(),
            "Premise: a robot learns to paint / a robot learns to paint"
        );
    }

    #[test]
    fn resolves_field_paths() {
        let t = Template::parse(
            "t",
            "{{ outline.output.title }} opens in act {{ outline.output.scenes.0.act }}",
        )
        .unwrap();
        assert_eq!(t.resolve(&ctx(), None).unwrap(), "Brushstrokes opens in act 1");
    }

    #[test]
    fn whole_structured_output_is_canonical_json() {
        let t = Template::parse("t", "{{ tasks.outline.output }}").unwrap();
        let expected = canonical_json(ctx().value("outline").unwrap());
        assert_eq!(t.resolve(&ctx(), None).unwrap(), expected);
    }

    #[test]
    fn nested_record_is_canonical_json() {
        let t = Template::parse("t", "{{ outline.output.scenes.1 }}").unwrap();
        assert_eq!(
            t.resolve(&ctx(), None).unwrap(),
            "{\n  \"act\": 2,\n  \"description\": \"the gallery\",\n  \"number\": 2\n}"
        );
    }

    #[test]
    fn free_text_output_and_path_fallback() {
        let t = Template::parse("t", "[{{ logline.output }}|{{ logline.output.title }}]").unwrap();
        assert_eq!(
            t.resolve(&ctx(), None).unwrap(),
            "[  A robot paints.\n|  A robot paints.\n]"
        );
    }

    #[test]
    fn parent_output_uses_first_dependency() {
        let t = Template::parse("t", "{{ parent_output.title }}").unwrap();
        assert_eq!(t.resolve(&ctx(), Some("outline")).unwrap(), "Brushstrokes");
        assert!(t.resolve(&ctx(), None).is_err());
    }

    #[test]
    fn missing_field_names_task_and_path() {
        let t = Template::parse("t", "{{ outline.output.logline }}").unwrap();
        match t.resolve(&ctx(), None) {
            Err(PlotlineError::Reference { task_id, path, .. }) => {
                assert_eq!(task_id, "outline");
                assert_eq!(path, "outline.output.logline");
            }
            other => panic!("expected Reference error, got {:?}", other),
        }
    }

    #[test]
    fn missing_sources_are_named_not_the_owner() {
        let cases = [
            ("{{ args[5] }}", None, "args", "args[5]"),
            ("{{ input.tone }}", None, "input", "input.tone"),
            ("{{ parent_output.title }}", None, "parent_output", "parent_output.title"),
            ("{{ cast.output }}", None, "cast", "cast.output"),
            ("{{ parent_output.logline }}", Some("outline"), "outline", "parent_output.logline"),
        ];
        for (source, parent, expected_task, expected_path) in cases {
            let t = Template::parse("writer", source).unwrap();
            match t.resolve(&ctx(), parent) {
                Err(PlotlineError::Reference { task_id, path, .. }) => {
                    assert_eq!(task_id, expected_task, "{}", source);
                    assert_eq!(path, expected_path, "{}", source);
                }
                other => panic!("expected Reference error for {}, got {:?}", source, other),
            }
        }
    }

    #[test]
    fn traversal_errors() {
        for source in [
            "{{ outline.output.title.first }}",
            "{{ outline.output.scenes.9 }}",
            "{{ outline.output.scenes.first }}",
            "{{ missing.output }}",
            "{{ args[5] }}",
            "{{ input.tone }}",
        ] {
            let t = Template::parse("t", source).unwrap();
            assert!(
                matches!(t.resolve(&ctx(), None), Err(PlotlineError::Reference { .. })),
                "{}",
                source
            );
        }
    }

    #[test]
    fn substituted_text_is_not_rescanned() {
        let mut ctx = PipelineContext::new(RunInputs::premise("{{ outline.output }}").unwrap());
        ctx.insert(TaskResult::new("a", "{{ args[0] }}", json!("{{ args[0] }}")))
            .unwrap();
        let t = Template::parse("t", "{{ args[0] }} {{ a.output }}").unwrap();
        assert_eq!(
            t.resolve(&ctx, None).unwrap(),
            "{{ outline.output }} {{ args[0] }}"
        );
    }
}
