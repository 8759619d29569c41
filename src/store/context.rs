//! PipelineContext - task output storage for one run
//!
//! Grows monotonically: each task id is written exactly once, results are
//! kept in execution order, and nothing is mutated after insertion.

use std::borrow::Cow;
use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::Value;

use crate::error::{PlotlineError, Result};
use crate::schema::Record;

/// Run-level inputs visible to every template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunInputs {
    /// Positional arguments (`{{ args[0] }}`)
    pub args: Vec<String>,
    /// Named inputs (`{{ input.name }}`)
    pub named: BTreeMap<String, String>,
}

impl RunInputs {
    /// Inputs for a premise-driven run
    ///
    /// The premise becomes both `args[0]` and `input.premise`.
    pub fn premise(premise: impl Into<String>) -> Result<Self> {
        let premise = premise.into();
        if premise.trim().is_empty() {
            return Err(PlotlineError::EmptyPremise);
        }
        let mut named = BTreeMap::new();
        named.insert("premise".to_string(), premise.clone());
        Ok(Self {
            args: vec![premise],
            named,
        })
    }

    pub fn with_input(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    pub fn input(&self, name: &str) -> Option<&str> {
        self.named.get(name).map(String::as_str)
    }
}

/// Result of one executed task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskResult {
    pub task_id: String,
    /// Text exactly as the provider returned it
    pub raw_text: String,
    /// Canonical value: a conformed record, or the trimmed text for free-text tasks
    pub value: Value,
}

impl TaskResult {
    pub fn new(task_id: impl Into<String>, raw_text: impl Into<String>, value: Value) -> Self {
        Self {
            task_id: task_id.into(),
            raw_text: raw_text.into(),
            value,
        }
    }

    /// True when the value is a record or list (field paths apply)
    pub fn is_structured(&self) -> bool {
        matches!(self.value, Value::Object(_) | Value::Array(_))
    }

    /// Whole output as prompt text: records canonical JSON, free text raw
    pub fn output_str(&self) -> Cow<'_, str> {
        if self.is_structured() {
            Cow::Owned(canonical_json(&self.value))
        } else {
            Cow::Borrowed(&self.raw_text)
        }
    }
}

/// Canonical text encoding of a value (2-space pretty JSON)
pub fn canonical_json(value: &Value) -> String {
    // Serializing a Value cannot fail: keys are always strings
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Accumulated state of a single pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineContext {
    inputs: RunInputs,
    #[serde(rename = "tasks")]
    results: Vec<TaskResult>,
    #[serde(skip)]
    index: FxHashMap<String, usize>,
}

impl PipelineContext {
    pub fn new(inputs: RunInputs) -> Self {
        Self {
            inputs,
            results: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    pub fn inputs(&self) -> &RunInputs {
        &self.inputs
    }

    /// Write a task result; a second write for the same id is rejected
    pub fn insert(&mut self, result: TaskResult) -> Result<()> {
        if self.index.contains_key(&result.task_id) {
            return Err(PlotlineError::ContextConflict {
                task_id: result.task_id,
            });
        }
        self.index.insert(result.task_id.clone(), self.results.len());
        self.results.push(result);
        Ok(())
    }

    pub fn get(&self, task_id: &str) -> Option<&TaskResult> {
        self.index.get(task_id).map(|&idx| &self.results[idx])
    }

    #[inline]
    pub fn contains(&self, task_id: &str) -> bool {
        self.index.contains_key(task_id)
    }

    /// Parsed value of a task
    pub fn value(&self, task_id: &str) -> Option<&Value> {
        self.get(task_id).map(|r| &r.value)
    }

    /// Typed view of a structured task output
    pub fn record<T: Record>(&self, task_id: &str) -> Result<T> {
        let result = self.get(task_id).ok_or_else(|| PlotlineError::Reference {
            task_id: task_id.to_string(),
            path: format!("{}.output", task_id),
            reason: "task has no result in this run".to_string(),
        })?;
        T::from_value(&result.value)
    }

    /// Results in execution order
    pub fn results(&self) -> &[TaskResult] {
        &self.results
    }

    pub fn task_ids(&self) -> impl Iterator<Item = &str> {
        self.results.iter().map(|r| r.task_id.as_str())
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::StoryAnalysis;
    use serde_json::json;

    #[test]
    fn premise_must_not_be_blank() {
        assert!(matches!(
            RunInputs::premise("  \n"),
            Err(PlotlineError::EmptyPremise)
        ));

        let inputs = RunInputs::premise("A lighthouse keeper finds a radio").unwrap();
        assert_eq!(inputs.arg(0), Some("A lighthouse keeper finds a radio"));
        assert_eq!(inputs.input("premise"), inputs.arg(0));
        assert_eq!(inputs.arg(1), None);
    }

    #[test]
    fn insert_and_get_result() {
        let mut ctx = PipelineContext::default();
        ctx.insert(TaskResult::new("a", "{\"k\":1}", json!({"k": 1})))
            .unwrap();

        assert!(ctx.contains("a"));
        assert_eq!(ctx.value("a"), Some(&json!({"k": 1})));
        assert_eq!(ctx.get("a").unwrap().raw_text, "{\"k\":1}");
        assert!(ctx.get("b").is_none());
    }

    #[test]
    fn results_are_write_once() {
        let mut ctx = PipelineContext::default();
        ctx.insert(TaskResult::new("a", "first", json!("first")))
            .unwrap();

        let err = ctx
            .insert(TaskResult::new("a", "second", json!("second")))
            .unwrap_err();
        assert!(matches!(err, PlotlineError::ContextConflict { .. }));
        assert_eq!(ctx.value("a"), Some(&json!("first")));
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn execution_order_preserved() {
        let mut ctx = PipelineContext::default();
        for id in ["z", "a", "m"] {
            ctx.insert(TaskResult::new(id, id, json!(id))).unwrap();
        }
        assert_eq!(ctx.task_ids().collect::<Vec<_>>(), vec!["z", "a", "m"]);
    }

    #[test]
    fn typed_record_access() {
        let mut ctx = PipelineContext::default();
        ctx.insert(TaskResult::new(
            "analysis",
            "raw",
            json!({"issues_found": true, "notes": ["tighten act two"]}),
        ))
        .unwrap();

        let analysis: StoryAnalysis = ctx.record("analysis").unwrap();
        assert_eq!(analysis.notes, vec!["tighten act two".to_string()]);
        assert!(ctx.record::<StoryAnalysis>("missing").is_err());
    }

    #[test]
    fn output_str_uses_canonical_json() {
        let text = TaskResult::new("t", " hi\n", json!("hi"));
        assert_eq!(text.output_str(), " hi\n");
        assert!(!text.is_structured());

        let record = TaskResult::new("r", "", json!({"b": 2, "a": 1}));
        assert_eq!(record.output_str(), canonical_json(&json!({"a": 1, "b": 2})));
        assert!(record.is_structured());
    }

    #[test]
    fn serializes_inputs_and_tasks() {
        let mut ctx = PipelineContext::new(RunInputs::premise("p").unwrap());
        ctx.insert(TaskResult::new("a", "x", json!("x"))).unwrap();

        let doc = serde_json::to_value(&ctx).unwrap();
        assert_eq!(doc["inputs"]["args"], json!(["p"]));
        assert_eq!(doc["tasks"][0]["task_id"], "a");
        assert!(doc.get("index").is_none());
    }
}
