//! Pipeline - validated task graph ready to run
//!
//! `build()` checks, in order:
//! 1. graph structure (empty, ids, duplicates, unknown deps)
//! 2. cycles
//! 3. template syntax and upstream-only references
//! 4. terminal task

use std::sync::Arc;

use tracing::debug;

use crate::binding::Template;
use crate::dag::{validate_references, FlowGraph};
use crate::error::{PlotlineError, Result};
use crate::task::TaskSpec;

/// Collects tasks, then validates them into a [`Pipeline`]
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    tasks: Vec<TaskSpec>,
    terminal: Option<String>,
}

impl PipelineBuilder {
    pub fn task(mut self, task: TaskSpec) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn tasks(mut self, tasks: impl IntoIterator<Item = TaskSpec>) -> Self {
        self.tasks.extend(tasks);
        self
    }

    /// Task whose output is the pipeline output
    pub fn terminal(mut self, task_id: impl Into<String>) -> Self {
        self.terminal = Some(task_id.into());
        self
    }

    pub fn build(self) -> Result<Pipeline> {
        let graph = FlowGraph::validate(&self.tasks)?;

        let templates = self
            .tasks
            .iter()
            .map(|task| {
                let template = Template::parse(task.id(), task.prompt())?;
                validate_references(task, &template, &graph)?;
                Ok(template)
            })
            .collect::<Result<Vec<_>>>()?;

        let order = graph
            .execution_order()?
            .iter()
            .map(|id| position(&self.tasks, id))
            .collect::<Vec<_>>();

        let terminal = match self.terminal {
            Some(id) => self
                .tasks
                .iter()
                .position(|t| t.id() == id)
                .ok_or(PlotlineError::UnknownTerminal { task_id: id })?,
            None => {
                let finals = graph.get_final_tasks();
                match finals.as_slice() {
                    [only] => position(&self.tasks, only),
                    many => {
                        return Err(PlotlineError::AmbiguousTerminal {
                            candidates: many.join(", "),
                        })
                    }
                }
            }
        };

        debug!(
            tasks = self.tasks.len(),
            terminal = self.tasks[terminal].id(),
            "Pipeline validated"
        );

        Ok(Pipeline {
            tasks: self.tasks,
            templates,
            graph,
            order,
            terminal,
        })
    }
}

// Ids in the execution order come from the same task list
fn position(tasks: &[TaskSpec], id: &Arc<str>) -> usize {
    tasks
        .iter()
        .position(|t| t.id() == id.as_ref())
        .unwrap_or_default()
}

/// Immutable, validated pipeline
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Declaration order
    tasks: Vec<TaskSpec>,
    /// Parsed prompt per task (same index as `tasks`)
    templates: Vec<Template>,
    graph: FlowGraph,
    /// Indices into `tasks`, in execution order
    order: Vec<usize>,
    terminal: usize,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Tasks in declaration order
    pub fn tasks(&self) -> &[TaskSpec] {
        &self.tasks
    }

    pub fn task(&self, task_id: &str) -> Option<&TaskSpec> {
        self.tasks.iter().find(|t| t.id() == task_id)
    }

    /// Tasks in the order the runner executes them
    pub fn execution_order(&self) -> impl Iterator<Item = &TaskSpec> {
        self.order.iter().map(|&idx| &self.tasks[idx])
    }

    /// Tasks with their parsed templates, in execution order
    pub(crate) fn steps(&self) -> impl Iterator<Item = (&TaskSpec, &Template)> {
        self.order
            .iter()
            .map(|&idx| (&self.tasks[idx], &self.templates[idx]))
    }

    pub fn terminal(&self) -> &TaskSpec {
        &self.tasks[self.terminal]
    }

    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    /// Target of `parent_output` for `task_id` (its first declared dependency)
    pub fn parent_of(&self, task_id: &str) -> Option<&str> {
        self.task(task_id)
            .and_then(|t| t.dependencies().first())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
