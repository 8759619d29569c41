//! DAG Validation - template references against the flow graph
//!
//! Every `{{ task.output }}` must name a task that runs strictly before the
//! owning task (a transitive dependency). `parent_output` needs at least one
//! declared dependency. Positional and named inputs are checked at run time.
//!
//! Error codes:
//! - PLOT-026: reference to an unknown, downstream, unrelated or own task

use crate::binding::{Reference, Template};
use crate::error::{PlotlineError, Result};
use crate::task::TaskSpec;

use super::flow::FlowGraph;

/// Check that every reference in `template` is upstream of `task`
pub fn validate_references(task: &TaskSpec, template: &Template, graph: &FlowGraph) -> Result<()> {
    for reference in template.references() {
        match reference {
            Reference::TaskOutput { task_id, .. } => {
                let upstream = task_id != task.id()
                    && graph.contains(task_id)
                    && graph.has_path(task_id, task.id());
                if !upstream {
                    return Err(undeclared(task, reference));
                }
            }
            Reference::ParentOutput { .. } => {
                if graph.get_dependencies(task.id()).is_empty() {
                    return Err(undeclared(task, reference));
                }
            }
            Reference::Arg(_) | Reference::Input(_) => {}
        }
    }
    Ok(())
}

fn undeclared(task: &TaskSpec, reference: &Reference) -> PlotlineError {
    PlotlineError::UndeclaredReference {
        task_id: task.id().to_string(),
        reference: reference.to_string(),
    }
}
