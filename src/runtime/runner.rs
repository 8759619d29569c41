//! Runner - sequential pipeline execution
//!
//! One task at a time, in the pipeline's execution order:
//! cancellation check → resolve prompt → generate → extract → store.
//! The first failure aborts the run; nothing partial is returned.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::pipeline::Pipeline;
use crate::binding::Template;
use crate::error::{PlotlineError, Result};
use crate::event::{EventKind, EventLog};
use crate::extract::extract;
use crate::provider::{GenerationRequest, Provider};
use crate::store::{PipelineContext, RunInputs, TaskResult};
use crate::task::TaskSpec;

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunOutput {
    /// Id of the terminal task
    pub terminal: String,
    /// Parsed value of the terminal task
    pub output: Value,
    /// Every task result, in execution order
    pub context: PipelineContext,
}

/// Executes a [`Pipeline`] against one provider
pub struct Runner {
    pipeline: Arc<Pipeline>,
    provider: Arc<dyn Provider>,
    cancel: CancellationToken,
    event_log: EventLog,
}

impl Runner {
    pub fn new(pipeline: impl Into<Arc<Pipeline>>, provider: Arc<dyn Provider>) -> Self {
        Self {
            pipeline: pipeline.into(),
            provider,
            cancel: CancellationToken::new(),
            event_log: EventLog::new(),
        }
    }

    /// Stop before the next task once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Record events into a shared log
    pub fn with_event_log(mut self, event_log: EventLog) -> Self {
        self.event_log = event_log;
        self
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Run every task once; returns the terminal output and the full context
    #[instrument(skip(self, inputs), fields(tasks = self.pipeline.len(), provider = self.provider.name()))]
    pub async fn run(&self, inputs: RunInputs) -> Result<RunOutput> {
        let run_start = Instant::now();
        info!("Starting pipeline run");

        self.event_log.emit(EventKind::RunStarted {
            task_count: self.pipeline.len(),
            order: self
                .pipeline
                .execution_order()
                .map(|t| Arc::from(t.id()))
                .collect(),
        });

        let mut ctx = PipelineContext::new(inputs);

        for (task, template) in self.pipeline.steps() {
            if self.cancel.is_cancelled() {
                warn!(next_task = task.id(), "Run cancelled");
                return Err(self.fail(PlotlineError::Cancelled {
                    next_task: task.id().to_string(),
                }));
            }

            let task_id: Arc<str> = Arc::from(task.id());
            self.event_log.emit(EventKind::TaskScheduled {
                task_id: Arc::clone(&task_id),
                dependencies: self.pipeline.graph().get_dependencies(task.id()).to_vec(),
            });

            let task_start = Instant::now();
            let outcome = self
                .execute_task(task, template, &ctx)
                .await
                .and_then(|result| {
                    let value = result.value.clone();
                    ctx.insert(result)
                        .map_err(|e| e.in_task(task.id(), None))?;
                    Ok(value)
                });
            let duration_ms = task_start.elapsed().as_millis() as u64;

            match outcome {
                Ok(output) => {
                    info!(task = task.id(), duration_ms, "Task completed");
                    self.event_log.emit(EventKind::TaskCompleted {
                        task_id,
                        output,
                        duration_ms,
                    });
                }
                Err(err) => {
                    warn!(task = task.id(), error = %err, "Task failed");
                    self.event_log.emit(EventKind::TaskFailed {
                        task_id,
                        error: err.root_cause().to_string(),
                        raw_text: err.raw_text().map(str::to_string),
                        duration_ms,
                    });
                    return Err(self.fail(err));
                }
            }
        }

        let terminal = self.pipeline.terminal().id();
        let output = ctx.value(terminal).cloned().ok_or_else(|| {
            self.fail(PlotlineError::Reference {
                task_id: terminal.to_string(),
                path: format!("{}.output", terminal),
                reason: "terminal task produced no result".to_string(),
            })
        })?;

        let total_duration_ms = run_start.elapsed().as_millis() as u64;
        info!(terminal, total_duration_ms, "Pipeline run completed");
        self.event_log.emit(EventKind::RunCompleted {
            terminal_task: Arc::from(terminal),
            total_duration_ms,
        });

        Ok(RunOutput {
            terminal: terminal.to_string(),
            output,
            context: ctx,
        })
    }

    /// Resolve, generate and extract one task; errors come back as `TaskFailed`
    async fn execute_task(
        &self,
        task: &TaskSpec,
        template: &Template,
        ctx: &PipelineContext,
    ) -> Result<TaskResult> {
        let id = task.id();

        let prompt = template
            .resolve(ctx, self.pipeline.parent_of(id))
            .map_err(|e| e.in_task(id, None))?;
        debug!(task = id, prompt = %prompt, "Template resolved");
        self.event_log.emit(EventKind::TemplateResolved {
            task_id: Arc::from(id),
            template: template.source().to_string(),
            result: prompt.clone(),
        });

        let request = GenerationRequest::for_task(task, prompt);
        self.event_log.emit(EventKind::ProviderCalled {
            task_id: Arc::from(id),
            provider: self.provider.name().to_string(),
            model: request.model.clone(),
            temperature: request.temperature,
            prompt_len: request.prompt.len(),
        });

        let raw = self.provider.generate(&request).await.map_err(|e| {
            PlotlineError::GenerationTransport {
                provider: self.provider.name().to_string(),
                message: format!("{:#}", e),
            }
            .in_task(id, None)
        })?;
        debug!(task = id, raw_len = raw.len(), "Provider responded");

        match extract(&raw, task.output()) {
            Ok(value) => Ok(TaskResult::new(id, raw, value)),
            Err(e) => Err(e.in_task(id, Some(raw))),
        }
    }

    fn fail(&self, err: PlotlineError) -> PlotlineError {
        self.event_log.emit(EventKind::RunFailed {
            error: err.to_string(),
            failed_task: err.failed_task().map(Arc::from),
        });
        err
    }
}
