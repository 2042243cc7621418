//! The pipeline state machine.
//!
//! Drives a run through its registry strictly in order: one stage `Running`
//! at a time, each stage fed the previous succeeded stage's output, halting
//! on the first failure. Deterministic by construction: a fixed sequence
//! of worker outcomes always yields the same terminal run state.

use crate::core::RunStatus;
use crate::errors::StageFailure;
use crate::events::{EventSink, NoOpEventSink, RunEvent, RunEventKind};
use crate::run::PipelineRun;
use crate::workers::{Worker, WorkerInput};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

#[cfg(test)]
mod integration_tests;

/// Executes pipeline runs sequentially, emitting lifecycle events.
#[derive(Clone)]
pub struct PipelineEngine {
    events: Arc<dyn EventSink>,
}

impl std::fmt::Debug for PipelineEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineEngine").finish_non_exhaustive()
    }
}

impl Default for PipelineEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineEngine {
    /// Creates an engine that discards events.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(NoOpEventSink),
        }
    }

    /// Creates an engine emitting to the given sink.
    #[must_use]
    pub fn with_events(events: Arc<dyn EventSink>) -> Self {
        Self { events }
    }

    /// Drives the run to a terminal state, threading `input` through the
    /// stages, and returns the terminal status.
    ///
    /// Stage failures do not propagate as errors; they are recorded on the
    /// run and reflected in the returned status.
    pub async fn drive(&self, run: &Arc<PipelineRun>, input: serde_json::Value) -> RunStatus {
        let run_id = run.run_id();
        run.begin();
        self.events.emit(&RunEvent::run(RunEventKind::RunStarted, run_id));

        let mut carry = input;

        for (index, def) in run.registry().stages().iter().enumerate() {
            if !def.enabled {
                run.skip_stage(index);
                self.events
                    .emit(&RunEvent::stage(RunEventKind::StageSkipped, run_id, &def.name));
                continue;
            }

            let started_at = run.start_stage(index);
            self.events
                .emit(&RunEvent::stage(RunEventKind::StageStarted, run_id, &def.name));
            debug!(stage = %def.name, timeout = ?def.timeout, "invoking worker");

            let worker_input = WorkerInput::new(carry.clone()).with_params(def.params.clone());
            let clock = Instant::now();

            // On expiry the worker future is dropped: the pipeline stops
            // waiting, the worker itself is abandoned best-effort.
            let outcome = tokio::time::timeout(def.timeout, def.worker.run(worker_input)).await;
            let duration_ms = clock.elapsed().as_secs_f64() * 1000.0;

            match outcome {
                Ok(Ok(output)) => {
                    let item_count = def.items.count(&output.payload);
                    run.succeed_stage(index, output.payload.clone(), item_count, started_at);
                    self.events.emit(
                        &RunEvent::stage(RunEventKind::StageSucceeded, run_id, &def.name)
                            .with_duration_ms(duration_ms),
                    );
                    carry = output.payload;
                }
                Ok(Err(worker_err)) => {
                    let failure = StageFailure::worker(&def.name, worker_err.message);
                    run.fail_stage(index, failure.clone(), started_at);
                    self.events.emit(
                        &RunEvent::stage(RunEventKind::StageFailed, run_id, &def.name)
                            .with_duration_ms(duration_ms)
                            .with_failure(failure),
                    );
                    break;
                }
                Err(_elapsed) => {
                    let failure = StageFailure::timeout(&def.name, def.timeout.as_secs_f64());
                    run.fail_stage(index, failure.clone(), started_at);
                    self.events.emit(
                        &RunEvent::stage(RunEventKind::StageFailed, run_id, &def.name)
                            .with_duration_ms(duration_ms)
                            .with_failure(failure),
                    );
                    break;
                }
            }
        }

        let status = run.finish();
        let kind = match status {
            RunStatus::Completed => RunEventKind::RunCompleted,
            _ => RunEventKind::RunFailed,
        };
        self.events.emit(&RunEvent::run(kind, run_id));
        status
    }
}
