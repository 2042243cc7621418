//! Lifecycle events and pluggable sinks.
//!
//! The snapshot exporter is pull-based; event sinks are the push-based
//! complement. The engine emits one event per stage/run transition. Sinks
//! must never fail the pipeline: emission is fire-and-forget.

use crate::errors::StageFailure;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunEventKind {
    /// The run entered `InProgress`.
    RunStarted,
    /// A stage entered `Running`.
    StageStarted,
    /// A stage succeeded.
    StageSucceeded,
    /// A stage failed and halted the run.
    StageFailed,
    /// A disabled stage was skipped.
    StageSkipped,
    /// Every enabled stage succeeded.
    RunCompleted,
    /// The run ended in failure.
    RunFailed,
}

/// One lifecycle event, scoped to a run and optionally a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEvent {
    /// What happened.
    pub kind: RunEventKind,
    /// The run this event belongs to.
    pub run_id: Uuid,
    /// The stage involved, for stage-scoped events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    /// Stage duration in milliseconds, for terminal stage events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
    /// The failure, for `StageFailed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<StageFailure>,
}

impl RunEvent {
    /// Creates a run-scoped event.
    #[must_use]
    pub fn run(kind: RunEventKind, run_id: Uuid) -> Self {
        Self {
            kind,
            run_id,
            stage: None,
            duration_ms: None,
            failure: None,
        }
    }

    /// Creates a stage-scoped event.
    #[must_use]
    pub fn stage(kind: RunEventKind, run_id: Uuid, stage: impl Into<String>) -> Self {
        Self {
            kind,
            run_id,
            stage: Some(stage.into()),
            duration_ms: None,
            failure: None,
        }
    }

    /// Attaches a duration.
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Attaches the failure.
    #[must_use]
    pub fn with_failure(mut self, failure: StageFailure) -> Self {
        self.failure = Some(failure);
        self
    }
}

/// Receives lifecycle events from the engine.
pub trait EventSink: Send + Sync {
    /// Handles one event. Must not panic; errors are the sink's problem.
    fn emit(&self, event: &RunEvent);
}

/// Discards all events. The default when no sink is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

impl EventSink for NoOpEventSink {
    fn emit(&self, _event: &RunEvent) {}
}

/// Logs events through the `tracing` framework.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventSink;

impl EventSink for LoggingEventSink {
    fn emit(&self, event: &RunEvent) {
        match event.kind {
            RunEventKind::StageFailed | RunEventKind::RunFailed => {
                warn!(
                    run_id = %event.run_id,
                    stage = event.stage.as_deref(),
                    failure = ?event.failure,
                    "pipeline event: {:?}", event.kind
                );
            }
            _ => {
                info!(
                    run_id = %event.run_id,
                    stage = event.stage.as_deref(),
                    duration_ms = event.duration_ms,
                    "pipeline event: {:?}", event.kind
                );
            }
        }
    }
}

/// Collects events in memory, for tests.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: parking_lot::RwLock<Vec<RunEvent>>,
}

impl CollectingEventSink {
    /// Creates an empty collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All collected events, in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<RunEvent> {
        self.events.read().clone()
    }

    /// The kinds of all collected events, in emission order.
    #[must_use]
    pub fn kinds(&self) -> Vec<RunEventKind> {
        self.events.read().iter().map(|e| e.kind).collect()
    }

    /// Number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

impl EventSink for CollectingEventSink {
    fn emit(&self, event: &RunEvent) {
        self.events.write().push(event.clone());
    }
}
