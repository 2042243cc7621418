//! Per-stage execution results.

use crate::errors::StageFailure;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::StageStatus;

/// The recorded outcome of one stage within one run.
///
/// A `StageResult` is immutable once published: the state machine replaces
/// the whole value on every transition rather than mutating fields in place,
/// so a concurrent snapshot never observes a half-written result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    /// The stage this result belongs to.
    pub stage_name: String,
    /// Current status.
    pub status: StageStatus,
    /// Output payload; present exactly when the stage succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
    /// Structured failure; present exactly when the stage failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<StageFailure>,
    /// Number of discrete artifacts in the output, per the stage's rule.
    #[serde(default)]
    pub item_count: u64,
    /// When the stage entered `Running`. Absent for pending/skipped stages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// When the stage reached a terminal status. Absent until then.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl StageResult {
    /// Creates the initial pending result for a stage.
    #[must_use]
    pub fn pending(stage_name: impl Into<String>) -> Self {
        Self {
            stage_name: stage_name.into(),
            status: StageStatus::Pending,
            output: None,
            error: None,
            item_count: 0,
            started_at: None,
            finished_at: None,
        }
    }

    /// Creates a running result stamped with a start time.
    #[must_use]
    pub fn running(stage_name: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            stage_name: stage_name.into(),
            status: StageStatus::Running,
            output: None,
            error: None,
            item_count: 0,
            started_at: Some(started_at),
            finished_at: None,
        }
    }

    /// Creates a succeeded result carrying the stage's output.
    #[must_use]
    pub fn succeeded(
        stage_name: impl Into<String>,
        output: serde_json::Value,
        item_count: u64,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            stage_name: stage_name.into(),
            status: StageStatus::Succeeded,
            output: Some(output),
            error: None,
            item_count,
            started_at: Some(started_at),
            finished_at: Some(Utc::now()),
        }
    }

    /// Creates a failed result carrying the structured failure.
    #[must_use]
    pub fn failed(
        stage_name: impl Into<String>,
        failure: StageFailure,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            stage_name: stage_name.into(),
            status: StageStatus::Failed,
            output: None,
            error: Some(failure),
            item_count: 0,
            started_at: Some(started_at),
            finished_at: Some(Utc::now()),
        }
    }

    /// Creates a skipped result for a disabled stage. No timestamps.
    #[must_use]
    pub fn skipped(stage_name: impl Into<String>) -> Self {
        Self {
            stage_name: stage_name.into(),
            status: StageStatus::Skipped,
            output: None,
            error: None,
            item_count: 0,
            started_at: None,
            finished_at: None,
        }
    }

    /// Returns true if the stage finished without blocking progression.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns true if the stage halted the run.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.status.is_failure()
    }

    /// Wall-clock duration in milliseconds, when both timestamps are set.
    #[must_use]
    pub fn duration_ms(&self) -> Option<f64> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds() as f64),
            _ => None,
        }
    }
}
