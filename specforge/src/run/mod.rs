//! Pipeline run state, owned by the state machine and readable by everyone.
//!
//! A [`PipelineRun`] holds every stage result for one end-to-end execution.
//! All mutation goes through crate-private methods driven by the engine;
//! every transition replaces a whole [`StageResult`] under a short write
//! lock, so concurrent readers (the snapshot exporter) always observe a
//! consistent value.

use crate::core::{RunStatus, StageResult, StageStatus};
use crate::errors::StageFailure;
use crate::registry::StageRegistry;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

pub(crate) struct RunState {
    pub(crate) results: HashMap<String, StageResult>,
    pub(crate) current_stage_index: usize,
    pub(crate) overall_status: RunStatus,
}

/// One end-to-end pipeline execution instance.
pub struct PipelineRun {
    run_id: Uuid,
    registry: StageRegistry,
    state: RwLock<RunState>,
}

impl std::fmt::Debug for PipelineRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineRun")
            .field("run_id", &self.run_id)
            .field("pipeline", &self.registry.name())
            .field("overall_status", &self.overall_status())
            .finish()
    }
}

impl PipelineRun {
    /// Creates a `NotStarted` run over a built registry. Every stage starts
    /// out `Pending`; disabled stages only become `Skipped` when the state
    /// machine reaches them.
    #[must_use]
    pub fn new(registry: StageRegistry) -> Self {
        let results = registry
            .stages()
            .iter()
            .map(|def| (def.name.clone(), StageResult::pending(&def.name)))
            .collect();

        Self {
            run_id: Uuid::new_v4(),
            registry,
            state: RwLock::new(RunState {
                results,
                current_stage_index: 0,
                overall_status: RunStatus::NotStarted,
            }),
        }
    }

    /// The unique ID of this run.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// The pipeline name, from the registry.
    #[must_use]
    pub fn pipeline_name(&self) -> &str {
        self.registry.name()
    }

    /// The registry this run executes.
    #[must_use]
    pub fn registry(&self) -> &StageRegistry {
        &self.registry
    }

    /// The current overall status.
    #[must_use]
    pub fn overall_status(&self) -> RunStatus {
        self.state.read().overall_status
    }

    /// Index of the stage the state machine is at (next to run, or the
    /// failed stage once the run has failed).
    #[must_use]
    pub fn current_stage_index(&self) -> usize {
        self.state.read().current_stage_index
    }

    /// Returns true once the run can no longer change.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.overall_status().is_terminal()
    }

    /// The result for one stage, if the stage exists.
    #[must_use]
    pub fn result(&self, stage_name: &str) -> Option<StageResult> {
        self.state.read().results.get(stage_name).cloned()
    }

    /// All stage results in registry order.
    #[must_use]
    pub fn results(&self) -> Vec<StageResult> {
        let state = self.state.read();
        self.registry
            .stages()
            .iter()
            .filter_map(|def| state.results.get(&def.name).cloned())
            .collect()
    }

    /// The failed stage's result, if the run failed.
    #[must_use]
    pub fn failed_result(&self) -> Option<StageResult> {
        self.results()
            .into_iter()
            .find(|r| r.status == StageStatus::Failed)
    }

    /// Succeeded stage outputs keyed by stage name, for the packaging
    /// collaborator. The core hands the artifacts over; it does not bundle
    /// or format them.
    #[must_use]
    pub fn succeeded_outputs(&self) -> HashMap<String, serde_json::Value> {
        let state = self.state.read();
        state
            .results
            .iter()
            .filter(|(_, r)| r.status == StageStatus::Succeeded)
            .filter_map(|(name, r)| r.output.clone().map(|o| (name.clone(), o)))
            .collect()
    }

    /// Runs a closure against a consistent view of the state, under one
    /// read lock. Used by the snapshot exporter.
    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&RunState) -> R) -> R {
        f(&self.state.read())
    }

    // --- transitions, engine-only ------------------------------------

    pub(crate) fn begin(&self) {
        let mut state = self.state.write();
        if state.overall_status == RunStatus::NotStarted {
            state.overall_status = RunStatus::InProgress;
        }
    }

    /// Marks the stage at `index` as `Running` and returns its start time.
    pub(crate) fn start_stage(&self, index: usize) -> DateTime<Utc> {
        let name = &self.registry.stages()[index].name;
        let started_at = Utc::now();
        let mut state = self.state.write();
        state.current_stage_index = index;
        state
            .results
            .insert(name.clone(), StageResult::running(name, started_at));
        started_at
    }

    /// Publishes a succeeded result and advances past the stage.
    pub(crate) fn succeed_stage(
        &self,
        index: usize,
        output: serde_json::Value,
        item_count: u64,
        started_at: DateTime<Utc>,
    ) {
        let name = &self.registry.stages()[index].name;
        let mut state = self.state.write();
        state.results.insert(
            name.clone(),
            StageResult::succeeded(name, output, item_count, started_at),
        );
        state.current_stage_index = (index + 1).min(self.registry.len());
    }

    /// Publishes a failed result and moves the run to `Failed`.
    pub(crate) fn fail_stage(
        &self,
        index: usize,
        failure: StageFailure,
        started_at: DateTime<Utc>,
    ) {
        let name = &self.registry.stages()[index].name;
        let mut state = self.state.write();
        state
            .results
            .insert(name.clone(), StageResult::failed(name, failure, started_at));
        state.current_stage_index = index;
        state.overall_status = RunStatus::Failed;
    }

    /// Publishes a skipped result for a disabled stage and advances.
    pub(crate) fn skip_stage(&self, index: usize) {
        let name = &self.registry.stages()[index].name;
        let mut state = self.state.write();
        state
            .results
            .insert(name.clone(), StageResult::skipped(name));
        state.current_stage_index = (index + 1).min(self.registry.len());
    }

    /// Seals the run after the last stage: `Completed` iff every enabled
    /// stage succeeded.
    pub(crate) fn finish(&self) -> RunStatus {
        let mut state = self.state.write();
        if state.overall_status == RunStatus::Failed {
            return RunStatus::Failed;
        }

        let all_succeeded = self
            .registry
            .stages()
            .iter()
            .filter(|def| def.enabled)
            .all(|def| {
                state
                    .results
                    .get(&def.name)
                    .is_some_and(|r| r.status == StageStatus::Succeeded)
            });

        state.overall_status = if all_succeeded {
            RunStatus::Completed
        } else {
            RunStatus::Failed
        };
        state.overall_status
    }
}
