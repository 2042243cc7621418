//! Top-level run controller.
//!
//! Builds a registry from configuration, constructs a run, and drives the
//! engine to a terminal state. Stage failures come back as data on the run;
//! only construction-time configuration problems are returned as errors,
//! always before any stage executes.

use crate::config::PipelineConfig;
use crate::core::RunStatus;
use crate::engine::PipelineEngine;
use crate::errors::ConfigError;
use crate::events::EventSink;
use crate::registry::StageRegistry;
use crate::run::PipelineRun;
use std::sync::Arc;
use tracing::info;

/// Constructs and executes pipeline runs against a fixed worker set.
#[derive(Debug, Clone)]
pub struct RunController {
    workers: crate::workers::WorkerRegistry,
    engine: PipelineEngine,
}

impl RunController {
    /// Creates a controller over a worker registry, with events discarded.
    #[must_use]
    pub fn new(workers: crate::workers::WorkerRegistry) -> Self {
        Self {
            workers,
            engine: PipelineEngine::new(),
        }
    }

    /// Creates a controller that emits lifecycle events to the given sink.
    #[must_use]
    pub fn with_events(
        workers: crate::workers::WorkerRegistry,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            workers,
            engine: PipelineEngine::with_events(events),
        }
    }

    /// Executes the configured pipeline to a terminal state and returns the
    /// final run for inspection or packaging.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for invalid configuration, before any stage
    /// executes. A failing stage does not error; it yields a `Failed` run.
    pub async fn execute(
        &self,
        config: &PipelineConfig,
        input: serde_json::Value,
    ) -> Result<Arc<PipelineRun>, ConfigError> {
        let registry = StageRegistry::build(config, &self.workers)?;
        let run = Arc::new(PipelineRun::new(registry));
        info!(run_id = %run.run_id(), pipeline = %run.pipeline_name(), "starting pipeline run");
        self.engine.drive(&run, input).await;
        Ok(run)
    }

    /// Executes the pipeline from the named stage onward, feeding it the
    /// given input, typically the last succeeded stage's output from a
    /// failed run. Stages before the starting point are not part of the
    /// resumed run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for invalid configuration or an unknown
    /// starting stage.
    pub async fn execute_from(
        &self,
        config: &PipelineConfig,
        start_stage: &str,
        input: serde_json::Value,
    ) -> Result<Arc<PipelineRun>, ConfigError> {
        let registry = StageRegistry::build(config, &self.workers)?.tail(start_stage)?;
        let run = Arc::new(PipelineRun::new(registry));
        info!(
            run_id = %run.run_id(),
            pipeline = %run.pipeline_name(),
            start_stage,
            "resuming pipeline run"
        );
        self.engine.drive(&run, input).await;
        Ok(run)
    }

    /// Starts the pipeline on a background task and returns the run handle
    /// immediately, so observers can snapshot while it executes. The join
    /// handle resolves to the terminal status.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for invalid configuration; nothing is
    /// spawned in that case.
    pub fn spawn(
        &self,
        config: &PipelineConfig,
        input: serde_json::Value,
    ) -> Result<(Arc<PipelineRun>, tokio::task::JoinHandle<RunStatus>), ConfigError> {
        let registry = StageRegistry::build(config, &self.workers)?;
        let run = Arc::new(PipelineRun::new(registry));
        let engine = self.engine.clone();
        let driven = Arc::clone(&run);
        let handle = tokio::spawn(async move { engine.drive(&driven, input).await });
        Ok((run, handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StageConfig;
    use crate::core::StageStatus;
    use crate::testing::{FailingWorker, SlowWorker, StaticWorker};
    use crate::workers::WorkerRegistry;
    use serde_json::json;

    fn workers() -> WorkerRegistry {
        let mut registry = WorkerRegistry::new();
        registry.register(Arc::new(StaticWorker::new("ok", json!({"done": true}))));
        registry.register(Arc::new(FailingWorker::new("bad", "nope")));
        registry
    }

    fn config() -> PipelineConfig {
        PipelineConfig::new("ctl")
            .with_stage(StageConfig::new("a", "ok"))
            .with_stage(StageConfig::new("b", "ok"))
    }

    #[tokio::test]
    async fn test_execute_returns_completed_run() {
        let controller = RunController::new(workers());
        let run = controller.execute(&config(), json!("in")).await.unwrap();

        assert_eq!(run.overall_status(), RunStatus::Completed);
        assert_eq!(run.results().len(), 2);
    }

    #[tokio::test]
    async fn test_stage_failure_is_not_an_error() {
        let controller = RunController::new(workers());
        let config = PipelineConfig::new("ctl")
            .with_stage(StageConfig::new("a", "ok"))
            .with_stage(StageConfig::new("b", "bad"));

        let run = controller.execute(&config, json!(null)).await.unwrap();
        assert_eq!(run.overall_status(), RunStatus::Failed);
        assert_eq!(run.failed_result().unwrap().stage_name, "b");
    }

    #[tokio::test]
    async fn test_config_error_surfaces_before_any_stage() {
        let controller = RunController::new(workers());
        let config =
            PipelineConfig::new("ctl").with_stage(StageConfig::new("a", "missing"));

        let err = controller.execute(&config, json!(null)).await.unwrap_err();
        assert!(matches!(err, ConfigError::UnknownCapability { .. }));
    }

    #[tokio::test]
    async fn test_execute_from_runs_only_the_tail() {
        let controller = RunController::new(workers());
        let run = controller
            .execute_from(&config(), "b", json!({"carried": "forward"}))
            .await
            .unwrap();

        assert_eq!(run.overall_status(), RunStatus::Completed);
        assert_eq!(run.results().len(), 1);
        assert_eq!(run.results()[0].stage_name, "b");
    }

    #[tokio::test]
    async fn test_execute_from_unknown_stage() {
        let controller = RunController::new(workers());
        let err = controller
            .execute_from(&config(), "zzz", json!(null))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownStage { ref stage } if stage == "zzz"));
    }

    #[tokio::test]
    async fn test_resume_after_failure_completes_pipeline() {
        // First attempt: b fails. Second attempt: re-run from b with a's
        // output, against a worker set where b now succeeds.
        let mut first_workers = WorkerRegistry::new();
        first_workers.register(Arc::new(StaticWorker::new("ok", json!({"a": 1}))));
        first_workers.register(Arc::new(FailingWorker::new("flaky", "transient")));

        let config = PipelineConfig::new("resume")
            .with_stage(StageConfig::new("a", "ok"))
            .with_stage(StageConfig::new("b", "flaky"));

        let failed = RunController::new(first_workers)
            .execute(&config, json!(null))
            .await
            .unwrap();
        assert_eq!(failed.overall_status(), RunStatus::Failed);
        let last_good = failed.result("a").unwrap().output.unwrap();

        let mut retry_workers = WorkerRegistry::new();
        retry_workers.register(Arc::new(StaticWorker::new("ok", json!({"a": 1}))));
        retry_workers.register(Arc::new(StaticWorker::new("flaky", json!({"b": 2}))));

        let resumed = RunController::new(retry_workers)
            .execute_from(&config, "b", last_good)
            .await
            .unwrap();
        assert_eq!(resumed.overall_status(), RunStatus::Completed);
        assert_eq!(resumed.result("b").unwrap().status, StageStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_spawn_allows_observation_mid_run() {
        let mut registry = WorkerRegistry::new();
        registry.register(Arc::new(SlowWorker::new("slow", json!({}), 30)));

        let controller = RunController::new(registry);
        let config = PipelineConfig::new("bg")
            .with_stage(StageConfig::new("a", "slow"))
            .with_stage(StageConfig::new("b", "slow"));

        let (run, handle) = controller.spawn(&config, json!(null)).unwrap();
        assert!(!handle.is_finished() || run.is_terminal());

        let status = handle.await.unwrap();
        assert_eq!(status, RunStatus::Completed);
        assert_eq!(run.overall_status(), RunStatus::Completed);
    }
}
