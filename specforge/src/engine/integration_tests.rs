//! End-to-end scenarios for the engine: the canonical SDLC registry with
//! injected worker outcomes, concurrent observation, and determinism.

use crate::config::{PipelineConfig, StageConfig};
use crate::core::{ItemCountRule, RunStatus, StageStatus};
use crate::engine::PipelineEngine;
use crate::registry::StageRegistry;
use crate::run::PipelineRun;
use crate::snapshot::snapshot;
use crate::testing::{FailingWorker, SlowWorker, StaticWorker};
use crate::workers::WorkerRegistry;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

/// Registry from the canonical scenario: Analyze, Stories, Code (disabled),
/// Tests.
fn scenario_config() -> PipelineConfig {
    PipelineConfig::new("scenario")
        .with_stage(
            StageConfig::new("analyze", "analyze").with_items(ItemCountRule::ArrayLength),
        )
        .with_stage(
            StageConfig::new("stories", "stories").with_items(ItemCountRule::ArrayLength),
        )
        .with_stage(
            StageConfig::new("code", "code")
                .with_items(ItemCountRule::ObjectKeys)
                .disabled(),
        )
        .with_stage(StageConfig::new("tests", "tests").with_items(ItemCountRule::ObjectKeys))
}

fn happy_workers() -> WorkerRegistry {
    let mut workers = WorkerRegistry::new();
    workers.register(Arc::new(StaticWorker::new("analyze", json!(["analysis"]))));
    workers.register(Arc::new(StaticWorker::new(
        "stories",
        json!(["s1", "s2", "s3", "s4", "s5"]),
    )));
    workers.register(Arc::new(StaticWorker::new("code", json!({}))));
    let test_files: serde_json::Value = json!({
        "test_auth.py": "...", "test_users.py": "...", "test_orders.py": "...",
        "test_items.py": "...", "test_health.py": "...", "test_login.py": "...",
        "test_tokens.py": "...", "test_roles.py": "...", "test_audit.py": "...",
        "test_search.py": "...", "test_export.py": "...", "test_import.py": "...",
    });
    workers.register(Arc::new(StaticWorker::new("tests", test_files)));
    workers
}

async fn drive(config: &PipelineConfig, workers: &WorkerRegistry) -> Arc<PipelineRun> {
    let registry = StageRegistry::build(config, workers).unwrap();
    let run = Arc::new(PipelineRun::new(registry));
    PipelineEngine::new().drive(&run, json!({"openapi": "3.0"})).await;
    run
}

#[tokio::test]
async fn test_scenario_all_enabled_stages_succeed() {
    let run = drive(&scenario_config(), &happy_workers()).await;

    assert_eq!(run.overall_status(), RunStatus::Completed);

    let statuses: Vec<StageStatus> = run.results().iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            StageStatus::Succeeded,
            StageStatus::Succeeded,
            StageStatus::Skipped,
            StageStatus::Succeeded,
        ]
    );

    let counts: Vec<u64> = run.results().iter().map(|r| r.item_count).collect();
    assert_eq!(counts, vec![1, 5, 0, 12]);

    // Every succeeded stage carries its output.
    for result in run.results() {
        if result.status == StageStatus::Succeeded {
            assert!(result.output.is_some(), "{} lost its output", result.stage_name);
        }
    }
}

#[tokio::test]
async fn test_scenario_stories_failure_leaves_tail_pending() {
    let mut workers = happy_workers();
    workers.register(Arc::new(FailingWorker::new("stories", "model refused")));

    let run = drive(&scenario_config(), &workers).await;

    assert_eq!(run.overall_status(), RunStatus::Failed);

    let statuses: Vec<StageStatus> = run.results().iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            StageStatus::Succeeded,
            StageStatus::Failed,
            StageStatus::Pending,
            StageStatus::Pending,
        ]
    );

    // Stages after the failure point were never touched: no timestamps.
    for result in &run.results()[2..] {
        assert!(result.started_at.is_none());
        assert!(result.finished_at.is_none());
    }

    let failed = run.failed_result().unwrap();
    assert_eq!(failed.stage_name, "stories");
    assert!(failed.error.is_some());
}

#[tokio::test]
async fn test_same_outcomes_yield_same_terminal_state() {
    let first = drive(&scenario_config(), &happy_workers()).await;
    let second = drive(&scenario_config(), &happy_workers()).await;

    let strip_times = |run: &PipelineRun| {
        run.results()
            .into_iter()
            .map(|r| (r.stage_name, r.status, r.output, r.item_count))
            .collect::<Vec<_>>()
    };
    assert_eq!(strip_times(&first), strip_times(&second));
    assert_eq!(first.overall_status(), second.overall_status());
}

#[tokio::test]
async fn test_concurrent_snapshots_never_see_torn_state() {
    let mut workers = WorkerRegistry::new();
    workers.register(Arc::new(SlowWorker::new("slow", json!([1, 2]), 20)));

    let config = PipelineConfig::new("observed")
        .with_stage(StageConfig::new("a", "slow").with_items(ItemCountRule::ArrayLength))
        .with_stage(StageConfig::new("b", "slow").with_items(ItemCountRule::ArrayLength))
        .with_stage(StageConfig::new("c", "slow").with_items(ItemCountRule::ArrayLength));

    let registry = StageRegistry::build(&config, &workers).unwrap();
    let run = Arc::new(PipelineRun::new(registry));

    let observed = Arc::clone(&run);
    let observer = tokio::spawn(async move {
        while !observed.is_terminal() {
            let model = snapshot(&observed);
            let running = model.nodes.iter().filter(|n| n.is_current).count();
            assert!(running <= 1, "two stages running at once");
            for node in &model.nodes {
                if node.status == StageStatus::Succeeded {
                    let result = observed.result(&node.name).unwrap();
                    assert!(result.output.is_some(), "succeeded without output");
                }
            }
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }
    });

    let status = PipelineEngine::new().drive(&run, json!(null)).await;
    assert_eq!(status, RunStatus::Completed);
    observer.await.unwrap();
}
