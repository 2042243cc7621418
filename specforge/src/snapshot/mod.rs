//! Visualization snapshot export.
//!
//! Converts a run's current state into a renderer-agnostic model. The
//! exporter is a pure read: one read lock, no mutation, safe to call from a
//! concurrent observer at any point during execution.

use crate::core::{RunStatus, StageStatus};
use crate::run::PipelineRun;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One pipeline stage as the visualization layer sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageNode {
    /// Display name.
    pub name: String,
    /// Current status.
    pub status: StageStatus,
    /// Artifact count from the stage's counting rule.
    pub item_count: u64,
    /// True for the stage currently running. At most one per model.
    pub is_current: bool,
    /// True for the stage that failed the run. At most one per model.
    pub is_failed: bool,
}

/// Point-in-time model of a whole run, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationModel {
    /// The observed run.
    pub run_id: Uuid,
    /// Pipeline display name.
    pub pipeline_name: String,
    /// Overall status at observation time.
    pub overall_status: RunStatus,
    /// Per-stage nodes in execution order.
    pub nodes: Vec<StageNode>,
}

impl VisualizationModel {
    /// The currently running node, if any.
    #[must_use]
    pub fn current(&self) -> Option<&StageNode> {
        self.nodes.iter().find(|n| n.is_current)
    }

    /// The failed node, if the run failed.
    #[must_use]
    pub fn failed(&self) -> Option<&StageNode> {
        self.nodes.iter().find(|n| n.is_failed)
    }
}

/// Exports a visualization model from the run's current state.
///
/// Taken under a single read lock, so the model is internally consistent
/// even while the state machine is mid-transition on another task. Calling
/// twice with no intervening progress yields equal models.
#[must_use]
pub fn snapshot(run: &PipelineRun) -> VisualizationModel {
    run.with_state(|state| {
        let nodes = run
            .registry()
            .stages()
            .iter()
            .filter_map(|def| state.results.get(&def.name))
            .map(|result| StageNode {
                name: result.stage_name.clone(),
                status: result.status,
                item_count: result.item_count,
                is_current: result.status == StageStatus::Running,
                is_failed: result.status == StageStatus::Failed,
            })
            .collect();

        VisualizationModel {
            run_id: run.run_id(),
            pipeline_name: run.pipeline_name().to_string(),
            overall_status: state.overall_status,
            nodes,
        }
    })
}
