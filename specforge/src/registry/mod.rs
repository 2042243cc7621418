//! Stage registry construction and validation.
//!
//! The registry is the single source of truth for pipeline shape: an ordered
//! list of stage definitions, each binding a name to a resolved worker
//! capability and per-stage settings. The state machine never reorders or
//! re-derives it.

use crate::config::{GenerationOptions, PipelineConfig};
use crate::core::ItemCountRule;
use crate::errors::ConfigError;
use crate::workers::{Worker, WorkerRegistry};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// A validated, immutable stage binding.
#[derive(Debug, Clone)]
pub struct StageDefinition {
    /// Unique stage name; ordering key within the registry.
    pub name: String,
    /// The resolved worker capability.
    pub worker: Arc<dyn Worker>,
    /// Upper bound on one worker invocation.
    pub timeout: Duration,
    /// Disabled stages are skipped without invoking the worker.
    pub enabled: bool,
    /// How the stage's output artifacts are counted.
    pub items: ItemCountRule,
    /// Opaque parameters forwarded to the worker on every invocation.
    pub params: serde_json::Value,
}

/// Ordered list of stage definitions for one pipeline shape.
#[derive(Debug, Clone)]
pub struct StageRegistry {
    name: String,
    stages: Vec<StageDefinition>,
}

impl StageRegistry {
    /// Builds a registry from configuration, resolving worker capabilities.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration lists no stages, a
    /// stage name collides, a timeout is non-positive (or NaN), or a
    /// referenced capability is not registered.
    pub fn build(
        config: &PipelineConfig,
        workers: &WorkerRegistry,
    ) -> Result<Self, ConfigError> {
        if config.stages.is_empty() {
            return Err(ConfigError::EmptyPipeline);
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut stages = Vec::with_capacity(config.stages.len());

        for stage in &config.stages {
            if !seen.insert(stage.name.as_str()) {
                return Err(ConfigError::DuplicateStage {
                    stage: stage.name.clone(),
                });
            }

            // NaN fails the comparison and is rejected with the rest.
            if !(stage.timeout_secs > 0.0) {
                return Err(ConfigError::NonPositiveTimeout {
                    stage: stage.name.clone(),
                    timeout_secs: stage.timeout_secs,
                });
            }

            let worker = workers.get(&stage.capability).ok_or_else(|| {
                ConfigError::UnknownCapability {
                    stage: stage.name.clone(),
                    capability: stage.capability.clone(),
                }
            })?;

            stages.push(StageDefinition {
                name: stage.name.clone(),
                worker,
                timeout: Duration::from_secs_f64(stage.timeout_secs),
                enabled: stage.enabled,
                items: stage.items,
                params: merged_params(&config.generation, &stage.params),
            });
        }

        Ok(Self {
            name: config.name.clone(),
            stages,
        })
    }

    /// Returns the sub-registry starting at the named stage, for resuming a
    /// failed run from its failure point.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownStage`] if the stage is not present.
    pub fn tail(&self, start_stage: &str) -> Result<Self, ConfigError> {
        let index = self
            .index_of(start_stage)
            .ok_or_else(|| ConfigError::UnknownStage {
                stage: start_stage.to_string(),
            })?;

        Ok(Self {
            name: self.name.clone(),
            stages: self.stages[index..].to_vec(),
        })
    }

    /// The pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The stage definitions in execution order.
    #[must_use]
    pub fn stages(&self) -> &[StageDefinition] {
        &self.stages
    }

    /// Number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true if the registry holds no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Looks up a stage definition by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&StageDefinition> {
        self.stages.iter().find(|s| s.name == name)
    }

    /// Position of the named stage in execution order.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.stages.iter().position(|s| s.name == name)
    }
}

/// Merges pipeline-level generation options with per-stage params.
///
/// Stage params win on key collisions. Non-object stage params are kept
/// whole under a `"stage"` key so nothing is silently dropped.
fn merged_params(
    generation: &GenerationOptions,
    stage_params: &serde_json::Value,
) -> serde_json::Value {
    let mut base = match serde_json::to_value(generation) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    };

    match stage_params {
        serde_json::Value::Null => {}
        serde_json::Value::Object(map) => {
            for (key, value) in map {
                base.insert(key.clone(), value.clone());
            }
        }
        other => {
            base.insert("stage".to_string(), other.clone());
        }
    }

    serde_json::Value::Object(base)
}
