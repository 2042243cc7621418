//! Pipeline configuration.
//!
//! Configuration is declarative data: an ordered stage list plus opaque
//! generation options. The core interprets nothing here beyond `enabled`,
//! `timeout_secs`, and the item counting rule; everything else is passed
//! through to workers untouched.

use crate::core::ItemCountRule;
use crate::workers::capabilities;
use serde::{Deserialize, Serialize};

const DEFAULT_TIMEOUT_SECS: f64 = 120.0;

fn default_timeout() -> f64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_enabled() -> bool {
    true
}

/// Configuration for a single stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    /// Unique stage name; doubles as the ordering key within the list.
    pub name: String,
    /// Worker capability the stage binds to.
    pub capability: String,
    /// Whether the stage runs at all. Disabled stages are skipped.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Upper bound on the worker invocation, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: f64,
    /// How artifacts in the stage's output are counted.
    #[serde(default)]
    pub items: ItemCountRule,
    /// Opaque per-stage parameters forwarded to the worker.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub params: serde_json::Value,
}

impl StageConfig {
    /// Creates a stage config with defaults, named after its capability.
    #[must_use]
    pub fn new(name: impl Into<String>, capability: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capability: capability.into(),
            enabled: true,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            items: ItemCountRule::Single,
            params: serde_json::Value::Null,
        }
    }

    /// Disables the stage.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Sets the timeout in seconds.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: f64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Sets the item counting rule.
    #[must_use]
    pub fn with_items(mut self, items: ItemCountRule) -> Self {
        self.items = items;
        self
    }

    /// Sets the opaque per-stage parameters.
    #[must_use]
    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = params;
        self
    }
}

/// Generation options forwarded opaquely to every worker.
///
/// These mirror the knobs the interactive front-end exposes: model settings
/// plus framework, test framework, and cloud target selection. The core
/// never reads them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Sampling temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Output token ceiling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Target code framework (e.g. "FastAPI", "Express.js").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    /// Target test framework (e.g. "pytest", "Jest").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_framework: Option<String>,
    /// Target cloud for deployment artifacts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud: Option<String>,
}

/// Full pipeline configuration: name, ordered stages, generation options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Display name for the pipeline.
    pub name: String,
    /// Ordered stage list; list order is execution order.
    pub stages: Vec<StageConfig>,
    /// Opaque options forwarded to every worker.
    #[serde(default)]
    pub generation: GenerationOptions,
}

impl PipelineConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            generation: GenerationOptions::default(),
        }
    }

    /// Appends a stage.
    #[must_use]
    pub fn with_stage(mut self, stage: StageConfig) -> Self {
        self.stages.push(stage);
        self
    }

    /// Sets the generation options.
    #[must_use]
    pub fn with_generation(mut self, generation: GenerationOptions) -> Self {
        self.generation = generation;
        self
    }

    /// Looks up a stage config by name.
    #[must_use]
    pub fn stage(&self, name: &str) -> Option<&StageConfig> {
        self.stages.iter().find(|s| s.name == name)
    }

    /// The default SDLC generation pipeline: analyze the specification,
    /// generate stories, code, tests, container artifacts, monitoring
    /// configuration, and a setup guide, in that order.
    #[must_use]
    pub fn sdlc() -> Self {
        Self::new("sdlc")
            .with_stage(StageConfig::new(
                capabilities::ANALYZE_SPEC,
                capabilities::ANALYZE_SPEC,
            ))
            .with_stage(
                StageConfig::new(capabilities::GENERATE_STORIES, capabilities::GENERATE_STORIES)
                    .with_items(ItemCountRule::ArrayLength),
            )
            .with_stage(
                StageConfig::new(capabilities::GENERATE_CODE, capabilities::GENERATE_CODE)
                    .with_items(ItemCountRule::ObjectKeys),
            )
            .with_stage(
                StageConfig::new(capabilities::GENERATE_TESTS, capabilities::GENERATE_TESTS)
                    .with_items(ItemCountRule::ObjectKeys),
            )
            .with_stage(
                StageConfig::new(
                    capabilities::GENERATE_CONTAINER,
                    capabilities::GENERATE_CONTAINER,
                )
                .with_items(ItemCountRule::ObjectKeys),
            )
            .with_stage(
                StageConfig::new(
                    capabilities::GENERATE_MONITOR_CONFIG,
                    capabilities::GENERATE_MONITOR_CONFIG,
                )
                .with_items(ItemCountRule::ObjectKeys),
            )
            .with_stage(StageConfig::new(
                capabilities::GENERATE_SETUP_GUIDE,
                capabilities::GENERATE_SETUP_GUIDE,
            ))
    }
}
