//! Worker capabilities and the registry that resolves them by name.
//!
//! Workers are the substitutable generation units a stage delegates to:
//! the actual prompting and model calls live outside the core, behind the
//! [`Worker`] trait. The engine only ever sees opaque JSON in and out.

use crate::errors::WorkerError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Capability names for the built-in SDLC pipeline shape.
pub mod capabilities {
    /// Analyzes the input API specification.
    pub const ANALYZE_SPEC: &str = "analyze_spec";
    /// Generates user stories from the analysis.
    pub const GENERATE_STORIES: &str = "generate_stories";
    /// Generates application code from the stories.
    pub const GENERATE_CODE: &str = "generate_code";
    /// Generates unit tests for the code.
    pub const GENERATE_TESTS: &str = "generate_tests";
    /// Generates container and deployment artifacts.
    pub const GENERATE_CONTAINER: &str = "generate_container";
    /// Generates production monitoring configuration.
    pub const GENERATE_MONITOR_CONFIG: &str = "generate_monitor_config";
    /// Generates a setup guide for the generated project.
    pub const GENERATE_SETUP_GUIDE: &str = "generate_setup_guide";
}

/// Input handed to a worker for one invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerInput {
    /// Output of the previous succeeded stage, or the run's original input
    /// for the first stage.
    pub payload: serde_json::Value,
    /// Opaque generation parameters (model settings, framework selection)
    /// merged from pipeline and stage configuration. Never interpreted by
    /// the core.
    #[serde(default)]
    pub params: serde_json::Value,
}

impl WorkerInput {
    /// Creates an input with no parameters.
    #[must_use]
    pub fn new(payload: serde_json::Value) -> Self {
        Self {
            payload,
            params: serde_json::Value::Null,
        }
    }

    /// Sets the opaque parameters.
    #[must_use]
    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = params;
        self
    }
}

/// Output returned by a successful worker invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerOutput {
    /// The produced payload, threaded into the next stage.
    pub payload: serde_json::Value,
}

impl WorkerOutput {
    /// Wraps a payload.
    #[must_use]
    pub fn new(payload: serde_json::Value) -> Self {
        Self { payload }
    }
}

/// A unit of generation work bound to a stage.
///
/// Implementations must tolerate being abandoned mid-call: on timeout the
/// engine drops the future and stops waiting.
#[async_trait]
pub trait Worker: Send + Sync + Debug {
    /// The capability name this worker is registered under.
    fn capability(&self) -> &str;

    /// Performs one unit of work.
    async fn run(&self, input: WorkerInput) -> Result<WorkerOutput, WorkerError>;
}

/// Named set of worker capabilities available to registry construction.
///
/// Populated once at startup; the stage registry resolves capability names
/// against it when a pipeline is built.
#[derive(Debug, Clone, Default)]
pub struct WorkerRegistry {
    workers: HashMap<String, Arc<dyn Worker>>,
}

impl WorkerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a worker under its capability name.
    ///
    /// Registering the same capability twice replaces the earlier worker;
    /// the last registration wins.
    pub fn register(&mut self, worker: Arc<dyn Worker>) {
        self.workers.insert(worker.capability().to_string(), worker);
    }

    /// Resolves a capability by name.
    #[must_use]
    pub fn get(&self, capability: &str) -> Option<Arc<dyn Worker>> {
        self.workers.get(capability).cloned()
    }

    /// Returns true if the capability is registered.
    #[must_use]
    pub fn contains(&self, capability: &str) -> bool {
        self.workers.contains_key(capability)
    }

    /// Number of registered capabilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// Returns true if no capability is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}
