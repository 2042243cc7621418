//! Error types for the specforge pipeline core.
//!
//! Construction-time problems surface as [`ConfigError`] before any stage
//! runs. Stage-level failures are data: they are recorded on the owning
//! stage result as a [`StageFailure`] and never propagate as errors out of
//! the run controller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error raised while building a stage registry from configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// A stage referenced a worker capability that is not registered.
    #[error("stage '{stage}' references unknown worker capability '{capability}'")]
    UnknownCapability {
        /// The stage whose binding failed.
        stage: String,
        /// The capability name that could not be resolved.
        capability: String,
    },

    /// A stage was configured with a timeout that is zero, negative, or NaN.
    #[error("stage '{stage}' has non-positive timeout {timeout_secs}s")]
    NonPositiveTimeout {
        /// The misconfigured stage.
        stage: String,
        /// The rejected timeout value in seconds.
        timeout_secs: f64,
    },

    /// Two stages share a name.
    #[error("duplicate stage name '{stage}'")]
    DuplicateStage {
        /// The colliding name.
        stage: String,
    },

    /// The configuration lists no stages.
    #[error("pipeline configuration has no stages")]
    EmptyPipeline,

    /// A resume point names a stage that is not in the configuration.
    #[error("unknown stage '{stage}' requested as starting point")]
    UnknownStage {
        /// The requested stage name.
        stage: String,
    },
}

/// The failure recorded on a stage result when a stage does not succeed.
///
/// Serializable so a terminal run can be persisted or shipped to a UI as-is.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageFailure {
    /// The stage's worker reported an error.
    #[error("worker for stage '{stage}' failed: {message}")]
    Worker {
        /// The failing stage.
        stage: String,
        /// The worker's error message.
        message: String,
    },

    /// The stage exceeded its configured timeout and was abandoned.
    #[error("stage '{stage}' timed out after {timeout_secs}s")]
    Timeout {
        /// The failing stage.
        stage: String,
        /// The configured bound in seconds.
        timeout_secs: f64,
    },
}

impl StageFailure {
    /// Creates a worker failure for a stage.
    #[must_use]
    pub fn worker(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Worker {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Creates a timeout failure for a stage.
    #[must_use]
    pub fn timeout(stage: impl Into<String>, timeout_secs: f64) -> Self {
        Self::Timeout {
            stage: stage.into(),
            timeout_secs,
        }
    }

    /// The stage this failure belongs to.
    #[must_use]
    pub fn stage(&self) -> &str {
        match self {
            Self::Worker { stage, .. } | Self::Timeout { stage, .. } => stage,
        }
    }

    /// Returns true for timeout failures.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Error returned by a worker capability.
///
/// Workers are external collaborators; their internals are opaque to the
/// core. A message is mandatory, structured details are optional.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct WorkerError {
    /// Human-readable description of the failure.
    pub message: String,
    /// Optional structured detail (provider response, offending excerpt).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl WorkerError {
    /// Creates a worker error from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
        }
    }

    /// Attaches structured details.
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<anyhow::Error> for WorkerError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(format!("{err:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::UnknownCapability {
            stage: "generate_code".to_string(),
            capability: "codegen".to_string(),
        };
        assert!(err.to_string().contains("generate_code"));
        assert!(err.to_string().contains("codegen"));

        let err = ConfigError::NonPositiveTimeout {
            stage: "analyze_spec".to_string(),
            timeout_secs: -1.0,
        };
        assert!(err.to_string().contains("-1"));
    }

    #[test]
    fn test_stage_failure_accessors() {
        let failure = StageFailure::worker("generate_stories", "empty response");
        assert_eq!(failure.stage(), "generate_stories");
        assert!(!failure.is_timeout());

        let failure = StageFailure::timeout("generate_code", 30.0);
        assert_eq!(failure.stage(), "generate_code");
        assert!(failure.is_timeout());
        assert!(failure.to_string().contains("30"));
    }

    #[test]
    fn test_stage_failure_serialize_tagged() {
        let failure = StageFailure::timeout("generate_tests", 5.0);
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["kind"], "timeout");
        assert_eq!(json["stage"], "generate_tests");

        let back: StageFailure = serde_json::from_value(json).unwrap();
        assert_eq!(back, failure);
    }

    #[test]
    fn test_worker_error_from_anyhow() {
        let inner = anyhow::anyhow!("provider returned 429");
        let err: WorkerError = inner.into();
        assert!(err.message.contains("429"));
        assert!(err.details.is_none());
    }

    #[test]
    fn test_worker_error_details() {
        let err = WorkerError::new("bad payload")
            .with_details(serde_json::json!({"excerpt": "```json"}));
        assert_eq!(err.details.unwrap()["excerpt"], "```json");
    }
}
