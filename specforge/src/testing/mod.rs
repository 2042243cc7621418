//! Mock workers for exercising the pipeline without real generation.
//!
//! These are part of the public API so downstream crates can test their
//! own pipeline configurations against scripted outcomes.

use crate::errors::WorkerError;
use crate::workers::{Worker, WorkerInput, WorkerOutput};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;

/// Returns a fixed payload on every invocation.
#[derive(Debug)]
pub struct StaticWorker {
    capability: String,
    payload: serde_json::Value,
}

impl StaticWorker {
    /// Creates a worker that always returns `payload`.
    #[must_use]
    pub fn new(capability: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            capability: capability.into(),
            payload,
        }
    }
}

#[async_trait]
impl Worker for StaticWorker {
    fn capability(&self) -> &str {
        &self.capability
    }

    async fn run(&self, _input: WorkerInput) -> Result<WorkerOutput, WorkerError> {
        Ok(WorkerOutput::new(self.payload.clone()))
    }
}

/// Returns its input payload unchanged. Useful for asserting what a stage
/// was fed.
#[derive(Debug)]
pub struct EchoWorker {
    capability: String,
}

impl EchoWorker {
    /// Creates an echo worker.
    #[must_use]
    pub fn new(capability: impl Into<String>) -> Self {
        Self {
            capability: capability.into(),
        }
    }
}

#[async_trait]
impl Worker for EchoWorker {
    fn capability(&self) -> &str {
        &self.capability
    }

    async fn run(&self, input: WorkerInput) -> Result<WorkerOutput, WorkerError> {
        Ok(WorkerOutput::new(input.payload))
    }
}

/// Fails every invocation with a fixed message.
#[derive(Debug)]
pub struct FailingWorker {
    capability: String,
    message: String,
}

impl FailingWorker {
    /// Creates a worker that always fails with `message`.
    #[must_use]
    pub fn new(capability: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            capability: capability.into(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl Worker for FailingWorker {
    fn capability(&self) -> &str {
        &self.capability
    }

    async fn run(&self, _input: WorkerInput) -> Result<WorkerOutput, WorkerError> {
        Err(WorkerError::new(self.message.clone()))
    }
}

/// Sleeps for a fixed delay, then returns a payload. For exercising
/// mid-run observation and generous timeouts.
#[derive(Debug)]
pub struct SlowWorker {
    capability: String,
    payload: serde_json::Value,
    delay_ms: u64,
}

impl SlowWorker {
    /// Creates a worker that answers after `delay_ms` milliseconds.
    #[must_use]
    pub fn new(
        capability: impl Into<String>,
        payload: serde_json::Value,
        delay_ms: u64,
    ) -> Self {
        Self {
            capability: capability.into(),
            payload,
            delay_ms,
        }
    }
}

#[async_trait]
impl Worker for SlowWorker {
    fn capability(&self) -> &str {
        &self.capability
    }

    async fn run(&self, _input: WorkerInput) -> Result<WorkerOutput, WorkerError> {
        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        Ok(WorkerOutput::new(self.payload.clone()))
    }
}

/// Never answers within any sane test timeout. For exercising the
/// timeout-to-`TimeoutError` path.
#[derive(Debug)]
pub struct HangingWorker {
    capability: String,
}

impl HangingWorker {
    /// Creates a hanging worker.
    #[must_use]
    pub fn new(capability: impl Into<String>) -> Self {
        Self {
            capability: capability.into(),
        }
    }
}

#[async_trait]
impl Worker for HangingWorker {
    fn capability(&self) -> &str {
        &self.capability
    }

    async fn run(&self, _input: WorkerInput) -> Result<WorkerOutput, WorkerError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(WorkerOutput::new(serde_json::Value::Null))
    }
}

/// Records every input it receives and echoes a fixed payload.
#[derive(Debug)]
pub struct RecordingWorker {
    capability: String,
    payload: serde_json::Value,
    inputs: Mutex<Vec<WorkerInput>>,
}

impl RecordingWorker {
    /// Creates a recording worker returning `payload`.
    #[must_use]
    pub fn new(capability: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            capability: capability.into(),
            payload,
            inputs: Mutex::new(Vec::new()),
        }
    }

    /// Number of invocations so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.inputs.lock().len()
    }

    /// The recorded inputs, in call order.
    #[must_use]
    pub fn inputs(&self) -> Vec<WorkerInput> {
        self.inputs.lock().clone()
    }
}

#[async_trait]
impl Worker for RecordingWorker {
    fn capability(&self) -> &str {
        &self.capability
    }

    async fn run(&self, input: WorkerInput) -> Result<WorkerOutput, WorkerError> {
        self.inputs.lock().push(input);
        Ok(WorkerOutput::new(self.payload.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_static_worker() {
        let worker = StaticWorker::new("cap", json!({"x": 1}));
        let output = worker.run(WorkerInput::new(json!(null))).await.unwrap();
        assert_eq!(output.payload, json!({"x": 1}));
    }

    #[tokio::test]
    async fn test_echo_worker() {
        let worker = EchoWorker::new("cap");
        let output = worker.run(WorkerInput::new(json!([1, 2]))).await.unwrap();
        assert_eq!(output.payload, json!([1, 2]));
    }

    #[tokio::test]
    async fn test_failing_worker() {
        let worker = FailingWorker::new("cap", "deliberate");
        let err = worker.run(WorkerInput::new(json!(null))).await.unwrap_err();
        assert_eq!(err.message, "deliberate");
    }

    #[tokio::test]
    async fn test_recording_worker_tracks_calls() {
        let worker = RecordingWorker::new("cap", json!("out"));
        assert_eq!(worker.call_count(), 0);

        let input = WorkerInput::new(json!("first")).with_params(json!({"k": "v"}));
        worker.run(input).await.unwrap();
        worker.run(WorkerInput::new(json!("second"))).await.unwrap();

        assert_eq!(worker.call_count(), 2);
        let inputs = worker.inputs();
        assert_eq!(inputs[0].payload, json!("first"));
        assert_eq!(inputs[0].params, json!({"k": "v"}));
        assert_eq!(inputs[1].payload, json!("second"));
    }
}
