//! # Specforge
//!
//! A sequential pipeline orchestration engine for SDLC artifact generation:
//! analyze an API specification, then generate user stories, application
//! code, tests, and deployment artifacts, each step performed by a
//! substitutable worker.
//!
//! The crate owns the orchestration only: advancing stages in order,
//! recording per-stage outcomes, propagating failures, and exporting
//! consistent snapshots for visualization. Workers, rendering, and
//! packaging are external collaborators behind narrow traits.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use specforge::prelude::*;
//! use std::sync::Arc;
//!
//! let mut workers = WorkerRegistry::new();
//! workers.register(Arc::new(MyAnalyzeWorker::new()));
//! // ... register the remaining capabilities ...
//!
//! let controller = RunController::new(workers);
//! let run = controller.execute(&PipelineConfig::sdlc(), spec_json).await?;
//! let model = snapshot(&run);
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod controller;
pub mod core;
pub mod engine;
pub mod errors;
pub mod events;
pub mod observability;
pub mod registry;
pub mod run;
pub mod snapshot;
pub mod testing;
pub mod util;
pub mod workers;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{GenerationOptions, PipelineConfig, StageConfig};
    pub use crate::controller::RunController;
    pub use crate::core::{ItemCountRule, RunStatus, StageResult, StageStatus};
    pub use crate::engine::PipelineEngine;
    pub use crate::errors::{ConfigError, StageFailure, WorkerError};
    pub use crate::events::{
        CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink, RunEvent,
        RunEventKind,
    };
    pub use crate::registry::{StageDefinition, StageRegistry};
    pub use crate::run::PipelineRun;
    pub use crate::snapshot::{snapshot, StageNode, VisualizationModel};
    pub use crate::workers::{
        capabilities, Worker, WorkerInput, WorkerOutput, WorkerRegistry,
    };
}
