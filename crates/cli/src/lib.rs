//! # Qibla Compass
//!
//! Orchestration layer shared by the `qibla-compass` binary and the
//! end-to-end tests.

pub mod pipeline;

pub use pipeline::{
    Collaborators, ConfiguredTimetable, Orchestrator, OrchestratorConfig, OrchestratorHandle,
    OrchestratorReport, RunStats,
};
