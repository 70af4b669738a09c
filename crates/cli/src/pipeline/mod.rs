//! Pipeline orchestration module.

mod emitter;
mod orchestrator;
mod stats;
mod tasks;
mod timetable;

pub use emitter::FrameEmitter;
pub use orchestrator::{
    Collaborators, Orchestrator, OrchestratorConfig, OrchestratorHandle, OrchestratorReport,
};
pub use stats::RunStats;
pub use tasks::{
    HeadingStats, LocationStats, ObserverDecision, ObserverFilter, ScheduleStats,
};
pub use timetable::ConfiguredTimetable;
