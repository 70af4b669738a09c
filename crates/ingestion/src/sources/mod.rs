//! Collaborator implementations: mock, replay and file-backed sources

mod location;
mod magnetometer;
mod stream;
mod timetable;

pub use location::{ScriptedLocationSource, StaticLocationSource};
pub use magnetometer::{
    HeadingPattern, MockMagnetometer, MockMagnetometerConfig, ReplayConfig, ReplayMagnetometer,
};
pub use timetable::{JsonFileTimetableProvider, StaticTimetableProvider};
