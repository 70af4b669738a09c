//! # Ingestion Pipeline
//!
//! Sensor and location ingestion.
//!
//! Responsibilities:
//! - Attach magnetometer / location sources (capability check first)
//! - Fan their callbacks into one bounded `SensorEvent` channel
//! - Backpressure management and drop policy
//! - Mock, replay and file-backed collaborators for tests and the CLI
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{IngestionPipeline, MockMagnetometer};
//!
//! let mut pipeline = IngestionPipeline::new(100);
//! pipeline.attach_magnetometer(&MockMagnetometer::fixed(90.0), Duration::from_millis(100))?;
//! let rx = pipeline.take_receiver().unwrap();
//! while let Ok(event) = rx.recv().await {
//!     // Process event
//! }
//! ```

mod backpressure;
mod config;
mod error;
mod event;
mod pipeline;
pub mod sources;

// Re-exports
pub use backpressure::EventSender;
pub use config::{BackpressureConfig, DropPolicy, IngestionMetrics, MetricsSnapshot};
pub use error::{IngestionError, Result};
pub use event::SensorEvent;

/// Receive side of the fan-in channel
pub type EventReceiver = async_channel::Receiver<SensorEvent>;
pub use pipeline::IngestionPipeline;
pub use sources::{
    HeadingPattern, JsonFileTimetableProvider, MockMagnetometer, MockMagnetometerConfig,
    ReplayConfig, ReplayMagnetometer, ScriptedLocationSource, StaticLocationSource,
    StaticTimetableProvider,
};
