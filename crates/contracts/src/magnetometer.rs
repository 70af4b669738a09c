//! MagnetometerSource trait - streaming 3-axis field samples
//!
//! Mirrors the platform sensor API: capability check first, then a
//! callback-based `watch` returning a `Subscription`.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Subscription;

/// Instantaneous magnetic field vector (device frame, sensor units)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMagnetometerSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl RawMagnetometerSample {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// All three components are finite numbers
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Magnetometer data callback type
pub type MagnetometerCallback = Arc<dyn Fn(RawMagnetometerSample) + Send + Sync>;

/// Magnetometer data source trait
///
/// Implemented by platform sensors, mocks and replay sources.
///
/// # Example
///
/// ```ignore
/// if source.is_available() {
///     source.set_update_interval(Duration::from_millis(100));
///     let subscription = source.watch(Arc::new(|sample| tracker.on_sample(&sample, now)));
///     // ... later, exactly once:
///     subscription.unsubscribe();
/// }
/// ```
pub trait MagnetometerSource: Send + Sync {
    /// Source name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Capability check, must be consulted before `watch`
    fn is_available(&self) -> bool;

    /// Requested delivery interval
    fn set_update_interval(&self, interval: Duration);

    /// Start delivering samples to `callback`
    ///
    /// The stream stops when the returned subscription is unsubscribed or dropped.
    fn watch(&self, callback: MagnetometerCallback) -> Subscription;
}
