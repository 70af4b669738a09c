//! NavigatorBlueprint - Config Loader output
//!
//! Describes the complete navigator configuration: fallback observer,
//! location and magnetometer cadence, schedule tick, timetable source,
//! output routing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::{GeoPoint, RawPrayerEntry, WatchOptions, KAABA};

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete navigator configuration blueprint
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NavigatorBlueprint {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Fallback observer when no location fix is available
    #[serde(default)]
    pub observer: ObserverConfig,

    /// Location polling
    #[serde(default)]
    pub location: LocationConfig,

    /// Magnetometer sampling and calibration
    #[serde(default)]
    pub magnetometer: MagnetometerConfig,

    /// Prayer status recomputation
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Raw provider response file (JSON), read when no inline timetable is given
    #[serde(default)]
    pub timetable_file: Option<PathBuf>,

    /// Inline raw timetable (ordered)
    #[serde(default)]
    pub timetable: Vec<RawPrayerEntry>,

    /// Output routing
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

/// Observer point (WGS-84 degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObserverConfig {
    #[serde(default = "default_latitude")]
    pub latitude: f64,

    #[serde(default = "default_longitude")]
    pub longitude: f64,
}

fn default_latitude() -> f64 {
    KAABA.latitude
}

fn default_longitude() -> f64 {
    KAABA.longitude
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            latitude: default_latitude(),
            longitude: default_longitude(),
        }
    }
}

impl ObserverConfig {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Location polling config
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Source cadence (ms)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Movements under this distance (meters) are ignored
    #[serde(default = "default_min_distance_m")]
    pub min_distance_m: f64,
}

fn default_poll_interval_ms() -> u64 {
    5000
}

fn default_min_distance_m() -> f64 {
    10.0
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            min_distance_m: default_min_distance_m(),
        }
    }
}

impl LocationConfig {
    pub fn watch_options(&self) -> WatchOptions {
        WatchOptions {
            interval: Duration::from_millis(self.poll_interval_ms),
            min_distance_m: self.min_distance_m,
        }
    }
}

/// Magnetometer sampling and calibration config
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagnetometerConfig {
    /// Requested sample interval (ms)
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,

    /// Dead-zone threshold outside calibration
    #[serde(default = "default_fine_threshold")]
    pub fine_threshold: f64,

    /// Dead-zone threshold during calibration
    #[serde(default = "default_coarse_threshold")]
    pub coarse_threshold: f64,

    /// Calibration window (seconds)
    #[serde(default = "default_calibration_window_s")]
    pub calibration_window_s: f64,

    /// Exponential smoothing factor in (0, 1]; 1.0 = raw heading
    #[serde(default = "default_smoothing")]
    pub smoothing: f64,

    /// Start in the calibration phase
    #[serde(default)]
    pub calibrate_on_start: bool,
}

/// Upper bound for `calibration_window_s` (one hour)
pub const MAX_CALIBRATION_WINDOW_S: f64 = 3600.0;

fn default_update_interval_ms() -> u64 {
    100
}

fn default_fine_threshold() -> f64 {
    2.0
}

fn default_coarse_threshold() -> f64 {
    5.0
}

fn default_calibration_window_s() -> f64 {
    10.0
}

fn default_smoothing() -> f64 {
    1.0
}

impl Default for MagnetometerConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: default_update_interval_ms(),
            fine_threshold: default_fine_threshold(),
            coarse_threshold: default_coarse_threshold(),
            calibration_window_s: default_calibration_window_s(),
            smoothing: default_smoothing(),
            calibrate_on_start: false,
        }
    }
}

impl MagnetometerConfig {
    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }

    pub fn calibration_window(&self) -> Duration {
        Duration::try_from_secs_f64(self.calibration_window_s.min(MAX_CALIBRATION_WINDOW_S))
            .unwrap_or(Duration::ZERO)
    }
}

/// Prayer status recomputation config
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Tick interval (ms)
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

fn default_tick_interval_ms() -> u64 {
    1000
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl ScheduleConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Sink output config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Queue capacity
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Type-specific params
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    100
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Log output
    Log,
    /// JSON-lines file output
    File,
}
