//! Outbound navigation values - what the engines publish to displays and sinks

use std::fmt;
use std::time::Duration;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::GeoPoint;

/// Distance below which the observer is considered to stand at the Kaaba
pub const AT_KAABA_THRESHOLD_KM: f64 = 0.05;

/// Prayer schedule engine output
///
/// "No data" is represented by `Option<PrayerStatus>::None`, never by a
/// partially filled status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrayerStatus {
    /// Prayer whose window is open (the previous one), or the next one when
    /// there is no previous
    pub current_or_next_name: String,

    /// Next prayer strictly after the reference instant
    pub next_name: String,

    /// Instant of the next prayer (may be tomorrow)
    pub next_instant: NaiveDateTime,

    /// Instant of the previous prayer (may be yesterday)
    pub previous_instant: Option<NaiveDateTime>,

    /// Elapsed fraction of the previous -> next window, in [0, 1]
    pub progress_fraction: f64,

    /// Time until the next prayer, never negative
    pub remaining: Duration,
}

/// Remaining time broken down for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemainingTime {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl From<Duration> for RemainingTime {
    fn from(duration: Duration) -> Self {
        let total = duration.as_secs();
        Self {
            hours: total / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
        }
    }
}

impl fmt::Display for RemainingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.hours, self.minutes) {
            (0, 0) => write!(f, "{}s", self.seconds),
            (0, m) => write!(f, "{m}m"),
            (h, m) => write!(f, "{h}h {m}m"),
        }
    }
}

impl PrayerStatus {
    /// `remaining` as hours / minutes / seconds
    pub fn remaining_hms(&self) -> RemainingTime {
        RemainingTime::from(self.remaining)
    }
}

impl fmt::Display for PrayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Next: {}, in {}", self.next_name, self.remaining_hms())
    }
}

/// Discretized closeness between bearing and heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentTier {
    Perfect,
    Good,
    Fair,
    Poor,
    Calibrating,
}

impl AlignmentTier {
    /// All tiers, best first
    pub const ALL: [AlignmentTier; 5] = [
        AlignmentTier::Perfect,
        AlignmentTier::Good,
        AlignmentTier::Fair,
        AlignmentTier::Poor,
        AlignmentTier::Calibrating,
    ];

    /// Stable identifier (metrics labels, JSON)
    pub fn as_str(&self) -> &'static str {
        match self {
            AlignmentTier::Perfect => "perfect",
            AlignmentTier::Good => "good",
            AlignmentTier::Fair => "fair",
            AlignmentTier::Poor => "poor",
            AlignmentTier::Calibrating => "calibrating",
        }
    }

    /// Status pill text
    pub fn label(&self) -> &'static str {
        match self {
            AlignmentTier::Perfect => "Perfectly aligned",
            AlignmentTier::Good => "Almost there",
            AlignmentTier::Fair => "Keep turning",
            AlignmentTier::Poor => "Not aligned",
            AlignmentTier::Calibrating => "Calibrating compass",
        }
    }

    /// Haptic / animation intensity hint in [0, 1]
    pub fn intensity(&self) -> f64 {
        match self {
            AlignmentTier::Perfect => 1.0,
            AlignmentTier::Good => 0.6,
            AlignmentTier::Fair => 0.3,
            AlignmentTier::Poor | AlignmentTier::Calibrating => 0.0,
        }
    }
}

impl fmt::Display for AlignmentTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Bearing and distance from one observer point to the Kaaba
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QiblaFix {
    pub observer: GeoPoint,

    /// Initial great-circle bearing, degrees in [0, 360)
    pub bearing_deg: f64,

    /// Haversine distance, km rounded to 2 decimals
    pub distance_km: f64,
}

impl QiblaFix {
    /// Bearing is meaningless here; displays should hide the arrow
    pub fn is_at_kaaba(&self) -> bool {
        self.distance_km < AT_KAABA_THRESHOLD_KM
    }
}

impl fmt::Display for QiblaFix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Qibla {:.1}° from {}, {:.2} km",
            self.bearing_deg, self.observer, self.distance_km
        )
    }
}

/// Per-sample heading output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadingReading {
    /// Smoothed heading in [0, 360), `None` until the first sample after calibration
    pub heading_deg: Option<f64>,

    /// Current bearing to the Kaaba, if known
    pub bearing_deg: Option<f64>,

    /// Circular bearing/heading difference in [0, 180]
    pub delta_deg: Option<f64>,

    pub tier: AlignmentTier,

    /// Coarse calibration window is active
    pub calibrating: bool,
}

/// One published update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NavigationUpdate {
    /// Prayer status tick (`None` = no data)
    Prayer { status: Option<PrayerStatus> },

    /// New bearing / distance after an accepted observer change
    Qibla { fix: QiblaFix },

    /// Observer coordinate could not be used
    QiblaUnavailable { reason: String },

    /// Heading tracker output
    Heading { reading: HeadingReading },

    /// Sensor failed its capability check (emitted once)
    SensorUnavailable { sensor: String },
}

impl NavigationUpdate {
    /// Stable identifier (metrics labels, logs)
    pub fn kind(&self) -> &'static str {
        match self {
            NavigationUpdate::Prayer { .. } => "prayer",
            NavigationUpdate::Qibla { .. } => "qibla",
            NavigationUpdate::QiblaUnavailable { .. } => "qibla_unavailable",
            NavigationUpdate::Heading { .. } => "heading",
            NavigationUpdate::SensorUnavailable { .. } => "sensor_unavailable",
        }
    }
}

/// Envelope sent to every sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationFrame {
    /// Monotonic sequence number
    pub frame_id: u64,

    /// Local wall-clock time of emission
    pub emitted_at: NaiveDateTime,

    pub update: NavigationUpdate,
}
