//! # Qibla Navigator
//!
//! Direction-to-Kaaba engine.
//!
//! 负责：
//! - Great-circle bearing and haversine distance to the Kaaba
//! - Smoothed compass heading from raw magnetometer samples (dead zone + calibration)
//! - Alignment tier between bearing and heading
//!
//! ## 使用示例
//!
//! ```ignore
//! use qibla_navigator::{classify_optional, qibla_fix, HeadingTracker};
//!
//! let fix = qibla_fix(observer)?;
//! let mut tracker = HeadingTracker::default();
//! let heading = tracker.on_sample(&sample, Instant::now());
//! let tier = classify_optional(Some(fix.bearing_deg), heading);
//! ```

mod alignment;
mod bearing;
mod geo;
mod heading;

pub use alignment::{
    classify, classify_optional, heading_reading, tier_for_delta, FAIR_BELOW_DEG,
    GOOD_BELOW_DEG, PERFECT_BELOW_DEG,
};
pub use bearing::{compute_distance_km, compute_qibla_bearing, qibla_fix};
pub use geo::{
    circular_delta, haversine_km, initial_bearing, normalize_degrees, signed_delta,
    EARTH_RADIUS_KM,
};
pub use heading::{CalibrationPhase, HeadingTracker, HeadingTrackerConfig};

// Re-export contracts types
pub use contracts::{AlignmentTier, GeoPoint, HeadingReading, QiblaFix, KAABA};
