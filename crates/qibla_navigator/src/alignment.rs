//! Alignment classification between Qibla bearing and device heading

use contracts::{AlignmentTier, HeadingReading};

use crate::geo::circular_delta;

/// Upper bounds (exclusive) of the circular delta per tier, degrees
pub const PERFECT_BELOW_DEG: f64 = 5.0;
pub const GOOD_BELOW_DEG: f64 = 15.0;
pub const FAIR_BELOW_DEG: f64 = 30.0;

/// Classify a bearing/heading pair
///
/// Non-finite input counts as unavailable and yields `Calibrating`.
pub fn classify(bearing_deg: f64, heading_deg: f64) -> AlignmentTier {
    if !bearing_deg.is_finite() || !heading_deg.is_finite() {
        return AlignmentTier::Calibrating;
    }
    tier_for_delta(circular_delta(bearing_deg, heading_deg))
}

/// Classify when either side may still be unknown
///
/// A missing bearing or heading (pre-calibration, no fix yet) yields `Calibrating`.
pub fn classify_optional(bearing_deg: Option<f64>, heading_deg: Option<f64>) -> AlignmentTier {
    match (bearing_deg, heading_deg) {
        (Some(bearing), Some(heading)) => classify(bearing, heading),
        _ => AlignmentTier::Calibrating,
    }
}

/// Tier for an already computed circular delta
pub fn tier_for_delta(delta_deg: f64) -> AlignmentTier {
    if delta_deg < PERFECT_BELOW_DEG {
        AlignmentTier::Perfect
    } else if delta_deg < GOOD_BELOW_DEG {
        AlignmentTier::Good
    } else if delta_deg < FAIR_BELOW_DEG {
        AlignmentTier::Fair
    } else {
        AlignmentTier::Poor
    }
}

/// Build the published heading reading
pub fn heading_reading(
    bearing_deg: Option<f64>,
    heading_deg: Option<f64>,
    calibrating: bool,
) -> HeadingReading {
    let delta_deg = match (bearing_deg, heading_deg) {
        (Some(bearing), Some(heading)) if bearing.is_finite() && heading.is_finite() => {
            Some(circular_delta(bearing, heading))
        }
        _ => None,
    };
    HeadingReading {
        heading_deg,
        bearing_deg,
        delta_deg,
        tier: classify_optional(bearing_deg, heading_deg),
        calibrating,
    }
}
