//! Heading tracker: raw magnetometer samples -> smoothed compass heading
//!
//! Simplified magnetic heading (no declination correction). Calibration is a
//! two-phase timed state machine: Idle -> Calibrating(window) -> Idle, with a
//! coarse dead-zone threshold while calibrating and a fine one otherwise.
//!
//! Time is passed in by the caller so tests drive the calibration window
//! without sleeping.

use std::time::{Duration, Instant};

use contracts::{MagnetometerConfig, RawMagnetometerSample};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::geo::{normalize_degrees, signed_delta};

const MAX_CALIBRATION_WINDOW: Duration = Duration::from_secs(3600);

/// HeadingTracker tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingTrackerConfig {
    /// Dead-zone threshold when idle
    pub fine_threshold: f64,
    /// Dead-zone threshold while calibrating
    pub coarse_threshold: f64,
    /// Calibration window length
    pub calibration_window: Duration,
    /// Exponential smoothing factor in (0, 1]; 1.0 = raw heading
    pub smoothing: f64,
}

impl Default for HeadingTrackerConfig {
    fn default() -> Self {
        Self::from(&MagnetometerConfig::default())
    }
}

impl From<&MagnetometerConfig> for HeadingTrackerConfig {
    fn from(config: &MagnetometerConfig) -> Self {
        Self {
            fine_threshold: config.fine_threshold,
            coarse_threshold: config.coarse_threshold,
            calibration_window: config.calibration_window(),
            smoothing: config.smoothing,
        }
    }
}

/// Calibration state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalibrationPhase {
    Idle,
    Calibrating { remaining: Duration },
}

/// Stateful heading estimator
///
/// Owned by a single producer; no internal locking.
#[derive(Debug, Clone)]
pub struct HeadingTracker {
    config: HeadingTrackerConfig,
    smoothed_heading: Option<f64>,
    calibrating_until: Option<Instant>,
    accepted: u64,
    rejected: u64,
}

impl HeadingTracker {
    pub fn new(config: HeadingTrackerConfig) -> Self {
        Self {
            config,
            smoothed_heading: None,
            calibrating_until: None,
            accepted: 0,
            rejected: 0,
        }
    }

    /// Consume one sample and return the updated heading in [0, 360)
    ///
    /// Malformed (non-finite) samples are dropped and the last heading is
    /// returned unchanged; `None` only before any valid sample.
    #[instrument(level = "trace", name = "heading_on_sample", skip(self, raw, now))]
    pub fn on_sample(&mut self, raw: &RawMagnetometerSample, now: Instant) -> Option<f64> {
        if !raw.is_finite() {
            self.rejected += 1;
            trace!(?raw, "non-finite magnetometer sample dropped");
            return self.smoothed_heading;
        }

        let threshold = self.calibration_threshold(now);
        let x = dead_zone(raw.x, threshold);
        let y = dead_zone(raw.y, threshold);
        let raw_heading = normalize_degrees(y.atan2(x).to_degrees());

        let heading = match self.smoothed_heading {
            Some(previous) if self.config.smoothing < 1.0 => normalize_degrees(
                previous + self.config.smoothing * signed_delta(previous, raw_heading),
            ),
            _ => raw_heading,
        };

        self.accepted += 1;
        self.smoothed_heading = Some(heading);
        trace!(raw_heading, heading, threshold, "heading updated");
        Some(heading)
    }

    /// Enter (or restart) the coarse calibration window
    ///
    /// Clears the heading so alignment reports Calibrating until the next sample.
    pub fn begin_calibration(&mut self, now: Instant) {
        // Oversized windows overflow Instant; fall back to the one-hour cap
        let until = now
            .checked_add(self.config.calibration_window)
            .or_else(|| now.checked_add(MAX_CALIBRATION_WINDOW))
            .unwrap_or(now);
        debug!(
            window_ms = self.config.calibration_window.as_millis() as u64,
            restarted = self.calibrating_until.is_some_and(|t| t > now),
            "calibration started"
        );
        self.calibrating_until = Some(until);
        self.smoothed_heading = None;
    }

    /// Current calibration phase at `now`
    pub fn phase(&self, now: Instant) -> CalibrationPhase {
        match self.calibrating_until {
            Some(until) if until > now => CalibrationPhase::Calibrating {
                remaining: until - now,
            },
            _ => CalibrationPhase::Idle,
        }
    }

    pub fn is_calibrating(&self, now: Instant) -> bool {
        matches!(self.phase(now), CalibrationPhase::Calibrating { .. })
    }

    /// Dead-zone threshold in effect at `now`
    pub fn calibration_threshold(&self, now: Instant) -> f64 {
        if self.is_calibrating(now) {
            self.config.coarse_threshold
        } else {
            self.config.fine_threshold
        }
    }

    /// Last smoothed heading
    pub fn heading(&self) -> Option<f64> {
        self.smoothed_heading
    }

    pub fn config(&self) -> &HeadingTrackerConfig {
        &self.config
    }

    /// Samples that updated the heading
    pub fn accepted_samples(&self) -> u64 {
        self.accepted
    }

    /// Malformed samples dropped
    pub fn rejected_samples(&self) -> u64 {
        self.rejected
    }
}

impl Default for HeadingTracker {
    fn default() -> Self {
        Self::new(HeadingTrackerConfig::default())
    }
}

fn dead_zone(value: f64, threshold: f64) -> f64 {
    if value.abs() < threshold {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample(x: f64, y: f64) -> RawMagnetometerSample {
        RawMagnetometerSample::new(x, y, 0.0)
    }

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("heading");
        assert!((actual - expected).abs() < 1e-9, "expected {expected}, got {actual}");
    }

    #[test]
    fn raw_heading_from_axes() {
        let mut tracker = HeadingTracker::default();
        let now = Instant::now();
        assert_close(tracker.on_sample(&sample(30.0, 0.0), now), 0.0);
        assert_close(tracker.on_sample(&sample(0.0, 30.0), now), 90.0);
        assert_close(tracker.on_sample(&sample(-30.0, 0.0), now), 180.0);
        assert_close(tracker.on_sample(&sample(0.0, -30.0), now), 270.0);
        assert_close(tracker.on_sample(&sample(20.0, 20.0), now), 45.0);
    }

    #[test]
    fn dead_zone_suppresses_small_components() {
        let mut tracker = HeadingTracker::default();
        let now = Instant::now();
        // |y| < fine threshold (2.0) -> zeroed -> due north
        assert_close(tracker.on_sample(&sample(25.0, 1.5), now), 0.0);
        assert_close(tracker.on_sample(&sample(25.0, 2.0), now), 2.0f64.atan2(25.0).to_degrees());
    }

    #[test]
    fn calibration_uses_coarse_threshold_then_reverts() {
        let mut tracker = HeadingTracker::default();
        let start = Instant::now();
        tracker.begin_calibration(start);
        assert_eq!(tracker.heading(), None);
        assert_eq!(tracker.calibration_threshold(start), 5.0);

        // |y| = 4 is inside the coarse dead zone
        assert_close(tracker.on_sample(&sample(25.0, 4.0), start + Duration::from_secs(3)), 0.0);

        let after = start + Duration::from_secs(10);
        assert_eq!(tracker.phase(after), CalibrationPhase::Idle);
        assert_eq!(tracker.calibration_threshold(after), 2.0);
        let heading = tracker.on_sample(&sample(25.0, 4.0), after).unwrap();
        assert!(heading > 0.0);
    }

    #[test]
    fn new_calibration_restarts_timer() {
        let mut tracker = HeadingTracker::default();
        let start = Instant::now();
        tracker.begin_calibration(start);
        tracker.begin_calibration(start + Duration::from_secs(8));
        assert_eq!(
            tracker.phase(start + Duration::from_secs(12)),
            CalibrationPhase::Calibrating {
                remaining: Duration::from_secs(6)
            }
        );
    }

    #[test]
    fn oversized_window_does_not_overflow() {
        let mut tracker = HeadingTracker::new(HeadingTrackerConfig {
            calibration_window: Duration::MAX,
            ..Default::default()
        });
        let start = Instant::now();
        tracker.begin_calibration(start);
        assert!(tracker.is_calibrating(start + Duration::from_secs(3599)));
        assert!(!tracker.is_calibrating(start + Duration::from_secs(3600)));
    }

    #[test]
    fn malformed_sample_keeps_last_heading() {
        let mut tracker = HeadingTracker::default();
        let now = Instant::now();
        assert_eq!(tracker.on_sample(&sample(f64::NAN, 1.0), now), None);
        tracker.on_sample(&sample(0.0, 30.0), now);
        assert_close(tracker.on_sample(&sample(f64::INFINITY, 0.0), now), 90.0);
        assert_eq!(tracker.rejected_samples(), 2);
        assert_eq!(tracker.accepted_samples(), 1);
    }

    #[test]
    fn smoothing_wraps_through_north() {
        let mut tracker = HeadingTracker::new(HeadingTrackerConfig {
            smoothing: 0.5,
            ..Default::default()
        });
        let now = Instant::now();
        let at = |deg: f64| {
            let rad = deg.to_radians();
            sample(30.0 * rad.cos(), 30.0 * rad.sin())
        };
        assert_close(tracker.on_sample(&at(350.0), now), 350.0);
        // halfway from 350 toward 10 is 0, not 180
        let heading = tracker.on_sample(&at(10.0), now).unwrap();
        assert!(heading < 1e-6 || heading > 360.0 - 1e-6, "got {heading}");
    }

    proptest! {
        #[test]
        fn heading_always_in_range(x in -100f64..100.0, y in -100f64..100.0, alpha in 0.01f64..=1.0) {
            let mut tracker = HeadingTracker::new(HeadingTrackerConfig {
                smoothing: alpha,
                ..Default::default()
            });
            let now = Instant::now();
            tracker.on_sample(&sample(10.0, -10.0), now);
            let heading = tracker.on_sample(&sample(x, y), now).unwrap();
            prop_assert!((0.0..360.0).contains(&heading));
        }
    }
}
