//! The three long-lived orchestrator tasks: location, heading, schedule

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use contracts::{ContractError, GeoPoint, NavigationUpdate, QiblaFix, Timetable, TimetableProvider};
use ingestion::{EventReceiver, SensorEvent};
use prayer_schedule::compute_status;
use qibla_navigator::{
    compute_qibla_bearing, haversine_km, heading_reading, qibla_fix, HeadingTracker,
};
use tokio::sync::{watch, Notify};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

use super::emitter::FrameEmitter;

/// Outcome of offering a new observer point
#[derive(Debug)]
pub enum ObserverDecision {
    /// Moved far enough (or first point); new fix computed
    Accepted(QiblaFix),
    /// Closer than the movement threshold to the last accepted point
    Filtered { moved_m: f64 },
    /// Non-finite or out-of-range coordinate
    Invalid(ContractError),
}

/// Movement filter in front of the observer point
#[derive(Debug, Clone)]
pub struct ObserverFilter {
    min_distance_m: f64,
    last_accepted: Option<GeoPoint>,
}

impl ObserverFilter {
    pub fn new(min_distance_m: f64) -> Self {
        Self {
            min_distance_m,
            last_accepted: None,
        }
    }

    pub fn offer(&mut self, point: GeoPoint) -> ObserverDecision {
        let point = match point.validated() {
            Ok(point) => point,
            Err(err) => return ObserverDecision::Invalid(err),
        };
        if let Some(last) = self.last_accepted {
            let moved_m = haversine_km(last, point) * 1000.0;
            if moved_m < self.min_distance_m {
                return ObserverDecision::Filtered { moved_m };
            }
        }
        match qibla_fix(point) {
            Ok(fix) => {
                self.last_accepted = Some(point);
                ObserverDecision::Accepted(fix)
            }
            Err(err) => ObserverDecision::Invalid(err),
        }
    }

    pub fn last_accepted(&self) -> Option<GeoPoint> {
        self.last_accepted
    }
}

/// Location task counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocationStats {
    pub accepted: u64,
    pub filtered: u64,
    pub invalid: u64,
}

/// Location task: movement filter, observer publication, Qibla fixes
#[instrument(name = "orchestrator_location_task", skip_all, fields(initial = %initial))]
pub(crate) async fn location_task(
    mut filter: ObserverFilter,
    initial: GeoPoint,
    events: Option<EventReceiver>,
    observer: watch::Sender<Option<GeoPoint>>,
    emitter: Arc<FrameEmitter>,
    token: CancellationToken,
) -> LocationStats {
    let mut stats = LocationStats::default();

    let mut handle_point = |point: GeoPoint, stats: &mut LocationStats| {
        let decision = filter.offer(point);
        observability::record_location_update(matches!(decision, ObserverDecision::Accepted(_)));
        match decision {
            ObserverDecision::Accepted(fix) => {
                stats.accepted += 1;
                observer.send_replace(Some(fix.observer));
                debug!(observer = %fix.observer, bearing = fix.bearing_deg, "observer accepted");
                Some(NavigationUpdate::Qibla { fix })
            }
            ObserverDecision::Filtered { moved_m } => {
                stats.filtered += 1;
                trace!(moved_m, "observer movement below threshold");
                None
            }
            ObserverDecision::Invalid(err) => {
                stats.invalid += 1;
                warn!(error = %err, "observer point rejected");
                Some(NavigationUpdate::QiblaUnavailable {
                    reason: err.to_string(),
                })
            }
        }
    };

    if let Some(update) = handle_point(initial, &mut stats) {
        if !emitter.emit(update).await {
            return stats;
        }
    }

    // No stream: keep the initial observer published until shutdown
    let Some(events) = events else {
        token.cancelled().await;
        debug!(?stats, "location task stopped");
        return stats;
    };

    loop {
        let event = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            event = events.recv() => event,
        };
        match event {
            Ok(SensorEvent::Location { point }) => {
                if let Some(update) = handle_point(point, &mut stats) {
                    if !emitter.emit(update).await {
                        break;
                    }
                }
            }
            Ok(other) => trace!(kind = other.kind(), "ignored event"),
            Err(_) => break,
        }
    }

    debug!(?stats, "location task stopped");
    stats
}

/// Heading task counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeadingStats {
    pub sensor_available: bool,
    pub accepted: u64,
    pub rejected: u64,
    pub calibrations: u64,
}

/// Heading task: sole owner of the `HeadingTracker`
///
/// `events` is `None` when the magnetometer failed its capability check; a
/// single `SensorUnavailable` frame is emitted and the task ends.
#[instrument(name = "orchestrator_heading_task", skip_all, fields(sensor = %sensor_name))]
#[allow(clippy::too_many_arguments)]
pub(crate) async fn heading_task(
    mut tracker: HeadingTracker,
    sensor_name: String,
    events: Option<EventReceiver>,
    mut observer: watch::Receiver<Option<GeoPoint>>,
    recalibrate: Arc<Notify>,
    calibrate_on_start: bool,
    emitter: Arc<FrameEmitter>,
    token: CancellationToken,
) -> HeadingStats {
    let Some(events) = events else {
        warn!(sensor = %sensor_name, "magnetometer unavailable, alignment stays calibrating");
        emitter
            .emit(NavigationUpdate::SensorUnavailable {
                sensor: sensor_name,
            })
            .await;
        return HeadingStats::default();
    };

    let mut stats = HeadingStats {
        sensor_available: true,
        ..Default::default()
    };
    let mut bearing = current_bearing(&mut observer);

    if calibrate_on_start {
        tracker.begin_calibration(now());
        stats.calibrations += 1;
    }

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = recalibrate.notified() => {
                let at = now();
                tracker.begin_calibration(at);
                stats.calibrations += 1;
                let reading = heading_reading(bearing, tracker.heading(), tracker.is_calibrating(at));
                if !emitter.emit(NavigationUpdate::Heading { reading }).await {
                    break;
                }
            }
            event = events.recv() => {
                let (sample, received_at) = match event {
                    Ok(SensorEvent::Magnetometer { sample, received_at }) => (sample, received_at),
                    Ok(other) => {
                        trace!(kind = other.kind(), "ignored event");
                        continue;
                    }
                    Err(_) => break,
                };

                if observer.has_changed().unwrap_or(false) {
                    bearing = current_bearing(&mut observer);
                }

                let rejected_before = tracker.rejected_samples();
                let heading = tracker.on_sample(&sample, received_at);
                if tracker.rejected_samples() > rejected_before {
                    observability::record_heading_rejected(1);
                    continue;
                }

                let reading = heading_reading(bearing, heading, tracker.is_calibrating(received_at));
                if !emitter.emit(NavigationUpdate::Heading { reading }).await {
                    break;
                }
            }
        }
    }

    stats.accepted = tracker.accepted_samples();
    stats.rejected = tracker.rejected_samples();
    debug!(?stats, "heading task stopped");
    stats
}

fn current_bearing(observer: &mut watch::Receiver<Option<GeoPoint>>) -> Option<f64> {
    let point = *observer.borrow_and_update();
    point.and_then(|point| compute_qibla_bearing(point).ok())
}

/// Monotonic time for the calibration window; follows tokio's clock so
/// paused-time tests can drive it
fn now() -> std::time::Instant {
    tokio::time::Instant::now().into_std()
}

/// Schedule task counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleStats {
    pub ticks: u64,
    pub fetches: u64,
    pub fetch_failures: u64,
    pub no_data_ticks: u64,
}

/// Schedule task: periodic prayer status, timetable refresh on date or observer change
#[instrument(name = "orchestrator_schedule_task", skip_all, fields(tick_ms = tick.as_millis() as u64))]
pub(crate) async fn schedule_task<T>(
    provider: Arc<T>,
    observer: watch::Receiver<Option<GeoPoint>>,
    fallback: GeoPoint,
    tick: Duration,
    emitter: Arc<FrameEmitter>,
    token: CancellationToken,
) -> ScheduleStats
where
    T: TimetableProvider + Sync + ?Sized,
{
    let mut stats = ScheduleStats::default();
    let mut timetable: Option<Timetable> = None;
    let mut fetched_for: Option<(NaiveDate, GeoPoint)> = None;

    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = interval.tick() => {}
        }
        stats.ticks += 1;

        let now = emitter.clock().now();
        let point = (*observer.borrow()).unwrap_or(fallback);
        let key = (now.date(), point);

        if fetched_for != Some(key) {
            // one attempt per (date, observer); failures wait for the next change
            fetched_for = Some(key);
            stats.fetches += 1;
            let result = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                result = provider.fetch(key.0, point) => result,
            };
            match result {
                Ok(fresh) => {
                    info!(
                        provider = provider.name(),
                        date = %key.0,
                        observer = %point,
                        entries = fresh.len(),
                        "timetable refreshed"
                    );
                    timetable = Some(fresh);
                }
                Err(err) => {
                    stats.fetch_failures += 1;
                    warn!(
                        provider = provider.name(),
                        error = %err,
                        kept_previous = timetable.is_some(),
                        "timetable fetch failed"
                    );
                }
            }
        }

        let status = timetable.as_ref().and_then(|t| compute_status(t, now));
        if status.is_none() {
            stats.no_data_ticks += 1;
        }
        if !emitter.emit(NavigationUpdate::Prayer { status }).await {
            break;
        }
    }

    debug!(?stats, "schedule task stopped");
    stats
}
