//! Orchestrator - wires collaborators, engines and tasks together.
//!
//! Start-up:
//! 1. Initial observer from `LocationSource::current()`, falling back to the
//!    configured observer when the platform refuses.
//! 2. Magnetometer capability check; an unavailable sensor is never subscribed.
//! 3. Location, heading and schedule tasks spawned, each on a child token.
//!
//! `OrchestratorHandle::shutdown` cancels the tasks, unsubscribes every source
//! exactly once and returns the per-task counters.

use std::sync::Arc;
use std::time::Duration;

use contracts::{
    Clock, GeoPoint, LocationSource, MagnetometerSource, NavigationFrame, NavigatorBlueprint,
    TimetableProvider, WatchOptions,
};
use ingestion::{BackpressureConfig, DropPolicy, IngestionError, IngestionPipeline};
use qibla_navigator::{HeadingTracker, HeadingTrackerConfig};
use tokio::sync::{mpsc, watch, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use super::emitter::FrameEmitter;
use super::tasks::{
    heading_task, location_task, schedule_task, HeadingStats, LocationStats, ObserverFilter,
    ScheduleStats,
};

/// Orchestrator settings derived from the blueprint
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Used when the location source fails at start-up
    pub fallback_observer: GeoPoint,
    pub watch_options: WatchOptions,
    pub magnetometer_interval: Duration,
    pub tracker: HeadingTrackerConfig,
    pub calibrate_on_start: bool,
    pub tick_interval: Duration,
    /// Capacity of each sensor fan-in channel
    pub event_capacity: usize,
}

impl OrchestratorConfig {
    pub fn from_blueprint(blueprint: &NavigatorBlueprint) -> Self {
        Self {
            fallback_observer: blueprint.observer.point(),
            watch_options: blueprint.location.watch_options(),
            magnetometer_interval: blueprint.magnetometer.update_interval(),
            tracker: HeadingTrackerConfig::from(&blueprint.magnetometer),
            calibrate_on_start: blueprint.magnetometer.calibrate_on_start,
            tick_interval: blueprint.schedule.tick_interval(),
            event_capacity: BackpressureConfig::default().channel_capacity,
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self::from_blueprint(&NavigatorBlueprint::default())
    }
}

/// External collaborators
pub struct Collaborators<L: ?Sized, T: ?Sized> {
    pub location: Arc<L>,
    pub magnetometer: Arc<dyn MagnetometerSource>,
    pub timetable: Arc<T>,
    pub clock: Arc<dyn Clock>,
}

/// Main orchestrator
pub struct Orchestrator<L: ?Sized, T: ?Sized> {
    config: OrchestratorConfig,
    collaborators: Collaborators<L, T>,
}

impl<L, T> Orchestrator<L, T>
where
    L: LocationSource + Sync + ?Sized + 'static,
    T: TimetableProvider + Sync + ?Sized + 'static,
{
    pub fn new(config: OrchestratorConfig, collaborators: Collaborators<L, T>) -> Self {
        Self {
            config,
            collaborators,
        }
    }

    /// Start all tasks, publishing frames into `frames`
    #[instrument(name = "orchestrator_start", skip_all)]
    pub async fn start(self, frames: mpsc::Sender<NavigationFrame>) -> OrchestratorHandle {
        let Self {
            config,
            collaborators,
        } = self;

        let cancel = CancellationToken::new();
        let emitter = Arc::new(FrameEmitter::new(
            frames,
            collaborators.clock.clone(),
            cancel.clone(),
        ));

        let initial = match collaborators.location.current().await {
            Ok(point) => point,
            Err(err) => {
                warn!(
                    error = %err,
                    fallback = %config.fallback_observer,
                    "location unavailable, using fallback observer"
                );
                config.fallback_observer
            }
        };
        let (observer_tx, observer_rx) = watch::channel(None);

        let backpressure = BackpressureConfig::new(config.event_capacity, DropPolicy::DropNewest);

        // Location fan-in
        let mut location_pipeline = IngestionPipeline::with_config(backpressure.clone());
        if let Err(err) =
            location_pipeline.attach_location(&*collaborators.location, config.watch_options)
        {
            warn!(error = %err, "location watch not attached");
        }
        let location_events = location_pipeline.take_receiver();

        // Magnetometer fan-in, capability check first
        let sensor_name = collaborators.magnetometer.name().to_string();
        let mut heading_pipeline = IngestionPipeline::with_config(backpressure);
        let heading_events = match heading_pipeline
            .attach_magnetometer(&*collaborators.magnetometer, config.magnetometer_interval)
        {
            Ok(()) => heading_pipeline.take_receiver(),
            Err(IngestionError::SensorUnavailable { .. }) => None,
            Err(err) => {
                warn!(error = %err, "magnetometer not attached");
                None
            }
        };

        let recalibrate = Arc::new(Notify::new());

        let location = tokio::spawn(location_task(
            ObserverFilter::new(config.watch_options.min_distance_m),
            initial,
            location_events,
            observer_tx,
            emitter.clone(),
            cancel.child_token(),
        ));

        let heading = tokio::spawn(heading_task(
            HeadingTracker::new(config.tracker),
            sensor_name,
            heading_events,
            observer_rx.clone(),
            recalibrate.clone(),
            config.calibrate_on_start,
            emitter.clone(),
            cancel.child_token(),
        ));

        let schedule = tokio::spawn(schedule_task(
            collaborators.timetable.clone(),
            observer_rx.clone(),
            config.fallback_observer,
            config.tick_interval,
            emitter.clone(),
            cancel.child_token(),
        ));

        info!(
            initial = %initial,
            tick_ms = config.tick_interval.as_millis() as u64,
            "orchestrator started"
        );

        OrchestratorHandle {
            cancel,
            emitter,
            observer: observer_rx,
            recalibrate,
            pipelines: vec![location_pipeline, heading_pipeline],
            location,
            heading,
            schedule,
        }
    }
}

/// Counters collected at shutdown
#[derive(Debug, Clone, Default)]
pub struct OrchestratorReport {
    pub frames_emitted: u64,
    pub location: LocationStats,
    pub heading: HeadingStats,
    pub schedule: ScheduleStats,
    /// Fan-in counters per channel (location, heading)
    pub ingestion: Vec<ingestion::MetricsSnapshot>,
}

/// Running orchestrator
pub struct OrchestratorHandle {
    cancel: CancellationToken,
    emitter: Arc<FrameEmitter>,
    observer: watch::Receiver<Option<GeoPoint>>,
    recalibrate: Arc<Notify>,
    pipelines: Vec<IngestionPipeline>,
    location: JoinHandle<LocationStats>,
    heading: JoinHandle<HeadingStats>,
    schedule: JoinHandle<ScheduleStats>,
}

impl OrchestratorHandle {
    /// Last accepted observer point
    pub fn observer(&self) -> Option<GeoPoint> {
        *self.observer.borrow()
    }

    /// Restart the heading calibration window
    pub fn recalibrate(&self) {
        self.recalibrate.notify_one();
    }

    pub fn frames_emitted(&self) -> u64 {
        self.emitter.emitted()
    }

    /// Token cancelled by `shutdown`
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel every task, unsubscribe all sources and collect counters
    #[instrument(name = "orchestrator_shutdown", skip(self))]
    pub async fn shutdown(mut self) -> OrchestratorReport {
        self.cancel.cancel();
        for pipeline in &mut self.pipelines {
            pipeline.stop_all();
        }

        let location = join_or_default("location", self.location).await;
        let heading = join_or_default("heading", self.heading).await;
        let schedule = join_or_default("schedule", self.schedule).await;

        let report = OrchestratorReport {
            frames_emitted: self.emitter.emitted(),
            location,
            heading,
            schedule,
            ingestion: self
                .pipelines
                .iter()
                .map(|pipeline| pipeline.metrics().snapshot())
                .collect(),
        };
        info!(frames = report.frames_emitted, "orchestrator stopped");
        report
    }
}

async fn join_or_default<S: Default>(task: &str, handle: JoinHandle<S>) -> S {
    match handle.await {
        Ok(stats) => stats,
        Err(err) => {
            error!(task, error = %err, "orchestrator task failed");
            S::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use contracts::{AlignmentTier, FixedClock, NavigationUpdate, RawPrayerEntry};
    use ingestion::{MockMagnetometer, StaticLocationSource, StaticTimetableProvider};

    const LONDON: GeoPoint = GeoPoint {
        latitude: 51.5074,
        longitude: -0.1278,
    };

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn timetable() -> Arc<StaticTimetableProvider> {
        Arc::new(StaticTimetableProvider::from_raw(&vec![
            RawPrayerEntry::new("Fajr", "05:00"),
            RawPrayerEntry::new("Dhuhr", "12:30"),
            RawPrayerEntry::new("Asr", "15:45"),
            RawPrayerEntry::new("Maghrib", "18:10"),
            RawPrayerEntry::new("Isha", "19:40"),
        ]))
    }

    fn config() -> OrchestratorConfig {
        OrchestratorConfig {
            fallback_observer: LONDON,
            tick_interval: Duration::from_secs(1),
            ..Default::default()
        }
    }

    fn drain(rx: &mut mpsc::Receiver<NavigationFrame>) -> Vec<NavigationFrame> {
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            frames.push(frame);
        }
        frames
    }

    fn count(frames: &[NavigationFrame], kind: &str) -> usize {
        frames.iter().filter(|f| f.update.kind() == kind).count()
    }

    #[tokio::test(start_paused = true)]
    async fn test_unavailable_magnetometer_reported_once() {
        let provider = timetable();
        let orchestrator = Orchestrator::new(
            config(),
            Collaborators {
                location: Arc::new(StaticLocationSource::new(LONDON)),
                magnetometer: Arc::new(MockMagnetometer::unavailable()),
                timetable: provider.clone(),
                clock: Arc::new(FixedClock::new(at(14, 15))),
            },
        );

        let (tx, mut rx) = mpsc::channel(64);
        let handle = orchestrator.start(tx).await;
        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(handle.observer(), Some(LONDON));
        let report = handle.shutdown().await;
        let frames = drain(&mut rx);

        assert_eq!(count(&frames, "sensor_unavailable"), 1);
        assert_eq!(count(&frames, "qibla"), 1);
        assert_eq!(count(&frames, "heading"), 0);
        assert!(count(&frames, "prayer") >= 3);
        assert_eq!(report.frames_emitted, frames.len() as u64);
        assert!(!report.heading.sensor_available);

        // one fetch for the single (date, observer) key
        assert_eq!(provider.fetch_count(), 1);
        assert_eq!(report.schedule.fetches, 1);

        let status = frames
            .iter()
            .find_map(|f| match &f.update {
                NavigationUpdate::Prayer { status } => status.clone(),
                _ => None,
            })
            .expect("prayer status");
        assert_eq!(status.next_name, "Asr");
        assert_eq!(status.current_or_next_name, "Dhuhr");

        let mut ids: Vec<_> = frames.iter().map(|f| f.frame_id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), frames.len());
    }

    #[tokio::test(start_paused = true)]
    async fn test_heading_aligned_with_qibla() {
        let orchestrator = Orchestrator::new(
            config(),
            Collaborators {
                location: Arc::new(StaticLocationSource::new(LONDON)),
                magnetometer: Arc::new(MockMagnetometer::fixed(120.0)),
                timetable: timetable(),
                clock: Arc::new(FixedClock::new(at(14, 15))),
            },
        );

        let (tx, mut rx) = mpsc::channel(64);
        let handle = orchestrator.start(tx).await;
        tokio::time::sleep(Duration::from_millis(1050)).await;
        let report = handle.shutdown().await;
        let frames = drain(&mut rx);

        let readings: Vec<_> = frames
            .iter()
            .filter_map(|f| match f.update {
                NavigationUpdate::Heading { reading } => Some(reading),
                _ => None,
            })
            .collect();
        assert!(readings.len() >= 5, "got {} readings", readings.len());

        let last = readings.last().unwrap();
        assert!((last.heading_deg.unwrap() - 120.0).abs() < 1e-6);
        assert!((last.bearing_deg.unwrap() - 118.99).abs() < 0.05);
        assert_eq!(last.tier, AlignmentTier::Perfect);
        assert!(!last.calibrating);

        assert!(report.heading.sensor_available);
        assert_eq!(report.heading.rejected, 0);
        assert!(report.heading.accepted >= readings.len() as u64);
        assert_eq!(report.ingestion.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recalibrate_enters_coarse_window() {
        let orchestrator = Orchestrator::new(
            config(),
            Collaborators {
                location: Arc::new(StaticLocationSource::new(LONDON)),
                magnetometer: Arc::new(MockMagnetometer::fixed(120.0)),
                timetable: timetable(),
                clock: Arc::new(FixedClock::new(at(14, 15))),
            },
        );

        let (tx, mut rx) = mpsc::channel(128);
        let handle = orchestrator.start(tx).await;
        tokio::time::sleep(Duration::from_millis(350)).await;
        let before = drain(&mut rx);
        assert!(before.iter().all(|f| match f.update {
            NavigationUpdate::Heading { reading } => !reading.calibrating,
            _ => true,
        }));

        handle.recalibrate();
        tokio::time::sleep(Duration::from_millis(350)).await;
        let report = handle.shutdown().await;
        let after = drain(&mut rx);

        let readings: Vec<_> = after
            .iter()
            .filter_map(|f| match f.update {
                NavigationUpdate::Heading { reading } => Some(reading),
                _ => None,
            })
            .collect();
        // first frame after the request has no heading yet
        assert_eq!(readings[0].heading_deg, None);
        assert_eq!(readings[0].tier, AlignmentTier::Calibrating);
        assert!(readings.iter().all(|r| r.calibrating));
        assert_eq!(report.heading.calibrations, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_denied_location_uses_fallback() {
        let jakarta = GeoPoint::new(-6.2088, 106.8456);
        let orchestrator = Orchestrator::new(
            OrchestratorConfig {
                fallback_observer: jakarta,
                ..config()
            },
            Collaborators {
                location: Arc::new(StaticLocationSource::denied()),
                magnetometer: Arc::new(MockMagnetometer::unavailable()),
                timetable: timetable(),
                clock: Arc::new(FixedClock::new(at(14, 15))),
            },
        );

        let (tx, mut rx) = mpsc::channel(64);
        let handle = orchestrator.start(tx).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        let report = handle.shutdown().await;
        let frames = drain(&mut rx);

        let fix = frames
            .iter()
            .find_map(|f| match f.update {
                NavigationUpdate::Qibla { fix } => Some(fix),
                _ => None,
            })
            .expect("qibla fix");
        assert_eq!(fix.observer, jakarta);
        assert!((fix.bearing_deg - 295.15).abs() < 0.05);
        assert_eq!(report.location.accepted, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_initial_observer_is_unavailable() {
        let orchestrator = Orchestrator::new(
            config(),
            Collaborators {
                location: Arc::new(StaticLocationSource::new(GeoPoint::new(f64::NAN, 0.0))),
                magnetometer: Arc::new(MockMagnetometer::unavailable()),
                timetable: timetable(),
                clock: Arc::new(FixedClock::new(at(14, 15))),
            },
        );

        let (tx, mut rx) = mpsc::channel(64);
        let handle = orchestrator.start(tx).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(handle.observer(), None);
        let report = handle.shutdown().await;
        let frames = drain(&mut rx);

        assert_eq!(count(&frames, "qibla_unavailable"), 1);
        assert_eq!(count(&frames, "qibla"), 0);
        assert_eq!(report.location.invalid, 1);
        // schedule falls back to the configured observer
        assert!(count(&frames, "prayer") >= 1);
    }
}
