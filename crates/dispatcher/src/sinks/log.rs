//! LogSink - logs navigation updates via tracing

use contracts::{ContractError, NavigationFrame, NavigationUpdate, SnapshotSink};
use tracing::{info, instrument, warn};

/// Sink that logs one line per navigation update
pub struct LogSink {
    name: String,
    /// Heading frames are frequent; log every n-th one
    heading_every: u64,
    heading_seen: u64,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            heading_every: 1,
            heading_seen: 0,
        }
    }

    /// Only log every `n`-th heading update (other kinds are always logged)
    pub fn with_heading_sampling(mut self, n: u64) -> Self {
        self.heading_every = n.max(1);
        self
    }

    fn log_update(&mut self, frame: &NavigationFrame) {
        let frame_id = frame.frame_id;
        match &frame.update {
            NavigationUpdate::Prayer { status: Some(status) } => info!(
                sink = %self.name,
                frame_id,
                current = %status.current_or_next_name,
                next = %status.next_name,
                remaining = %status.remaining_hms(),
                progress = status.progress_fraction,
                "{status}"
            ),
            NavigationUpdate::Prayer { status: None } => {
                info!(sink = %self.name, frame_id, "prayer status: no data")
            }
            NavigationUpdate::Qibla { fix } => info!(
                sink = %self.name,
                frame_id,
                bearing = fix.bearing_deg,
                distance_km = fix.distance_km,
                at_kaaba = fix.is_at_kaaba(),
                "qibla fix updated"
            ),
            NavigationUpdate::QiblaUnavailable { reason } => {
                warn!(sink = %self.name, frame_id, %reason, "qibla unavailable")
            }
            NavigationUpdate::Heading { reading } => {
                self.heading_seen += 1;
                if (self.heading_seen - 1) % self.heading_every == 0 {
                    info!(
                        sink = %self.name,
                        frame_id,
                        heading = ?reading.heading_deg,
                        delta = ?reading.delta_deg,
                        tier = reading.tier.as_str(),
                        calibrating = reading.calibrating,
                        "{}",
                        reading.tier.label()
                    );
                }
            }
            NavigationUpdate::SensorUnavailable { sensor } => {
                warn!(sink = %self.name, frame_id, %sensor, "sensor unavailable")
            }
        }
    }

    /// Heading updates received so far
    pub fn heading_seen(&self) -> u64 {
        self.heading_seen
    }
}

impl SnapshotSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, frame),
        fields(sink = %self.name, frame_id = frame.frame_id, kind = frame.update.kind())
    )]
    async fn write(&mut self, frame: &NavigationFrame) -> Result<(), ContractError> {
        self.log_update(frame);
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        // Nothing to flush for log sink
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}
