//! Ingestion Pipeline main entry

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_channel::{bounded, Receiver};
use contracts::{
    LocationCallback, LocationSource, MagnetometerCallback, MagnetometerSource, Subscription,
    WatchOptions,
};
use tracing::{debug, info, instrument, warn};

use crate::backpressure::EventSender;
use crate::config::{BackpressureConfig, IngestionMetrics};
use crate::error::{IngestionError, Result};
use crate::event::SensorEvent;

/// Ingestion Pipeline
///
/// Attaches magnetometer and location sources, fans their callbacks into one
/// bounded channel of `SensorEvent`s. Owns every subscription it creates.
pub struct IngestionPipeline {
    /// Active subscriptions by source name
    subscriptions: HashMap<String, Subscription>,

    /// Shared metrics
    metrics: Arc<IngestionMetrics>,

    /// Send side shared by all callbacks
    sender: EventSender,

    /// Data receiver
    rx: Option<Receiver<SensorEvent>>,
}

impl IngestionPipeline {
    /// Create new Ingestion Pipeline
    ///
    /// # Arguments
    /// * `channel_capacity` - Channel capacity
    pub fn new(channel_capacity: usize) -> Self {
        Self::with_config(BackpressureConfig {
            channel_capacity,
            ..Default::default()
        })
    }

    /// Create with custom backpressure configuration
    pub fn with_config(config: BackpressureConfig) -> Self {
        let (tx, rx) = bounded(config.channel_capacity.max(1));
        let metrics = Arc::new(IngestionMetrics::new());
        let sender = EventSender::new(tx, rx.clone(), metrics.clone(), config.drop_policy);

        Self {
            subscriptions: HashMap::new(),
            metrics,
            sender,
            rx: Some(rx),
        }
    }

    /// Attach a magnetometer
    ///
    /// Runs the capability check first; an unavailable sensor is never
    /// subscribed and `SensorUnavailable` is returned.
    #[instrument(
        name = "ingestion_attach_magnetometer",
        skip(self, source),
        fields(source = %source.name())
    )]
    pub fn attach_magnetometer(
        &mut self,
        source: &dyn MagnetometerSource,
        update_interval: Duration,
    ) -> Result<()> {
        let name = source.name().to_string();
        self.ensure_detached(&name)?;

        if !source.is_available() {
            warn!(source = %name, "magnetometer not available");
            return Err(IngestionError::SensorUnavailable { source_name: name });
        }

        source.set_update_interval(update_interval);
        let sender = self.sender.clone();
        let label = name.clone();
        let callback: MagnetometerCallback = Arc::new(move |sample| {
            let event = SensorEvent::Magnetometer {
                sample,
                received_at: tokio::time::Instant::now().into_std(),
            };
            sender.send(event, &label);
        });

        let subscription = source.watch(callback);
        debug!(source = %name, active = subscription.is_active(), "magnetometer attached");
        self.subscriptions.insert(name, subscription);
        Ok(())
    }

    /// Attach a location source
    #[instrument(
        name = "ingestion_attach_location",
        skip(self, source, options),
        fields(source = %source.name())
    )]
    pub fn attach_location<L>(&mut self, source: &L, options: WatchOptions) -> Result<()>
    where
        L: LocationSource + ?Sized,
    {
        let name = source.name().to_string();
        self.ensure_detached(&name)?;

        let sender = self.sender.clone();
        let label = name.clone();
        let callback: LocationCallback = Arc::new(move |point| {
            sender.send(SensorEvent::Location { point }, &label);
        });

        let subscription = source.watch(options, callback);
        debug!(source = %name, active = subscription.is_active(), "location attached");
        self.subscriptions.insert(name, subscription);
        Ok(())
    }

    fn ensure_detached(&self, name: &str) -> Result<()> {
        if self.subscriptions.contains_key(name) {
            return Err(IngestionError::AlreadyAttached {
                source_name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Push an event directly (e.g. an initial location fix)
    pub fn push(&self, event: SensorEvent, source: &str) {
        self.sender.send(event, source);
    }

    /// Detach one source; returns false when it was not attached
    pub fn detach(&mut self, name: &str) -> bool {
        match self.subscriptions.remove(name) {
            Some(subscription) => {
                debug!(source = %name, "detaching source");
                subscription.unsubscribe();
                true
            }
            None => false,
        }
    }

    /// Stop all sources
    ///
    /// Every subscription is cancelled exactly once; later calls are no-ops.
    #[instrument(name = "ingestion_stop_all", skip(self))]
    pub fn stop_all(&mut self) {
        if self.subscriptions.is_empty() {
            return;
        }
        info!(count = self.subscriptions.len(), "stopping all sources");
        for (name, subscription) in self.subscriptions.drain() {
            debug!(source = %name, "unsubscribing");
            subscription.unsubscribe();
        }
    }

    /// Get data stream receiver
    ///
    /// Note: Can only be called once, subsequent calls return None
    pub fn take_receiver(&mut self) -> Option<Receiver<SensorEvent>> {
        self.rx.take()
    }

    /// Get metrics reference
    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        self.metrics.clone()
    }

    /// Attached source count
    pub fn source_count(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_attached(&self, name: &str) -> bool {
        self.subscriptions.contains_key(name)
    }
}

impl Drop for IngestionPipeline {
    fn drop(&mut self) {
        self.stop_all();
    }
}
