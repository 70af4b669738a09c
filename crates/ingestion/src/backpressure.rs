//! Channel send with backpressure policy

use std::sync::Arc;

use async_channel::{Receiver, Sender, TrySendError};
use tracing::{trace, warn};

use crate::config::{DropPolicy, IngestionMetrics};
use crate::event::SensorEvent;

/// Shared send side of the fan-in channel
///
/// Holds a receiver clone so `DropOldest` can evict the head of the queue.
#[derive(Clone)]
pub struct EventSender {
    tx: Sender<SensorEvent>,
    evict: Receiver<SensorEvent>,
    metrics: Arc<IngestionMetrics>,
    drop_policy: DropPolicy,
}

impl EventSender {
    pub fn new(
        tx: Sender<SensorEvent>,
        evict: Receiver<SensorEvent>,
        metrics: Arc<IngestionMetrics>,
        drop_policy: DropPolicy,
    ) -> Self {
        Self {
            tx,
            evict,
            metrics,
            drop_policy,
        }
    }

    /// Send event, handling backpressure policy
    ///
    /// Never blocks; safe to call from sensor callbacks.
    pub fn send(&self, event: SensorEvent, source: &str) {
        self.metrics.record_received();
        match self.tx.try_send(event) {
            Ok(()) => {
                trace!(source = %source, kind = event.kind(), "event sent");
                self.record_sent(source);
            }
            Err(TrySendError::Full(event)) => self.handle_full(event, source),
            Err(TrySendError::Closed(_)) => {
                self.metrics.record_after_close();
                trace!(source = %source, "event channel closed");
            }
        }
        self.metrics.update_queue_len(self.tx.len());
    }

    fn handle_full(&self, event: SensorEvent, source: &str) {
        self.metrics.record_dropped();
        metrics::counter!(
            "navigator_ingestion_events_total",
            "source" => source.to_string(),
            "status" => "dropped"
        )
        .increment(1);

        match self.drop_policy {
            DropPolicy::DropNewest => {
                trace!(source = %source, "event dropped (newest)");
            }
            DropPolicy::DropOldest => {
                let _ = self.evict.try_recv();
                if self.tx.try_send(event).is_err() {
                    warn!(source = %source, "event dropped after evicting oldest");
                } else {
                    trace!(source = %source, "oldest event evicted");
                }
            }
        }
    }

    fn record_sent(&self, source: &str) {
        metrics::counter!(
            "navigator_ingestion_events_total",
            "source" => source.to_string(),
            "status" => "sent"
        )
        .increment(1);
    }
}
