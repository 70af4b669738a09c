//! SinkHandle - one sink, two lanes, one worker task
//!
//! Heading frames arrive at sensor rate and only the latest one matters, so
//! they go through a bounded lane and are dropped when the sink falls behind.
//! Every other update (prayer status, Qibla fix, unavailability notices) is a
//! state change at ~1 Hz or slower; those use an unbounded lane the worker
//! always drains first, so a slow sink never loses them.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, trace};

use contracts::{NavigationFrame, NavigationUpdate, SnapshotSink};

use crate::metrics::{DispatchStatus, SinkMetrics};

/// Which lane a frame travels in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    /// Droppable, bounded
    Heading,
    /// Never dropped
    State,
}

impl Lane {
    pub fn of(frame: &NavigationFrame) -> Self {
        match frame.update {
            NavigationUpdate::Heading { .. } => Lane::Heading,
            _ => Lane::State,
        }
    }
}

/// Handle to a running sink worker
pub struct SinkHandle {
    name: String,
    heading_tx: mpsc::Sender<NavigationFrame>,
    state_tx: mpsc::UnboundedSender<NavigationFrame>,
    metrics: Arc<SinkMetrics>,
    worker: JoinHandle<()>,
}

impl SinkHandle {
    /// Spawn the worker; `queue_capacity` bounds the heading lane
    pub fn spawn<S: SnapshotSink + Send + 'static>(sink: S, queue_capacity: usize) -> Self {
        let name = sink.name().to_string();
        let (heading_tx, heading_rx) = mpsc::channel(queue_capacity.max(1));
        let (state_tx, state_rx) = mpsc::unbounded_channel();
        let metrics = Arc::new(SinkMetrics::new());

        let worker = tokio::spawn(sink_worker(
            sink,
            heading_rx,
            state_rx,
            Arc::clone(&metrics),
            name.clone(),
        ));

        Self {
            name,
            heading_tx,
            state_tx,
            metrics,
            worker,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    /// Queue a frame without waiting
    ///
    /// Returns false when a heading frame was dropped on a full lane or the
    /// worker is gone.
    pub fn offer(&self, frame: NavigationFrame) -> bool {
        let queued = match Lane::of(&frame) {
            Lane::Heading => match self.heading_tx.try_send(frame) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(f)) => {
                    self.metrics.record(&self.name, DispatchStatus::Dropped);
                    trace!(sink = %self.name, frame_id = f.frame_id, "heading lane full, frame dropped");
                    false
                }
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            },
            Lane::State => self.state_tx.send(frame).is_ok(),
        };

        if queued {
            self.metrics.set_queue_len(self.queued());
        } else if self.heading_tx.is_closed() {
            error!(sink = %self.name, "Sink worker closed unexpectedly");
        }
        queued
    }

    fn queued(&self) -> usize {
        self.heading_tx.max_capacity() - self.heading_tx.capacity()
    }

    /// Close both lanes and wait for the worker to drain, flush and close the sink
    #[instrument(name = "sink_handle_shutdown", skip(self), fields(sink = %self.name))]
    pub async fn shutdown(self) {
        drop(self.heading_tx);
        drop(self.state_tx);
        if let Err(e) = self.worker.await {
            error!(sink = %self.name, error = ?e, "Worker task panicked");
        }
        debug!(sink = %self.name, "SinkHandle shutdown complete");
    }
}

#[instrument(
    name = "sink_worker_loop",
    skip(sink, heading_rx, state_rx, metrics),
    fields(sink = %name)
)]
async fn sink_worker<S: SnapshotSink>(
    mut sink: S,
    mut heading_rx: mpsc::Receiver<NavigationFrame>,
    mut state_rx: mpsc::UnboundedReceiver<NavigationFrame>,
    metrics: Arc<SinkMetrics>,
    name: String,
) {
    debug!(sink = %name, "Sink worker started");

    let mut heading_open = true;
    let mut state_open = true;
    while heading_open || state_open {
        let frame = tokio::select! {
            biased;
            frame = state_rx.recv(), if state_open => match frame {
                Some(frame) => frame,
                None => {
                    state_open = false;
                    continue;
                }
            },
            frame = heading_rx.recv(), if heading_open => match frame {
                Some(frame) => frame,
                None => {
                    heading_open = false;
                    continue;
                }
            },
        };
        metrics.set_queue_len(heading_rx.len());

        match sink.write(&frame).await {
            Ok(()) => metrics.record_written(&name, frame.frame_id),
            Err(e) => {
                metrics.record(&name, DispatchStatus::Failed);
                error!(sink = %name, frame_id = frame.frame_id, kind = frame.update.kind(), error = %e, "Write failed");
            }
        }
    }

    if let Err(e) = sink.flush().await {
        error!(sink = %name, error = %e, "Flush failed on shutdown");
    }
    if let Err(e) = sink.close().await {
        error!(sink = %name, error = %e, "Close failed on shutdown");
    }

    debug!(sink = %name, "Sink worker stopped");
}
