//! Frame emitter shared by the orchestrator tasks

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use contracts::{Clock, NavigationFrame, NavigationUpdate};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Stamps updates with a sequence number and wall-clock time and sends them out
///
/// Sends wait for queue space but give up once the run is cancelled.
pub struct FrameEmitter {
    tx: mpsc::Sender<NavigationFrame>,
    clock: Arc<dyn Clock>,
    next_id: AtomicU64,
    cancel: CancellationToken,
}

impl FrameEmitter {
    pub fn new(
        tx: mpsc::Sender<NavigationFrame>,
        clock: Arc<dyn Clock>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            tx,
            clock,
            next_id: AtomicU64::new(0),
            cancel,
        }
    }

    /// Publish one update; false once the receiver is gone or the run is cancelled
    pub async fn emit(&self, update: NavigationUpdate) -> bool {
        let frame = NavigationFrame {
            frame_id: self.next_id.fetch_add(1, Ordering::Relaxed),
            emitted_at: self.clock.now(),
            update,
        };
        let frame_id = frame.frame_id;
        let kind = frame.update.kind();

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            sent = self.tx.send(frame) => {
                trace!(frame_id, kind, ok = sent.is_ok(), "frame emitted");
                sent.is_ok()
            }
        }
    }

    /// Frames stamped so far
    pub fn emitted(&self) -> u64 {
        self.next_id.load(Ordering::Relaxed)
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}
