//! Interval-driven callback stream shared by the mock and replay sources

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use contracts::Subscription;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Requested delivery interval, adjustable while streaming
#[derive(Debug, Clone)]
pub(crate) struct SharedInterval(Arc<AtomicU64>);

impl SharedInterval {
    pub(crate) fn new(interval: Duration) -> Self {
        Self(Arc::new(AtomicU64::new(Self::to_millis(interval))))
    }

    pub(crate) fn set(&self, interval: Duration) {
        self.0.store(Self::to_millis(interval), Ordering::Relaxed);
    }

    pub(crate) fn get(&self) -> Duration {
        Duration::from_millis(self.0.load(Ordering::Relaxed))
    }

    fn to_millis(interval: Duration) -> u64 {
        (interval.as_millis() as u64).max(1)
    }
}

/// Spawn a tokio task calling `emit` every interval until it returns `false`
/// or the subscription ends
///
/// Without a tokio runtime nothing is streamed and a no-op subscription is returned.
pub(crate) fn spawn_stream<F>(name: &str, interval: SharedInterval, mut emit: F) -> Subscription
where
    F: FnMut() -> bool + Send + 'static,
{
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        warn!(source = %name, "no tokio runtime, stream not started");
        return Subscription::noop(name);
    };

    let token = CancellationToken::new();
    let task_token = token.clone();
    let task_name = name.to_string();

    runtime.spawn(async move {
        debug!(source = %task_name, "stream started");
        let mut delivered = 0u64;
        loop {
            tokio::select! {
                _ = task_token.cancelled() => break,
                _ = tokio::time::sleep(interval.get()) => {
                    if !emit() {
                        break;
                    }
                    delivered += 1;
                    trace!(source = %task_name, delivered, "stream item delivered");
                }
            }
        }
        debug!(source = %task_name, delivered, "stream stopped");
    });

    let name = name.to_string();
    Subscription::new(name.clone(), move || {
        debug!(source = %name, "unsubscribed");
        token.cancel();
    })
}
