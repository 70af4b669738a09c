//! Subscription - handle returned by every streaming `watch` call
//!
//! The unsubscribe action runs exactly once: either through an explicit
//! `unsubscribe()` or when the handle is dropped.

use std::fmt;

type UnsubscribeFn = Box<dyn FnOnce() + Send + 'static>;

/// RAII handle for a sensor or location stream
#[must_use = "dropping a Subscription immediately unsubscribes"]
pub struct Subscription {
    name: String,
    cancel: Option<UnsubscribeFn>,
}

impl Subscription {
    /// Create a subscription that runs `cancel` on teardown
    pub fn new(name: impl Into<String>, cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            name: name.into(),
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to tear down
    pub fn noop(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cancel: None,
        }
    }

    /// Stream name (used for logging)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the unsubscribe action is still pending
    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    /// Unsubscribe now
    pub fn unsubscribe(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("name", &self.name)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn counting(counter: &Arc<AtomicU32>) -> Subscription {
        let counter = counter.clone();
        Subscription::new("test", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_explicit_unsubscribe_runs_once() {
        let counter = Arc::new(AtomicU32::new(0));
        let sub = counting(&counter);
        assert!(sub.is_active());
        sub.unsubscribe();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let counter = Arc::new(AtomicU32::new(0));
        {
            let _sub = counting(&counter);
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_noop_is_inactive() {
        let sub = Subscription::noop("none");
        assert!(!sub.is_active());
        assert_eq!(sub.name(), "none");
    }
}
