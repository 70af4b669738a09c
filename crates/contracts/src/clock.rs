//! Clock trait - injectable wall-clock source
//!
//! Schedule computations take local wall time from a `Clock` so tests can
//! pin or advance "now" without sleeping.

use std::sync::Mutex;

use chrono::{Local, NaiveDate, NaiveDateTime, TimeDelta};

/// Local wall-clock time source
pub trait Clock: Send + Sync {
    /// Current local date and time
    fn now(&self) -> NaiveDateTime;

    /// Current local calendar date
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// The host's local clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Manually controlled clock
#[derive(Debug)]
pub struct FixedClock {
    at: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(at: NaiveDateTime) -> Self {
        Self { at: Mutex::new(at) }
    }

    /// Jump to `at`
    pub fn set(&self, at: NaiveDateTime) {
        if let Ok(mut guard) = self.at.lock() {
            *guard = at;
        }
    }

    /// Move forward by `delta`
    pub fn advance(&self, delta: TimeDelta) {
        if let Ok(mut guard) = self.at.lock() {
            *guard += delta;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        match self.at.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
