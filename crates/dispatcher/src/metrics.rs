//! Per-sink counters
//!
//! In-process atomics for tests and the end-of-run summary; the same events
//! are also recorded through the `metrics` facade as
//! `navigator_frames_dispatched_total{sink,status}`.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use serde::Serialize;

/// Frame outcome label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    Written,
    Failed,
    Dropped,
}

impl DispatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchStatus::Written => "written",
            DispatchStatus::Failed => "failed",
            DispatchStatus::Dropped => "dropped",
        }
    }
}

/// Counters for a single sink
#[derive(Debug, Default)]
pub struct SinkMetrics {
    queue_len: AtomicUsize,
    written: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
    /// Highest frame_id written so far
    last_frame_id: AtomicU64,
}

impl SinkMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    /// Count one outcome for `sink`
    pub fn record(&self, sink: &str, status: DispatchStatus) {
        let counter = match status {
            DispatchStatus::Written => &self.written,
            DispatchStatus::Failed => &self.failed,
            DispatchStatus::Dropped => &self.dropped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(
            "navigator_frames_dispatched_total",
            "sink" => sink.to_string(),
            "status" => status.as_str()
        )
        .increment(1);
    }

    pub fn record_written(&self, sink: &str, frame_id: u64) {
        // state frames can overtake queued headings
        self.last_frame_id.fetch_max(frame_id, Ordering::Relaxed);
        self.record(sink, DispatchStatus::Written);
    }

    pub fn write_count(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    pub fn failure_count(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queue_len: self.queue_len.load(Ordering::Relaxed),
            write_count: self.write_count(),
            failure_count: self.failure_count(),
            dropped_count: self.dropped_count(),
            last_frame_id: self.last_frame_id.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of sink metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub queue_len: usize,
    pub write_count: u64,
    pub failure_count: u64,
    pub dropped_count: u64,
    pub last_frame_id: u64,
}

impl MetricsSnapshot {
    /// Frames offered to the sink (written + failed + dropped)
    pub fn offered(&self) -> u64 {
        self.write_count + self.failure_count + self.dropped_count
    }
}
