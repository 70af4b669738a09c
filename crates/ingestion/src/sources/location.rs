//! Location sources: fixed position and scripted movement

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use contracts::{
    ContractError, GeoPoint, LocationCallback, LocationSource, Subscription, WatchOptions,
};
use tracing::debug;

use crate::sources::stream::{spawn_stream, SharedInterval};

/// Fixed observer position
///
/// `denied()` models a platform that refused location permission.
#[derive(Debug, Clone)]
pub struct StaticLocationSource {
    name: String,
    point: Option<GeoPoint>,
}

impl StaticLocationSource {
    pub fn new(point: GeoPoint) -> Self {
        Self {
            name: "static_location".to_string(),
            point: Some(point),
        }
    }

    /// Source whose every request fails
    pub fn denied() -> Self {
        Self {
            name: "denied_location".to_string(),
            point: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl LocationSource for StaticLocationSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn current(&self) -> Result<GeoPoint, ContractError> {
        self.point
            .ok_or_else(|| ContractError::provider(&self.name, "location permission denied"))
    }

    fn watch(&self, _options: WatchOptions, _callback: LocationCallback) -> Subscription {
        // a fixed position never moves
        Subscription::noop(self.name.clone())
    }
}

/// Replays a scripted path, one point per watch interval
///
/// `current()` returns the most recently emitted point (the first one before
/// any emission). Stops at the last point.
#[derive(Debug, Clone)]
pub struct ScriptedLocationSource {
    name: String,
    path: Arc<Vec<GeoPoint>>,
    cursor: Arc<AtomicUsize>,
}

impl ScriptedLocationSource {
    pub fn new(path: Vec<GeoPoint>) -> Self {
        Self {
            name: "scripted_location".to_string(),
            path: Arc::new(path),
            cursor: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Points emitted so far
    pub fn emitted(&self) -> usize {
        self.cursor.load(Ordering::Relaxed)
    }
}

impl LocationSource for ScriptedLocationSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn current(&self) -> Result<GeoPoint, ContractError> {
        let index = self.cursor.load(Ordering::Relaxed).saturating_sub(1);
        self.path
            .get(index)
            .copied()
            .ok_or_else(|| ContractError::provider(&self.name, "scripted path is empty"))
    }

    fn watch(&self, options: WatchOptions, callback: LocationCallback) -> Subscription {
        debug!(
            source = %self.name,
            points = self.path.len(),
            interval_ms = options.interval.as_millis() as u64,
            "scripted location watch"
        );
        let path = self.path.clone();
        let cursor = self.cursor.clone();
        spawn_stream(&self.name, SharedInterval::new(options.interval), move || {
            let index = cursor.load(Ordering::Relaxed);
            let Some(point) = path.get(index).copied() else {
                return false;
            };
            cursor.store(index + 1, Ordering::Relaxed);
            callback(point);
            true
        })
    }
}
