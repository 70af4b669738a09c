//! LocationSource trait - one-shot and streaming observer position

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ContractError, GeoPoint, Subscription};

/// Location update callback type
pub type LocationCallback = Arc<dyn Fn(GeoPoint) + Send + Sync>;

/// Options for streaming location updates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WatchOptions {
    /// Minimum time between updates
    pub interval: Duration,
    /// Minimum movement (meters) between updates
    pub min_distance_m: f64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            min_distance_m: 10.0,
        }
    }
}

/// Location provider
#[trait_variant::make(LocationSource: Send)]
pub trait LocalLocationSource {
    /// Provider name (used for logging)
    fn name(&self) -> &str;

    /// Current position
    ///
    /// # Errors
    /// `ContractError::Provider` when no fix can be obtained (permission denied, timeout)
    async fn current(&self) -> Result<GeoPoint, ContractError>;

    /// Stream position updates to `callback` until the subscription ends
    fn watch(&self, options: WatchOptions, callback: LocationCallback) -> Subscription;
}
