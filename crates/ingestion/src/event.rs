//! Events fanned in from collaborator callbacks

use std::time::Instant;

use contracts::{GeoPoint, RawMagnetometerSample};

/// One inbound sensor or location event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorEvent {
    /// Raw magnetometer sample, stamped on arrival
    Magnetometer {
        sample: RawMagnetometerSample,
        received_at: Instant,
    },

    /// Observer position update
    Location { point: GeoPoint },
}

impl SensorEvent {
    /// Stable identifier (metrics labels, logs)
    pub fn kind(&self) -> &'static str {
        match self {
            SensorEvent::Magnetometer { .. } => "magnetometer",
            SensorEvent::Location { .. } => "location",
        }
    }
}
