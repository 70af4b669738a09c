//! GeoPoint - observer and target positions (WGS-84 degrees)

use serde::{Deserialize, Serialize};

use crate::ContractError;

/// Latitude / longitude pair in WGS-84 degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude (degrees, north positive)
    pub latitude: f64,

    /// Longitude (degrees, east positive)
    pub longitude: f64,
}

/// The Kaaba in Mecca, target of every bearing computation
pub const KAABA: GeoPoint = GeoPoint {
    latitude: 21.4225,
    longitude: 39.8262,
};

impl GeoPoint {
    /// Create a point without validation
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Return the point if both components are finite and in range
    ///
    /// # Errors
    /// `ContractError::InvalidCoordinate` naming the first offending field.
    pub fn validated(self) -> Result<Self, ContractError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ContractError::invalid_coordinate("latitude", self.latitude));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ContractError::invalid_coordinate(
                "longitude",
                self.longitude,
            ));
        }
        Ok(self)
    }
}

impl Default for GeoPoint {
    /// Mecca is the fallback observer when no fix is available
    fn default() -> Self {
        KAABA
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validated_accepts_bounds() {
        assert!(GeoPoint::new(90.0, 180.0).validated().is_ok());
        assert!(GeoPoint::new(-90.0, -180.0).validated().is_ok());
        assert!(KAABA.validated().is_ok());
    }

    #[test]
    fn test_validated_rejects_out_of_range() {
        let err = GeoPoint::new(90.5, 0.0).validated().unwrap_err();
        assert!(matches!(
            err,
            ContractError::InvalidCoordinate {
                field: "latitude",
                ..
            }
        ));

        let err = GeoPoint::new(0.0, -181.0).validated().unwrap_err();
        assert!(matches!(
            err,
            ContractError::InvalidCoordinate {
                field: "longitude",
                ..
            }
        ));
    }

    #[test]
    fn test_validated_rejects_non_finite() {
        assert!(GeoPoint::new(f64::NAN, 0.0).validated().is_err());
        assert!(GeoPoint::new(0.0, f64::INFINITY).validated().is_err());
    }

    #[test]
    fn test_default_is_mecca() {
        assert_eq!(GeoPoint::default(), KAABA);
    }
}
