//! Bearing and distance from an observer to the Kaaba

use contracts::{ContractError, GeoPoint, QiblaFix, KAABA};
use tracing::{debug, instrument};

use crate::geo::{haversine_km, initial_bearing};

/// Great-circle bearing from `observer` to the Kaaba, degrees in [0, 360)
///
/// Observer at the Kaaba (or its exact antipode) yields 0.
///
/// # Errors
/// `ContractError::InvalidCoordinate` for non-finite or out-of-range input.
#[instrument(level = "trace", name = "qibla_bearing", skip_all, fields(observer = %observer))]
pub fn compute_qibla_bearing(observer: GeoPoint) -> Result<f64, ContractError> {
    let observer = observer.validated()?;
    Ok(initial_bearing(observer, KAABA))
}

/// Haversine distance from `observer` to the Kaaba, km rounded to 2 decimals
///
/// # Errors
/// `ContractError::InvalidCoordinate` for non-finite or out-of-range input.
#[instrument(level = "trace", name = "qibla_distance", skip_all, fields(observer = %observer))]
pub fn compute_distance_km(observer: GeoPoint) -> Result<f64, ContractError> {
    let observer = observer.validated()?;
    Ok(round_to_centi(haversine_km(observer, KAABA)))
}

/// Bearing and distance in one value
pub fn qibla_fix(observer: GeoPoint) -> Result<QiblaFix, ContractError> {
    let fix = QiblaFix {
        observer,
        bearing_deg: compute_qibla_bearing(observer)?,
        distance_km: compute_distance_km(observer)?,
    };
    debug!(
        observer = %observer,
        bearing = fix.bearing_deg,
        distance_km = fix.distance_km,
        "qibla fix computed"
    );
    Ok(fix)
}

fn round_to_centi(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
