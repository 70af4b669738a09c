//! Shared angle and great-circle helpers

use contracts::GeoPoint;

/// Mean Earth radius (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// atan2 arguments below this magnitude are treated as an undefined direction
const DEGENERATE_EPSILON: f64 = 1e-12;

/// Normalize any finite angle into [0, 360)
pub fn normalize_degrees(degrees: f64) -> f64 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid of a tiny negative value rounds up to 360.0
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Smallest angle between two directions, in [0, 180]
///
/// 359° vs 1° is 2°, not 358°.
pub fn circular_delta(a: f64, b: f64) -> f64 {
    let delta = (a - b).abs().rem_euclid(360.0);
    delta.min(360.0 - delta)
}

/// Signed shortest rotation from `from` to `to`, in [-180, 180)
pub fn signed_delta(from: f64, to: f64) -> f64 {
    normalize_degrees(to - from + 180.0) - 180.0
}

/// Initial great-circle bearing from `from` to `to`, degrees in [0, 360)
///
/// Coincident and antipodal points have no defined direction; 0 is returned.
pub fn initial_bearing(from: GeoPoint, to: GeoPoint) -> f64 {
    let phi = from.latitude.to_radians();
    let phi_k = to.latitude.to_radians();
    let delta_lambda = (to.longitude - from.longitude).to_radians();

    let y = delta_lambda.sin() * phi_k.cos();
    let x = phi.cos() * phi_k.sin() - phi.sin() * phi_k.cos() * delta_lambda.cos();

    if y.abs() < DEGENERATE_EPSILON && x.abs() < DEGENERATE_EPSILON {
        return 0.0;
    }
    normalize_degrees(y.atan2(x).to_degrees())
}

/// Haversine distance in km (unrounded)
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let phi = from.latitude.to_radians();
    let phi_k = to.latitude.to_radians();
    let delta_phi = (to.latitude - from.latitude).to_radians();
    let delta_lambda = (to.longitude - from.longitude).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi.cos() * phi_k.cos() * (delta_lambda / 2.0).sin().powi(2);
    // rounding can push `a` just past 1 near the antipode
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::KAABA;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(725.0), 5.0);
        assert!(normalize_degrees(-1e-15) < 360.0);
    }

    #[test]
    fn test_circular_delta_wraps() {
        assert_eq!(circular_delta(359.0, 1.0), 2.0);
        assert_eq!(circular_delta(1.0, 359.0), 2.0);
        assert_eq!(circular_delta(0.0, 180.0), 180.0);
        assert_eq!(circular_delta(90.0, 90.0), 0.0);
    }

    #[test]
    fn test_signed_delta() {
        assert_eq!(signed_delta(350.0, 10.0), 20.0);
        assert_eq!(signed_delta(10.0, 350.0), -20.0);
    }

    #[test]
    fn test_haversine_antipode_is_half_circumference() {
        let antipode = GeoPoint::new(-KAABA.latitude, KAABA.longitude - 180.0);
        let distance = haversine_km(KAABA, antipode);
        assert!((distance - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-3);
        assert!(distance.is_finite());
    }

    #[test]
    fn test_bearing_due_north_and_east() {
        let origin = GeoPoint::new(0.0, 0.0);
        assert!(initial_bearing(origin, GeoPoint::new(10.0, 0.0)).abs() < 1e-9);
        assert!((initial_bearing(origin, GeoPoint::new(0.0, 10.0)) - 90.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn normalized_is_in_range(deg in -1e6f64..1e6) {
            let n = normalize_degrees(deg);
            prop_assert!((0.0..360.0).contains(&n));
        }

        #[test]
        fn circular_delta_is_symmetric(a in 0f64..360.0, b in 0f64..360.0) {
            let d = circular_delta(a, b);
            prop_assert!((0.0..=180.0).contains(&d));
            prop_assert!((d - circular_delta(b, a)).abs() < 1e-9);
        }
    }
}
