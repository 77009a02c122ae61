use crate::facility::Coordinate;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates in meters, via the
/// spherical law of haversines.
pub fn haversine_distance_m(a: Coordinate, b: Coordinate) -> f64 {
    let phi_a = a.lat.to_radians();
    let phi_b = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lng - a.lng).to_radians();

    let h = (d_phi / 2.0).sin().powi(2)
        + phi_a.cos() * phi_b.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Render a distance for display: integer meters under 1 km, otherwise
/// kilometers with one decimal. Rounds half-up at both boundaries.
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{}m", meters.round() as i64)
    } else {
        let km = (meters / 100.0).round() / 10.0;
        format!("{km:.1}km")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_same_point() {
        let point = Coordinate::new(37.4979, 127.0276).unwrap();
        assert!(haversine_distance_m(point, point) < 1e-6);
    }

    #[test]
    fn paris_to_london_is_about_344_km() {
        let paris = Coordinate::new(48.8566, 2.3522).unwrap();
        let london = Coordinate::new(51.5074, -0.1276).unwrap();
        let distance = haversine_distance_m(paris, london);
        assert!(
            (339_000.0..349_000.0).contains(&distance),
            "expected ~344km, got {distance}"
        );
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Coordinate::new(37.4979, 127.0276).unwrap();
        let b = Coordinate::new(37.5172, 127.0473).unwrap();
        let forward = haversine_distance_m(a, b);
        let backward = haversine_distance_m(b, a);
        assert!((forward - backward).abs() < 1e-9);
        assert!(forward > 1_000.0 && forward < 5_000.0);
    }

    #[test]
    fn formats_meters_under_one_km() {
        assert_eq!(format_distance(950.0), "950m");
        assert_eq!(format_distance(0.0), "0m");
        assert_eq!(format_distance(150.4), "150m");
    }

    #[test]
    fn formats_kilometers_with_one_decimal() {
        assert_eq!(format_distance(1500.0), "1.5km");
        assert_eq!(format_distance(1000.0), "1.0km");
        assert_eq!(format_distance(2340.0), "2.3km");
    }

    #[test]
    fn boundary_rounds_half_up() {
        assert_eq!(format_distance(999.6), "1000m");
        assert_eq!(format_distance(999.4), "999m");
        assert_eq!(format_distance(1049.9), "1.0km");
        assert_eq!(format_distance(1050.0), "1.1km");
    }
}
