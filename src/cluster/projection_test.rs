#[cfg(test)]
mod tests {
    use crate::cluster::projection::{
        bounded_lat_to_y, bounded_lng_to_x, fround, lat_to_y, lng_to_x, wrap_lng, x_to_lng,
        y_to_lat,
    };
    use quickcheck::{TestResult, quickcheck};

    #[test]
    fn test_projection_anchors() {
        assert_eq!(lng_to_x(-180.0), 0.0);
        assert_eq!(lng_to_x(0.0), 0.5);
        assert_eq!(lng_to_x(180.0), 1.0);
        assert!((lat_to_y(0.0) - 0.5).abs() < 1e-12);
        assert_eq!(lat_to_y(90.0), 0.0);
        assert_eq!(lat_to_y(-90.0), 1.0);
        // Web Mercator cut-off latitude lands on the edge of the plane
        assert!(lat_to_y(85.0511287798066).abs() < 1e-9);
    }

    #[test]
    fn test_north_is_up() {
        assert!(lat_to_y(50.0) < lat_to_y(0.0));
        assert!(lat_to_y(-50.0) > lat_to_y(0.0));
    }

    #[test]
    fn test_bounded_projection() {
        assert_eq!(wrap_lng(190.0), -170.0);
        assert_eq!(wrap_lng(-190.0), 170.0);
        assert_eq!(wrap_lng(180.0), -180.0);
        assert_eq!(wrap_lng(-180.0), -180.0);
        assert!((bounded_lng_to_x(540.0) - lng_to_x(-180.0)).abs() < 1e-12);
        assert_eq!(bounded_lat_to_y(120.0), 0.0);
        assert_eq!(bounded_lat_to_y(-120.0), 1.0);
    }

    #[test]
    fn test_nan_propagates() {
        assert!(lng_to_x(f64::NAN).is_nan());
        assert!(lat_to_y(f64::NAN).is_nan());
    }

    #[test]
    fn test_fround() {
        assert_eq!(fround(0.5), 0.5);
        assert_eq!(fround(0.1), f64::from(0.1_f32));
        assert_ne!(fround(0.1), 0.1);
    }

    quickcheck! {
        fn prop_lat_round_trip(raw: i32) -> TestResult {
            let lat = f64::from(raw % 85_000) / 1000.0;
            TestResult::from_bool((y_to_lat(lat_to_y(lat)) - lat).abs() < 1e-9)
        }

        fn prop_lng_round_trip(raw: i32) -> TestResult {
            let lng = f64::from(raw % 180_000) / 1000.0;
            TestResult::from_bool((x_to_lng(lng_to_x(lng)) - lng).abs() < 1e-9)
        }

        fn prop_wrap_lng_in_range(raw: i32) -> bool {
            let lng = wrap_lng(f64::from(raw) / 100.0);
            (-180.0..180.0).contains(&lng)
        }
    }
}
