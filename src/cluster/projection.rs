use std::f64::consts::PI;

/// Coefficient to translate from degrees to radians
pub const DEGREE_RAD: f64 = PI / 180.0;

/// Projects longitude into the normalized Mercator plane, `[-180, 180] -> [0, 1]`
pub fn lng_to_x(lng: f64) -> f64 {
    lng / 360.0 + 0.5
}

/// Projects latitude into the normalized spherical Mercator plane
///
/// North is `0`, south is `1`. The result is clamped to `[0, 1]`, so the
/// poles map onto the edges of the plane. NaN propagates.
pub fn lat_to_y(lat: f64) -> f64 {
    let sin = (lat * DEGREE_RAD).sin();
    let y = 0.5 - 0.25 * ((1.0 + sin) / (1.0 - sin)).ln() / PI;

    if y < 0.0 {
        0.0
    } else if y > 1.0 {
        1.0
    } else {
        y
    }
}

/// Inverse of [`lng_to_x`]
pub fn x_to_lng(x: f64) -> f64 {
    (x - 0.5) * 360.0
}

/// Inverse of [`lat_to_y`]
pub fn y_to_lat(y: f64) -> f64 {
    360.0 * ((1.0 - y * 2.0) * PI).exp().atan() / PI - 90.0
}

/// Wraps longitude into `[-180, 180)`
pub fn wrap_lng(lng: f64) -> f64 {
    (lng + 180.0).rem_euclid(360.0) - 180.0
}

/// Same as [`lng_to_x`], but wraps longitude first
pub fn bounded_lng_to_x(lng: f64) -> f64 {
    lng_to_x(wrap_lng(lng))
}

/// Same as [`lat_to_y`], but clamps latitude into `[-90, 90]` first
pub fn bounded_lat_to_y(lat: f64) -> f64 {
    lat_to_y(lat.clamp(-90.0, 90.0))
}

/// Rounds to single precision
///
/// Every coordinate stored in an index goes through this, both for input
/// points and for cluster centroids, so ordering and radius comparisons
/// stay consistent within one build.
pub fn fround(v: f64) -> f64 {
    f64::from(v as f32)
}
