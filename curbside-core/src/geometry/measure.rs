use geo::{Distance, Haversine, Length};

use crate::model::{LatLng, Polyline};

/// Great-circle distance in metres
pub fn distance_m(a: LatLng, b: LatLng) -> f64 {
    Haversine.distance(a.to_point(), b.to_point())
}

/// Sum of great-circle distances between consecutive points.
/// Lines with fewer than two points have length 0.
pub fn line_length(line: &Polyline) -> f64 {
    if line.len() < 2 {
        return 0.0;
    }
    Haversine.length(&line.to_line_string())
}
