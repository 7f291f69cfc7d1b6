use geo::Coord;

use crate::model::LatLng;

/// Mean earth radius in metres, matching `geo`'s haversine
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Equirectangular projection around an origin: x grows east, y grows north,
/// both in metres. Accurate to well under a metre across a city district.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    origin: LatLng,
    meters_per_deg_lat: f64,
    meters_per_deg_lng: f64,
}

impl LocalFrame {
    pub fn new(origin: LatLng) -> Self {
        let meters_per_deg_lat = EARTH_RADIUS_M.to_radians();
        let meters_per_deg_lng = (meters_per_deg_lat * origin.lat.to_radians().cos()).max(1e-6);
        Self {
            origin,
            meters_per_deg_lat,
            meters_per_deg_lng,
        }
    }

    /// Frame centred on the mean of `points`
    pub fn around(points: &[LatLng]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = points.len() as f64;
        let (lat, lng) = points
            .iter()
            .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));
        Some(Self::new(LatLng::new(lat / n, lng / n)))
    }

    pub fn origin(&self) -> LatLng {
        self.origin
    }

    pub fn to_local(&self, point: LatLng) -> Coord<f64> {
        Coord {
            x: (point.lng - self.origin.lng) * self.meters_per_deg_lng,
            y: (point.lat - self.origin.lat) * self.meters_per_deg_lat,
        }
    }

    pub fn to_lat_lng(&self, coord: Coord<f64>) -> LatLng {
        LatLng::new(
            self.origin.lat + coord.y / self.meters_per_deg_lat,
            self.origin.lng + coord.x / self.meters_per_deg_lng,
        )
    }

    pub fn project_line(&self, points: &[LatLng]) -> Vec<Coord<f64>> {
        points.iter().map(|p| self.to_local(*p)).collect()
    }

    pub fn unproject_line(&self, coords: &[Coord<f64>]) -> Vec<LatLng> {
        coords.iter().map(|c| self.to_lat_lng(*c)).collect()
    }
}
