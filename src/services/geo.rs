// src/services/geo.rs
// DOCUMENTATION: Geographic helpers for radius search
// PURPOSE: Bounding boxes for SQL prefiltering and great-circle distances for results

use geo_types::Point;

const EARTH_RADIUS_KM: f64 = 6371.0;
const KM_PER_DEGREE_LAT: f64 = 111.0;

/// Rectangular lat/lng window around a point
/// DOCUMENTATION: Used as a cheap index-friendly prefilter in SQL search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Box containing every point within `radius_km` of `center`
    ///
    /// 1 degree of latitude ≈ 111 km
    /// 1 degree of longitude ≈ 111 km * cos(latitude)
    pub fn around(center: Point<f64>, radius_km: f64) -> Self {
        let lat_delta = radius_km / KM_PER_DEGREE_LAT;
        let cos_lat = center.y().to_radians().cos().abs().max(0.01);
        let lng_delta = radius_km / (KM_PER_DEGREE_LAT * cos_lat);

        BoundingBox {
            min_lat: center.y() - lat_delta,
            max_lat: center.y() + lat_delta,
            min_lng: center.x() - lng_delta,
            max_lng: center.x() + lng_delta,
        }
    }
}

/// Point from latitude/longitude (x = longitude, y = latitude)
pub fn point(lat: f64, lng: f64) -> Point<f64> {
    Point::new(lng, lat)
}

/// Haversine distance in kilometers
pub fn distance_km(a: Point<f64>, b: Point<f64>) -> f64 {
    let (lat1, lat2) = (a.y().to_radians(), b.y().to_radians());
    let d_lat = lat2 - lat1;
    let d_lng = (b.x() - a.x()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

pub fn valid_coordinates(lat: f64, lng: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seoul_to_busan_distance() {
        let seoul = point(37.5665, 126.9780);
        let busan = point(35.1796, 129.0756);
        let d = distance_km(seoul, busan);
        assert!((d - 325.0).abs() < 5.0, "got {}", d);
    }

    #[test]
    fn test_bounding_box_contains_radius() {
        let center = point(37.5665, 126.9780);
        let bbox = BoundingBox::around(center, 5.0);

        assert!((bbox.max_lat - bbox.min_lat - 10.0 / 111.0).abs() < 1e-9);
        // Longitude span widens away from the equator
        assert!(bbox.max_lng - bbox.min_lng > bbox.max_lat - bbox.min_lat);

        let east = point(37.5665, bbox.max_lng);
        assert!((distance_km(center, east) - 5.0).abs() < 0.1);
    }

    #[test]
    fn test_valid_coordinates() {
        assert!(valid_coordinates(37.5, 127.0));
        assert!(!valid_coordinates(91.0, 0.0));
        assert!(!valid_coordinates(0.0, -181.0));
    }
}
