//! Coordinate and viewport types shared by the geocoders, the tiler, and
//! the nearby-search providers.

use serde::{Deserialize, Serialize};

/// Margin in degrees used when a geocoder resolves a point but no viewport.
pub const DEFAULT_VIEWPORT_MARGIN_DEGREES: f64 = 0.05;

/// Fixed meters-per-degree approximations for ~61.5°N (southern and central
/// Finland). Good enough for city-scale tiling, not geodesically exact.
pub const METERS_PER_LAT_DEGREE: f64 = 111_000.0;
pub const METERS_PER_LNG_DEGREE: f64 = 53_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Rectangular viewport. `northeast` is never south or west of `southwest`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub northeast: LatLng,
    pub southwest: LatLng,
}

impl BoundingBox {
    /// Builds a box, rejecting inverted corners and non-finite coordinates.
    #[must_use]
    pub fn new(northeast: LatLng, southwest: LatLng) -> Option<Self> {
        let finite = [northeast.lat, northeast.lng, southwest.lat, southwest.lng]
            .iter()
            .all(|v| v.is_finite());
        if !finite || northeast.lat < southwest.lat || northeast.lng < southwest.lng {
            return None;
        }
        Some(Self {
            northeast,
            southwest,
        })
    }

    /// Synthesizes a square box `margin` degrees around `center`.
    #[must_use]
    pub fn around(center: LatLng, margin: f64) -> Self {
        let margin = margin.abs();
        Self {
            northeast: LatLng::new(center.lat + margin, center.lng + margin),
            southwest: LatLng::new(center.lat - margin, center.lng - margin),
        }
    }

    /// Box covering a circle of `radius_meters` around `center`.
    #[must_use]
    pub fn around_meters(center: LatLng, radius_meters: u32) -> Self {
        let radius = f64::from(radius_meters);
        let dlat = radius / METERS_PER_LAT_DEGREE;
        let dlng = radius / METERS_PER_LNG_DEGREE;
        Self {
            northeast: LatLng::new(center.lat + dlat, center.lng + dlng),
            southwest: LatLng::new(center.lat - dlat, center.lng - dlng),
        }
    }

    #[must_use]
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.northeast.lat + self.southwest.lat) / 2.0,
            (self.northeast.lng + self.southwest.lng) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_inverted_corners() {
        let ne = LatLng::new(61.4, 23.9);
        let sw = LatLng::new(61.5, 23.6);
        assert!(BoundingBox::new(ne, sw).is_none());
        assert!(BoundingBox::new(sw, ne).is_none());
    }

    #[test]
    fn new_rejects_nan() {
        let ne = LatLng::new(f64::NAN, 23.9);
        assert!(BoundingBox::new(ne, LatLng::new(61.4, 23.6)).is_none());
    }

    #[test]
    fn new_accepts_degenerate_point_box() {
        let p = LatLng::new(61.5, 23.7);
        assert!(BoundingBox::new(p, p).is_some());
    }

    #[test]
    fn around_meters_scales_longitude_wider() {
        let bbox = BoundingBox::around_meters(LatLng::new(61.5, 23.75), 1110);
        assert!((bbox.northeast.lat - 61.51).abs() < 1e-9);
        let half_width = bbox.northeast.lng - 23.75;
        assert!(half_width > 0.02 && half_width < 0.022, "got {half_width}");
    }

    #[test]
    fn around_builds_symmetric_box() {
        let bbox = BoundingBox::around(LatLng::new(61.5, 23.75), 0.05);
        assert!((bbox.northeast.lat - 61.55).abs() < 1e-9);
        assert!((bbox.southwest.lng - 23.70).abs() < 1e-9);
        let c = bbox.center();
        assert!((c.lat - 61.5).abs() < 1e-9);
        assert!((c.lng - 23.75).abs() < 1e-9);
    }
}
