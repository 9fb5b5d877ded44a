//! Grid tiling for nearby-search sweeps.
//!
//! Converts a viewport into overlapping circular search tiles. Degree steps
//! come from the fixed regional constants in [`crate::geo`].

use crate::geo::{BoundingBox, LatLng, METERS_PER_LAT_DEGREE, METERS_PER_LNG_DEGREE};

/// Tile centers sit 1.5 radii apart so neighbouring circles overlap.
const STEP_RADIUS_FACTOR: f64 = 1.5;

/// One search-tile center.
pub type GridPoint = LatLng;

/// Tile `bbox` with circles of `radius_meters`, capped at `max_points`.
///
/// Points are emitted row by row from the southwest corner (latitude outer,
/// longitude inner). When the full grid is larger than `max_points`, the
/// centered contiguous slice of exactly `max_points` points is returned.
#[must_use]
pub fn tile(bbox: &BoundingBox, radius_meters: u32, max_points: usize) -> Vec<GridPoint> {
    if max_points == 0 || radius_meters == 0 {
        return Vec::new();
    }

    let step_meters = f64::from(radius_meters) * STEP_RADIUS_FACTOR;
    let lat_step = step_meters / METERS_PER_LAT_DEGREE;
    let lng_step = step_meters / METERS_PER_LNG_DEGREE;

    let rows = steps_across(bbox.northeast.lat - bbox.southwest.lat, lat_step);
    let cols = steps_across(bbox.northeast.lng - bbox.southwest.lng, lng_step);
    let Some(total) = rows.checked_mul(cols) else {
        tracing::warn!(rows, cols, "grid size overflows; skipping grid sweep");
        return Vec::new();
    };

    // Only the centered slice is materialized, however large the full grid.
    let (start, len) = if total <= max_points {
        (0, total)
    } else {
        ((total - max_points) / 2, max_points)
    };

    (start..start + len)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let lat = bbox.southwest.lat + (i / cols) as f64 * lat_step;
            #[allow(clippy::cast_precision_loss)]
            let lng = bbox.southwest.lng + (i % cols) as f64 * lng_step;
            GridPoint { lat, lng }
        })
        .collect()
}

/// Number of tile starts in `[0, span)` at `step` spacing, never fewer than one.
fn steps_across(span: f64, step: f64) -> usize {
    if span.is_nan() || span <= 0.0 {
        return 1;
    }
    // Exact multiples must not gain a trailing tile from float noise.
    let raw = (span / step - 1e-9).ceil();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = raw.max(1.0) as usize;
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 0.12° × 0.42° around Tampere: 5 rows × 8 columns at a 2 km radius.
    fn tampere_box() -> BoundingBox {
        BoundingBox::new(LatLng::new(61.57, 24.02), LatLng::new(61.45, 23.60))
            .expect("valid box")
    }

    #[test]
    fn uncapped_grid_has_expected_dimensions() {
        let points = tile(&tampere_box(), 2000, usize::MAX);
        assert_eq!(points.len(), 40);
        assert!((points[0].lat - 61.45).abs() < 1e-9);
        assert!((points[0].lng - 23.60).abs() < 1e-9);
    }

    #[test]
    fn capped_grid_is_centered_slice() {
        let full = tile(&tampere_box(), 2000, usize::MAX);
        let capped = tile(&tampere_box(), 2000, 9);
        assert_eq!(capped.len(), 9);
        assert_eq!(capped.as_slice(), &full[15..24]);
    }

    #[test]
    fn small_grid_is_returned_whole() {
        let bbox = BoundingBox::around(LatLng::new(61.5, 23.75), 0.01);
        let points = tile(&bbox, 2000, 9);
        assert_eq!(points.len(), 1);
        assert!((points[0].lat - 61.49).abs() < 1e-9);
    }

    #[test]
    fn degenerate_box_yields_single_point() {
        let p = LatLng::new(61.5, 23.75);
        let bbox = BoundingBox::new(p, p).expect("valid box");
        assert_eq!(tile(&bbox, 2000, 9), vec![p]);
    }

    #[test]
    fn zero_cap_yields_nothing() {
        assert!(tile(&tampere_box(), 2000, 0).is_empty());
    }

    #[test]
    fn never_exceeds_cap() {
        let bbox = BoundingBox::new(LatLng::new(62.5, 26.0), LatLng::new(60.0, 22.0))
            .expect("valid box");
        for cap in [1, 2, 9, 25, 100] {
            assert!(tile(&bbox, 500, cap).len() <= cap);
        }
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn tiny_radius_over_large_box_stays_bounded() {
        // ~12 000 rows × ~3 500 cols at a 10 m radius; only the cap is built.
        let bbox = BoundingBox::new(LatLng::new(62.0, 25.0), LatLng::new(61.0, 24.0))
            .expect("valid box");
        let points = tile(&bbox, 10, 9);
        assert_eq!(points.len(), 9);

        let lat_step = 15.0 / METERS_PER_LAT_DEGREE;
        let lng_step = 15.0 / METERS_PER_LNG_DEGREE;
        let rows = steps_across(1.0, lat_step);
        let cols = steps_across(1.0, lng_step);
        let start = (rows * cols - 9) / 2;
        for (offset, point) in points.iter().enumerate() {
            let i = start + offset;
            let expected_lat = 61.0 + (i / cols) as f64 * lat_step;
            let expected_lng = 24.0 + (i % cols) as f64 * lng_step;
            assert!((point.lat - expected_lat).abs() < 1e-9);
            assert!((point.lng - expected_lng).abs() < 1e-9);
        }
        assert!(points
            .iter()
            .all(|p| (61.0..=62.0).contains(&p.lat) && (24.0..=25.0).contains(&p.lng)));
    }

    #[test]
    fn single_row_cap_slices_columns() {
        let bbox = BoundingBox::new(LatLng::new(61.5, 23.8), LatLng::new(61.5, 23.6))
            .expect("valid box");
        let full = tile(&bbox, 2000, usize::MAX);
        assert_eq!(tile(&bbox, 2000, 2), full[1..3].to_vec());
    }

    #[test]
    fn odd_surplus_rounds_slice_start_down() {
        // 1 row × 4 cols, cap 1 → start index (4 - 1) / 2 = 1.
        let bbox = BoundingBox::new(LatLng::new(61.5, 23.8), LatLng::new(61.5, 23.6))
            .expect("valid box");
        let full = tile(&bbox, 2000, usize::MAX);
        assert_eq!(full.len(), 4);
        assert_eq!(tile(&bbox, 2000, 1), vec![full[1]]);
    }
}
