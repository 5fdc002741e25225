//! Reference grid overlay for the current map viewport.
//!
//! The full line set is rebuilt from scratch for every viewport change.

use perimeter_core::constants::{MAX_GRID_LINES_PER_AXIS, METERS_PER_DEGREE, MIN_COS_LATITUDE};
use perimeter_core::enums::GridAxis;
use perimeter_core::types::{GeoPoint, GridLine, Viewport};

use crate::grid_ref::grid_reference_or_unknown;

/// Grid spacing in meters for a map zoom level.
pub fn choose_grid_step(zoom: f64) -> f64 {
    if zoom >= 16.0 {
        200.0
    } else if zoom >= 14.0 {
        500.0
    } else if zoom >= 12.0 {
        1_000.0
    } else if zoom >= 10.0 {
        2_000.0
    } else {
        5_000.0
    }
}

/// Grid-reference digits per axis that suit a grid spacing.
pub fn grid_precision_for_step(step_m: f64) -> u8 {
    if step_m >= 5_000.0 {
        1
    } else if step_m >= 2_000.0 {
        2
    } else if step_m >= 1_000.0 {
        3
    } else if step_m >= 500.0 {
        4
    } else {
        5
    }
}

/// Degree spacing derived from a metric step at the viewport center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpacing {
    pub step_m: f64,
    pub precision: u8,
    pub lat_step_deg: f64,
    pub lon_step_deg: f64,
}

impl GridSpacing {
    pub fn for_viewport(viewport: &Viewport) -> Self {
        let step_m = choose_grid_step(viewport.zoom);
        let cos_lat = viewport
            .center()
            .lat
            .to_radians()
            .cos()
            .max(MIN_COS_LATITUDE);
        Self {
            step_m,
            precision: grid_precision_for_step(step_m),
            lat_step_deg: step_m / METERS_PER_DEGREE,
            lon_step_deg: step_m / (METERS_PER_DEGREE * cos_lat),
        }
    }
}

/// Build every grid line and label for a viewport.
///
/// Lines sit on step multiples from the one at or below the lower bound to
/// the one at or above the upper bound, and span the viewport edge to edge.
pub fn layout_grid(viewport: &Viewport) -> Vec<GridLine> {
    if !viewport.is_valid() {
        return Vec::new();
    }
    let spacing = GridSpacing::for_viewport(viewport);
    let mut lines = Vec::new();

    for lat in step_multiples(viewport.south, viewport.north, spacing.lat_step_deg) {
        let start = GeoPoint {
            lat,
            lon: viewport.west,
        };
        lines.push(GridLine {
            axis: GridAxis::Latitude,
            start,
            end: GeoPoint {
                lat,
                lon: viewport.east,
            },
            label_anchor: start,
            label: grid_reference_or_unknown(start, spacing.precision),
        });
    }

    for lon in step_multiples(viewport.west, viewport.east, spacing.lon_step_deg) {
        let top = GeoPoint {
            lat: viewport.north,
            lon,
        };
        lines.push(GridLine {
            axis: GridAxis::Longitude,
            start: GeoPoint {
                lat: viewport.south,
                lon,
            },
            end: top,
            label_anchor: top,
            label: grid_reference_or_unknown(top, spacing.precision),
        });
    }

    lines
}

/// Step-aligned values bracketing [low, high]. Empty if the span would need
/// more than `MAX_GRID_LINES_PER_AXIS` lines.
fn step_multiples(low: f64, high: f64, step: f64) -> Vec<f64> {
    if !(step.is_finite() && step > 0.0) {
        return Vec::new();
    }
    let first = (low / step).floor() as i64;
    let last = (high / step).ceil() as i64;
    if last - first + 1 > MAX_GRID_LINES_PER_AXIS {
        return Vec::new();
    }
    (first..=last).map(|k| k as f64 * step).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_step_table_boundaries() {
        assert_eq!(choose_grid_step(18.0), 200.0);
        assert_eq!(choose_grid_step(16.0), 200.0);
        assert_eq!(choose_grid_step(15.99), 500.0);
        assert_eq!(choose_grid_step(14.0), 500.0);
        assert_eq!(choose_grid_step(13.99), 1_000.0);
        assert_eq!(choose_grid_step(12.0), 1_000.0);
        assert_eq!(choose_grid_step(11.99), 2_000.0);
        assert_eq!(choose_grid_step(10.0), 2_000.0);
        assert_eq!(choose_grid_step(9.99), 5_000.0);
        assert_eq!(choose_grid_step(3.0), 5_000.0);
    }

    #[test]
    fn test_precision_table_boundaries() {
        assert_eq!(grid_precision_for_step(10_000.0), 1);
        assert_eq!(grid_precision_for_step(5_000.0), 1);
        assert_eq!(grid_precision_for_step(4_999.0), 2);
        assert_eq!(grid_precision_for_step(2_000.0), 2);
        assert_eq!(grid_precision_for_step(1_999.0), 3);
        assert_eq!(grid_precision_for_step(1_000.0), 3);
        assert_eq!(grid_precision_for_step(999.0), 4);
        assert_eq!(grid_precision_for_step(500.0), 4);
        assert_eq!(grid_precision_for_step(499.0), 5);
        assert_eq!(grid_precision_for_step(200.0), 5);
    }

    #[test]
    fn test_spacing_clamps_cosine_near_pole() {
        let polar = Viewport::around(GeoPoint::new(89.0, 0.0), 0.1, 13.0);
        let spacing = GridSpacing::for_viewport(&polar);
        let expected = 1_000.0 / (METERS_PER_DEGREE * MIN_COS_LATITUDE);
        assert!((spacing.lon_step_deg - expected).abs() < 1e-12);
    }

    #[test]
    fn test_lines_bracket_viewport() {
        let viewport = Viewport::around(GeoPoint::new(14.2059, 101.2134), 0.05, 13.0);
        let spacing = GridSpacing::for_viewport(&viewport);
        let lines = layout_grid(&viewport);

        let lats: Vec<f64> = lines
            .iter()
            .filter(|l| l.axis == GridAxis::Latitude)
            .map(|l| l.start.lat)
            .collect();
        let lons: Vec<f64> = lines
            .iter()
            .filter(|l| l.axis == GridAxis::Longitude)
            .map(|l| l.start.lon)
            .collect();

        assert!(lats.first().copied().unwrap() <= viewport.south);
        assert!(lats.last().copied().unwrap() >= viewport.north);
        assert!(lons.first().copied().unwrap() <= viewport.west);
        assert!(lons.last().copied().unwrap() >= viewport.east);
        for pair in lats.windows(2) {
            assert!((pair[1] - pair[0] - spacing.lat_step_deg).abs() < 1e-9);
        }
        assert!(lats.first().unwrap() > &(viewport.south - spacing.lat_step_deg));
    }

    #[test]
    fn test_lines_span_viewport_edges_with_labels() {
        let viewport = Viewport::around(GeoPoint::new(14.2059, 101.2134), 0.02, 15.0);
        for line in layout_grid(&viewport) {
            match line.axis {
                GridAxis::Latitude => {
                    assert_eq!(line.start.lon, viewport.west);
                    assert_eq!(line.end.lon, viewport.east);
                }
                GridAxis::Longitude => {
                    assert_eq!(line.start.lat, viewport.south);
                    assert_eq!(line.end.lat, viewport.north);
                }
            }
            // zoom 15 -> 500 m -> 4 digits per axis
            assert!(line.label.starts_with("47P"), "{}", line.label);
            assert_eq!(line.label.len(), "47PQR".len() + 8);
        }
    }

    #[test]
    fn test_regeneration_is_deterministic() {
        let viewport = Viewport::around(GeoPoint::new(14.2059, 101.2134), 0.05, 12.0);
        assert_eq!(layout_grid(&viewport), layout_grid(&viewport));
    }

    #[test]
    fn test_zoomed_out_screen_keeps_both_axes() {
        // 1920x1080 pixels at zoom 7 over the default base.
        let viewport = Viewport {
            south: 14.2059 - 5.75,
            north: 14.2059 + 5.75,
            east: 101.2134 + 10.55,
            west: 101.2134 - 10.55,
            zoom: 7.0,
        };
        let spacing = GridSpacing::for_viewport(&viewport);
        let lines = layout_grid(&viewport);
        let lat_lines = lines.iter().filter(|l| l.axis == GridAxis::Latitude).count();
        let lon_lines = lines.iter().filter(|l| l.axis == GridAxis::Longitude).count();

        let expected_lons = ((viewport.east / spacing.lon_step_deg).ceil()
            - (viewport.west / spacing.lon_step_deg).floor()) as usize
            + 1;
        assert!(lat_lines > 200);
        assert!(lon_lines > 400);
        assert_eq!(lon_lines, expected_lons);
    }

    #[test]
    fn test_unbounded_viewport_yields_nothing() {
        let world = Viewport {
            south: -85.0,
            north: 85.0,
            east: 180.0,
            west: -180.0,
            zoom: 18.0,
        };
        assert!(layout_grid(&world).is_empty());

        let broken = Viewport {
            south: f64::NAN,
            ..world
        };
        assert!(layout_grid(&broken).is_empty());
    }
}
