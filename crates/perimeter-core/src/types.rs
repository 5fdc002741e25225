//! Fundamental geographic and simulation types.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::GridAxis;

/// A point on the spherical earth in decimal degrees.
///
/// Longitude is kept in (-180, 180] by every constructor in this crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    #[serde(alias = "lng")]
    pub lon: f64,
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

/// Visible map area reported by the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub south: f64,
    pub north: f64,
    pub east: f64,
    pub west: f64,
    pub zoom: f64,
}

/// One reference grid line, already clipped to the viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLine {
    /// `Latitude` lines run east-west at a fixed latitude.
    pub axis: GridAxis,
    pub start: GeoPoint,
    pub end: GeoPoint,
    /// Where the label is anchored on the map.
    pub label_anchor: GeoPoint,
    pub label: String,
}

impl GeoPoint {
    /// Build a point, wrapping the longitude into (-180, 180].
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon: normalize_longitude(lon),
        }
    }

    /// Both coordinates are finite and the latitude is within [-90, 90].
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite() && (-90.0..=90.0).contains(&self.lat)
    }

    /// Planar view for interpolation: x = longitude, y = latitude.
    pub fn to_dvec2(self) -> DVec2 {
        DVec2::new(self.lon, self.lat)
    }

    pub fn from_dvec2(v: DVec2) -> Self {
        Self::new(v.y, v.x)
    }
}

/// Wrap a longitude in degrees into (-180, 180].
pub fn normalize_longitude(lon: f64) -> f64 {
    if lon > -180.0 && lon <= 180.0 {
        return lon;
    }
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Wrap a heading in degrees into [0, 360).
pub fn normalize_heading(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

impl SimTime {
    /// Seconds per tick at the default tick rate.
    pub fn dt(&self) -> f64 {
        1.0 / crate::constants::TICK_RATE as f64
    }

    /// Advance by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed_secs += self.dt();
    }

    /// Elapsed simulation time in milliseconds.
    pub fn now_ms(&self) -> f64 {
        self.elapsed_secs * 1000.0
    }
}

impl Viewport {
    /// A square-ish viewport of `half_span_deg` around a center point.
    pub fn around(center: GeoPoint, half_span_deg: f64, zoom: f64) -> Self {
        Self {
            south: center.lat - half_span_deg,
            north: center.lat + half_span_deg,
            east: center.lon + half_span_deg,
            west: center.lon - half_span_deg,
            zoom,
        }
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint {
            lat: (self.south + self.north) / 2.0,
            lon: (self.east + self.west) / 2.0,
        }
    }

    /// Bounds are finite, ordered and the zoom is finite.
    pub fn is_valid(&self) -> bool {
        [self.south, self.north, self.east, self.west, self.zoom]
            .iter()
            .all(|v| v.is_finite())
            && self.south <= self.north
            && self.west <= self.east
    }
}
