//! Render snapshot: the complete visible state handed to the rendering
//! adapter after each tick. Immutable once built.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::{AlertRecord, Notice, SimEvent};
use crate::types::{GeoPoint, GridLine, SimTime};

/// Complete simulation state broadcast after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub time: SimTime,
    pub phase: SimPhase,
    pub asset: AssetView,
    pub base: BaseView,
    pub intruders: Vec<IntruderView>,
    /// Present only while a transit is active.
    pub route: Option<RouteView>,
    pub grid: Vec<GridLine>,
    pub scan: ScanView,
    /// Newest first.
    pub alert_log: Vec<AlertRecord>,
    pub last_clicked: Option<ClickView>,
    pub events: Vec<SimEvent>,
    pub notices: Vec<Notice>,
}

/// Asset position and flight state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetView {
    pub position: GeoPoint,
    pub grid_reference: String,
    pub altitude_m: f64,
    pub heading_deg: f64,
    /// 8-point compass text for the heading.
    pub heading_text: String,
    pub speed_kmh: f64,
    pub detection_radius_m: f64,
    pub distance_from_base_m: f64,
    pub navigation: NavigationStatus,
}

/// Protected site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseView {
    pub position: GeoPoint,
    pub grid_reference: String,
    pub perimeter_radius_m: f64,
}

/// One intruder marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntruderView {
    pub id: String,
    pub name: String,
    pub position: GeoPoint,
    /// `None` until scanned since the last move.
    pub distance_to_asset_m: Option<f64>,
    pub distance_to_base_m: Option<f64>,
    pub inside_asset_radius: bool,
    pub inside_base_perimeter: bool,
    pub detected_by: Vec<Zone>,
    /// Grid reference or the unknown placeholder.
    pub grid_reference: String,
    /// Breach vs. clear marker styling.
    pub breach: bool,
}

/// Route line from the live asset position to the destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteView {
    pub from: GeoPoint,
    pub to: GeoPoint,
    /// Transit progress in [0, 1].
    pub progress: f64,
}

/// Scan scheduler status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanView {
    pub mode: ScanMode,
    pub interval_ms: f64,
    /// Simulation time of the next automatic scan, if scheduled.
    pub next_scan_ms: Option<f64>,
    pub scans_run: u64,
}

/// Last point the operator clicked on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickView {
    pub point: GeoPoint,
    pub grid_reference: String,
}
