//! ECS components for hecs entities.
//!
//! Components are plain data structs with no methods.
//! Simulation logic lives in systems, not components.
//! Positions are stored as bare `GeoPoint` components.

use serde::{Deserialize, Serialize};

use crate::enums::Zone;

/// Marker for the friendly sensor asset.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct OwnAsset;

/// Marker for the protected site.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Base;

/// Flight state of the asset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Kinematics {
    /// Altitude in meters (> 0).
    pub altitude_m: f64,
    /// Heading in degrees, [0, 360).
    pub heading_deg: f64,
    /// Speed in km/h (> 0).
    pub speed_kmh: f64,
}

/// Circular detection zone attached to the asset or the base.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DetectionZone {
    pub zone: Zone,
    pub radius_m: f64,
}

/// Identity of an unidentified contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intruder {
    pub id: String,
    pub name: String,
}

/// Derived detection data. `reading` is `None` until a scan has run since
/// the last position change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionState {
    pub reading: Option<ScanReading>,
}

/// Result of one scan for one intruder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReading {
    pub distance_to_asset_m: f64,
    pub distance_to_base_m: f64,
    pub inside_asset_radius: bool,
    pub inside_base_perimeter: bool,
    /// Zones currently flagging this intruder, sorted.
    pub detected_by: Vec<Zone>,
    /// Full-precision grid reference, `None` if it could not be encoded.
    pub grid_reference: Option<String>,
}
