//! Events and records emitted by the simulation for UI feedback.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::GeoPoint;

/// Discrete things that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    /// A transit was accepted.
    TransitStarted {
        from: GeoPoint,
        to: GeoPoint,
        duration_ms: f64,
        heading_deg: f64,
    },
    /// A transit ended, by arrival or cancellation.
    TransitEnded { reason: TransitEnd, at: GeoPoint },
    /// A scan tick ran.
    ScanCompleted {
        inside_asset: u32,
        inside_base: u32,
    },
    /// New entrants into the base perimeter.
    BaseBreach { intruder_ids: Vec<String> },
    /// An alert record was appended to the log.
    AlertRaised { zone: Zone, intruder_count: u32 },
    ScanModeChanged { mode: ScanMode, interval_ms: f64 },
    /// A command failed validation.
    CommandRejected { reason: String },
}

/// Operator-facing message for the notice area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub tick: u64,
}

/// Frozen view of one intruder at alert time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntruderSnapshot {
    pub id: String,
    pub name: String,
    pub position: GeoPoint,
    pub grid_reference: Option<String>,
    pub distance_to_asset_m: f64,
    pub distance_to_base_m: f64,
}

/// One entry of the alert log. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    /// Simulation time of the alert (milliseconds).
    pub timestamp_ms: u64,
    pub zone: Zone,
    pub intruders: Vec<IntruderSnapshot>,
}
