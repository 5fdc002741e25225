//! Operator commands sent from the input surface to the simulation.
//!
//! Commands are validated when submitted and applied at the next tick
//! boundary. A rejected command changes nothing.

use serde::{Deserialize, Serialize};

use crate::enums::ScanMode;
use crate::types::{GeoPoint, Viewport};

/// All possible operator actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OperatorCommand {
    // --- Navigation ---
    /// Send the asset to a new destination. Replaces any active transit.
    SetTarget { target: TargetInput },
    /// Cancel the active transit and hold at the current position.
    StopTransit,

    // --- Flight parameters ---
    SetAltitude { meters: f64 },
    SetHeading { degrees: f64 },
    SetSpeed { kmh: f64 },
    SetAssetRadius { meters: f64 },

    // --- Base ---
    SetBaseRadius { meters: f64 },
    /// Relocate the protected site (already confirmed by the operator).
    MoveBase { position: GeoPoint },

    // --- Detection ---
    /// Run one scan immediately, whatever the scan mode.
    ScanNow,
    /// Raise an alert for every intruder inside the asset radius.
    RaiseAlert,
    SetScanMode { mode: ScanMode },
    SetScanInterval { interval_ms: f64 },

    // --- Map ---
    ViewportChanged { viewport: Viewport },
    MapClicked { point: GeoPoint },

    // --- Simulation control ---
    Pause,
    Resume,
}

/// A destination as typed by the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TargetInput {
    /// Decimal degrees.
    LatLon { lat: f64, lon: f64 },
    /// Three-part grid reference, e.g. `47P PR 07315 71459`.
    GridReference { text: String },
}
