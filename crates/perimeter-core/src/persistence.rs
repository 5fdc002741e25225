//! Records exchanged with the external mission store.

use serde::{Deserialize, Serialize};

use crate::events::AlertRecord;
use crate::types::GeoPoint;

/// Last known asset state plus recent alerts, read once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionRecord {
    pub position: GeoPoint,
    pub altitude: f64,
    pub heading: f64,
    pub detection_radius: f64,
    #[serde(default)]
    pub alerts: Vec<AlertRecord>,
}

/// A best-effort write queued by the engine for the persistence driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PersistRequest {
    Target(GeoPoint),
    Alert(AlertRecord),
}
