//! Scenario configuration: where the base sits, how the asset starts, and
//! which intruders roam the area.
//!
//! Every field has a default, so a partial JSON file is a valid scenario.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use perimeter_core::constants::*;
use perimeter_core::enums::ScanMode;
use perimeter_core::error::CommandError;
use perimeter_core::types::{GeoPoint, Viewport};

use crate::validation;

/// One intruder in the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntruderSeed {
    pub id: String,
    pub name: String,
}

/// Initial world and tuning for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub base_position: GeoPoint,
    pub base_radius_m: f64,
    /// Asset start position. Defaults to the base position.
    pub asset_position: Option<GeoPoint>,
    pub altitude_m: f64,
    pub heading_deg: f64,
    pub speed_kmh: f64,
    pub asset_radius_m: f64,
    pub intruders: Vec<IntruderSeed>,
    pub intruder_max_radius_m: f64,
    pub intruder_max_step_m: f64,
    pub intruder_move_interval_ms: f64,
    pub scan_mode: ScanMode,
    pub scan_interval_ms: f64,
    /// Initial viewport. Defaults to a window around the base.
    pub viewport: Option<Viewport>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            base_position: GeoPoint::new(DEFAULT_BASE_LAT, DEFAULT_BASE_LON),
            base_radius_m: DEFAULT_BASE_RADIUS_M,
            asset_position: None,
            altitude_m: DEFAULT_ASSET_ALTITUDE_M,
            heading_deg: DEFAULT_ASSET_HEADING_DEG,
            speed_kmh: DEFAULT_ASSET_SPEED_KMH,
            asset_radius_m: DEFAULT_ASSET_RADIUS_M,
            intruders: DEFAULT_INTRUDERS
                .iter()
                .map(|(id, name)| IntruderSeed {
                    id: (*id).to_string(),
                    name: (*name).to_string(),
                })
                .collect(),
            intruder_max_radius_m: INTRUDER_MAX_RADIUS_M,
            intruder_max_step_m: INTRUDER_MAX_STEP_M,
            intruder_move_interval_ms: INTRUDER_MOVE_INTERVAL_MS,
            scan_mode: ScanMode::default(),
            scan_interval_ms: DEFAULT_SCAN_INTERVAL_MS,
            viewport: None,
        }
    }
}

impl ScenarioConfig {
    /// Parse a scenario from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn asset_start(&self) -> GeoPoint {
        self.asset_position.unwrap_or(self.base_position)
    }

    pub fn initial_viewport(&self) -> Viewport {
        self.viewport.unwrap_or_else(|| {
            Viewport::around(
                self.base_position,
                DEFAULT_VIEWPORT_HALF_SPAN_DEG,
                DEFAULT_ZOOM,
            )
        })
    }

    /// Check every value the engine relies on.
    pub fn validate(&self) -> Result<(), CommandError> {
        validation::check_point(self.base_position)?;
        validation::check_point(self.asset_start())?;
        validation::check_positive("base radius", self.base_radius_m)?;
        validation::check_positive("altitude", self.altitude_m)?;
        validation::check_finite("heading", self.heading_deg)?;
        validation::check_positive("speed", self.speed_kmh)?;
        validation::check_positive("asset radius", self.asset_radius_m)?;
        validation::check_positive("intruder max radius", self.intruder_max_radius_m)?;
        validation::check_finite("intruder max step", self.intruder_max_step_m)?;
        if self.intruder_max_step_m < 0.0 {
            return Err(CommandError::NotPositive {
                field: "intruder max step",
                value: self.intruder_max_step_m,
            });
        }
        validation::check_positive("intruder move interval", self.intruder_move_interval_ms)?;
        validation::check_scan_interval(self.scan_interval_ms)?;
        if !self.initial_viewport().is_valid() {
            return Err(CommandError::InvalidViewport);
        }
        let mut seen = HashSet::new();
        for seed in &self.intruders {
            if !seen.insert(seed.id.as_str()) {
                return Err(CommandError::DuplicateIntruderId(seed.id.clone()));
            }
        }
        Ok(())
    }
}
