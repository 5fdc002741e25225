//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Detection zone that can flag an intruder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    /// Mobile zone centered on the asset.
    Asset,
    /// Fixed perimeter around the base.
    Base,
}

/// How detection scans are scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Scan only on explicit invocation.
    #[default]
    Manual,
    /// Scan on a fixed period.
    Auto,
}

/// Simulation run state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimPhase {
    #[default]
    Running,
    Paused,
}

/// Navigation controller state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationStatus {
    #[default]
    Idle,
    InTransit,
}

/// Severity of an operator-facing notice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    #[default]
    Info,
    Warning,
}

/// Axis a grid line follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridAxis {
    /// Constant latitude, runs west to east.
    Latitude,
    /// Constant longitude, runs south to north.
    Longitude,
}

/// Why a transit ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitEnd {
    Arrived,
    Stopped,
    Retargeted,
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Zone::Asset => write!(f, "asset"),
            Zone::Base => write!(f, "base"),
        }
    }
}

impl std::str::FromStr for ScanMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "manual" => Ok(ScanMode::Manual),
            "auto" => Ok(ScanMode::Auto),
            other => Err(format!("unknown scan mode '{other}' (expected manual or auto)")),
        }
    }
}
