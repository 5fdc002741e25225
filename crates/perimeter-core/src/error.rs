//! Error types shared across crates.

use thiserror::Error;

/// Failures of the grid-reference codec.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridRefError {
    #[error("latitude {0} is outside the gridded band [-80, 84]")]
    LatitudeOutOfRange(f64),
    #[error("coordinate is not a finite number")]
    NonFinite,
    #[error("precision {0} exceeds the maximum of 5 digits")]
    PrecisionTooHigh(u8),
    #[error("malformed grid reference: {0}")]
    Malformed(String),
    #[error("zone {0} is outside 1-60")]
    InvalidZone(u32),
    #[error("band letter '{0}' is not a valid latitude band")]
    InvalidBand(char),
    #[error("100 km square letter '{0}' is not valid here")]
    InvalidSquare(char),
}

/// Reasons an operator command was rejected. No state changes on rejection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("latitude must be a number between -90 and 90 (got {0})")]
    InvalidLatitude(f64),
    #[error("longitude must be a number between -180 and 180 (got {0})")]
    InvalidLongitude(f64),
    #[error("grid zone must be 1-2 digits followed by a band letter (got '{0}')")]
    InvalidGridZone(String),
    #[error("100 km square must be two letters (got '{0}')")]
    InvalidGridSquare(String),
    #[error("grid offset must be an even count of 2-10 digits (got '{0}')")]
    InvalidGridOffset(String),
    #[error("grid reference could not be converted: {0}")]
    GridConversion(#[from] GridRefError),
    #[error("{field} must be greater than zero (got {value})")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("scan interval must be at least {min} ms (got {value})")]
    ScanIntervalTooShort { min: f64, value: f64 },
    #[error("viewport bounds are not valid")]
    InvalidViewport,
    #[error("intruder id '{0}' is used more than once")]
    DuplicateIntruderId(String),
}

/// Failures reported by a mission repository.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("repository unreachable: {0}")]
    Unreachable(String),
    #[error("repository returned status {0}")]
    Status(u16),
    #[error("failed to decode repository payload: {0}")]
    Decode(String),
    #[error("repository store is poisoned")]
    Poisoned,
}
