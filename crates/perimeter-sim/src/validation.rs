//! Operator command validation.
//!
//! Every command is checked before it touches the world. A grid-reference
//! target is resolved to a point here, so the engine only ever sees
//! decimal-degree targets.

use perimeter_core::commands::{OperatorCommand, TargetInput};
use perimeter_core::constants::MIN_SCAN_INTERVAL_MS;
use perimeter_core::error::CommandError;
use perimeter_core::types::GeoPoint;

use perimeter_geo::grid_ref;

/// Validate a command, resolving any grid-reference target.
pub fn validate_command(command: OperatorCommand) -> Result<OperatorCommand, CommandError> {
    match command {
        OperatorCommand::SetTarget { target } => {
            let point = resolve_target(&target)?;
            Ok(OperatorCommand::SetTarget {
                target: TargetInput::LatLon {
                    lat: point.lat,
                    lon: point.lon,
                },
            })
        }
        OperatorCommand::SetAltitude { meters } => {
            check_positive("altitude", meters)?;
            Ok(command)
        }
        OperatorCommand::SetHeading { degrees } => {
            check_finite("heading", degrees)?;
            Ok(command)
        }
        OperatorCommand::SetSpeed { kmh } => {
            check_positive("speed", kmh)?;
            Ok(command)
        }
        OperatorCommand::SetAssetRadius { meters } => {
            check_positive("asset radius", meters)?;
            Ok(command)
        }
        OperatorCommand::SetBaseRadius { meters } => {
            check_positive("base radius", meters)?;
            Ok(command)
        }
        OperatorCommand::MoveBase { position } => {
            check_point(position)?;
            Ok(OperatorCommand::MoveBase {
                position: GeoPoint::new(position.lat, position.lon),
            })
        }
        OperatorCommand::SetScanInterval { interval_ms } => {
            check_scan_interval(interval_ms)?;
            Ok(command)
        }
        OperatorCommand::ViewportChanged { viewport } => {
            if viewport.is_valid() {
                Ok(command)
            } else {
                Err(CommandError::InvalidViewport)
            }
        }
        OperatorCommand::MapClicked { point } => {
            check_point(point)?;
            Ok(command)
        }
        OperatorCommand::StopTransit
        | OperatorCommand::ScanNow
        | OperatorCommand::RaiseAlert
        | OperatorCommand::SetScanMode { .. }
        | OperatorCommand::Pause
        | OperatorCommand::Resume => Ok(command),
    }
}

/// Turn an operator-typed destination into a point.
pub fn resolve_target(target: &TargetInput) -> Result<GeoPoint, CommandError> {
    match target {
        TargetInput::LatLon { lat, lon } => {
            let point = GeoPoint { lat: *lat, lon: *lon };
            check_point(point)?;
            Ok(GeoPoint::new(*lat, *lon))
        }
        TargetInput::GridReference { text } => parse_grid_reference(text),
    }
}

/// Parse a three-part grid reference such as `47P QR 38865 71630`.
///
/// Spacing is optional: the zone is 1-2 digits plus a band letter, the
/// square is two letters and the offset is an even count of 2-10 digits.
pub fn parse_grid_reference(text: &str) -> Result<GeoPoint, CommandError> {
    let compact: Vec<char> = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    let zone_digits = compact.iter().take_while(|c| c.is_ascii_digit()).count();
    let band = compact.get(zone_digits).copied();
    let band = match band {
        Some(b) if (1..=2).contains(&zone_digits) && b.is_ascii_alphabetic() => b,
        _ => return Err(CommandError::InvalidGridZone(text.trim().to_string())),
    };
    let zone: u32 = compact[..zone_digits]
        .iter()
        .collect::<String>()
        .parse()
        .map_err(|_| CommandError::InvalidGridZone(text.trim().to_string()))?;

    let rest = &compact[zone_digits + 1..];
    let square = match rest {
        [c, r, ..] if c.is_ascii_alphabetic() && r.is_ascii_alphabetic() => [*c, *r],
        _ => {
            let shown: String = rest.iter().take(2).collect();
            return Err(CommandError::InvalidGridSquare(shown));
        }
    };

    let digits: String = rest[2..].iter().collect();
    let digits_ok = digits.chars().all(|c| c.is_ascii_digit())
        && digits.len() % 2 == 0
        && (2..=10).contains(&digits.len());
    if !digits_ok {
        return Err(CommandError::InvalidGridOffset(digits));
    }

    Ok(grid_ref::decode_parts(zone, band, square, &digits)?)
}

pub fn check_point(point: GeoPoint) -> Result<(), CommandError> {
    if !point.lat.is_finite() || !(-90.0..=90.0).contains(&point.lat) {
        return Err(CommandError::InvalidLatitude(point.lat));
    }
    if !point.lon.is_finite() || !(-180.0..=180.0).contains(&point.lon) {
        return Err(CommandError::InvalidLongitude(point.lon));
    }
    Ok(())
}

pub fn check_finite(field: &'static str, value: f64) -> Result<(), CommandError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CommandError::NotFinite { field })
    }
}

pub fn check_positive(field: &'static str, value: f64) -> Result<(), CommandError> {
    check_finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(CommandError::NotPositive { field, value })
    }
}

pub fn check_scan_interval(interval_ms: f64) -> Result<(), CommandError> {
    check_finite("scan interval", interval_ms)?;
    if interval_ms < MIN_SCAN_INTERVAL_MS {
        return Err(CommandError::ScanIntervalTooShort {
            min: MIN_SCAN_INTERVAL_MS,
            value: interval_ms,
        });
    }
    Ok(())
}
