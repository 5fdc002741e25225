//! Simulation constants and tuning parameters.

/// Simulation tick rate (Hz). One tick is one display frame.
pub const TICK_RATE: u32 = 30;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- Earth model ---

/// Mean Earth radius in meters (spherical model).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Meters per degree of latitude (nearly constant across the globe).
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Lower bound on cos(latitude) when scaling longitude steps.
pub const MIN_COS_LATITUDE: f64 = 0.2;

// --- Scenario defaults ---

/// Default protected site latitude (degrees).
pub const DEFAULT_BASE_LAT: f64 = 14.2059;

/// Default protected site longitude (degrees).
pub const DEFAULT_BASE_LON: f64 = 101.2134;

/// Default base perimeter radius (meters).
pub const DEFAULT_BASE_RADIUS_M: f64 = 1_000.0;

/// Default asset altitude (meters).
pub const DEFAULT_ASSET_ALTITUDE_M: f64 = 120.0;

/// Default asset heading (degrees).
pub const DEFAULT_ASSET_HEADING_DEG: f64 = 35.0;

/// Default asset speed (km/h).
pub const DEFAULT_ASSET_SPEED_KMH: f64 = 18.0;

/// Default asset detection radius (meters).
pub const DEFAULT_ASSET_RADIUS_M: f64 = 600.0;

/// Default intruder roster: (id, display name).
pub const DEFAULT_INTRUDERS: [(&str, &str); 5] = [
    ("alpha", "Unknown drone Alpha"),
    ("bravo", "Unknown drone Bravo"),
    ("charlie", "Unknown drone Charlie"),
    ("delta", "Unknown drone Delta"),
    ("echo", "Unknown drone Echo"),
];

// --- Intruder motion ---

/// Intruders never wander further than this from the base (meters).
pub const INTRUDER_MAX_RADIUS_M: f64 = 3_000.0;

/// Largest random-walk step per intruder move (meters).
pub const INTRUDER_MAX_STEP_M: f64 = 180.0;

/// Interval between intruder moves (milliseconds).
pub const INTRUDER_MOVE_INTERVAL_MS: f64 = 1_000.0;

// --- Navigation ---

/// Every transit lasts at least this long (milliseconds).
pub const MIN_TRANSIT_DURATION_MS: f64 = 2_000.0;

/// Speed floor used when computing transit duration (km/h).
pub const MIN_TRANSIT_SPEED_KMH: f64 = 5.0;

/// km/h to m/s factor used for transit timing.
pub const KMH_TO_MPS: f64 = 0.277;

// --- Detection ---

/// Number of alert records retained in the alert log.
pub const ALERT_LOG_CAPACITY: usize = 5;

/// Default period of the automatic scan (milliseconds).
pub const DEFAULT_SCAN_INTERVAL_MS: f64 = 1_000.0;

/// Shortest accepted automatic scan period (milliseconds).
pub const MIN_SCAN_INTERVAL_MS: f64 = 100.0;

// --- Grid references ---

/// Digits per axis used for position read-outs.
pub const DISPLAY_GRID_PRECISION: u8 = 5;

/// Maximum digits per axis a grid reference can carry.
pub const MAX_GRID_PRECISION: u8 = 5;

/// Placeholder shown when a grid reference cannot be computed.
pub const UNKNOWN_GRID_REFERENCE: &str = "----";

// --- Map ---

/// Default map zoom level.
pub const DEFAULT_ZOOM: f64 = 13.0;

/// Half span of the default viewport around the base (degrees).
pub const DEFAULT_VIEWPORT_HALF_SPAN_DEG: f64 = 0.05;

/// Upper bound on grid lines emitted per axis for one viewport. A whole-world
/// view at the coarsest 5 km step needs about 8 000 longitude lines, so only
/// bounds no map can show reach it.
pub const MAX_GRID_LINES_PER_AXIS: i64 = 10_000;

// --- Persistence ---

/// Alert records kept by the mission store.
pub const REPOSITORY_HISTORY_CAPACITY: usize = 10;
