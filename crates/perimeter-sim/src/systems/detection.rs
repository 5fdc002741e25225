//! Dual-zone detection and alerting.
//!
//! A scan measures every intruder against the asset radius (mobile) and the
//! base perimeter (fixed). Base alerts are edge-triggered on entry; asset
//! alerts are raised by the operator from whatever is inside right now.

use std::collections::{BTreeSet, VecDeque};

use hecs::World;

use perimeter_core::components::*;
use perimeter_core::constants::{ALERT_LOG_CAPACITY, DISPLAY_GRID_PRECISION};
use perimeter_core::enums::Zone;
use perimeter_core::events::{AlertRecord, IntruderSnapshot};
use perimeter_core::types::GeoPoint;

use perimeter_geo::{grid_reference, haversine_distance};

/// Bounded alert history, newest first.
#[derive(Debug, Clone)]
pub struct AlertLog {
    entries: VecDeque<AlertRecord>,
    capacity: usize,
}

impl Default for AlertLog {
    fn default() -> Self {
        Self::with_capacity(ALERT_LOG_CAPACITY)
    }
}

impl AlertLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Insert at the front, evicting the oldest past capacity.
    pub fn push(&mut self, record: AlertRecord) {
        self.entries.push_front(record);
        self.entries.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &AlertRecord> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<AlertRecord> {
        self.entries.iter().cloned().collect()
    }

    /// Replace the contents with `history` (newest first), keeping only what
    /// fits.
    pub fn restore(&mut self, history: impl IntoIterator<Item = AlertRecord>) {
        self.entries = history.into_iter().take(self.capacity).collect();
    }
}

/// Counts from one scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanOutcome {
    pub inside_asset: u32,
    pub inside_base: u32,
    /// Base alert raised for new entrants, if any.
    pub base_alert: Option<AlertRecord>,
}

/// Detection state carried between scans.
#[derive(Debug, Clone, Default)]
pub struct DetectionEngine {
    /// Intruder ids inside the base perimeter at the previous scan.
    inside_base: BTreeSet<String>,
    alert_log: AlertLog,
    scans_run: u64,
}

impl DetectionEngine {
    pub fn alert_log(&self) -> &AlertLog {
        &self.alert_log
    }

    pub fn scans_run(&self) -> u64 {
        self.scans_run
    }

    pub fn restore_alerts(&mut self, history: Vec<AlertRecord>) {
        self.alert_log.restore(history);
    }

    /// Measure every intruder, refresh their readings and raise a base
    /// alert for intruders that were not inside the perimeter last scan.
    pub fn scan(&mut self, world: &mut World, now_ms: f64) -> ScanOutcome {
        self.scans_run += 1;
        let zones = Zones::find(world);
        let mut outcome = ScanOutcome::default();
        let mut now_inside = BTreeSet::new();
        let mut entrants = Vec::new();

        for (_entity, (intruder, pos, detection)) in
            world.query_mut::<(&Intruder, &GeoPoint, &mut DetectionState)>()
        {
            let reading = zones.measure(*pos);
            if reading.inside_asset_radius {
                outcome.inside_asset += 1;
            }
            if reading.inside_base_perimeter {
                outcome.inside_base += 1;
                now_inside.insert(intruder.id.clone());
                if !self.inside_base.contains(&intruder.id) {
                    entrants.push(snapshot_of(intruder, *pos, &reading));
                }
            }
            detection.reading = Some(reading);
        }
        self.inside_base = now_inside;

        if !entrants.is_empty() {
            entrants.sort_by(|a, b| a.id.cmp(&b.id));
            let record = AlertRecord {
                timestamp_ms: now_ms.max(0.0) as u64,
                zone: Zone::Base,
                intruders: entrants,
            };
            tracing::info!(
                intruders = record.intruders.len(),
                "new intruders inside the base perimeter"
            );
            self.alert_log.push(record.clone());
            outcome.base_alert = Some(record);
        }
        outcome
    }

    /// Snapshot every intruder currently inside the asset radius into an
    /// alert. `None` when nobody is inside, leaving the log untouched.
    ///
    /// Uses the readings of the most recent scan.
    pub fn raise_asset_alert(&mut self, world: &World, now_ms: f64) -> Option<AlertRecord> {
        let mut intruders: Vec<IntruderSnapshot> = world
            .query::<(&Intruder, &GeoPoint, &DetectionState)>()
            .iter()
            .filter_map(|(_, (intruder, pos, detection))| {
                let reading = detection.reading.as_ref()?;
                reading
                    .inside_asset_radius
                    .then(|| snapshot_of(intruder, *pos, reading))
            })
            .collect();
        if intruders.is_empty() {
            return None;
        }
        intruders.sort_by(|a, b| a.id.cmp(&b.id));

        let record = AlertRecord {
            timestamp_ms: now_ms.max(0.0) as u64,
            zone: Zone::Asset,
            intruders,
        };
        tracing::info!(intruders = record.intruders.len(), "asset alert raised");
        self.alert_log.push(record.clone());
        Some(record)
    }
}

/// Zone centers and radii resolved once per scan.
#[derive(Debug, Clone, Copy, Default)]
struct Zones {
    asset: GeoPoint,
    asset_radius_m: f64,
    base: GeoPoint,
    base_radius_m: f64,
}

impl Zones {
    fn find(world: &World) -> Self {
        let mut zones = Zones::default();
        for (_, (pos, zone)) in world.query::<(&GeoPoint, &DetectionZone)>().iter() {
            match zone.zone {
                Zone::Asset => {
                    zones.asset = *pos;
                    zones.asset_radius_m = zone.radius_m;
                }
                Zone::Base => {
                    zones.base = *pos;
                    zones.base_radius_m = zone.radius_m;
                }
            }
        }
        zones
    }

    fn measure(&self, pos: GeoPoint) -> ScanReading {
        let distance_to_asset_m = haversine_distance(self.asset, pos);
        let distance_to_base_m = haversine_distance(self.base, pos);
        let inside_asset_radius = distance_to_asset_m <= self.asset_radius_m;
        let inside_base_perimeter = distance_to_base_m <= self.base_radius_m;

        let mut detected_by = Vec::with_capacity(2);
        if inside_asset_radius {
            detected_by.push(Zone::Asset);
        }
        if inside_base_perimeter {
            detected_by.push(Zone::Base);
        }

        ScanReading {
            distance_to_asset_m,
            distance_to_base_m,
            inside_asset_radius,
            inside_base_perimeter,
            detected_by,
            grid_reference: grid_reference(pos, DISPLAY_GRID_PRECISION),
        }
    }
}

fn snapshot_of(intruder: &Intruder, position: GeoPoint, reading: &ScanReading) -> IntruderSnapshot {
    IntruderSnapshot {
        id: intruder.id.clone(),
        name: intruder.name.clone(),
        position,
        grid_reference: reading.grid_reference.clone(),
        distance_to_asset_m: reading.distance_to_asset_m,
        distance_to_base_m: reading.distance_to_base_m,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perimeter_geo::destination_point;

    fn base() -> GeoPoint {
        GeoPoint::new(14.2059, 101.2134)
    }

    /// Base with a 1 km perimeter, asset 5 km north with a 600 m radius,
    /// and one intruder.
    fn world_with_intruder(at: GeoPoint) -> (World, hecs::Entity) {
        let mut world = World::new();
        world.spawn((
            Base,
            base(),
            DetectionZone {
                zone: Zone::Base,
                radius_m: 1_000.0,
            },
        ));
        world.spawn((
            OwnAsset,
            destination_point(base(), 5_000.0, 0.0),
            DetectionZone {
                zone: Zone::Asset,
                radius_m: 600.0,
            },
        ));
        let e = world.spawn((
            Intruder {
                id: "alpha".into(),
                name: "Unknown drone Alpha".into(),
            },
            at,
            DetectionState::default(),
        ));
        (world, e)
    }

    fn place(world: &mut World, e: hecs::Entity, distance_from_base: f64) {
        let p = destination_point(base(), distance_from_base, 90.0);
        *world.get::<&mut GeoPoint>(e).unwrap() = p;
        world.get::<&mut DetectionState>(e).unwrap().reading = None;
    }

    fn record(ts: u64) -> AlertRecord {
        AlertRecord {
            timestamp_ms: ts,
            zone: Zone::Base,
            intruders: vec![],
        }
    }

    #[test]
    fn test_alert_log_bounded_newest_first() {
        let mut log = AlertLog::default();
        for ts in 1..=5 {
            log.push(record(ts));
        }
        assert_eq!(log.len(), 5);
        log.push(record(6));
        assert_eq!(log.len(), 5);
        let stamps: Vec<u64> = log.iter().map(|r| r.timestamp_ms).collect();
        assert_eq!(stamps, vec![6, 5, 4, 3, 2]);

        for ts in 7..100 {
            log.push(record(ts));
            assert!(log.len() <= ALERT_LOG_CAPACITY);
        }
    }

    #[test]
    fn test_alert_log_restore_truncates() {
        let mut log = AlertLog::default();
        log.restore((0..10).rev().map(record));
        let stamps: Vec<u64> = log.iter().map(|r| r.timestamp_ms).collect();
        assert_eq!(stamps, vec![9, 8, 7, 6, 5]);
    }

    #[test]
    fn test_scan_fills_readings() {
        let at = destination_point(base(), 400.0, 90.0);
        let (mut world, e) = world_with_intruder(at);
        let mut engine = DetectionEngine::default();
        let outcome = engine.scan(&mut world, 0.0);

        let state = world.get::<&DetectionState>(e).unwrap();
        let reading = state.reading.as_ref().unwrap();
        assert!((reading.distance_to_base_m - 400.0).abs() < 1e-3);
        assert!(reading.inside_base_perimeter);
        assert!(!reading.inside_asset_radius);
        assert_eq!(reading.detected_by, vec![Zone::Base]);
        assert!(reading.grid_reference.is_some());
        assert_eq!(outcome.inside_base, 1);
        assert_eq!(outcome.inside_asset, 0);
    }

    #[test]
    fn test_radius_boundary_is_inside() {
        let (mut world, e) = world_with_intruder(base());
        let mut engine = DetectionEngine::default();
        engine.scan(&mut world, 0.0);
        let d = world
            .get::<&DetectionState>(e)
            .unwrap()
            .reading
            .as_ref()
            .unwrap()
            .distance_to_base_m;
        assert_eq!(d, 0.0);

        // Perimeter set to exactly the measured distance still counts.
        place(&mut world, e, 700.0);
        engine.scan(&mut world, 0.0);
        let measured = world
            .get::<&DetectionState>(e)
            .unwrap()
            .reading
            .as_ref()
            .unwrap()
            .distance_to_base_m;
        for (_, zone) in world.query_mut::<&mut DetectionZone>() {
            if zone.zone == Zone::Base {
                zone.radius_m = measured;
            }
        }
        engine.scan(&mut world, 0.0);
        let state = world.get::<&DetectionState>(e).unwrap();
        assert!(state.reading.as_ref().unwrap().inside_base_perimeter);
    }

    #[test]
    fn test_base_alert_edge_triggered() {
        let (mut world, e) = world_with_intruder(destination_point(base(), 2_000.0, 90.0));
        let mut engine = DetectionEngine::default();

        assert!(engine.scan(&mut world, 0.0).base_alert.is_none());

        // Outside -> inside: one record.
        place(&mut world, e, 500.0);
        let alert = engine.scan(&mut world, 1_000.0).base_alert.unwrap();
        assert_eq!(alert.zone, Zone::Base);
        assert_eq!(alert.timestamp_ms, 1_000);
        assert_eq!(alert.intruders.len(), 1);
        assert_eq!(alert.intruders[0].id, "alpha");
        assert_eq!(engine.alert_log().len(), 1);

        // Staying inside: nothing new.
        for i in 0..10 {
            place(&mut world, e, 400.0 + i as f64 * 10.0);
            assert!(engine.scan(&mut world, 2_000.0).base_alert.is_none());
        }
        assert_eq!(engine.alert_log().len(), 1);

        // Exit and re-enter: a second record.
        place(&mut world, e, 1_500.0);
        assert!(engine.scan(&mut world, 3_000.0).base_alert.is_none());
        place(&mut world, e, 300.0);
        assert!(engine.scan(&mut world, 4_000.0).base_alert.is_some());
        assert_eq!(engine.alert_log().len(), 2);
    }

    #[test]
    fn test_base_alert_includes_only_new_entrants() {
        let (mut world, _alpha) = world_with_intruder(destination_point(base(), 100.0, 0.0));
        let second = world.spawn((
            Intruder {
                id: "bravo".into(),
                name: "Unknown drone Bravo".into(),
            },
            destination_point(base(), 2_500.0, 180.0),
            DetectionState::default(),
        ));
        let mut engine = DetectionEngine::default();
        let alert = engine.scan(&mut world, 0.0).base_alert.unwrap();
        assert_eq!(alert.intruders.len(), 1);
        assert_eq!(alert.intruders[0].id, "alpha");

        *world.get::<&mut GeoPoint>(second).unwrap() = destination_point(base(), 200.0, 180.0);
        let alert = engine.scan(&mut world, 1_000.0).base_alert.unwrap();
        let ids: Vec<&str> = alert.intruders.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["bravo"]);
    }

    #[test]
    fn test_asset_alert_level_triggered() {
        let asset = destination_point(base(), 5_000.0, 0.0);
        let (mut world, e) = world_with_intruder(destination_point(asset, 100.0, 45.0));
        let mut engine = DetectionEngine::default();

        engine.scan(&mut world, 0.0);
        let first = engine.raise_asset_alert(&world, 10.0).unwrap();
        assert_eq!(first.zone, Zone::Asset);
        assert_eq!(first.intruders.len(), 1);
        // Raising again while still inside snapshots again.
        assert!(engine.raise_asset_alert(&world, 20.0).is_some());
        assert_eq!(engine.alert_log().len(), 2);

        // Outside both zones, so the scan files nothing either.
        *world.get::<&mut GeoPoint>(e).unwrap() = destination_point(base(), 2_000.0, 90.0);
        let outcome = engine.scan(&mut world, 30.0);
        assert!(outcome.base_alert.is_none());
        assert!(engine.raise_asset_alert(&world, 40.0).is_none());
        assert_eq!(engine.alert_log().len(), 2);
    }
}
