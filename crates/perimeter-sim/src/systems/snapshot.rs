//! Snapshot system: queries the ECS world and builds a complete RenderSnapshot.
//!
//! This system is read-only; it never modifies the world.

use hecs::World;

use perimeter_core::components::*;
use perimeter_core::constants::DISPLAY_GRID_PRECISION;
use perimeter_core::constants::UNKNOWN_GRID_REFERENCE;
use perimeter_core::enums::SimPhase;
use perimeter_core::events::{Notice, SimEvent};
use perimeter_core::state::*;
use perimeter_core::types::{GeoPoint, GridLine, SimTime};

use perimeter_geo::{grid_reference_or_unknown, haversine_distance, heading_to_text};

use crate::systems::detection::DetectionEngine;
use crate::systems::navigation::NavigationController;
use crate::systems::scan_schedule::ScanSchedule;

/// Everything outside the world that the snapshot reads.
pub struct SnapshotInputs<'a> {
    pub time: &'a SimTime,
    pub phase: SimPhase,
    pub navigation: &'a NavigationController,
    pub detection: &'a DetectionEngine,
    pub schedule: &'a ScanSchedule,
    pub grid: &'a [GridLine],
    pub last_clicked: Option<GeoPoint>,
    pub events: Vec<SimEvent>,
    pub notices: Vec<Notice>,
}

/// Build a complete RenderSnapshot from the current world state.
pub fn build_snapshot(world: &World, inputs: SnapshotInputs<'_>) -> RenderSnapshot {
    let base = build_base(world);
    let asset = build_asset(world, &base, inputs.navigation);
    let now_ms = inputs.time.now_ms();

    RenderSnapshot {
        time: *inputs.time,
        phase: inputs.phase,
        route: inputs.navigation.transit().map(|t| RouteView {
            from: asset.position,
            to: t.to,
            progress: t.progress(now_ms),
        }),
        asset,
        base,
        intruders: build_intruders(world),
        grid: inputs.grid.to_vec(),
        scan: ScanView {
            mode: inputs.schedule.mode(),
            interval_ms: inputs.schedule.interval_ms(),
            next_scan_ms: inputs.schedule.next_due_ms(),
            scans_run: inputs.detection.scans_run(),
        },
        alert_log: inputs.detection.alert_log().to_vec(),
        last_clicked: inputs.last_clicked.map(|point| ClickView {
            point,
            grid_reference: grid_reference_or_unknown(point, DISPLAY_GRID_PRECISION),
        }),
        events: inputs.events,
        notices: inputs.notices,
    }
}

fn build_base(world: &World) -> BaseView {
    world
        .query::<(&Base, &GeoPoint, &DetectionZone)>()
        .iter()
        .next()
        .map(|(_, (_, pos, zone))| BaseView {
            position: *pos,
            grid_reference: grid_reference_or_unknown(*pos, DISPLAY_GRID_PRECISION),
            perimeter_radius_m: zone.radius_m,
        })
        .unwrap_or_default()
}

fn build_asset(world: &World, base: &BaseView, navigation: &NavigationController) -> AssetView {
    world
        .query::<(&OwnAsset, &GeoPoint, &Kinematics, &DetectionZone)>()
        .iter()
        .next()
        .map(|(_, (_, pos, kin, zone))| AssetView {
            position: *pos,
            grid_reference: grid_reference_or_unknown(*pos, DISPLAY_GRID_PRECISION),
            altitude_m: kin.altitude_m,
            heading_deg: kin.heading_deg,
            heading_text: heading_to_text(kin.heading_deg).to_string(),
            speed_kmh: kin.speed_kmh,
            detection_radius_m: zone.radius_m,
            distance_from_base_m: haversine_distance(base.position, *pos),
            navigation: navigation.status(),
        })
        .unwrap_or_default()
}

/// Intruder markers, sorted by id.
fn build_intruders(world: &World) -> Vec<IntruderView> {
    let mut intruders: Vec<IntruderView> = world
        .query::<(&Intruder, &GeoPoint, &DetectionState)>()
        .iter()
        .map(|(_, (intruder, pos, detection))| {
            let reading = detection.reading.as_ref();
            let inside_asset_radius = reading.is_some_and(|r| r.inside_asset_radius);
            let inside_base_perimeter = reading.is_some_and(|r| r.inside_base_perimeter);
            IntruderView {
                id: intruder.id.clone(),
                name: intruder.name.clone(),
                position: *pos,
                distance_to_asset_m: reading.map(|r| r.distance_to_asset_m),
                distance_to_base_m: reading.map(|r| r.distance_to_base_m),
                inside_asset_radius,
                inside_base_perimeter,
                detected_by: reading.map(|r| r.detected_by.clone()).unwrap_or_default(),
                grid_reference: reading
                    .and_then(|r| r.grid_reference.clone())
                    .unwrap_or_else(|| UNKNOWN_GRID_REFERENCE.to_string()),
                breach: inside_asset_radius || inside_base_perimeter,
            }
        })
        .collect();

    intruders.sort_by(|a, b| a.id.cmp(&b.id));
    intruders
}
