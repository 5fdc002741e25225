//! Point-to-point transit of the asset.
//!
//! A transit interpolates linearly in latitude/longitude between its start
//! and destination over a duration fixed at acceptance. At most one transit
//! exists; a new target always starts from the live position.

use hecs::World;

use perimeter_core::components::{Kinematics, OwnAsset};
use perimeter_core::constants::{KMH_TO_MPS, MIN_TRANSIT_DURATION_MS, MIN_TRANSIT_SPEED_KMH};
use perimeter_core::enums::{NavigationStatus, TransitEnd};
use perimeter_core::events::SimEvent;
use perimeter_core::types::GeoPoint;

use perimeter_geo::{bearing_between, haversine_distance};

/// One commanded movement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transit {
    pub from: GeoPoint,
    pub to: GeoPoint,
    pub started_ms: f64,
    pub duration_ms: f64,
}

impl Transit {
    pub fn new(from: GeoPoint, to: GeoPoint, speed_kmh: f64, now_ms: f64) -> Self {
        Self {
            from,
            to,
            started_ms: now_ms,
            duration_ms: transit_duration_ms(haversine_distance(from, to), speed_kmh),
        }
    }

    /// Fraction of the transit elapsed at `now_ms`, in [0, 1].
    pub fn progress(&self, now_ms: f64) -> f64 {
        ((now_ms - self.started_ms) / self.duration_ms).clamp(0.0, 1.0)
    }

    /// Interpolated position. Exactly the destination once complete.
    pub fn position_at(&self, now_ms: f64) -> GeoPoint {
        let t = self.progress(now_ms);
        if t >= 1.0 {
            return self.to;
        }
        GeoPoint::from_dvec2(self.from.to_dvec2().lerp(self.to.to_dvec2(), t))
    }
}

/// Transit time for a distance, never shorter than the visible minimum.
pub fn transit_duration_ms(distance_m: f64, speed_kmh: f64) -> f64 {
    let speed_mps = speed_kmh.max(MIN_TRANSIT_SPEED_KMH) * KMH_TO_MPS;
    (distance_m / speed_mps * 1000.0).max(MIN_TRANSIT_DURATION_MS)
}

/// Owns the single optional transit.
#[derive(Debug, Clone, Default)]
pub struct NavigationController {
    transit: Option<Transit>,
}

impl NavigationController {
    pub fn transit(&self) -> Option<&Transit> {
        self.transit.as_ref()
    }

    pub fn status(&self) -> NavigationStatus {
        if self.transit.is_some() {
            NavigationStatus::InTransit
        } else {
            NavigationStatus::Idle
        }
    }

    /// Start a transit to `destination` from the asset's live position,
    /// replacing any active one. The heading snaps to the new bearing.
    pub fn start(
        &mut self,
        world: &mut World,
        destination: GeoPoint,
        now_ms: f64,
        events: &mut Vec<SimEvent>,
    ) {
        let Some((from, speed_kmh)) = asset_state(world) else {
            return;
        };

        if self.transit.take().is_some() {
            events.push(SimEvent::TransitEnded {
                reason: TransitEnd::Retargeted,
                at: from,
            });
        }

        let transit = Transit::new(from, destination, speed_kmh, now_ms);
        let heading_deg = bearing_between(from, destination);
        for (_entity, (_own, kin)) in world.query_mut::<(&OwnAsset, &mut Kinematics)>() {
            kin.heading_deg = heading_deg;
        }

        tracing::debug!(
            from = ?from,
            to = ?destination,
            duration_ms = transit.duration_ms,
            "transit started"
        );
        events.push(SimEvent::TransitStarted {
            from,
            to: destination,
            duration_ms: transit.duration_ms,
            heading_deg,
        });
        self.transit = Some(transit);
    }

    /// Cancel the active transit, holding at the live position. Returns
    /// false if there was nothing to cancel.
    pub fn stop(&mut self, world: &World, events: &mut Vec<SimEvent>) -> bool {
        if self.transit.take().is_none() {
            return false;
        }
        let at = asset_state(world).map(|(pos, _)| pos).unwrap_or_default();
        tracing::debug!(at = ?at, "transit stopped");
        events.push(SimEvent::TransitEnded {
            reason: TransitEnd::Stopped,
            at,
        });
        true
    }

    /// Drop the transit without moving the asset or emitting events.
    pub fn clear(&mut self) {
        self.transit = None;
    }
}

/// Advance the asset along the active transit.
pub fn run(
    world: &mut World,
    navigation: &mut NavigationController,
    now_ms: f64,
    events: &mut Vec<SimEvent>,
) {
    let Some(transit) = navigation.transit else {
        return;
    };
    let position = transit.position_at(now_ms);
    set_asset_position(world, position);

    if transit.progress(now_ms) >= 1.0 {
        navigation.transit = None;
        tracing::debug!(at = ?transit.to, "transit arrived");
        events.push(SimEvent::TransitEnded {
            reason: TransitEnd::Arrived,
            at: transit.to,
        });
    }
}

fn set_asset_position(world: &mut World, position: GeoPoint) {
    for (_entity, (_own, pos)) in world.query_mut::<(&OwnAsset, &mut GeoPoint)>() {
        *pos = position;
    }
}

/// Live asset position and speed. The position is the last interpolated
/// point written by `run`.
fn asset_state(world: &World) -> Option<(GeoPoint, f64)> {
    world
        .query::<(&OwnAsset, &GeoPoint, &Kinematics)>()
        .iter()
        .next()
        .map(|(_, (_, pos, kin))| (*pos, kin.speed_kmh))
}
