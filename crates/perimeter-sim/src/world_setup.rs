//! Entity spawn factories for setting up the simulation world.
//!
//! Creates the asset, the base and the intruder roster with their
//! component bundles.

use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use perimeter_core::components::*;
use perimeter_core::enums::Zone;
use perimeter_core::types::GeoPoint;

use perimeter_geo::{destination_point, haversine_distance};

use crate::scenario::ScenarioConfig;

/// Populate an empty world from a scenario.
pub fn setup_world(world: &mut World, rng: &mut ChaCha8Rng, scenario: &ScenarioConfig) {
    spawn_base(world, scenario.base_position, scenario.base_radius_m);
    spawn_asset(world, scenario);
    for seed in &scenario.intruders {
        let position = sample_within_radius(
            rng,
            scenario.base_position,
            scenario.intruder_max_radius_m,
        );
        spawn_intruder(world, &seed.id, &seed.name, position);
    }
}

/// Spawn the protected site.
pub fn spawn_base(world: &mut World, position: GeoPoint, radius_m: f64) -> hecs::Entity {
    world.spawn((
        Base,
        position,
        DetectionZone {
            zone: Zone::Base,
            radius_m,
        },
    ))
}

/// Spawn the friendly asset at its start position.
pub fn spawn_asset(world: &mut World, scenario: &ScenarioConfig) -> hecs::Entity {
    world.spawn((
        OwnAsset,
        scenario.asset_start(),
        Kinematics {
            altitude_m: scenario.altitude_m,
            heading_deg: perimeter_core::types::normalize_heading(scenario.heading_deg),
            speed_kmh: scenario.speed_kmh,
        },
        DetectionZone {
            zone: Zone::Asset,
            radius_m: scenario.asset_radius_m,
        },
    ))
}

/// Spawn one intruder with no detection data yet.
pub fn spawn_intruder(world: &mut World, id: &str, name: &str, position: GeoPoint) -> hecs::Entity {
    world.spawn((
        Intruder {
            id: id.to_string(),
            name: name.to_string(),
        },
        position,
        DetectionState::default(),
    ))
}

/// Draw a point in the disk of `radius_m` around `center`: distance uniform
/// in [0, radius), bearing uniform in [0, 360).
pub fn sample_within_radius(rng: &mut ChaCha8Rng, center: GeoPoint, radius_m: f64) -> GeoPoint {
    // Rounding in the spherical offset can land a hair outside the disk.
    for _ in 0..8 {
        let distance = rng.gen_range(0.0..radius_m);
        let bearing = rng.gen_range(0.0..360.0);
        let candidate = destination_point(center, distance, bearing);
        if haversine_distance(center, candidate) <= radius_m {
            return candidate;
        }
    }
    center
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_setup_spawns_full_roster() {
        let mut world = World::new();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let scenario = ScenarioConfig::default();
        setup_world(&mut world, &mut rng, &scenario);

        assert_eq!(world.query::<&Intruder>().iter().count(), 5);
        assert_eq!(world.query::<&OwnAsset>().iter().count(), 1);
        assert_eq!(world.query::<&Base>().iter().count(), 1);

        for (_, (_, pos, state)) in world
            .query::<(&Intruder, &GeoPoint, &DetectionState)>()
            .iter()
        {
            assert!(haversine_distance(scenario.base_position, *pos) <= 3_000.0);
            assert!(state.reading.is_none());
        }
    }

    #[test]
    fn test_sample_stays_inside_disk() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let center = GeoPoint::new(14.2059, 101.2134);
        for _ in 0..5_000 {
            let p = sample_within_radius(&mut rng, center, 3_000.0);
            assert!(haversine_distance(center, p) <= 3_000.0);
        }
    }
}
