//! Intruder motion: a random walk kept inside a disk around the base.
//!
//! Each move draws a bearing and a step length for every intruder. A step
//! that would leave the disk is discarded and the intruder re-enters at a
//! fresh uniform position inside it. Moving clears the detection reading.

use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use perimeter_core::components::{DetectionState, Intruder};
use perimeter_core::types::GeoPoint;

use perimeter_geo::{destination_point, haversine_distance};

use crate::world_setup::sample_within_radius;

/// Walk parameters and the move clock.
#[derive(Debug, Clone)]
pub struct IntruderMotion {
    pub max_radius_m: f64,
    pub max_step_m: f64,
    pub interval_ms: f64,
    next_move_ms: f64,
}

impl IntruderMotion {
    pub fn new(max_radius_m: f64, max_step_m: f64, interval_ms: f64) -> Self {
        Self {
            max_radius_m,
            max_step_m,
            interval_ms,
            next_move_ms: interval_ms,
        }
    }

    /// Consume the move clock. True when a move is due at `now_ms`.
    fn take_due(&mut self, now_ms: f64) -> bool {
        if now_ms < self.next_move_ms {
            return false;
        }
        self.next_move_ms += self.interval_ms;
        if self.next_move_ms <= now_ms {
            self.next_move_ms = now_ms + self.interval_ms;
        }
        true
    }
}

/// Move every intruder once if the move clock is due. Returns true if a
/// move happened.
pub fn run(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    motion: &mut IntruderMotion,
    base: GeoPoint,
    now_ms: f64,
) -> bool {
    if !motion.take_due(now_ms) {
        return false;
    }
    step_all(world, rng, motion, base);
    true
}

/// One random-walk step for every intruder.
pub fn step_all(world: &mut World, rng: &mut ChaCha8Rng, motion: &IntruderMotion, base: GeoPoint) {
    for (_entity, (intruder, pos, detection)) in
        world.query_mut::<(&Intruder, &mut GeoPoint, &mut DetectionState)>()
    {
        let step = rng.gen_range(0.0..=motion.max_step_m);
        let bearing = rng.gen_range(0.0..360.0);
        let candidate = destination_point(*pos, step, bearing);

        *pos = if haversine_distance(base, candidate) > motion.max_radius_m {
            tracing::debug!(id = %intruder.id, "intruder left the area, re-entering");
            sample_within_radius(rng, base, motion.max_radius_m)
        } else {
            candidate
        };
        detection.reading = None;
    }
}
