//! Patrol loops and search sweeps

use crate::behavior::kinematics::clamp_to_world;
use crate::core::config::AiConfig;
use crate::core::constants::{
    PATROL_JITTER_HORIZONTAL, PATROL_JITTER_VERTICAL, SEARCH_JITTER_VERTICAL, SEARCH_MAX_DISTANCE,
    SEARCH_MIN_DISTANCE, SEARCH_POINT_COUNT,
};
use crate::creature::Archetype;
use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;

/// Symmetric jitter in [-width/2, width/2)
fn jitter<R: Rng>(rng: &mut R, width: f32) -> f32 {
    (rng.gen::<f32>() - 0.5) * width
}

/// Evenly spaced loop around `center`, with a little noise on every point
pub fn patrol_points<R: Rng>(
    center: Vec3,
    archetype: &Archetype,
    rng: &mut R,
    config: &AiConfig,
) -> Vec<Vec3> {
    let count = archetype.patrol_point_count();
    let radius = archetype.patrol_radius();

    (0..count)
        .map(|i| {
            let angle = i as f32 / count as f32 * TAU;
            let point = center
                + Vec3::new(
                    angle.cos() * radius + jitter(rng, PATROL_JITTER_HORIZONTAL),
                    jitter(rng, PATROL_JITTER_VERTICAL),
                    angle.sin() * radius + jitter(rng, PATROL_JITTER_HORIZONTAL),
                );
            clamp_to_world(point, config)
        })
        .collect()
}

/// Random sweep points 5-15 units around where the target was lost
pub fn search_points<R: Rng>(center: Vec3, rng: &mut R, config: &AiConfig) -> Vec<Vec3> {
    (0..SEARCH_POINT_COUNT)
        .map(|_| {
            let angle = rng.gen::<f32>() * TAU;
            let distance = rng.gen_range(SEARCH_MIN_DISTANCE..SEARCH_MAX_DISTANCE);
            let point = center
                + Vec3::new(
                    angle.cos() * distance,
                    jitter(rng, SEARCH_JITTER_VERTICAL),
                    angle.sin() * distance,
                );
            clamp_to_world(point, config)
        })
        .collect()
}
