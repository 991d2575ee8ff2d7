//! Steering and integration
//!
//! States only set a velocity; `integrate` is the one place positions move.

use crate::core::config::AiConfig;
use crate::core::constants::ARRIVAL_EPSILON;
use crate::core::types::yaw_towards;
use crate::creature::Creature;
use glam::Vec3;

/// Reference frame length the drag factor is expressed in
const DRAG_REFERENCE_DT: f32 = 1.0 / 60.0;

/// Head for `target` at `speed`, climbing and diving more slowly than swimming level
pub fn move_towards(creature: &mut Creature, target: Vec3, speed: f32, config: &AiConfig) {
    let offset = target - creature.position;
    let distance = offset.length();
    if distance <= ARRIVAL_EPSILON {
        return;
    }

    let direction = offset / distance;
    creature.velocity = Vec3::new(
        direction.x * speed,
        direction.y * speed * config.vertical_speed_factor,
        direction.z * speed,
    );
    creature.yaw = yaw_towards(creature.position, target);
    let horizontal = Vec3::new(offset.x, 0.0, offset.z).length();
    creature.pitch = offset.y.atan2(horizontal);
}

/// Turn to face `target` without moving
pub fn face_position(creature: &mut Creature, target: Vec3) {
    let offset = target - creature.position;
    if offset.x == 0.0 && offset.z == 0.0 {
        return;
    }
    creature.yaw = yaw_towards(creature.position, target);
}

/// Keep a point inside the playable volume
pub fn clamp_to_world(position: Vec3, config: &AiConfig) -> Vec3 {
    let half = config.world_half_extent;
    Vec3::new(
        position.x.clamp(-half, half),
        position.y.clamp(config.depth_min, config.depth_max),
        position.z.clamp(-half, half),
    )
}

/// Apply velocity, then drag, then world bounds
pub fn integrate(creature: &mut Creature, dt: f32, config: &AiConfig) {
    creature.position += creature.velocity * dt;
    creature.velocity *= config.drag.powf(dt / DRAG_REFERENCE_DT);
    creature.position = clamp_to_world(creature.position, config);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::CreatureId;
    use crate::creature::ArchetypeCatalog;

    fn angler_at(position: Vec3) -> Creature {
        let archetype = ArchetypeCatalog::builtin().get("angler").unwrap();
        Creature::new(CreatureId::new(), archetype, position, 0.0, 1.0)
    }

    #[test]
    fn test_move_towards_faces_target() {
        let config = AiConfig::default();
        let mut creature = angler_at(Vec3::new(0.0, -20.0, 0.0));
        move_towards(&mut creature, Vec3::new(10.0, -20.0, 0.0), 8.0, &config);
        assert!((creature.velocity - Vec3::new(8.0, 0.0, 0.0)).length() < 1e-4);
        assert!((creature.forward() - Vec3::X).length() < 1e-4);
    }

    #[test]
    fn test_vertical_motion_is_slower() {
        let config = AiConfig::default();
        let mut creature = angler_at(Vec3::new(0.0, -20.0, 0.0));
        move_towards(&mut creature, Vec3::new(0.0, -30.0, 0.0), 10.0, &config);
        assert!((creature.velocity.y + 3.0).abs() < 1e-4);
        assert!(creature.pitch < 0.0);
    }

    #[test]
    fn test_arrived_keeps_velocity() {
        let config = AiConfig::default();
        let mut creature = angler_at(Vec3::new(0.0, -20.0, 0.0));
        creature.velocity = Vec3::new(1.0, 0.0, 0.0);
        move_towards(&mut creature, Vec3::new(0.05, -20.0, 0.0), 8.0, &config);
        assert_eq!(creature.velocity, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_drag_is_frame_rate_independent() {
        let config = AiConfig::default();
        let mut fine = angler_at(Vec3::new(0.0, -20.0, 0.0));
        let mut coarse = fine.clone();
        fine.velocity = Vec3::new(10.0, 0.0, 0.0);
        coarse.velocity = fine.velocity;

        for _ in 0..2 {
            integrate(&mut fine, 1.0 / 60.0, &config);
        }
        integrate(&mut coarse, 2.0 / 60.0, &config);
        assert!((fine.velocity.x - coarse.velocity.x).abs() < 1e-4);
        assert!((coarse.velocity.x - 10.0 * 0.95 * 0.95).abs() < 1e-4);
    }

    #[test]
    fn test_integrate_clamps_to_world() {
        let config = AiConfig::default();
        let mut creature = angler_at(Vec3::new(79.0, -2.0, 0.0));
        creature.velocity = Vec3::new(100.0, 100.0, 0.0);
        integrate(&mut creature, 1.0, &config);
        assert_eq!(creature.position.x, 80.0);
        assert_eq!(creature.position.y, -1.0);
    }
}
