//! Perception - what a creature notices about the player this tick
//!
//! `sense` is pure: it reads the creature, the world snapshot and the
//! session's learned lure multiplier, and returns a `Perception`. Memory
//! updates happen later in the state machine's detection handler.

use crate::core::config::AiConfig;
use crate::core::constants::CLOAK_RANGE_FACTOR;
use crate::creature::Creature;
use crate::learning::SessionContext;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Everything the core knows about the player for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub position: Vec3,
    /// Ambient light around the player; too dark and nothing can see them
    pub light_level: f32,
    /// Units per second
    pub movement_speed: f32,
    pub is_sprinting: bool,
    pub is_hidden: bool,
}

impl PlayerSnapshot {
    /// A lit, stationary, unhidden player at `position`
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            light_level: 1.0,
            movement_speed: 0.0,
            is_sprinting: false,
            is_hidden: false,
        }
    }
}

/// An active flare stimulus
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Flare {
    pub position: Vec3,
}

/// The whole boundary between the core and the rest of the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub player: PlayerSnapshot,
    #[serde(default)]
    pub flares: Vec<Flare>,
}

impl WorldSnapshot {
    pub fn new(player: PlayerSnapshot) -> Self {
        Self { player, flares: Vec::new() }
    }

    pub fn with_flare(mut self, position: Vec3) -> Self {
        self.flares.push(Flare { position });
        self
    }
}

/// Sensor output for one creature
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Perception {
    pub can_see: bool,
    pub can_hear: bool,
    pub distance: f32,
    /// Unit vector from the creature to the player (zero when co-located)
    pub direction_to_player: Vec3,
    pub player_position: Vec3,
    /// Where the noise came from, when heard
    pub sound_source: Option<Vec3>,
    pub attracted_to_flare: bool,
    pub flare_position: Option<Vec3>,
}

/// Vision range after cloaking
pub fn effective_detection_range(creature: &Creature) -> f32 {
    let range = creature.archetype.detection_range;
    if creature.is_cloaked {
        range * CLOAK_RANGE_FACTOR
    } else {
        range
    }
}

/// How loud the player is: speed/10, plus a bonus when sprinting
pub fn player_noise(player: &PlayerSnapshot, config: &AiConfig) -> f32 {
    let mut noise = player.movement_speed / 10.0;
    if player.is_sprinting {
        noise += config.sprint_noise_bonus;
    }
    noise
}

pub fn sense(
    creature: &Creature,
    world: &WorldSnapshot,
    session: &SessionContext,
    config: &AiConfig,
) -> Perception {
    let player = &world.player;
    let offset = player.position - creature.position;
    let distance = offset.length();
    let direction_to_player = offset.normalize_or_zero();

    let can_see = distance < effective_detection_range(creature)
        && within_vision_cone(creature, direction_to_player)
        && !player.is_hidden
        && player.light_level > config.min_light_level;

    let can_hear = distance < creature.archetype.hearing_range
        && player_noise(player, config) > config.noise_threshold;

    let flare_position = nearest_attracting_flare(creature, &world.flares, session);

    Perception {
        can_see,
        can_hear,
        distance,
        direction_to_player,
        player_position: player.position,
        sound_source: can_hear.then_some(player.position),
        attracted_to_flare: flare_position.is_some(),
        flare_position,
    }
}

fn within_vision_cone(creature: &Creature, direction: Vec3) -> bool {
    // Co-located: nothing to turn towards
    if direction == Vec3::ZERO {
        return true;
    }
    let cos = creature.forward().dot(direction).clamp(-1.0, 1.0);
    cos.acos() <= creature.archetype.vision_half_angle()
}

fn nearest_attracting_flare(
    creature: &Creature,
    flares: &[Flare],
    session: &SessionContext,
) -> Option<Vec3> {
    let reach = creature.archetype.detection_range * session.effective_lure_attraction(&creature.archetype);
    if reach <= 0.0 {
        return None;
    }

    flares
        .iter()
        .map(|flare| (flare.position, creature.distance_to(flare.position)))
        .filter(|&(_, distance)| distance < reach)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(position, _)| position)
}
