//! Live creature record - one per spawned instance

use crate::abilities::Ability;
use crate::core::config::AiConfig;
use crate::core::constants::{FEAR_PER_HEALTH_FRACTION, LEVEL_MAX, LEVEL_MIN};
use crate::core::types::{forward_from_yaw, CreatureId, PackId};
use crate::creature::archetype::{Archetype, DisguiseKind};
use crate::creature::state::CreatureState;
use ahash::AHashMap;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Per-creature tallies of how encounters went
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalMemory {
    pub ambush_attempts: u32,
    pub successful_hits: u32,
    pub player_escapes: u32,
}

/// Mutable state of one creature
#[derive(Debug, Clone)]
pub struct Creature {
    pub id: CreatureId,
    pub archetype: Arc<Archetype>,

    // Kinematics
    pub position: Vec3,
    pub velocity: Vec3,
    /// Heading about +Y; yaw 0 faces +Z
    pub yaw: f32,
    pub pitch: f32,

    // Vitals
    pub health: f32,
    pub max_health: f32,

    // State machine
    pub state: CreatureState,
    pub previous_state: Option<CreatureState>,
    /// Seconds spent in the current state
    pub state_timer: f32,

    // Levels, all in [0, 100]
    pub alert_level: f32,
    pub fear_level: f32,
    /// Stored only; nothing reads it yet
    pub hunger_level: f32,

    // Memory of the target
    pub target_position: Option<Vec3>,
    /// Session clock time of the last sighting
    pub target_last_seen: Option<f32>,
    pub investigation_point: Option<Vec3>,

    // Routes
    pub spawn_position: Vec3,
    pub patrol_points: Vec<Vec3>,
    pub patrol_index: usize,
    /// Generated lazily on the first SEARCH tick
    pub search_points: Option<Vec<Vec3>>,
    pub search_index: usize,

    // Pack
    pub pack_id: Option<PackId>,
    pub pack_members: Vec<CreatureId>,
    /// Flanking position handed out by the pack leader while hunting
    pub surround_goal: Option<Vec3>,
    /// Set on creatures brought in by another creature's summon
    pub summoned_by: Option<CreatureId>,

    // Special behaviours
    pub is_cloaked: bool,
    pub disguise: Option<DisguiseKind>,
    /// Set for the tick in which a mimic drops its disguise
    pub just_revealed: bool,
    pub light_emission: f32,

    // Timers (count down to zero)
    pub ability_cooldowns: AHashMap<Ability, f32>,
    pub attack_cooldown: f32,
    pub corpse_timer: Option<f32>,

    pub memory: PersonalMemory,
}

impl Creature {
    pub fn new(
        id: CreatureId,
        archetype: Arc<Archetype>,
        position: Vec3,
        yaw: f32,
        health_multiplier: f32,
    ) -> Self {
        let max_health = archetype.health * health_multiplier;
        let light_emission = archetype.light_emission;

        Self {
            id,
            archetype,
            position,
            velocity: Vec3::ZERO,
            yaw,
            pitch: 0.0,
            health: max_health,
            max_health,
            state: CreatureState::Idle,
            previous_state: None,
            state_timer: 0.0,
            alert_level: 0.0,
            fear_level: 0.0,
            hunger_level: 50.0,
            target_position: None,
            target_last_seen: None,
            investigation_point: None,
            spawn_position: position,
            patrol_points: Vec::new(),
            patrol_index: 0,
            search_points: None,
            search_index: 0,
            pack_id: None,
            pack_members: Vec::new(),
            surround_goal: None,
            summoned_by: None,
            is_cloaked: false,
            disguise: None,
            just_revealed: false,
            light_emission,
            ability_cooldowns: AHashMap::new(),
            attack_cooldown: 0.0,
            corpse_timer: None,
            memory: PersonalMemory::default(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.state.is_alive()
    }

    pub fn is_disguised(&self) -> bool {
        self.disguise.is_some()
    }

    /// Unit vector the creature is facing
    pub fn forward(&self) -> Vec3 {
        forward_from_yaw(self.yaw)
    }

    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.position.distance(point)
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health > 0.0 {
            self.health / self.max_health
        } else {
            0.0
        }
    }

    /// Below the archetype's fear threshold (never true for fearless archetypes)
    pub fn should_flee(&self) -> bool {
        self.archetype.can_flee() && self.health < self.max_health * self.archetype.fear_factor
    }

    pub fn raise_alert(&mut self, amount: f32) {
        self.set_alert(self.alert_level + amount);
    }

    pub fn set_alert(&mut self, value: f32) {
        self.alert_level = value.clamp(LEVEL_MIN, LEVEL_MAX);
    }

    pub fn raise_fear(&mut self, amount: f32) {
        self.set_fear(self.fear_level + amount);
    }

    pub fn set_fear(&mut self, value: f32) {
        self.fear_level = value.clamp(LEVEL_MIN, LEVEL_MAX);
    }

    /// Fade alert and fear toward zero
    pub fn decay_levels(&mut self, dt: f32, config: &AiConfig) {
        self.set_alert(self.alert_level - config.alert_decay_per_second * dt);
        self.set_fear(self.fear_level - config.fear_decay_per_second * dt);
    }

    /// Remaining cooldown; abilities never used are ready
    pub fn cooldown(&self, ability: Ability) -> f32 {
        self.ability_cooldowns.get(&ability).copied().unwrap_or(0.0)
    }

    pub fn set_cooldown(&mut self, ability: Ability, seconds: f32) {
        self.ability_cooldowns.insert(ability, seconds);
    }

    /// Count every timer down by `dt`, stopping at zero
    pub fn tick_timers(&mut self, dt: f32) {
        self.state_timer += dt;
        self.attack_cooldown = (self.attack_cooldown - dt).max(0.0);
        for remaining in self.ability_cooldowns.values_mut() {
            *remaining = (*remaining - dt).max(0.0);
        }
    }

    /// Seconds since the target was last seen, if it ever was
    pub fn time_since_target_seen(&self, now: f32) -> Option<f32> {
        self.target_last_seen.map(|seen| (now - seen).max(0.0))
    }

    /// Remember the target at `position`, seen at `now`
    pub fn record_sighting(&mut self, position: Vec3, now: f32) {
        self.target_position = Some(position);
        self.target_last_seen = Some(now);
    }

    /// Lose health and gain fear in proportion to the share of health lost
    ///
    /// Returns true when the hit leaves the creature at zero health.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        let amount = amount.max(0.0);
        let before = self.health;
        self.health = (self.health - amount).max(0.0);
        if self.max_health > 0.0 {
            let lost = (before - self.health) / self.max_health;
            self.raise_fear(lost * FEAR_PER_HEALTH_FRACTION);
        }
        self.health <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::catalog::ArchetypeCatalog;

    fn angler() -> Creature {
        let archetype = ArchetypeCatalog::builtin().get("angler").unwrap();
        Creature::new(CreatureId::new(), archetype, Vec3::new(0.0, -20.0, 0.0), 0.0, 1.0)
    }

    #[test]
    fn test_new_creature_defaults() {
        let creature = angler();
        assert_eq!(creature.state, CreatureState::Idle);
        assert_eq!(creature.health, 100.0);
        assert_eq!(creature.light_emission, 1.0);
        assert!(!creature.is_disguised());
    }

    #[test]
    fn test_health_multiplier() {
        let archetype = ArchetypeCatalog::builtin().get("angler").unwrap();
        let creature = Creature::new(CreatureId::new(), archetype, Vec3::ZERO, 0.0, 1.5);
        assert_eq!(creature.max_health, 150.0);
        assert_eq!(creature.health, 150.0);
    }

    #[test]
    fn test_levels_clamped() {
        let mut creature = angler();
        creature.raise_alert(250.0);
        assert_eq!(creature.alert_level, 100.0);
        creature.raise_fear(-40.0);
        assert_eq!(creature.fear_level, 0.0);
    }

    #[test]
    fn test_decay_floors_at_zero() {
        let mut creature = angler();
        creature.set_alert(3.0);
        creature.set_fear(1.0);
        creature.decay_levels(1.0, &AiConfig::default());
        assert_eq!(creature.alert_level, 0.0);
        assert_eq!(creature.fear_level, 0.0);
    }

    #[test]
    fn test_unknown_cooldown_is_ready() {
        let mut creature = angler();
        assert_eq!(creature.cooldown(Ability::Pounce), 0.0);
        creature.set_cooldown(Ability::Pounce, 1.0);
        creature.tick_timers(0.4);
        assert!((creature.cooldown(Ability::Pounce) - 0.6).abs() < 1e-6);
        creature.tick_timers(5.0);
        assert_eq!(creature.cooldown(Ability::Pounce), 0.0);
    }

    #[test]
    fn test_damage_raises_fear() {
        let mut creature = angler();
        assert!(!creature.take_damage(25.0));
        assert_eq!(creature.health, 75.0);
        assert!((creature.fear_level - 25.0).abs() < 1e-4);
        assert!(creature.take_damage(500.0));
        assert_eq!(creature.health, 0.0);
    }

    #[test]
    fn test_flee_threshold() {
        let mut creature = angler();
        creature.health = 31.0;
        assert!(!creature.should_flee());
        creature.health = 25.0;
        assert!(creature.should_flee());
    }
}
