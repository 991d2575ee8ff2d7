//! Abilities - cooldown-gated special actions
//!
//! Active abilities follow one contract: a predicate over the creature's
//! state and perception, an effect, and a per-creature cooldown. A fired
//! ability cannot fire again until its cooldown has counted down to zero.
//! Passive abilities never fire; they switch other modules on instead
//! (cloaking, flee regeneration, disguise, lure).

use crate::behavior::kinematics::clamp_to_world;
use crate::behavior::machine::{strike, transition, StepContext};
use crate::core::constants::POUNCE_ALERT_THRESHOLD;
use crate::creature::{Creature, CreatureState, Trigger};
use crate::perception::Perception;
use crate::registry::events::{CreatureEvent, PresentationSignal, SpawnRequest};
use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Archetype summoned by `Summon`
const SUMMONED_ARCHETYPE: &str = "swarmer";

/// Teleport only when the target is further than this
const TELEPORT_MIN_DISTANCE: f32 = 20.0;

const ROAR_SHAKE: f32 = 0.3;
const ROAR_BLUR: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ability {
    // Passive
    Lure,
    Cloaking,
    WallCrawl,
    Disguise,
    Regenerate,
    Swarm,

    // Active
    Pounce,
    Ambush,
    Roar,
    Charge,
    TailSweep,
    Teleport,
    MindAttack,
    SurpriseAttack,
    Distract,
    Summon,
    LaserBeam,
    Crush,
    RealityWarp,
}

impl Ability {
    pub fn all() -> &'static [Ability] {
        use Ability::*;
        &[
            Lure,
            Cloaking,
            WallCrawl,
            Disguise,
            Regenerate,
            Swarm,
            Pounce,
            Ambush,
            Roar,
            Charge,
            TailSweep,
            Teleport,
            MindAttack,
            SurpriseAttack,
            Distract,
            Summon,
            LaserBeam,
            Crush,
            RealityWarp,
        ]
    }

    pub fn is_passive(&self) -> bool {
        matches!(
            self,
            Ability::Lure
                | Ability::Cloaking
                | Ability::WallCrawl
                | Ability::Disguise
                | Ability::Regenerate
                | Ability::Swarm
        )
    }

    /// Seconds before the ability may fire again
    pub fn cooldown(&self) -> f32 {
        match self {
            Ability::Pounce => 10.0,
            Ability::Roar => 15.0,
            Ability::Charge => 12.0,
            Ability::TailSweep => 8.0,
            Ability::Teleport => 20.0,
            Ability::MindAttack => 25.0,
            Ability::SurpriseAttack => 30.0,
            Ability::Distract => 12.0,
            Ability::Summon => 45.0,
            Ability::LaserBeam => 12.0,
            Ability::Crush => 10.0,
            Ability::RealityWarp => 30.0,
            // Ambush retries every tick; passives never fire
            _ => 0.0,
        }
    }
}

/// Whether `ability` is ready and its predicate holds right now
///
/// Cooldowns the creature has never set count as ready.
pub fn can_use(creature: &Creature, ability: Ability, perception: &Perception) -> bool {
    if ability.is_passive() || creature.cooldown(ability) > 0.0 {
        return false;
    }

    let archetype = &creature.archetype;
    let in_reach = perception.distance < archetype.attack_range;
    match ability {
        Ability::Pounce => {
            creature.state == CreatureState::Hunt && creature.alert_level > POUNCE_ALERT_THRESHOLD
        }
        Ability::Ambush => matches!(creature.state, CreatureState::Idle | CreatureState::Patrol),
        Ability::Roar => {
            creature.state == CreatureState::Attack && creature.health < creature.max_health * 0.5
        }
        Ability::Charge => {
            creature.state == CreatureState::Hunt
                && perception.distance > archetype.attack_range * 2.0
                && creature.alert_level > POUNCE_ALERT_THRESHOLD
        }
        Ability::TailSweep | Ability::Crush => creature.state == CreatureState::Attack && in_reach,
        Ability::Teleport => {
            creature.state == CreatureState::Hunt
                && creature
                    .target_position
                    .is_some_and(|target| creature.distance_to(target) > TELEPORT_MIN_DISTANCE)
        }
        Ability::MindAttack => creature.state.is_engaged() && perception.can_see,
        Ability::SurpriseAttack => creature.just_revealed,
        Ability::Distract => creature.state == CreatureState::Attack,
        Ability::Summon => creature.state.is_engaged(),
        Ability::LaserBeam => {
            creature.state == CreatureState::Hunt
                && perception.can_see
                && perception.distance < archetype.detection_range
        }
        Ability::RealityWarp => creature.state == CreatureState::Hunt && perception.can_see,
        _ => false,
    }
}

/// Apply the effect of a ready ability
///
/// Returns true if the ability actually went off. Ambush only goes off on
/// a lucky roll, and only when the session knows where the player was.
pub fn use_ability(creature: &mut Creature, ability: Ability, ctx: &mut StepContext) -> bool {
    let damage = creature.archetype.damage;

    match ability {
        Ability::Pounce => {
            creature.velocity.x *= 3.0;
            creature.velocity.z *= 3.0;
        }
        Ability::Charge => {
            creature.velocity.x *= 2.5;
            creature.velocity.z *= 2.5;
        }
        Ability::Ambush => {
            let Some(last_known) = ctx.session.player_memory().last_known_position else {
                return false;
            };
            if ctx.rng.gen::<f32>() >= ctx.config.ambush_chance_per_tick {
                return false;
            }
            creature.memory.ambush_attempts += 1;
            creature.record_sighting(last_known, ctx.session.clock());
            if !transition(creature, Trigger::AmbushSprung, ctx) {
                return false;
            }
        }
        Ability::Roar => {
            ctx.sink.signal(PresentationSignal::StunBlur {
                creature: creature.id,
                shake: ROAR_SHAKE,
                blur: ROAR_BLUR,
            });
        }
        Ability::TailSweep | Ability::LaserBeam => strike(creature, damage * 0.5, ctx),
        Ability::Crush | Ability::SurpriseAttack => strike(creature, damage, ctx),
        Ability::Teleport => {
            let Some(target) = creature.target_position else {
                return false;
            };
            // Reappear just inside striking distance, on the side we came from
            let mut side = Vec3::new(
                creature.position.x - target.x,
                0.0,
                creature.position.z - target.z,
            )
            .normalize_or_zero();
            if side == Vec3::ZERO {
                side = -creature.forward();
            }
            let landing = target + side * creature.archetype.attack_range * 0.9;
            creature.position = clamp_to_world(landing, ctx.config);
            creature.velocity = Vec3::ZERO;
        }
        Ability::Summon => {
            ctx.spawns.push(SpawnRequest {
                archetype: SUMMONED_ARCHETYPE.to_string(),
                position: creature.position,
                summoner: creature.id,
            });
        }
        Ability::MindAttack | Ability::Distract | Ability::RealityWarp => {
            ctx.sink.signal(PresentationSignal::AbilityCue {
                creature: creature.id,
                ability,
            });
        }
        _ => return false,
    }

    creature.set_cooldown(ability, ability.cooldown());
    tracing::debug!(creature = %creature.id, ?ability, "ability used");
    ctx.report.push(CreatureEvent::AbilityUsed {
        creature: creature.id,
        ability,
    });
    true
}

/// Fire every ready ability of a living, revealed creature, in archetype order
pub fn update_abilities(creature: &mut Creature, perception: &Perception, ctx: &mut StepContext) {
    if !creature.is_alive() || creature.is_disguised() {
        return;
    }

    let archetype = Arc::clone(&creature.archetype);
    for &ability in &archetype.abilities {
        if can_use(creature, ability, perception) {
            use_ability(creature, ability, ctx);
        }
    }
}
