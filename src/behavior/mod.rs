//! Creature behaviour - the per-tick pipeline for one creature
//!
//! A tick is split in two around the pack coordinator:
//! - `think`: timers, decay, perception, then the state machine (or the
//!   mimic's dormant check)
//! - `act`: cloak, abilities, then kinematic integration

pub mod kinematics;
pub mod machine;
pub mod waypoints;

pub use machine::{enter_state, force_state, on_player_detected, transition, StepContext};

use crate::abilities;
use crate::creature::{Creature, CreatureState, Trigger};
use crate::perception::{self, Perception};
use crate::special::{cloak, mimic};
use glam::Vec3;

/// What `think` hands on to the pack coordinator and to `act`
#[derive(Debug, Clone, Copy)]
pub struct Thought {
    /// State before anything happened this tick
    pub state_at_start: CreatureState,
    pub perception: Perception,
}

/// First half of a creature's tick
///
/// Returns `None` for creatures that are dead or died this tick.
pub fn think(creature: &mut Creature, ctx: &mut StepContext) -> Option<Thought> {
    if !creature.is_alive() {
        return None;
    }
    let state_at_start = creature.state;

    creature.just_revealed = false;
    creature.tick_timers(ctx.dt);
    creature.decay_levels(ctx.dt, ctx.config);

    if creature.health <= 0.0 {
        transition(creature, Trigger::Killed, ctx);
        return None;
    }

    let perception = perception::sense(creature, ctx.world, ctx.session, ctx.config);
    if creature.is_disguised() {
        mimic::update(creature, &perception, ctx);
    } else {
        machine::step(creature, &perception, ctx);
    }

    Some(Thought {
        state_at_start,
        perception,
    })
}

/// Second half of a creature's tick
pub fn act(creature: &mut Creature, perception: &Perception, ctx: &mut StepContext) {
    if !creature.is_alive() {
        return;
    }
    if creature.is_disguised() {
        creature.velocity = Vec3::ZERO;
        return;
    }

    cloak::refresh(creature);
    abilities::update_abilities(creature, perception, ctx);
    kinematics::integrate(creature, ctx.dt, ctx.config);
}
