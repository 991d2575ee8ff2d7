//! Pack coordinator - shared targets and surround tactics
//!
//! Runs right after a pack member's own step, inside the single forward
//! pass over the creature list. A member that was already hunting when the
//! tick began calls the rest of its pack in, so siblings join the hunt one
//! tick after the first member started it. The first hunting member in
//! list order leads the pack and hands its hunting siblings evenly spaced
//! slots around the target.

use crate::behavior::kinematics::clamp_to_world;
use crate::behavior::machine::{transition, StepContext};
use crate::core::config::AiConfig;
use crate::core::constants::SURROUND_RADIUS;
use crate::core::types::{forward_from_yaw, yaw_towards, CreatureId, PackId};
use crate::creature::{Creature, CreatureState, Trigger};
use glam::Vec3;
use std::f32::consts::TAU;

/// Coordinate the pack of `creatures[index]` after that creature stepped
pub fn coordinate(
    creatures: &mut [Creature],
    index: usize,
    state_at_start: CreatureState,
    ctx: &mut StepContext,
) {
    let Some(caller) = creatures.get(index) else {
        return;
    };
    let Some(pack_id) = caller.pack_id else {
        return;
    };
    if caller.pack_members.is_empty() {
        return;
    }

    if state_at_start == CreatureState::Hunt {
        call_pack(creatures, index, ctx);
    }

    if leader_index(creatures, pack_id) == Some(index) {
        assign_surround(creatures, index, ctx.config);
    }
}

/// A hunting member with a target pulls every idle sibling into the hunt
fn call_pack(creatures: &mut [Creature], index: usize, ctx: &mut StepContext) {
    let caller = &creatures[index];
    if caller.state != CreatureState::Hunt {
        return;
    }
    let Some(target) = caller.target_position else {
        return;
    };
    let last_seen = caller.target_last_seen;
    let caller_id = caller.id;
    let siblings = caller.pack_members.clone();

    for sibling_id in siblings {
        let Some(sibling) = find_mut(creatures, sibling_id) else {
            continue;
        };
        if !sibling.is_alive() || sibling.is_disguised() || sibling.state.is_engaged() {
            continue;
        }
        sibling.target_position = Some(target);
        sibling.target_last_seen = last_seen;
        if transition(sibling, Trigger::PackCall, ctx) {
            tracing::trace!(caller = %caller_id, sibling = %sibling_id, "pack called in");
        }
    }
}

/// Hand out flanking slots around the leader's target
fn assign_surround(creatures: &mut [Creature], leader: usize, config: &AiConfig) {
    let Some(target) = creatures[leader].target_position else {
        return;
    };
    let bearing = yaw_towards(creatures[leader].position, target);
    let leader_id = creatures[leader].id;

    let siblings: Vec<usize> = creatures[leader]
        .pack_members
        .iter()
        .filter_map(|&id| creatures.iter().position(|c| c.id == id))
        .filter(|&j| j != leader && creatures[j].is_alive())
        .collect();
    let slots = surround_positions(target, bearing, siblings.len(), config);

    creatures[leader].surround_goal = None;
    for (j, slot) in siblings.into_iter().zip(slots) {
        if creatures[j].state == CreatureState::Hunt {
            creatures[j].surround_goal = Some(slot);
        }
    }
    tracing::trace!(leader = %leader_id, "surround assigned");
}

/// `count` points on a ring of `SURROUND_RADIUS` around `target`
///
/// The ring is split into `count + 1` equal arcs starting at `bearing`; the
/// first arc is left to the leader's own approach.
pub fn surround_positions(target: Vec3, bearing: f32, count: usize, config: &AiConfig) -> Vec<Vec3> {
    let step = TAU / (count as f32 + 1.0);
    (1..=count)
        .map(|k| {
            let angle = bearing + step * k as f32;
            clamp_to_world(target + forward_from_yaw(angle) * SURROUND_RADIUS, config)
        })
        .collect()
}

/// First living member of the pack, in list order, that is hunting
pub fn leader_index(creatures: &[Creature], pack_id: PackId) -> Option<usize> {
    creatures.iter().position(|c| {
        c.pack_id == Some(pack_id) && c.is_alive() && c.state == CreatureState::Hunt
    })
}

fn find_mut(creatures: &mut [Creature], id: CreatureId) -> Option<&mut Creature> {
    creatures.iter_mut().find(|c| c.id == id)
}
