//! Cloaking - stalkers fade out whenever they are not engaged

use crate::abilities::Ability;
use crate::creature::Creature;

/// Sync the cloak flag and light emission with the creature's state
pub fn refresh(creature: &mut Creature) {
    if !creature.archetype.has_ability(Ability::Cloaking) {
        return;
    }
    creature.is_cloaked = !creature.state.is_engaged();
    creature.light_emission = if creature.is_cloaked {
        0.0
    } else {
        creature.archetype.light_emission
    };
}
