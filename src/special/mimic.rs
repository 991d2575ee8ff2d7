//! Mimicry - lie still as an object, strike when the player comes close
//!
//! A disguised mimic is dormant: it stays IDLE, never moves and never uses
//! abilities. The state machine does not run for it at all.

use crate::behavior::machine::{force_state, transition, StepContext};
use crate::core::constants::{LEVEL_MAX, MIMIC_REVEAL_RADIUS};
use crate::creature::{Creature, CreatureState, Trigger};
use crate::perception::Perception;
use crate::registry::events::{CreatureEvent, PresentationSignal};
use glam::Vec3;
use rand::seq::SliceRandom;
use rand::Rng;

const REVEAL_SHAKE: f32 = 0.5;

/// Put a freshly spawned mimic into one of its disguises
pub fn disguise<R: Rng>(creature: &mut Creature, rng: &mut R) {
    creature.disguise = creature.archetype.disguises.choose(rng).copied();
}

/// Dormant tick for a disguised mimic; reveals it when the player is close
///
/// Returns true while the creature stays disguised.
pub fn update(creature: &mut Creature, perception: &Perception, ctx: &mut StepContext) -> bool {
    if !creature.is_disguised() {
        return false;
    }
    creature.velocity = Vec3::ZERO;

    if perception.distance < MIMIC_REVEAL_RADIUS {
        reveal(creature, ctx);
        return false;
    }
    true
}

/// Drop the disguise and go straight for the player
pub fn reveal(creature: &mut Creature, ctx: &mut StepContext) {
    let disguise = creature.disguise.take();
    creature.just_revealed = true;

    if !transition(creature, Trigger::MimicRevealed, ctx) {
        force_state(creature, CreatureState::Attack, ctx.config, ctx.report);
    }
    creature.set_alert(LEVEL_MAX);

    tracing::debug!(creature = %creature.id, ?disguise, "mimic revealed");
    ctx.report.push(CreatureEvent::Revealed {
        creature: creature.id,
        disguise,
    });
    ctx.sink.signal(PresentationSignal::JumpScare {
        creature: creature.id,
        position: creature.position,
    });
    ctx.sink.signal(PresentationSignal::CameraShake {
        intensity: REVEAL_SHAKE,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AiConfig;
    use crate::core::types::CreatureId;
    use crate::creature::ArchetypeCatalog;
    use crate::learning::SessionContext;
    use crate::perception::{sense, PlayerSnapshot, WorldSnapshot};
    use crate::registry::events::{SpawnRequest, TickReport};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn run(mimic: &mut Creature, player_at: Vec3) -> (bool, TickReport, Vec<PresentationSignal>) {
        let config = AiConfig::default();
        let world = WorldSnapshot::new(PlayerSnapshot::at(player_at));
        let mut session = SessionContext::new();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut report = TickReport::new();
        let mut signals = Vec::new();
        let mut spawns: Vec<SpawnRequest> = Vec::new();
        let perception = sense(mimic, &world, &session, &config);
        let mut ctx = StepContext {
            config: &config,
            world: &world,
            session: &mut session,
            rng: &mut rng,
            report: &mut report,
            sink: &mut signals,
            spawns: &mut spawns,
            dt: 0.1,
        };
        let dormant = update(mimic, &perception, &mut ctx);
        (dormant, report, signals)
    }

    fn disguised_mimic() -> Creature {
        let archetype = ArchetypeCatalog::builtin().get("mimic").unwrap();
        let mut mimic = Creature::new(CreatureId::new(), archetype, Vec3::new(0.0, -60.0, 0.0), 0.0, 1.0);
        disguise(&mut mimic, &mut ChaCha8Rng::seed_from_u64(9));
        mimic
    }

    #[test]
    fn test_disguise_comes_from_archetype() {
        let mimic = disguised_mimic();
        let kind = mimic.disguise.unwrap();
        assert!(mimic.archetype.disguises.contains(&kind));
    }

    #[test]
    fn test_stays_dormant_out_of_reach() {
        let mut mimic = disguised_mimic();
        mimic.velocity = Vec3::new(1.0, 0.0, 0.0);
        let (dormant, report, signals) = run(&mut mimic, Vec3::new(0.0, -60.0, 5.0));
        assert!(dormant);
        assert_eq!(mimic.velocity, Vec3::ZERO);
        assert_eq!(mimic.state, CreatureState::Idle);
        assert!(report.events.is_empty());
        assert!(signals.is_empty());
    }

    #[test]
    fn test_reveal_within_radius() {
        let mut mimic = disguised_mimic();
        let (dormant, report, signals) = run(&mut mimic, Vec3::new(0.0, -60.0, 2.0));
        assert!(!dormant);
        assert!(!mimic.is_disguised());
        assert!(mimic.just_revealed);
        assert_eq!(mimic.state, CreatureState::Attack);
        assert_eq!(mimic.alert_level, LEVEL_MAX);
        assert_eq!(report.final_state_of(mimic.id), Some(CreatureState::Attack));
        assert!(matches!(signals[0], PresentationSignal::JumpScare { .. }));
    }
}
