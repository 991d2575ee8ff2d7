//! Session-wide player model: flare overuse, suspicion and the learned snapshot

use abyss_ai::{
    AiConfig, CreatureRegistry, CreatureState, PlayerSnapshot, SpawnOptions, WorldSnapshot,
};
use glam::Vec3;
use std::f32::consts::TAU;

const DT: f32 = 1.0 / 60.0;

fn quiet_registry() -> CreatureRegistry {
    let mut config = AiConfig::default();
    config.ambush_chance_per_tick = 0.0;
    CreatureRegistry::with_config(config).unwrap()
}

/// Player far away in the dark, out of every creature's senses
fn distant_player() -> PlayerSnapshot {
    let mut player = PlayerSnapshot::at(Vec3::new(75.0, -280.0, 75.0));
    player.is_hidden = true;
    player
}

// ============================================================================
// Flares
// ============================================================================

#[test]
fn test_flare_overuse_weakens_lures() {
    let mut registry = quiet_registry();
    let flare = Vec3::new(-20.0, -40.0, 0.0);

    // Six anglers in a ring, all within lure reach (30 * 2.0 = 60)
    for i in 0..6 {
        let angle = i as f32 / 6.0 * TAU;
        let position = flare + Vec3::new(angle.cos() * 20.0, 0.0, angle.sin() * 20.0);
        registry.spawn("angler", position, SpawnOptions::default()).unwrap();
    }

    let world = WorldSnapshot::new(distant_player()).with_flare(flare);
    registry.update(DT, &world);

    for angler in registry.creatures() {
        assert_eq!(angler.state, CreatureState::Investigate);
        assert_eq!(angler.investigation_point, Some(flare));
    }

    let learned = registry.learned_behaviors();
    assert_eq!(learned.flare_usage, 6);
    assert!(learned.lure_multiplier < 1.0);

    let archetype = registry.catalog().get("angler").unwrap();
    let effective = registry.session().effective_lure_attraction(&archetype);
    assert!(effective < archetype.lure_attraction);

    // 56 units out was in reach before the decay (60) but not after (54)
    let late = registry
        .spawn("angler", flare + Vec3::new(56.0, 0.0, 0.0), SpawnOptions::default())
        .unwrap();
    registry.update(DT, &world);
    assert_ne!(registry.get_creature_by_id(late).unwrap().state, CreatureState::Investigate);
    assert_eq!(registry.learned_behaviors().flare_usage, 6);
}

#[test]
fn test_non_luring_archetypes_ignore_flares() {
    let mut registry = quiet_registry();
    let flare = Vec3::new(0.0, -40.0, 0.0);
    let id = registry
        .spawn("mimic", flare + Vec3::new(3.0, 0.0, 0.0), SpawnOptions::default())
        .unwrap();
    registry.force_state_change(id, CreatureState::Patrol).unwrap();

    registry.update(DT, &WorldSnapshot::new(distant_player()).with_flare(flare));
    assert_ne!(registry.get_creature_by_id(id).unwrap().state, CreatureState::Investigate);
    assert_eq!(registry.learned_behaviors().flare_usage, 0);
}

// ============================================================================
// Suspicion
// ============================================================================

#[test]
fn test_sightings_raise_suspicion_then_fade() {
    let mut registry = quiet_registry();
    let position = Vec3::new(0.0, -40.0, 0.0);
    registry.spawn("angler", position, SpawnOptions::facing(0.0)).unwrap();

    let seen = WorldSnapshot::new(PlayerSnapshot::at(position + Vec3::new(0.0, 0.0, 10.0)));
    registry.update(DT, &seen);
    assert_eq!(registry.learned_behaviors().player_memory.suspicion_level, 20.0);

    // Suspicion holds for a minute without sightings, then fades 1/s
    let gone = WorldSnapshot::new(distant_player());
    for _ in 0..55 {
        registry.update(1.0, &gone);
    }
    assert_eq!(registry.learned_behaviors().player_memory.suspicion_level, 20.0);

    for _ in 0..15 {
        registry.update(1.0, &gone);
    }
    let suspicion = registry.learned_behaviors().player_memory.suspicion_level;
    assert!(suspicion < 20.0 && suspicion >= 0.0);
}

// ============================================================================
// Snapshot
// ============================================================================

#[test]
fn test_learned_behaviors_serialize() {
    let registry = quiet_registry();
    let json = serde_json::to_value(registry.learned_behaviors()).unwrap();
    assert_eq!(json["flare_usage"], 0);
    assert_eq!(json["lure_multiplier"], 1.0);
    assert_eq!(json["ambush_response"], "unknown");
    assert!(json["hiding_frequency"].as_array().unwrap().is_empty());
}

#[test]
fn test_clear_all_keeps_session_knowledge() {
    let mut registry = quiet_registry();
    let position = Vec3::new(0.0, -40.0, 0.0);
    registry.spawn("angler", position, SpawnOptions::facing(0.0)).unwrap();
    registry.update(
        DT,
        &WorldSnapshot::new(PlayerSnapshot::at(position + Vec3::new(0.0, 0.0, 10.0))),
    );

    registry.clear_all();
    assert!(registry.is_empty());
    assert!(registry.learned_behaviors().player_memory.last_known_position.is_some());
}
