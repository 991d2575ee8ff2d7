//! Per-creature state machine
//!
//! Each tick a living creature first reacts to what it perceives (sight,
//! noise, flares), then runs the update for whatever state it is now in.
//! Every state change goes through `transition`, which only follows edges
//! of [`TRANSITIONS`]. The one exception is `force_state`, kept for
//! scripted sequences.

use crate::behavior::kinematics::{clamp_to_world, face_position, move_towards};
use crate::behavior::waypoints;
use crate::core::config::AiConfig;
use crate::core::constants::{
    ALERT_CALM_DURATION, ALERT_GAIN_PER_SECOND, ALERT_SCAN_FREQUENCY, ALERT_SCAN_RATE,
    ATTACK_COOLDOWN, ATTACK_DISENGAGE_FACTOR, FLEE_LOOKAHEAD, FLEE_RECOVERY_FRACTION,
    FLEE_SAFE_DISTANCE, FLEE_SPEED_FACTOR, HUNT_ALERT_THRESHOLD, HUNT_FEAR_DIVISOR,
    IDLE_DURATION, IDLE_SCAN_FREQUENCY, IDLE_SCAN_RATE, INVESTIGATE_ALERT_GAIN,
    INVESTIGATE_ESCALATION_THRESHOLD, INVESTIGATE_SPEED_FACTOR, INVESTIGATION_TOLERANCE,
    LEVEL_MAX, PATROL_SPEED_FACTOR, REGENERATION_PER_SECOND, SEARCH_SPEED_FACTOR,
    SURROUND_RADIUS, WAYPOINT_TOLERANCE,
};
use crate::abilities::Ability;
use crate::creature::{Creature, CreatureState, Trigger, TRANSITIONS};
use crate::learning::SessionContext;
use crate::perception::{Perception, WorldSnapshot};
use crate::registry::events::{
    CreatureEvent, PresentationSignal, PresentationSink, SpawnRequest, TickReport,
};
use crate::special::cloak;
use glam::Vec3;
use rand_chacha::ChaCha8Rng;

/// Camera shake for a landed melee hit
const STRIKE_SHAKE: f32 = 0.3;

/// Everything a creature step may read or write besides the creature itself
pub struct StepContext<'a> {
    pub config: &'a AiConfig,
    pub world: &'a WorldSnapshot,
    pub session: &'a mut SessionContext,
    pub rng: &'a mut ChaCha8Rng,
    pub report: &'a mut TickReport,
    pub sink: &'a mut dyn PresentationSink,
    /// Spawns requested mid-pass, applied once every creature has stepped
    pub spawns: &'a mut Vec<SpawnRequest>,
    pub dt: f32,
}

/// Follow the edge named by `trigger`, if the current state has one
///
/// Returns true when the state changed.
pub fn transition(creature: &mut Creature, trigger: Trigger, ctx: &mut StepContext) -> bool {
    match TRANSITIONS.apply(creature.state, trigger) {
        Some(next) => {
            enter_state(creature, next, Some(trigger), ctx.config, ctx.report);
            true
        }
        None => false,
    }
}

/// Switch state and apply entry effects
pub fn enter_state(
    creature: &mut Creature,
    next: CreatureState,
    trigger: Option<Trigger>,
    config: &AiConfig,
    report: &mut TickReport,
) {
    let from = creature.state;
    creature.previous_state = Some(from);
    creature.state = next;
    creature.state_timer = 0.0;

    match next {
        CreatureState::Hunt => creature.set_alert(LEVEL_MAX),
        CreatureState::Search => {
            creature.search_points = None;
            creature.search_index = 0;
        }
        CreatureState::Dead => {
            creature.health = creature.health.min(0.0);
            creature.velocity = Vec3::ZERO;
            creature.corpse_timer = Some(config.corpse_duration);
        }
        _ => {}
    }
    if next != CreatureState::Hunt {
        creature.surround_goal = None;
    }
    cloak::refresh(creature);

    tracing::debug!(
        creature = %creature.id,
        archetype = %creature.archetype.id,
        from = %from,
        to = %next,
        ?trigger,
        "state change"
    );
    report.push(CreatureEvent::StateChanged {
        creature: creature.id,
        from,
        to: next,
        trigger,
    });
    if next == CreatureState::Dead {
        report.push(CreatureEvent::Died {
            creature: creature.id,
            loot: creature.archetype.loot.clone(),
        });
    }
}

/// Scripted state change that skips the transition table
///
/// Still resets the state timer and applies entry effects. Dead creatures
/// stay dead; a disguised creature forced out of IDLE loses its disguise.
pub fn force_state(
    creature: &mut Creature,
    next: CreatureState,
    config: &AiConfig,
    report: &mut TickReport,
) -> bool {
    if !creature.is_alive() {
        return false;
    }
    if next != CreatureState::Idle {
        creature.disguise = None;
    }
    enter_state(creature, next, None, config, report);
    true
}

/// The player was spotted: remember where, tell the session, go to ALERT
pub fn on_player_detected(creature: &mut Creature, position: Vec3, ctx: &mut StepContext) {
    creature.record_sighting(position, ctx.session.clock());
    ctx.session.record_detection(position);
    transition(creature, Trigger::PlayerSighted, ctx);
}

/// Damage the player and feed the learner
pub fn strike(creature: &mut Creature, damage: f32, ctx: &mut StepContext) {
    ctx.report.player_damage += damage;
    ctx.report.push(CreatureEvent::PlayerHit {
        creature: creature.id,
        damage,
    });
    creature.memory.successful_hits += 1;
    ctx.session.record_player_damaged();
    ctx.sink.signal(PresentationSignal::CameraShake {
        intensity: STRIKE_SHAKE,
    });
}

/// React to stimuli, then run the current state's update
pub fn step(creature: &mut Creature, perception: &Perception, ctx: &mut StepContext) {
    react_to_stimuli(creature, perception, ctx);

    match creature.state {
        CreatureState::Idle => update_idle(creature, ctx),
        CreatureState::Patrol => update_patrol(creature, ctx),
        CreatureState::Investigate => update_investigate(creature, ctx),
        CreatureState::Alert => update_alert(creature, perception, ctx),
        CreatureState::Hunt => update_hunt(creature, perception, ctx),
        CreatureState::Attack => update_attack(creature, perception, ctx),
        CreatureState::Search => update_search(creature, ctx),
        CreatureState::Flee => update_flee(creature, perception, ctx),
        CreatureState::Dead => {}
    }
}

fn react_to_stimuli(creature: &mut Creature, perception: &Perception, ctx: &mut StepContext) {
    if perception.can_see {
        if creature.state.reacts_to_sighting() {
            on_player_detected(creature, perception.player_position, ctx);
        } else {
            creature.record_sighting(perception.player_position, ctx.session.clock());
        }
        return;
    }

    if !matches!(creature.state, CreatureState::Idle | CreatureState::Patrol) {
        return;
    }

    if let Some(source) = perception.sound_source {
        creature.investigation_point = Some(clamp_to_world(source, ctx.config));
        transition(creature, Trigger::NoiseHeard, ctx);
    } else if let Some(flare) = perception.flare_position {
        creature.investigation_point = Some(clamp_to_world(flare, ctx.config));
        if transition(creature, Trigger::FlareLure, ctx) {
            ctx.session.record_flare_lure();
        }
    }
}

fn update_idle(creature: &mut Creature, ctx: &mut StepContext) {
    creature.yaw += (creature.state_timer * IDLE_SCAN_FREQUENCY).sin() * IDLE_SCAN_RATE * ctx.dt;

    if creature.state_timer > IDLE_DURATION {
        transition(creature, Trigger::IdleTimeout, ctx);
    }
}

fn update_patrol(creature: &mut Creature, ctx: &mut StepContext) {
    if creature.patrol_points.is_empty() {
        creature.patrol_points =
            waypoints::patrol_points(creature.spawn_position, &creature.archetype, ctx.rng, ctx.config);
        creature.patrol_index = 0;
    }
    let Some(&target) = creature
        .patrol_points
        .get(creature.patrol_index % creature.patrol_points.len().max(1))
    else {
        return;
    };

    let speed = creature.archetype.speed * PATROL_SPEED_FACTOR;
    move_towards(creature, target, speed, ctx.config);

    if creature.distance_to(target) < WAYPOINT_TOLERANCE {
        creature.patrol_index = (creature.patrol_index + 1) % creature.patrol_points.len();
        transition(creature, Trigger::PatrolPointReached, ctx);
    }
}

fn update_investigate(creature: &mut Creature, ctx: &mut StepContext) {
    let Some(point) = creature.investigation_point else {
        transition(creature, Trigger::InvestigationCleared, ctx);
        return;
    };

    let speed = creature.archetype.speed * INVESTIGATE_SPEED_FACTOR;
    move_towards(creature, point, speed, ctx.config);

    if creature.distance_to(point) < INVESTIGATION_TOLERANCE {
        creature.investigation_point = None;
        creature.raise_alert(INVESTIGATE_ALERT_GAIN);
        let trigger = if creature.alert_level >= INVESTIGATE_ESCALATION_THRESHOLD {
            Trigger::InvestigationEscalated
        } else {
            Trigger::InvestigationCleared
        };
        transition(creature, trigger, ctx);
    }
}

fn update_alert(creature: &mut Creature, perception: &Perception, ctx: &mut StepContext) {
    creature.velocity = Vec3::ZERO;
    creature.yaw +=
        (creature.state_timer * ALERT_SCAN_FREQUENCY).sin() * ALERT_SCAN_RATE * ctx.dt;
    creature.raise_alert(ALERT_GAIN_PER_SECOND * ctx.dt);

    if perception.can_see && creature.alert_level >= HUNT_ALERT_THRESHOLD {
        transition(creature, Trigger::HuntStarted, ctx);
        return;
    }

    if creature.state_timer > ALERT_CALM_DURATION && !perception.can_see && !perception.can_hear {
        creature.set_alert(0.0);
        transition(creature, Trigger::AlertCalmed, ctx);
    }
}

fn update_hunt(creature: &mut Creature, perception: &Perception, ctx: &mut StepContext) {
    let memory = creature.archetype.memory_duration;
    let lost = !perception.can_see
        && creature
            .time_since_target_seen(ctx.session.clock())
            .map_or(true, |elapsed| elapsed > memory);
    if lost {
        transition(creature, Trigger::TargetLost, ctx);
        return;
    }

    if let Some(target) = creature.target_position {
        // Flank via the surround slot until close, then go straight in
        let goal = match creature.surround_goal {
            Some(slot) if creature.distance_to(target) > SURROUND_RADIUS => slot,
            _ => target,
        };
        let speed = creature.archetype.speed * (1.0 - creature.fear_level / HUNT_FEAR_DIVISOR);
        move_towards(creature, goal, speed, ctx.config);
    }

    if perception.distance < creature.archetype.attack_range {
        transition(creature, Trigger::TargetInRange, ctx);
    }
}

fn update_attack(creature: &mut Creature, perception: &Perception, ctx: &mut StepContext) {
    creature.velocity = Vec3::ZERO;
    face_position(creature, perception.player_position);

    let attack_range = creature.archetype.attack_range;
    if creature.attack_cooldown <= 0.0 {
        creature.attack_cooldown = ATTACK_COOLDOWN;
        if perception.distance < attack_range {
            let damage = creature.archetype.damage;
            strike(creature, damage, ctx);
        }
    }

    if creature.should_flee() {
        transition(creature, Trigger::FearBreak, ctx);
        return;
    }
    if perception.distance > attack_range * ATTACK_DISENGAGE_FACTOR {
        transition(creature, Trigger::TargetOutOfRange, ctx);
    }
}

fn update_search(creature: &mut Creature, ctx: &mut StepContext) {
    let center = creature.target_position.unwrap_or(creature.position);
    let points = creature
        .search_points
        .get_or_insert_with(|| waypoints::search_points(center, ctx.rng, ctx.config));

    let Some(&target) = points.get(creature.search_index) else {
        give_up_search(creature, center, ctx);
        return;
    };
    let point_count = points.len();

    let speed = creature.archetype.speed * SEARCH_SPEED_FACTOR;
    move_towards(creature, target, speed, ctx.config);

    if creature.distance_to(target) < WAYPOINT_TOLERANCE {
        creature.search_index += 1;
        if creature.search_index >= point_count {
            give_up_search(creature, center, ctx);
        }
    }
}

/// Every sweep point visited: the player got away from around `center`
fn give_up_search(creature: &mut Creature, center: Vec3, ctx: &mut StepContext) {
    creature.memory.player_escapes += 1;
    creature.search_points = None;
    let cell = ctx.session.record_hiding_spot(center);
    tracing::debug!(creature = %creature.id, %cell, "search exhausted");
    transition(creature, Trigger::SearchExhausted, ctx);
}

fn update_flee(creature: &mut Creature, perception: &Perception, ctx: &mut StepContext) {
    let away = Vec3::new(
        creature.position.x - perception.player_position.x,
        0.0,
        creature.position.z - perception.player_position.z,
    )
    .normalize_or_zero();
    let goal = creature.position + away * FLEE_LOOKAHEAD;
    let speed = creature.archetype.speed * FLEE_SPEED_FACTOR;
    move_towards(creature, goal, speed, ctx.config);

    if creature.archetype.has_ability(Ability::Regenerate) {
        creature.health =
            (creature.health + REGENERATION_PER_SECOND * ctx.dt).min(creature.max_health);
    }

    if perception.distance > FLEE_SAFE_DISTANCE
        && creature.health > creature.max_health * FLEE_RECOVERY_FRACTION
    {
        creature.set_fear(0.0);
        transition(creature, Trigger::Recovered, ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::CreatureId;
    use crate::creature::ArchetypeCatalog;
    use crate::perception::{sense, PlayerSnapshot};
    use crate::registry::events::NullSink;
    use rand::SeedableRng;

    struct Harness {
        config: AiConfig,
        session: SessionContext,
        rng: ChaCha8Rng,
        report: TickReport,
        sink: NullSink,
        spawns: Vec<SpawnRequest>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                config: AiConfig::default(),
                session: SessionContext::new(),
                rng: ChaCha8Rng::seed_from_u64(1),
                report: TickReport::new(),
                sink: NullSink,
                spawns: Vec::new(),
            }
        }

        /// One step of sense + decide, without integration
        fn step(&mut self, creature: &mut Creature, world: &WorldSnapshot, dt: f32) {
            self.session.advance(dt, &self.config);
            creature.tick_timers(dt);
            let perception = sense(creature, world, &self.session, &self.config);
            let mut ctx = StepContext {
                config: &self.config,
                world,
                session: &mut self.session,
                rng: &mut self.rng,
                report: &mut self.report,
                sink: &mut self.sink,
                spawns: &mut self.spawns,
                dt,
            };
            step(creature, &perception, &mut ctx);
        }
    }

    fn spawn(kind: &str, position: Vec3) -> Creature {
        let archetype = ArchetypeCatalog::builtin().get(kind).unwrap();
        Creature::new(CreatureId::new(), archetype, position, 0.0, 1.0)
    }

    fn far_away_player() -> WorldSnapshot {
        WorldSnapshot::new(PlayerSnapshot::at(Vec3::new(70.0, -250.0, 70.0)))
    }

    #[test]
    fn test_idle_times_out_to_patrol() {
        let mut harness = Harness::new();
        let mut angler = spawn("angler", Vec3::new(0.0, -20.0, 0.0));
        let world = far_away_player();
        for _ in 0..3 {
            harness.step(&mut angler, &world, 1.0);
        }
        assert_eq!(angler.state, CreatureState::Idle);
        harness.step(&mut angler, &world, 1.0);
        assert_eq!(angler.state, CreatureState::Patrol);
    }

    #[test]
    fn test_sighting_alerts_and_is_remembered() {
        let mut harness = Harness::new();
        let mut angler = spawn("angler", Vec3::new(0.0, -20.0, 0.0));
        let world = WorldSnapshot::new(PlayerSnapshot::at(Vec3::new(0.0, -20.0, 10.0)));
        harness.step(&mut angler, &world, 0.1);
        assert_eq!(angler.state, CreatureState::Alert);
        assert_eq!(angler.target_position, Some(world.player.position));
        assert_eq!(harness.session.player_memory().suspicion_level, 20.0);
    }

    #[test]
    fn test_noise_sends_patrol_to_investigate() {
        let mut harness = Harness::new();
        let mut angler = spawn("angler", Vec3::new(0.0, -20.0, 0.0));
        angler.state = CreatureState::Patrol;
        let mut player = PlayerSnapshot::at(Vec3::new(0.0, -20.0, -15.0));
        player.is_sprinting = true;
        harness.step(&mut angler, &WorldSnapshot::new(player), 0.1);
        assert_eq!(angler.state, CreatureState::Investigate);
        assert_eq!(angler.investigation_point, Some(player.position));
    }

    #[test]
    fn test_flare_lure_counts_once() {
        let mut harness = Harness::new();
        let mut angler = spawn("angler", Vec3::new(0.0, -20.0, 0.0));
        let world = far_away_player().with_flare(Vec3::new(20.0, -20.0, -20.0));
        harness.step(&mut angler, &world, 0.1);
        assert_eq!(angler.state, CreatureState::Investigate);
        harness.step(&mut angler, &world, 0.1);
        assert_eq!(harness.session.flare_usage(), 1);
    }

    #[test]
    fn test_investigation_escalates_with_alert() {
        let mut harness = Harness::new();
        let mut angler = spawn("angler", Vec3::new(0.0, -20.0, 0.0));
        angler.state = CreatureState::Investigate;
        angler.investigation_point = Some(Vec3::new(1.0, -20.0, 0.0));
        angler.set_alert(25.0);
        harness.step(&mut angler, &far_away_player(), 0.1);
        assert_eq!(angler.state, CreatureState::Alert);

        let mut calm = spawn("angler", Vec3::new(0.0, -20.0, 0.0));
        calm.state = CreatureState::Investigate;
        calm.investigation_point = Some(Vec3::new(1.0, -20.0, 0.0));
        harness.step(&mut calm, &far_away_player(), 0.1);
        assert_eq!(calm.state, CreatureState::Patrol);
    }

    #[test]
    fn test_alert_calms_after_quiet_period() {
        let mut harness = Harness::new();
        let mut angler = spawn("angler", Vec3::new(0.0, -20.0, 0.0));
        angler.state = CreatureState::Alert;
        let world = far_away_player();
        for _ in 0..10 {
            harness.step(&mut angler, &world, 1.0);
        }
        assert_eq!(angler.state, CreatureState::Alert);
        harness.step(&mut angler, &world, 1.0);
        assert_eq!(angler.state, CreatureState::Patrol);
        assert_eq!(angler.alert_level, 0.0);
    }

    #[test]
    fn test_hunt_entry_maxes_alert() {
        let mut harness = Harness::new();
        let mut angler = spawn("angler", Vec3::new(0.0, -20.0, 0.0));
        angler.state = CreatureState::Alert;
        angler.set_alert(60.0);
        let world = WorldSnapshot::new(PlayerSnapshot::at(Vec3::new(0.0, -20.0, 10.0)));
        harness.step(&mut angler, &world, 0.1);
        assert_eq!(angler.state, CreatureState::Hunt);
        assert_eq!(angler.alert_level, LEVEL_MAX);
    }

    #[test]
    fn test_alert_hunts_at_exact_threshold() {
        let mut harness = Harness::new();
        let mut angler = spawn("angler", Vec3::new(0.0, -20.0, 0.0));
        angler.state = CreatureState::Alert;
        angler.set_alert(40.0);
        let world = WorldSnapshot::new(PlayerSnapshot::at(Vec3::new(0.0, -20.0, 10.0)));
        harness.step(&mut angler, &world, 1.0);
        assert_eq!(angler.state, CreatureState::Hunt);
    }

    #[test]
    fn test_lure_outside_world_is_clamped() {
        let mut harness = Harness::new();
        let mut angler = spawn("angler", Vec3::new(70.0, -20.0, 0.0));
        let world = far_away_player().with_flare(Vec3::new(95.0, 10.0, 0.0));
        harness.step(&mut angler, &world, 0.1);
        assert_eq!(angler.state, CreatureState::Investigate);
        assert_eq!(angler.investigation_point, Some(Vec3::new(80.0, -1.0, 0.0)));
    }

    #[test]
    fn test_attack_strikes_then_waits_for_cooldown() {
        let mut harness = Harness::new();
        let mut angler = spawn("angler", Vec3::new(0.0, -20.0, 0.0));
        angler.state = CreatureState::Attack;
        let world = WorldSnapshot::new(PlayerSnapshot::at(Vec3::new(0.0, -20.0, 2.0)));

        harness.step(&mut angler, &world, 0.1);
        assert_eq!(harness.report.player_damage, 25.0);
        assert_eq!(angler.memory.successful_hits, 1);

        harness.step(&mut angler, &world, 0.1);
        assert_eq!(harness.report.player_damage, 25.0);
        assert_eq!(angler.state, CreatureState::Attack);
    }

    #[test]
    fn test_attack_disengages_when_player_backs_off() {
        let mut harness = Harness::new();
        let mut angler = spawn("angler", Vec3::new(0.0, -20.0, 0.0));
        angler.state = CreatureState::Attack;
        let world = WorldSnapshot::new(PlayerSnapshot::at(Vec3::new(0.0, -20.0, 5.0)));
        harness.step(&mut angler, &world, 0.1);
        assert_eq!(angler.state, CreatureState::Hunt);
        assert_eq!(harness.report.player_damage, 0.0);
    }

    #[test]
    fn test_fearless_never_flee() {
        let mut harness = Harness::new();
        let mut leviathan = spawn("leviathan_juvenile", Vec3::new(0.0, -100.0, 0.0));
        leviathan.state = CreatureState::Attack;
        leviathan.health = 1.0;
        let world = WorldSnapshot::new(PlayerSnapshot::at(Vec3::new(0.0, -100.0, 4.0)));
        harness.step(&mut leviathan, &world, 0.1);
        assert_eq!(leviathan.state, CreatureState::Attack);
    }

    #[test]
    fn test_flee_recovers_when_far_and_healthy() {
        let mut harness = Harness::new();
        let mut horror = spawn("abyssal_horror", Vec3::new(0.0, -100.0, 0.0));
        horror.state = CreatureState::Flee;
        horror.health = 149.0;
        let world = WorldSnapshot::new(PlayerSnapshot::at(Vec3::new(0.0, -100.0, -50.0)));
        harness.step(&mut horror, &world, 1.0);
        // Regeneration pushed it over half health
        assert!(horror.health > 150.0);
        assert_eq!(horror.state, CreatureState::Patrol);
        assert_eq!(horror.fear_level, 0.0);
    }

    #[test]
    fn test_search_exhausts_into_patrol() {
        let mut harness = Harness::new();
        let mut angler = spawn("angler", Vec3::new(0.0, -20.0, 0.0));
        angler.state = CreatureState::Search;
        angler.target_position = Some(Vec3::new(0.0, -20.0, 0.0));
        let world = far_away_player();

        let mut ticks = 0;
        while angler.state == CreatureState::Search && ticks < 10_000 {
            harness.step(&mut angler, &world, 1.0 / 30.0);
            crate::behavior::kinematics::integrate(&mut angler, 1.0 / 30.0, &harness.config);
            ticks += 1;
        }
        assert_eq!(angler.state, CreatureState::Patrol);
        assert_eq!(angler.memory.player_escapes, 1);
        assert_eq!(harness.session.snapshot().hiding_frequency.len(), 1);
    }

    #[test]
    fn test_force_state_applies_hunt_entry() {
        let config = AiConfig::default();
        let mut report = TickReport::new();
        let mut angler = spawn("angler", Vec3::new(0.0, -20.0, 0.0));
        angler.state_timer = 5.0;
        assert!(force_state(&mut angler, CreatureState::Hunt, &config, &mut report));
        assert_eq!(angler.state_timer, 0.0);
        assert_eq!(angler.alert_level, LEVEL_MAX);
        assert_eq!(report.final_state_of(angler.id), Some(CreatureState::Hunt));
    }

    #[test]
    fn test_dead_cannot_be_forced() {
        let config = AiConfig::default();
        let mut report = TickReport::new();
        let mut angler = spawn("angler", Vec3::new(0.0, -20.0, 0.0));
        enter_state(&mut angler, CreatureState::Dead, Some(Trigger::Killed), &config, &mut report);
        assert_eq!(angler.health, 0.0);
        assert_eq!(angler.corpse_timer, Some(config.corpse_duration));
        assert!(!force_state(&mut angler, CreatureState::Idle, &config, &mut report));
        assert_eq!(report.deaths().count(), 1);
    }
}
