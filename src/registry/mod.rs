//! Creature registry - owns every creature and drives the per-frame update
//!
//! The rest of the game talks to the AI core only through this type:
//! spawning, the per-frame `update`, queries, and scripting commands.
//! `update` never fails; a creature with missing references simply skips
//! the parts of its step that need them.

pub mod events;

pub use events::{
    CreatureEvent, NullSink, PresentationSignal, PresentationSink, SpawnRequest, TickReport,
};

use crate::behavior::{self, enter_state, force_state, kinematics::clamp_to_world, waypoints};
use crate::core::config::AiConfig;
use crate::core::constants::{PACK_SPAWN_SPREAD_HORIZONTAL, PACK_SPAWN_SPREAD_VERTICAL};
use crate::core::error::{AiError, Result};
use crate::core::types::{CreatureId, PackId};
use crate::creature::{ArchetypeCatalog, Creature, CreatureState, Trigger, TRANSITIONS};
use crate::learning::{LearnedBehaviors, SessionContext};
use crate::pack;
use crate::perception::WorldSnapshot;
use crate::special::{cloak, mimic};
use ahash::AHashMap;
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use std::sync::Arc;

/// Optional spawn parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnOptions {
    /// Scales base health; non-positive or non-finite values fall back to 1.0
    pub health_multiplier: f32,
    /// Join an existing pack instead of founding a new one
    pub pack_id: Option<PackId>,
    /// Initial heading of the first creature; random when unset
    pub yaw: Option<f32>,
}

impl Default for SpawnOptions {
    fn default() -> Self {
        Self {
            health_multiplier: 1.0,
            pack_id: None,
            yaw: None,
        }
    }
}

impl SpawnOptions {
    pub fn facing(yaw: f32) -> Self {
        Self {
            yaw: Some(yaw),
            ..Self::default()
        }
    }
}

/// Result of `apply_damage`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageOutcome {
    pub health: f32,
    pub state: CreatureState,
    /// Loot table, when the hit was fatal
    pub loot: Option<Vec<String>>,
}

/// All live and recently dead creatures of a session
pub struct CreatureRegistry {
    config: AiConfig,
    catalog: ArchetypeCatalog,
    creatures: Vec<Creature>,
    index: AHashMap<CreatureId, usize>,
    session: SessionContext,
    rng: ChaCha8Rng,
    sink: Box<dyn PresentationSink>,
    /// Events raised by commands between ticks; reported by the next `update`
    pending: TickReport,
    tick: u64,
}

impl CreatureRegistry {
    /// Built-in roster and default tuning
    pub fn new() -> Self {
        Self::build(AiConfig::default(), ArchetypeCatalog::builtin())
    }

    pub fn with_config(config: AiConfig) -> Result<Self> {
        Self::with_catalog(config, ArchetypeCatalog::builtin())
    }

    pub fn with_catalog(config: AiConfig, catalog: ArchetypeCatalog) -> Result<Self> {
        config.validate()?;
        for archetype in catalog.iter() {
            archetype.validate()?;
        }
        Ok(Self::build(config, catalog))
    }

    fn build(config: AiConfig, catalog: ArchetypeCatalog) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            config,
            catalog,
            creatures: Vec::new(),
            index: AHashMap::new(),
            session: SessionContext::new(),
            rng,
            sink: Box::new(NullSink),
            pending: TickReport::new(),
            tick: 0,
        }
    }

    pub fn set_presentation_sink(&mut self, sink: Box<dyn PresentationSink>) {
        self.sink = sink;
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    pub fn catalog(&self) -> &ArchetypeCatalog {
        &self.catalog
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Number of `update` calls so far
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    // ===== Spawning =====

    /// Spawn a creature (and its whole pack, for pack archetypes)
    ///
    /// Returns the first creature's id, or `None` with a warning when the
    /// archetype is unknown.
    pub fn spawn(&mut self, type_id: &str, position: Vec3, options: SpawnOptions) -> Option<CreatureId> {
        match self.try_spawn(type_id, position, options) {
            Ok(ids) => ids.first().copied(),
            Err(e) => {
                tracing::warn!(type_id, error = %e, "spawn failed");
                None
            }
        }
    }

    /// Spawn a group atomically, returning every member's id
    ///
    /// A pack archetype spawned without a pack id founds a new pack of
    /// `pack_size` creatures scattered around `position`. With a pack id
    /// the single creature joins that pack.
    pub fn try_spawn(
        &mut self,
        type_id: &str,
        position: Vec3,
        options: SpawnOptions,
    ) -> Result<Vec<CreatureId>> {
        let archetype = self
            .catalog
            .get(type_id)
            .ok_or_else(|| AiError::UnknownArchetype(type_id.to_string()))?;

        let health_multiplier =
            if options.health_multiplier.is_finite() && options.health_multiplier > 0.0 {
                options.health_multiplier
            } else {
                tracing::debug!(
                    type_id,
                    health_multiplier = options.health_multiplier,
                    "bad health multiplier, using 1.0"
                );
                1.0
            };

        let (pack_id, group_size) = match options.pack_id {
            Some(pack_id) => (Some(pack_id), 1),
            None if archetype.is_pack() => (
                Some(PackId::from_rng(&mut self.rng)),
                archetype.pack_size as usize,
            ),
            None => (None, 1),
        };

        let origin = clamp_to_world(position, &self.config);
        let mut ids = Vec::with_capacity(group_size);
        for member in 0..group_size {
            let position = if member == 0 {
                origin
            } else {
                let offset = Vec3::new(
                    (self.rng.gen::<f32>() - 0.5) * PACK_SPAWN_SPREAD_HORIZONTAL,
                    (self.rng.gen::<f32>() - 0.5) * PACK_SPAWN_SPREAD_VERTICAL,
                    (self.rng.gen::<f32>() - 0.5) * PACK_SPAWN_SPREAD_HORIZONTAL,
                );
                clamp_to_world(origin + offset, &self.config)
            };
            let yaw = match options.yaw {
                Some(yaw) if member == 0 => yaw,
                _ => self.rng.gen::<f32>() * TAU,
            };

            let id = CreatureId::from_rng(&mut self.rng);
            let mut creature =
                Creature::new(id, Arc::clone(&archetype), position, yaw, health_multiplier);
            creature.pack_id = pack_id;
            creature.patrol_points =
                waypoints::patrol_points(position, &archetype, &mut self.rng, &self.config);
            if archetype.is_mimic() {
                mimic::disguise(&mut creature, &mut self.rng);
            }
            cloak::refresh(&mut creature);

            self.index.insert(id, self.creatures.len());
            self.creatures.push(creature);
            self.pending.push(CreatureEvent::Spawned {
                creature: id,
                archetype: archetype.id.clone(),
                pack: pack_id,
            });
            ids.push(id);
        }

        if let Some(pack_id) = pack_id {
            self.link_pack(pack_id);
        }

        tracing::info!(
            archetype = %archetype.id,
            count = ids.len(),
            pack = ?pack_id,
            "spawned"
        );
        Ok(ids)
    }

    /// Make every member of a pack list all of its siblings
    fn link_pack(&mut self, pack_id: PackId) {
        let members: Vec<CreatureId> = self
            .creatures
            .iter()
            .filter(|c| c.pack_id == Some(pack_id))
            .map(|c| c.id)
            .collect();

        for creature in self.creatures.iter_mut().filter(|c| c.pack_id == Some(pack_id)) {
            let own = creature.id;
            creature.pack_members = members.iter().copied().filter(|&id| id != own).collect();
        }
    }

    // ===== Update =====

    /// Advance every creature by `dt` seconds against one world snapshot
    ///
    /// Creatures step strictly in list order. Spawns requested during the
    /// pass are applied after it, then expired corpses are purged.
    pub fn update(&mut self, dt: f32, world: &WorldSnapshot) -> TickReport {
        let mut report = TickReport {
            events: std::mem::take(&mut self.pending.events),
            player_damage: 0.0,
        };
        if !dt.is_finite() || dt <= 0.0 {
            return report;
        }

        self.tick += 1;
        self.session.advance(dt, &self.config);

        let mut spawns = Vec::new();
        {
            let mut ctx = behavior::StepContext {
                config: &self.config,
                world,
                session: &mut self.session,
                rng: &mut self.rng,
                report: &mut report,
                sink: self.sink.as_mut(),
                spawns: &mut spawns,
                dt,
            };

            for index in 0..self.creatures.len() {
                let creature = &mut self.creatures[index];
                if !creature.is_alive() {
                    if let Some(timer) = creature.corpse_timer.as_mut() {
                        *timer -= dt;
                    }
                    continue;
                }

                let Some(thought) = behavior::think(creature, &mut ctx) else {
                    continue;
                };
                pack::coordinate(&mut self.creatures, index, thought.state_at_start, &mut ctx);
                behavior::act(&mut self.creatures[index], &thought.perception, &mut ctx);
            }
        }

        for request in spawns {
            self.apply_summon(request);
        }
        report.events.append(&mut self.pending.events);

        self.purge_expired(&mut report);
        tracing::trace!(tick = self.tick, events = report.events.len(), "tick complete");
        report
    }

    /// Spawn a summoned group unless its summoner already has enough in play
    fn apply_summon(&mut self, request: SpawnRequest) {
        let group = self
            .catalog
            .get(&request.archetype)
            .map_or(1, |archetype| archetype.pack_size as usize);
        let alive = self
            .creatures
            .iter()
            .filter(|c| c.is_alive() && c.summoned_by == Some(request.summoner))
            .count();
        if alive + group > self.config.max_summons_alive {
            tracing::debug!(summoner = %request.summoner, alive, "summon cap reached");
            return;
        }

        match self.try_spawn(&request.archetype, request.position, SpawnOptions::default()) {
            Ok(ids) => {
                for id in ids {
                    if let Some(creature) = self.creature_mut(id) {
                        creature.summoned_by = Some(request.summoner);
                    }
                }
            }
            Err(e) => {
                tracing::warn!(archetype = %request.archetype, error = %e, "queued spawn failed");
            }
        }
    }

    fn purge_expired(&mut self, report: &mut TickReport) {
        let expired = |c: &Creature| !c.is_alive() && c.corpse_timer.map_or(true, |t| t <= 0.0);
        if !self.creatures.iter().any(expired) {
            return;
        }

        for creature in self.creatures.iter().filter(|c| expired(c)) {
            report.push(CreatureEvent::Purged {
                creature: creature.id,
            });
        }
        self.creatures.retain(|c| !expired(c));
        self.rebuild_index();
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .creatures
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id, i))
            .collect();
    }

    // ===== Queries =====

    /// Every creature, corpses included, in spawn order
    pub fn creatures(&self) -> &[Creature] {
        &self.creatures
    }

    pub fn get_creature_by_id(&self, id: CreatureId) -> Option<&Creature> {
        self.index.get(&id).map(|&i| &self.creatures[i])
    }

    /// Direct access for scripted placement
    pub fn creature_mut(&mut self, id: CreatureId) -> Option<&mut Creature> {
        self.index.get(&id).map(|&i| &mut self.creatures[i])
    }

    /// Living creatures strictly within `radius` of `position`
    pub fn creatures_in_range(&self, position: Vec3, radius: f32) -> Vec<&Creature> {
        self.creatures
            .iter()
            .filter(|c| c.is_alive() && c.distance_to(position) < radius)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.creatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creatures.is_empty()
    }

    pub fn living_count(&self) -> usize {
        self.creatures.iter().filter(|c| c.is_alive()).count()
    }

    /// Read-only snapshot of what the session has learned
    pub fn learned_behaviors(&self) -> LearnedBehaviors {
        self.session.snapshot()
    }

    // ===== Commands =====

    /// Kill a creature outright and hand back its loot
    ///
    /// Returns `None` for unknown or already dead creatures.
    pub fn kill(&mut self, id: CreatureId) -> Option<Vec<String>> {
        let &i = self.index.get(&id)?;
        let creature = &mut self.creatures[i];
        if !creature.is_alive() {
            return None;
        }

        enter_state(creature, CreatureState::Dead, Some(Trigger::Killed), &self.config, &mut self.pending);
        Some(creature.archetype.loot.clone())
    }

    /// Hurt a creature; lethal hits kill it at once, and a creature in
    /// ATTACK that drops below its fear threshold breaks off immediately
    pub fn apply_damage(&mut self, id: CreatureId, amount: f32) -> Option<DamageOutcome> {
        let &i = self.index.get(&id)?;
        let creature = &mut self.creatures[i];
        if !creature.is_alive() {
            return None;
        }

        let lethal = creature.take_damage(amount);
        let trigger = if lethal {
            Some(Trigger::Killed)
        } else if creature.state == CreatureState::Attack && creature.should_flee() {
            Some(Trigger::FearBreak)
        } else {
            None
        };
        if let Some(trigger) = trigger {
            if let Some(next) = TRANSITIONS.apply(creature.state, trigger) {
                enter_state(creature, next, Some(trigger), &self.config, &mut self.pending);
            }
        }

        Some(DamageOutcome {
            health: creature.health,
            state: creature.state,
            loot: lethal.then(|| creature.archetype.loot.clone()),
        })
    }

    /// Scripted state change that bypasses the transition rules
    ///
    /// Returns `Ok(false)` if the creature is already dead.
    pub fn force_state_change(&mut self, id: CreatureId, state: CreatureState) -> Result<bool> {
        let &i = self.index.get(&id).ok_or(AiError::CreatureNotFound(id))?;
        let changed = force_state(&mut self.creatures[i], state, &self.config, &mut self.pending);
        Ok(changed)
    }

    /// Drop every creature (level transition); the session's learning survives
    pub fn clear_all(&mut self) {
        tracing::debug!(count = self.creatures.len(), "clearing registry");
        self.creatures.clear();
        self.index.clear();
        self.pending.events.clear();
    }
}

impl Default for CreatureRegistry {
    fn default() -> Self {
        Self::new()
    }
}
