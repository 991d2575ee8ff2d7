//! Session context - what the creatures collectively learn about the player
//!
//! One instance lives for the whole session, owned by the registry and
//! handed by reference to perception and the state machine. It tracks:
//! - Where and when the player was last seen, and a decaying suspicion level
//! - How often the player leans on flares (overuse weakens every lure)
//! - Where the player tends to hide (10-unit grid histogram)
//! - Whether the player fights back once ambushed

use crate::core::config::AiConfig;
use crate::core::constants::{
    FLARE_OVERUSE_THRESHOLD, HIDING_CELL_SIZE, LEVEL_MAX, LURE_DECAY_FACTOR,
    SUSPICION_DECAY_PER_SECOND, SUSPICION_PER_DETECTION,
};
use crate::core::types::GridCell;
use crate::creature::archetype::Archetype;
use ahash::AHashMap;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// How the player reacts once creatures close in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbushResponse {
    #[default]
    Unknown,
    FightsBack,
}

/// Shared memory of the player's whereabouts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerMemory {
    pub last_known_position: Option<Vec3>,
    pub last_seen_time: Option<f32>,
    pub suspicion_level: f32,
}

/// One bucket of the hiding-spot histogram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HidingSpotCount {
    pub cell: GridCell,
    pub visits: u32,
}

/// Read-only view of everything learned this session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnedBehaviors {
    pub flare_usage: u32,
    /// Sorted by cell
    pub hiding_frequency: Vec<HidingSpotCount>,
    pub ambush_response: AmbushResponse,
    /// Factor applied to every archetype's lure attraction
    pub lure_multiplier: f32,
    pub player_memory: PlayerMemory,
}

/// Session-scoped learner state
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Simulated seconds since the session began
    clock: f32,
    player_memory: PlayerMemory,
    flare_usage: u32,
    lure_multiplier: f32,
    hiding_frequency: AHashMap<GridCell, u32>,
    ambush_response: AmbushResponse,
}

impl SessionContext {
    pub fn new() -> Self {
        Self {
            clock: 0.0,
            player_memory: PlayerMemory::default(),
            flare_usage: 0,
            lure_multiplier: 1.0,
            hiding_frequency: AHashMap::new(),
            ambush_response: AmbushResponse::Unknown,
        }
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn player_memory(&self) -> &PlayerMemory {
        &self.player_memory
    }

    /// Advance the session clock and let stale suspicion fade
    pub fn advance(&mut self, dt: f32, config: &AiConfig) {
        self.clock += dt;

        let stale = match self.player_memory.last_seen_time {
            Some(seen) => self.clock - seen > config.suspicion_memory,
            None => true,
        };
        if stale {
            self.player_memory.suspicion_level =
                (self.player_memory.suspicion_level - SUSPICION_DECAY_PER_SECOND * dt).max(0.0);
        }
    }

    /// A creature spotted the player at `position`
    pub fn record_detection(&mut self, position: Vec3) {
        self.player_memory.last_known_position = Some(position);
        self.player_memory.last_seen_time = Some(self.clock);
        self.player_memory.suspicion_level =
            (self.player_memory.suspicion_level + SUSPICION_PER_DETECTION).min(LEVEL_MAX);
    }

    /// A creature was drawn in by a flare
    ///
    /// Past the overuse threshold every further lure weakens all lures by
    /// another 10%. Returns true when this call applied a decay.
    pub fn record_flare_lure(&mut self) -> bool {
        self.flare_usage += 1;
        if self.flare_usage > FLARE_OVERUSE_THRESHOLD {
            self.lure_multiplier *= LURE_DECAY_FACTOR;
            tracing::info!(
                flare_usage = self.flare_usage,
                lure_multiplier = self.lure_multiplier,
                "player leans on flares; lure attraction decayed"
            );
            return true;
        }
        false
    }

    /// A search gave up: the player escaped somewhere near `position`
    pub fn record_hiding_spot(&mut self, position: Vec3) -> GridCell {
        let cell = GridCell::from_position(position, HIDING_CELL_SIZE);
        *self.hiding_frequency.entry(cell).or_insert(0) += 1;
        cell
    }

    /// A creature landed a hit; the player is now known to fight back
    pub fn record_player_damaged(&mut self) {
        if self.ambush_response != AmbushResponse::FightsBack {
            tracing::info!("player engages when ambushed");
        }
        self.ambush_response = AmbushResponse::FightsBack;
    }

    pub fn flare_usage(&self) -> u32 {
        self.flare_usage
    }

    pub fn lure_multiplier(&self) -> f32 {
        self.lure_multiplier
    }

    /// Lure attraction for an archetype after session learning
    pub fn effective_lure_attraction(&self, archetype: &Archetype) -> f32 {
        archetype.lure_attraction * self.lure_multiplier
    }

    pub fn hiding_count(&self, cell: GridCell) -> u32 {
        self.hiding_frequency.get(&cell).copied().unwrap_or(0)
    }

    pub fn ambush_response(&self) -> AmbushResponse {
        self.ambush_response
    }

    pub fn snapshot(&self) -> LearnedBehaviors {
        let mut hiding_frequency: Vec<HidingSpotCount> = self
            .hiding_frequency
            .iter()
            .map(|(&cell, &visits)| HidingSpotCount { cell, visits })
            .collect();
        hiding_frequency.sort_by_key(|h| h.cell);

        LearnedBehaviors {
            flare_usage: self.flare_usage,
            hiding_frequency,
            ambush_response: self.ambush_response,
            lure_multiplier: self.lure_multiplier,
            player_memory: self.player_memory.clone(),
        }
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::catalog::ArchetypeCatalog;

    #[test]
    fn test_lure_holds_until_threshold() {
        let mut session = SessionContext::new();
        for _ in 0..FLARE_OVERUSE_THRESHOLD {
            assert!(!session.record_flare_lure());
        }
        assert_eq!(session.lure_multiplier(), 1.0);
        assert!(session.record_flare_lure());
        assert!((session.lure_multiplier() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_lure_decay_compounds() {
        let mut session = SessionContext::new();
        for _ in 0..8 {
            session.record_flare_lure();
        }
        assert!((session.lure_multiplier() - 0.9f32.powi(3)).abs() < 1e-6);

        let angler = ArchetypeCatalog::builtin().get("angler").unwrap();
        assert!(session.effective_lure_attraction(&angler) < angler.lure_attraction);
    }

    #[test]
    fn test_hiding_histogram() {
        let mut session = SessionContext::new();
        let cell = session.record_hiding_spot(Vec3::new(12.0, -40.0, -31.0));
        session.record_hiding_spot(Vec3::new(8.0, -10.0, -29.0));
        assert_eq!(cell, GridCell::new(1, -3));
        assert_eq!(session.hiding_count(cell), 2);
        assert_eq!(session.snapshot().hiding_frequency.len(), 1);
    }

    #[test]
    fn test_ambush_response_latches() {
        let mut session = SessionContext::new();
        assert_eq!(session.ambush_response(), AmbushResponse::Unknown);
        session.record_player_damaged();
        session.record_player_damaged();
        assert_eq!(session.ambush_response(), AmbushResponse::FightsBack);
    }

    #[test]
    fn test_suspicion_fades_only_after_memory_window() {
        let config = AiConfig::default();
        let mut session = SessionContext::new();
        session.record_detection(Vec3::new(0.0, -10.0, 0.0));
        session.record_detection(Vec3::new(0.0, -10.0, 0.0));
        assert_eq!(session.player_memory().suspicion_level, 40.0);

        for _ in 0..60 {
            session.advance(1.0, &config);
        }
        assert_eq!(session.player_memory().suspicion_level, 40.0);

        for _ in 0..10 {
            session.advance(1.0, &config);
        }
        assert!(session.player_memory().suspicion_level < 40.0);
    }

    #[test]
    fn test_suspicion_capped() {
        let mut session = SessionContext::new();
        for _ in 0..10 {
            session.record_detection(Vec3::ZERO);
        }
        assert_eq!(session.player_memory().suspicion_level, LEVEL_MAX);
    }
}
