//! Behaviour states and the transition table
//!
//! Every creature is always in exactly one state. States only change
//! through a trigger that names a legal edge; anything else is refused.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Behaviour state - the current mode of a creature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CreatureState {
    /// Resting, scanning slowly in place
    #[default]
    Idle,
    /// Walking the patrol loop
    Patrol,
    /// Heading to a noise or lure
    Investigate,
    /// Holding position, scanning, growing suspicious
    Alert,
    /// Chasing the last known target position
    Hunt,
    /// In striking range
    Attack,
    /// Sweeping around where the target was lost
    Search,
    /// Running from the player
    Flee,
    /// Terminal
    Dead,
}

impl CreatureState {
    pub fn all() -> &'static [CreatureState] {
        &[
            CreatureState::Idle,
            CreatureState::Patrol,
            CreatureState::Investigate,
            CreatureState::Alert,
            CreatureState::Hunt,
            CreatureState::Attack,
            CreatureState::Search,
            CreatureState::Flee,
            CreatureState::Dead,
        ]
    }

    pub fn is_alive(&self) -> bool {
        !matches!(self, CreatureState::Dead)
    }

    /// Engaged with the player (hunting or striking)
    pub fn is_engaged(&self) -> bool {
        matches!(self, CreatureState::Hunt | CreatureState::Attack)
    }

    /// States in which a sighting forces the creature to ALERT
    pub fn reacts_to_sighting(&self) -> bool {
        matches!(
            self,
            CreatureState::Idle
                | CreatureState::Patrol
                | CreatureState::Investigate
                | CreatureState::Search
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CreatureState::Idle => "idle",
            CreatureState::Patrol => "patrol",
            CreatureState::Investigate => "investigate",
            CreatureState::Alert => "alert",
            CreatureState::Hunt => "hunt",
            CreatureState::Attack => "attack",
            CreatureState::Search => "search",
            CreatureState::Flee => "flee",
            CreatureState::Dead => "dead",
        }
    }
}

impl fmt::Display for CreatureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events that trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    // Routine
    IdleTimeout,
    PatrolPointReached,

    // Stimuli
    PlayerSighted,
    NoiseHeard,
    FlareLure,

    // Investigation outcome
    InvestigationCleared,
    InvestigationEscalated,

    // Alert outcome
    HuntStarted,
    AlertCalmed,

    // Chase
    TargetInRange,
    TargetOutOfRange,
    TargetLost,

    // Search outcome
    SearchExhausted,

    // Fear
    FearBreak,
    Recovered,

    // Special modules
    MimicRevealed,
    AmbushSprung,
    PackCall,

    Killed,
}

/// Transition rules (state machine)
pub struct StateTransitions;

/// The one shared transition table
pub const TRANSITIONS: StateTransitions = StateTransitions;

impl StateTransitions {
    pub fn new() -> Self {
        Self
    }

    /// Next state for a trigger, or `None` if the edge does not exist
    pub fn apply(&self, current: CreatureState, trigger: Trigger) -> Option<CreatureState> {
        use CreatureState::*;
        use Trigger::*;

        match (current, trigger) {
            (Dead, _) => None,
            (_, Killed) => Some(Dead),

            (Idle, IdleTimeout) => Some(Patrol),
            (Idle | Patrol | Investigate | Search, PlayerSighted) => Some(Alert),
            (Idle | Patrol, NoiseHeard | FlareLure) => Some(Investigate),

            (Patrol, PatrolPointReached) => Some(Idle),

            (Investigate, InvestigationCleared) => Some(Patrol),
            (Investigate, InvestigationEscalated) => Some(Alert),

            (Alert, HuntStarted) => Some(Hunt),
            (Alert, AlertCalmed) => Some(Patrol),

            (Hunt, TargetInRange) => Some(Attack),
            (Hunt, TargetLost) => Some(Search),

            (Attack, TargetOutOfRange) => Some(Hunt),
            (Attack, FearBreak) => Some(Flee),

            (Search, SearchExhausted) => Some(Patrol),

            (Flee, Recovered) => Some(Patrol),

            // Forced edges from the special modules
            (Idle, MimicRevealed) => Some(Attack),
            (Idle | Patrol, AmbushSprung) => Some(Hunt),
            (Idle | Patrol | Investigate | Alert | Search | Flee, PackCall) => Some(Hunt),

            _ => None,
        }
    }

    /// Whether `from -> to` is an edge of the graph under any trigger
    pub fn is_edge(&self, from: CreatureState, to: CreatureState) -> bool {
        Self::triggers().iter().any(|&trigger| self.apply(from, trigger) == Some(to))
    }

    pub fn triggers() -> &'static [Trigger] {
        use Trigger::*;
        &[
            IdleTimeout,
            PatrolPointReached,
            PlayerSighted,
            NoiseHeard,
            FlareLure,
            InvestigationCleared,
            InvestigationEscalated,
            HuntStarted,
            AlertCalmed,
            TargetInRange,
            TargetOutOfRange,
            TargetLost,
            SearchExhausted,
            FearBreak,
            Recovered,
            MimicRevealed,
            AmbushSprung,
            PackCall,
            Killed,
        ]
    }
}

impl Default for StateTransitions {
    fn default() -> Self {
        Self::new()
    }
}
