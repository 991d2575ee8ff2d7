//! Abyss AI - creature simulation core for a deep-sea survival horror game
//!
//! Spawns creatures from an archetype catalog, lets them perceive the
//! player, drives each through a behavioural state machine, coordinates
//! packs, and learns from how the player plays over a session.

pub mod abilities;
pub mod behavior;
pub mod core;
pub mod creature;
pub mod learning;
pub mod pack;
pub mod perception;
pub mod registry;
pub mod special;

pub use crate::core::{AiConfig, AiError, CreatureId, PackId, Result};
pub use crate::creature::{Archetype, ArchetypeCatalog, Creature, CreatureState};
pub use crate::perception::{Flare, PlayerSnapshot, WorldSnapshot};
pub use crate::registry::{CreatureRegistry, SpawnOptions, TickReport};
