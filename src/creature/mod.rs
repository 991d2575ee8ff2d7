pub mod archetype;
pub mod catalog;
#[allow(clippy::module_inception)]
pub mod creature;
pub mod state;

pub use archetype::{Archetype, BehaviorTag, Biome, DisguiseKind};
pub use catalog::ArchetypeCatalog;
pub use creature::{Creature, PersonalMemory};
pub use state::{CreatureState, StateTransitions, Trigger, TRANSITIONS};
