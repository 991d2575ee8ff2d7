//! What happened during a tick, and the hook into the presentation layer

use crate::abilities::Ability;
use crate::core::types::{CreatureId, PackId};
use crate::creature::{CreatureState, DisguiseKind, Trigger};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Events recorded by the registry for the caller to inspect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CreatureEvent {
    Spawned {
        creature: CreatureId,
        archetype: String,
        pack: Option<PackId>,
    },
    /// `trigger` is `None` only for scripted state changes
    StateChanged {
        creature: CreatureId,
        from: CreatureState,
        to: CreatureState,
        trigger: Option<Trigger>,
    },
    /// A melee strike or damaging ability that connected
    PlayerHit {
        creature: CreatureId,
        damage: f32,
    },
    AbilityUsed {
        creature: CreatureId,
        ability: Ability,
    },
    Revealed {
        creature: CreatureId,
        disguise: Option<DisguiseKind>,
    },
    Died {
        creature: CreatureId,
        loot: Vec<String>,
    },
    /// Corpse timer ran out; the creature is gone
    Purged {
        creature: CreatureId,
    },
}

/// Synchronous cues for camera, audio and UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PresentationSignal {
    /// Mimic dropped its disguise next to the player
    JumpScare { creature: CreatureId, position: Vec3 },
    CameraShake { intensity: f32 },
    /// Roar: shake plus blur
    StunBlur { creature: CreatureId, shake: f32, blur: f32 },
    /// Any other ability with a visible or audible effect
    AbilityCue { creature: CreatureId, ability: Ability },
}

/// Receiver for presentation cues, called inline during `update`
pub trait PresentationSink {
    fn signal(&mut self, signal: PresentationSignal);
}

/// Drops every signal
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl PresentationSink for NullSink {
    fn signal(&mut self, _signal: PresentationSignal) {}
}

impl PresentationSink for Vec<PresentationSignal> {
    fn signal(&mut self, signal: PresentationSignal) {
        self.push(signal);
    }
}

/// Lets the caller keep a handle to a sink it gave away
impl<S: PresentationSink> PresentationSink for Rc<RefCell<S>> {
    fn signal(&mut self, signal: PresentationSignal) {
        self.borrow_mut().signal(signal);
    }
}

/// Result of one `update` call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub events: Vec<CreatureEvent>,
    /// Total damage dealt to the player this tick
    pub player_damage: f32,
}

impl TickReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: CreatureEvent) {
        self.events.push(event);
    }

    /// Every (creature, from, to, trigger) recorded this tick
    pub fn transitions(
        &self,
    ) -> impl Iterator<Item = (CreatureId, CreatureState, CreatureState, Option<Trigger>)> + '_ {
        self.events.iter().filter_map(|event| match *event {
            CreatureEvent::StateChanged {
                creature,
                from,
                to,
                trigger,
            } => Some((creature, from, to, trigger)),
            _ => None,
        })
    }

    /// State the creature ended up in, if it changed this tick
    pub fn final_state_of(&self, id: CreatureId) -> Option<CreatureState> {
        self.transitions()
            .filter(|&(creature, ..)| creature == id)
            .last()
            .map(|(_, _, to, _)| to)
    }

    pub fn deaths(&self) -> impl Iterator<Item = CreatureId> + '_ {
        self.events.iter().filter_map(|event| match event {
            CreatureEvent::Died { creature, .. } => Some(*creature),
            _ => None,
        })
    }
}

/// A spawn queued during the creature pass, applied after it
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    pub archetype: String,
    pub position: Vec3,
    /// Creature whose ability asked for the spawn
    pub summoner: CreatureId,
}
