//! Creature archetypes - immutable templates shared by every creature of a kind

use crate::abilities::Ability;
use crate::core::constants::{
    PATROL_POINTS_DEFAULT, PATROL_POINTS_TERRITORIAL, PATROL_RADIUS_DEFAULT,
    PATROL_RADIUS_TERRITORIAL,
};
use crate::core::error::{AiError, Result};
use serde::{Deserialize, Serialize};

/// Behaviour tag - the broad temperament of an archetype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorTag {
    /// Runs away
    Passive,
    /// Attacks if threatened
    Defensive,
    /// Hunts the player
    Aggressive,
    /// Guards an area
    Territorial,
    /// Hunts in groups
    Pack,
    /// Follows from the shadows
    Stalker,
    /// Disguises itself as an object
    Mimic,
}

/// Object a mimic can pass itself off as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisguiseKind {
    Artifact,
    OxygenTank,
    Crystal,
}

/// Depth band an archetype inhabits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Biome {
    Twilight,
    Midnight,
    Abyss,
    Hadal,
}

fn default_pack_size() -> u32 {
    1
}

/// Stats, senses and abilities for one kind of creature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Archetype {
    /// Lookup key (case-insensitive)
    pub id: String,
    pub name: String,
    pub behavior: BehaviorTag,
    pub health: f32,
    pub damage: f32,
    pub speed: f32,
    pub detection_range: f32,
    pub attack_range: f32,
    /// Half-angle of the vision cone, in degrees
    pub vision_half_angle_deg: f32,
    pub hearing_range: f32,
    /// Seconds a lost target is still remembered
    pub memory_duration: f32,
    /// Flare attraction range as a multiple of detection range (0 = never lured)
    #[serde(default)]
    pub lure_attraction: f32,
    /// Health fraction below which the creature flees (0 = never flees)
    #[serde(default)]
    pub fear_factor: f32,
    #[serde(default = "default_pack_size")]
    pub pack_size: u32,
    #[serde(default)]
    pub abilities: Vec<Ability>,
    #[serde(default)]
    pub loot: Vec<String>,
    #[serde(default)]
    pub disguises: Vec<DisguiseKind>,
    #[serde(default)]
    pub biomes: Vec<Biome>,
    #[serde(default)]
    pub is_boss: bool,
    /// Light given off while not cloaked (anglers glow)
    #[serde(default)]
    pub light_emission: f32,
}

impl Archetype {
    /// Vision half-angle in radians
    pub fn vision_half_angle(&self) -> f32 {
        self.vision_half_angle_deg.to_radians()
    }

    pub fn has_ability(&self, ability: Ability) -> bool {
        self.abilities.contains(&ability)
    }

    pub fn is_pack(&self) -> bool {
        self.pack_size > 1
    }

    pub fn is_mimic(&self) -> bool {
        self.behavior == BehaviorTag::Mimic
    }

    pub fn can_flee(&self) -> bool {
        self.fear_factor > 0.0
    }

    pub fn patrol_point_count(&self) -> usize {
        if self.behavior == BehaviorTag::Territorial {
            PATROL_POINTS_TERRITORIAL
        } else {
            PATROL_POINTS_DEFAULT
        }
    }

    pub fn patrol_radius(&self) -> f32 {
        if self.behavior == BehaviorTag::Territorial {
            PATROL_RADIUS_TERRITORIAL
        } else {
            PATROL_RADIUS_DEFAULT
        }
    }

    /// Check the record is usable before any creature is built from it
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| AiError::InvalidArchetype {
            id: self.id.clone(),
            reason,
        };

        if self.id.trim().is_empty() {
            return Err(invalid("id must not be empty".into()));
        }

        let stats = [
            ("health", self.health),
            ("damage", self.damage),
            ("speed", self.speed),
            ("detection_range", self.detection_range),
            ("attack_range", self.attack_range),
            ("vision_half_angle_deg", self.vision_half_angle_deg),
            ("hearing_range", self.hearing_range),
            ("memory_duration", self.memory_duration),
            ("lure_attraction", self.lure_attraction),
        ];
        for (name, value) in stats {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!("{} must be a non-negative number, got {}", name, value)));
            }
        }

        if self.health <= 0.0 {
            return Err(invalid("health must be positive".into()));
        }

        if self.attack_range >= self.detection_range {
            return Err(invalid(format!(
                "attack_range ({}) should be < detection_range ({})",
                self.attack_range, self.detection_range
            )));
        }

        if !(0.0..=1.0).contains(&self.fear_factor) {
            return Err(invalid(format!("fear_factor ({}) must be in [0, 1]", self.fear_factor)));
        }

        if self.pack_size == 0 {
            return Err(invalid("pack_size must be at least 1".into()));
        }

        if self.is_mimic() && self.disguises.is_empty() {
            return Err(invalid("mimic archetypes need at least one disguise".into()));
        }

        Ok(())
    }
}
