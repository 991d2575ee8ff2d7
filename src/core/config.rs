//! AI configuration with documented tunables
//!
//! Values that shape pacing (decay rates, world bounds, perception
//! thresholds) are collected here. Fixed behavioural contracts such as
//! state timeouts live in [`crate::core::constants`].

use crate::core::error::{AiError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for the creature AI systems
///
/// Can be loaded from TOML; any field left out falls back to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    // === LEVELS ===
    /// Alert lost per second absent a stimulus
    ///
    /// At 5/s a fully alert creature calms down in 20 seconds.
    pub alert_decay_per_second: f32,

    /// Fear lost per second
    ///
    /// Slower than alert decay so wounded creatures stay skittish.
    pub fear_decay_per_second: f32,

    // === LIFECYCLE ===
    /// Seconds a corpse stays in the registry before it is purged
    pub corpse_duration: f32,

    // === WORLD VOLUME ===
    /// Creatures are clamped to [-half_extent, half_extent] on x and z
    pub world_half_extent: f32,

    /// Deepest allowed y (the sea floor)
    pub depth_min: f32,

    /// Shallowest allowed y (just below the surface)
    pub depth_max: f32,

    // === KINEMATICS ===
    /// Velocity retained per reference frame (1/60 s)
    ///
    /// Scaled by the actual frame time so drag is frame-rate independent.
    pub drag: f32,

    /// Vertical movement speed as a fraction of horizontal speed
    pub vertical_speed_factor: f32,

    // === PERCEPTION ===
    /// Player noise must exceed this to be heard
    ///
    /// Noise is movement_speed / 10, plus the sprint bonus while sprinting.
    pub noise_threshold: f32,

    /// Extra noise while the player sprints
    pub sprint_noise_bonus: f32,

    /// Player light level must exceed this to be seen
    pub min_light_level: f32,

    // === SESSION MEMORY ===
    /// Seconds without a sighting before global suspicion starts to fade
    pub suspicion_memory: f32,

    // === ABILITIES ===
    /// Chance per tick that an eligible ambusher springs its ambush
    pub ambush_chance_per_tick: f32,

    /// Most living creatures one summoner may have in play
    ///
    /// A summon that would go past this is dropped. 16 is two eel packs.
    pub max_summons_alive: usize,

    // === DETERMINISM ===
    /// Seed for the registry's random number generator
    pub seed: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            alert_decay_per_second: 5.0,
            fear_decay_per_second: 3.0,

            corpse_duration: 60.0,

            world_half_extent: 80.0,
            depth_min: -300.0,
            depth_max: -1.0,

            drag: 0.95,
            vertical_speed_factor: 0.3,

            noise_threshold: 0.3,
            sprint_noise_bonus: 0.5,
            min_light_level: 0.1,

            suspicion_memory: 60.0,

            ambush_chance_per_tick: 0.01,
            max_summons_alive: 16,

            seed: 0x0A_B1_55,
        }
    }
}

impl AiConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AiConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.alert_decay_per_second < 0.0 || self.fear_decay_per_second < 0.0 {
            return Err(AiError::InvalidConfig("decay rates must not be negative".into()));
        }

        if self.corpse_duration < 0.0 {
            return Err(AiError::InvalidConfig(format!(
                "corpse_duration ({}) must not be negative",
                self.corpse_duration
            )));
        }

        if self.world_half_extent <= 0.0 {
            return Err(AiError::InvalidConfig(format!(
                "world_half_extent ({}) must be positive",
                self.world_half_extent
            )));
        }

        if self.depth_min >= self.depth_max {
            return Err(AiError::InvalidConfig(format!(
                "depth_min ({}) should be < depth_max ({})",
                self.depth_min, self.depth_max
            )));
        }

        if !(0.0..=1.0).contains(&self.drag) {
            return Err(AiError::InvalidConfig(format!("drag ({}) must be in [0, 1]", self.drag)));
        }

        if !(0.0..=1.0).contains(&self.ambush_chance_per_tick) {
            return Err(AiError::InvalidConfig(format!(
                "ambush_chance_per_tick ({}) must be in [0, 1]",
                self.ambush_chance_per_tick
            )));
        }

        Ok(())
    }
}
