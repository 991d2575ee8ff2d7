//! Archetype catalog - the built-in roster plus TOML overrides
//!
//! Every record is validated when it enters the catalog, so creatures are
//! only ever built from checked data.

use crate::abilities::Ability;
use crate::core::error::{AiError, Result};
use crate::creature::archetype::{Archetype, BehaviorTag, Biome, DisguiseKind};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// On-disk layout: a list of `[[archetype]]` tables
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "archetype")]
    archetypes: Vec<Archetype>,
}

/// Lookup table of archetypes, shared by reference with every creature
#[derive(Debug, Clone, Default)]
pub struct ArchetypeCatalog {
    archetypes: Vec<Arc<Archetype>>,
}

impl ArchetypeCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The seven creatures of the abyss
    pub fn builtin() -> Self {
        Self {
            archetypes: builtin_archetypes().into_iter().map(Arc::new).collect(),
        }
    }

    /// Build a catalog from TOML only (no built-ins)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut catalog = Self::empty();
        for archetype in parse_catalog(content)? {
            catalog.insert(archetype)?;
        }
        Ok(catalog)
    }

    /// Load a TOML catalog from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Merge TOML records into this catalog, replacing records with the same id
    pub fn extend_from_toml_str(&mut self, content: &str) -> Result<()> {
        let parsed = parse_catalog(content)?;
        // Validate the whole batch before touching the catalog
        for archetype in &parsed {
            archetype.validate()?;
        }
        for archetype in parsed {
            self.upsert(archetype)?;
        }
        Ok(())
    }

    /// Add a new archetype; fails if the id is already present
    pub fn insert(&mut self, archetype: Archetype) -> Result<()> {
        archetype.validate()?;
        if self.get(&archetype.id).is_some() {
            return Err(AiError::DuplicateArchetype(archetype.id));
        }
        self.archetypes.push(Arc::new(archetype));
        Ok(())
    }

    /// Add or replace an archetype
    pub fn upsert(&mut self, archetype: Archetype) -> Result<()> {
        archetype.validate()?;
        match self.position(&archetype.id) {
            Some(index) => self.archetypes[index] = Arc::new(archetype),
            None => self.archetypes.push(Arc::new(archetype)),
        }
        Ok(())
    }

    /// Case-insensitive lookup
    pub fn get(&self, id: &str) -> Option<Arc<Archetype>> {
        self.position(id).map(|index| Arc::clone(&self.archetypes[index]))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.archetypes.iter().map(|a| a.id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Archetype>> {
        self.archetypes.iter()
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.archetypes.iter().position(|a| a.id.eq_ignore_ascii_case(id))
    }
}

fn parse_catalog(content: &str) -> Result<Vec<Archetype>> {
    let file: CatalogFile = toml::from_str(content)?;
    Ok(file.archetypes)
}

fn loot(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn builtin_archetypes() -> Vec<Archetype> {
    use Ability::*;

    vec![
        Archetype {
            id: "angler".into(),
            name: "Anglerfish".into(),
            behavior: BehaviorTag::Stalker,
            health: 100.0,
            damage: 25.0,
            speed: 8.0,
            detection_range: 30.0,
            attack_range: 3.0,
            vision_half_angle_deg: 60.0,
            hearing_range: 20.0,
            memory_duration: 30.0,
            lure_attraction: 2.0,
            fear_factor: 0.3,
            pack_size: 1,
            abilities: vec![Lure, Ambush],
            loot: loot(&["teeth", "lure_organ"]),
            disguises: vec![],
            biomes: vec![Biome::Twilight, Biome::Midnight, Biome::Abyss],
            is_boss: false,
            light_emission: 1.0,
        },
        Archetype {
            id: "swarmer".into(),
            name: "Swarm Eel".into(),
            behavior: BehaviorTag::Pack,
            health: 30.0,
            damage: 5.0,
            speed: 12.0,
            detection_range: 15.0,
            attack_range: 2.0,
            vision_half_angle_deg: 90.0,
            hearing_range: 25.0,
            memory_duration: 15.0,
            lure_attraction: 0.0,
            fear_factor: 0.8,
            pack_size: 8,
            abilities: vec![Swarm, Distract],
            loot: loot(&["eel_skin"]),
            disguises: vec![],
            biomes: vec![Biome::Twilight, Biome::Midnight],
            is_boss: false,
            light_emission: 0.0,
        },
        Archetype {
            id: "stalker".into(),
            name: "Deep Stalker".into(),
            behavior: BehaviorTag::Stalker,
            health: 150.0,
            damage: 35.0,
            speed: 10.0,
            detection_range: 40.0,
            attack_range: 4.0,
            vision_half_angle_deg: 45.0,
            hearing_range: 30.0,
            memory_duration: 60.0,
            lure_attraction: 1.0,
            fear_factor: 0.1,
            pack_size: 1,
            abilities: vec![Cloaking, WallCrawl, Pounce],
            loot: loot(&["stalker_hide", "claw"]),
            disguises: vec![],
            biomes: vec![Biome::Midnight, Biome::Abyss],
            is_boss: false,
            light_emission: 1.0,
        },
        Archetype {
            id: "mimic".into(),
            name: "Mimic".into(),
            behavior: BehaviorTag::Mimic,
            health: 80.0,
            damage: 40.0,
            speed: 6.0,
            detection_range: 10.0,
            attack_range: 2.0,
            // Sees all around once revealed
            vision_half_angle_deg: 360.0,
            hearing_range: 15.0,
            memory_duration: 20.0,
            lure_attraction: 0.0,
            fear_factor: 0.5,
            pack_size: 1,
            abilities: vec![Disguise, SurpriseAttack],
            loot: loot(&["mimic_essence"]),
            disguises: vec![DisguiseKind::Artifact, DisguiseKind::OxygenTank, DisguiseKind::Crystal],
            biomes: vec![Biome::Midnight, Biome::Abyss],
            is_boss: false,
            light_emission: 0.0,
        },
        Archetype {
            id: "leviathan_juvenile".into(),
            name: "Juvenile Leviathan".into(),
            behavior: BehaviorTag::Territorial,
            health: 500.0,
            damage: 75.0,
            speed: 15.0,
            detection_range: 60.0,
            attack_range: 8.0,
            vision_half_angle_deg: 90.0,
            hearing_range: 50.0,
            memory_duration: 120.0,
            lure_attraction: 0.0,
            fear_factor: 0.0,
            pack_size: 1,
            abilities: vec![Charge, TailSweep, Roar],
            loot: loot(&["leviathan_scale", "ancient_bone"]),
            disguises: vec![],
            biomes: vec![Biome::Abyss],
            is_boss: false,
            light_emission: 0.0,
        },
        Archetype {
            id: "abyssal_horror".into(),
            name: "Abyssal Horror".into(),
            behavior: BehaviorTag::Aggressive,
            health: 300.0,
            damage: 50.0,
            speed: 20.0,
            detection_range: 50.0,
            attack_range: 5.0,
            vision_half_angle_deg: 60.0,
            hearing_range: 40.0,
            memory_duration: 90.0,
            lure_attraction: 0.0,
            fear_factor: 0.0,
            pack_size: 1,
            abilities: vec![Teleport, MindAttack, Regenerate],
            loot: loot(&["horror_heart", "void_tentacle"]),
            disguises: vec![],
            biomes: vec![Biome::Abyss, Biome::Hadal],
            is_boss: false,
            light_emission: 0.0,
        },
        Archetype {
            id: "ancient_one".into(),
            name: "The Ancient One".into(),
            behavior: BehaviorTag::Territorial,
            health: 2000.0,
            damage: 100.0,
            speed: 8.0,
            detection_range: 80.0,
            attack_range: 10.0,
            vision_half_angle_deg: 180.0,
            hearing_range: 100.0,
            memory_duration: 999.0,
            lure_attraction: 0.0,
            fear_factor: 0.0,
            pack_size: 1,
            abilities: vec![RealityWarp, Summon, LaserBeam, Crush],
            loot: loot(&["primordial_eye", "ancient_heart"]),
            disguises: vec![],
            biomes: vec![Biome::Hadal],
            is_boss: true,
            light_emission: 0.0,
        },
    ]
}
