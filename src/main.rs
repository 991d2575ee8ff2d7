//! Headless scenario runner
//!
//! Spawns a set of creatures, walks a scripted player around them for a
//! number of frames and prints a summary of what the AI did.

use abyss_ai::abilities::Ability;
use abyss_ai::learning::LearnedBehaviors;
use abyss_ai::registry::CreatureEvent;
use abyss_ai::{
    AiConfig, ArchetypeCatalog, CreatureRegistry, PlayerSnapshot, Result, SpawnOptions,
    WorldSnapshot,
};
use clap::Parser;
use glam::Vec3;
use serde::Serialize;
use std::collections::BTreeMap;
use std::f32::consts::TAU;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Abyss creature AI - headless scenario runner
#[derive(Parser, Debug)]
#[command(name = "abyss-sim")]
#[command(about = "Run the creature AI against a scripted player and print a summary")]
struct Args {
    /// Archetypes to spawn, comma separated
    #[arg(long, value_delimiter = ',', default_value = "angler,swarmer,stalker,mimic")]
    spawn: Vec<String>,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 3600)]
    frames: u32,

    /// Seconds per frame
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Random seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// AI tuning file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra archetypes (TOML), merged over the built-in roster
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Drop a flare at the player's position every this many seconds (0 = never)
    #[arg(long, default_value_t = 20.0)]
    flare_interval: f32,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,
}

#[derive(Serialize)]
struct RunSummary {
    seed: u64,
    frames: u32,
    simulated_seconds: f32,
    spawned: usize,
    alive: usize,
    deaths: usize,
    /// How many times creatures entered each state
    state_entries: BTreeMap<String, u64>,
    ability_uses: BTreeMap<String, u64>,
    player_hits: u64,
    player_damage: f32,
    learned: LearnedBehaviors,
}

/// Radius of the player's lap around the spawn area
const PATH_RADIUS: f32 = 30.0;
const PATH_DEPTH: f32 = -40.0;
const PLAYER_SPEED: f32 = 4.0;
const FLARE_LIFETIME: f32 = 8.0;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("abyss_ai=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AiConfig::load(path)?,
        None => AiConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let mut catalog = ArchetypeCatalog::builtin();
    if let Some(path) = &args.catalog {
        let content = std::fs::read_to_string(path)?;
        catalog.extend_from_toml_str(&content)?;
    }

    let seed = config.seed;
    let mut registry = CreatureRegistry::with_catalog(config, catalog)?;

    let count = args.spawn.len().max(1);
    for (i, type_id) in args.spawn.iter().enumerate() {
        let angle = i as f32 / count as f32 * TAU;
        let position = Vec3::new(angle.cos() * 20.0, PATH_DEPTH, angle.sin() * 20.0);
        registry.spawn(type_id.trim(), position, SpawnOptions::default());
    }
    let spawned = registry.len();

    let mut state_entries: BTreeMap<String, u64> = BTreeMap::new();
    let mut ability_uses: BTreeMap<String, u64> = BTreeMap::new();
    let mut player_hits = 0u64;
    let mut player_damage = 0.0f32;
    let mut deaths = 0usize;
    let mut flares: Vec<(Vec3, f32)> = Vec::new();
    let mut next_flare = args.flare_interval;

    for frame in 0..args.frames {
        let time = frame as f32 * args.dt;
        let player = scripted_player(time);

        if args.flare_interval > 0.0 && time >= next_flare {
            flares.push((player.position, time + FLARE_LIFETIME));
            next_flare += args.flare_interval;
        }
        flares.retain(|&(_, expires)| expires > time);

        let mut world = WorldSnapshot::new(player);
        for &(position, _) in &flares {
            world = world.with_flare(position);
        }

        let report = registry.update(args.dt, &world);
        player_damage += report.player_damage;
        for event in &report.events {
            match event {
                CreatureEvent::StateChanged { to, .. } => {
                    *state_entries.entry(to.to_string()).or_default() += 1;
                }
                CreatureEvent::AbilityUsed { ability, .. } => {
                    *ability_uses.entry(ability_name(*ability)).or_default() += 1;
                }
                CreatureEvent::PlayerHit { .. } => player_hits += 1,
                CreatureEvent::Died { .. } => deaths += 1,
                _ => {}
            }
        }
    }

    let summary = RunSummary {
        seed,
        frames: args.frames,
        simulated_seconds: args.frames as f32 * args.dt,
        spawned,
        alive: registry.living_count(),
        deaths,
        state_entries,
        ability_uses,
        player_hits,
        player_damage,
        learned: registry.learned_behaviors(),
    };

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_text(&summary);
    }
    Ok(())
}

/// Player swims laps at a fixed depth, sprinting for 5 s out of every 15
fn scripted_player(time: f32) -> PlayerSnapshot {
    let angle = time * PLAYER_SPEED / PATH_RADIUS;
    let sprinting = time % 15.0 < 5.0;
    PlayerSnapshot {
        position: Vec3::new(angle.cos() * PATH_RADIUS, PATH_DEPTH, angle.sin() * PATH_RADIUS),
        light_level: 0.8,
        movement_speed: if sprinting { PLAYER_SPEED * 2.0 } else { PLAYER_SPEED },
        is_sprinting: sprinting,
        is_hidden: false,
    }
}

fn ability_name(ability: Ability) -> String {
    serde_json::to_value(ability)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| format!("{:?}", ability))
}

fn print_text(summary: &RunSummary) {
    println!("=== ABYSS SIM ===");
    println!("Seed: {}  Frames: {}  ({:.1}s)", summary.seed, summary.frames, summary.simulated_seconds);
    println!("Creatures: {} spawned, {} alive, {} died", summary.spawned, summary.alive, summary.deaths);
    println!("Player: {} hits, {:.1} damage taken", summary.player_hits, summary.player_damage);
    println!();
    println!("State entries:");
    for (state, count) in &summary.state_entries {
        println!("  {:<12} {}", state, count);
    }
    println!("Abilities:");
    for (ability, count) in &summary.ability_uses {
        println!("  {:<16} {}", ability, count);
    }
    println!();
    println!(
        "Learned: {} flare lures, lure x{:.2}, ambush response {:?}, {} hiding cells",
        summary.learned.flare_usage,
        summary.learned.lure_multiplier,
        summary.learned.ambush_response,
        summary.learned.hiding_frequency.len()
    );
}
