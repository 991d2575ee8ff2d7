//! Behaviour constants - fixed tuning values shared by the AI modules
//!
//! Durations are in simulated seconds, distances in world units.
//! Session-tunable values (decay rates, world bounds, thresholds) live in
//! [`crate::core::config::AiConfig`] instead.

// Level bounds
pub const LEVEL_MIN: f32 = 0.0;
pub const LEVEL_MAX: f32 = 100.0;

// State timers
pub const IDLE_DURATION: f32 = 3.0;
pub const ALERT_CALM_DURATION: f32 = 10.0;

// Alert thresholds and gains
pub const HUNT_ALERT_THRESHOLD: f32 = 50.0;
pub const INVESTIGATE_ESCALATION_THRESHOLD: f32 = 30.0;
pub const INVESTIGATE_ALERT_GAIN: f32 = 10.0;
pub const ALERT_GAIN_PER_SECOND: f32 = 10.0;
pub const POUNCE_ALERT_THRESHOLD: f32 = 50.0;

// Speed multipliers (fraction of archetype base speed)
pub const PATROL_SPEED_FACTOR: f32 = 0.3;
pub const INVESTIGATE_SPEED_FACTOR: f32 = 0.6;
pub const SEARCH_SPEED_FACTOR: f32 = 0.5;
pub const FLEE_SPEED_FACTOR: f32 = 1.2;
/// Hunting speed loses fear_level / HUNT_FEAR_DIVISOR of its base
pub const HUNT_FEAR_DIVISOR: f32 = 200.0;

// Idle / alert scanning
pub const IDLE_SCAN_RATE: f32 = 0.5;
pub const IDLE_SCAN_FREQUENCY: f32 = 1.0;
pub const ALERT_SCAN_RATE: f32 = 1.0;
pub const ALERT_SCAN_FREQUENCY: f32 = 3.0;

// Waypoints
pub const PATROL_POINTS_DEFAULT: usize = 3;
pub const PATROL_POINTS_TERRITORIAL: usize = 4;
pub const PATROL_RADIUS_DEFAULT: f32 = 15.0;
pub const PATROL_RADIUS_TERRITORIAL: f32 = 20.0;
pub const PATROL_JITTER_HORIZONTAL: f32 = 5.0;
pub const PATROL_JITTER_VERTICAL: f32 = 3.0;
pub const SEARCH_POINT_COUNT: usize = 5;
pub const SEARCH_MIN_DISTANCE: f32 = 5.0;
pub const SEARCH_MAX_DISTANCE: f32 = 15.0;
pub const SEARCH_JITTER_VERTICAL: f32 = 5.0;
pub const WAYPOINT_TOLERANCE: f32 = 2.0;
pub const INVESTIGATION_TOLERANCE: f32 = 3.0;
/// Below this distance a creature stops steering towards its goal
pub const ARRIVAL_EPSILON: f32 = 0.1;

// Combat
pub const ATTACK_COOLDOWN: f32 = 2.0;
pub const ATTACK_DISENGAGE_FACTOR: f32 = 1.5;

// Flee
pub const FLEE_SAFE_DISTANCE: f32 = 40.0;
pub const FLEE_RECOVERY_FRACTION: f32 = 0.5;
pub const FLEE_LOOKAHEAD: f32 = 30.0;
pub const REGENERATION_PER_SECOND: f32 = 5.0;

// Pack
pub const PACK_SPAWN_SPREAD_HORIZONTAL: f32 = 10.0;
pub const PACK_SPAWN_SPREAD_VERTICAL: f32 = 5.0;
pub const SURROUND_RADIUS: f32 = 10.0;

// Special behaviours
pub const CLOAK_RANGE_FACTOR: f32 = 0.3;
pub const MIMIC_REVEAL_RADIUS: f32 = 3.0;

// Player model learner
pub const SUSPICION_PER_DETECTION: f32 = 20.0;
pub const SUSPICION_DECAY_PER_SECOND: f32 = 1.0;
pub const FLARE_OVERUSE_THRESHOLD: u32 = 5;
pub const LURE_DECAY_FACTOR: f32 = 0.9;
pub const HIDING_CELL_SIZE: f32 = 10.0;

/// Fear gained per point of damage, as a share of max health (100 = full bar)
pub const FEAR_PER_HEALTH_FRACTION: f32 = 100.0;
