//! Combat Constants
//!
//! Centralized location for the hard caps and tuning numbers used throughout the
//! combat core. Hard caps are process-wide and never change at runtime.

// ============================================================================
// Simulation Clock
// ============================================================================

/// Logical ticks per second.
pub const TICK_RATE: f64 = 60.0;

/// Fixed logical tick length in seconds.
pub const FIXED_DT: f32 = 1.0 / 60.0;

/// Length of one logical "turn" for self-decaying statuses (bleed, poison).
pub const STATUS_PROCESS_INTERVAL: f32 = 1.0;

// ============================================================================
// Trigger Chains
// ============================================================================

/// Maximum number of reactive trigger handlers one damage event may fire.
pub const MAX_CHAIN_DEPTH: u32 = 4;

/// Maximum times a single trigger kind may fire within one damage event.
pub const MAX_REPEATS_PER_KIND: u32 = 2;

/// Maximum new actors (spawns, spread targets) created by one damage event.
pub const MAX_SPAWNS_PER_EVENT: u32 = 6;

// ============================================================================
// Mitigation
// ============================================================================

/// Armor reduction can never remove more than this fraction of a raw hit.
pub const MAX_DAMAGE_REDUCTION: f32 = 0.7;

/// Flat damage removed per point of armor (before the cap above).
pub const ARMOR_REDUCTION_PER_POINT: f32 = 0.5;

/// Lowest damage a physical hit can deal once armor has been applied.
pub const MIN_MITIGATED_DAMAGE: f32 = 1.0;

/// Outgoing damage multiplier while weakened.
pub const WEAKEN_MULTIPLIER: f32 = 0.75;

/// Incoming damage multiplier from brittle (consumed on use).
pub const BRITTLE_MULTIPLIER: f32 = 1.5;

/// Incoming damage multiplier from exposed (not consumed).
pub const EXPOSED_MULTIPLIER: f32 = 1.25;

// ============================================================================
// Status Caps
// ============================================================================

pub const MAX_POISON_STACKS: u32 = 20;
pub const MAX_BLEED_STACKS: u32 = 10;
pub const MAX_SLOW_STACKS: u32 = 5;
pub const MAX_BRITTLE_STACKS: u32 = 1;
pub const MAX_EXPOSED_STACKS: u32 = 1;
pub const MAX_WEAKEN_STACKS: u32 = 1;
pub const MAX_ROOT_STACKS: u32 = 1;

/// Poison damage per stack per status turn.
pub const POISON_DAMAGE_PER_STACK: f32 = 1.0;

/// Movement lost per slow stack.
pub const SLOW_PER_STACK: f32 = 0.15;

/// Slowed actors never drop below this fraction of their speed.
pub const MIN_SLOW_MULTIPLIER: f32 = 0.25;

// ============================================================================
// Abilities
// ============================================================================

/// No ability or skill cooldown can be reduced below this (seconds).
pub const MIN_ABILITY_COOLDOWN: f32 = 0.25;

/// Living minions a boss may have before `SummonBrood` stops spawning.
pub const MAX_BROOD_MINIONS: usize = 6;

// ============================================================================
// Presentation Timers
// ============================================================================

/// Hit-flash duration after taking damage.
pub const HIT_FLASH_DURATION: f32 = 0.12;

/// Dead actors are kept this long for their death animation.
pub const DEATH_ANIMATION_DURATION: f32 = 0.6;

/// Player invulnerability window after losing health.
pub const PLAYER_HIT_INVULNERABILITY: f32 = 0.35;

// ============================================================================
// Reactive Cooldowns
// ============================================================================

pub const EMERGENCY_SHIELD_COOLDOWN: f32 = 12.0;
pub const THORNS_COOLDOWN: f32 = 0.5;
pub const REFLECT_COOLDOWN: f32 = 1.0;
pub const RETALIATION_COOLDOWN: f32 = 3.0;

/// Flat reflect from `Thorny` enemies, and its cooldown.
pub const THORNY_REFLECT_DAMAGE: f32 = 3.0;
pub const THORNY_COOLDOWN: f32 = 0.5;

// ============================================================================
// Death Effects
// ============================================================================

pub const VOLATILE_BURST_RADIUS: f32 = 70.0;
pub const VOLATILE_BURST_DAMAGE: f32 = 12.0;

/// Minions spawned when a `Splitter` dies.
pub const SPLIT_COUNT: u32 = 2;

// ============================================================================
// Encounters
// ============================================================================

/// Enemy health gained per node depth (fraction of base).
pub const DEPTH_HEALTH_SCALING: f32 = 0.15;

pub const ELITE_HEALTH_MULTIPLIER: f32 = 1.5;

/// Chance for each further enemy on an elite node to roll a modifier.
pub const ELITE_CHANCE: f32 = 0.25;

// ============================================================================
// Combat Log
// ============================================================================

/// Only the most recent entries are retained.
pub const COMBAT_LOG_CAPACITY: usize = 200;

// ============================================================================
// Arena
// ============================================================================

/// Radius of the ring enemies spawn on around the player.
pub const SPAWN_RING_RADIUS: f32 = 320.0;

/// Arena half-extent; actors are clamped inside.
pub const ARENA_HALF_EXTENT: f32 = 600.0;

/// Summons trail the player at this distance when idle.
pub const SUMMON_FOLLOW_DISTANCE: f32 = 48.0;

/// Experience needed per level (multiplied by the current level).
pub const EXPERIENCE_PER_LEVEL: u32 = 100;
