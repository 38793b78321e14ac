//! Component Definitions
//!
//! The data model of the combat core. Every simulated thing is an [`Actor`]:
//! a shared [`ActorBase`] record plus a kind-specific variant in [`ActorKind`].
//! The player is kept outside the general collection as a [`Player`].
//!
//! ## Module Structure
//! - `status`: stack/duration record for status effects
//! - `loadout`: passives, items and skills read by the pipeline

pub mod loadout;
pub mod status;

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;

use super::constants::*;
use crate::combat::events::DamageType;
use super::enemy_ai::abilities::{AbilityKind, ActiveAbility};

pub use loadout::{effective_cooldown, Item, Passive, SkillKind, SkillSlot};
pub use status::{StatusEffects, StatusKind, StatusSlot};

// ============================================================================
// Identity
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct ActorId(pub u32);

impl ActorId {
    /// The player; never part of the general actor collection.
    pub const PLAYER: ActorId = ActorId(0);
    /// Environmental damage source (orphaned DoTs). Always valid as an attacker.
    pub const WORLD: ActorId = ActorId(u32::MAX);

    pub fn is_player(self) -> bool {
        self == Self::PLAYER
    }

    pub fn is_world(self) -> bool {
        self == Self::WORLD
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ActorId::PLAYER => write!(f, "player"),
            ActorId::WORLD => write!(f, "world"),
            ActorId(n) => write!(f, "#{}", n),
        }
    }
}

/// Which side an actor fights for.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Enemy,
}

impl Faction {
    pub fn opposing(self) -> Faction {
        match self {
            Faction::Player => Faction::Enemy,
            Faction::Enemy => Faction::Player,
        }
    }
}

/// Descriptive tags.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Tag {
    Boss,
    Elite,
    Melee,
    Ranged,
    /// Explodes on death
    Volatile,
    /// Splits into minions on death
    Splitter,
    /// Reflects flat damage to attackers
    Thorny,
    /// Takes bonus damage from the player's mark items
    Marked,
    /// Spawned by another enemy; never splits again
    Minion,
}

pub type TagSet = SmallVec<[Tag; 4]>;

/// Presentation state read by the renderer.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum AnimationState {
    #[default]
    Idle,
    Moving,
    Attacking,
    Telegraph,
    Casting,
    Hit,
    Dying,
}

// ============================================================================
// Shared Base Record
// ============================================================================

#[derive(Clone, Debug)]
pub struct ActorBase {
    pub position: Vec2,
    pub velocity: Vec2,
    pub health: f32,
    pub max_health: f32,
    /// Collision radius
    pub radius: f32,
    /// Movement speed in units per second
    pub speed: f32,
    pub armor: f32,
    /// Temporary shield pool, drained before health
    pub shield: f32,
    pub faction: Faction,
    pub tags: TagSet,
    pub alive: bool,
    pub invulnerable_timer: f32,
    pub hit_flash_timer: f32,
    pub death_timer: f32,
    pub animation: AnimationState,
    /// Facing rotation in radians
    pub facing: f32,
    pub status: StatusEffects,
    pub damage_dealt: f32,
    pub damage_taken: f32,
}

impl ActorBase {
    pub fn new(faction: Faction, position: Vec2, max_health: f32, radius: f32, speed: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            health: max_health,
            max_health,
            radius,
            speed,
            armor: 0.0,
            shield: 0.0,
            faction,
            tags: TagSet::new(),
            alive: true,
            invulnerable_timer: 0.0,
            hit_flash_timer: 0.0,
            death_timer: 0.0,
            animation: AnimationState::Idle,
            facing: 0.0,
            status: StatusEffects::default(),
            damage_dealt: 0.0,
            damage_taken: 0.0,
        }
    }

    pub fn with_armor(mut self, armor: f32) -> Self {
        self.armor = armor;
        self
    }

    pub fn with_tags(mut self, tags: &[Tag]) -> Self {
        for tag in tags {
            self.add_tag(*tag);
        }
        self
    }

    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn add_tag(&mut self, tag: Tag) {
        if !self.has_tag(tag) {
            self.tags.push(tag);
        }
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health > 0.0 {
            self.health / self.max_health
        } else {
            0.0
        }
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_timer > 0.0
    }

    /// Heal, clamped to max health. Returns the amount actually restored.
    pub fn heal(&mut self, amount: f32) -> f32 {
        if !self.alive || amount <= 0.0 {
            return 0.0;
        }
        let before = self.health;
        self.health = (self.health + amount).min(self.max_health);
        self.health - before
    }

    /// Effective movement speed after slows, roots and stuns.
    pub fn effective_speed(&self) -> f32 {
        self.speed * self.status.speed_multiplier()
    }

    /// Move toward a point for one tick, respecting slows. Returns true on arrival.
    pub fn step_toward(&mut self, target: Vec2, dt: f32) -> bool {
        let to_target = target - self.position;
        let step = self.effective_speed() * dt;
        if step <= 0.0 {
            self.velocity = Vec2::ZERO;
            return false;
        }
        let distance = to_target.length();
        if distance <= step {
            self.position = target;
            self.velocity = Vec2::ZERO;
            return true;
        }
        let dir = to_target / distance;
        self.velocity = dir * self.effective_speed();
        self.position += dir * step;
        self.facing = dir.y.atan2(dir.x);
        self.animation = AnimationState::Moving;
        false
    }

    /// Count down presentation and protection timers.
    pub fn tick_timers(&mut self, dt: f32) {
        self.invulnerable_timer = (self.invulnerable_timer - dt).max(0.0);
        if self.hit_flash_timer > 0.0 {
            self.hit_flash_timer = (self.hit_flash_timer - dt).max(0.0);
            if self.hit_flash_timer == 0.0 && self.alive && self.animation == AnimationState::Hit {
                self.animation = AnimationState::Idle;
            }
        }
        if !self.alive {
            self.death_timer = (self.death_timer - dt).max(0.0);
        }
    }

    /// Transition to not-alive. Returns false if the actor was already dead.
    pub fn mark_dead(&mut self) -> bool {
        if !self.alive {
            return false;
        }
        self.health = 0.0;
        self.alive = false;
        self.velocity = Vec2::ZERO;
        self.animation = AnimationState::Dying;
        self.death_timer = DEATH_ANIMATION_DURATION;
        true
    }
}

// ============================================================================
// Player
// ============================================================================

/// Cooldowns for defender-side reactive effects.
#[derive(Clone, Debug, Default)]
pub struct ReactiveCooldowns {
    pub emergency_shield: f32,
    pub thorns: f32,
    pub reflect: f32,
    pub retaliation: f32,
}

impl ReactiveCooldowns {
    pub fn tick(&mut self, dt: f32) {
        self.emergency_shield = (self.emergency_shield - dt).max(0.0);
        self.thorns = (self.thorns - dt).max(0.0);
        self.reflect = (self.reflect - dt).max(0.0);
        self.retaliation = (self.retaliation - dt).max(0.0);
    }
}

#[derive(Clone, Debug)]
pub struct PlayerState {
    pub level: u32,
    pub experience: u32,
    /// Level-ups waiting for the offer screen
    pub pending_level_ups: u32,
    pub mana: f32,
    pub max_mana: f32,
    pub mana_regen: f32,
    pub skills: Vec<SkillSlot>,
    pub passives: Vec<Passive>,
    pub items: Vec<Item>,
    /// Global outgoing damage scalar
    pub damage_scalar: f32,
    /// Stacks from on-kill damage passives
    pub kill_stacks: u32,
    pub reactive: ReactiveCooldowns,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            level: 1,
            experience: 0,
            pending_level_ups: 0,
            mana: 100.0,
            max_mana: 100.0,
            mana_regen: 6.0,
            skills: Vec::new(),
            passives: Vec::new(),
            items: Vec::new(),
            damage_scalar: 1.0,
            kill_stacks: 0,
            reactive: ReactiveCooldowns::default(),
        }
    }
}

impl PlayerState {
    /// Damage scalar including on-kill stacks.
    pub fn effective_damage_scalar(&self) -> f32 {
        let per_stack = self
            .passives
            .iter()
            .find_map(|p| match p {
                Passive::Bloodlust { per_stack, .. } => Some(*per_stack),
                _ => None,
            })
            .unwrap_or(0.0);
        self.damage_scalar * (1.0 + per_stack * self.kill_stacks as f32)
    }

    pub fn cooldown_reduction(&self) -> f32 {
        self.items
            .iter()
            .map(|item| match item {
                Item::Hourglass { reduction } => *reduction,
                _ => 0.0,
            })
            .sum()
    }

    pub fn summon_item_bonus(&self) -> f32 {
        self.items
            .iter()
            .map(|item| match item {
                Item::SummonCollar { bonus } => *bonus,
                _ => 0.0,
            })
            .sum()
    }

    pub fn mark_bonus(&self) -> f32 {
        self.items
            .iter()
            .map(|item| match item {
                Item::HuntersMark { bonus } => *bonus,
                _ => 0.0,
            })
            .sum()
    }

    /// Add experience. Returns the number of levels gained.
    pub fn add_experience(&mut self, amount: u32) -> u32 {
        self.experience += amount;
        let mut gained = 0;
        while self.experience >= EXPERIENCE_PER_LEVEL * self.level {
            self.experience -= EXPERIENCE_PER_LEVEL * self.level;
            self.level += 1;
            gained += 1;
        }
        self.pending_level_ups += gained;
        gained
    }

    pub fn tick(&mut self, dt: f32) {
        self.mana = (self.mana + self.mana_regen * dt).min(self.max_mana);
        for slot in self.skills.iter_mut() {
            slot.cooldown_remaining = (slot.cooldown_remaining - dt).max(0.0);
        }
        self.reactive.tick(dt);
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub base: ActorBase,
    pub state: PlayerState,
}

impl Player {
    pub fn new(position: Vec2) -> Self {
        Self {
            base: ActorBase::new(Faction::Player, position, 100.0, 14.0, 160.0),
            state: PlayerState::default(),
        }
    }
}

// ============================================================================
// Enemies
// ============================================================================

/// Named enemy behavior profiles.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Archetype {
    MeleeChaser,
    RangedSpitter,
    Tank,
    Blinker,
    HazardGenerator,
    Boss,
}

/// Elite modifiers rolled on elite combat nodes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum EliteModifier {
    /// Extra armor
    Armored,
    /// Heals on hit
    Vampiric,
    /// Explodes on death
    Volatile,
    /// Faster movement and cooldowns
    Hasted,
}

impl EliteModifier {
    pub const ALL: [EliteModifier; 4] = [
        EliteModifier::Armored,
        EliteModifier::Vampiric,
        EliteModifier::Volatile,
        EliteModifier::Hasted,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EliteModifier::Armored => "Armored",
            EliteModifier::Vampiric => "Vampiric",
            EliteModifier::Volatile => "Volatile",
            EliteModifier::Hasted => "Hasted",
        }
    }

    /// Fraction of damage dealt healed back by vampiric elites.
    pub const VAMPIRIC_FRACTION: f32 = 0.3;
    pub const ARMOR_BONUS: f32 = 12.0;
    pub const HASTE_MULTIPLIER: f32 = 1.3;
}

/// Behavior label, for presentation and debugging.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum BehaviorState {
    #[default]
    Idle,
    Chasing,
    Kiting,
    Strafing,
    Attacking,
    Casting,
    Stunned,
}

#[derive(Clone, Debug)]
pub struct EnemyState {
    pub definition_id: String,
    pub archetype: Archetype,
    /// Remaining cooldown per ability
    pub cooldowns: HashMap<AbilityKind, f32>,
    pub behavior: BehaviorState,
    /// Time until the next basic attack
    pub attack_timer: f32,
    pub attack_cooldown: f32,
    pub contact_damage: f32,
    pub attack_range: f32,
    pub elite: Option<EliteModifier>,
    pub boss_phase: Option<usize>,
    pub active_ability: Option<ActiveAbility>,
    pub experience_reward: u32,
    /// Cooldown multiplier (hasted elites tick faster)
    pub cooldown_rate: f32,
    /// Cooldown on the `Thorny` reflect
    pub thorns_cooldown: f32,
}

impl EnemyState {
    pub fn new(definition_id: impl Into<String>, archetype: Archetype) -> Self {
        Self {
            definition_id: definition_id.into(),
            archetype,
            cooldowns: HashMap::new(),
            behavior: BehaviorState::Idle,
            attack_timer: 0.0,
            attack_cooldown: 1.0,
            contact_damage: 0.0,
            attack_range: 0.0,
            elite: None,
            boss_phase: None,
            active_ability: None,
            experience_reward: 0,
            cooldown_rate: 1.0,
            thorns_cooldown: 0.0,
        }
    }

    pub fn cooldown(&self, ability: AbilityKind) -> f32 {
        self.cooldowns.get(&ability).copied().unwrap_or(0.0)
    }

    pub fn is_ready(&self, ability: AbilityKind) -> bool {
        self.cooldown(ability) <= 0.0
    }

    pub fn tick_cooldowns(&mut self, dt: f32) {
        let step = dt * self.cooldown_rate;
        for remaining in self.cooldowns.values_mut() {
            *remaining = (*remaining - step).max(0.0);
        }
        self.attack_timer = (self.attack_timer - step).max(0.0);
        self.thorns_cooldown = (self.thorns_cooldown - dt).max(0.0);
    }
}

// ============================================================================
// Projectiles, Hazards, Summons
// ============================================================================

/// A status to apply, with stack count and duration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusApplication {
    pub kind: StatusKind,
    pub stacks: u32,
    pub duration: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Splash {
    pub radius: f32,
    pub damage: f32,
}

/// What a hazard does on each tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum HazardEffect {
    /// Damage the owner's opposing faction
    Damage,
    /// Heal the owner's faction
    Heal,
    /// Apply a status to the owner's opposing faction
    Debuff(StatusApplication),
}

/// Parameters for spawning a hazard.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HazardSpec {
    pub effect: HazardEffect,
    pub damage_type: DamageType,
    pub amount: f32,
    pub tick_interval: f32,
    pub duration: f32,
    pub radius: f32,
}

#[derive(Clone, Debug)]
pub struct ProjectileState {
    pub owner: ActorId,
    pub damage: f32,
    pub damage_type: DamageType,
    pub piercing: bool,
    pub lifetime: f32,
    /// Actors already hit (prevents double hits)
    pub hit: SmallVec<[ActorId; 8]>,
    pub splash: Option<Splash>,
    pub impact_hazard: Option<HazardSpec>,
    pub on_hit_status: Option<StatusApplication>,
}

#[derive(Clone, Debug)]
pub struct HazardState {
    pub owner: ActorId,
    pub effect: HazardEffect,
    pub damage_type: DamageType,
    pub amount: f32,
    pub tick_interval: f32,
    pub tick_timer: f32,
    pub duration: f32,
    pub radius: f32,
    /// Follows the owner's position
    pub attached: bool,
}

#[derive(Clone, Debug)]
pub struct SummonState {
    pub owner: ActorId,
    pub remaining: f32,
    pub damage: f32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    pub attack_timer: f32,
    /// Conditional multiplier recomputed every tick
    pub multiplier: f32,
}

// ============================================================================
// Actor
// ============================================================================

#[derive(Clone, Debug)]
pub enum ActorKind {
    Enemy(EnemyState),
    Summon(SummonState),
    Projectile(ProjectileState),
    Hazard(HazardState),
}

#[derive(Clone, Debug)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub base: ActorBase,
    pub kind: ActorKind,
}

impl Actor {
    /// Enemies and summons take damage; projectiles and hazards do not.
    pub fn is_damageable(&self) -> bool {
        matches!(self.kind, ActorKind::Enemy(_) | ActorKind::Summon(_))
    }

    pub fn as_enemy(&self) -> Option<&EnemyState> {
        match &self.kind {
            ActorKind::Enemy(enemy) => Some(enemy),
            _ => None,
        }
    }

    pub fn as_enemy_mut(&mut self) -> Option<&mut EnemyState> {
        match &mut self.kind {
            ActorKind::Enemy(enemy) => Some(enemy),
            _ => None,
        }
    }

    pub fn as_summon(&self) -> Option<&SummonState> {
        match &self.kind {
            ActorKind::Summon(summon) => Some(summon),
            _ => None,
        }
    }

    pub fn as_summon_mut(&mut self) -> Option<&mut SummonState> {
        match &mut self.kind {
            ActorKind::Summon(summon) => Some(summon),
            _ => None,
        }
    }

    pub fn is_enemy(&self) -> bool {
        matches!(self.kind, ActorKind::Enemy(_))
    }

    pub fn is_summon(&self) -> bool {
        matches!(self.kind, ActorKind::Summon(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_dead_only_once() {
        let mut base = ActorBase::new(Faction::Enemy, Vec2::ZERO, 10.0, 8.0, 50.0);
        assert!(base.mark_dead());
        assert!(!base.mark_dead());
        assert_eq!(base.health, 0.0);
        assert_eq!(base.animation, AnimationState::Dying);
    }

    #[test]
    fn test_heal_clamps_to_max() {
        let mut base = ActorBase::new(Faction::Player, Vec2::ZERO, 50.0, 8.0, 50.0);
        base.health = 45.0;
        assert_eq!(base.heal(20.0), 5.0);
        assert_eq!(base.health, 50.0);
    }

    #[test]
    fn test_experience_levels() {
        let mut state = PlayerState::default();
        let gained = state.add_experience(EXPERIENCE_PER_LEVEL + EXPERIENCE_PER_LEVEL * 2);
        assert_eq!(gained, 2);
        assert_eq!(state.level, 3);
        assert_eq!(state.pending_level_ups, 2);
    }

    #[test]
    fn test_bloodlust_scalar() {
        let mut state = PlayerState::default();
        state.passives.push(Passive::Bloodlust {
            per_stack: 0.1,
            max_stacks: 5,
        });
        state.kill_stacks = 3;
        assert!((state.effective_damage_scalar() - 1.3).abs() < 1e-5);
    }

    #[test]
    fn test_rooted_actor_does_not_move() {
        let mut base = ActorBase::new(Faction::Enemy, Vec2::ZERO, 10.0, 8.0, 100.0);
        base.status.root.stacks = 1;
        base.step_toward(Vec2::new(50.0, 0.0), 0.5);
        assert_eq!(base.position, Vec2::ZERO);
    }
}
