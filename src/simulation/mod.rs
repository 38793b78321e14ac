//! Combat simulation core
//!
//! A single [`Simulation`] value owns every actor, the combat log, the RNG and
//! a read-only handle to the content registry. [`Simulation::tick`] advances it
//! by one fixed step in a fixed component order:
//!
//! 1. timers and cooldowns
//! 2. enemy AI (decision + in-flight ability phase)
//! 3. summons
//! 4. projectiles
//! 5. hazards
//! 6. status decay and periodic processing
//! 7. cleanup of dead and expired actors
//!
//! All damage, from every source, goes through [`combat_core::resolve`].
//!
//! ## Module Structure
//! - `constants`: hard caps and tuning numbers
//! - `geometry`: vector helpers
//! - `components`: the actor data model
//! - `trigger_context`: per-event fan-out bounds
//! - `combat_core`: the damage pipeline
//! - `triggers`: reactive handlers (on hit, on damage taken, on kill, on death)
//! - `status_effects`: stacking/duration bookkeeping
//! - `enemy_ai`: archetype decisions, boss phases and the ability state machine
//! - `projectiles`, `hazards`, `summons`: tick updaters
//! - `skills`: player skill casting
//! - `spawn`: combat-node spawning
//! - `content`: static definitions loaded from RON

pub mod combat_core;
pub mod components;
pub mod constants;
pub mod content;
pub mod enemy_ai;
pub mod geometry;
pub mod hazards;
pub mod projectiles;
pub mod skills;
pub mod spawn;
pub mod status_effects;
pub mod summons;
pub mod trigger_context;
pub mod triggers;

use bevy::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::combat::events::DamageType;
use crate::combat::log::{CombatLog, CombatLogEventType};
use components::*;
use constants::*;
use content::ContentRegistry;
use trigger_context::TriggerContext;

// ============================================================================
// Resources
// ============================================================================

/// Seedable random number generator for reproducible runs.
pub struct GameRng {
    rng: StdRng,
    /// The seed used, if one was provided
    pub seed: Option<u64>,
}

impl GameRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// Random f32 in [0.0, 1.0)
    pub fn random_f32(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in [min, max)
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    /// Random index in [0, len). `len` must be non-zero.
    pub fn random_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        self.rng.gen_range(0..len.max(1))
    }

    pub fn chance(&mut self, probability: f32) -> bool {
        self.random_f32() < probability
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

/// Trigger-chain depth reached per externally-initiated damage event.
#[derive(Clone, Debug, Default)]
pub struct ChainTelemetry {
    pub events: u32,
    pub last_depth: u32,
    pub max_depth: u32,
    /// Count of events per depth reached (index = depth)
    pub depth_histogram: [u32; MAX_CHAIN_DEPTH as usize + 1],
    /// Trigger or spawn attempts refused by a cap
    pub suppressed: u32,
}

impl ChainTelemetry {
    pub fn record(&mut self, ctx: &TriggerContext) {
        let depth = ctx.depth();
        self.events += 1;
        self.last_depth = depth;
        self.max_depth = self.max_depth.max(depth);
        let bucket = (depth as usize).min(self.depth_histogram.len() - 1);
        self.depth_histogram[bucket] += 1;
        self.suppressed += ctx.suppressed();
        if ctx.suppressed() > 0 {
            debug!(
                "Trigger chain capped at depth {} ({} attempts suppressed)",
                depth,
                ctx.suppressed()
            );
        }
    }
}

/// Aggregate numbers for one run.
#[derive(Clone, Debug, Default)]
pub struct RunStats {
    pub kills: u32,
    pub player_damage_dealt: f32,
    pub player_damage_taken: f32,
    pub actors_spawned: u32,
}

// ============================================================================
// Simulation
// ============================================================================

#[derive(Resource)]
pub struct Simulation {
    /// Seconds since the run started
    pub time: f32,
    pub player: Player,
    pub actors: BTreeMap<ActorId, Actor>,
    next_id: u32,
    pub combat_log: CombatLog,
    pub rng: GameRng,
    pub content: Arc<ContentRegistry>,
    /// Time accumulated toward the next periodic status pass
    pub status_accumulator: f32,
    pub telemetry: ChainTelemetry,
    pub stats: RunStats,
}

impl Simulation {
    pub fn new(content: Arc<ContentRegistry>, rng: GameRng) -> Self {
        Self {
            time: 0.0,
            player: Player::new(Vec2::ZERO),
            actors: BTreeMap::new(),
            next_id: 1,
            combat_log: CombatLog::default(),
            rng,
            content,
            status_accumulator: 0.0,
            telemetry: ChainTelemetry::default(),
            stats: RunStats::default(),
        }
    }

    /// Simulation with the given content and a fixed seed.
    pub fn seeded(content: ContentRegistry, seed: u64) -> Self {
        Self::new(Arc::new(content), GameRng::from_seed(seed))
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    /// Shared base record for the player or any actor.
    pub fn base(&self, id: ActorId) -> Option<&ActorBase> {
        if id.is_player() {
            Some(&self.player.base)
        } else {
            self.actors.get(&id).map(|a| &a.base)
        }
    }

    pub fn base_mut(&mut self, id: ActorId) -> Option<&mut ActorBase> {
        if id.is_player() {
            Some(&mut self.player.base)
        } else {
            self.actors.get_mut(&id).map(|a| &mut a.base)
        }
    }

    pub fn enemy(&self, id: ActorId) -> Option<&EnemyState> {
        self.actors.get(&id).and_then(Actor::as_enemy)
    }

    pub fn enemy_mut(&mut self, id: ActorId) -> Option<&mut EnemyState> {
        self.actors.get_mut(&id).and_then(Actor::as_enemy_mut)
    }

    /// The player and enemies/summons take damage; projectiles and hazards don't.
    pub fn is_damageable(&self, id: ActorId) -> bool {
        id.is_player() || self.actors.get(&id).is_some_and(Actor::is_damageable)
    }

    pub fn is_alive(&self, id: ActorId) -> bool {
        self.base(id).is_some_and(|b| b.alive)
    }

    pub fn position_of(&self, id: ActorId) -> Option<Vec2> {
        self.base(id).map(|b| b.position)
    }

    pub fn faction_of(&self, id: ActorId) -> Option<Faction> {
        self.base(id).map(|b| b.faction)
    }

    /// Display name for logs.
    pub fn actor_name(&self, id: ActorId) -> String {
        if id.is_player() {
            "Player".to_string()
        } else if id.is_world() {
            "Environment".to_string()
        } else {
            self.actors
                .get(&id)
                .map(|a| a.name.clone())
                .unwrap_or_else(|| format!("Actor {}", id))
        }
    }

    /// Ids of every actor matching `filter`, in id order.
    pub fn actor_ids_where<F: Fn(&Actor) -> bool>(&self, filter: F) -> Vec<ActorId> {
        self.actors
            .values()
            .filter(|a| filter(a))
            .map(|a| a.id)
            .collect()
    }

    /// Alive, damageable actors of `faction`, the player included when it qualifies.
    pub fn damageable_ids(&self, faction: Faction) -> Vec<ActorId> {
        let mut ids = Vec::new();
        if faction == Faction::Player && self.player.base.alive {
            ids.push(ActorId::PLAYER);
        }
        ids.extend(self.actor_ids_where(|a| {
            a.is_damageable() && a.base.alive && a.base.faction == faction
        }));
        ids
    }

    /// Alive, damageable actors of `faction` whose body overlaps the circle.
    pub fn targets_in_radius(&self, center: Vec2, radius: f32, faction: Faction) -> Vec<ActorId> {
        self.damageable_ids(faction)
            .into_iter()
            .filter(|id| {
                self.base(*id).is_some_and(|b| {
                    geometry::circles_overlap(center, radius, b.position, b.radius)
                })
            })
            .collect()
    }

    /// Nearest alive, damageable actor of `faction`.
    pub fn nearest_of_faction(&self, from: Vec2, faction: Faction) -> Option<(ActorId, Vec2)> {
        self.damageable_ids(faction)
            .into_iter()
            .filter_map(|id| self.position_of(id).map(|p| (id, p)))
            .min_by(|a, b| {
                geometry::distance(from, a.1).total_cmp(&geometry::distance(from, b.1))
            })
    }

    pub fn living_enemy_count(&self) -> usize {
        self.actors
            .values()
            .filter(|a| a.is_enemy() && a.base.alive)
            .count()
    }

    pub fn living_summon_count(&self, owner: ActorId) -> usize {
        self.actors
            .values()
            .filter(|a| a.base.alive && a.as_summon().is_some_and(|s| s.owner == owner))
            .count()
    }

    pub fn is_encounter_cleared(&self) -> bool {
        self.living_enemy_count() == 0
    }

    pub fn is_player_defeated(&self) -> bool {
        !self.player.base.alive
    }

    // ------------------------------------------------------------------
    // Spawning
    // ------------------------------------------------------------------

    fn allocate_id(&mut self) -> ActorId {
        let id = ActorId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Insert a new actor and return its id.
    pub fn insert_actor(&mut self, name: impl Into<String>, base: ActorBase, kind: ActorKind) -> ActorId {
        let id = self.allocate_id();
        self.actors.insert(
            id,
            Actor {
                id,
                name: name.into(),
                base,
                kind,
            },
        );
        self.stats.actors_spawned += 1;
        id
    }

    #[allow(clippy::too_many_arguments)]
    pub fn spawn_projectile(
        &mut self,
        owner: ActorId,
        name: &str,
        position: Vec2,
        velocity: Vec2,
        damage: f32,
        damage_type: DamageType,
        lifetime: f32,
    ) -> ActorId {
        let faction = self.faction_of(owner).unwrap_or(Faction::Enemy);
        let mut base = ActorBase::new(faction, position, 1.0, 5.0, velocity.length());
        base.velocity = velocity;
        base.facing = geometry::facing_angle(velocity);
        self.insert_actor(
            name,
            base,
            ActorKind::Projectile(ProjectileState {
                owner,
                damage,
                damage_type,
                piercing: false,
                lifetime,
                hit: Default::default(),
                splash: None,
                impact_hazard: None,
                on_hit_status: None,
            }),
        )
    }

    pub fn spawn_hazard(
        &mut self,
        owner: ActorId,
        name: &str,
        position: Vec2,
        spec: HazardSpec,
        attached: bool,
    ) -> ActorId {
        let faction = self.faction_of(owner).unwrap_or(Faction::Enemy);
        let base = ActorBase::new(faction, position, 1.0, spec.radius, 0.0);
        let id = self.insert_actor(
            name,
            base,
            ActorKind::Hazard(HazardState {
                owner,
                effect: spec.effect,
                damage_type: spec.damage_type,
                amount: spec.amount,
                tick_interval: spec.tick_interval.max(FIXED_DT),
                tick_timer: spec.tick_interval.max(FIXED_DT),
                duration: spec.duration,
                radius: spec.radius,
                attached,
            }),
        );
        debug!("{} placed {} at {:?}", self.actor_name(owner), name, position);
        id
    }

    pub fn spawn_summon(
        &mut self,
        owner: ActorId,
        name: &str,
        position: Vec2,
        max_health: f32,
        damage: f32,
        duration: f32,
    ) -> ActorId {
        let base = ActorBase::new(Faction::Player, position, max_health, 10.0, 150.0);
        let id = self.insert_actor(
            name,
            base,
            ActorKind::Summon(SummonState {
                owner,
                remaining: duration,
                damage,
                attack_range: 24.0,
                attack_cooldown: 0.8,
                attack_timer: 0.0,
                multiplier: 1.0,
            }),
        );
        let owner_name = self.actor_name(owner);
        self.combat_log.record(
            CombatLogEventType::Spawn,
            owner_name.clone(),
            Some(name.to_string()),
            None,
            format!("{} summons {}", owner_name, name),
        );
        id
    }

    /// Move the player (input or autopilot). Respects slows, roots and stuns.
    pub fn move_player(&mut self, direction: Vec2, dt: f32) {
        let base = &mut self.player.base;
        if !base.alive {
            return;
        }
        let direction = geometry::normalize_or_zero(direction);
        if direction == Vec2::ZERO || !base.status.can_move() {
            base.velocity = Vec2::ZERO;
            return;
        }
        let target = base.position + direction * base.effective_speed() * dt;
        base.step_toward(target, dt);
        base.position = geometry::clamp_to_arena(base.position, ARENA_HALF_EXTENT);
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// Advance the simulation by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.time += dt;
        self.combat_log.match_time = self.time;

        self.tick_timers(dt);
        enemy_ai::update_enemies(self, dt);
        summons::update_summons(self, dt);
        projectiles::update_projectiles(self, dt);
        hazards::update_hazards(self, dt);

        status_effects::tick(self, dt);
        self.status_accumulator += dt;
        while self.status_accumulator >= STATUS_PROCESS_INTERVAL {
            self.status_accumulator -= STATUS_PROCESS_INTERVAL;
            status_effects::process(self);
        }

        self.cleanup();
    }

    fn tick_timers(&mut self, dt: f32) {
        self.player.base.tick_timers(dt);
        if self.player.base.alive {
            self.player.state.tick(dt);
        }
        for actor in self.actors.values_mut() {
            actor.base.tick_timers(dt);
            if let ActorKind::Enemy(enemy) = &mut actor.kind {
                enemy.tick_cooldowns(dt);
            }
        }
    }

    /// Remove actors whose death timer has elapsed.
    fn cleanup(&mut self) {
        self.actors
            .retain(|_, actor| actor.base.alive || actor.base.death_timer > 0.0);
    }

    /// Remove a projectile, hazard or summon without death triggers.
    pub fn expire(&mut self, id: ActorId) {
        if let Some(actor) = self.actors.get_mut(&id) {
            if actor.base.alive {
                actor.base.alive = false;
                actor.base.velocity = Vec2::ZERO;
                actor.base.animation = AnimationState::Dying;
                actor.base.death_timer = match actor.kind {
                    ActorKind::Summon(_) => DEATH_ANIMATION_DURATION,
                    _ => 0.0,
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_sim() -> Simulation {
        Simulation::seeded(ContentRegistry::default(), 7)
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let mut a = GameRng::from_seed(42);
        let mut b = GameRng::from_seed(42);
        for _ in 0..10 {
            assert_eq!(a.random_f32(), b.random_f32());
        }
    }

    #[test]
    fn test_player_is_damageable_and_found_by_faction() {
        let sim = empty_sim();
        assert!(sim.is_damageable(ActorId::PLAYER));
        assert_eq!(sim.damageable_ids(Faction::Player), vec![ActorId::PLAYER]);
        assert!(sim.damageable_ids(Faction::Enemy).is_empty());
    }

    #[test]
    fn test_expired_projectile_is_reaped_next_cleanup() {
        let mut sim = empty_sim();
        let id = sim.spawn_projectile(
            ActorId::PLAYER,
            "Bolt",
            Vec2::ZERO,
            Vec2::new(100.0, 0.0),
            5.0,
            DamageType::Arcane,
            1.0,
        );
        sim.expire(id);
        sim.cleanup();
        assert!(sim.actor(id).is_none());
    }

    #[test]
    fn test_telemetry_histogram() {
        let mut telemetry = ChainTelemetry::default();
        let mut ctx = TriggerContext::new();
        ctx.fire(trigger_context::TriggerKind::OnHit, |_| {});
        telemetry.record(&ctx);
        telemetry.record(&TriggerContext::new());
        assert_eq!(telemetry.events, 2);
        assert_eq!(telemetry.max_depth, 1);
        assert_eq!(telemetry.last_depth, 0);
        assert_eq!(telemetry.depth_histogram[0], 1);
        assert_eq!(telemetry.depth_histogram[1], 1);
    }
}
