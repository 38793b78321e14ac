//! Enemy AI
//!
//! ## Architecture
//!
//! Enemy behavior runs in two phases each tick:
//! 1. **Context Building**: `EnemyContext` snapshots what the enemy needs to decide
//! 2. **Decision Making**: the archetype's `decide_action()` returns an `EnemyDecision`
//!
//! While an ability is in flight the archetype is not consulted; the ability's
//! phase timer is advanced instead (see `abilities` and `executors`).
//!
//! Each archetype lives in its own module and implements `ArchetypeAI`.

pub mod abilities;
pub mod blinker;
pub mod boss;
pub mod executors;
pub mod hazard_generator;
pub mod melee_chaser;
pub mod ranged_spitter;
pub mod tank;

use bevy::prelude::*;
use std::sync::Arc;

use super::combat_core;
use super::components::*;
use super::constants::*;
use super::content::{ContentRegistry, EnemyDefinition};
use super::geometry;
use super::status_effects;
use super::Simulation;
use crate::combat::events::{DamageEvent, DamageTag};
use crate::combat::log::CombatLogEventType;
use abilities::{AbilityKind, ActiveAbility, AbilityPhase};

/// Snapshot of the enemy's current target.
#[derive(Clone, Copy, Debug)]
pub struct TargetInfo {
    pub id: ActorId,
    pub position: Vec2,
    pub radius: f32,
}

/// Read-only view of one enemy and its surroundings.
pub struct EnemyContext<'a> {
    pub self_id: ActorId,
    pub position: Vec2,
    pub radius: f32,
    pub health_fraction: f32,
    pub target: Option<TargetInfo>,
    pub enemy: &'a EnemyState,
    pub definition: Option<&'a EnemyDefinition>,
}

impl<'a> EnemyContext<'a> {
    /// Center-to-center distance to the target
    pub fn distance_to_target(&self) -> Option<f32> {
        self.target
            .map(|t| geometry::distance(self.position, t.position))
    }

    /// Edge-to-edge distance to the target
    pub fn gap_to_target(&self) -> Option<f32> {
        self.target.map(|t| {
            (geometry::distance(self.position, t.position) - self.radius - t.radius).max(0.0)
        })
    }

    pub fn in_attack_range(&self) -> bool {
        self.gap_to_target()
            .is_some_and(|gap| gap <= self.enemy.attack_range)
    }

    /// The enemy has this ability in its loadout and it is off cooldown.
    pub fn ability_ready(&self, kind: AbilityKind) -> bool {
        self.definition.is_some_and(|d| d.ability(kind).is_some()) && self.enemy.is_ready(kind)
    }

    pub fn ability_in_range(&self, kind: AbilityKind) -> bool {
        let range = self
            .definition
            .and_then(|d| d.ability(kind))
            .map_or(0.0, |a| a.range);
        self.distance_to_target().is_some_and(|d| d <= range)
    }

    pub fn can_use(&self, kind: AbilityKind) -> bool {
        self.ability_ready(kind) && self.ability_in_range(kind)
    }
}

/// The result of an archetype decision.
#[derive(Debug, Clone, PartialEq)]
pub enum EnemyDecision {
    /// Do nothing this tick
    Idle,
    MoveToward(Vec2),
    /// Back away from a point
    MoveAway(Vec2),
    /// Circle around a point
    Strafe { around: Vec2, clockwise: bool },
    /// Direct attack, no telegraph
    BasicAttack { target: ActorId },
    StartAbility {
        ability: AbilityKind,
        target_pos: Option<Vec2>,
        start_pos: Option<Vec2>,
    },
}

/// Trait for archetype-specific decision logic.
///
/// Each archetype implements this trait. It takes a read-only context and
/// returns a decision; it never mutates the simulation.
pub trait ArchetypeAI {
    fn decide_action(&self, ctx: &EnemyContext) -> EnemyDecision;
}

/// Get the AI implementation for a given archetype.
pub fn get_archetype_ai(archetype: Archetype) -> Box<dyn ArchetypeAI> {
    match archetype {
        Archetype::MeleeChaser => Box::new(melee_chaser::MeleeChaserAI),
        Archetype::RangedSpitter => Box::new(ranged_spitter::RangedSpitterAI),
        Archetype::Tank => Box::new(tank::TankAI),
        Archetype::Blinker => Box::new(blinker::BlinkerAI),
        Archetype::HazardGenerator => Box::new(hazard_generator::HazardGeneratorAI),
        Archetype::Boss => Box::new(boss::BossAI),
    }
}

// ============================================================================
// Per-tick Update
// ============================================================================

/// Run decisions and ability phases for every living enemy.
pub fn update_enemies(sim: &mut Simulation, dt: f32) {
    let content = Arc::clone(&sim.content);
    let ids = sim.actor_ids_where(|a| a.is_enemy() && a.base.alive);

    for id in ids {
        // May have died earlier this tick
        let Some(actor) = sim.actor_mut(id) else {
            continue;
        };
        if !actor.base.alive {
            continue;
        }
        let stunned = actor.base.status.stunned;
        let Some(enemy) = actor.as_enemy_mut() else {
            continue;
        };
        if stunned {
            enemy.behavior = BehaviorState::Stunned;
            actor.base.velocity = Vec2::ZERO;
            continue;
        }
        if enemy.active_ability.is_some() {
            advance_ability(sim, id, dt);
            continue;
        }

        if enemy.archetype == Archetype::Boss {
            boss::update_boss_phase(sim, id, &content);
        }

        let Some(decision) = decide(sim, id, &content) else {
            continue;
        };
        apply_decision(sim, id, decision, dt);
    }
}

fn decide(sim: &Simulation, id: ActorId, content: &ContentRegistry) -> Option<EnemyDecision> {
    let actor = sim.actor(id)?;
    let enemy = actor.as_enemy()?;
    let target = sim
        .nearest_of_faction(actor.base.position, Faction::Player)
        .and_then(|(target_id, position)| {
            sim.base(target_id).map(|b| TargetInfo {
                id: target_id,
                position,
                radius: b.radius,
            })
        });

    let ctx = EnemyContext {
        self_id: id,
        position: actor.base.position,
        radius: actor.base.radius,
        health_fraction: actor.base.health_fraction(),
        target,
        enemy,
        definition: content.enemy(&enemy.definition_id),
    };
    Some(get_archetype_ai(enemy.archetype).decide_action(&ctx))
}

fn apply_decision(sim: &mut Simulation, id: ActorId, decision: EnemyDecision, dt: f32) {
    match decision {
        EnemyDecision::Idle => {
            if let Some(actor) = sim.actor_mut(id) {
                actor.base.velocity = Vec2::ZERO;
                if actor.base.animation == AnimationState::Moving {
                    actor.base.animation = AnimationState::Idle;
                }
                if let Some(enemy) = actor.as_enemy_mut() {
                    enemy.behavior = BehaviorState::Idle;
                }
            }
        }
        EnemyDecision::MoveToward(point) => move_enemy(sim, id, point, BehaviorState::Chasing, dt),
        EnemyDecision::MoveAway(from) => {
            let Some(position) = sim.position_of(id) else {
                return;
            };
            let away = geometry::direction(from, position);
            move_enemy(sim, id, position + away * 100.0, BehaviorState::Kiting, dt);
        }
        EnemyDecision::Strafe { around, clockwise } => {
            let Some(position) = sim.position_of(id) else {
                return;
            };
            let radial = geometry::direction(around, position);
            let tangent = if clockwise {
                Vec2::new(radial.y, -radial.x)
            } else {
                Vec2::new(-radial.y, radial.x)
            };
            move_enemy(sim, id, position + tangent * 100.0, BehaviorState::Strafing, dt);
        }
        EnemyDecision::BasicAttack { target } => basic_attack(sim, id, target),
        EnemyDecision::StartAbility {
            ability,
            target_pos,
            start_pos,
        } => {
            start_ability(sim, id, ability, target_pos, start_pos);
        }
    }
}

fn move_enemy(sim: &mut Simulation, id: ActorId, toward: Vec2, behavior: BehaviorState, dt: f32) {
    let Some(actor) = sim.actor_mut(id) else {
        return;
    };
    actor.base.step_toward(toward, dt);
    actor.base.position = geometry::clamp_to_arena(actor.base.position, ARENA_HALF_EXTENT);
    if let Some(enemy) = actor.as_enemy_mut() {
        enemy.behavior = behavior;
    }
}

/// Contact/melee attack on the attack timer. Runs through the pipeline.
fn basic_attack(sim: &mut Simulation, id: ActorId, target: ActorId) {
    let Some(actor) = sim.actor_mut(id) else {
        return;
    };
    actor.base.velocity = Vec2::ZERO;
    let Some(enemy) = actor.as_enemy_mut() else {
        return;
    };
    enemy.behavior = BehaviorState::Attacking;
    if enemy.attack_timer > 0.0 {
        return;
    }
    enemy.attack_timer = enemy.attack_cooldown;
    let damage = enemy.contact_damage;
    actor.base.animation = AnimationState::Attacking;

    let event = DamageEvent::physical(id, target, damage).with_tag(DamageTag::Melee);
    combat_core::resolve(sim, event, None);
}

// ============================================================================
// Ability Lifecycle
// ============================================================================

/// Begin an ability: snapshot positions, start the cooldown, enter telegraph.
///
/// Refuses (returns false) if the enemy is dead, missing, or already has an
/// ability in flight.
pub fn start_ability(
    sim: &mut Simulation,
    id: ActorId,
    kind: AbilityKind,
    target_pos: Option<Vec2>,
    start_pos: Option<Vec2>,
) -> bool {
    let content = Arc::clone(&sim.content);
    let Some(actor) = sim.actor_mut(id) else {
        return false;
    };
    if !actor.base.alive {
        return false;
    }
    let name = actor.name.clone();
    let Some(enemy) = actor.as_enemy_mut() else {
        return false;
    };
    if enemy.active_ability.is_some() {
        return false;
    }

    let cooldown = content
        .enemy(&enemy.definition_id)
        .and_then(|d| d.ability(kind))
        .map_or(MIN_ABILITY_COOLDOWN, |a| a.cooldown)
        .max(MIN_ABILITY_COOLDOWN);
    enemy.cooldowns.insert(kind, cooldown);
    enemy.active_ability = Some(ActiveAbility::new(kind, target_pos, start_pos));
    enemy.behavior = BehaviorState::Casting;
    actor.base.velocity = Vec2::ZERO;
    actor.base.animation = AnimationState::Telegraph;

    debug!("{} begins {}", name, kind.name());
    sim.combat_log.record(
        CombatLogEventType::AbilityUsed,
        name.clone(),
        None,
        None,
        format!("{} begins {}", name, kind.name()),
    );
    true
}

/// Advance the in-flight ability of `id` by `dt`.
pub fn advance_ability(sim: &mut Simulation, id: ActorId, dt: f32) {
    let Some(mut ability) = sim.enemy_mut(id).and_then(|e| e.active_ability.take()) else {
        return;
    };

    let step = ability.advance(dt);

    if step.entered_execute {
        if let Some(base) = sim.base_mut(id) {
            base.animation = AnimationState::Attacking;
        }
    }

    if ability.kind.is_movement() && (ability.phase == AbilityPhase::Execute || step.entered_recovery) {
        let progress = if step.entered_recovery {
            1.0
        } else {
            ability.execute_progress()
        };
        executors::move_along(sim, id, &ability, progress);
    }

    if step.fire_effect {
        executors::execute(sim, id, &mut ability);
    }

    if step.entered_recovery {
        if let Some(base) = sim.base_mut(id) {
            base.animation = AnimationState::Idle;
        }
    }

    if !sim.is_alive(id) {
        // Killed by its own effect (reflects, thorns)
        end_ability(sim, &ability);
        return;
    }

    if step.finished {
        end_ability(sim, &ability);
        if let Some(enemy) = sim.enemy_mut(id) {
            enemy.behavior = BehaviorState::Idle;
        }
        return;
    }

    if let Some(enemy) = sim.enemy_mut(id) {
        enemy.active_ability = Some(ability);
    }
}

/// Drop an in-flight ability without running it (death).
pub fn cancel_ability(sim: &mut Simulation, id: ActorId) {
    let ability = sim.enemy_mut(id).and_then(|e| e.active_ability.take());
    if let Some(ability) = ability {
        end_ability(sim, &ability);
    }
}

/// Release anything the ability holds on other actors.
fn end_ability(sim: &mut Simulation, ability: &ActiveAbility) {
    if let Some(stunned) = ability.stunned_target {
        status_effects::remove(sim, stunned, StatusKind::Stun);
    }
}
