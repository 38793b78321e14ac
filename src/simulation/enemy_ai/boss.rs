//! Boss AI Module
//!
//! Bosses carry an ordered list of phases, each gated by a health threshold and
//! owning its own ability list.
//!
//! ## Priority Order
//! 1. First off-cooldown ability of the current phase whose range covers the target
//! 2. Basic attack
//! 3. Chase

use bevy::prelude::*;

use super::abilities::AbilityKind;
use super::{ArchetypeAI, EnemyContext, EnemyDecision};
use crate::combat::log::CombatLogEventType;
use crate::simulation::components::ActorId;
use crate::simulation::content::{BossPhase, ContentRegistry};
use crate::simulation::Simulation;

/// Index of the phase for `hp_ratio`: the highest index whose threshold is at
/// least the ratio. Falls back to the first phase.
pub fn select_boss_phase(phases: &[BossPhase], hp_ratio: f32) -> usize {
    phases
        .iter()
        .rposition(|p| p.hp_threshold >= hp_ratio)
        .unwrap_or(0)
}

/// Re-evaluate the boss's phase and log a transition.
pub fn update_boss_phase(sim: &mut Simulation, id: ActorId, content: &ContentRegistry) {
    let Some(actor) = sim.actor(id) else {
        return;
    };
    let Some(enemy) = actor.as_enemy() else {
        return;
    };
    let Some(definition) = content.enemy(&enemy.definition_id) else {
        return;
    };
    if definition.phases.is_empty() {
        return;
    }

    let next = select_boss_phase(&definition.phases, actor.base.health_fraction());
    if enemy.boss_phase == Some(next) {
        return;
    }

    let name = actor.name.clone();
    let phase_name = definition.phases[next].name.clone();
    if let Some(enemy) = sim.enemy_mut(id) {
        enemy.boss_phase = Some(next);
    }

    info!("{} enters phase {}: {}", name, next + 1, phase_name);
    sim.combat_log.record(
        CombatLogEventType::PhaseChange,
        name.clone(),
        None,
        Some((next + 1) as f32),
        format!("{} enters {}", name, phase_name),
    );
}

/// Abilities aimed at the boss's own position rather than the target.
fn self_targeted(kind: AbilityKind) -> bool {
    matches!(kind, AbilityKind::Quake | AbilityKind::SummonBrood)
}

pub struct BossAI;

impl ArchetypeAI for BossAI {
    fn decide_action(&self, ctx: &EnemyContext) -> EnemyDecision {
        let Some(target) = ctx.target else {
            return EnemyDecision::Idle;
        };

        let phase = ctx.definition.and_then(|d| {
            let index = ctx.enemy.boss_phase.unwrap_or(0);
            d.phases.get(index)
        });

        if let Some(phase) = phase {
            for &kind in &phase.abilities {
                if !ctx.ability_ready(kind) {
                    continue;
                }
                let target_pos = if self_targeted(kind) {
                    ctx.position
                } else {
                    target.position
                };
                return EnemyDecision::StartAbility {
                    ability: kind,
                    target_pos: Some(target_pos),
                    start_pos: kind.needs_start_position().then_some(ctx.position),
                };
            }
        }

        if ctx.in_attack_range() {
            return EnemyDecision::BasicAttack { target: target.id };
        }

        EnemyDecision::MoveToward(target.position)
    }
}
