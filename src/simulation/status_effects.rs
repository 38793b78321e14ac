//! Status Effect Engine
//!
//! - [`apply`] stacks a status on an actor (clamped to its hard cap) and refreshes
//!   the duration of timed kinds
//! - [`process`] runs once per logical turn: poison and bleed deal their damage
//!   through the pipeline, then bleed decays by one stack
//! - [`tick`] counts timed statuses down every frame and clears them at zero
//!
//! Brittle is also cleared by the pipeline when it is consumed, whichever comes first.

use super::combat_core;
use super::components::{Actor, ActorId, StatusKind};
use super::constants::POISON_DAMAGE_PER_STACK;
use super::Simulation;
use crate::combat::events::{DamageEvent, DamageTag, DamageType};
use crate::combat::log::CombatLogEventType;

/// Apply `stacks` of `kind` to `target`. Returns whether the status landed
/// (the target exists and is alive).
pub fn apply(
    sim: &mut Simulation,
    target: ActorId,
    kind: StatusKind,
    stacks: u32,
    duration: f32,
    source: ActorId,
) -> bool {
    if stacks == 0 || !sim.is_damageable(target) {
        return false;
    }
    let source_name = sim.actor_name(source);
    let target_name = sim.actor_name(target);

    let Some(base) = sim.base_mut(target) else {
        return false;
    };
    if !base.alive {
        return false;
    }

    let status = &mut base.status;
    match kind {
        StatusKind::Stun => status.stunned = true,
        _ => {
            if let Some(slot) = status.slot_mut(kind) {
                slot.stacks = slot.stacks.saturating_add(stacks).min(kind.max_stacks());
                if kind.is_timed() {
                    slot.remaining = slot.remaining.max(duration);
                }
            }
        }
    }
    let attributed = (!source.is_world()).then_some(source);
    match kind {
        StatusKind::Poison => status.poison_source = attributed,
        StatusKind::Bleed => status.bleed_source = attributed,
        _ => {}
    }
    let total = status.stacks(kind);

    let message = if kind.max_stacks() > 1 {
        format!("{} is afflicted by {} ({})", target_name, kind.name(), total)
    } else {
        format!("{} is afflicted by {}", target_name, kind.name())
    };
    sim.combat_log.record(
        CombatLogEventType::AuraApplied,
        source_name,
        Some(target_name),
        Some(total as f32),
        message,
    );
    true
}

/// Remove a status outright (cleanses, expiry).
pub fn remove(sim: &mut Simulation, target: ActorId, kind: StatusKind) {
    let had = sim.base(target).is_some_and(|b| b.status.has(kind));
    if !had {
        return;
    }
    if let Some(base) = sim.base_mut(target) {
        base.status.clear(kind);
    }
    log_removed(sim, target, kind);
}

fn log_removed(sim: &mut Simulation, target: ActorId, kind: StatusKind) {
    let name = sim.actor_name(target);
    let message = format!("{} fades from {}", kind.name(), name);
    sim.combat_log.record(
        CombatLogEventType::AuraRemoved,
        name.clone(),
        Some(name),
        None,
        message,
    );
}

/// The player plus every alive, damageable actor.
fn affected_ids(sim: &Simulation) -> Vec<ActorId> {
    let mut ids = Vec::new();
    if sim.player.base.alive {
        ids.push(ActorId::PLAYER);
    }
    ids.extend(sim.actor_ids_where(|a: &Actor| a.is_damageable() && a.base.alive));
    ids
}

/// Attacker for a periodic tick: the applier if it is still alive, else `WORLD`.
fn periodic_attacker(sim: &Simulation, source: Option<ActorId>) -> ActorId {
    source
        .filter(|id| sim.is_alive(*id))
        .unwrap_or(ActorId::WORLD)
}

/// One logical turn of damage-over-time.
pub fn process(sim: &mut Simulation) {
    for id in affected_ids(sim) {
        let Some(status) = sim.base(id).map(|b| b.status.clone()) else {
            continue;
        };

        if status.poison.is_active() {
            let attacker = periodic_attacker(sim, status.poison_source);
            let damage = status.poison.stacks as f32 * POISON_DAMAGE_PER_STACK;
            let event = DamageEvent::new(attacker, id, damage, DamageType::Poison)
                .with_tag(DamageTag::Periodic)
                .named("Poison");
            combat_core::resolve(sim, event, None);
        }

        if status.bleed.is_active() {
            if sim.is_alive(id) {
                let attacker = periodic_attacker(sim, status.bleed_source);
                let event = DamageEvent::new(attacker, id, status.bleed.stacks as f32, DamageType::Bleed)
                    .with_tag(DamageTag::Periodic)
                    .named("Bleed");
                combat_core::resolve(sim, event, None);
            }

            let mut expired = false;
            if let Some(base) = sim.base_mut(id) {
                let bleed = &mut base.status.bleed;
                bleed.stacks = bleed.stacks.saturating_sub(1);
                if bleed.stacks == 0 {
                    base.status.clear(StatusKind::Bleed);
                    expired = true;
                }
            }
            if expired {
                log_removed(sim, id, StatusKind::Bleed);
            }
        }
    }
}

/// Count timed statuses down by `dt`, clearing them at zero.
pub fn tick(sim: &mut Simulation, dt: f32) {
    for id in affected_ids(sim) {
        let mut expired = Vec::new();
        if let Some(base) = sim.base_mut(id) {
            for kind in StatusKind::ALL.into_iter().filter(|k| k.is_timed()) {
                let Some(slot) = base.status.slot_mut(kind) else {
                    continue;
                };
                if !slot.is_active() {
                    continue;
                }
                slot.remaining -= dt;
                if slot.remaining <= 0.0 {
                    slot.clear();
                    expired.push(kind);
                }
            }
        }
        for kind in expired {
            log_removed(sim, id, kind);
        }
    }
}
