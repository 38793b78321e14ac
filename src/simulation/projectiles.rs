//! Projectile tick updater.
//!
//! Each tick a projectile moves, ages, and either expires (bursting into its
//! splash if it has one) or checks overlaps against living actors of the
//! opposing faction. Every actor is hit at most once per projectile.

use super::combat_core::{self, AreaAttack};
use super::components::*;
use super::constants::ARENA_HALF_EXTENT;
use super::geometry;
use super::status_effects;
use super::Simulation;
use crate::combat::events::DamageEvent;

pub fn projectile_mut(sim: &mut Simulation, id: ActorId) -> Option<&mut ProjectileState> {
    match &mut sim.actor_mut(id)?.kind {
        ActorKind::Projectile(projectile) => Some(projectile),
        _ => None,
    }
}

/// Owner if it is still alive, otherwise the environment.
fn attributed(sim: &Simulation, owner: ActorId) -> ActorId {
    if sim.is_alive(owner) {
        owner
    } else {
        ActorId::WORLD
    }
}

pub fn update_projectiles(sim: &mut Simulation, dt: f32) {
    let ids = sim.actor_ids_where(|a| a.base.alive && matches!(a.kind, ActorKind::Projectile(_)));
    for id in ids {
        update_projectile(sim, id, dt);
    }
}

fn update_projectile(sim: &mut Simulation, id: ActorId, dt: f32) {
    let Some(actor) = sim.actor_mut(id) else {
        return;
    };
    actor.base.position += actor.base.velocity * dt;
    let position = actor.base.position;
    let radius = actor.base.radius;
    let faction = actor.base.faction;
    let name = actor.name.clone();
    let ActorKind::Projectile(projectile) = &mut actor.kind else {
        return;
    };
    projectile.lifetime -= dt;
    let state = projectile.clone();

    let out_of_bounds = position.x.abs() > ARENA_HALF_EXTENT || position.y.abs() > ARENA_HALF_EXTENT;
    if state.lifetime <= 0.0 || out_of_bounds {
        if let Some(splash) = state.splash {
            let burst = AreaAttack::new(
                attributed(sim, state.owner),
                faction.opposing(),
                position,
                splash.radius,
                splash.damage,
                state.damage_type,
            )
            .named(name);
            combat_core::resolve_area(sim, &burst, None);
        }
        sim.expire(id);
        return;
    }

    let candidates: Vec<ActorId> = sim
        .damageable_ids(faction.opposing())
        .into_iter()
        .filter(|target| !state.hit.contains(target))
        .filter(|target| {
            sim.base(*target)
                .is_some_and(|b| geometry::circles_overlap(position, radius, b.position, b.radius))
        })
        .collect();

    for target in candidates {
        if !sim.is_alive(target) {
            continue;
        }
        let attacker = attributed(sim, state.owner);
        let event = DamageEvent::new(attacker, target, state.damage, state.damage_type)
            .from_projectile()
            .named(name.clone());
        let result = combat_core::resolve(sim, event, None);

        if let Some(projectile) = projectile_mut(sim, id) {
            projectile.hit.push(target);
        }

        if result.landed() {
            if let Some(status) = state.on_hit_status {
                status_effects::apply(sim, target, status.kind, status.stacks, status.duration, attacker);
            }
        }
        if let Some(spec) = state.impact_hazard {
            let at = sim.position_of(target).unwrap_or(position);
            sim.spawn_hazard(state.owner, &name, at, spec, false);
        }

        if !state.piercing {
            sim.expire(id);
            return;
        }
    }
}
