//! Summon tick updater: lifetime, conditional multiplier, chase and bite.

use super::combat_core;
use super::components::*;
use super::constants::SUMMON_FOLLOW_DISTANCE;
use super::geometry;
use super::Simulation;
use crate::combat::events::{DamageEvent, DamageTag};

/// Multiplier from the owner's pack passives given how many other summons live.
pub fn pack_multiplier(passives: &[Passive], other_summons: usize) -> f32 {
    let mut multiplier = 1.0;
    for passive in passives {
        match *passive {
            Passive::PackLeader { per_ally } => multiplier += per_ally * other_summons as f32,
            Passive::LoneWolf { multiplier: lone } if other_summons == 0 => multiplier *= lone,
            _ => {}
        }
    }
    multiplier
}

pub fn update_summons(sim: &mut Simulation, dt: f32) {
    let ids = sim.actor_ids_where(|a| a.base.alive && a.is_summon());
    for id in ids {
        update_summon(sim, id, dt);
    }
}

fn update_summon(sim: &mut Simulation, id: ActorId, dt: f32) {
    let Some(owner) = sim.actor(id).and_then(Actor::as_summon).map(|s| s.owner) else {
        return;
    };
    let others = sim.living_summon_count(owner).saturating_sub(1);
    let multiplier = if owner.is_player() {
        pack_multiplier(&sim.player.state.passives, others)
    } else {
        1.0
    };

    let Some(actor) = sim.actor_mut(id) else {
        return;
    };
    if !actor.base.alive {
        return;
    }
    let position = actor.base.position;
    let radius = actor.base.radius;
    let Some(summon) = actor.as_summon_mut() else {
        return;
    };
    summon.remaining -= dt;
    summon.attack_timer = (summon.attack_timer - dt).max(0.0);
    summon.multiplier = multiplier;
    if summon.remaining <= 0.0 {
        sim.expire(id);
        return;
    }
    let (damage, attack_range, attack_cooldown, ready) = (
        summon.damage,
        summon.attack_range,
        summon.attack_cooldown,
        summon.attack_timer <= 0.0,
    );

    match sim.nearest_of_faction(position, Faction::Enemy) {
        Some((target, target_position)) => {
            let target_radius = sim.base(target).map_or(0.0, |b| b.radius);
            let gap = geometry::distance(position, target_position) - radius - target_radius;
            if gap <= attack_range {
                if ready {
                    if let Some(summon) = sim.actor_mut(id).and_then(Actor::as_summon_mut) {
                        summon.attack_timer = attack_cooldown;
                    }
                    let event = DamageEvent::physical(id, target, damage)
                        .with_tag(DamageTag::Melee)
                        .with_tag(DamageTag::Summon)
                        .named("Bite");
                    combat_core::resolve(sim, event, None);
                }
            } else if let Some(base) = sim.base_mut(id) {
                base.step_toward(target_position, dt);
            }
        }
        None => {
            let anchor = sim.position_of(owner).unwrap_or(position);
            if let Some(base) = sim.base_mut(id) {
                if geometry::distance(position, anchor) > SUMMON_FOLLOW_DISTANCE {
                    base.step_toward(anchor, dt);
                } else {
                    base.velocity = bevy::math::Vec2::ZERO;
                }
            }
        }
    }
}
