//! Hazard tick updater.
//!
//! Hazards are stationary (or owner-attached) zones that pulse on a fixed
//! interval until their duration runs out.

use super::combat_core::{self, AreaAttack};
use super::components::*;
use super::status_effects;
use super::Simulation;

fn hazard_mut(sim: &mut Simulation, id: ActorId) -> Option<&mut HazardState> {
    match &mut sim.actor_mut(id)?.kind {
        ActorKind::Hazard(hazard) => Some(hazard),
        _ => None,
    }
}

pub fn update_hazards(sim: &mut Simulation, dt: f32) {
    let ids = sim.actor_ids_where(|a| a.base.alive && matches!(a.kind, ActorKind::Hazard(_)));
    for id in ids {
        update_hazard(sim, id, dt);
    }
}

fn update_hazard(sim: &mut Simulation, id: ActorId, dt: f32) {
    let Some(state) = sim.actor(id).and_then(|a| match &a.kind {
        ActorKind::Hazard(hazard) => Some(hazard.clone()),
        _ => None,
    }) else {
        return;
    };

    if state.attached {
        match sim.position_of(state.owner).filter(|_| sim.is_alive(state.owner)) {
            Some(owner_position) => {
                if let Some(base) = sim.base_mut(id) {
                    base.position = owner_position;
                }
            }
            None => {
                sim.expire(id);
                return;
            }
        }
    }

    let mut pulse = false;
    let mut expired = false;
    if let Some(hazard) = hazard_mut(sim, id) {
        hazard.duration -= dt;
        hazard.tick_timer -= dt;
        if hazard.tick_timer <= 0.0 {
            hazard.tick_timer += hazard.tick_interval;
            pulse = true;
        }
        expired = hazard.duration <= 0.0;
    }

    if pulse {
        pulse_hazard(sim, id, &state);
    }
    if expired {
        sim.expire(id);
    }
}

fn pulse_hazard(sim: &mut Simulation, id: ActorId, state: &HazardState) {
    let Some(actor) = sim.actor(id) else {
        return;
    };
    let center = actor.base.position;
    let faction = actor.base.faction;
    let name = actor.name.clone();
    let source = if sim.is_alive(state.owner) {
        state.owner
    } else {
        ActorId::WORLD
    };

    match state.effect {
        HazardEffect::Damage => {
            let attack = AreaAttack::new(
                source,
                faction.opposing(),
                center,
                state.radius,
                state.amount,
                state.damage_type,
            )
            .named(name);
            combat_core::resolve_area(sim, &attack, None);
        }
        HazardEffect::Heal => {
            for target in sim.targets_in_radius(center, state.radius, faction) {
                combat_core::heal(sim, source, target, state.amount, &name);
            }
        }
        HazardEffect::Debuff(application) => {
            for target in sim.targets_in_radius(center, state.radius, faction.opposing()) {
                status_effects::apply(
                    sim,
                    target,
                    application.kind,
                    application.stacks,
                    application.duration,
                    source,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::events::DamageType;
    use crate::simulation::content::ContentRegistry;
    use bevy::math::Vec2;

    fn spec(effect: HazardEffect) -> HazardSpec {
        HazardSpec {
            effect,
            damage_type: DamageType::Poison,
            amount: 5.0,
            tick_interval: 0.5,
            duration: 1.0,
            radius: 40.0,
        }
    }

    #[test]
    fn test_damage_zone_pulses_on_interval_and_expires() {
        let mut sim = Simulation::seeded(ContentRegistry::default(), 5);
        let base = ActorBase::new(Faction::Enemy, Vec2::new(10.0, 0.0), 100.0, 10.0, 0.0);
        let enemy = sim.insert_actor(
            "Dummy",
            base,
            ActorKind::Enemy(EnemyState::new("dummy", Archetype::Tank)),
        );
        let zone = sim.spawn_hazard(ActorId::PLAYER, "Cloud", Vec2::ZERO, spec(HazardEffect::Damage), false);

        for _ in 0..29 {
            update_hazards(&mut sim, 1.0 / 60.0);
        }
        assert_eq!(sim.base(enemy).unwrap().health, 100.0, "no pulse before the interval");
        update_hazards(&mut sim, 1.0 / 60.0);
        update_hazards(&mut sim, 1.0 / 60.0);
        assert_eq!(sim.base(enemy).unwrap().health, 95.0);

        for _ in 0..40 {
            update_hazards(&mut sim, 1.0 / 60.0);
        }
        assert!(!sim.is_alive(zone));
    }

    #[test]
    fn test_debuff_zone_reaches_player() {
        let mut sim = Simulation::seeded(ContentRegistry::default(), 5);
        let slow = StatusApplication {
            kind: StatusKind::Slow,
            stacks: 1,
            duration: 2.0,
        };
        let owner = sim.insert_actor(
            "Caster",
            ActorBase::new(Faction::Enemy, Vec2::new(300.0, 0.0), 50.0, 10.0, 0.0),
            ActorKind::Enemy(EnemyState::new("dummy", Archetype::HazardGenerator)),
        );
        sim.spawn_hazard(owner, "Mire", sim.player.base.position, spec(HazardEffect::Debuff(slow)), false);
        for _ in 0..31 {
            update_hazards(&mut sim, 1.0 / 60.0);
        }
        assert!(sim.player.base.status.has(StatusKind::Slow));
    }
}
