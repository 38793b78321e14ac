//! Ability effects.
//!
//! Executors act only on the positions snapshotted when the ability started,
//! never on the target's live position. An ability whose required snapshot is
//! missing does nothing.

use bevy::prelude::*;
use std::f32::consts::TAU;

use super::abilities::{AbilityKind, ActiveAbility};
use crate::combat::events::{DamageTag, DamageType};
use crate::simulation::combat_core::{self, AreaAttack};
use crate::simulation::components::*;
use crate::simulation::constants::*;
use crate::simulation::geometry;
use crate::simulation::projectiles;
use crate::simulation::spawn;
use crate::simulation::status_effects;
use crate::simulation::Simulation;

/// Extra reach for melee strikes beyond the caster's radius
const STRIKE_REACH: f32 = 26.0;
const SPIT_SPREAD: f32 = 0.2;
const SPIT_SPEED: f32 = 260.0;
const BARRAGE_COUNT: usize = 12;
const BARRAGE_SPEED: f32 = 220.0;
const ERUPTION_COUNT: usize = 3;
const ERUPTION_SPREAD: f32 = 70.0;
const GROUND_SLAM_ROOT: f32 = 1.0;
const BROOD_PER_CAST: usize = 2;

/// Tuning resolved for one cast: content values, with per-kind fallbacks.
#[derive(Debug, Clone, Copy)]
struct Tuning {
    damage: f32,
    radius: f32,
}

fn default_radius(kind: AbilityKind) -> f32 {
    match kind {
        AbilityKind::GroundSlam => 90.0,
        AbilityKind::ToxicPool => 60.0,
        AbilityKind::Eruption => 50.0,
        AbilityKind::Quake => 160.0,
        _ => 0.0,
    }
}

fn tuning(sim: &Simulation, id: ActorId, kind: AbilityKind) -> Tuning {
    let enemy = sim.enemy(id);
    let loadout = enemy
        .and_then(|e| sim.content.enemy(&e.definition_id))
        .and_then(|d| d.ability(kind));
    let fallback_damage = enemy.map_or(0.0, |e| e.contact_damage);
    Tuning {
        damage: loadout.map_or(fallback_damage, |l| l.damage),
        radius: loadout
            .map(|l| l.radius)
            .filter(|r| *r > 0.0)
            .unwrap_or_else(|| default_radius(kind)),
    }
}

fn requires_target(kind: AbilityKind) -> bool {
    !matches!(
        kind,
        AbilityKind::Barrage | AbilityKind::SummonBrood | AbilityKind::Quake
    )
}

/// Interpolate a movement ability between its snapshots.
pub fn move_along(sim: &mut Simulation, id: ActorId, ability: &ActiveAbility, progress: f32) {
    let (Some(start), Some(target)) = (ability.start_pos, ability.target_pos) else {
        return;
    };
    if let Some(base) = sim.base_mut(id) {
        let next = geometry::clamp_to_arena(geometry::lerp(start, target, progress), ARENA_HALF_EXTENT);
        base.facing = geometry::facing_angle(target - start);
        base.position = next;
    }
}

/// Apply the ability's effect. Called exactly once per cast.
pub fn execute(sim: &mut Simulation, id: ActorId, ability: &mut ActiveAbility) {
    let kind = ability.kind;
    if requires_target(kind) && ability.target_pos.is_none()
        || kind.needs_start_position() && ability.start_pos.is_none()
    {
        warn!(
            "{} skipped {}: no position snapshot",
            sim.actor_name(id),
            kind.name()
        );
        return;
    }
    let Some(position) = sim.position_of(id) else {
        return;
    };
    let tuning = tuning(sim, id, kind);
    let target = ability.target_pos.unwrap_or(position);

    match kind {
        AbilityKind::Lunge | AbilityKind::BossCharge => {
            strike(sim, id, position, tuning.damage, kind);
        }
        AbilityKind::Blink => {
            if let Some(base) = sim.base_mut(id) {
                base.position = geometry::clamp_to_arena(target, ARENA_HALF_EXTENT);
            }
            strike(sim, id, target, tuning.damage, kind);
        }
        AbilityKind::SpitVolley => {
            let aim = geometry::direction(position, target);
            let base_angle = geometry::facing_angle(aim);
            for offset in [-SPIT_SPREAD, 0.0, SPIT_SPREAD] {
                let dir = Vec2::from_angle(base_angle + offset);
                let shot = sim.spawn_projectile(
                    id,
                    "Spit",
                    position,
                    dir * SPIT_SPEED,
                    tuning.damage,
                    DamageType::Poison,
                    2.0,
                );
                if let Some(projectile) = projectiles::projectile_mut(sim, shot) {
                    projectile.on_hit_status = Some(StatusApplication {
                        kind: StatusKind::Poison,
                        stacks: 1,
                        duration: 0.0,
                    });
                }
            }
        }
        AbilityKind::GroundSlam => {
            let slam = AreaAttack::new(
                id,
                Faction::Player,
                target,
                tuning.radius,
                tuning.damage,
                DamageType::Physical,
            )
            .named(kind.name());
            let hits = combat_core::resolve_area(sim, &slam, None);
            for hit in hits {
                status_effects::apply(sim, hit, StatusKind::Root, 1, GROUND_SLAM_ROOT, id);
            }
        }
        AbilityKind::ToxicPool => {
            let spec = HazardSpec {
                effect: HazardEffect::Damage,
                damage_type: DamageType::Poison,
                amount: tuning.damage,
                tick_interval: 0.5,
                duration: 4.0,
                radius: tuning.radius,
            };
            sim.spawn_hazard(id, kind.name(), target, spec, false);
        }
        AbilityKind::Barrage => {
            for i in 0..BARRAGE_COUNT {
                let dir = Vec2::from_angle(TAU * i as f32 / BARRAGE_COUNT as f32);
                sim.spawn_projectile(
                    id,
                    "Barrage Shard",
                    position,
                    dir * BARRAGE_SPEED,
                    tuning.damage,
                    DamageType::Physical,
                    3.0,
                );
            }
        }
        AbilityKind::Eruption => {
            let offset = sim.rng.random_range(0.0, TAU);
            for i in 0..ERUPTION_COUNT {
                let angle = offset + TAU * i as f32 / ERUPTION_COUNT as f32;
                let at = if i == 0 {
                    target
                } else {
                    geometry::point_on_ring(target, ERUPTION_SPREAD, angle)
                };
                let spec = HazardSpec {
                    effect: HazardEffect::Damage,
                    damage_type: DamageType::Fire,
                    amount: tuning.damage,
                    tick_interval: 0.5,
                    duration: 3.0,
                    radius: tuning.radius,
                };
                sim.spawn_hazard(id, kind.name(), at, spec, false);
            }
        }
        AbilityKind::SummonBrood => summon_brood(sim, id, position),
        AbilityKind::Quake => {
            let quake = AreaAttack::new(
                id,
                Faction::Player,
                position,
                tuning.radius,
                tuning.damage,
                DamageType::Physical,
            )
            .named(kind.name());
            let hits = combat_core::resolve_area(sim, &quake, None);
            if hits.contains(&ActorId::PLAYER)
                && status_effects::apply(sim, ActorId::PLAYER, StatusKind::Stun, 1, 0.0, id)
            {
                ability.stunned_target = Some(ActorId::PLAYER);
            }
        }
    }
}

/// Melee strike around `center` against the player's side.
fn strike(sim: &mut Simulation, id: ActorId, center: Vec2, damage: f32, kind: AbilityKind) {
    let reach = sim.base(id).map_or(0.0, |b| b.radius) + STRIKE_REACH;
    let attack = AreaAttack::new(id, Faction::Player, center, reach, damage, DamageType::Physical)
        .with_tag(DamageTag::Melee)
        .named(kind.name());
    combat_core::resolve_area(sim, &attack, None);
}

fn summon_brood(sim: &mut Simulation, id: ActorId, position: Vec2) {
    let minion = sim
        .enemy(id)
        .and_then(|e| sim.content.enemy(&e.definition_id))
        .and_then(|d| d.minion.clone());
    let Some(minion) = minion else {
        warn!("{} has no minion to summon", sim.actor_name(id));
        return;
    };
    let brood = sim
        .actor_ids_where(|a| a.is_enemy() && a.base.alive && a.base.has_tag(Tag::Minion))
        .len();
    let count = BROOD_PER_CAST.min(MAX_BROOD_MINIONS.saturating_sub(brood));
    let radius = sim.base(id).map_or(0.0, |b| b.radius) + 30.0;
    for i in 0..count {
        let angle = TAU * i as f32 / BROOD_PER_CAST as f32;
        let at = geometry::point_on_ring(position, radius, angle);
        spawn::spawn_minion(sim, &minion, at);
    }
}
