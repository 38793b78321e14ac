//! Integration tests for the damage pipeline
//!
//! These tests verify that:
//! - Armor, shields and vulnerability statuses mitigate in the documented order
//! - Final damage never drops below the floor once armor applied
//! - Armor never removes more than the reduction cap
//! - Preconditions reject dead attackers and targets, but always accept WORLD

use bevy::math::Vec2;
use roguesim::combat::events::{DamageEvent, DamageTag, DamageType};
use roguesim::simulation::combat_core::{self, armor_reduction};
use roguesim::simulation::components::*;
use roguesim::simulation::constants::*;
use roguesim::simulation::status_effects;
use roguesim::{ContentRegistry, Simulation};

fn sim() -> Simulation {
    Simulation::seeded(ContentRegistry::default(), 1234)
}

fn spawn_dummy(sim: &mut Simulation, armor: f32) -> ActorId {
    let base = ActorBase::new(Faction::Enemy, Vec2::new(60.0, 0.0), 100.0, 12.0, 0.0).with_armor(armor);
    sim.insert_actor(
        "Training Dummy",
        base,
        ActorKind::Enemy(EnemyState::new("dummy", Archetype::Tank)),
    )
}

fn health(sim: &Simulation, id: ActorId) -> f32 {
    sim.base(id).map(|b| b.health).unwrap_or(-1.0)
}

// =============================================================================
// Reference Scenarios
// =============================================================================

#[test]
fn test_unarmored_physical_hit() {
    let mut sim = sim();
    let dummy = spawn_dummy(&mut sim, 0.0);
    let result = combat_core::resolve(&mut sim, DamageEvent::physical(ActorId::PLAYER, dummy, 10.0), None);
    assert_eq!(result.final_damage, 10.0);
    assert_eq!(health(&sim, dummy), 90.0);
}

#[test]
fn test_armor_reduction_capped() {
    let mut sim = sim();
    let dummy = spawn_dummy(&mut sim, 20.0);
    let result = combat_core::resolve(&mut sim, DamageEvent::physical(ActorId::PLAYER, dummy, 10.0), None);
    assert_eq!(result.final_damage, 3.0, "min(20 x 0.5, 10 x 0.7) = 7 reduced");
    assert_eq!(health(&sim, dummy), 97.0);
}

#[test]
fn test_shield_absorbs_before_health() {
    let mut sim = sim();
    let dummy = spawn_dummy(&mut sim, 0.0);
    sim.base_mut(dummy).unwrap().shield = 5.0;
    let result = combat_core::resolve(&mut sim, DamageEvent::physical(ActorId::PLAYER, dummy, 8.0), None);
    assert_eq!(result.absorbed, 5.0);
    assert_eq!(result.health_damage(), 3.0);
    assert_eq!(sim.base(dummy).unwrap().shield, 0.0);
    assert_eq!(health(&sim, dummy), 97.0);
}

#[test]
fn test_brittle_is_consumed_by_one_hit() {
    let mut sim = sim();
    let dummy = spawn_dummy(&mut sim, 0.0);
    status_effects::apply(&mut sim, dummy, StatusKind::Brittle, 1, 5.0, ActorId::PLAYER);

    let first = combat_core::resolve(&mut sim, DamageEvent::physical(ActorId::PLAYER, dummy, 10.0), None);
    assert_eq!(first.final_damage, 15.0);
    assert!(!sim.base(dummy).unwrap().status.has(StatusKind::Brittle));

    let second = combat_core::resolve(&mut sim, DamageEvent::physical(ActorId::PLAYER, dummy, 10.0), None);
    assert_eq!(second.final_damage, 10.0);
    assert_eq!(health(&sim, dummy), 75.0);
}

#[test]
fn test_shatter_alternates_with_brittle_consumption() {
    let mut sim = sim();
    let dummy = spawn_dummy(&mut sim, 0.0);
    sim.player.state.passives.push(Passive::Shatter { duration: 3.0 });

    let damages: Vec<f32> = (0..4)
        .map(|_| {
            combat_core::resolve(&mut sim, DamageEvent::physical(ActorId::PLAYER, dummy, 10.0), None).final_damage
        })
        .collect();

    // The hit that spends Brittle never re-applies it
    assert_eq!(damages, vec![10.0, 15.0, 10.0, 15.0]);
    assert_eq!(health(&sim, dummy), 50.0);
}

// =============================================================================
// Floors, Ceilings and Modifiers
// =============================================================================

#[test]
fn test_health_never_negative() {
    let mut sim = sim();
    let dummy = spawn_dummy(&mut sim, 0.0);
    let result = combat_core::resolve(&mut sim, DamageEvent::physical(ActorId::PLAYER, dummy, 10_000.0), None);
    assert!(result.killed);
    assert_eq!(health(&sim, dummy), 0.0);
}

#[test]
fn test_heavy_armor_still_deals_minimum() {
    let mut sim = sim();
    let dummy = spawn_dummy(&mut sim, 1_000.0);
    let result = combat_core::resolve(&mut sim, DamageEvent::physical(ActorId::PLAYER, dummy, 1.0), None);
    assert_eq!(result.final_damage, MIN_MITIGATED_DAMAGE);
}

#[test]
fn test_reduction_ceiling_over_many_values() {
    for raw in [2.0_f32, 7.0, 19.0, 120.0] {
        for armor in [0.0_f32, 5.0, 40.0, 500.0] {
            let reduction = armor_reduction(raw, armor);
            assert!(
                reduction <= raw * MAX_DAMAGE_REDUCTION + 1e-4,
                "armor {} removed {} of {}",
                armor,
                reduction,
                raw
            );
        }
    }
}

#[test]
fn test_armor_ignores_non_physical() {
    let mut sim = sim();
    let dummy = spawn_dummy(&mut sim, 50.0);
    let event = DamageEvent::new(ActorId::PLAYER, dummy, 10.0, DamageType::Fire);
    let result = combat_core::resolve(&mut sim, event, None);
    assert_eq!(result.final_damage, 10.0);
}

#[test]
fn test_weakened_attacker_and_exposed_target() {
    let mut sim = sim();
    let dummy = spawn_dummy(&mut sim, 0.0);
    status_effects::apply(&mut sim, ActorId::PLAYER, StatusKind::Weaken, 1, 5.0, dummy);
    status_effects::apply(&mut sim, dummy, StatusKind::Exposed, 1, 5.0, ActorId::PLAYER);
    let result = combat_core::resolve(&mut sim, DamageEvent::physical(ActorId::PLAYER, dummy, 20.0), None);
    // 20 x 0.75 x 1.25 = 18.75
    assert_eq!(result.final_damage, 19.0);
}

#[test]
fn test_true_damage_skips_mitigation() {
    let mut sim = sim();
    let dummy = spawn_dummy(&mut sim, 100.0);
    status_effects::apply(&mut sim, dummy, StatusKind::Brittle, 1, 5.0, ActorId::PLAYER);
    let event = DamageEvent::new(ActorId::PLAYER, dummy, 10.0, DamageType::True);
    let result = combat_core::resolve(&mut sim, event, None);
    assert_eq!(result.final_damage, 10.0);
    assert!(sim.base(dummy).unwrap().status.has(StatusKind::Brittle), "true damage doesn't consume brittle");
}

// =============================================================================
// Preconditions and Avoidance
// =============================================================================

#[test]
fn test_world_attacker_always_valid() {
    let mut sim = sim();
    let dummy = spawn_dummy(&mut sim, 0.0);
    let event = DamageEvent::new(ActorId::WORLD, dummy, 4.0, DamageType::Poison).with_tag(DamageTag::Periodic);
    let result = combat_core::resolve(&mut sim, event, None);
    assert_eq!(result.final_damage, 4.0);
}

#[test]
fn test_dead_attacker_is_rejected() {
    let mut sim = sim();
    let attacker = spawn_dummy(&mut sim, 0.0);
    sim.base_mut(attacker).unwrap().mark_dead();
    let result = combat_core::resolve(&mut sim, DamageEvent::physical(attacker, ActorId::PLAYER, 10.0), None);
    assert!(!result.landed());
    assert_eq!(sim.player.base.health, sim.player.base.max_health);
}

#[test]
fn test_player_invulnerability_after_hit() {
    let mut sim = sim();
    let enemy = spawn_dummy(&mut sim, 0.0);
    let first = combat_core::resolve(&mut sim, DamageEvent::physical(enemy, ActorId::PLAYER, 10.0), None);
    assert!(first.landed());
    let second = combat_core::resolve(&mut sim, DamageEvent::physical(enemy, ActorId::PLAYER, 10.0), None);
    assert!(second.dodged, "hit during invulnerability is avoided");
    assert_eq!(sim.player.base.health, 90.0);
}

#[test]
fn test_periodic_damage_grants_no_invulnerability() {
    let mut sim = sim();
    let event = DamageEvent::new(ActorId::WORLD, ActorId::PLAYER, 3.0, DamageType::Poison).with_tag(DamageTag::Periodic);
    combat_core::resolve(&mut sim, event, None);
    assert_eq!(sim.player.base.invulnerable_timer, 0.0);
}

#[test]
fn test_hunters_mark_bonus_on_marked_target() {
    let mut sim = sim();
    let dummy = spawn_dummy(&mut sim, 0.0);
    sim.base_mut(dummy).unwrap().add_tag(Tag::Marked);
    sim.player.state.items.push(Item::HuntersMark { bonus: 0.5 });
    let result = combat_core::resolve(&mut sim, DamageEvent::physical(ActorId::PLAYER, dummy, 10.0), None);
    assert_eq!(result.final_damage, 15.0);
}
