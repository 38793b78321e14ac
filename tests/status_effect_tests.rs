//! Integration tests for the status effect engine
//!
//! These tests verify that:
//! - Every status kind is clamped to its hard cap
//! - Poison ticks through the pipeline without decaying
//! - Orphaned damage-over-time is attributed to the environment
//! - Slow, root and stun feed the movement and action queries

use bevy::math::Vec2;
use roguesim::combat::log::CombatLogEventType;
use roguesim::simulation::components::*;
use roguesim::simulation::constants::*;
use roguesim::simulation::status_effects;
use roguesim::{ContentRegistry, Simulation};

fn sim_with_dummy() -> (Simulation, ActorId) {
    let mut sim = Simulation::seeded(ContentRegistry::default(), 3);
    let base = ActorBase::new(Faction::Enemy, Vec2::new(80.0, 0.0), 200.0, 10.0, 100.0);
    let id = sim.insert_actor(
        "Dummy",
        base,
        ActorKind::Enemy(EnemyState::new("dummy", Archetype::Tank)),
    );
    (sim, id)
}

// =============================================================================
// Caps
// =============================================================================

#[test]
fn test_every_kind_is_clamped() {
    let (mut sim, id) = sim_with_dummy();
    for kind in StatusKind::ALL {
        for _ in 0..5 {
            status_effects::apply(&mut sim, id, kind, 50, 3.0, ActorId::PLAYER);
        }
        let stacks = sim.base(id).unwrap().status.stacks(kind);
        assert_eq!(stacks, kind.max_stacks(), "{:?} should clamp to {}", kind, kind.max_stacks());
    }
}

#[test]
fn test_documented_caps() {
    assert_eq!(StatusKind::Poison.max_stacks(), 20);
    assert_eq!(StatusKind::Bleed.max_stacks(), 10);
    assert_eq!(StatusKind::Slow.max_stacks(), 5);
    assert_eq!(StatusKind::Brittle.max_stacks(), 1);
    assert_eq!(StatusKind::Exposed.max_stacks(), 1);
    assert_eq!(StatusKind::Weaken.max_stacks(), 1);
    assert_eq!(StatusKind::Root.max_stacks(), 1);
}

// =============================================================================
// Periodic Damage
// =============================================================================

#[test]
fn test_poison_ticks_without_decay() {
    let (mut sim, id) = sim_with_dummy();
    status_effects::apply(&mut sim, id, StatusKind::Poison, 4, 0.0, ActorId::PLAYER);
    for _ in 0..3 {
        status_effects::process(&mut sim);
    }
    let base = sim.base(id).unwrap();
    assert_eq!(base.health, 200.0 - 3.0 * 4.0 * POISON_DAMAGE_PER_STACK);
    assert_eq!(base.status.poison.stacks, 4);
}

#[test]
fn test_orphaned_poison_is_environment_damage() {
    let (mut sim, id) = sim_with_dummy();
    let caster = sim.insert_actor(
        "Caster",
        ActorBase::new(Faction::Player, Vec2::ZERO, 10.0, 8.0, 0.0),
        ActorKind::Summon(SummonState {
            owner: ActorId::PLAYER,
            remaining: 10.0,
            damage: 1.0,
            attack_range: 10.0,
            attack_cooldown: 1.0,
            attack_timer: 0.0,
            multiplier: 1.0,
        }),
    );
    status_effects::apply(&mut sim, id, StatusKind::Poison, 2, 0.0, caster);
    sim.base_mut(caster).unwrap().mark_dead();

    status_effects::process(&mut sim);

    let hit = sim
        .combat_log
        .filter_by_type(CombatLogEventType::Damage)
        .into_iter()
        .last()
        .map(|e| e.source.clone());
    assert_eq!(hit.as_deref(), Some("Environment"));
    assert_eq!(sim.base(id).unwrap().health, 198.0);
}

#[test]
fn test_simulation_processes_once_per_interval() {
    let (mut sim, id) = sim_with_dummy();
    status_effects::apply(&mut sim, id, StatusKind::Poison, 5, 0.0, ActorId::PLAYER);
    let ticks = (STATUS_PROCESS_INTERVAL / FIXED_DT).round() as usize;
    for _ in 0..(ticks - 1) {
        sim.tick(FIXED_DT);
    }
    assert_eq!(sim.base(id).unwrap().health, 200.0, "no poison before a full interval");

    sim.tick(FIXED_DT);
    sim.tick(FIXED_DT);
    assert_eq!(sim.base(id).unwrap().health, 195.0, "one pass after the interval");
}

// =============================================================================
// Derived Queries
// =============================================================================

#[test]
fn test_slow_has_a_floor() {
    let (mut sim, id) = sim_with_dummy();
    status_effects::apply(&mut sim, id, StatusKind::Slow, 5, 3.0, ActorId::PLAYER);
    let status = &sim.base(id).unwrap().status;
    assert!((status.speed_multiplier() - MIN_SLOW_MULTIPLIER).abs() < 1e-5);
}

#[test]
fn test_root_and_stun() {
    let (mut sim, id) = sim_with_dummy();
    status_effects::apply(&mut sim, id, StatusKind::Root, 1, 1.0, ActorId::PLAYER);
    {
        let status = &sim.base(id).unwrap().status;
        assert!(!status.can_move());
        assert!(status.can_act());
        assert_eq!(status.speed_multiplier(), 0.0);
    }
    status_effects::apply(&mut sim, id, StatusKind::Stun, 1, 0.0, ActorId::PLAYER);
    assert!(!sim.base(id).unwrap().status.can_act());

    status_effects::remove(&mut sim, id, StatusKind::Stun);
    assert!(sim.base(id).unwrap().status.can_act());
}

#[test]
fn test_expiry_is_logged() {
    let (mut sim, id) = sim_with_dummy();
    status_effects::apply(&mut sim, id, StatusKind::Exposed, 1, 0.1, ActorId::PLAYER);
    status_effects::tick(&mut sim, 0.2);
    let faded = sim
        .combat_log
        .filter_by_type(CombatLogEventType::AuraRemoved)
        .iter()
        .any(|e| e.message == "Exposed fades from Dummy");
    assert!(faded);
}
