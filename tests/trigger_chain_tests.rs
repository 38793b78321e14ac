//! Integration tests for reactive trigger chains
//!
//! These tests verify that:
//! - Self-triggering effects stop at the per-kind and depth caps
//! - Spawns caused by one event stop at the spawn cap
//! - A target dies (and fires its death reactions) exactly once
//! - Reflected damage is never reflected back
//! - Chain telemetry records the depth reached by externally-initiated events
//! - Player-owned summons carry the player's on-hit passives

use bevy::math::Vec2;
use roguesim::combat::events::{DamageEvent, DamageType};
use roguesim::combat::log::CombatLogEventType;
use roguesim::simulation::combat_core;
use roguesim::simulation::components::*;
use roguesim::simulation::constants::*;
use roguesim::simulation::status_effects;
use roguesim::simulation::trigger_context::{TriggerContext, TriggerKind};
use roguesim::{ContentRegistry, Simulation};

fn sim() -> Simulation {
    Simulation::seeded(ContentRegistry::default(), 77)
}

fn spawn_enemy(sim: &mut Simulation, at: Vec2, health: f32, tags: &[Tag]) -> ActorId {
    let base = ActorBase::new(Faction::Enemy, at, health, 10.0, 0.0).with_tags(tags);
    sim.insert_actor(
        "Husk",
        base,
        ActorKind::Enemy(EnemyState::new("husk", Archetype::MeleeChaser)),
    )
}

// =============================================================================
// Chain Bounds
// =============================================================================

#[test]
fn test_self_triggering_on_hit_is_capped() {
    let mut sim = sim();
    let target = spawn_enemy(&mut sim, Vec2::new(40.0, 0.0), 100.0, &[]);
    // Execute always qualifies once the target is hurt, and its own hit fires OnHit again
    sim.player.state.passives.push(Passive::Executioner {
        threshold: 1.0,
        damage: 1.0,
    });

    let mut ctx = TriggerContext::new();
    combat_core::resolve(&mut sim, DamageEvent::physical(ActorId::PLAYER, target, 10.0), Some(&mut ctx));

    assert_eq!(ctx.times_fired(TriggerKind::OnHit), MAX_REPEATS_PER_KIND);
    assert!(ctx.suppressed() >= 1, "the third OnHit must be refused");
    assert_eq!(sim.base(target).unwrap().health, 100.0 - 10.0 - MAX_REPEATS_PER_KIND as f32);
}

#[test]
fn test_chain_depth_never_exceeds_cap() {
    let mut sim = sim();
    sim.player.state.passives.extend([
        Passive::VenomBlade { stacks: 1 },
        Passive::Cruelty { damage: 2.0 },
        Passive::Executioner { threshold: 1.0, damage: 1.0 },
        Passive::Lifesteal { fraction: 0.2 },
        Passive::Aftershock { duration: 2.0 },
    ]);
    sim.player.state.items.extend([
        Item::ThornMail { damage: 2.0 },
        Item::MirrorShield { fraction: 0.5 },
        Item::StormHeart { radius: 200.0, damage: 3.0 },
    ]);
    let thorny = spawn_enemy(&mut sim, Vec2::new(30.0, 0.0), 500.0, &[Tag::Thorny]);
    for i in 0..4 {
        spawn_enemy(&mut sim, Vec2::new(-30.0, 20.0 * i as f32), 500.0, &[Tag::Thorny]);
    }

    for _ in 0..3 {
        combat_core::resolve(&mut sim, DamageEvent::physical(ActorId::PLAYER, thorny, 10.0), None);
        assert!(sim.telemetry.last_depth <= MAX_CHAIN_DEPTH);

        sim.player.base.invulnerable_timer = 0.0;
        sim.player.state.reactive = Default::default();
        combat_core::resolve(&mut sim, DamageEvent::physical(thorny, ActorId::PLAYER, 5.0), None);
        assert!(sim.telemetry.last_depth <= MAX_CHAIN_DEPTH);
    }
    assert_eq!(sim.telemetry.events, 6);
    assert!(sim.telemetry.max_depth > 0, "reactions should have fired");
    assert!(sim.telemetry.max_depth <= MAX_CHAIN_DEPTH, "depth {} over cap", sim.telemetry.max_depth);
}

#[test]
fn test_telemetry_counts_suppressed_triggers() {
    let mut sim = sim();
    let target = spawn_enemy(&mut sim, Vec2::new(40.0, 0.0), 100.0, &[]);
    sim.player.state.passives.push(Passive::Executioner {
        threshold: 1.0,
        damage: 1.0,
    });

    combat_core::resolve(&mut sim, DamageEvent::physical(ActorId::PLAYER, target, 10.0), None);

    let telemetry = &sim.telemetry;
    assert_eq!(telemetry.events, 1);
    assert_eq!(telemetry.last_depth, MAX_REPEATS_PER_KIND);
    assert_eq!(telemetry.max_depth, MAX_REPEATS_PER_KIND);
    assert_eq!(telemetry.depth_histogram[MAX_REPEATS_PER_KIND as usize], 1);
    assert!(telemetry.suppressed >= 1, "the third OnHit must be counted");
}

#[test]
fn test_reflect_is_not_reflected_back() {
    let mut sim = sim();
    sim.player.state.items.push(Item::ThornMail { damage: 4.0 });
    let thorny = spawn_enemy(&mut sim, Vec2::new(20.0, 0.0), 100.0, &[Tag::Thorny]);

    // Player hits the thorny enemy: Thorny Hide reflects, Thorn Mail must not answer it
    combat_core::resolve(&mut sim, DamageEvent::physical(ActorId::PLAYER, thorny, 10.0), None);

    assert_eq!(sim.base(thorny).unwrap().health, 90.0);
    assert_eq!(sim.player.base.health, 100.0 - THORNY_REFLECT_DAMAGE);
}

#[test]
fn test_mirror_shield_needs_health_damage() {
    let mut sim = sim();
    sim.player.state.items.push(Item::MirrorShield { fraction: 0.5 });
    let attacker = spawn_enemy(&mut sim, Vec2::new(20.0, 0.0), 100.0, &[]);

    // Fully absorbed: nothing to mirror
    sim.player.base.shield = 50.0;
    combat_core::resolve(&mut sim, DamageEvent::physical(attacker, ActorId::PLAYER, 10.0), None);
    assert_eq!(sim.player.base.health, 100.0);
    assert_eq!(sim.base(attacker).unwrap().health, 100.0);

    // Unshielded: half of the health damage comes back
    sim.player.base.shield = 0.0;
    combat_core::resolve(&mut sim, DamageEvent::physical(attacker, ActorId::PLAYER, 10.0), None);
    assert_eq!(sim.player.base.health, 90.0);
    assert_eq!(sim.base(attacker).unwrap().health, 95.0);
}

// =============================================================================
// Summon Hits
// =============================================================================

#[test]
fn test_summon_hits_carry_player_passives() {
    let mut sim = sim();
    sim.player.state.passives.extend([
        Passive::VenomBlade { stacks: 2 },
        Passive::Lifesteal { fraction: 0.5 },
    ]);
    sim.player.base.health = 50.0;
    let wolf = sim.insert_actor(
        "Wolf",
        ActorBase::new(Faction::Player, Vec2::new(30.0, 0.0), 40.0, 8.0, 0.0),
        ActorKind::Summon(SummonState {
            owner: ActorId::PLAYER,
            remaining: 10.0,
            damage: 10.0,
            attack_range: 10.0,
            attack_cooldown: 1.0,
            attack_timer: 0.0,
            multiplier: 1.0,
        }),
    );
    let target = spawn_enemy(&mut sim, Vec2::new(45.0, 0.0), 100.0, &[]);

    combat_core::resolve(&mut sim, DamageEvent::physical(wolf, target, 10.0), None);

    let status = &sim.base(target).unwrap().status;
    assert_eq!(status.stacks(StatusKind::Poison), 2, "Venom Blade flows through the bite");
    assert_eq!(sim.player.base.health, 55.0, "lifesteal from a bite heals the player");
    assert_eq!(sim.base(wolf).unwrap().health, 40.0);
}

// =============================================================================
// Spawn Bounds
// =============================================================================

#[test]
fn test_contagion_spread_is_capped_by_spawn_budget() {
    let mut sim = sim();
    sim.player.state.passives.push(Passive::Contagion { radius: 300.0 });
    let victim = spawn_enemy(&mut sim, Vec2::new(50.0, 0.0), 5.0, &[]);
    status_effects::apply(&mut sim, victim, StatusKind::Poison, 3, 0.0, ActorId::PLAYER);
    let neighbours: Vec<ActorId> = (0..10)
        .map(|i| spawn_enemy(&mut sim, Vec2::new(50.0, 10.0 * i as f32), 50.0, &[]))
        .collect();

    combat_core::resolve(&mut sim, DamageEvent::physical(ActorId::PLAYER, victim, 10.0), None);

    let infected = neighbours
        .iter()
        .filter(|id| sim.base(**id).unwrap().status.has(StatusKind::Poison))
        .count() as u32;
    assert_eq!(infected, MAX_SPAWNS_PER_EVENT);
}

#[test]
fn test_splitter_spawns_minions_once() {
    let content = ContentRegistry::from_ron_str(
        r#"(
            enemies: [
                (
                    id: "jelly", name: "Jelly", archetype: MeleeChaser,
                    max_health: 20.0, speed: 50.0, radius: 14.0,
                    contact_damage: 3.0, attack_range: 20.0, attack_cooldown: 1.0,
                    tags: [Splitter], abilities: [], phases: [], minion: Some("blob"), experience: 5,
                ),
                (
                    id: "blob", name: "Blob", archetype: MeleeChaser,
                    max_health: 5.0, speed: 80.0, radius: 6.0,
                    contact_damage: 1.0, attack_range: 12.0, attack_cooldown: 1.0,
                    tags: [Splitter], abilities: [], phases: [], minion: Some("blob"), experience: 1,
                ),
            ],
            encounters: [],
        )"#,
    )
    .expect("test content is valid");
    let mut sim = Simulation::seeded(content, 5);
    let jelly = roguesim::simulation::spawn::spawn_enemy(&mut sim, "jelly", Vec2::new(200.0, 0.0), 1.0, None)
        .expect("jelly spawns");

    combat_core::resolve(&mut sim, DamageEvent::physical(ActorId::PLAYER, jelly, 50.0), None);
    let blobs = sim.actor_ids_where(|a| a.base.alive && a.is_enemy());
    assert_eq!(blobs.len(), SPLIT_COUNT as usize);

    // Minions carry the Minion tag, so killing one never splits again
    for blob in blobs {
        combat_core::resolve(&mut sim, DamageEvent::physical(ActorId::PLAYER, blob, 50.0), None);
    }
    assert_eq!(sim.living_enemy_count(), 0);
}

// =============================================================================
// Lethal Check
// =============================================================================

#[test]
fn test_death_is_processed_once() {
    let mut sim = sim();
    let target = spawn_enemy(&mut sim, Vec2::new(40.0, 0.0), 10.0, &[]);

    let first = combat_core::resolve(&mut sim, DamageEvent::physical(ActorId::PLAYER, target, 50.0), None);
    let second = combat_core::resolve(&mut sim, DamageEvent::physical(ActorId::PLAYER, target, 50.0), None);

    assert!(first.killed);
    assert!(!second.landed(), "dead targets can't be hit");
    assert_eq!(sim.stats.kills, 1);
    assert_eq!(sim.combat_log.filter_by_type(CombatLogEventType::Death).len(), 1);
}

#[test]
fn test_volatile_burst_is_world_damage() {
    let mut sim = sim();
    let bomb = spawn_enemy(&mut sim, Vec2::new(40.0, 0.0), 10.0, &[Tag::Volatile]);
    combat_core::resolve(&mut sim, DamageEvent::new(ActorId::PLAYER, bomb, 50.0, DamageType::Arcane), None);
    assert_eq!(sim.player.base.health, 100.0 - VOLATILE_BURST_DAMAGE);
    let burst = sim
        .combat_log
        .filter_by_type(CombatLogEventType::Damage)
        .into_iter()
        .any(|e| e.source == "Environment" && e.target.as_deref() == Some("Player"));
    assert!(burst, "burst should be attributed to the environment");
}

#[test]
fn test_bloodlust_stacks_on_kill() {
    let mut sim = sim();
    sim.player.state.passives.push(Passive::Bloodlust {
        per_stack: 0.1,
        max_stacks: 2,
    });
    for i in 0..3 {
        let target = spawn_enemy(&mut sim, Vec2::new(40.0, 30.0 * i as f32), 5.0, &[]);
        combat_core::resolve(&mut sim, DamageEvent::physical(ActorId::PLAYER, target, 10.0), None);
    }
    assert_eq!(sim.player.state.kill_stacks, 2);
    assert!((sim.player.state.effective_damage_scalar() - 1.2).abs() < 1e-5);
}
