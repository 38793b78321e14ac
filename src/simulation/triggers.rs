//! Reactive trigger handlers
//!
//! Every handler first works out which reactions apply, then runs all of them
//! inside one [`TriggerContext::fire`] call for its [`TriggerKind`]. When nothing
//! applies the trigger is not fired, so idle passives never spend chain budget.

use bevy::prelude::*;

use super::combat_core::{self, AreaAttack};
use super::components::*;
use super::constants::*;
use super::spawn;
use super::status_effects;
use super::trigger_context::{TriggerContext, TriggerKind};
use super::Simulation;
use crate::combat::events::{DamageEvent, DamageResult, DamageTag, DamageType};
use crate::combat::log::CombatLogEventType;

/// Player-aligned attackers whose kills and area hits count for the player's passives.
fn credited_to_player(sim: &Simulation, attacker: ActorId) -> bool {
    attacker.is_player()
        || sim
            .actor(attacker)
            .and_then(Actor::as_summon)
            .is_some_and(|s| s.owner.is_player())
}

// ============================================================================
// On Hit (attacker-attributed)
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum OnHitEffect {
    Status { kind: StatusKind, stacks: u32, duration: f32 },
    Heal { who: ActorId, amount: f32, name: &'static str },
    Execute { threshold: f32, damage: f32 },
}

/// The player's passives apply to hits by the player and by the player's summons.
/// Lifesteal from a summon's hit heals the player.
fn on_hit_effects(sim: &Simulation, event: &DamageEvent, result: &DamageResult) -> Vec<OnHitEffect> {
    let mut effects = Vec::new();
    let health_damage = result.health_damage();

    if credited_to_player(sim, event.attacker) {
        let target_brittle = result.consumed_brittle
            || sim
                .base(event.target)
                .is_some_and(|b| b.status.brittle.is_active());
        for passive in &sim.player.state.passives {
            match *passive {
                Passive::VenomBlade { stacks } => effects.push(OnHitEffect::Status {
                    kind: StatusKind::Poison,
                    stacks,
                    duration: 0.0,
                }),
                Passive::Serrated { stacks } => effects.push(OnHitEffect::Status {
                    kind: StatusKind::Bleed,
                    stacks,
                    duration: 0.0,
                }),
                Passive::FrostTouch { stacks, duration } => effects.push(OnHitEffect::Status {
                    kind: StatusKind::Slow,
                    stacks,
                    duration,
                }),
                Passive::Shatter { duration } if !target_brittle => effects.push(OnHitEffect::Status {
                    kind: StatusKind::Brittle,
                    stacks: 1,
                    duration,
                }),
                Passive::Hex { duration } => effects.push(OnHitEffect::Status {
                    kind: StatusKind::Weaken,
                    stacks: 1,
                    duration,
                }),
                Passive::Lifesteal { fraction } if health_damage > 0.0 => effects.push(OnHitEffect::Heal {
                    who: ActorId::PLAYER,
                    amount: health_damage * fraction,
                    name: "Lifesteal",
                }),
                Passive::Executioner { threshold, damage } => {
                    effects.push(OnHitEffect::Execute { threshold, damage })
                }
                _ => {}
            }
        }
    }

    let vampiric = sim
        .enemy(event.attacker)
        .is_some_and(|e| e.elite == Some(EliteModifier::Vampiric));
    if vampiric && health_damage > 0.0 {
        effects.push(OnHitEffect::Heal {
            who: event.attacker,
            amount: health_damage * EliteModifier::VAMPIRIC_FRACTION,
            name: "Vampiric Strike",
        });
    }

    effects
}

pub fn on_hit(sim: &mut Simulation, event: &DamageEvent, result: &DamageResult, ctx: &mut TriggerContext) {
    let effects = on_hit_effects(sim, event, result);
    if effects.is_empty() {
        return;
    }

    ctx.fire(TriggerKind::OnHit, |ctx| {
        let mut debuffed = false;
        for effect in effects {
            match effect {
                OnHitEffect::Status { kind, stacks, duration } => {
                    if status_effects::apply(sim, event.target, kind, stacks, duration, event.attacker) {
                        debuffed = true;
                    }
                }
                OnHitEffect::Heal { who, amount, name } => {
                    combat_core::heal(sim, who, who, amount, name);
                }
                OnHitEffect::Execute { threshold, damage } => {
                    let below = sim
                        .base(event.target)
                        .is_some_and(|b| b.alive && b.health > 0.0 && b.health_fraction() < threshold);
                    if below {
                        let burst = DamageEvent::new(event.attacker, event.target, damage, DamageType::True)
                            .with_tag(DamageTag::Burst)
                            .named("Execute");
                        combat_core::resolve(sim, burst, Some(ctx));
                    }
                }
            }
        }
        if debuffed {
            on_debuff_applied(sim, event, ctx);
        }
    });
}

/// Bonus damage when an on-hit effect lands a debuff.
fn on_debuff_applied(sim: &mut Simulation, event: &DamageEvent, ctx: &mut TriggerContext) {
    if !credited_to_player(sim, event.attacker) {
        return;
    }
    let cruelty: f32 = sim
        .player
        .state
        .passives
        .iter()
        .map(|p| match p {
            Passive::Cruelty { damage } => *damage,
            _ => 0.0,
        })
        .sum();
    if cruelty <= 0.0 || !sim.is_alive(event.target) {
        return;
    }

    ctx.fire(TriggerKind::OnDebuffApplied, |ctx| {
        let bonus = DamageEvent::new(event.attacker, event.target, cruelty, DamageType::Arcane)
            .with_tag(DamageTag::Burst)
            .named("Cruelty");
        combat_core::resolve(sim, bonus, Some(ctx));
    });
}

// ============================================================================
// On Damage Taken (defender-attributed)
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Reaction {
    EmergencyShield { amount: f32 },
    Thorns { damage: f32 },
    Mirror { damage: f32 },
    Retaliation { radius: f32, damage: f32 },
    ThornyHide,
}

fn reactions(sim: &Simulation, event: &DamageEvent, result: &DamageResult) -> Vec<Reaction> {
    let mut reactions = Vec::new();
    let reflectable = !event.attacker.is_world()
        && event.attacker != event.target
        && !event.has_tag(DamageTag::Reflect)
        && !event.has_tag(DamageTag::Periodic)
        && sim.is_alive(event.attacker);

    if event.target.is_player() {
        let state = &sim.player.state;
        let health_fraction = sim.player.base.health_fraction();
        for item in &state.items {
            match *item {
                Item::Aegis { threshold, amount }
                    if health_fraction < threshold && state.reactive.emergency_shield <= 0.0 =>
                {
                    reactions.push(Reaction::EmergencyShield { amount })
                }
                Item::ThornMail { damage } if reflectable && state.reactive.thorns <= 0.0 => {
                    reactions.push(Reaction::Thorns { damage })
                }
                Item::MirrorShield { fraction }
                    if reflectable && result.health_damage() > 0.0 && state.reactive.reflect <= 0.0 =>
                {
                    reactions.push(Reaction::Mirror {
                        damage: (result.health_damage() * fraction).max(1.0),
                    })
                }
                Item::StormHeart { radius, damage }
                    if !event.has_tag(DamageTag::Periodic) && state.reactive.retaliation <= 0.0 =>
                {
                    reactions.push(Reaction::Retaliation { radius, damage })
                }
                _ => {}
            }
        }
    } else if let Some(actor) = sim.actor(event.target) {
        let thorny = actor.base.has_tag(Tag::Thorny);
        let ready = actor.as_enemy().is_some_and(|e| e.thorns_cooldown <= 0.0);
        if thorny && ready && reflectable {
            reactions.push(Reaction::ThornyHide);
        }
    }

    reactions
}

pub fn on_damage_taken(sim: &mut Simulation, event: &DamageEvent, result: &DamageResult, ctx: &mut TriggerContext) {
    let reactions = reactions(sim, event, result);
    if reactions.is_empty() {
        return;
    }

    ctx.fire(TriggerKind::OnDamageTaken, |ctx| {
        for reaction in reactions {
            match reaction {
                Reaction::EmergencyShield { amount } => {
                    sim.player.state.reactive.emergency_shield = EMERGENCY_SHIELD_COOLDOWN;
                    sim.player.base.shield += amount;
                    sim.combat_log.record(
                        CombatLogEventType::AuraApplied,
                        "Player",
                        Some("Player".to_string()),
                        Some(amount),
                        format!("Aegis grants Player a {:.0} point shield", amount),
                    );
                }
                Reaction::Thorns { damage } => {
                    sim.player.state.reactive.thorns = THORNS_COOLDOWN;
                    reflect(sim, event, damage, DamageType::Physical, "Thorn Mail", ctx);
                }
                Reaction::Mirror { damage } => {
                    sim.player.state.reactive.reflect = REFLECT_COOLDOWN;
                    reflect(sim, event, damage, DamageType::Arcane, "Mirror Shield", ctx);
                }
                Reaction::Retaliation { radius, damage } => {
                    sim.player.state.reactive.retaliation = RETALIATION_COOLDOWN;
                    let pulse = AreaAttack::new(
                        ActorId::PLAYER,
                        Faction::Enemy,
                        sim.player.base.position,
                        radius,
                        damage,
                        DamageType::Arcane,
                    )
                    .with_tag(DamageTag::Retaliation)
                    .named("Storm Heart");
                    combat_core::resolve_area(sim, &pulse, Some(ctx));
                }
                Reaction::ThornyHide => {
                    if let Some(enemy) = sim.enemy_mut(event.target) {
                        enemy.thorns_cooldown = THORNY_COOLDOWN;
                    }
                    reflect(sim, event, THORNY_REFLECT_DAMAGE, DamageType::Physical, "Thorny Hide", ctx);
                }
            }
        }
    });
}

/// Damage the original attacker on the defender's behalf.
fn reflect(
    sim: &mut Simulation,
    event: &DamageEvent,
    damage: f32,
    damage_type: DamageType,
    name: &str,
    ctx: &mut TriggerContext,
) {
    let reflected = DamageEvent::new(event.target, event.attacker, damage, damage_type)
        .with_tag(DamageTag::Reflect)
        .named(name);
    combat_core::resolve(sim, reflected, Some(ctx));
}

// ============================================================================
// On Kill (attacker-attributed) / On Death (target-attributed)
// ============================================================================

fn award_experience(sim: &mut Simulation, event: &DamageEvent) {
    if !credited_to_player(sim, event.attacker) {
        return;
    }
    let Some(reward) = sim.enemy(event.target).map(|e| e.experience_reward) else {
        return;
    };
    let gained = sim.player.state.add_experience(reward);
    if gained > 0 {
        let level = sim.player.state.level;
        info!("Player reached level {}", level);
        sim.combat_log.log(
            CombatLogEventType::MatchEvent,
            format!("Player reached level {}", level),
        );
    }
}

#[derive(Debug, Clone, Copy)]
enum KillEffect {
    Bloodlust { max_stacks: u32 },
    Contagion { radius: f32, stacks: u32 },
    CorpseBloom { damage: f32, duration: f32, radius: f32 },
}

pub fn on_kill(sim: &mut Simulation, event: &DamageEvent, ctx: &mut TriggerContext) {
    award_experience(sim, event);
    if !credited_to_player(sim, event.attacker) || sim.enemy(event.target).is_none() {
        return;
    }

    let victim_poison = sim.base(event.target).map_or(0, |b| b.status.poison.stacks);
    let mut effects = Vec::new();
    for passive in &sim.player.state.passives {
        match *passive {
            Passive::Bloodlust { max_stacks, .. } => effects.push(KillEffect::Bloodlust { max_stacks }),
            Passive::Contagion { radius } if victim_poison > 0 => effects.push(KillEffect::Contagion {
                radius,
                stacks: victim_poison,
            }),
            _ => {}
        }
    }
    for item in &sim.player.state.items {
        if let Item::CorpseBloom { damage, duration, radius } = *item {
            effects.push(KillEffect::CorpseBloom { damage, duration, radius });
        }
    }
    if effects.is_empty() {
        return;
    }

    let (position, faction) = match sim.base(event.target) {
        Some(b) => (b.position, b.faction),
        None => return,
    };

    ctx.fire(TriggerKind::OnKill, |ctx| {
        for effect in effects {
            match effect {
                KillEffect::Bloodlust { max_stacks } => {
                    let state = &mut sim.player.state;
                    state.kill_stacks = (state.kill_stacks + 1).min(max_stacks);
                }
                KillEffect::Contagion { radius, stacks } => {
                    for neighbour in sim.targets_in_radius(position, radius, faction) {
                        if !ctx.try_spawn() {
                            break;
                        }
                        status_effects::apply(sim, neighbour, StatusKind::Poison, stacks, 0.0, ActorId::PLAYER);
                    }
                }
                KillEffect::CorpseBloom { damage, duration, radius } => {
                    if ctx.try_spawn() {
                        let spec = HazardSpec {
                            effect: HazardEffect::Damage,
                            damage_type: DamageType::Poison,
                            amount: damage,
                            tick_interval: 0.5,
                            duration,
                            radius,
                        };
                        sim.spawn_hazard(ActorId::PLAYER, "Corpse Bloom", position, spec, false);
                    }
                }
            }
        }
    });
}

#[derive(Debug, Clone)]
enum DeathEffect {
    Burst,
    Split { minion: String },
}

pub fn on_death(sim: &mut Simulation, event: &DamageEvent, ctx: &mut TriggerContext) {
    let Some(actor) = sim.actor(event.target) else {
        return;
    };
    let Some(enemy) = actor.as_enemy() else {
        return;
    };

    let mut effects = Vec::new();
    if actor.base.has_tag(Tag::Volatile) || enemy.elite == Some(EliteModifier::Volatile) {
        effects.push(DeathEffect::Burst);
    }
    if actor.base.has_tag(Tag::Splitter) && !actor.base.has_tag(Tag::Minion) {
        let minion = sim
            .content
            .enemy(&enemy.definition_id)
            .and_then(|d| d.minion.clone());
        if let Some(minion) = minion {
            effects.push(DeathEffect::Split { minion });
        }
    }
    if effects.is_empty() {
        return;
    }

    let name = actor.name.clone();
    let position = actor.base.position;
    let faction = actor.base.faction;

    ctx.fire(TriggerKind::OnDeath, |ctx| {
        for effect in effects {
            match effect {
                DeathEffect::Burst => {
                    let burst = AreaAttack::new(
                        ActorId::WORLD,
                        faction.opposing(),
                        position,
                        VOLATILE_BURST_RADIUS,
                        VOLATILE_BURST_DAMAGE,
                        DamageType::Fire,
                    )
                    .with_tag(DamageTag::DeathBurst)
                    .named(format!("{}'s Burst", name));
                    combat_core::resolve_area(sim, &burst, Some(ctx));
                }
                DeathEffect::Split { minion } => {
                    for i in 0..SPLIT_COUNT {
                        if !ctx.try_spawn() {
                            break;
                        }
                        let angle = std::f32::consts::TAU * i as f32 / SPLIT_COUNT as f32;
                        let at = super::geometry::point_on_ring(position, 16.0, angle);
                        spawn::spawn_minion(sim, &minion, at);
                    }
                }
            }
        }
    });
}

// ============================================================================
// On Area Damage
// ============================================================================

pub fn on_area_damage(sim: &mut Simulation, attack: &AreaAttack, hits: &[ActorId], ctx: &mut TriggerContext) {
    if !credited_to_player(sim, attack.source) {
        return;
    }
    let exposure = sim.player.state.passives.iter().find_map(|p| match p {
        Passive::Aftershock { duration } => Some(*duration),
        _ => None,
    });
    let Some(duration) = exposure else {
        return;
    };

    ctx.fire(TriggerKind::OnAreaDamage, |_| {
        for target in hits {
            status_effects::apply(sim, *target, StatusKind::Exposed, 1, duration, attack.source);
        }
    });
}
