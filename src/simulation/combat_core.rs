//! Damage Pipeline
//!
//! [`resolve`] is the single choke point for damage from every source: melee,
//! projectiles, hazards, reflects, area pulses and periodic statuses. Stages run
//! in a fixed order and later stages depend on earlier ones:
//!
//! 1. Avoidance (invulnerability)
//! 2. Mitigation (weaken → armor → attacker scalars → brittle/exposed)
//! 3. Application (rounding, shield absorb, health, presentation, log)
//! 4. Attacker-attributed reactions (on hit)
//! 5. Defender-attributed reactions (on damage taken)
//! 6. Lethal check (on kill / on death, exactly once per death)
//! 7. Chain telemetry
//!
//! Reactions may recurse into [`resolve`]; every nested call shares the
//! [`TriggerContext`] of the event that started the chain.

use bevy::prelude::*;

use super::components::{ActorId, AnimationState, Faction, Tag};
use super::constants::*;
use super::enemy_ai;
use super::trigger_context::TriggerContext;
use super::triggers;
use super::Simulation;
use crate::combat::events::{DamageEvent, DamageResult, DamageTag, DamageTags, DamageType};
use crate::combat::log::CombatLogEventType;

/// Resolve one attack.
///
/// Pass `None` for an externally-initiated event: a fresh context is created
/// and its depth is recorded when the call returns. Reactive handlers pass the
/// context they were given.
pub fn resolve(sim: &mut Simulation, event: DamageEvent, ctx: Option<&mut TriggerContext>) -> DamageResult {
    match ctx {
        Some(ctx) => resolve_with(sim, &event, ctx),
        None => {
            let mut ctx = TriggerContext::new();
            let result = resolve_with(sim, &event, &mut ctx);
            sim.telemetry.record(&ctx);
            result
        }
    }
}

/// Target and attacker must exist and be alive. `WORLD` is always a valid attacker.
fn preconditions_hold(sim: &Simulation, event: &DamageEvent) -> bool {
    let target_ok = sim.is_damageable(event.target) && sim.is_alive(event.target);
    let attacker_ok = event.attacker.is_world() || sim.is_alive(event.attacker);
    target_ok && attacker_ok && event.base_damage > 0.0 && event.base_damage.is_finite()
}

fn resolve_with(sim: &mut Simulation, event: &DamageEvent, ctx: &mut TriggerContext) -> DamageResult {
    if !preconditions_hold(sim, event) {
        return DamageResult::default();
    }

    // 1. Avoidance
    if sim.base(event.target).is_some_and(|b| b.is_invulnerable()) {
        log_dodge(sim, event);
        return DamageResult::dodge();
    }

    // 2. Mitigation
    let mitigated = mitigate(sim, event);

    // 3. Application
    let mut result = apply_damage(sim, event, mitigated);

    // 4. On hit
    if result.landed() && !event.attacker.is_world() && !event.has_tag(DamageTag::Periodic) {
        triggers::on_hit(sim, event, &result, ctx);
    }

    // 5. On damage taken
    let survived = sim.base(event.target).is_some_and(|b| b.alive && b.health > 0.0);
    if result.landed() && survived {
        triggers::on_damage_taken(sim, event, &result, ctx);
    }

    // 6. Lethal check
    handle_lethal(sim, event, ctx);
    result.killed = !sim.is_alive(event.target);

    result
}

/// Damage after every modifier, before rounding.
#[derive(Debug, Clone, Copy)]
pub struct Mitigated {
    pub damage: f32,
    /// Armor ran; the result may not drop below `MIN_MITIGATED_DAMAGE`
    pub floored: bool,
    /// This hit spent the target's Brittle
    pub brittle_consumed: bool,
}

/// Armor reduction for a raw hit: `min(armor × per-point, raw × cap)`.
pub fn armor_reduction(raw: f32, armor: f32) -> f32 {
    (armor.max(0.0) * ARMOR_REDUCTION_PER_POINT).min(raw * MAX_DAMAGE_REDUCTION)
}

fn mitigate(sim: &mut Simulation, event: &DamageEvent) -> Mitigated {
    let mut damage = event.base_damage;
    let mut floored = false;

    if event.damage_type == DamageType::True {
        return Mitigated {
            damage,
            floored,
            brittle_consumed: false,
        };
    }

    // a. attacker debuffs
    if !event.attacker.is_world()
        && sim
            .base(event.attacker)
            .is_some_and(|b| b.status.weaken.is_active())
    {
        damage *= WEAKEN_MULTIPLIER;
    }

    // b. armor
    let armor = sim.base(event.target).map_or(0.0, |b| b.armor);
    if event.damage_type == DamageType::Physical && armor > 0.0 {
        damage = (damage - armor_reduction(damage, armor)).max(MIN_MITIGATED_DAMAGE);
        floored = true;
    }

    // c. attacker scalars
    damage *= attacker_scalar(sim, event);

    // d. target vulnerability
    let target_name = sim.actor_name(event.target);
    let mut brittle_consumed = false;
    if let Some(target) = sim.base_mut(event.target) {
        if target.status.brittle.is_active() {
            damage *= BRITTLE_MULTIPLIER;
            target.status.brittle.clear();
            brittle_consumed = true;
        }
        if target.status.exposed.is_active() {
            damage *= EXPOSED_MULTIPLIER;
        }
    }
    if brittle_consumed {
        sim.combat_log.record(
            CombatLogEventType::AuraRemoved,
            target_name.clone(),
            Some(target_name.clone()),
            None,
            format!("{}'s Brittle shatters", target_name),
        );
    }

    Mitigated {
        damage,
        floored,
        brittle_consumed,
    }
}

fn attacker_scalar(sim: &Simulation, event: &DamageEvent) -> f32 {
    if event.attacker.is_world() {
        return 1.0;
    }
    let mut scalar = 1.0;
    let player = &sim.player.state;

    if event.attacker.is_player() {
        scalar *= player.effective_damage_scalar();
    } else if let Some(summon) = sim.actor(event.attacker).and_then(|a| a.as_summon()) {
        scalar *= (1.0 + player.summon_item_bonus()) * summon.multiplier;
    }

    let attacker_is_player_side = sim.faction_of(event.attacker) == Some(Faction::Player);
    let target_marked = sim.base(event.target).is_some_and(|b| b.has_tag(Tag::Marked));
    if attacker_is_player_side && target_marked {
        scalar *= 1.0 + player.mark_bonus();
    }

    scalar
}

fn apply_damage(sim: &mut Simulation, event: &DamageEvent, mitigated: Mitigated) -> DamageResult {
    let mut final_damage = mitigated.damage.round().max(0.0);
    if mitigated.floored {
        final_damage = final_damage.max(MIN_MITIGATED_DAMAGE);
    }
    debug_assert!(final_damage >= 0.0, "final damage cannot be negative, got {}", final_damage);

    let Some(target) = sim.base_mut(event.target) else {
        return DamageResult::default();
    };

    let absorbed = target.shield.min(final_damage);
    target.shield -= absorbed;
    let health_damage = final_damage - absorbed;
    target.health = (target.health - health_damage).clamp(0.0, target.max_health);
    target.damage_taken += health_damage;

    if health_damage > 0.0 {
        target.hit_flash_timer = HIT_FLASH_DURATION;
        if target.health > 0.0 {
            target.animation = AnimationState::Hit;
        }
        if event.target.is_player() && !event.has_tag(DamageTag::Periodic) {
            target.invulnerable_timer = PLAYER_HIT_INVULNERABILITY;
        }
    }

    if !event.attacker.is_world() {
        if let Some(attacker) = sim.base_mut(event.attacker) {
            attacker.damage_dealt += health_damage;
        }
    }
    if event.attacker.is_player() {
        sim.stats.player_damage_dealt += health_damage;
    }
    if event.target.is_player() {
        sim.stats.player_damage_taken += health_damage;
    }

    let result = DamageResult {
        final_damage,
        absorbed,
        dodged: false,
        killed: false,
        blocked: absorbed > 0.0 && health_damage == 0.0,
        consumed_brittle: mitigated.brittle_consumed,
    };
    log_hit(sim, event, &result);
    result
}

fn log_dodge(sim: &mut Simulation, event: &DamageEvent) {
    let attacker = sim.actor_name(event.attacker);
    let target = sim.actor_name(event.target);
    let message = format!("{} avoids {}'s {}", target, attacker, event.display_name());
    sim.combat_log
        .record(CombatLogEventType::Dodge, attacker, Some(target), None, message);
}

fn log_hit(sim: &mut Simulation, event: &DamageEvent, result: &DamageResult) {
    let attacker = sim.actor_name(event.attacker);
    let target = sim.actor_name(event.target);

    if result.absorbed > 0.0 {
        let message = format!("{}'s shield absorbs {:.0} damage", target, result.absorbed);
        sim.combat_log.record(
            CombatLogEventType::Absorb,
            attacker.clone(),
            Some(target.clone()),
            Some(result.absorbed),
            message,
        );
    }

    let health_damage = result.health_damage();
    if health_damage > 0.0 {
        let message = format!(
            "{}'s {} hits {} for {:.0} damage",
            attacker,
            event.display_name(),
            target,
            health_damage
        );
        sim.combat_log
            .log_damage(attacker, target, health_damage, message);
    }
}

/// Mark the target dead and fire death reactions. Does nothing if the target
/// still has health or was already dead, so concurrent lethal hits only count once.
fn handle_lethal(sim: &mut Simulation, event: &DamageEvent, ctx: &mut TriggerContext) -> bool {
    let died = match sim.base_mut(event.target) {
        Some(target) if target.health <= 0.0 => target.mark_dead(),
        _ => false,
    };
    if !died {
        return false;
    }

    enemy_ai::cancel_ability(sim, event.target);

    triggers::on_kill(sim, event, ctx);
    triggers::on_death(sim, event, ctx);

    let victim = sim.actor_name(event.target);
    let killer = sim.actor_name(event.attacker);
    let message = if event.target.is_player() {
        format!("{} has fallen to {}", victim, killer)
    } else {
        format!("{} has been slain by {}", victim, killer)
    };
    info!("{}", message);
    sim.combat_log.log_death(victim, Some(killer), message);
    if sim.faction_of(event.target) == Some(Faction::Enemy) {
        sim.stats.kills += 1;
    }
    true
}

// ============================================================================
// Area Damage
// ============================================================================

/// An area pulse: one pipeline call per qualifying target, then one
/// `OnAreaDamage` trigger for the batch.
#[derive(Debug, Clone)]
pub struct AreaAttack {
    pub source: ActorId,
    /// Faction hit by the pulse
    pub hits: Faction,
    pub center: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub damage_type: DamageType,
    pub tags: DamageTags,
    pub name: String,
}

impl AreaAttack {
    pub fn new(
        source: ActorId,
        hits: Faction,
        center: Vec2,
        radius: f32,
        damage: f32,
        damage_type: DamageType,
    ) -> Self {
        let mut tags = DamageTags::new();
        tags.push(DamageTag::Area);
        Self {
            source,
            hits,
            center,
            radius,
            damage,
            damage_type,
            tags,
            name: "Area".to_string(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_tag(mut self, tag: DamageTag) -> Self {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    fn event_for(&self, target: ActorId) -> DamageEvent {
        let mut event = DamageEvent::new(self.source, target, self.damage, self.damage_type)
            .named(self.name.clone());
        for tag in &self.tags {
            event = event.with_tag(*tag);
        }
        event
    }
}

/// Resolve an area pulse. Returns the actors it damaged.
pub fn resolve_area(sim: &mut Simulation, attack: &AreaAttack, ctx: Option<&mut TriggerContext>) -> Vec<ActorId> {
    match ctx {
        Some(ctx) => resolve_area_with(sim, attack, ctx),
        None => {
            let mut ctx = TriggerContext::new();
            let hits = resolve_area_with(sim, attack, &mut ctx);
            sim.telemetry.record(&ctx);
            hits
        }
    }
}

fn resolve_area_with(sim: &mut Simulation, attack: &AreaAttack, ctx: &mut TriggerContext) -> Vec<ActorId> {
    let targets = sim.targets_in_radius(attack.center, attack.radius, attack.hits);
    let mut hits = Vec::new();
    for target in targets {
        let result = resolve_with(sim, &attack.event_for(target), ctx);
        if result.landed() {
            hits.push(target);
        }
    }
    if !hits.is_empty() {
        triggers::on_area_damage(sim, attack, &hits, ctx);
    }
    hits
}

// ============================================================================
// Healing
// ============================================================================

/// Heal `target`, logging the amount actually restored.
pub fn heal(sim: &mut Simulation, source: ActorId, target: ActorId, amount: f32, name: &str) -> f32 {
    let restored = sim.base_mut(target).map_or(0.0, |b| b.heal(amount));
    if restored > 0.0 {
        let source_name = sim.actor_name(source);
        let target_name = sim.actor_name(target);
        let message = format!("{}'s {} heals {} for {:.0}", source_name, name, target_name, restored);
        sim.combat_log
            .log_healing(source_name, target_name, restored, message);
    }
    restored
}
