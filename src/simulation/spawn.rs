//! Enemy spawning: single enemies from content definitions, split/brood
//! minions, and whole encounters for a combat node.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use std::sync::Arc;

use super::components::*;
use super::constants::*;
use super::geometry;
use super::Simulation;
use crate::combat::log::CombatLogEventType;

/// One combat node on the run map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombatNode {
    pub encounter_id: String,
    /// Floors cleared so far; scales enemy health
    #[serde(default)]
    pub depth: u32,
    /// Elite nodes roll modifiers on their enemies
    #[serde(default)]
    pub elite: bool,
}

impl CombatNode {
    pub fn new(encounter_id: impl Into<String>) -> Self {
        Self {
            encounter_id: encounter_id.into(),
            depth: 0,
            elite: false,
        }
    }

    pub fn health_multiplier(&self) -> f32 {
        1.0 + DEPTH_HEALTH_SCALING * self.depth as f32
    }
}

/// Spawn one enemy from its definition. Returns `None` for an unknown id.
pub fn spawn_enemy(
    sim: &mut Simulation,
    definition_id: &str,
    position: Vec2,
    health_multiplier: f32,
    elite: Option<EliteModifier>,
) -> Option<ActorId> {
    let content = Arc::clone(&sim.content);
    let Some(definition) = content.enemy(definition_id) else {
        warn!("Unknown enemy definition '{}'", definition_id);
        return None;
    };

    let mut base = ActorBase::new(
        Faction::Enemy,
        geometry::clamp_to_arena(position, ARENA_HALF_EXTENT),
        definition.max_health * health_multiplier.max(0.1),
        definition.radius,
        definition.speed,
    )
    .with_armor(definition.armor)
    .with_tags(&definition.tags);

    let mut enemy = EnemyState::new(&definition.id, definition.archetype);
    enemy.contact_damage = definition.contact_damage;
    enemy.attack_range = definition.attack_range;
    enemy.attack_cooldown = definition.attack_cooldown;
    enemy.experience_reward = definition.experience;

    if definition.is_boss() {
        enemy.boss_phase = Some(0);
        base.add_tag(Tag::Boss);
        base.add_tag(Tag::Marked);
    }

    let mut name = definition.name.clone();
    if let Some(modifier) = elite {
        enemy.elite = Some(modifier);
        base.add_tag(Tag::Elite);
        base.add_tag(Tag::Marked);
        match modifier {
            EliteModifier::Armored => base.armor += EliteModifier::ARMOR_BONUS,
            EliteModifier::Hasted => {
                base.speed *= EliteModifier::HASTE_MULTIPLIER;
                enemy.cooldown_rate = EliteModifier::HASTE_MULTIPLIER;
            }
            EliteModifier::Volatile => base.add_tag(Tag::Volatile),
            EliteModifier::Vampiric => {}
        }
        name = format!("{} {}", modifier.name(), name);
    }

    let id = sim.insert_actor(name.clone(), base, ActorKind::Enemy(enemy));
    debug!("Spawned {} ({:?}) at {:?}", name, id, position);
    Some(id)
}

/// Spawn a minion (splits, brood). Minions never split again.
pub fn spawn_minion(sim: &mut Simulation, definition_id: &str, position: Vec2) -> Option<ActorId> {
    let id = spawn_enemy(sim, definition_id, position, 1.0, None)?;
    if let Some(base) = sim.base_mut(id) {
        base.add_tag(Tag::Minion);
    }
    let name = sim.actor_name(id);
    sim.combat_log.record(
        CombatLogEventType::Spawn,
        name.clone(),
        None,
        None,
        format!("{} emerges", name),
    );
    Some(id)
}

/// Spawn every enemy of the node's encounter on a ring around the player.
pub fn spawn_encounter(sim: &mut Simulation, node: &CombatNode) -> Vec<ActorId> {
    let content = Arc::clone(&sim.content);
    let Some(encounter) = content.encounter(&node.encounter_id) else {
        warn!("Unknown encounter '{}'", node.encounter_id);
        return Vec::new();
    };

    let roster: Vec<&str> = encounter
        .enemies
        .iter()
        .flat_map(|slot| std::iter::repeat(slot.enemy.as_str()).take(slot.count as usize))
        .collect();
    let center = sim.player.base.position;
    let offset = sim.rng.random_range(0.0, TAU);
    let health_multiplier = node.health_multiplier();

    let mut spawned = Vec::with_capacity(roster.len());
    for (i, definition_id) in roster.iter().enumerate() {
        let angle = offset + TAU * i as f32 / roster.len() as f32;
        let position = geometry::point_on_ring(center, SPAWN_RING_RADIUS, angle);

        let is_boss = content.enemy(definition_id).is_some_and(|d| d.is_boss());
        let elite = if node.elite && !is_boss && sim.rng.chance(ELITE_CHANCE) {
            let index = sim.rng.random_index(EliteModifier::ALL.len());
            Some(EliteModifier::ALL[index])
        } else {
            None
        };

        if let Some(id) = spawn_enemy(sim, definition_id, position, health_multiplier, elite) {
            spawned.push(id);
        }
    }

    let message = format!(
        "{} begins (depth {}{}): {} enemies",
        encounter.name,
        node.depth,
        if node.elite { ", elite" } else { "" },
        spawned.len()
    );
    info!("{}", message);
    sim.combat_log.log(CombatLogEventType::MatchEvent, message);
    spawned
}
