//! Combat events
//!
//! The input and output records of the damage pipeline.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::simulation::components::ActorId;

/// Types of damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageType {
    /// Reduced by armor
    Physical,
    Poison,
    Bleed,
    Fire,
    Frost,
    Arcane,
    /// Ignores every modifier except shields
    True,
}

/// Descriptive tags carried by a damage event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageTag {
    Melee,
    Projectile,
    Area,
    /// Reflected damage; never reflected again
    Reflect,
    /// Status tick
    Periodic,
    /// Conditional burst (executes, on-debuff bonuses)
    Burst,
    /// Dealt by a summon
    Summon,
    Retaliation,
    DeathBurst,
}

pub type DamageTags = SmallVec<[DamageTag; 4]>;

/// A single attack to resolve.
#[derive(Debug, Clone)]
pub struct DamageEvent {
    /// Actor dealing the damage
    pub attacker: ActorId,
    /// Actor receiving the damage
    pub target: ActorId,
    /// Amount of damage before mitigation
    pub base_damage: f32,
    pub damage_type: DamageType,
    pub tags: DamageTags,
    /// Whether a projectile carried the hit
    pub is_projectile: bool,
    /// Name shown in the combat log (None = basic attack)
    pub source_name: Option<String>,
}

impl DamageEvent {
    pub fn new(attacker: ActorId, target: ActorId, base_damage: f32, damage_type: DamageType) -> Self {
        Self {
            attacker,
            target,
            base_damage,
            damage_type,
            tags: DamageTags::new(),
            is_projectile: false,
            source_name: None,
        }
    }

    pub fn physical(attacker: ActorId, target: ActorId, base_damage: f32) -> Self {
        Self::new(attacker, target, base_damage, DamageType::Physical)
    }

    pub fn with_tag(mut self, tag: DamageTag) -> Self {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    pub fn from_projectile(mut self) -> Self {
        self.is_projectile = true;
        self.with_tag(DamageTag::Projectile)
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    pub fn has_tag(&self, tag: DamageTag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn display_name(&self) -> &str {
        self.source_name.as_deref().unwrap_or("Attack")
    }
}

/// Outcome of one pipeline call. `Default` is the no-op result.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DamageResult {
    /// Damage after mitigation (whole number), before shields
    pub final_damage: f32,
    /// Portion soaked by the target's shield
    pub absorbed: f32,
    pub dodged: bool,
    pub killed: bool,
    /// The shield soaked the entire hit
    pub blocked: bool,
    /// The hit spent the target's Brittle
    pub consumed_brittle: bool,
}

impl DamageResult {
    pub fn dodge() -> Self {
        Self {
            dodged: true,
            ..Self::default()
        }
    }

    /// Health actually removed.
    pub fn health_damage(&self) -> f32 {
        (self.final_damage - self.absorbed).max(0.0)
    }

    pub fn landed(&self) -> bool {
        !self.dodged && self.final_damage > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_result_is_noop() {
        let result = DamageResult::default();
        assert_eq!(result.final_damage, 0.0);
        assert!(!result.dodged && !result.killed && !result.blocked);
        assert!(!result.landed());
    }

    #[test]
    fn test_tags_are_deduplicated() {
        let event = DamageEvent::physical(ActorId(1), ActorId(2), 5.0)
            .with_tag(DamageTag::Melee)
            .with_tag(DamageTag::Melee);
        assert_eq!(event.tags.len(), 1);
    }
}
