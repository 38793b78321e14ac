//! Data-Driven Content Registry
//!
//! Enemy stat blocks, ability loadouts, boss phases and encounter compositions
//! are defined in `assets/config/content.ron` instead of in Rust. The registry is
//! read-only to the combat core: the simulation holds it behind an `Arc` and
//! only ever looks definitions up by id.
//!
//! ## Usage
//! ```ignore
//! let registry = load_content_registry()?;
//! let ghoul = registry.enemy("ghoul").unwrap();
//! println!("Ghoul health: {}", ghoul.max_health);
//! ```

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::components::{Archetype, Tag};
use super::enemy_ai::abilities::AbilityKind;

pub const DEFAULT_CONTENT_PATH: &str = "assets/config/content.ron";

fn default_ability_radius() -> f32 {
    0.0
}

fn default_count() -> u32 {
    1
}

/// One ability an enemy can use, with its tuning numbers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AbilityLoadout {
    pub kind: AbilityKind,
    /// Cooldown after the ability starts, in seconds
    pub cooldown: f32,
    /// Maximum distance to the target at which the ability starts
    pub range: f32,
    /// Damage per hit / per tick
    pub damage: f32,
    /// Area radius for slams, pools and quakes (0 = ability default)
    #[serde(default = "default_ability_radius")]
    pub radius: f32,
}

/// A boss phase: active while health ratio is at or below `hp_threshold`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BossPhase {
    pub name: String,
    /// Upper health ratio bound, in (0, 1]
    pub hp_threshold: f32,
    /// Abilities tried in order each tick
    pub abilities: Vec<AbilityKind>,
}

/// Static enemy stat block.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnemyDefinition {
    pub id: String,
    pub name: String,
    pub archetype: Archetype,
    pub max_health: f32,
    #[serde(default)]
    pub armor: f32,
    pub speed: f32,
    pub radius: f32,
    /// Basic attack damage
    pub contact_damage: f32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub abilities: Vec<AbilityLoadout>,
    /// Boss phases in order, highest threshold first
    #[serde(default)]
    pub phases: Vec<BossPhase>,
    /// Definition spawned by `Splitter` deaths and `SummonBrood`
    #[serde(default)]
    pub minion: Option<String>,
    #[serde(default)]
    pub experience: u32,
}

impl EnemyDefinition {
    pub fn ability(&self, kind: AbilityKind) -> Option<&AbilityLoadout> {
        self.abilities.iter().find(|a| a.kind == kind)
    }

    pub fn is_boss(&self) -> bool {
        self.archetype == Archetype::Boss
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EncounterSlot {
    pub enemy: String,
    #[serde(default = "default_count")]
    pub count: u32,
}

/// A combat node's enemy composition.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EncounterDefinition {
    pub id: String,
    pub name: String,
    pub enemies: Vec<EncounterSlot>,
}

impl EncounterDefinition {
    pub fn total_enemies(&self) -> u32 {
        self.enemies.iter().map(|slot| slot.count).sum()
    }
}

/// Root structure for the content.ron file
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ContentConfig {
    pub enemies: Vec<EnemyDefinition>,
    #[serde(default)]
    pub encounters: Vec<EncounterDefinition>,
}

/// All static content, keyed by id.
#[derive(Resource, Debug, Clone, Default)]
pub struct ContentRegistry {
    enemies: HashMap<String, EnemyDefinition>,
    encounters: HashMap<String, EncounterDefinition>,
}

impl ContentRegistry {
    /// Create from a loaded config
    pub fn new(config: ContentConfig) -> Self {
        Self {
            enemies: config.enemies.into_iter().map(|e| (e.id.clone(), e)).collect(),
            encounters: config
                .encounters
                .into_iter()
                .map(|e| (e.id.clone(), e))
                .collect(),
        }
    }

    /// Build a registry directly from definitions (tests, tools).
    pub fn from_definitions(enemies: Vec<EnemyDefinition>, encounters: Vec<EncounterDefinition>) -> Self {
        Self::new(ContentConfig { enemies, encounters })
    }

    pub fn from_ron_str(contents: &str) -> Result<Self, String> {
        let config: ContentConfig =
            ron::from_str(contents).map_err(|e| format!("Failed to parse content: {}", e))?;
        let registry = Self::new(config);
        registry
            .validate()
            .map_err(|problems| format!("Invalid content: {}", problems.join("; ")))?;
        Ok(registry)
    }

    pub fn enemy(&self, id: &str) -> Option<&EnemyDefinition> {
        self.enemies.get(id)
    }

    pub fn encounter(&self, id: &str) -> Option<&EncounterDefinition> {
        self.encounters.get(id)
    }

    pub fn enemy_ids(&self) -> impl Iterator<Item = &String> {
        self.enemies.keys()
    }

    pub fn encounter_ids(&self) -> impl Iterator<Item = &String> {
        self.encounters.keys()
    }

    /// Check every cross-reference and numeric range. Returns all problems found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut problems = Vec::new();

        for def in self.enemies.values() {
            if def.max_health <= 0.0 {
                problems.push(format!("{}: max_health must be positive", def.id));
            }
            if def.armor < 0.0 || def.speed < 0.0 || def.radius <= 0.0 {
                problems.push(format!("{}: negative armor/speed or non-positive radius", def.id));
            }
            for ability in &def.abilities {
                if ability.cooldown < 0.0 || ability.range < 0.0 || ability.damage < 0.0 {
                    problems.push(format!("{}: {:?} has negative tuning", def.id, ability.kind));
                }
            }
            if let Some(minion) = &def.minion {
                if !self.enemies.contains_key(minion) {
                    problems.push(format!("{}: unknown minion '{}'", def.id, minion));
                }
            }
            if def.is_boss() && def.phases.is_empty() {
                problems.push(format!("{}: boss has no phases", def.id));
            }
            let mut previous = f32::INFINITY;
            for phase in &def.phases {
                if !(phase.hp_threshold > 0.0 && phase.hp_threshold <= 1.0) {
                    problems.push(format!("{}: phase '{}' threshold outside (0, 1]", def.id, phase.name));
                }
                if phase.hp_threshold >= previous {
                    problems.push(format!("{}: phase thresholds must be descending", def.id));
                }
                previous = phase.hp_threshold;
                for kind in &phase.abilities {
                    if def.ability(*kind).is_none() {
                        problems.push(format!(
                            "{}: phase '{}' uses {:?} without a loadout",
                            def.id, phase.name, kind
                        ));
                    }
                }
            }
        }

        for encounter in self.encounters.values() {
            if encounter.enemies.is_empty() {
                problems.push(format!("encounter {}: no enemies", encounter.id));
            }
            for slot in &encounter.enemies {
                if !self.enemies.contains_key(&slot.enemy) {
                    problems.push(format!("encounter {}: unknown enemy '{}'", encounter.id, slot.enemy));
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            problems.sort();
            Err(problems)
        }
    }
}

/// Load the registry from an explicit path
pub fn load_content_from_file(path: &str) -> Result<ContentRegistry, String> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
    let registry =
        ContentRegistry::from_ron_str(&contents).map_err(|e| format!("{} ({})", e, path))?;

    info!(
        "Loaded {} enemy and {} encounter definitions from {}",
        registry.enemies.len(),
        registry.encounters.len(),
        path
    );

    Ok(registry)
}

/// Load the registry from assets/config/content.ron
pub fn load_content_registry() -> Result<ContentRegistry, String> {
    load_content_from_file(DEFAULT_CONTENT_PATH)
}
