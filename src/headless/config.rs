//! JSON configuration parsing for headless mode
//!
//! Parses JSON run configurations and turns them into a ready-to-tick `Simulation`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::simulation::components::{Item, Passive, SkillKind, SkillSlot};
use crate::simulation::content::ContentRegistry;
use crate::simulation::spawn::{self, CombatNode};
use crate::simulation::{GameRng, Simulation};

/// Maximum number of equipped skills
pub const MAX_SKILLS: usize = 5;

/// Headless run configuration loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlessRunConfig {
    /// Encounter id from the content registry
    pub encounter: String,
    /// Depth of the combat node (scales enemy health)
    #[serde(default)]
    pub depth: u32,
    /// Whether the node rolls elite modifiers
    #[serde(default)]
    pub elite: bool,
    /// Equipped skills, in slot order
    #[serde(default = "default_skills")]
    pub skills: Vec<SkillKind>,
    #[serde(default)]
    pub passives: Vec<Passive>,
    #[serde(default)]
    pub items: Vec<Item>,
    /// Custom output path for the combat log (optional)
    #[serde(default)]
    pub output_path: Option<String>,
    /// Content file to load instead of the default (optional)
    #[serde(default)]
    pub content_path: Option<String>,
    /// Maximum run duration in seconds (default: 300)
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: f32,
    /// Random seed for deterministic run reproduction
    #[serde(default)]
    pub random_seed: Option<u64>,
}

fn default_skills() -> Vec<SkillKind> {
    vec![SkillKind::Cleave, SkillKind::ArcaneBolt]
}

fn default_max_duration() -> f32 {
    300.0
}

impl HeadlessRunConfig {
    /// Config for `encounter` with every other field defaulted.
    pub fn for_encounter(encounter: impl Into<String>) -> Self {
        Self {
            encounter: encounter.into(),
            depth: 0,
            elite: false,
            skills: default_skills(),
            passives: Vec::new(),
            items: Vec::new(),
            output_path: None,
            content_path: None,
            max_duration_secs: default_max_duration(),
            random_seed: None,
        }
    }

    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, String> {
        let config: HeadlessRunConfig =
            serde_json::from_str(contents).map_err(|e| format!("Failed to parse JSON: {}", e))?;
        config.validate_shape()?;
        Ok(config)
    }

    /// Checks that don't need the content registry
    fn validate_shape(&self) -> Result<(), String> {
        if self.encounter.is_empty() {
            return Err("encounter must not be empty".to_string());
        }
        if self.skills.len() > MAX_SKILLS {
            return Err(format!(
                "at most {} skills may be equipped, got {}",
                MAX_SKILLS,
                self.skills.len()
            ));
        }
        if self.max_duration_secs <= 0.0 {
            return Err("max_duration_secs must be positive".to_string());
        }
        Ok(())
    }

    /// Validate the configuration against the loaded content
    pub fn validate(&self, content: &ContentRegistry) -> Result<(), String> {
        self.validate_shape()?;
        if content.encounter(&self.encounter).is_none() {
            let known: Vec<&str> = content.encounter_ids().map(String::as_str).collect();
            return Err(format!(
                "Unknown encounter: '{}'. Valid encounters: {}",
                self.encounter,
                known.join(", ")
            ));
        }
        Ok(())
    }

    pub fn combat_node(&self) -> CombatNode {
        CombatNode {
            encounter_id: self.encounter.clone(),
            depth: self.depth,
            elite: self.elite,
        }
    }

    /// Build the simulation: equip the player and spawn the encounter.
    pub fn build_simulation(&self, content: Arc<ContentRegistry>) -> Result<Simulation, String> {
        self.validate(&content)?;
        let rng = match self.random_seed {
            Some(seed) => GameRng::from_seed(seed),
            None => GameRng::from_entropy(),
        };
        let mut sim = Simulation::new(content, rng);

        let state = &mut sim.player.state;
        state.skills = self.skills.iter().copied().map(SkillSlot::new).collect();
        state.passives = self.passives.clone();
        state.items = self.items.clone();

        let spawned = spawn::spawn_encounter(&mut sim, &self.combat_node());
        if spawned.is_empty() {
            return Err(format!("Encounter '{}' spawned no enemies", self.encounter));
        }
        Ok(sim)
    }
}
