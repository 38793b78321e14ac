//! RogueSim - combat simulation core for a top-down action roguelike
//!
//! A fixed-step simulation of the player, enemies, summons, projectiles and
//! hazards, with a single damage pipeline, bounded trigger chains, stacking
//! status effects and telegraphed enemy abilities.
//!
//! This library exposes the core modules for testing and reuse.

pub mod cli;
pub mod combat;
pub mod headless;
pub mod simulation;

// Re-export commonly used types
pub use combat::log::{CombatLog, CombatLogEventType};
pub use headless::HeadlessRunConfig;
pub use simulation::content::ContentRegistry;
pub use simulation::Simulation;
