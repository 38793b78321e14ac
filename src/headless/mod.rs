//! Headless mode for agentic testing
//!
//! This module runs encounters without any graphical output, driving the player
//! with a simple autopilot. Suitable for automated testing and balance sweeps.
//!
//! ## Usage
//!
//! ```bash
//! # Run a headless encounter on the bevy schedule runner
//! cargo run --release -- --headless run_config.json
//!
//! # Same run in a tight loop, no app
//! cargo run --release -- --headless run_config.json --fast
//! ```
//!
//! ## JSON Configuration
//!
//! ```json
//! {
//!   "encounter": "brute_camp",
//!   "depth": 2,
//!   "elite": true,
//!   "skills": ["Cleave", "FrostNova", "CallWolf"],
//!   "passives": [{ "VenomBlade": { "stacks": 2 } }],
//!   "items": [{ "ThornMail": { "damage": 3.0 } }],
//!   "max_duration_secs": 120,
//!   "random_seed": 42
//! }
//! ```

pub mod autopilot;
pub mod config;
pub mod runner;

pub use config::HeadlessRunConfig;
pub use runner::{run_headless, simulate, RunOutcome, RunResult};
