//! Command-line interface for RogueSim
//!
//! Runs a headless encounter, either on the bevy schedule runner or in a tight loop.

use clap::Parser;
use std::path::PathBuf;

/// Combat simulation core for a top-down action roguelike
#[derive(Parser, Debug)]
#[command(name = "roguesim")]
#[command(about = "Combat simulation core for a top-down action roguelike")]
#[command(version)]
pub struct Args {
    /// Run the encounter described by this JSON config file
    #[arg(long, value_name = "CONFIG_FILE")]
    pub headless: Option<PathBuf>,

    /// Encounter id to run when no config file is given
    #[arg(long, default_value = "crypt_patrol")]
    pub encounter: String,

    /// Output path for the combat log
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Maximum run duration in seconds (overrides the config file)
    #[arg(long)]
    pub max_duration: Option<f32>,

    /// Random seed (overrides the config file)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Tick in a tight loop instead of real time, then print the result as JSON
    #[arg(long)]
    pub fast: bool,
}

pub fn parse_args() -> Args {
    Args::parse()
}
