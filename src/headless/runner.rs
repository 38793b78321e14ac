//! Headless run execution
//!
//! Runs a combat encounter without any graphical output, suitable for automated
//! testing. Two drivers share the same setup and end detection:
//! - [`run_headless`] builds a bevy `App` on a 60 Hz schedule runner
//! - [`simulate`] ticks the simulation in a tight loop (`--fast`, tests)

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::combat::log::CombatLogEventType;
use crate::combat::{advance_simulation, CombatSimPlugin};
use crate::simulation::constants::{FIXED_DT, TICK_RATE};
use crate::simulation::content::{load_content_from_file, load_content_registry, ContentRegistry};
use crate::simulation::Simulation;

use super::autopilot;
use super::config::HeadlessRunConfig;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunOutcome {
    /// Every enemy died
    Cleared,
    /// The player died
    Defeated,
    /// Neither side finished before the duration cap
    Timeout,
}

/// Result of a completed headless run
///
/// This struct provides programmatic access to run results for testing and analysis.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub outcome: RunOutcome,
    /// Simulated seconds
    pub duration: f32,
    pub kills: u32,
    pub player_health: f32,
    pub player_level: u32,
    pub damage_dealt: f32,
    pub damage_taken: f32,
    /// Deepest trigger chain seen during the run
    pub max_chain_depth: u32,
    /// Random seed used (if deterministic mode)
    pub random_seed: Option<u64>,
    /// Where the combat log was written, if anywhere
    pub log_path: Option<String>,
}

/// Resource to track headless run state
#[derive(Resource)]
pub struct HeadlessRunState {
    pub max_duration: f32,
    pub output_path: Option<String>,
    pub random_seed: Option<u64>,
    pub complete: bool,
    pub result: Option<RunResult>,
}

/// Load the content named by the config, or the default content file.
pub fn load_content(config: &HeadlessRunConfig) -> Result<ContentRegistry, String> {
    match &config.content_path {
        Some(path) => load_content_from_file(path),
        None => load_content_registry(),
    }
}

/// Whether the run is over, and how.
pub fn check_outcome(sim: &Simulation, max_duration: f32) -> Option<RunOutcome> {
    if sim.is_player_defeated() {
        Some(RunOutcome::Defeated)
    } else if sim.is_encounter_cleared() {
        Some(RunOutcome::Cleared)
    } else if sim.time >= max_duration {
        Some(RunOutcome::Timeout)
    } else {
        None
    }
}

fn build_run_result(sim: &Simulation, outcome: RunOutcome, random_seed: Option<u64>) -> RunResult {
    RunResult {
        outcome,
        duration: sim.time,
        kills: sim.stats.kills,
        player_health: sim.player.base.health,
        player_level: sim.player.state.level,
        damage_dealt: sim.stats.player_damage_dealt,
        damage_taken: sim.stats.player_damage_taken,
        max_chain_depth: sim.telemetry.max_depth,
        random_seed,
        log_path: None,
    }
}

/// Log the end of the run and save the combat log if an output path was given.
fn finish_run(sim: &mut Simulation, outcome: RunOutcome, output_path: Option<&str>, random_seed: Option<u64>) -> RunResult {
    let message = match outcome {
        RunOutcome::Cleared => format!("Encounter cleared in {:.1}s", sim.time),
        RunOutcome::Defeated => format!("Player defeated after {:.1}s", sim.time),
        RunOutcome::Timeout => format!("Run timed out after {:.1}s", sim.time),
    };
    info!("{}", message);
    sim.combat_log.log(CombatLogEventType::MatchEvent, message);

    let mut result = build_run_result(sim, outcome, random_seed);
    if let Some(path) = output_path {
        match sim.combat_log.save_to_file(Some(path)) {
            Ok(filename) => result.log_path = Some(filename),
            Err(e) => error!("Failed to save combat log: {}", e),
        }
    }
    result
}

/// Run the encounter to completion without a bevy app.
pub fn simulate(config: &HeadlessRunConfig, content: Arc<ContentRegistry>) -> Result<RunResult, String> {
    let mut sim = config.build_simulation(content)?;
    sim.combat_log
        .log(CombatLogEventType::MatchEvent, "Run started (fast mode)".to_string());

    loop {
        if let Some(outcome) = check_outcome(&sim, config.max_duration_secs) {
            return Ok(finish_run(
                &mut sim,
                outcome,
                config.output_path.as_deref(),
                config.random_seed,
            ));
        }
        autopilot::drive_player(&mut sim, FIXED_DT);
        sim.tick(FIXED_DT);
    }
}

// ============================================================================
// Bevy App Driver
// ============================================================================

/// Plugin for headless run execution
pub struct HeadlessPlugin {
    pub config: HeadlessRunConfig,
    pub content: Arc<ContentRegistry>,
}

impl Plugin for HeadlessPlugin {
    fn build(&self, app: &mut App) {
        let simulation = match self.config.build_simulation(Arc::clone(&self.content)) {
            Ok(sim) => sim,
            Err(e) => {
                error!("Invalid run configuration: {}", e);
                app.add_systems(Startup, |mut exit: EventWriter<AppExit>| {
                    exit.send(AppExit::error());
                });
                return;
            }
        };

        app.insert_resource(simulation)
            .insert_resource(HeadlessRunState {
                max_duration: self.config.max_duration_secs,
                output_path: self.config.output_path.clone(),
                random_seed: self.config.random_seed,
                complete: false,
                result: None,
            })
            .add_systems(Startup, headless_setup_run)
            .add_systems(
                FixedUpdate,
                (
                    headless_drive_player.before(advance_simulation),
                    headless_check_run_end.after(advance_simulation),
                ),
            )
            .add_systems(PostUpdate, headless_exit_on_complete);
    }
}

fn headless_setup_run(mut sim: ResMut<Simulation>, state: Res<HeadlessRunState>) {
    match state.random_seed {
        Some(seed) => info!("Using deterministic RNG with seed: {}", seed),
        None => info!("Using non-deterministic RNG (no seed provided)"),
    }
    sim.combat_log
        .log(CombatLogEventType::MatchEvent, "Run started (headless mode)".to_string());
    info!(
        "Headless run setup complete: {} enemies",
        sim.living_enemy_count()
    );
}

fn headless_drive_player(time: Res<Time<Fixed>>, state: Res<HeadlessRunState>, mut sim: ResMut<Simulation>) {
    if state.complete {
        return;
    }
    autopilot::drive_player(&mut sim, time.delta_secs());
}

fn headless_check_run_end(mut sim: ResMut<Simulation>, mut state: ResMut<HeadlessRunState>) {
    if state.complete {
        return;
    }
    let Some(outcome) = check_outcome(&sim, state.max_duration) else {
        return;
    };
    let result = finish_run(&mut sim, outcome, state.output_path.as_deref(), state.random_seed);
    if let Some(path) = &result.log_path {
        println!("Run complete. Log saved to: {}", path);
    }
    state.result = Some(result);
    state.complete = true;
}

/// Exit the app when the run is complete
fn headless_exit_on_complete(state: Res<HeadlessRunState>, mut exit: EventWriter<AppExit>) {
    if state.complete {
        exit.send(AppExit::Success);
    }
}

/// Run a headless encounter with the given configuration
pub fn run_headless(config: HeadlessRunConfig) -> Result<(), String> {
    let content = Arc::new(load_content(&config)?);
    config.validate(&content)?;

    println!("Starting headless run...");
    println!("  Encounter: {} (depth {}{})", config.encounter, config.depth, if config.elite { ", elite" } else { "" });
    println!("  Skills: {:?}", config.skills);
    println!("  Max duration: {:.0}s", config.max_duration_secs);

    App::new()
        // Minimal plugins - no window, no rendering
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / TICK_RATE,
            ))),
        )
        .add_plugins(LogPlugin::default())
        .add_plugins(CombatSimPlugin)
        .add_plugins(HeadlessPlugin { config, content })
        .run();

    Ok(())
}
