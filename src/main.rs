//! RogueSim - combat simulation core for a top-down action roguelike
//!
//! Runs encounters headless, driven by a scripted autopilot.

use std::process::ExitCode;
use std::sync::Arc;

use roguesim::cli::{parse_args, Args};
use roguesim::headless::runner::load_content;
use roguesim::headless::{run_headless, simulate, HeadlessRunConfig};

fn build_config(args: &Args) -> Result<HeadlessRunConfig, String> {
    let mut config = match &args.headless {
        Some(path) => HeadlessRunConfig::load_from_file(path)?,
        None => HeadlessRunConfig::for_encounter(args.encounter.clone()),
    };
    if let Some(output) = &args.output {
        config.output_path = Some(output.to_string_lossy().into_owned());
    }
    if let Some(max_duration) = args.max_duration {
        config.max_duration_secs = max_duration;
    }
    if args.seed.is_some() {
        config.random_seed = args.seed;
    }
    Ok(config)
}

fn run(args: Args) -> Result<(), String> {
    let config = build_config(&args)?;
    if !args.fast {
        return run_headless(config);
    }

    let content = Arc::new(load_content(&config)?);
    let result = simulate(&config, content)?;
    let json = serde_json::to_string_pretty(&result)
        .map_err(|e| format!("Failed to serialize result: {}", e))?;
    println!("{}", json);
    Ok(())
}

fn main() -> ExitCode {
    match run(parse_args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
