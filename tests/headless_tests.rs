//! Integration tests for headless run execution
//!
//! These tests verify that:
//! - Headless runs reach an outcome within their duration cap
//! - Run results are accessible programmatically
//! - Seeded RNG produces deterministic results
//! - Configs are validated against the loaded content

use std::sync::Arc;

use roguesim::headless::{simulate, HeadlessRunConfig, RunOutcome};
use roguesim::simulation::components::{Item, Passive, SkillKind};
use roguesim::simulation::content::{load_content_from_file, DEFAULT_CONTENT_PATH};
use roguesim::ContentRegistry;

fn content() -> Arc<ContentRegistry> {
    Arc::new(load_content_from_file(DEFAULT_CONTENT_PATH).expect("shipped content loads"))
}

/// Helper to create a basic run config
fn create_config(encounter: &str, seed: Option<u64>) -> HeadlessRunConfig {
    let mut config = HeadlessRunConfig::for_encounter(encounter);
    config.max_duration_secs = 60.0; // Short duration for tests
    config.random_seed = seed;
    config
}

#[test]
fn test_run_reaches_an_outcome() {
    let config = create_config("crypt_patrol", Some(12345));
    let result = simulate(&config, content()).expect("run should start");

    assert!(result.duration <= config.max_duration_secs + 0.1);
    match result.outcome {
        RunOutcome::Cleared => assert_eq!(result.kills, 4, "every enemy in the patrol died"),
        RunOutcome::Defeated => assert_eq!(result.player_health, 0.0),
        RunOutcome::Timeout => assert!(result.duration >= config.max_duration_secs),
    }
    assert_eq!(result.random_seed, Some(12345));
}

#[test]
fn test_same_seed_same_result() {
    let mut config = create_config("brute_camp", Some(42));
    config.skills = vec![SkillKind::Cleave, SkillKind::FrostNova, SkillKind::CallWolf];
    config.passives = vec![Passive::VenomBlade { stacks: 2 }];
    config.items = vec![Item::ThornMail { damage: 3.0 }];

    let content = content();
    let first = simulate(&config, Arc::clone(&content)).expect("first run");
    let second = simulate(&config, content).expect("second run");

    assert_eq!(first.outcome, second.outcome);
    assert_eq!(first.duration, second.duration);
    assert_eq!(first.kills, second.kills);
    assert_eq!(first.player_health, second.player_health);
    assert_eq!(first.damage_dealt, second.damage_dealt);
    assert_eq!(first.max_chain_depth, second.max_chain_depth);
}

#[test]
fn test_chain_depth_stays_bounded_in_a_full_run() {
    let mut config = create_config("split_nest", Some(7));
    config.passives = vec![
        Passive::VenomBlade { stacks: 1 },
        Passive::Contagion { radius: 150.0 },
        Passive::Lifesteal { fraction: 0.1 },
    ];
    config.items = vec![Item::StormHeart { radius: 120.0, damage: 2.0 }];
    let result = simulate(&config, content()).expect("run should start");
    assert!(result.max_chain_depth <= roguesim::simulation::constants::MAX_CHAIN_DEPTH);
}

#[test]
fn test_unknown_encounter_is_rejected() {
    let config = create_config("the_void", None);
    let err = simulate(&config, content()).unwrap_err();
    assert!(err.contains("Unknown encounter"), "got: {}", err);
    assert!(err.contains("crypt_patrol"), "error should list valid encounters");
}

#[test]
fn test_config_from_json_file() {
    let path = std::env::temp_dir().join("roguesim_headless_config_test.json");
    std::fs::write(&path, r#"{ "encounter": "shade_ambush", "depth": 3, "random_seed": 9 }"#)
        .expect("temp file writable");
    let config = HeadlessRunConfig::load_from_file(&path).expect("config parses");
    let _ = std::fs::remove_file(&path);

    assert_eq!(config.encounter, "shade_ambush");
    assert_eq!(config.depth, 3);
    assert_eq!(config.random_seed, Some(9));
    assert!(config.validate(&content()).is_ok());
}

#[test]
fn test_too_many_skills_is_rejected() {
    let json = r#"{
        "encounter": "crypt_patrol",
        "skills": ["Cleave", "ArcaneBolt", "FrostNova", "CallWolf", "PoisonCloud", "Cleave"]
    }"#;
    assert!(HeadlessRunConfig::from_json(json).is_err());
}
