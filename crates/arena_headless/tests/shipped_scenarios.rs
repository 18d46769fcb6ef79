//! Shipped data and scenario tests for arena_headless.
//!
//! These load the real files under `assets/` from disk, the same way the
//! CLI does.

use std::path::{Path, PathBuf};

use arena_core::data::TemplateProvider;
use arena_core::math::Fixed;
use arena_core::report::EncounterReport;
use arena_headless::batch::{run_batch, verify_determinism, BatchConfig};
use arena_headless::render::CombatLog;
use arena_headless::scenario::Scenario;
use arena_headless::template_loader::{load_directory, load_rules, load_templates};

fn assets() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets")
}

fn scenario_paths() -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(assets().join("scenarios"))
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|e| e == "ron"))
        .collect();
    paths.sort();
    paths
}

#[test]
fn test_shipped_templates_are_clean() {
    let summary = load_directory(&assets().join("data/templates")).unwrap();
    assert!(summary.is_clean(), "{:?}", summary.failed);
    assert_eq!(summary.loaded.len(), 3);
    assert!(load_rules(&assets().join("data/rules.ron")).is_ok());
}

#[test]
fn test_fireball_uses_current_values() {
    let library = load_templates(&assets().join("data/templates")).unwrap();
    let fireball = library.skill("fireball").unwrap();
    let power = fireball.power.as_ref().unwrap();
    assert_eq!(power.base_amount, Some(10));
    assert_eq!(power.multiplier, Fixed::from_num(2));
}

#[test]
fn test_every_shipped_scenario_resolves() {
    let library = load_templates(&assets().join("data/templates")).unwrap();
    let rules = load_rules(&assets().join("data/rules.ron")).unwrap();

    let paths = scenario_paths();
    assert!(paths.len() >= 3);
    for path in paths {
        let scenario = Scenario::load(&path).unwrap();
        let report = scenario.resolve(&library, &rules, scenario.seed).unwrap();
        let cap = scenario.rules_for(&rules).max_rounds.unwrap_or(u32::MAX);
        assert!(report.rounds_played() <= cap, "{}", path.display());

        let bytes = report.to_bytes().unwrap();
        assert_eq!(EncounterReport::from_bytes(&bytes).unwrap(), report);
    }
}

#[test]
fn test_scenario_seed_is_reproducible_across_runs() {
    let library = load_templates(&assets().join("data/templates")).unwrap();
    let rules = load_rules(&assets().join("data/rules.ron")).unwrap();
    let scenario = Scenario::load(assets().join("scenarios/goblin_ambush.ron")).unwrap();

    assert!(verify_determinism(&scenario, &library, &rules, scenario.seed, 3).unwrap());

    let first = scenario.resolve(&library, &rules, scenario.seed).unwrap();
    let second = scenario.resolve(&library, &rules, scenario.seed).unwrap();
    let roster = scenario
        .build(&library, &rules, arena_core::rng::SeededRandom::new(scenario.seed))
        .unwrap();
    let log = CombatLog::new(roster.roster());
    assert_eq!(log.render(&first), log.render(&second));
}

#[test]
fn test_crypt_patrol_uses_fixed_reward() {
    let library = load_templates(&assets().join("data/templates")).unwrap();
    let rules = load_rules(&assets().join("data/rules.ron")).unwrap();
    let scenario = Scenario::load(assets().join("scenarios/crypt_patrol.ron")).unwrap();
    let reward = scenario.xp_reward.unwrap();

    let results = run_batch(BatchConfig::new(scenario.clone(), 6), &library, &rules);
    assert!(results.errors.is_empty());

    for metrics in &results.encounters {
        let report = scenario.resolve(&library, &rules, metrics.seed).unwrap();
        if let Some(award) = report.leveling.first() {
            let winners = u32::try_from(report.leveling.len()).unwrap();
            assert_eq!(award.xp_awarded, reward / winners);
        }
    }
}
