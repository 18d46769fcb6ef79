//! Batch encounter runner for balance testing.
//!
//! Resolves one scenario across a range of seeds in parallel using rayon.
//! Every encounter is independent, so results are identical whatever the
//! thread count; they are sorted by seed before being returned.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use arena_core::ai::AiController;
use arena_core::config::RuleSet;
use arena_core::data::TemplateLibrary;
use arena_core::rng::SeededRandom;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::metrics::{BatchSummary, EncounterMetrics};
use crate::scenario::{Scenario, ScenarioError};

/// Configuration for a batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Scenario to run
    pub scenario: Scenario,
    /// Number of encounters to run
    pub count: u32,
    /// Worker threads (0 = use rayon default)
    pub parallel: u32,
    /// First seed; encounter `i` uses `seed_start + i`
    pub seed_start: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            scenario: Scenario::duel(),
            count: 100,
            parallel: 0,
            seed_start: 0,
        }
    }
}

impl BatchConfig {
    /// Create config for a specific scenario
    #[must_use]
    pub fn new(scenario: Scenario, count: u32) -> Self {
        Self {
            scenario,
            count,
            ..Default::default()
        }
    }

    /// Set seed start
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set worker thread count
    #[must_use]
    pub const fn with_parallel(mut self, threads: u32) -> Self {
        self.parallel = threads;
        self
    }
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Per-encounter metrics, sorted by seed
    pub encounters: Vec<EncounterMetrics>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Total runtime
    pub duration_seconds: f64,
    /// Errors encountered
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be written.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file is missing or malformed.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Error during batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    /// Encounter index
    pub index: u32,
    /// Seed used
    pub seed: u64,
    /// Error message
    pub message: String,
}

/// Progress tracking for batch runs
#[derive(Debug)]
pub struct BatchProgress {
    /// Total encounters
    pub total: u32,
    completed: AtomicU32,
    start_time: Instant,
}

impl BatchProgress {
    /// Create new progress tracker
    #[must_use]
    pub fn new(total: u32) -> Self {
        Self {
            total,
            completed: AtomicU32::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a finished encounter and return the new count
    pub fn record_completion(&self) -> u32 {
        self.completed.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Get current completion count
    pub fn current(&self) -> u32 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Get completion percentage
    pub fn percentage(&self) -> f64 {
        f64::from(self.current()) / f64::from(self.total.max(1)) * 100.0
    }

    /// Get estimated time remaining
    pub fn eta(&self) -> Duration {
        let completed = self.current();
        if completed == 0 {
            return Duration::from_secs(0);
        }
        let per_encounter = self.start_time.elapsed().as_secs_f64() / f64::from(completed);
        let remaining = self.total.saturating_sub(completed);
        Duration::from_secs_f64(per_encounter * f64::from(remaining))
    }
}

/// Resolve one seeded encounter of `scenario`.
///
/// # Errors
///
/// Returns the scenario or engine error if the encounter cannot be built
/// or serialized.
pub fn run_single(
    scenario: &Scenario,
    library: &TemplateLibrary,
    rules: &RuleSet,
    seed: u64,
) -> Result<EncounterMetrics, ScenarioError> {
    let mut encounter = scenario.build(library, rules, SeededRandom::new(seed))?;
    let sides: BTreeMap<_, _> = encounter
        .roster()
        .iter()
        .map(|c| (c.id(), c.side()))
        .collect();
    let report = encounter.run(&mut AiController)?;
    let hash = report.state_hash()?;
    Ok(EncounterMetrics::from_report(seed, &report, &sides, hash))
}

fn run_all(
    config: &BatchConfig,
    library: &TemplateLibrary,
    rules: &RuleSet,
    progress: &BatchProgress,
) -> Vec<Result<EncounterMetrics, BatchError>> {
    (0..config.count)
        .into_par_iter()
        .map(|i| {
            let seed = config.seed_start.wrapping_add(u64::from(i));
            let result = run_single(&config.scenario, library, rules, seed).map_err(|e| {
                warn!(index = i, seed, error = %e, "Encounter failed");
                BatchError {
                    index: i,
                    seed,
                    message: e.to_string(),
                }
            });
            let completed = progress.record_completion();
            if completed % 100 == 0 {
                debug!(
                    "Progress: {}/{} ({:.0}%, eta {}s)",
                    completed,
                    progress.total,
                    progress.percentage(),
                    progress.eta().as_secs()
                );
            }
            result
        })
        .collect()
}

/// Run a batch of encounters
pub fn run_batch(config: BatchConfig, library: &TemplateLibrary, rules: &RuleSet) -> BatchResults {
    let start = Instant::now();
    let progress = BatchProgress::new(config.count);

    info!(
        "Starting batch run: {} encounters of '{}'",
        config.count, config.scenario.name
    );

    let pool = if config.parallel > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel as usize)
            .build()
            .map_err(|e| warn!("Falling back to the global thread pool: {e}"))
            .ok()
    } else {
        None
    };
    let results = match &pool {
        Some(pool) => pool.install(|| run_all(&config, library, rules, &progress)),
        None => run_all(&config, library, rules, &progress),
    };

    let (encounters, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let mut encounters: Vec<EncounterMetrics> =
        encounters.into_iter().filter_map(Result::ok).collect();
    let mut errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();
    encounters.sort_by_key(|m| m.seed);
    errors.sort_by_key(|e| e.index);

    let summary = BatchSummary::from_encounters(&encounters);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} encounters in {:.2}s (A {:.1}% / B {:.1}% / draw {})",
        encounters.len(),
        duration_seconds,
        summary.win_rate_a * 100.0,
        summary.win_rate_b * 100.0,
        summary.draws
    );

    BatchResults {
        config,
        encounters,
        summary,
        duration_seconds,
        errors,
    }
}

/// Verify determinism by running the same seed several times.
///
/// Compares the hash of each serialized report, so any divergence in any
/// event fails the check.
///
/// # Errors
///
/// Returns the first error if an encounter cannot be resolved.
pub fn verify_determinism(
    scenario: &Scenario,
    library: &TemplateLibrary,
    rules: &RuleSet,
    seed: u64,
    runs: u32,
) -> Result<bool, ScenarioError> {
    let hashes = (0..runs.max(1))
        .map(|_| run_single(scenario, library, rules, seed).map(|m| m.report_hash))
        .collect::<Result<Vec<_>, _>>()?;
    let first = hashes[0];
    let deterministic = hashes.iter().all(|&h| h == first);
    if !deterministic {
        warn!(seed, ?hashes, "Determinism check failed");
    }
    Ok(deterministic)
}
