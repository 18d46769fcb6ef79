//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the engine produces identical
//! results given identical templates, rules and seeds.
//!
//! # Testing Strategy
//!
//! Encounters must be replayable bit-for-bit from their seed. Sources of
//! non-determinism include:
//!
//! - **Floating-point math**: derived stats use [`arena_core::math::Fixed`];
//!   the only floats are the raw rolls from the random source.
//!
//! - **HashMap iteration order**: the engine keys effects, resources and
//!   templates with `BTreeMap` and walks the roster in id order.
//!
//! - **Ambient randomness**: every roll comes from the encounter's injected
//!   [`arena_core::rng::RandomSource`].
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual formulas and effect hooks
//! 2. **Property tests**: random seeds and rosters still replay exactly
//! 3. **Integration tests**: shipped scenarios are reproducible
//! 4. **Parallel tests**: N encounters on N threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use arena_core::ai::AiController;
use arena_core::encounter::Encounter;
use arena_core::report::EncounterReport;
use arena_core::rng::RandomSource;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps simulated per run.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic engine).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Encounter is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a stateful process several times and compare final hashes.
///
/// # Arguments
///
/// * `runs` - Number of independent runs
/// * `steps` - Number of steps per run
/// * `setup` - Creates the initial state
/// * `step` - Advances the state by one step
/// * `hash` - Hashes the final state
///
/// # Example
///
/// ```
/// use arena_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(3, 10, || 0u64, |n| *n += 2, |n| *n);
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..steps {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Resolve an encounter to completion with AI control on both sides.
///
/// # Panics
///
/// Panics if the engine reports an error.
pub fn run_to_report<R: RandomSource>(mut encounter: Encounter<R>) -> EncounterReport {
    encounter
        .run(&mut AiController)
        .unwrap_or_else(|e| panic!("encounter failed: {e}"))
}

/// Hash of a finished report's canonical bytes.
///
/// # Panics
///
/// Panics if the report cannot be encoded.
#[must_use]
pub fn report_hash(report: &EncounterReport) -> u64 {
    report
        .state_hash()
        .unwrap_or_else(|e| panic!("report encoding failed: {e}"))
}

/// Resolve the encounter built by `setup_fn` `runs` times and compare the
/// final report hashes.
///
/// # Example
///
/// ```
/// use arena_core::rng::SeededRandom;
/// use arena_test_utils::determinism::verify_encounter_determinism;
/// use arena_test_utils::fixtures::krieger_vs_goblin;
///
/// let result = verify_encounter_determinism(|| krieger_vs_goblin(SeededRandom::new(9)), 3);
/// result.assert_deterministic();
/// ```
pub fn verify_encounter_determinism<R, F>(setup_fn: F, runs: usize) -> DeterminismResult
where
    R: RandomSource,
    F: Fn() -> Encounter<R>,
{
    let hashes: Vec<u64> = (0..runs)
        .map(|_| report_hash(&run_to_report(setup_fn())))
        .collect();
    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        steps: 0,
    }
}

/// Result of parallel encounter runs.
#[derive(Debug, Clone)]
pub struct ParallelRunResult {
    /// Final report hash from each encounter.
    pub hashes: Vec<u64>,
    /// Number of encounters run.
    pub num_runs: usize,
}

impl ParallelRunResult {
    /// Check if all encounters produced identical reports.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all encounters matched.
    ///
    /// # Panics
    ///
    /// Panics if encounters produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel encounters diverged!\n\
                 Encounters: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_runs,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Resolve `num_runs` encounters on scoped threads and collect report hashes.
///
/// Each thread builds its own encounter, so this also checks that no state
/// leaks between concurrently running encounters.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn run_parallel_encounters<R, F>(setup_fn: F, num_runs: usize) -> ParallelRunResult
where
    R: RandomSource,
    F: Fn() -> Encounter<R> + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_runs)
            .map(|_| s.spawn(|| report_hash(&run_to_report(setup_fn()))))
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|_| panic!("encounter thread panicked")))
            .collect()
    });

    ParallelRunResult { hashes, num_runs }
}

/// Step two copies of an encounter side by side, finding the first step
/// whose roster state differs.
///
/// # Returns
///
/// `None` if both copies stayed identical until they finished, `Some(step)`
/// otherwise.
///
/// # Panics
///
/// Panics if the engine reports an error.
pub fn find_first_divergence<R, F>(setup_fn: F, max_steps: u64) -> Option<u64>
where
    R: RandomSource,
    F: Fn() -> Encounter<R>,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    if roster_hash(&first) != roster_hash(&second) {
        return Some(0);
    }

    for step in 1..=max_steps {
        if first.is_over() && second.is_over() {
            break;
        }
        first
            .advance(&mut AiController)
            .unwrap_or_else(|e| panic!("encounter failed: {e}"));
        second
            .advance(&mut AiController)
            .unwrap_or_else(|e| panic!("encounter failed: {e}"));

        if roster_hash(&first) != roster_hash(&second) || first.phase() != second.phase() {
            tracing::warn!(step, round = first.round(), "Encounters diverged");
            return Some(step);
        }
    }

    None
}

/// Verify that encoding and decoding a report preserves it exactly.
pub fn verify_serialization_determinism(report: &EncounterReport) -> bool {
    let Ok(bytes) = report.to_bytes() else {
        return false;
    };
    let Ok(restored) = EncounterReport::from_bytes(&bytes) else {
        return false;
    };
    restored == *report && restored.to_bytes().is_ok_and(|b| b == bytes)
}

/// Hash of every combatant's current snapshot.
#[must_use]
pub fn roster_hash<R: RandomSource>(encounter: &Encounter<R>) -> u64 {
    let mut hasher = DefaultHasher::new();
    for combatant in encounter.roster() {
        combatant.snapshot().hash(&mut hasher);
    }
    encounter.round().hash(&mut hasher);
    hasher.finish()
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for engine testing.
///
/// These generate random but reproducible inputs: seeds, rosters drawn from
/// the shipped templates, and attribute blocks for formula properties.
pub mod strategies {
    use arena_core::data::Attributes;
    use arena_core::effects::EffectKind;
    use arena_core::encounter::CombatantSpec;
    use proptest::prelude::*;

    /// Hero template ids in the shipped data.
    pub const HEROES: [&str; 4] = ["krieger", "magier", "schurke", "kleriker"];

    /// Monster template ids in the shipped data.
    pub const MONSTERS: [&str; 5] = [
        "goblin_lv1",
        "goblin_krieger_lv2",
        "goblin_archer_lv2",
        "goblin_shaman_lv3",
        "skelett_lv2",
    ];

    /// Any encounter seed.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }

    /// Attribute scores in a plausible range (3-20).
    pub fn arb_attribute_score() -> impl Strategy<Value = i32> {
        3i32..=20
    }

    /// A full attribute block.
    pub fn arb_attributes() -> impl Strategy<Value = Attributes> {
        (
            arb_attribute_score(),
            arb_attribute_score(),
            arb_attribute_score(),
            arb_attribute_score(),
            arb_attribute_score(),
        )
            .prop_map(|(s, d, i, c, w)| Attributes::new(s, d, i, c, w))
    }

    /// Any status effect kind.
    pub fn arb_effect_kind() -> impl Strategy<Value = EffectKind> {
        proptest::sample::select(EffectKind::ALL.to_vec())
    }

    /// Effect potency (1-20).
    pub fn arb_potency() -> impl Strategy<Value = i32> {
        1i32..=20
    }

    /// Effect duration (1-5 rounds).
    pub fn arb_duration() -> impl Strategy<Value = u32> {
        1u32..=5
    }

    /// Damage amounts (0-200).
    pub fn arb_damage() -> impl Strategy<Value = u32> {
        0u32..=200
    }

    /// One to `max` heroes at levels 1-3.
    pub fn arb_party(max: usize) -> impl Strategy<Value = Vec<CombatantSpec>> {
        proptest::collection::vec(
            (proptest::sample::select(HEROES.to_vec()), 1u32..=3),
            1..=max,
        )
        .prop_map(to_specs)
    }

    /// One to `max` monsters at levels 1-3.
    pub fn arb_band(max: usize) -> impl Strategy<Value = Vec<CombatantSpec>> {
        proptest::collection::vec(
            (proptest::sample::select(MONSTERS.to_vec()), 1u32..=3),
            1..=max,
        )
        .prop_map(to_specs)
    }

    fn to_specs(entries: Vec<(&'static str, u32)>) -> Vec<CombatantSpec> {
        entries
            .into_iter()
            .map(|(id, level)| CombatantSpec::new(id).at_level(level))
            .collect()
    }
}
