//! Balance testing utilities.
//!
//! Tools for resolving many seeded encounters of one matchup and checking
//! that win rates stay inside an acceptable band.

use arena_core::combatant::Side;
use arena_core::config::RuleSet;
use arena_core::data::TemplateProvider;
use arena_core::encounter::{run_encounter, CombatantSpec};
use arena_core::report::{EncounterReport, Outcome};
use arena_core::rng::SeededRandom;

/// Statistics for a set of encounters.
#[derive(Debug, Clone, Default)]
pub struct MatchupStats {
    /// Total encounters resolved.
    pub total: u32,
    /// Wins for side A.
    pub wins_a: u32,
    /// Wins for side B.
    pub wins_b: u32,
    /// Draws (round cap or mutual wipe).
    pub draws: u32,
    /// Sum of rounds played, for the average.
    pub total_rounds: u64,
    /// Surviving side-A combatants summed over all encounters.
    pub survivors_a: u64,
    /// Surviving side-B combatants summed over all encounters.
    pub survivors_b: u64,
}

impl MatchupStats {
    /// Fold one report into the totals.
    pub fn record(&mut self, report: &EncounterReport) {
        self.total += 1;
        match report.outcome {
            Outcome::WinA => self.wins_a += 1,
            Outcome::WinB => self.wins_b += 1,
            Outcome::Draw => self.draws += 1,
        }
        self.total_rounds += u64::from(report.rounds_played());
        self.survivors_a += report.survivors(Side::A).len() as u64;
        self.survivors_b += report.survivors(Side::B).len() as u64;
    }

    /// Calculate win rate for side A (0.0 to 1.0).
    pub fn win_rate_a(&self) -> f64 {
        if self.total == 0 {
            return 0.5;
        }
        f64::from(self.wins_a) / f64::from(self.total)
    }

    /// Calculate win rate for side B (0.0 to 1.0).
    pub fn win_rate_b(&self) -> f64 {
        if self.total == 0 {
            return 0.5;
        }
        f64::from(self.wins_b) / f64::from(self.total)
    }

    /// Mean rounds per encounter.
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_rounds(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.total_rounds as f64 / f64::from(self.total)
    }

    /// Check if the matchup is balanced (side A win rate within range).
    pub fn is_balanced(&self, min_rate: f64, max_rate: f64) -> bool {
        let rate = self.win_rate_a();
        rate >= min_rate && rate <= max_rate
    }
}

/// Resolve the same matchup for `count` consecutive seeds.
///
/// # Panics
///
/// Panics if the matchup cannot be constructed.
pub fn sweep(
    provider: &dyn TemplateProvider,
    side_a: &[CombatantSpec],
    side_b: &[CombatantSpec],
    rules: &RuleSet,
    seed_start: u64,
    count: u32,
) -> MatchupStats {
    let mut stats = MatchupStats::default();
    for seed in seed_start..seed_start + u64::from(count) {
        let report = run_encounter(provider, side_a, side_b, rules, SeededRandom::new(seed))
            .unwrap_or_else(|e| panic!("matchup failed at seed {seed}: {e}"));
        stats.record(&report);
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{standard_library, standard_rules};

    #[test]
    fn test_empty_stats_are_neutral() {
        let stats = MatchupStats::default();
        assert!((stats.win_rate_a() - 0.5).abs() < f64::EPSILON);
        assert!(stats.avg_rounds().abs() < f64::EPSILON);
    }

    #[test]
    fn test_krieger_beats_lone_goblin() {
        let stats = sweep(
            &standard_library(),
            &[CombatantSpec::new("krieger")],
            &[CombatantSpec::new("goblin_lv1")],
            &standard_rules(),
            0,
            20,
        );
        assert_eq!(stats.total, 20);
        assert_eq!(stats.wins_a + stats.wins_b + stats.draws, 20);
        // 100 HP and 5 armor against a 55 HP goblin hitting for 1
        assert!(stats.win_rate_a() > 0.9, "win rate {}", stats.win_rate_a());
    }

    #[test]
    fn test_mirror_match_is_roughly_even() {
        let stats = sweep(
            &standard_library(),
            &[CombatantSpec::new("skelett_lv2")],
            &[CombatantSpec::new("skelett_lv2")],
            &standard_rules(),
            100,
            50,
        );
        assert!(stats.is_balanced(0.2, 0.8), "win rate {}", stats.win_rate_a());
    }
}
