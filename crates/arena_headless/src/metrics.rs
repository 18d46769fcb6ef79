//! Encounter metrics for balance analysis.
//!
//! Per-encounter numbers are derived from the event log after the fact, so
//! the engine does not need any instrumentation hooks.

use std::collections::BTreeMap;

use arena_core::combatant::{CombatantId, Side};
use arena_core::report::{CombatEvent, EncounterReport, Outcome};
use arena_core::resolution::ActionOutcome;
use serde::{Deserialize, Serialize};

/// Per-side totals for one encounter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideMetrics {
    /// HP damage dealt by skills.
    pub damage_dealt: u64,
    /// Damage soaked by this side's shields.
    pub damage_absorbed: u64,
    /// HP restored by skills.
    pub healing_done: u64,
    /// Damage taken from periodic effects.
    pub tick_damage_taken: u64,
    /// Enemies defeated by this side's skills.
    pub kills: u32,
    /// Times each skill was resolved.
    pub skill_uses: BTreeMap<String, u32>,
    /// Turns lost to a failed resource check.
    pub unaffordable: u32,
    /// Turns passed.
    pub passes: u32,
    /// Turns skipped by incapacitating effects.
    pub skipped: u32,
    /// Combatants alive at the end.
    pub survivors: u32,
}

/// Metrics for a single encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterMetrics {
    /// Seed used.
    pub seed: u64,
    /// How it ended.
    pub outcome: Outcome,
    /// Rounds played.
    pub rounds: u32,
    /// Side A totals.
    pub side_a: SideMetrics,
    /// Side B totals.
    pub side_b: SideMetrics,
    /// Hash of the serialized report, for determinism checks.
    pub report_hash: u64,
}

impl EncounterMetrics {
    /// Derive metrics from a finished report.
    ///
    /// `sides` maps every combatant id to its side; it is taken from the
    /// roster because fallen combatants do not appear in the report.
    #[must_use]
    pub fn from_report(
        seed: u64,
        report: &EncounterReport,
        sides: &BTreeMap<CombatantId, Side>,
        report_hash: u64,
    ) -> Self {
        let mut metrics = Self {
            seed,
            outcome: report.outcome,
            rounds: report.rounds_played(),
            side_a: SideMetrics::default(),
            side_b: SideMetrics::default(),
            report_hash,
        };

        for event in report.rounds.iter().flat_map(|round| &round.events) {
            metrics.record(event, sides);
        }
        metrics.side_a.survivors = u32::try_from(report.survivors_a.len()).unwrap_or(u32::MAX);
        metrics.side_b.survivors = u32::try_from(report.survivors_b.len()).unwrap_or(u32::MAX);
        metrics
    }

    /// Totals for one side.
    #[must_use]
    pub const fn side(&self, side: Side) -> &SideMetrics {
        match side {
            Side::A => &self.side_a,
            Side::B => &self.side_b,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut SideMetrics {
        match side {
            Side::A => &mut self.side_a,
            Side::B => &mut self.side_b,
        }
    }

    fn record(&mut self, event: &CombatEvent, sides: &BTreeMap<CombatantId, Side>) {
        let side_of = |id: &CombatantId| sides.get(id).copied();
        match event {
            CombatEvent::Turn(result) => {
                let Some(side) = side_of(&result.actor) else {
                    return;
                };
                match &result.outcome {
                    ActionOutcome::Resolved {
                        skill_id, targets, ..
                    } => {
                        let totals = self.side_mut(side);
                        *totals.skill_uses.entry(skill_id.clone()).or_default() += 1;
                        for target in targets {
                            totals.damage_dealt += u64::from(target.damage);
                            totals.healing_done += u64::from(target.healing);
                            if target.defeated {
                                totals.kills += 1;
                            }
                        }
                        for target in targets.iter().filter(|t| t.absorbed > 0) {
                            if let Some(target_side) = side_of(&target.target) {
                                self.side_mut(target_side).damage_absorbed +=
                                    u64::from(target.absorbed);
                            }
                        }
                    }
                    ActionOutcome::CouldNotAfford { .. } => self.side_mut(side).unaffordable += 1,
                    ActionOutcome::Pass { .. } => self.side_mut(side).passes += 1,
                }
            }
            CombatEvent::Skipped { combatant, .. } => {
                if let Some(side) = side_of(combatant) {
                    self.side_mut(side).skipped += 1;
                }
            }
            CombatEvent::EffectTick {
                combatant, hp_lost, ..
            } => {
                if let Some(side) = side_of(combatant) {
                    self.side_mut(side).tick_damage_taken += u64::from(*hp_lost);
                }
            }
            CombatEvent::Retargeted { .. } | CombatEvent::EffectExpired { .. } => {}
        }
    }
}

/// Summary statistics across multiple encounters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Total encounters resolved.
    pub total: u32,
    /// Side A wins.
    pub wins_a: u32,
    /// Side B wins.
    pub wins_b: u32,
    /// Draws.
    pub draws: u32,
    /// Side A win rate.
    pub win_rate_a: f64,
    /// Side B win rate.
    pub win_rate_b: f64,
    /// Mean rounds per encounter.
    pub avg_rounds: f64,
    /// Shortest encounter.
    pub min_rounds: u32,
    /// Longest encounter.
    pub max_rounds: u32,
    /// Mean damage dealt per encounter by side A.
    pub avg_damage_a: f64,
    /// Mean damage dealt per encounter by side B.
    pub avg_damage_b: f64,
    /// Skill uses summed over all encounters, both sides.
    pub skill_uses: BTreeMap<String, u32>,
}

impl BatchSummary {
    /// Calculate summary from a list of encounter metrics.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_encounters(encounters: &[EncounterMetrics]) -> Self {
        if encounters.is_empty() {
            return Self::default();
        }

        let mut summary = Self {
            total: u32::try_from(encounters.len()).unwrap_or(u32::MAX),
            min_rounds: u32::MAX,
            ..Default::default()
        };

        let mut rounds_sum = 0u64;
        let mut damage_a = 0u64;
        let mut damage_b = 0u64;
        for encounter in encounters {
            match encounter.outcome {
                Outcome::WinA => summary.wins_a += 1,
                Outcome::WinB => summary.wins_b += 1,
                Outcome::Draw => summary.draws += 1,
            }
            rounds_sum += u64::from(encounter.rounds);
            summary.min_rounds = summary.min_rounds.min(encounter.rounds);
            summary.max_rounds = summary.max_rounds.max(encounter.rounds);
            damage_a += encounter.side_a.damage_dealt;
            damage_b += encounter.side_b.damage_dealt;
            for (skill, uses) in encounter
                .side_a
                .skill_uses
                .iter()
                .chain(&encounter.side_b.skill_uses)
            {
                *summary.skill_uses.entry(skill.clone()).or_default() += uses;
            }
        }

        let n = f64::from(summary.total);
        summary.win_rate_a = f64::from(summary.wins_a) / n;
        summary.win_rate_b = f64::from(summary.wins_b) / n;
        summary.avg_rounds = rounds_sum as f64 / n;
        summary.avg_damage_a = damage_a as f64 / n;
        summary.avg_damage_b = damage_b as f64 / n;
        summary
    }

    /// Check if side A's win rate is within `threshold` of 0.5.
    #[must_use]
    pub fn is_balanced(&self, threshold: f64) -> bool {
        (self.win_rate_a - 0.5).abs() <= threshold
    }

    /// The side winning more than `0.5 + threshold` of encounters, if any.
    #[must_use]
    pub fn dominant_side(&self, threshold: f64) -> Option<Side> {
        if self.win_rate_a > 0.5 + threshold {
            Some(Side::A)
        } else if self.win_rate_b > 0.5 + threshold {
            Some(Side::B)
        } else {
            None
        }
    }
}
