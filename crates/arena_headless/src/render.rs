//! Plain-text combat log.
//!
//! Reports only carry combatant ids for the fallen, so names are captured
//! from the roster before the encounter runs.

use std::collections::BTreeMap;

use arena_core::combatant::{CombatantId, CombatantSnapshot, CombatantState};
use arena_core::report::{CombatEvent, EncounterReport, RoundEvent};
use arena_core::resolution::{ActionOutcome, HitRoll, PassReason, ResolutionResult, TargetOutcome};

/// Renders reports as human-readable text.
#[derive(Debug, Clone, Default)]
pub struct CombatLog {
    names: BTreeMap<CombatantId, String>,
}

impl CombatLog {
    /// Capture display names from a roster.
    #[must_use]
    pub fn new(roster: &[CombatantState]) -> Self {
        let names = roster
            .iter()
            .map(|c| (c.id(), format!("{} [{}{}]", c.name(), c.side(), c.id().0)))
            .collect();
        Self { names }
    }

    fn name(&self, id: CombatantId) -> String {
        self.names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    /// Full log: every round, then the outcome and survivors.
    #[must_use]
    pub fn render(&self, report: &EncounterReport) -> String {
        let mut out = String::new();
        for round in &report.rounds {
            out.push_str(&self.render_round(round));
        }
        out.push_str(&self.render_summary(report));
        out
    }

    /// One round: header, turn order, then events.
    #[must_use]
    pub fn render_round(&self, round: &RoundEvent) -> String {
        let order: Vec<String> = round.turn_order.iter().map(|id| self.name(*id)).collect();
        let mut out = format!("=== Round {} ===\n", round.round);
        out.push_str(&format!("Order: {}\n", order.join(", ")));
        for event in &round.events {
            out.push_str(&self.render_event(event));
            out.push('\n');
        }
        out
    }

    /// A single event as one or more lines, without trailing newline.
    #[must_use]
    pub fn render_event(&self, event: &CombatEvent) -> String {
        match event {
            CombatEvent::Turn(result) => self.render_turn(result),
            CombatEvent::Skipped { combatant, effect } => {
                format!("  {} is {effect} and loses the turn", self.name(*combatant))
            }
            CombatEvent::Retargeted {
                actor,
                skill_id,
                from,
                to,
            } => format!(
                "  {} redirects {skill_id} from {} to {}",
                self.name(*actor),
                self.name(*from),
                self.name(*to)
            ),
            CombatEvent::EffectTick {
                combatant,
                effect,
                hp_lost,
                defeated,
            } => {
                let mut line = format!(
                    "  {} takes {hp_lost} from {effect}",
                    self.name(*combatant)
                );
                if *defeated {
                    line.push_str(" and falls");
                }
                line
            }
            CombatEvent::EffectExpired { combatant, effect } => {
                format!("  {effect} fades from {}", self.name(*combatant))
            }
        }
    }

    fn render_turn(&self, result: &ResolutionResult) -> String {
        let actor = self.name(result.actor);
        match &result.outcome {
            ActionOutcome::Pass { reason } => {
                let why = match reason {
                    PassReason::NothingAffordable => "nothing affordable",
                    PassReason::NoValidTarget => "no valid target",
                    PassReason::Declined => "declined",
                };
                format!("  {actor} passes ({why})")
            }
            ActionOutcome::CouldNotAfford {
                skill_id,
                resource,
                required,
                available,
            } => format!(
                "  {actor} tries {skill_id} but has {available}/{required} {resource}"
            ),
            ActionOutcome::Resolved {
                skill_id,
                targets,
                self_effects,
                ..
            } => {
                let mut lines = vec![format!("  {actor} uses {skill_id}")];
                lines.extend(targets.iter().map(|t| self.render_target(t)));
                if !self_effects.is_empty() {
                    let names: Vec<String> = self_effects.iter().map(ToString::to_string).collect();
                    lines.push(format!("    {actor} gains {}", names.join(", ")));
                }
                lines.join("\n")
            }
        }
    }

    fn render_target(&self, target: &TargetOutcome) -> String {
        let name = self.name(target.target);
        if target.hit == HitRoll::Miss {
            return format!("    -> {name}: miss");
        }
        let mut parts = Vec::new();
        if target.critical {
            parts.push("critical".to_string());
        }
        if target.damage > 0 || target.absorbed > 0 {
            parts.push(format!("{} damage", target.damage));
        }
        if target.absorbed > 0 {
            parts.push(format!("{} absorbed", target.absorbed));
        }
        if target.healing > 0 {
            parts.push(format!("{} healed", target.healing));
        }
        if !target.effects_applied.is_empty() {
            let names: Vec<String> = target.effects_applied.iter().map(ToString::to_string).collect();
            parts.push(names.join("+"));
        }
        if target.defeated {
            parts.push("DEFEATED".to_string());
        }
        if parts.is_empty() {
            parts.push("no effect".to_string());
        }
        format!("    -> {name}: {}", parts.join(", "))
    }

    /// Outcome, surviving combatants and XP awards.
    #[must_use]
    pub fn render_summary(&self, report: &EncounterReport) -> String {
        let mut out = format!(
            "=== {} after {} round(s) ===\n",
            report.outcome,
            report.rounds_played()
        );
        for survivor in report.survivors_a.iter().chain(&report.survivors_b) {
            out.push_str(&render_survivor(survivor));
            out.push('\n');
        }
        for award in &report.leveling {
            let mut line = format!(
                "{} gains {} XP",
                self.name(award.combatant),
                award.xp_awarded
            );
            if award.levels_gained() > 0 {
                line.push_str(&format!(
                    " (level {} -> {})",
                    award.level_before, award.level_after
                ));
            }
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

fn render_survivor(survivor: &CombatantSnapshot) -> String {
    let mut line = format!(
        "  {} [{}{}] HP {}/{}",
        survivor.name, survivor.side, survivor.id.0, survivor.current_hp, survivor.max_hp
    );
    if survivor.shield > 0 {
        line.push_str(&format!(" +{} shield", survivor.shield));
    }
    for (kind, amount) in &survivor.resources {
        line.push_str(&format!(" {kind} {amount}"));
    }
    line
}
