//! Initiative and round scheduling.
//!
//! An [`Encounter`] is a small state machine:
//!
//! ```text
//! RoundStart -> TurnLoop -> RoundEnd -> (RoundStart | EncounterOver)
//! ```
//!
//! Each call to [`Encounter::advance`] performs one step: computing the turn
//! order, resolving one turn slot, or closing the round. Callers that want
//! to drive a combatant themselves check [`Encounter::awaiting_decision`]
//! and hand in an action with [`Encounter::submit`]; everything else is
//! decided by a [`Controller`].
//!
//! # Determinism
//!
//! - Turn order: initiative descending, ties to side A, then registration
//!   order (ascending [`CombatantId`]).
//! - Every roll comes from the encounter's own [`RandomSource`].
//! - Effects tick at the end of their bearer's turn slot, durations count
//!   down at round end.
//!
//! # Example
//!
//! ```
//! use arena_core::prelude::*;
//!
//! let library = TemplateLibrary::from_ron_str("inline", r#"(
//!     skills: [(
//!         id: "basic_strike_phys",
//!         name: "Basic Strike",
//!         target_mode: EnemySingle,
//!         power: Some((scaling_attribute: Some(Str))),
//!     )],
//!     combatants: [(
//!         id: "goblin_lv1",
//!         name: "Goblin",
//!         attributes: (str: 8, dex: 12, int: 6, con: 9, wis: 6),
//!         base_hp: 10,
//!         skills: ["basic_strike_phys"],
//!         ai_strategy: Some(BasicMelee),
//!         xp_reward: Some(50),
//!     )],
//! )"#).unwrap();
//!
//! let report = run_encounter(
//!     &library,
//!     &[CombatantSpec::new("goblin_lv1")],
//!     &[CombatantSpec::new("goblin_lv1")],
//!     &RuleSet::standard(),
//!     SeededRandom::new(7),
//! ).unwrap();
//!
//! assert!(report.rounds_played() >= 1);
//! ```

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::ai::{strategy_for, AiController, BattleView, Controller};
use crate::combatant::{CombatantId, CombatantState, Side};
use crate::config::RuleSet;
use crate::data::TemplateProvider;
use crate::error::{CombatError, Result};
use crate::leveling::{distribute_xp, xp_pool, XpAward};
use crate::report::{CombatEvent, EncounterReport, Outcome, RoundEvent, REPORT_VERSION};
use crate::resolution::{resolve, validate_target, Action, PassReason, ResolutionResult};
use crate::rng::{RandomSource, SeededRandom};

/// Scheduler phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Turn order not yet computed for the current round.
    RoundStart,
    /// Walking the turn order.
    TurnLoop,
    /// Durations, expiry and regeneration pending.
    RoundEnd,
    /// Terminal.
    EncounterOver,
}

/// One roster entry: which template, at which level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatantSpec {
    /// Combatant template id.
    pub template_id: String,
    /// Starting level.
    #[serde(default = "default_level")]
    pub level: u32,
}

fn default_level() -> u32 {
    1
}

impl CombatantSpec {
    /// Level-1 entry.
    #[must_use]
    pub fn new(template_id: impl Into<String>) -> Self {
        Self {
            template_id: template_id.into(),
            level: 1,
        }
    }

    /// Same template at another level.
    #[must_use]
    pub fn at_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }
}

/// A running encounter.
#[derive(Debug)]
pub struct Encounter<R = SeededRandom> {
    roster: Vec<CombatantState>,
    rules: RuleSet,
    rng: R,
    phase: Phase,
    round: u32,
    turn_order: Vec<CombatantId>,
    cursor: usize,
    current: Option<RoundEvent>,
    rounds: Vec<RoundEvent>,
    outcome: Option<Outcome>,
    xp_override: Option<u32>,
    leveling: Vec<XpAward>,
}

impl<R: RandomSource> Encounter<R> {
    /// Build an encounter from two rosters of template references.
    ///
    /// Side A combatants get ids `0..a`, side B `a..a+b`.
    ///
    /// # Errors
    ///
    /// - [`CombatError::InvalidEncounter`] if either side is empty.
    /// - [`CombatError::CombatantNotFound`] / [`CombatError::SkillNotFound`]
    ///   for unknown ids.
    /// - Configuration errors from [`RuleSet::validate`].
    pub fn from_templates(
        provider: &dyn TemplateProvider,
        side_a: &[CombatantSpec],
        side_b: &[CombatantSpec],
        rules: RuleSet,
        rng: R,
    ) -> Result<Self> {
        if side_a.is_empty() {
            return Err(CombatError::InvalidEncounter("side A has no combatants".into()));
        }
        if side_b.is_empty() {
            return Err(CombatError::InvalidEncounter("side B has no combatants".into()));
        }
        rules.validate()?;

        let mut roster = Vec::with_capacity(side_a.len() + side_b.len());
        let entries = side_a
            .iter()
            .map(|spec| (Side::A, spec))
            .chain(side_b.iter().map(|spec| (Side::B, spec)));
        for (index, (side, spec)) in entries.enumerate() {
            let id = u32::try_from(index)
                .map(CombatantId)
                .map_err(|_| CombatError::InvalidEncounter("roster too large".into()))?;
            let template = provider.combatant(&spec.template_id)?;
            roster.push(CombatantState::from_template(
                id, side, template, provider, spec.level,
            )?);
        }

        Ok(Self {
            roster,
            rules,
            rng,
            phase: Phase::RoundStart,
            round: 1,
            turn_order: Vec::new(),
            cursor: 0,
            current: None,
            rounds: Vec::new(),
            outcome: None,
            xp_override: None,
            leveling: Vec::new(),
        })
    }

    /// Fix the XP handed to the winners instead of summing `xp_reward`s.
    #[must_use]
    pub fn with_xp_reward(mut self, xp: Option<u32>) -> Self {
        self.xp_override = xp;
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Current round number, starting at 1.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Whether the encounter has ended.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        matches!(self.phase, Phase::EncounterOver)
    }

    /// Final outcome once over.
    #[must_use]
    pub const fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// All combatants in id order.
    #[must_use]
    pub fn roster(&self) -> &[CombatantState] {
        &self.roster
    }

    /// One combatant.
    #[must_use]
    pub fn combatant(&self, id: CombatantId) -> Option<&CombatantState> {
        self.roster.get(id.index())
    }

    /// Mutable access for scenario setup (pre-applied effects, damage).
    pub fn combatant_mut(&mut self, id: CombatantId) -> Option<&mut CombatantState> {
        self.roster.get_mut(id.index())
    }

    /// Active rules.
    #[must_use]
    pub const fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Turn order of the current round.
    #[must_use]
    pub fn turn_order(&self) -> &[CombatantId] {
        &self.turn_order
    }

    /// Completed rounds.
    #[must_use]
    pub fn rounds(&self) -> &[RoundEvent] {
        &self.rounds
    }

    /// The round in progress, if any.
    #[must_use]
    pub const fn current_round(&self) -> Option<&RoundEvent> {
        self.current.as_ref()
    }

    /// Number of living combatants on a side.
    #[must_use]
    pub fn living(&self, side: Side) -> usize {
        self.roster
            .iter()
            .filter(|c| c.side() == side && c.is_alive())
            .count()
    }

    /// View of the battlefield from `actor`'s seat.
    #[must_use]
    pub fn view(&self, actor: CombatantId) -> BattleView<'_> {
        BattleView::new(actor, &self.roster, &self.rules)
    }

    /// Combatant whose action the next [`Self::advance`] would request.
    ///
    /// `None` outside the turn loop and for slots that resolve without a
    /// decision (defeated or incapacitated combatants).
    #[must_use]
    pub fn awaiting_decision(&self) -> Option<CombatantId> {
        if self.phase != Phase::TurnLoop {
            return None;
        }
        let id = *self.turn_order.get(self.cursor)?;
        let state = self.combatant(id)?;
        (state.is_alive() && !state.is_incapacitated()).then_some(id)
    }

    // ------------------------------------------------------------------
    // Stepping
    // ------------------------------------------------------------------

    /// Perform one scheduler step, asking `controller` if a decision is due.
    ///
    /// Returns the phase after the step. Calling this on a finished
    /// encounter is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::SkillNotFound`] if the controller names a skill
    /// the actor does not know. With `debug-validation` enabled, also
    /// returns [`CombatError::InvalidState`] when a bound is violated.
    pub fn advance(&mut self, controller: &mut dyn Controller) -> Result<Phase> {
        match self.phase {
            Phase::RoundStart => self.begin_round(),
            Phase::TurnLoop => self.next_slot(controller)?,
            Phase::RoundEnd => self.end_round(),
            Phase::EncounterOver => {}
        }
        self.check_invariants()?;
        Ok(self.phase)
    }

    /// Resolve the pending decision with a caller-chosen action.
    ///
    /// `None` passes the turn. An invalid target is recovered the same way
    /// as for AI decisions.
    ///
    /// # Errors
    ///
    /// - [`CombatError::InvalidState`] if no decision is pending.
    /// - [`CombatError::SkillNotFound`] if the actor does not know the skill;
    ///   the encounter is left unchanged and the decision stays pending.
    pub fn submit(&mut self, action: Option<Action>) -> Result<()> {
        let actor = self.awaiting_decision().ok_or_else(|| {
            CombatError::InvalidState("no combatant is awaiting a decision".into())
        })?;
        if let Some(action) = &action {
            if self.roster[actor.index()].skill(&action.skill_id).is_none() {
                return Err(CombatError::SkillNotFound(action.skill_id.clone()));
            }
        }
        self.take_turn(actor, action)?;
        self.cursor += 1;
        self.after_slot(actor);
        self.check_invariants()
    }

    /// Advance until the current round is closed or the encounter ends.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Self::advance`].
    pub fn play_round(&mut self, controller: &mut dyn Controller) -> Result<()> {
        let start = self.round;
        while !self.is_over() && !(self.round > start && self.phase == Phase::RoundStart) {
            self.advance(controller)?;
        }
        Ok(())
    }

    /// Run to completion and build the report.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Self::advance`].
    pub fn run(&mut self, controller: &mut dyn Controller) -> Result<EncounterReport> {
        while !self.is_over() {
            self.advance(controller)?;
        }
        self.report()
    }

    /// Report of a finished encounter.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::InvalidState`] while the encounter is running.
    pub fn report(&self) -> Result<EncounterReport> {
        let outcome = self
            .outcome
            .ok_or_else(|| CombatError::InvalidState("encounter is still running".into()))?;
        let survivors = |side: Side| {
            self.roster
                .iter()
                .filter(|c| c.side() == side && c.is_alive())
                .map(CombatantState::snapshot)
                .collect()
        };
        Ok(EncounterReport {
            version: REPORT_VERSION,
            rounds: self.rounds.clone(),
            outcome,
            survivors_a: survivors(Side::A),
            survivors_b: survivors(Side::B),
            leveling: self.leveling.clone(),
        })
    }

    // ------------------------------------------------------------------
    // Phases
    // ------------------------------------------------------------------

    fn begin_round(&mut self) {
        let mut order: Vec<(i32, CombatantId)> = self
            .roster
            .iter()
            .filter(|c| c.is_alive())
            .map(|c| (c.initiative(), c.id()))
            .collect();
        order.sort_by_key(|(initiative, id)| (Reverse(*initiative), *id));
        self.turn_order = order.into_iter().map(|(_, id)| id).collect();
        self.cursor = 0;
        self.current = Some(RoundEvent::new(self.round, self.turn_order.clone()));
        self.phase = Phase::TurnLoop;
        tracing::debug!(round = self.round, order = ?self.turn_order, "Round start");
    }

    fn next_slot(&mut self, controller: &mut dyn Controller) -> Result<()> {
        let Some(&id) = self.turn_order.get(self.cursor) else {
            self.phase = Phase::RoundEnd;
            return Ok(());
        };
        let state = &self.roster[id.index()];

        if !state.is_alive() {
            self.cursor += 1;
            return Ok(());
        }

        let skip = state
            .effects()
            .map(|(kind, _)| kind)
            .find(|kind| kind.skips_turn());
        if let Some(effect) = skip {
            tracing::debug!(combatant = %id, %effect, "Turn skipped");
            self.push_event(CombatEvent::Skipped {
                combatant: id,
                effect,
            });
            self.cursor += 1;
            self.after_slot(id);
            return Ok(());
        }

        let action = {
            let view = BattleView::new(id, &self.roster, &self.rules);
            controller.choose_action(&view, &mut self.rng)
        };
        self.submit(action)
    }

    fn take_turn(&mut self, actor: CombatantId, action: Option<Action>) -> Result<()> {
        let result = match action {
            None => {
                let reason = if self.view(actor).usable_skills().is_empty() {
                    PassReason::NothingAffordable
                } else {
                    PassReason::Declined
                };
                ResolutionResult::pass(actor, reason)
            }
            Some(mut action) => {
                let skill = self.roster[actor.index()]
                    .skill(&action.skill_id)
                    .cloned()
                    .ok_or_else(|| CombatError::SkillNotFound(action.skill_id.clone()))?;

                match validate_target(&self.roster, actor, &skill, action.target) {
                    Ok(()) => self.resolve_action(actor, &action)?,
                    Err(err) => {
                        let strategy =
                            strategy_for(self.roster[actor.index()].template().ai_strategy);
                        let fallback = strategy.fallback_target(&self.view(actor), &skill);
                        match fallback {
                            Some(target) => {
                                tracing::warn!(%err, actor = %actor, new_target = %target, "Retargeting");
                                self.push_event(CombatEvent::Retargeted {
                                    actor,
                                    skill_id: skill.id.clone(),
                                    from: action.target,
                                    to: target,
                                });
                                action.target = target;
                                self.resolve_action(actor, &action)?
                            }
                            None => {
                                tracing::warn!(%err, actor = %actor, "No valid target, passing");
                                ResolutionResult::pass(actor, PassReason::NoValidTarget)
                            }
                        }
                    }
                }
            }
        };
        self.push_event(CombatEvent::Turn(result));
        Ok(())
    }

    fn resolve_action(&mut self, actor: CombatantId, action: &Action) -> Result<ResolutionResult> {
        resolve(&mut self.roster, actor, action, &self.rules, &mut self.rng)
    }

    /// Termination check, then the actor's own effect ticks.
    fn after_slot(&mut self, actor: CombatantId) {
        if self.check_termination() {
            return;
        }
        let state = &mut self.roster[actor.index()];
        if !state.is_alive() {
            return;
        }
        let ticks = state.tick_effects();
        let died = !state.is_alive();
        let last = ticks.len().saturating_sub(1);
        let events: Vec<CombatEvent> = ticks
            .into_iter()
            .enumerate()
            .map(|(i, (effect, hp_lost))| CombatEvent::EffectTick {
                combatant: actor,
                effect,
                hp_lost,
                defeated: died && i == last,
            })
            .collect();
        for event in events {
            self.push_event(event);
        }
        self.check_termination();
    }

    fn end_round(&mut self) {
        let regen = self.rules.resource_regen_percent;
        let mut events = Vec::new();
        for state in self.roster.iter_mut().filter(|c| c.is_alive()) {
            for effect in state.decrement_effects() {
                events.push(CombatEvent::EffectExpired {
                    combatant: state.id(),
                    effect,
                });
            }
            state.regenerate(regen);
        }
        for event in events {
            self.push_event(event);
        }
        if let Some(round) = self.current.take() {
            self.rounds.push(round);
        }
        tracing::debug!(round = self.round, "Round end");

        if self.round >= self.rules.round_limit() {
            tracing::info!(rounds = self.round, "Round cap reached");
            self.finish(Outcome::Draw);
        } else {
            self.round += 1;
            self.phase = Phase::RoundStart;
        }
    }

    /// End the encounter if a side is wiped out. Returns whether it is over.
    fn check_termination(&mut self) -> bool {
        if self.is_over() {
            return true;
        }
        let outcome = match (self.living(Side::A), self.living(Side::B)) {
            (0, 0) => Outcome::Draw,
            (_, 0) => Outcome::WinA,
            (0, _) => Outcome::WinB,
            _ => return false,
        };
        self.finish(outcome);
        true
    }

    fn finish(&mut self, outcome: Outcome) {
        if let Some(round) = self.current.take() {
            self.rounds.push(round);
        }
        self.outcome = Some(outcome);
        self.phase = Phase::EncounterOver;

        if let Some(winners) = outcome.winner() {
            let total = self
                .xp_override
                .unwrap_or_else(|| xp_pool(&self.roster, winners.opponent()));
            self.leveling = distribute_xp(&mut self.roster, winners, total, &self.rules);
        }
        tracing::info!(
            %outcome,
            rounds = self.round,
            survivors_a = self.living(Side::A),
            survivors_b = self.living(Side::B),
            "Encounter over"
        );
    }

    fn push_event(&mut self, event: CombatEvent) {
        if let Some(round) = self.current.as_mut() {
            round.events.push(event);
        }
    }

    #[cfg(feature = "debug-validation")]
    fn check_invariants(&self) -> Result<()> {
        self.roster.iter().try_for_each(CombatantState::check_bounds)
    }

    #[cfg(not(feature = "debug-validation"))]
    #[allow(clippy::unnecessary_wraps, clippy::unused_self)]
    fn check_invariants(&self) -> Result<()> {
        Ok(())
    }
}

/// Resolve a whole encounter with AI control on both sides.
///
/// # Errors
///
/// Returns construction errors (empty side, unknown template, bad rules);
/// gameplay conditions never surface as errors.
pub fn run_encounter<R: RandomSource>(
    provider: &dyn TemplateProvider,
    side_a: &[CombatantSpec],
    side_b: &[CombatantSpec],
    rules: &RuleSet,
    rng: R,
) -> Result<EncounterReport> {
    let mut encounter = Encounter::from_templates(provider, side_a, side_b, rules.clone(), rng)?;
    tracing::info!(
        side_a = side_a.len(),
        side_b = side_b.len(),
        "Encounter start"
    );
    encounter.run(&mut AiController)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{
        Attribute, Attributes, CombatantTemplate, DamageKind, PowerSpec, ResourceCost,
        ResourceKind, ResourcePools, SkillTemplate, TargetMode, TemplateLibrary,
    };
    use crate::effects::EffectKind;
    use crate::math::Fixed;
    use std::collections::BTreeSet;

    #[derive(Debug)]
    struct ConstantRoll(f64);

    impl RandomSource for ConstantRoll {
        fn next_float(&mut self) -> f64 {
            self.0
        }
    }

    fn library() -> TemplateLibrary {
        let mut library = TemplateLibrary::new();
        library
            .insert_skill(SkillTemplate {
                id: "basic_strike_phys".to_string(),
                name: "Basic Strike".to_string(),
                cost: ResourceCost::FREE,
                target_mode: TargetMode::EnemySingle,
                power: Some(PowerSpec {
                    base_amount: None,
                    scaling_attribute: Some(Attribute::Str),
                    damage_kind: DamageKind::Physical,
                    multiplier: Fixed::ONE,
                    crit_chance: Fixed::ZERO,
                    crit_multiplier: Fixed::from_num(1.5),
                    bonus_vs_tag: None,
                }),
                effects: Vec::new(),
            })
            .unwrap();
        let unit = |id: &str, dex: i32, base_hp: u32, xp: Option<u32>| CombatantTemplate {
            id: id.to_string(),
            name: id.to_string(),
            attributes: Attributes::new(10, dex, 10, 10, 10),
            base_hp,
            resources: ResourcePools {
                mana: 0,
                stamina: 20,
                energy: 0,
            },
            armor: 0,
            magic_resist: 0,
            tags: BTreeSet::new(),
            skills: vec!["basic_strike_phys".to_string()],
            ai_strategy: None,
            xp_reward: xp,
        };
        library.insert_combatant(unit("fast", 14, 1, Some(10))).unwrap();
        library.insert_combatant(unit("slow", 8, 1, Some(30))).unwrap();
        library.insert_combatant(unit("wall", 10, 10_000, None)).unwrap();
        library
    }

    #[test]
    fn test_empty_side_fails_to_construct() {
        let library = library();
        let err = Encounter::from_templates(
            &library,
            &[CombatantSpec::new("fast")],
            &[],
            RuleSet::standard(),
            ConstantRoll(0.0),
        )
        .unwrap_err();
        assert!(matches!(err, CombatError::InvalidEncounter(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_unknown_template_fails_to_construct() {
        let library = library();
        let err = Encounter::from_templates(
            &library,
            &[CombatantSpec::new("dragon")],
            &[CombatantSpec::new("fast")],
            RuleSet::standard(),
            ConstantRoll(0.0),
        )
        .unwrap_err();
        assert_eq!(err, CombatError::CombatantNotFound("dragon".to_string()));
    }

    #[test]
    fn test_turn_order_and_tiebreak() {
        let library = library();
        let mut encounter = Encounter::from_templates(
            &library,
            &[CombatantSpec::new("slow"), CombatantSpec::new("wall")],
            &[CombatantSpec::new("wall"), CombatantSpec::new("fast")],
            RuleSet::standard(),
            ConstantRoll(0.0),
        )
        .unwrap();
        assert_eq!(encounter.advance(&mut AiController).unwrap(), Phase::TurnLoop);
        // fast 28, wall(A) 20, wall(B) 20, slow 16
        assert_eq!(
            encounter.turn_order(),
            &[CombatantId(3), CombatantId(1), CombatantId(2), CombatantId(0)]
        );
        assert_eq!(encounter.awaiting_decision(), Some(CombatantId(3)));
    }

    #[test]
    fn test_stunned_combatant_is_skipped_and_stun_expires() {
        let library = library();
        let mut encounter = Encounter::from_templates(
            &library,
            &[CombatantSpec::new("wall")],
            &[CombatantSpec::new("wall")],
            RuleSet::standard(),
            ConstantRoll(0.0),
        )
        .unwrap();
        encounter
            .combatant_mut(CombatantId(1))
            .unwrap()
            .apply_effect(EffectKind::Stunned, 1, 1);

        encounter.play_round(&mut AiController).unwrap();

        let round = &encounter.rounds()[0];
        assert!(round.events.contains(&CombatEvent::Skipped {
            combatant: CombatantId(1),
            effect: EffectKind::Stunned,
        }));
        assert!(round.events.contains(&CombatEvent::EffectExpired {
            combatant: CombatantId(1),
            effect: EffectKind::Stunned,
        }));
        assert_eq!(round.turns().count(), 1);
        assert!(encounter
            .combatant(CombatantId(1))
            .unwrap()
            .effect(EffectKind::Stunned)
            .is_none());
        assert_eq!(encounter.round(), 2);
    }

    #[test]
    fn test_round_cap_is_a_draw() {
        let library = library();
        let mut rules = RuleSet::standard();
        rules.max_rounds = Some(3);
        let report = run_encounter(
            &library,
            &[CombatantSpec::new("wall")],
            &[CombatantSpec::new("wall")],
            &rules,
            ConstantRoll(0.0),
        )
        .unwrap();
        assert_eq!(report.outcome, Outcome::Draw);
        assert_eq!(report.rounds_played(), 3);
        assert!(report.leveling.is_empty());
    }

    #[test]
    fn test_termination_short_circuits_round() {
        let library = library();
        let report = run_encounter(
            &library,
            &[CombatantSpec::new("fast")],
            &[CombatantSpec::new("slow"), CombatantSpec::new("slow")],
            &RuleSet::standard(),
            ConstantRoll(0.0),
        )
        .unwrap();
        // fast (51 HP) takes 10 a round from two slows and drops in round 6,
        // before it has finished the first slow (51 HP at 5 a round).
        assert_eq!(report.outcome, Outcome::WinB);
        assert_eq!(report.rounds_played(), 6);
        let last = report.rounds.last().unwrap();
        let final_turn = last.turns().last().unwrap();
        assert!(final_turn.targets().iter().any(|t| t.defeated));
    }

    #[test]
    fn test_winners_receive_xp() {
        let library = library();
        let report = run_encounter(
            &library,
            &[CombatantSpec::new("wall")],
            &[CombatantSpec::new("slow")],
            &RuleSet::standard(),
            ConstantRoll(0.0),
        )
        .unwrap();
        assert_eq!(report.outcome, Outcome::WinA);
        assert_eq!(report.leveling.len(), 1);
        assert_eq!(report.leveling[0].xp_awarded, 30);
        assert!(report.survivors_b.is_empty());
    }

    #[test]
    fn test_submit_requires_pending_decision() {
        let library = library();
        let mut encounter = Encounter::from_templates(
            &library,
            &[CombatantSpec::new("fast")],
            &[CombatantSpec::new("slow")],
            RuleSet::standard(),
            ConstantRoll(0.0),
        )
        .unwrap();
        assert!(encounter.submit(None).is_err());

        encounter.advance(&mut AiController).unwrap();
        assert_eq!(encounter.awaiting_decision(), Some(CombatantId(0)));
        assert_eq!(
            encounter
                .submit(Some(Action::new("meteor", CombatantId(1))))
                .unwrap_err(),
            CombatError::SkillNotFound("meteor".to_string())
        );
        // invalid target (self) is retargeted to the only enemy
        encounter
            .submit(Some(Action::new("basic_strike_phys", CombatantId(0))))
            .unwrap();
        let events = &encounter.current_round().unwrap().events;
        assert!(matches!(
            events[0],
            CombatEvent::Retargeted {
                to: CombatantId(1),
                ..
            }
        ));
        assert_eq!(encounter.awaiting_decision(), Some(CombatantId(1)));
    }

    #[test]
    fn test_report_requires_finished_encounter() {
        let library = library();
        let encounter = Encounter::from_templates(
            &library,
            &[CombatantSpec::new("fast")],
            &[CombatantSpec::new("slow")],
            RuleSet::standard(),
            ConstantRoll(0.0),
        )
        .unwrap();
        assert!(encounter.report().is_err());
    }

    #[test]
    fn test_pass_reason_when_broke() {
        let mut library = library();
        library
            .insert_skill(SkillTemplate {
                id: "expensive".to_string(),
                name: "Expensive".to_string(),
                cost: ResourceCost::new(50, ResourceKind::Mana),
                target_mode: TargetMode::EnemySingle,
                power: Some(PowerSpec {
                    base_amount: Some(1),
                    scaling_attribute: None,
                    damage_kind: DamageKind::Magical,
                    multiplier: Fixed::ONE,
                    crit_chance: Fixed::ZERO,
                    crit_multiplier: Fixed::ONE,
                    bonus_vs_tag: None,
                }),
                effects: Vec::new(),
            })
            .unwrap();
        let mut broke = (*library.combatant("wall").unwrap()).clone();
        broke.id = "broke".to_string();
        broke.skills = vec!["expensive".to_string()];
        library.insert_combatant(broke).unwrap();

        let mut encounter = Encounter::from_templates(
            &library,
            &[CombatantSpec::new("broke")],
            &[CombatantSpec::new("wall")],
            RuleSet::standard(),
            ConstantRoll(0.0),
        )
        .unwrap();
        encounter.play_round(&mut AiController).unwrap();
        let passed = encounter.rounds()[0]
            .turns()
            .any(|t| t.outcome == crate::resolution::ActionOutcome::Pass {
                reason: PassReason::NothingAffordable,
            });
        assert!(passed);
    }
}
