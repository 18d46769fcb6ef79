//! Skill resolution.
//!
//! Resolves one chosen action against the encounter roster: pay the cost,
//! expand the target set, roll hit and crit per target, apply damage or
//! healing, then roll each status effect application. The result is plain
//! data; nothing here logs above `debug` or prints.

use serde::{Deserialize, Serialize};

use crate::combatant::{CombatantId, CombatantState};
use crate::config::RuleSet;
use crate::data::{ResourceCost, ResourceKind, SkillTemplate, TargetMode};
use crate::effects::EffectKind;
use crate::error::{CombatError, Result};
use crate::formulas;
use crate::math::{percent_to_fraction, scale_floor};
use crate::rng::RandomSource;

/// A chosen skill and its targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    /// Skill id; must be known by the actor.
    pub skill_id: String,
    /// Primary target.
    pub target: CombatantId,
    /// Second enemy for cleave skills.
    #[serde(default)]
    pub secondary_target: Option<CombatantId>,
}

impl Action {
    /// Single-target action.
    #[must_use]
    pub fn new(skill_id: impl Into<String>, target: CombatantId) -> Self {
        Self {
            skill_id: skill_id.into(),
            target,
            secondary_target: None,
        }
    }

    /// Attach a cleave secondary target.
    #[must_use]
    pub fn with_secondary(mut self, secondary: Option<CombatantId>) -> Self {
        self.secondary_target = secondary;
        self
    }
}

/// Result of the hit roll for one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitRoll {
    /// Self/ally skill or effect-only skill; no roll made.
    Auto,
    /// Roll succeeded.
    Hit,
    /// Roll failed; damage and healing skipped for this target.
    Miss,
}

impl HitRoll {
    /// Whether damage or healing lands.
    #[must_use]
    pub const fn landed(self) -> bool {
        !matches!(self, Self::Miss)
    }
}

/// What happened to one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetOutcome {
    /// Affected combatant.
    pub target: CombatantId,
    /// Hit roll result.
    pub hit: HitRoll,
    /// Whether the crit roll succeeded.
    pub critical: bool,
    /// Mitigated damage before shield absorption.
    pub damage: u32,
    /// Portion of `damage` soaked by the shield.
    pub absorbed: u32,
    /// HP actually restored.
    pub healing: u32,
    /// Effects that landed.
    pub effects_applied: Vec<EffectKind>,
    /// Whether this action brought the target to zero HP.
    pub defeated: bool,
}

impl TargetOutcome {
    fn new(target: CombatantId, hit: HitRoll) -> Self {
        Self {
            target,
            hit,
            critical: false,
            damage: 0,
            absorbed: 0,
            healing: 0,
            effects_applied: Vec::new(),
            defeated: false,
        }
    }
}

/// Why a turn produced no skill use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PassReason {
    /// No known skill was affordable.
    NothingAffordable,
    /// No living combatant was a legal target.
    NoValidTarget,
    /// The controller declined to act.
    Declined,
}

/// Outcome of one turn's action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionOutcome {
    /// The skill was paid for and resolved.
    Resolved {
        /// Skill used.
        skill_id: String,
        /// Cost paid.
        cost: ResourceCost,
        /// Per-target outcomes in target-set order.
        targets: Vec<TargetOutcome>,
        /// `on_self` effects that landed on the actor.
        self_effects: Vec<EffectKind>,
    },
    /// The resource check failed; the turn is consumed.
    CouldNotAfford {
        /// Skill attempted.
        skill_id: String,
        /// Pool checked.
        resource: ResourceKind,
        /// Amount needed.
        required: u32,
        /// Amount held.
        available: u32,
    },
    /// No action taken.
    Pass {
        /// Why.
        reason: PassReason,
    },
}

/// One combatant's turn result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionResult {
    /// Acting combatant.
    pub actor: CombatantId,
    /// What happened.
    pub outcome: ActionOutcome,
}

impl ResolutionResult {
    /// A pass outcome.
    #[must_use]
    pub const fn pass(actor: CombatantId, reason: PassReason) -> Self {
        Self {
            actor,
            outcome: ActionOutcome::Pass { reason },
        }
    }

    /// Per-target outcomes; empty unless resolved.
    #[must_use]
    pub fn targets(&self) -> &[TargetOutcome] {
        match &self.outcome {
            ActionOutcome::Resolved { targets, .. } => targets,
            _ => &[],
        }
    }

    /// Total HP damage dealt (after mitigation, before shields).
    #[must_use]
    pub fn total_damage(&self) -> u32 {
        self.targets().iter().map(|t| t.damage).sum()
    }
}

/// Whether `target` is a legal primary target of `skill` for `actor`.
#[must_use]
pub fn is_valid_target(
    roster: &[CombatantState],
    actor: CombatantId,
    skill: &SkillTemplate,
    target: CombatantId,
) -> bool {
    let (Some(actor_state), Some(target_state)) =
        (roster.get(actor.index()), roster.get(target.index()))
    else {
        return false;
    };
    if !target_state.is_alive() {
        return false;
    }
    match skill.target_mode {
        TargetMode::SelfOnly => target == actor,
        TargetMode::AllySingle => target_state.side() == actor_state.side(),
        TargetMode::EnemySingle | TargetMode::EnemyCleave | TargetMode::EnemySplash => {
            target_state.side() != actor_state.side()
        }
    }
}

/// Check a primary target.
///
/// # Errors
///
/// Returns [`CombatError::InvalidTarget`] for a dead, absent, or wrong-side
/// target.
pub fn validate_target(
    roster: &[CombatantState],
    actor: CombatantId,
    skill: &SkillTemplate,
    target: CombatantId,
) -> Result<()> {
    if is_valid_target(roster, actor, skill, target) {
        Ok(())
    } else {
        Err(CombatError::InvalidTarget {
            skill: skill.id.clone(),
            target: target.0,
        })
    }
}

/// Every legal primary target of `skill` for `actor`, in id order.
#[must_use]
pub fn valid_targets(
    roster: &[CombatantState],
    actor: CombatantId,
    skill: &SkillTemplate,
) -> Vec<CombatantId> {
    roster
        .iter()
        .map(CombatantState::id)
        .filter(|id| is_valid_target(roster, actor, skill, *id))
        .collect()
}

/// Expand a primary target into the full target set.
#[must_use]
pub fn expand_targets(
    roster: &[CombatantState],
    actor: CombatantId,
    skill: &SkillTemplate,
    primary: CombatantId,
    secondary: Option<CombatantId>,
) -> Vec<CombatantId> {
    match skill.target_mode {
        TargetMode::SelfOnly => vec![actor],
        TargetMode::AllySingle | TargetMode::EnemySingle => vec![primary],
        TargetMode::EnemyCleave => {
            let mut set = vec![primary];
            if let Some(second) = secondary {
                if second != primary && is_valid_target(roster, actor, skill, second) {
                    set.push(second);
                }
            }
            set
        }
        TargetMode::EnemySplash => {
            let mut set = vec![primary];
            set.extend(
                valid_targets(roster, actor, skill)
                    .into_iter()
                    .filter(|id| *id != primary),
            );
            set
        }
    }
}

/// Resolve `action` for `actor`.
///
/// The primary target is expected to have passed [`validate_target`]; the
/// scheduler reselects or passes before calling this.
///
/// # Errors
///
/// Returns [`CombatError::SkillNotFound`] when the actor does not know the
/// skill and [`CombatError::CombatantNotFound`] for an actor outside the
/// roster. Resource shortfalls are reported as
/// [`ActionOutcome::CouldNotAfford`], not as errors.
pub fn resolve(
    roster: &mut [CombatantState],
    actor: CombatantId,
    action: &Action,
    rules: &RuleSet,
    rng: &mut dyn RandomSource,
) -> Result<ResolutionResult> {
    let actor_state = roster
        .get_mut(actor.index())
        .ok_or_else(|| CombatError::CombatantNotFound(actor.to_string()))?;
    let skill = actor_state
        .skill(&action.skill_id)
        .cloned()
        .ok_or_else(|| CombatError::SkillNotFound(action.skill_id.clone()))?;

    // 1. Resource check
    match actor_state.try_spend(&skill.cost) {
        Ok(()) => {}
        Err(CombatError::InsufficientResources {
            resource,
            required,
            available,
        }) => {
            tracing::debug!(
                actor = %actor,
                skill = %skill.id,
                %resource,
                required,
                available,
                "Could not afford skill"
            );
            return Ok(ResolutionResult {
                actor,
                outcome: ActionOutcome::CouldNotAfford {
                    skill_id: skill.id.clone(),
                    resource,
                    required,
                    available,
                },
            });
        }
        Err(err) => return Err(err),
    }

    // 2. Target expansion
    let target_set = expand_targets(
        roster,
        actor,
        &skill,
        action.target,
        action.secondary_target,
    );

    // Actor stats are read once; resolution never changes them mid-action.
    let accuracy = roster[actor.index()].accuracy_mod();
    let scaling_bonus = skill
        .power
        .as_ref()
        .and_then(|p| p.scaling_attribute)
        .map_or(0, |attr| {
            formulas::attribute_bonus(roster[actor.index()].attribute(attr))
        });

    // 3 + 4. Per-target hit, damage/healing, effects
    let mut targets = Vec::with_capacity(target_set.len());
    for target_id in target_set {
        let Some(target) = roster.get_mut(target_id.index()) else {
            continue;
        };
        let was_alive = target.is_alive();

        let hit = match &skill.power {
            Some(_) if skill.target_mode.targets_enemies() => {
                let chance = formulas::hit_chance(accuracy, target.evasion_mod(), rules);
                if rng.chance(percent_to_fraction(chance)) {
                    HitRoll::Hit
                } else {
                    HitRoll::Miss
                }
            }
            _ => HitRoll::Auto,
        };
        let mut outcome = TargetOutcome::new(target_id, hit);

        if let (Some(power), true) = (&skill.power, hit.landed()) {
            let base = power.base_amount.unwrap_or(rules.base_weapon_damage);
            let mut amount = formulas::raw_damage(base, scaling_bonus, power.multiplier);
            if let Some(bonus) = &power.bonus_vs_tag {
                if target.has_tag(&bonus.tag) {
                    amount = scale_floor(amount, bonus.multiplier);
                }
            }
            if rng.chance(power.crit_chance) {
                outcome.critical = true;
                amount = formulas::critical_damage(amount, power.crit_multiplier);
            }

            if power.is_healing() {
                outcome.healing = target.heal(u32::try_from(amount).unwrap_or(0));
            } else {
                let mitigation = target.mitigation_for(power.damage_kind);
                let dealt = formulas::mitigated_damage(amount, mitigation, rules);
                let dealt = u32::try_from(dealt).unwrap_or(0);
                let taken = target.take_damage(dealt);
                outcome.damage = dealt;
                outcome.absorbed = taken.absorbed;
            }
        }

        if was_alive && !target.is_alive() {
            outcome.defeated = true;
        }

        for application in skill.effects.iter().filter(|a| !a.on_self) {
            if !target.is_alive() {
                break;
            }
            if rng.chance(application.application_chance) {
                target.apply_effect(
                    application.effect,
                    application.potency,
                    application.duration_rounds,
                );
                outcome.effects_applied.push(application.effect);
            }
        }

        tracing::debug!(
            actor = %actor,
            skill = %skill.id,
            target = %target_id,
            hit = ?outcome.hit,
            critical = outcome.critical,
            damage = outcome.damage,
            healing = outcome.healing,
            defeated = outcome.defeated,
            "Resolved target"
        );
        targets.push(outcome);
    }

    let mut self_effects = Vec::new();
    let actor_state = &mut roster[actor.index()];
    for application in skill.effects.iter().filter(|a| a.on_self) {
        if !actor_state.is_alive() {
            break;
        }
        if rng.chance(application.application_chance) {
            actor_state.apply_effect(
                application.effect,
                application.potency,
                application.duration_rounds,
            );
            self_effects.push(application.effect);
        }
    }

    Ok(ResolutionResult {
        actor,
        outcome: ActionOutcome::Resolved {
            skill_id: skill.id.clone(),
            cost: skill.cost,
            targets,
            self_effects,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::Side;
    use crate::data::{
        Attribute, Attributes, CombatantTemplate, DamageKind, EffectApplication, PowerSpec,
        ResourcePools, TagBonus,
    };
    use crate::math::Fixed;
    use std::collections::BTreeSet;
    use std::sync::Arc;

    /// Replays a constant roll.
    struct ConstantRoll(f64);

    impl RandomSource for ConstantRoll {
        fn next_float(&mut self) -> f64 {
            self.0
        }
    }

    /// Replays rolls in order, then 0.0.
    struct Rolls(std::vec::IntoIter<f64>);

    impl Rolls {
        fn new(rolls: &[f64]) -> Self {
            Self(rolls.to_vec().into_iter())
        }
    }

    impl RandomSource for Rolls {
        fn next_float(&mut self) -> f64 {
            self.0.next().unwrap_or(0.0)
        }
    }

    fn strike(id: &str, mode: TargetMode) -> SkillTemplate {
        SkillTemplate {
            id: id.to_string(),
            name: id.to_string(),
            cost: ResourceCost::FREE,
            target_mode: mode,
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
        }
    }

    fn combatant(
        id: u32,
        side: Side,
        attributes: Attributes,
        armor: i32,
        tags: &[&str],
        skills: Vec<SkillTemplate>,
    ) -> CombatantState {
        let template = CombatantTemplate {
            id: format!("c{id}"),
            name: format!("C{id}"),
            attributes,
            base_hp: 40,
            resources: ResourcePools {
                mana: 30,
                stamina: 100,
                energy: 0,
            },
            armor,
            magic_resist: 0,
            tags: tags.iter().map(|t| (*t).to_string()).collect::<BTreeSet<_>>(),
            skills: skills.iter().map(|s| s.id.clone()).collect(),
            ai_strategy: None,
            xp_reward: None,
        };
        CombatantState::new(
            CombatantId(id),
            side,
            Arc::new(template),
            skills.into_iter().map(Arc::new).collect(),
            1,
        )
    }

    fn roster(skills: Vec<SkillTemplate>) -> Vec<CombatantState> {
        vec![
            combatant(0, Side::A, Attributes::new(14, 10, 10, 12, 10), 5, &[], skills),
            combatant(1, Side::B, Attributes::new(8, 12, 10, 9, 10), 2, &[], Vec::new()),
            combatant(2, Side::B, Attributes::new(8, 12, 10, 9, 10), 2, &["UNDEAD"], Vec::new()),
        ]
    }

    #[test]
    fn test_basic_strike_damage() {
        let mut roster = roster(vec![strike("basic_strike_phys", TargetMode::EnemySingle)]);
        let rules = RuleSet::standard();
        let before = roster[1].current_hp();
        let result = resolve(
            &mut roster,
            CombatantId(0),
            &Action::new("basic_strike_phys", CombatantId(1)),
            &rules,
            &mut ConstantRoll(0.0),
        )
        .unwrap();

        let target = &result.targets()[0];
        assert_eq!(target.hit, HitRoll::Hit);
        assert!(!target.critical);
        assert_eq!(target.damage, 5);
        assert_eq!(before - roster[1].current_hp(), 5);
    }

    #[test]
    fn test_miss_skips_damage_but_not_effects() {
        let mut skill = strike("crippling_blow", TargetMode::EnemySingle);
        skill.effects.push(EffectApplication {
            effect: EffectKind::Slowed,
            duration_rounds: 2,
            potency: 1,
            application_chance: Fixed::ONE,
            on_self: false,
        });
        let mut roster = roster(vec![skill]);
        let result = resolve(
            &mut roster,
            CombatantId(0),
            &Action::new("crippling_blow", CombatantId(1)),
            &RuleSet::standard(),
            &mut ConstantRoll(0.99),
        )
        .unwrap();

        let target = &result.targets()[0];
        assert_eq!(target.hit, HitRoll::Miss);
        assert_eq!(target.damage, 0);
        assert_eq!(target.effects_applied, vec![EffectKind::Slowed]);
        assert!(roster[1].effect(EffectKind::Slowed).is_some());
    }

    fn burning_and_weakening() -> SkillTemplate {
        let mut skill = strike("searing_cut", TargetMode::EnemySingle);
        skill.effects.push(EffectApplication {
            effect: EffectKind::Burning,
            duration_rounds: 2,
            potency: 3,
            application_chance: Fixed::from_num(0.5),
            on_self: false,
        });
        skill.effects.push(EffectApplication {
            effect: EffectKind::Weakened,
            duration_rounds: 2,
            potency: 2,
            application_chance: Fixed::ONE,
            on_self: false,
        });
        skill
    }

    #[test]
    fn test_each_effect_rolls_against_its_own_chance() {
        // hit, crit, burning (0.5), weakened (1.0)
        let mut roster = roster(vec![burning_and_weakening()]);
        let result = resolve(
            &mut roster,
            CombatantId(0),
            &Action::new("searing_cut", CombatantId(1)),
            &RuleSet::standard(),
            &mut Rolls::new(&[0.0, 0.0, 0.7, 0.7]),
        )
        .unwrap();

        let target = &result.targets()[0];
        assert_eq!(target.hit, HitRoll::Hit);
        assert_eq!(target.effects_applied, vec![EffectKind::Weakened]);
        assert!(roster[1].effect(EffectKind::Burning).is_none());
        assert!(roster[1].effect(EffectKind::Weakened).is_some());
    }

    #[test]
    fn test_effect_rolls_below_chance_all_land() {
        let mut roster = roster(vec![burning_and_weakening()]);
        let result = resolve(
            &mut roster,
            CombatantId(0),
            &Action::new("searing_cut", CombatantId(1)),
            &RuleSet::standard(),
            &mut Rolls::new(&[0.0, 0.0, 0.3, 0.99]),
        )
        .unwrap();

        assert_eq!(
            result.targets()[0].effects_applied,
            vec![EffectKind::Burning, EffectKind::Weakened]
        );
        assert_eq!(roster[1].effect(EffectKind::Burning).unwrap().potency, 3);
    }

    #[test]
    fn test_on_self_effects_land_on_actor() {
        let mut skill = strike("guarded_blow", TargetMode::EnemySingle);
        skill.effects = vec![
            EffectApplication {
                effect: EffectKind::Weakened,
                duration_rounds: 2,
                potency: 2,
                application_chance: Fixed::ONE,
                on_self: false,
            },
            EffectApplication {
                effect: EffectKind::DefenseUp,
                duration_rounds: 2,
                potency: 3,
                application_chance: Fixed::ONE,
                on_self: true,
            },
        ];
        let mut roster = roster(vec![skill]);
        let result = resolve(
            &mut roster,
            CombatantId(0),
            &Action::new("guarded_blow", CombatantId(1)),
            &RuleSet::standard(),
            &mut ConstantRoll(0.0),
        )
        .unwrap();

        let ActionOutcome::Resolved {
            targets,
            self_effects,
            ..
        } = &result.outcome
        else {
            panic!("expected a resolved action, got {:?}", result.outcome);
        };
        assert_eq!(targets[0].effects_applied, vec![EffectKind::Weakened]);
        assert_eq!(self_effects, &vec![EffectKind::DefenseUp]);
        assert!(roster[0].effect(EffectKind::DefenseUp).is_some());
        assert!(roster[0].effect(EffectKind::Weakened).is_none());
        assert!(roster[1].effect(EffectKind::DefenseUp).is_none());
    }

    #[test]
    fn test_could_not_afford_consumes_nothing() {
        let mut skill = strike("power_strike", TargetMode::EnemySingle);
        skill.cost = ResourceCost::new(200, ResourceKind::Stamina);
        let mut roster = roster(vec![skill]);
        let result = resolve(
            &mut roster,
            CombatantId(0),
            &Action::new("power_strike", CombatantId(1)),
            &RuleSet::standard(),
            &mut ConstantRoll(0.0),
        )
        .unwrap();

        assert!(matches!(
            result.outcome,
            ActionOutcome::CouldNotAfford {
                required: 200,
                available: 100,
                ..
            }
        ));
        assert_eq!(roster[0].resource(ResourceKind::Stamina), 100);
        assert_eq!(roster[1].current_hp(), roster[1].max_hp());
    }

    #[test]
    fn test_splash_hits_all_living_enemies() {
        let mut roster = roster(vec![strike("whirlwind", TargetMode::EnemySplash)]);
        roster[1].take_damage(1000);
        let result = resolve(
            &mut roster,
            CombatantId(0),
            &Action::new("whirlwind", CombatantId(2)),
            &RuleSet::standard(),
            &mut ConstantRoll(0.0),
        )
        .unwrap();
        let hit: Vec<_> = result.targets().iter().map(|t| t.target).collect();
        assert_eq!(hit, vec![CombatantId(2)]);
    }

    #[test]
    fn test_cleave_adds_secondary() {
        let mut roster = roster(vec![strike("cleave", TargetMode::EnemyCleave)]);
        let action =
            Action::new("cleave", CombatantId(1)).with_secondary(Some(CombatantId(2)));
        let result = resolve(
            &mut roster,
            CombatantId(0),
            &action,
            &RuleSet::standard(),
            &mut ConstantRoll(0.0),
        )
        .unwrap();
        assert_eq!(result.targets().len(), 2);
        assert_eq!(result.total_damage(), 10);
    }

    #[test]
    fn test_tag_bonus_and_crit() {
        let mut skill = strike("smite", TargetMode::EnemySingle);
        if let Some(power) = skill.power.as_mut() {
            power.bonus_vs_tag = Some(TagBonus {
                tag: "undead".to_string(),
                multiplier: Fixed::from_num(2),
            });
            power.crit_chance = Fixed::ONE;
        }
        let mut roster = roster(vec![skill]);
        let result = resolve(
            &mut roster,
            CombatantId(0),
            &Action::new("smite", CombatantId(2)),
            &RuleSet::standard(),
            &mut ConstantRoll(0.0),
        )
        .unwrap();
        // (5 + 2) * 2 = 14, crit * 1.5 = 21, minus armor 2
        let target = &result.targets()[0];
        assert!(target.critical);
        assert_eq!(target.damage, 19);
    }

    #[test]
    fn test_healing_self_always_hits() {
        let mut heal = strike("heal_lesser", TargetMode::SelfOnly);
        if let Some(power) = heal.power.as_mut() {
            power.damage_kind = DamageKind::Healing;
            power.base_amount = Some(10);
            power.scaling_attribute = Some(Attribute::Wis);
        }
        let mut roster = roster(vec![heal]);
        roster[0].take_damage(30);
        let result = resolve(
            &mut roster,
            CombatantId(0),
            &Action::new("heal_lesser", CombatantId(0)),
            &RuleSet::standard(),
            &mut ConstantRoll(0.99),
        )
        .unwrap();
        let target = &result.targets()[0];
        assert_eq!(target.hit, HitRoll::Auto);
        assert_eq!(target.healing, 10);
        assert_eq!(roster[0].current_hp(), 80);
    }

    #[test]
    fn test_target_validation() {
        let skill = strike("basic_strike_phys", TargetMode::EnemySingle);
        let mut roster = roster(vec![skill.clone()]);
        assert!(validate_target(&roster, CombatantId(0), &skill, CombatantId(1)).is_ok());
        assert!(validate_target(&roster, CombatantId(0), &skill, CombatantId(0)).is_err());
        assert!(validate_target(&roster, CombatantId(0), &skill, CombatantId(9)).is_err());

        roster[1].take_damage(1000);
        assert_eq!(
            valid_targets(&roster, CombatantId(0), &skill),
            vec![CombatantId(2)]
        );
    }

    #[test]
    fn test_unknown_skill_is_an_error() {
        let mut roster = roster(Vec::new());
        let err = resolve(
            &mut roster,
            CombatantId(0),
            &Action::new("meteor", CombatantId(1)),
            &RuleSet::standard(),
            &mut ConstantRoll(0.0),
        )
        .unwrap_err();
        assert_eq!(err, CombatError::SkillNotFound("meteor".to_string()));
    }
}
