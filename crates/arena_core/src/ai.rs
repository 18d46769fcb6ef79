//! AI strategy dispatch.
//!
//! A combatant's template names a [`StrategyId`]; [`strategy_for`] maps it
//! to a stateless [`Strategy`] that turns a [`BattleView`] into an
//! [`Action`]. Every probabilistic choice draws from the injected
//! [`RandomSource`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::combatant::{CombatantId, CombatantState};
use crate::config::RuleSet;
use crate::data::{SkillTemplate, TargetMode};
use crate::math::{scale_floor, Fixed};
use crate::resolution::{is_valid_target, valid_targets, Action};
use crate::rng::RandomSource;

/// Tag marking spellcasters, compared case-insensitively.
pub const CASTER_TAG: &str = "CASTER";

/// Named decision policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StrategyId {
    /// Hit the weakest enemy with the hardest-hitting skill.
    BasicMelee,
    /// Focus casters, prefer skills with status effects.
    BasicRanged,
    /// Heal, then buff, then debuff, then attack.
    SupportCaster,
}

/// Read-only view of the battlefield from one combatant's seat.
#[derive(Debug, Clone, Copy)]
pub struct BattleView<'a> {
    actor: CombatantId,
    roster: &'a [CombatantState],
    rules: &'a RuleSet,
}

impl<'a> BattleView<'a> {
    /// Create a view for `actor`.
    #[must_use]
    pub fn new(actor: CombatantId, roster: &'a [CombatantState], rules: &'a RuleSet) -> Self {
        Self {
            actor,
            roster,
            rules,
        }
    }

    /// Acting combatant's id.
    #[must_use]
    pub const fn actor_id(&self) -> CombatantId {
        self.actor
    }

    /// Acting combatant.
    ///
    /// # Panics
    ///
    /// Never for views built by the encounter; the actor is always rostered.
    #[must_use]
    pub fn actor(&self) -> &'a CombatantState {
        &self.roster[self.actor.index()]
    }

    /// Whole roster, living and defeated.
    #[must_use]
    pub const fn roster(&self) -> &'a [CombatantState] {
        self.roster
    }

    /// Active rules.
    #[must_use]
    pub const fn rules(&self) -> &'a RuleSet {
        self.rules
    }

    /// Living combatants on the actor's side, the actor included.
    pub fn allies(&self) -> impl Iterator<Item = &'a CombatantState> + '_ {
        let side = self.actor().side();
        self.roster
            .iter()
            .filter(move |c| c.is_alive() && c.side() == side)
    }

    /// Living combatants on the opposing side.
    pub fn enemies(&self) -> impl Iterator<Item = &'a CombatantState> + '_ {
        let side = self.actor().side();
        self.roster
            .iter()
            .filter(move |c| c.is_alive() && c.side() != side)
    }

    /// Known skills that are affordable and have at least one legal target.
    #[must_use]
    pub fn usable_skills(&self) -> Vec<&'a Arc<SkillTemplate>> {
        let actor = self.actor();
        actor
            .skills()
            .iter()
            .filter(|skill| actor.can_afford(&skill.cost))
            .filter(|skill| !valid_targets(self.roster, self.actor, skill).is_empty())
            .collect()
    }
}

/// A decision policy.
pub trait Strategy: Send + Sync {
    /// Choose an action, or `None` to pass.
    fn decide(&self, view: &BattleView<'_>, rng: &mut dyn RandomSource) -> Option<Action>;

    /// Replacement target for `skill` when the chosen one turned out invalid.
    fn fallback_target(&self, view: &BattleView<'_>, skill: &SkillTemplate) -> Option<CombatantId> {
        default_target(view, skill)
    }
}

/// Strategy for a template's `ai_strategy` field.
#[must_use]
pub fn strategy_for(id: Option<StrategyId>) -> &'static dyn Strategy {
    match id {
        Some(StrategyId::BasicMelee) => &BasicMelee,
        Some(StrategyId::BasicRanged) => &BasicRanged,
        Some(StrategyId::SupportCaster) => &SupportCaster,
        None => &FirstSkill,
    }
}

/// Supplies actions for combatants whose turn it is.
///
/// [`AiController`] drives combatants through their strategies; callers can
/// plug in scripted or human controllers instead.
pub trait Controller {
    /// Choose an action for `view.actor()`, or `None` to pass.
    fn choose_action(
        &mut self,
        view: &BattleView<'_>,
        rng: &mut dyn RandomSource,
    ) -> Option<Action>;
}

/// Dispatches every decision to the actor's configured strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct AiController;

impl Controller for AiController {
    fn choose_action(
        &mut self,
        view: &BattleView<'_>,
        rng: &mut dyn RandomSource,
    ) -> Option<Action> {
        let strategy_id = view.actor().template().ai_strategy;
        let action = strategy_for(strategy_id).decide(view, rng);
        tracing::debug!(
            actor = %view.actor_id(),
            strategy = ?strategy_id,
            action = ?action,
            "AI decision"
        );
        action
    }
}

// ----------------------------------------------------------------------------
// Strategies
// ----------------------------------------------------------------------------

/// Weakest-target melee policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicMelee;

impl BasicMelee {
    const WEAKEST_TARGET_CHANCE: f64 = 0.8;
    const STRONGEST_SKILL_CHANCE: f64 = 0.7;
}

impl Strategy for BasicMelee {
    fn decide(&self, view: &BattleView<'_>, rng: &mut dyn RandomSource) -> Option<Action> {
        let enemy = if rng.chance(Fixed::from_num(Self::WEAKEST_TARGET_CHANCE)) {
            weakest(view.enemies())
        } else {
            random_of(view.enemies(), rng)
        };

        let usable = view.usable_skills();
        if usable.is_empty() {
            return None;
        }
        let skill = if rng.chance(Fixed::from_num(Self::STRONGEST_SKILL_CHANCE)) {
            highest_damage(view, &usable).unwrap_or(usable[0])
        } else {
            usable[rng.index(usable.len())]
        };
        build_action(view, skill, enemy, rng)
    }
}

/// Caster-focused ranged policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicRanged;

impl BasicRanged {
    const CASTER_TARGET_CHANCE: f64 = 0.7;
    const WEAKEST_TARGET_CHANCE: f64 = 0.6;
    const EFFECT_SKILL_CHANCE: f64 = 0.6;

    fn pick_enemy<'a>(
        view: &BattleView<'a>,
        rng: &mut dyn RandomSource,
    ) -> Option<&'a CombatantState> {
        let casters = view.enemies().filter(|c| c.has_tag(CASTER_TAG));
        if let Some(caster) = weakest(casters) {
            if rng.chance(Fixed::from_num(Self::CASTER_TARGET_CHANCE)) {
                return Some(caster);
            }
        }
        if rng.chance(Fixed::from_num(Self::WEAKEST_TARGET_CHANCE)) {
            weakest(view.enemies())
        } else {
            random_of(view.enemies(), rng)
        }
    }
}

impl Strategy for BasicRanged {
    fn decide(&self, view: &BattleView<'_>, rng: &mut dyn RandomSource) -> Option<Action> {
        let enemy = Self::pick_enemy(view, rng);

        let usable = view.usable_skills();
        if usable.is_empty() {
            return None;
        }
        let with_effects: Vec<_> = usable
            .iter()
            .copied()
            .filter(|s| s.target_mode.targets_enemies() && s.has_effects())
            .collect();
        let skill = if !with_effects.is_empty()
            && rng.chance(Fixed::from_num(Self::EFFECT_SKILL_CHANCE))
        {
            with_effects[0]
        } else {
            highest_damage(view, &usable).unwrap_or(usable[0])
        };
        build_action(view, skill, enemy, rng)
    }

    fn fallback_target(&self, view: &BattleView<'_>, skill: &SkillTemplate) -> Option<CombatantId> {
        if skill.target_mode.targets_enemies() {
            if let Some(caster) = weakest(view.enemies().filter(|c| c.has_tag(CASTER_TAG))) {
                return Some(caster.id());
            }
        }
        default_target(view, skill)
    }
}

/// Heal, buff, debuff, attack, in that priority.
#[derive(Debug, Clone, Copy, Default)]
pub struct SupportCaster;

impl SupportCaster {
    fn heal(view: &BattleView<'_>, usable: &[&Arc<SkillTemplate>]) -> Option<Action> {
        let threshold = view.rules().ai_heal_threshold;
        let most_wounded = view
            .allies()
            .filter(|c| c.hp_ratio() < threshold)
            .min_by(|a, b| a.hp_ratio().cmp(&b.hp_ratio()).then(a.id().cmp(&b.id())))?;

        usable
            .iter()
            .filter(|s| s.is_healing())
            .find_map(|skill| {
                let target = match skill.target_mode {
                    TargetMode::SelfOnly => view.actor_id(),
                    _ => most_wounded.id(),
                };
                let wounded = view.roster()[target.index()].hp_ratio() < threshold;
                (wounded && is_valid_target(view.roster(), view.actor_id(), skill, target))
                    .then(|| Action::new(skill.id.clone(), target))
            })
    }

    fn buff(view: &BattleView<'_>, usable: &[&Arc<SkillTemplate>]) -> Option<Action> {
        usable.iter().filter(|s| s.is_ally_buff()).find_map(|skill| {
            valid_targets(view.roster(), view.actor_id(), skill)
                .into_iter()
                .find(|id| lacks_any_effect(&view.roster()[id.index()], skill))
                .map(|target| Action::new(skill.id.clone(), target))
        })
    }

    fn debuff(
        view: &BattleView<'_>,
        usable: &[&Arc<SkillTemplate>],
        rng: &mut dyn RandomSource,
    ) -> Option<Action> {
        let skill = usable.iter().copied().find(|s| s.is_enemy_debuff())?;
        let candidates: Vec<&CombatantState> = view
            .enemies()
            .filter(|c| lacks_any_effect(c, skill))
            .collect();
        let target = candidates
            .iter()
            .copied()
            .filter(|c| c.has_tag(CASTER_TAG))
            .min_by_key(|c| c.id())
            .or_else(|| strongest(candidates.iter().copied()))?;
        build_action(view, skill, Some(target), rng)
    }
}

impl Strategy for SupportCaster {
    fn decide(&self, view: &BattleView<'_>, rng: &mut dyn RandomSource) -> Option<Action> {
        let usable = view.usable_skills();
        if usable.is_empty() {
            return None;
        }
        Self::heal(view, &usable)
            .or_else(|| Self::buff(view, &usable))
            .or_else(|| Self::debuff(view, &usable, rng))
            .or_else(|| BasicMelee.decide(view, rng))
    }
}

/// Policy for combatants without a strategy: first known skill, random target.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstSkill;

impl Strategy for FirstSkill {
    fn decide(&self, view: &BattleView<'_>, rng: &mut dyn RandomSource) -> Option<Action> {
        let actor = view.actor();
        let first = actor.skills().first()?;
        let targets = valid_targets(view.roster(), view.actor_id(), first);
        if !actor.can_afford(&first.cost) || targets.is_empty() {
            return cheapest_fallback(view, rng);
        }
        let target = targets[rng.index(targets.len())];
        Some(Action::new(first.id.clone(), target).with_secondary(secondary_for(
            view, first, target, rng,
        )))
    }
}

// ----------------------------------------------------------------------------
// Shared helpers
// ----------------------------------------------------------------------------

/// Lowest current HP, ties to the lower id.
fn weakest<'a>(candidates: impl Iterator<Item = &'a CombatantState>) -> Option<&'a CombatantState> {
    candidates.min_by_key(|c| (c.current_hp(), c.id()))
}

/// Highest current HP, ties to the lower id.
fn strongest<'a>(
    candidates: impl Iterator<Item = &'a CombatantState>,
) -> Option<&'a CombatantState> {
    candidates.min_by_key(|c| (std::cmp::Reverse(c.current_hp()), c.id()))
}

fn random_of<'a>(
    candidates: impl Iterator<Item = &'a CombatantState>,
    rng: &mut dyn RandomSource,
) -> Option<&'a CombatantState> {
    let all: Vec<_> = candidates.collect();
    if all.is_empty() {
        return None;
    }
    Some(all[rng.index(all.len())])
}

/// Nominal damage of an offensive skill, before attributes and mitigation.
fn nominal_damage(view: &BattleView<'_>, skill: &SkillTemplate) -> Option<i32> {
    let power = skill.power.as_ref()?;
    if !skill.is_offensive() {
        return None;
    }
    let base = power.base_amount.unwrap_or(view.rules().base_weapon_damage);
    Some(scale_floor(base, power.multiplier))
}

/// Highest nominal damage among offensive skills; ties keep template order.
fn highest_damage<'a>(
    view: &BattleView<'_>,
    skills: &[&'a Arc<SkillTemplate>],
) -> Option<&'a Arc<SkillTemplate>> {
    let mut best: Option<(&Arc<SkillTemplate>, i32)> = None;
    for skill in skills {
        if let Some(damage) = nominal_damage(view, skill) {
            if best.map_or(true, |(_, top)| damage > top) {
                best = Some((*skill, damage));
            }
        }
    }
    best.map(|(skill, _)| skill)
}

fn lacks_any_effect(target: &CombatantState, skill: &SkillTemplate) -> bool {
    skill
        .effects
        .iter()
        .filter(|a| !a.on_self)
        .any(|a| target.effect(a.effect).is_none())
}

/// Deterministic target choice for any skill.
fn default_target(view: &BattleView<'_>, skill: &SkillTemplate) -> Option<CombatantId> {
    match skill.target_mode {
        TargetMode::SelfOnly => Some(view.actor_id()),
        TargetMode::AllySingle => view
            .allies()
            .min_by(|a, b| a.hp_ratio().cmp(&b.hp_ratio()).then(a.id().cmp(&b.id())))
            .map(CombatantState::id),
        TargetMode::EnemySingle | TargetMode::EnemyCleave | TargetMode::EnemySplash => {
            weakest(view.enemies()).map(CombatantState::id)
        }
    }
}

/// Second cleave target: a random living enemy other than the primary.
fn secondary_for(
    view: &BattleView<'_>,
    skill: &SkillTemplate,
    primary: CombatantId,
    rng: &mut dyn RandomSource,
) -> Option<CombatantId> {
    if skill.target_mode != TargetMode::EnemyCleave {
        return None;
    }
    random_of(view.enemies().filter(|c| c.id() != primary), rng).map(CombatantState::id)
}

/// Pair a skill with a target. An enemy pick is used only by enemy skills;
/// self and ally skills use the deterministic default target.
fn build_action(
    view: &BattleView<'_>,
    skill: &SkillTemplate,
    enemy: Option<&CombatantState>,
    rng: &mut dyn RandomSource,
) -> Option<Action> {
    let target = match (skill.target_mode.targets_enemies(), enemy) {
        (true, Some(enemy)) => enemy.id(),
        _ => default_target(view, skill)?,
    };
    let secondary = secondary_for(view, skill, target, rng);
    Some(Action::new(skill.id.clone(), target).with_secondary(secondary))
}

/// Cheapest usable skill on a random legal target, or `None` to pass.
///
/// Only reached when the first known skill cannot be used.
fn cheapest_fallback(view: &BattleView<'_>, rng: &mut dyn RandomSource) -> Option<Action> {
    let usable = view.usable_skills();
    let skill = usable
        .iter()
        .copied()
        .enumerate()
        .min_by_key(|(order, s)| (s.cost.amount, *order))
        .map(|(_, s)| s)?;
    let targets = valid_targets(view.roster(), view.actor_id(), skill);
    let target = targets[rng.index(targets.len())];
    let secondary = secondary_for(view, skill, target, rng);
    Some(Action::new(skill.id.clone(), target).with_secondary(secondary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::Side;
    use crate::data::{
        Attribute, Attributes, CombatantTemplate, DamageKind, EffectApplication, PowerSpec,
        ResourceCost, ResourceKind, ResourcePools,
    };
    use crate::effects::EffectKind;
    use std::collections::BTreeSet;

    struct ConstantRoll(f64);

    impl RandomSource for ConstantRoll {
        fn next_float(&mut self) -> f64 {
            self.0
        }
    }

    fn attack(id: &str, base: i32, cost: u32) -> SkillTemplate {
        SkillTemplate {
            id: id.to_string(),
            name: id.to_string(),
            cost: ResourceCost::new(cost, ResourceKind::Stamina),
            target_mode: TargetMode::EnemySingle,
            power: Some(PowerSpec {
                base_amount: Some(base),
                scaling_attribute: Some(Attribute::Str),
                damage_kind: DamageKind::Physical,
                multiplier: Fixed::ONE,
                crit_chance: Fixed::ZERO,
                crit_multiplier: Fixed::ONE,
                bonus_vs_tag: None,
            }),
            effects: Vec::new(),
        }
    }

    fn heal_skill() -> SkillTemplate {
        let mut skill = attack("heal_lesser", 10, 5);
        skill.target_mode = TargetMode::AllySingle;
        if let Some(power) = skill.power.as_mut() {
            power.damage_kind = DamageKind::Healing;
        }
        skill
    }

    fn blessing_skill() -> SkillTemplate {
        SkillTemplate {
            id: "blessing".to_string(),
            name: "Blessing".to_string(),
            cost: ResourceCost::new(5, ResourceKind::Stamina),
            target_mode: TargetMode::AllySingle,
            power: None,
            effects: vec![EffectApplication {
                effect: EffectKind::DefenseUp,
                duration_rounds: 3,
                potency: 3,
                application_chance: Fixed::ONE,
                on_self: false,
            }],
        }
    }

    fn curse_skill() -> SkillTemplate {
        SkillTemplate {
            id: "weakening_curse".to_string(),
            name: "Weakening Curse".to_string(),
            cost: ResourceCost::new(5, ResourceKind::Stamina),
            target_mode: TargetMode::EnemySingle,
            power: None,
            effects: vec![EffectApplication {
                effect: EffectKind::Weakened,
                duration_rounds: 3,
                potency: 2,
                application_chance: Fixed::ONE,
                on_self: false,
            }],
        }
    }

    fn unit(
        id: u32,
        side: Side,
        strategy: Option<StrategyId>,
        tags: &[&str],
        stamina: u32,
        skills: Vec<SkillTemplate>,
    ) -> CombatantState {
        let template = CombatantTemplate {
            id: format!("u{id}"),
            name: format!("U{id}"),
            attributes: Attributes::default(),
            base_hp: 50,
            resources: ResourcePools {
                mana: 0,
                stamina,
                energy: 0,
            },
            armor: 0,
            magic_resist: 0,
            tags: tags.iter().map(|t| (*t).to_string()).collect::<BTreeSet<_>>(),
            skills: skills.iter().map(|s| s.id.clone()).collect(),
            ai_strategy: strategy,
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

    /// Enemies at `first_id..first_id + 3`: a scratched bruiser, a badly
    /// hurt grunt and an untouched caster.
    fn enemies_from(first_id: u32) -> Vec<CombatantState> {
        let mut tough = unit(first_id, Side::B, None, &[], 0, Vec::new());
        tough.take_damage(5);
        let mut weak = unit(first_id + 1, Side::B, None, &[], 0, Vec::new());
        weak.take_damage(40);
        let caster = unit(first_id + 2, Side::B, None, &["caster"], 0, Vec::new());
        vec![tough, weak, caster]
    }

    fn enemies_with_caster() -> Vec<CombatantState> {
        enemies_from(1)
    }

    #[test]
    fn test_melee_prefers_weakest_and_strongest_skill() {
        let actor = unit(
            0,
            Side::A,
            Some(StrategyId::BasicMelee),
            &[],
            100,
            vec![attack("basic_strike_phys", 5, 0), attack("power_strike", 9, 20)],
        );
        let mut roster = vec![actor];
        roster.extend(enemies_with_caster());
        let rules = RuleSet::standard();
        let view = BattleView::new(CombatantId(0), &roster, &rules);

        let action = AiController.choose_action(&view, &mut ConstantRoll(0.0)).unwrap();
        assert_eq!(action, Action::new("power_strike", CombatantId(2)));
    }

    #[test]
    fn test_melee_ignores_unaffordable_skills() {
        let actor = unit(
            0,
            Side::A,
            Some(StrategyId::BasicMelee),
            &[],
            10,
            vec![attack("power_strike", 9, 20), attack("basic_strike_phys", 5, 0)],
        );
        let mut roster = vec![actor];
        roster.extend(enemies_with_caster());
        let rules = RuleSet::standard();
        let view = BattleView::new(CombatantId(0), &roster, &rules);

        let usable = view.usable_skills();
        assert_eq!(usable.len(), 1);
        let action = BasicMelee.decide(&view, &mut ConstantRoll(0.0)).unwrap();
        assert_eq!(action.skill_id, "basic_strike_phys");
    }

    #[test]
    fn test_pass_when_nothing_affordable() {
        let actor = unit(
            0,
            Side::A,
            Some(StrategyId::BasicMelee),
            &[],
            0,
            vec![attack("power_strike", 9, 20)],
        );
        let mut roster = vec![actor];
        roster.extend(enemies_with_caster());
        let rules = RuleSet::standard();
        let view = BattleView::new(CombatantId(0), &roster, &rules);
        assert_eq!(BasicMelee.decide(&view, &mut ConstantRoll(0.0)), None);
    }

    #[test]
    fn test_ranged_focuses_casters() {
        let mut curse = curse_skill();
        curse.power = Some(PowerSpec {
            base_amount: Some(3),
            scaling_attribute: None,
            damage_kind: DamageKind::Magical,
            multiplier: Fixed::ONE,
            crit_chance: Fixed::ZERO,
            crit_multiplier: Fixed::ONE,
            bonus_vs_tag: None,
        });
        let actor = unit(
            0,
            Side::A,
            Some(StrategyId::BasicRanged),
            &[],
            100,
            vec![attack("aimed_shot", 8, 0), curse],
        );
        let mut roster = vec![actor];
        roster.extend(enemies_with_caster());
        let rules = RuleSet::standard();
        let view = BattleView::new(CombatantId(0), &roster, &rules);

        let action = BasicRanged.decide(&view, &mut ConstantRoll(0.0)).unwrap();
        assert_eq!(action, Action::new("weakening_curse", CombatantId(3)));

        // rolls of 0.9 skip the caster and the effect skill: random enemy, top damage
        let action = BasicRanged.decide(&view, &mut ConstantRoll(0.9)).unwrap();
        assert_eq!(action.skill_id, "aimed_shot");
    }

    #[test]
    fn test_support_heals_wounded_ally_first() {
        let healer = unit(
            0,
            Side::A,
            Some(StrategyId::SupportCaster),
            &[],
            100,
            vec![attack("basic_strike_phys", 5, 0), curse_skill(), heal_skill()],
        );
        let mut ally = unit(1, Side::A, None, &[], 0, Vec::new());
        ally.take_damage(80);
        let mut roster = vec![healer, ally];
        roster.extend(enemies_from(2));
        let rules = RuleSet::standard();
        let view = BattleView::new(CombatantId(0), &roster, &rules);

        let action = SupportCaster.decide(&view, &mut ConstantRoll(0.0)).unwrap();
        assert_eq!(action, Action::new("heal_lesser", CombatantId(1)));
    }

    #[test]
    fn test_support_debuffs_caster_when_no_one_is_hurt() {
        let healer = unit(
            0,
            Side::A,
            Some(StrategyId::SupportCaster),
            &[],
            100,
            vec![attack("basic_strike_phys", 5, 0), curse_skill(), heal_skill()],
        );
        let mut roster = vec![healer];
        roster.extend(enemies_with_caster());
        let rules = RuleSet::standard();
        let view = BattleView::new(CombatantId(0), &roster, &rules);

        let action = SupportCaster.decide(&view, &mut ConstantRoll(0.0)).unwrap();
        assert_eq!(action, Action::new("weakening_curse", CombatantId(3)));

        roster[3].apply_effect(EffectKind::Weakened, 2, 3);
        let view = BattleView::new(CombatantId(0), &roster, &rules);
        let action = SupportCaster.decide(&view, &mut ConstantRoll(0.0)).unwrap();
        // strongest remaining enemy without the debuff
        assert_eq!(action, Action::new("weakening_curse", CombatantId(1)));
    }

    #[test]
    fn test_support_buffs_before_debuffing() {
        let support = unit(
            0,
            Side::A,
            Some(StrategyId::SupportCaster),
            &[],
            100,
            vec![
                attack("basic_strike_phys", 5, 0),
                curse_skill(),
                heal_skill(),
                blessing_skill(),
            ],
        );
        let ally = unit(1, Side::A, None, &[], 0, Vec::new());
        let mut roster = vec![support, ally];
        roster.extend(enemies_from(2));
        let rules = RuleSet::standard();

        let view = BattleView::new(CombatantId(0), &roster, &rules);
        let action = SupportCaster.decide(&view, &mut ConstantRoll(0.0)).unwrap();
        assert_eq!(action, Action::new("blessing", CombatantId(0)));

        // an ally already carrying the buff is skipped
        roster[0].apply_effect(EffectKind::DefenseUp, 3, 3);
        let view = BattleView::new(CombatantId(0), &roster, &rules);
        let action = SupportCaster.decide(&view, &mut ConstantRoll(0.0)).unwrap();
        assert_eq!(action, Action::new("blessing", CombatantId(1)));

        // everyone buffed: fall through to the debuff on the caster
        roster[1].apply_effect(EffectKind::DefenseUp, 3, 3);
        let view = BattleView::new(CombatantId(0), &roster, &rules);
        let action = SupportCaster.decide(&view, &mut ConstantRoll(0.0)).unwrap();
        assert_eq!(action, Action::new("weakening_curse", CombatantId(4)));
    }

    #[test]
    fn test_first_skill_falls_back_to_cheapest_usable() {
        let actor = unit(
            0,
            Side::A,
            None,
            &[],
            10,
            vec![
                attack("power_strike", 9, 20),
                attack("jab", 3, 5),
                attack("claw", 4, 0),
            ],
        );
        let mut roster = vec![actor];
        roster.extend(enemies_with_caster());
        let rules = RuleSet::standard();
        let view = BattleView::new(CombatantId(0), &roster, &rules);

        let action = FirstSkill.decide(&view, &mut ConstantRoll(0.0)).unwrap();
        assert_eq!(action, Action::new("claw", CombatantId(1)));
    }

    #[test]
    fn test_first_skill_fallback_strategy() {
        let actor = unit(
            0,
            Side::A,
            None,
            &[],
            100,
            vec![attack("claw", 4, 0), attack("bite", 9, 0)],
        );
        let mut roster = vec![actor];
        roster.extend(enemies_with_caster());
        let rules = RuleSet::standard();
        let view = BattleView::new(CombatantId(0), &roster, &rules);

        let action = AiController.choose_action(&view, &mut ConstantRoll(0.99)).unwrap();
        assert_eq!(action, Action::new("claw", CombatantId(3)));
    }

    #[test]
    fn test_fallback_targets() {
        let actor = unit(0, Side::A, None, &[], 100, vec![attack("claw", 4, 0)]);
        let mut roster = vec![actor];
        roster.extend(enemies_with_caster());
        let rules = RuleSet::standard();
        let view = BattleView::new(CombatantId(0), &roster, &rules);
        let claw = roster[0].skills()[0].clone();

        assert_eq!(BasicMelee.fallback_target(&view, &claw), Some(CombatantId(2)));
        assert_eq!(BasicRanged.fallback_target(&view, &claw), Some(CombatantId(3)));
    }
}
