//! Skill template data structures.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::{Attribute, ResourceKind};
use crate::effects::EffectKind;
use crate::error::{CombatError, Result};
use crate::math::{fixed_serde, Fixed};

/// Resource price of a skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceCost {
    /// Amount deducted on use.
    pub amount: u32,
    /// Pool the amount is deducted from.
    pub kind: ResourceKind,
}

impl ResourceCost {
    /// A cost of zero; always affordable.
    pub const FREE: Self = Self {
        amount: 0,
        kind: ResourceKind::Stamina,
    };

    /// Create a new cost.
    #[must_use]
    pub const fn new(amount: u32, kind: ResourceKind) -> Self {
        Self { amount, kind }
    }

    /// Whether this cost is zero.
    #[must_use]
    pub const fn is_free(&self) -> bool {
        self.amount == 0
    }
}

impl Default for ResourceCost {
    fn default() -> Self {
        Self::FREE
    }
}

/// Which combatants a skill can be aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetMode {
    /// The actor only.
    SelfOnly,
    /// One living ally (the actor counts as an ally).
    AllySingle,
    /// One living enemy.
    EnemySingle,
    /// The primary enemy plus one secondary enemy.
    EnemyCleave,
    /// The primary enemy plus every other living enemy.
    EnemySplash,
}

impl TargetMode {
    /// Whether the skill is aimed at the opposing side.
    #[must_use]
    pub const fn targets_enemies(self) -> bool {
        matches!(self, Self::EnemySingle | Self::EnemyCleave | Self::EnemySplash)
    }

    /// Whether the skill is aimed at the actor's own side.
    #[must_use]
    pub const fn targets_allies(self) -> bool {
        matches!(self, Self::SelfOnly | Self::AllySingle)
    }
}

/// Kind of damage dealt, which selects the mitigating stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DamageKind {
    /// Weapons and fists. Mitigated by armor.
    #[default]
    Physical,
    /// Raw arcane damage. Mitigated by magic resist.
    Magical,
    /// Fire damage. Mitigated by magic resist.
    Fire,
    /// Holy damage. Mitigated by magic resist.
    Holy,
    /// Restores HP instead of dealing damage.
    Healing,
}

impl DamageKind {
    /// Whether armor (instead of magic resist) mitigates this kind.
    #[must_use]
    pub const fn is_physical(self) -> bool {
        matches!(self, Self::Physical)
    }

    /// Whether this "damage" restores HP.
    #[must_use]
    pub const fn is_healing(self) -> bool {
        matches!(self, Self::Healing)
    }
}

impl fmt::Display for DamageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Physical => "physical",
            Self::Magical => "magical",
            Self::Fire => "fire",
            Self::Holy => "holy",
            Self::Healing => "healing",
        };
        f.write_str(name)
    }
}

/// Extra multiplier against targets carrying a tag (e.g. holy vs `UNDEAD`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagBonus {
    /// Tag the target must carry.
    pub tag: String,
    /// Multiplier applied to the damage or healing amount.
    #[serde(with = "fixed_serde")]
    pub multiplier: Fixed,
}

/// Damage or healing component of a skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerSpec {
    /// Base amount; `None` uses the configured base weapon damage.
    #[serde(default)]
    pub base_amount: Option<i32>,
    /// Attribute whose bonus is added to the base amount.
    #[serde(default)]
    pub scaling_attribute: Option<Attribute>,
    /// Damage kind (or [`DamageKind::Healing`]).
    #[serde(default)]
    pub damage_kind: DamageKind,
    /// Multiplier applied to `base + attribute bonus`.
    #[serde(default = "default_multiplier", with = "fixed_serde")]
    pub multiplier: Fixed,
    /// Chance (0-1) of a critical hit.
    #[serde(default, with = "fixed_serde")]
    pub crit_chance: Fixed,
    /// Multiplier applied on a critical hit.
    #[serde(default = "default_crit_multiplier", with = "fixed_serde")]
    pub crit_multiplier: Fixed,
    /// Conditional multiplier against tagged targets.
    #[serde(default)]
    pub bonus_vs_tag: Option<TagBonus>,
}

fn default_multiplier() -> Fixed {
    Fixed::ONE
}

fn default_crit_multiplier() -> Fixed {
    Fixed::from_num(1.5)
}

fn default_chance() -> Fixed {
    Fixed::ONE
}

impl PowerSpec {
    /// Whether this component heals.
    #[must_use]
    pub const fn is_healing(&self) -> bool {
        self.damage_kind.is_healing()
    }
}

/// A status effect a skill attempts to apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectApplication {
    /// Which effect.
    pub effect: EffectKind,
    /// Duration in rounds.
    pub duration_rounds: u32,
    /// Effect strength, meaning defined per kind.
    pub potency: i32,
    /// Chance (0-1) that the effect lands on each target.
    #[serde(default = "default_chance", with = "fixed_serde")]
    pub application_chance: Fixed,
    /// Apply to the actor instead of the skill's target set.
    #[serde(default)]
    pub on_self: bool,
}

/// Immutable skill definition.
///
/// # Example RON
///
/// ```ron
/// SkillTemplate(
///     id: "fireball",
///     name: "Fireball",
///     cost: (amount: 20, kind: Mana),
///     target_mode: EnemySingle,
///     power: Some((
///         base_amount: Some(10),
///         scaling_attribute: Some(Int),
///         damage_kind: Fire,
///         multiplier: 2.0,
///         crit_chance: 0.05,
///     )),
///     effects: [
///         (effect: Burning, duration_rounds: 2, potency: 3, application_chance: 0.5),
///     ],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillTemplate {
    /// Unique string identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Resource price.
    #[serde(default)]
    pub cost: ResourceCost,
    /// Targeting rule.
    pub target_mode: TargetMode,
    /// Damage or healing component.
    #[serde(default)]
    pub power: Option<PowerSpec>,
    /// Status effects attempted on use.
    #[serde(default)]
    pub effects: Vec<EffectApplication>,
}

impl SkillTemplate {
    /// Check structural invariants.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::InvalidTemplate`] for a skill with neither a
    /// power component nor effects, chances outside `0..=1`, or negative
    /// multipliers.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| CombatError::InvalidTemplate {
            id: self.id.clone(),
            message,
        };

        if self.id.trim().is_empty() {
            return Err(invalid("skill id is empty".to_string()));
        }
        if self.power.is_none() && self.effects.is_empty() {
            return Err(invalid(
                "skill has neither a damage/healing component nor effects".to_string(),
            ));
        }
        if let Some(power) = &self.power {
            if power.multiplier < Fixed::ZERO || power.crit_multiplier < Fixed::ZERO {
                return Err(invalid("multipliers must not be negative".to_string()));
            }
            if !is_probability(power.crit_chance) {
                return Err(invalid(format!(
                    "crit chance {} is outside 0..=1",
                    power.crit_chance
                )));
            }
            if let Some(bonus) = &power.bonus_vs_tag {
                if bonus.multiplier < Fixed::ZERO {
                    return Err(invalid("tag bonus multiplier must not be negative".to_string()));
                }
            }
            if power.is_healing() && self.target_mode.targets_enemies() {
                return Err(invalid("healing skills cannot target enemies".to_string()));
            }
        }
        for application in &self.effects {
            if !is_probability(application.application_chance) {
                return Err(invalid(format!(
                    "{} application chance {} is outside 0..=1",
                    application.effect, application.application_chance
                )));
            }
            if application.duration_rounds == 0 {
                return Err(invalid(format!(
                    "{} has a duration of zero rounds",
                    application.effect
                )));
            }
        }
        Ok(())
    }

    /// Whether the skill deals damage to enemies.
    #[must_use]
    pub fn is_offensive(&self) -> bool {
        self.target_mode.targets_enemies()
            && self.power.as_ref().is_some_and(|p| !p.is_healing())
    }

    /// Whether the skill restores HP.
    #[must_use]
    pub fn is_healing(&self) -> bool {
        self.power.as_ref().is_some_and(PowerSpec::is_healing)
    }

    /// Whether the skill applies at least one status effect.
    #[must_use]
    pub fn has_effects(&self) -> bool {
        !self.effects.is_empty()
    }

    /// Ally-side skill whose value lies in its effects (no damage, no healing).
    #[must_use]
    pub fn is_ally_buff(&self) -> bool {
        self.target_mode.targets_allies() && self.power.is_none() && self.has_effects()
    }

    /// Enemy-side skill that applies at least one debuff.
    #[must_use]
    pub fn is_enemy_debuff(&self) -> bool {
        self.target_mode.targets_enemies()
            && self
                .effects
                .iter()
                .any(|a| !a.on_self && !a.effect.is_beneficial())
    }
}

fn is_probability(value: Fixed) -> bool {
    value >= Fixed::ZERO && value <= Fixed::ONE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_skill() -> SkillTemplate {
        SkillTemplate {
            id: "test_strike".to_string(),
            name: "Test Strike".to_string(),
            cost: ResourceCost::new(10, ResourceKind::Stamina),
            target_mode: TargetMode::EnemySingle,
            power: Some(PowerSpec {
                base_amount: Some(6),
                scaling_attribute: Some(Attribute::Str),
                damage_kind: DamageKind::Physical,
                multiplier: Fixed::ONE,
                crit_chance: Fixed::from_num(0.1),
                crit_multiplier: Fixed::from_num(1.5),
                bonus_vs_tag: None,
            }),
            effects: Vec::new(),
        }
    }

    #[test]
    fn test_empty_skill_is_invalid() {
        let mut skill = create_test_skill();
        skill.power = None;
        assert!(matches!(
            skill.validate(),
            Err(CombatError::InvalidTemplate { .. })
        ));
    }

    #[test]
    fn test_effect_only_skill_is_valid() {
        let mut skill = create_test_skill();
        skill.power = None;
        skill.effects.push(EffectApplication {
            effect: EffectKind::Stunned,
            duration_rounds: 1,
            potency: 1,
            application_chance: Fixed::from_num(0.5),
            on_self: false,
        });
        assert!(skill.validate().is_ok());
        assert!(skill.is_enemy_debuff());
        assert!(!skill.is_offensive());
    }

    #[test]
    fn test_chance_out_of_range_is_invalid() {
        let mut skill = create_test_skill();
        if let Some(power) = skill.power.as_mut() {
            power.crit_chance = Fixed::from_num(1.5);
        }
        assert!(skill.validate().is_err());
    }

    #[test]
    fn test_healing_cannot_target_enemies() {
        let mut skill = create_test_skill();
        if let Some(power) = skill.power.as_mut() {
            power.damage_kind = DamageKind::Healing;
        }
        assert!(skill.validate().is_err());

        skill.target_mode = TargetMode::AllySingle;
        assert!(skill.validate().is_ok());
        assert!(skill.is_healing());
        assert!(!skill.is_ally_buff());
    }

    #[test]
    fn test_parse_from_ron_with_defaults() {
        let ron = r#"
            SkillTemplate(
                id: "basic_strike_phys",
                name: "Basic Strike",
                target_mode: EnemySingle,
                power: Some((
                    scaling_attribute: Some(Str),
                )),
            )
        "#;
        let skill: SkillTemplate = ron::from_str(ron).unwrap();
        assert!(skill.cost.is_free());
        let power = skill.power.as_ref().unwrap();
        assert_eq!(power.base_amount, None);
        assert_eq!(power.multiplier, Fixed::ONE);
        assert_eq!(power.crit_chance, Fixed::ZERO);
        assert!(skill.validate().is_ok());
    }
}
