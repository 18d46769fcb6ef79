//! Pure combat formulas.
//!
//! Every function here is stateless. Rule constants come in through
//! [`RuleSet`]; nothing is hard-coded.

use crate::config::RuleSet;
use crate::data::{CombatantTemplate, ResourceKind};
use crate::math::{ceil_u32, scale_floor, Fixed};

/// HP granted per point of constitution.
pub const HP_PER_CONSTITUTION: u32 = 5;

/// Initiative granted per point of dexterity.
pub const INITIATIVE_PER_DEXTERITY: i32 = 2;

/// `floor((value - 10) / 2)`, rounding toward negative infinity.
#[must_use]
pub const fn attribute_bonus(value: i32) -> i32 {
    (value - 10).div_euclid(2)
}

/// `base_hp + CON * 5`.
#[must_use]
pub fn max_hp(template: &CombatantTemplate) -> u32 {
    let con = u32::try_from(template.attributes.constitution).unwrap_or(0);
    template
        .base_hp
        .saturating_add(con.saturating_mul(HP_PER_CONSTITUTION))
}

/// Resource pools do not scale with attributes.
#[must_use]
pub fn max_resource(template: &CombatantTemplate, kind: ResourceKind) -> u32 {
    template.resources.get(kind)
}

/// `floor((base + bonus) * multiplier)`.
#[must_use]
pub fn raw_damage(base_damage: i32, attribute_bonus: i32, multiplier: Fixed) -> i32 {
    scale_floor(base_damage.saturating_add(attribute_bonus), multiplier)
}

/// Scale a raw amount by a critical multiplier, flooring the result.
#[must_use]
pub fn critical_damage(raw: i32, crit_multiplier: Fixed) -> i32 {
    scale_floor(raw, crit_multiplier)
}

/// `max(min_damage, raw - mitigation)`.
#[must_use]
pub fn mitigated_damage(raw: i32, mitigation: i32, rules: &RuleSet) -> i32 {
    raw.saturating_sub(mitigation).max(rules.min_damage)
}

/// Hit chance in percent, clamped to the configured bounds.
#[must_use]
pub fn hit_chance(accuracy_mod: i32, evasion_mod: i32, rules: &RuleSet) -> Fixed {
    let chance = rules
        .hit_chance_base
        .saturating_add(Fixed::from_num(accuracy_mod).saturating_mul(rules.hit_chance_accuracy_factor))
        .saturating_sub(Fixed::from_num(evasion_mod).saturating_mul(rules.hit_chance_evasion_factor));
    chance.clamp(rules.hit_chance_min, rules.hit_chance_max)
}

/// `ceil(xp_base * xp_factor ^ (level - 1))`; level 0 is treated as level 1.
///
/// Thresholds past the fixed-point range saturate at `u32::MAX`.
#[must_use]
pub fn xp_to_next_level(level: u32, rules: &RuleSet) -> u32 {
    let mut threshold = rules.xp_level_base;
    for _ in 1..level.max(1) {
        let Some(next) = threshold.checked_mul(rules.xp_level_factor) else {
            return u32::MAX;
        };
        if next == threshold {
            break;
        }
        threshold = next;
    }
    ceil_u32(threshold).max(1)
}

/// `DEX * 2 + modifier`.
#[must_use]
pub const fn initiative(dexterity: i32, modifier: i32) -> i32 {
    dexterity
        .saturating_mul(INITIATIVE_PER_DEXTERITY)
        .saturating_add(modifier)
}
