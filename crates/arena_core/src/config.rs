//! Rule constants injected into the engine.
//!
//! Rules arrive as a flat `key -> number` map so any config source can feed
//! them. Every required key must be present; nothing is silently defaulted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CombatError, Result};
use crate::math::{fixed_serde, Fixed};

/// Keys that must appear in every rule map.
pub const REQUIRED_KEYS: [&str; 11] = [
    "min_damage",
    "base_weapon_damage",
    "hit_chance_base",
    "hit_chance_accuracy_factor",
    "hit_chance_evasion_factor",
    "hit_chance_min",
    "hit_chance_max",
    "xp_level_base",
    "xp_level_factor",
    "resource_regen_percent",
    "ai_heal_threshold",
];

/// Optional round cap key.
pub const MAX_ROUNDS_KEY: &str = "max_rounds";

/// Validated rule constants.
///
/// Hit chance values are percentages; `ai_heal_threshold` is an HP ratio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Floor applied to mitigated damage.
    pub min_damage: i32,
    /// Base amount for skills without their own `base_amount`.
    pub base_weapon_damage: i32,
    /// Hit chance before modifiers, in percent.
    #[serde(with = "fixed_serde")]
    pub hit_chance_base: Fixed,
    /// Percent gained per point of accuracy modifier.
    #[serde(with = "fixed_serde")]
    pub hit_chance_accuracy_factor: Fixed,
    /// Percent lost per point of target evasion modifier.
    #[serde(with = "fixed_serde")]
    pub hit_chance_evasion_factor: Fixed,
    /// Lower clamp of the hit chance, in percent.
    #[serde(with = "fixed_serde")]
    pub hit_chance_min: Fixed,
    /// Upper clamp of the hit chance, in percent.
    #[serde(with = "fixed_serde")]
    pub hit_chance_max: Fixed,
    /// XP needed to go from level 1 to level 2.
    #[serde(with = "fixed_serde")]
    pub xp_level_base: Fixed,
    /// Growth factor of the XP curve per level.
    #[serde(with = "fixed_serde")]
    pub xp_level_factor: Fixed,
    /// Share of each pool restored at round end, in percent.
    #[serde(with = "fixed_serde")]
    pub resource_regen_percent: Fixed,
    /// Ally HP ratio below which support casters heal.
    #[serde(with = "fixed_serde")]
    pub ai_heal_threshold: Fixed,
    /// Configured round cap; reaching it ends the encounter in a draw.
    #[serde(default)]
    pub max_rounds: Option<u32>,
}

impl RuleSet {
    /// Hard ceiling applied when no `max_rounds` is configured.
    pub const ROUND_CEILING: u32 = 10_000;

    /// The rule values shipped in `assets/data/rules.ron`.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            min_damage: 1,
            base_weapon_damage: 5,
            hit_chance_base: Fixed::from_num(90),
            hit_chance_accuracy_factor: Fixed::from_num(3),
            hit_chance_evasion_factor: Fixed::from_num(2),
            hit_chance_min: Fixed::from_num(5),
            hit_chance_max: Fixed::from_num(95),
            xp_level_base: Fixed::from_num(100),
            xp_level_factor: Fixed::from_num(1.5),
            resource_regen_percent: Fixed::from_num(5),
            ai_heal_threshold: Fixed::from_num(0.5),
            max_rounds: Some(100),
        }
    }

    /// Build and validate rules from a flat map.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::MissingConfigKey`] for the first absent required
    /// key and [`CombatError::InvalidConfigValue`] for values out of range.
    pub fn from_map(map: &BTreeMap<String, f64>) -> Result<Self> {
        let reader = MapReader { map };

        let max_rounds = match map.get(MAX_ROUNDS_KEY) {
            Some(_) => Some(reader.non_negative_int(MAX_ROUNDS_KEY)?),
            None => None,
        };

        let rules = Self {
            min_damage: reader.int(REQUIRED_KEYS[0])?,
            base_weapon_damage: reader.int(REQUIRED_KEYS[1])?,
            hit_chance_base: reader.fixed(REQUIRED_KEYS[2])?,
            hit_chance_accuracy_factor: reader.fixed(REQUIRED_KEYS[3])?,
            hit_chance_evasion_factor: reader.fixed(REQUIRED_KEYS[4])?,
            hit_chance_min: reader.fixed(REQUIRED_KEYS[5])?,
            hit_chance_max: reader.fixed(REQUIRED_KEYS[6])?,
            xp_level_base: reader.fixed(REQUIRED_KEYS[7])?,
            xp_level_factor: reader.fixed(REQUIRED_KEYS[8])?,
            resource_regen_percent: reader.fixed(REQUIRED_KEYS[9])?,
            ai_heal_threshold: reader.fixed(REQUIRED_KEYS[10])?,
            max_rounds,
        };
        rules.validate()?;
        Ok(rules)
    }

    /// Parse a RON map (`{"min_damage": 1, ...}`) and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::DataParseError`] for malformed RON, otherwise
    /// the errors of [`Self::from_map`].
    pub fn from_ron_str(label: &str, text: &str) -> Result<Self> {
        let map: BTreeMap<String, f64> =
            ron::from_str(text).map_err(|e| CombatError::DataParseError {
                path: label.to_string(),
                message: e.to_string(),
            })?;
        Self::from_map(&map)
    }

    /// Flatten back into the map form.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        let mut map = BTreeMap::new();
        let mut put = |key: &str, value: f64| {
            map.insert(key.to_string(), value);
        };
        put("min_damage", f64::from(self.min_damage));
        put("base_weapon_damage", f64::from(self.base_weapon_damage));
        put("hit_chance_base", self.hit_chance_base.to_num());
        put(
            "hit_chance_accuracy_factor",
            self.hit_chance_accuracy_factor.to_num(),
        );
        put(
            "hit_chance_evasion_factor",
            self.hit_chance_evasion_factor.to_num(),
        );
        put("hit_chance_min", self.hit_chance_min.to_num());
        put("hit_chance_max", self.hit_chance_max.to_num());
        put("xp_level_base", self.xp_level_base.to_num());
        put("xp_level_factor", self.xp_level_factor.to_num());
        put("resource_regen_percent", self.resource_regen_percent.to_num());
        put("ai_heal_threshold", self.ai_heal_threshold.to_num());
        if let Some(max_rounds) = self.max_rounds {
            put(MAX_ROUNDS_KEY, f64::from(max_rounds));
        }
        map
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::InvalidConfigValue`] naming the offending key.
    pub fn validate(&self) -> Result<()> {
        let hundred = Fixed::from_num(100);
        let percent = |key: &str, value: Fixed| {
            if value < Fixed::ZERO || value > hundred {
                Err(invalid(key, format!("{value} is outside 0..=100")))
            } else {
                Ok(())
            }
        };

        if self.min_damage < 0 {
            return Err(invalid("min_damage", "must not be negative"));
        }
        if self.base_weapon_damage < 0 {
            return Err(invalid("base_weapon_damage", "must not be negative"));
        }
        percent("hit_chance_base", self.hit_chance_base)?;
        percent("hit_chance_min", self.hit_chance_min)?;
        percent("hit_chance_max", self.hit_chance_max)?;
        if self.hit_chance_min > self.hit_chance_max {
            return Err(invalid(
                "hit_chance_min",
                format!(
                    "{} exceeds hit_chance_max {}",
                    self.hit_chance_min, self.hit_chance_max
                ),
            ));
        }
        if self.hit_chance_accuracy_factor < Fixed::ZERO {
            return Err(invalid("hit_chance_accuracy_factor", "must not be negative"));
        }
        if self.hit_chance_evasion_factor < Fixed::ZERO {
            return Err(invalid("hit_chance_evasion_factor", "must not be negative"));
        }
        if self.xp_level_base <= Fixed::ZERO {
            return Err(invalid("xp_level_base", "must be positive"));
        }
        if self.xp_level_factor < Fixed::ONE {
            return Err(invalid("xp_level_factor", "must be at least 1"));
        }
        percent("resource_regen_percent", self.resource_regen_percent)?;
        if self.ai_heal_threshold < Fixed::ZERO || self.ai_heal_threshold > Fixed::ONE {
            return Err(invalid("ai_heal_threshold", "must be within 0..=1"));
        }
        if self.max_rounds == Some(0) {
            return Err(invalid(MAX_ROUNDS_KEY, "must be at least 1"));
        }
        Ok(())
    }

    /// Round cap in effect: the configured one, else [`Self::ROUND_CEILING`].
    #[must_use]
    pub fn round_limit(&self) -> u32 {
        self.max_rounds
            .map_or(Self::ROUND_CEILING, |cap| cap.min(Self::ROUND_CEILING))
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

fn invalid(key: &str, message: impl Into<String>) -> CombatError {
    CombatError::InvalidConfigValue {
        key: key.to_string(),
        message: message.into(),
    }
}

struct MapReader<'a> {
    map: &'a BTreeMap<String, f64>,
}

impl MapReader<'_> {
    fn raw(&self, key: &str) -> Result<f64> {
        let value = *self
            .map
            .get(key)
            .ok_or_else(|| CombatError::MissingConfigKey(key.to_string()))?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(invalid(key, format!("{value} is not a finite number")))
        }
    }

    fn fixed(&self, key: &str) -> Result<Fixed> {
        let value = self.raw(key)?;
        Fixed::checked_from_num(value).ok_or_else(|| invalid(key, format!("{value} is out of range")))
    }

    fn int(&self, key: &str) -> Result<i32> {
        let value = self.raw(key)?;
        if value.fract() != 0.0 || value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
            return Err(invalid(key, format!("{value} is not an integer")));
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok(value as i32)
    }

    fn non_negative_int(&self, key: &str) -> Result<u32> {
        let value = self.int(key)?;
        u32::try_from(value).map_err(|_| invalid(key, "must not be negative"))
    }
}
