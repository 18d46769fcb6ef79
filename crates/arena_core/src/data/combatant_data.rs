//! Combatant template data structures.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ai::StrategyId;
use crate::error::{CombatError, Result};

/// One of the five primary attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Attribute {
    /// Strength.
    Str,
    /// Dexterity.
    Dex,
    /// Intelligence.
    Int,
    /// Constitution.
    Con,
    /// Wisdom.
    Wis,
}

impl Attribute {
    /// All attributes in canonical order.
    pub const ALL: [Self; 5] = [Self::Str, Self::Dex, Self::Int, Self::Con, Self::Wis];
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Str => "STR",
            Self::Dex => "DEX",
            Self::Int => "INT",
            Self::Con => "CON",
            Self::Wis => "WIS",
        };
        f.write_str(name)
    }
}

/// Primary attribute block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attributes {
    /// Strength: physical damage bonus.
    #[serde(rename = "str")]
    pub strength: i32,
    /// Dexterity: accuracy, evasion and initiative.
    #[serde(rename = "dex")]
    pub dexterity: i32,
    /// Intelligence: spell damage bonus.
    #[serde(rename = "int")]
    pub intelligence: i32,
    /// Constitution: bonus HP.
    #[serde(rename = "con")]
    pub constitution: i32,
    /// Wisdom: healing bonus.
    #[serde(rename = "wis")]
    pub wisdom: i32,
}

impl Attributes {
    /// Create an attribute block.
    #[must_use]
    pub const fn new(
        strength: i32,
        dexterity: i32,
        intelligence: i32,
        constitution: i32,
        wisdom: i32,
    ) -> Self {
        Self {
            strength,
            dexterity,
            intelligence,
            constitution,
            wisdom,
        }
    }

    /// Value of one attribute.
    #[must_use]
    pub const fn get(&self, attribute: Attribute) -> i32 {
        match attribute {
            Attribute::Str => self.strength,
            Attribute::Dex => self.dexterity,
            Attribute::Int => self.intelligence,
            Attribute::Con => self.constitution,
            Attribute::Wis => self.wisdom,
        }
    }
}

impl Default for Attributes {
    fn default() -> Self {
        Self::new(10, 10, 10, 10, 10)
    }
}

/// Consumable resource kinds gating skill use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Spellcasters.
    Mana,
    /// Fighters.
    Stamina,
    /// Rogues.
    Energy,
}

impl ResourceKind {
    /// All resource kinds in canonical order.
    pub const ALL: [Self; 3] = [Self::Mana, Self::Stamina, Self::Energy];
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mana => "mana",
            Self::Stamina => "stamina",
            Self::Energy => "energy",
        };
        f.write_str(name)
    }
}

/// Base resource pools. A zero pool means the combatant lacks that resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ResourcePools {
    /// Maximum mana.
    pub mana: u32,
    /// Maximum stamina.
    pub stamina: u32,
    /// Maximum energy.
    pub energy: u32,
}

impl ResourcePools {
    /// Pool size for one kind.
    #[must_use]
    pub const fn get(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Mana => self.mana,
            ResourceKind::Stamina => self.stamina,
            ResourceKind::Energy => self.energy,
        }
    }

    /// The largest non-zero pool, by convention the class's main resource.
    #[must_use]
    pub fn primary(&self) -> Option<ResourceKind> {
        ResourceKind::ALL
            .into_iter()
            .filter(|kind| self.get(*kind) > 0)
            .max_by_key(|kind| self.get(*kind))
    }
}

/// Immutable combatant definition.
///
/// # Example RON
///
/// ```ron
/// CombatantTemplate(
///     id: "goblin_lv1",
///     name: "Goblin",
///     attributes: (str: 8, dex: 12, int: 6, con: 9, wis: 6),
///     base_hp: 10,
///     resources: (stamina: 50),
///     armor: 2,
///     skills: ["basic_strike_phys"],
///     ai_strategy: Some(BasicMelee),
///     xp_reward: Some(50),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantTemplate {
    /// Unique string identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Primary attributes.
    #[serde(default)]
    pub attributes: Attributes,
    /// HP before the constitution bonus.
    #[serde(default)]
    pub base_hp: u32,
    /// Maximum resource pools.
    #[serde(default)]
    pub resources: ResourcePools,
    /// Flat physical mitigation.
    #[serde(default)]
    pub armor: i32,
    /// Flat non-physical mitigation.
    #[serde(default)]
    pub magic_resist: i32,
    /// Free-form labels (`UNDEAD`, `CASTER`, ...).
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Known skill ids, in preference order.
    pub skills: Vec<String>,
    /// Decision policy for AI-controlled combatants.
    #[serde(default)]
    pub ai_strategy: Option<StrategyId>,
    /// XP granted to the winners when this combatant is defeated.
    #[serde(default)]
    pub xp_reward: Option<u32>,
}

impl CombatantTemplate {
    /// Check structural invariants.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::InvalidTemplate`] for non-positive attributes,
    /// an empty skill list, or a template that would start with zero HP.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| CombatError::InvalidTemplate {
            id: self.id.clone(),
            message,
        };

        if self.id.trim().is_empty() {
            return Err(invalid("combatant id is empty".to_string()));
        }
        for attribute in Attribute::ALL {
            let value = self.attributes.get(attribute);
            if value <= 0 {
                return Err(invalid(format!("{attribute} must be positive, got {value}")));
            }
        }
        if self.skills.is_empty() {
            return Err(invalid("combatant knows no skills".to_string()));
        }
        if crate::formulas::max_hp(self) == 0 {
            return Err(invalid("maximum HP is zero".to_string()));
        }
        Ok(())
    }

    /// Case-insensitive tag check.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_goblin_from_ron() {
        let ron = r#"
            CombatantTemplate(
                id: "goblin_lv1",
                name: "Goblin",
                attributes: (str: 8, dex: 12, int: 6, con: 9, wis: 6),
                base_hp: 10,
                resources: (stamina: 50),
                armor: 2,
                tags: ["GOBLINOID"],
                skills: ["basic_strike_phys"],
                ai_strategy: Some(BasicMelee),
                xp_reward: Some(50),
            )
        "#;
        let goblin: CombatantTemplate = ron::from_str(ron).unwrap();
        assert_eq!(goblin.attributes.get(Attribute::Dex), 12);
        assert_eq!(goblin.resources.get(ResourceKind::Stamina), 50);
        assert_eq!(goblin.resources.get(ResourceKind::Mana), 0);
        assert_eq!(goblin.magic_resist, 0);
        assert_eq!(goblin.ai_strategy, Some(StrategyId::BasicMelee));
        assert!(goblin.has_tag("goblinoid"));
        assert!(goblin.validate().is_ok());
    }

    #[test]
    fn test_primary_resource() {
        let pools = ResourcePools {
            mana: 120,
            stamina: 20,
            energy: 0,
        };
        assert_eq!(pools.primary(), Some(ResourceKind::Mana));
        assert_eq!(ResourcePools::default().primary(), None);
    }

    #[test]
    fn test_validate_rejects_bad_templates() {
        let mut template = CombatantTemplate {
            id: "broken".to_string(),
            name: "Broken".to_string(),
            attributes: Attributes::default(),
            base_hp: 10,
            resources: ResourcePools::default(),
            armor: 0,
            magic_resist: 0,
            tags: BTreeSet::new(),
            skills: Vec::new(),
            ai_strategy: None,
            xp_reward: None,
        };
        assert!(template.validate().is_err());

        template.skills.push("basic_strike_phys".to_string());
        assert!(template.validate().is_ok());

        template.attributes.constitution = 0;
        assert!(template.validate().is_err());
    }
}
