//! Template data structures.
//!
//! Skill and combatant templates are immutable definitions shared by every
//! encounter through `Arc`. All structs deserialize from RON.
//!
//! **Note:** This module contains no file IO. Directory loading is handled
//! by `arena_headless`.

mod combatant_data;
mod library;
mod skill_data;

pub use combatant_data::{Attribute, Attributes, CombatantTemplate, ResourceKind, ResourcePools};
pub use library::{parse_template_set, TemplateLibrary, TemplateProvider, TemplateSet};
pub use skill_data::{
    DamageKind, EffectApplication, PowerSpec, ResourceCost, SkillTemplate, TagBonus, TargetMode,
};
