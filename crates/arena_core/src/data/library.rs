//! In-memory template storage.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{CombatantTemplate, SkillTemplate};
use crate::error::{CombatError, Result};

/// Read-only lookup of shared templates.
///
/// Implemented by [`TemplateLibrary`]; adapters backed by other stores can
/// implement it as well. Templates are never mutated once handed out.
pub trait TemplateProvider {
    /// Look up a combatant template.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::CombatantNotFound`] for an unknown id.
    fn combatant(&self, id: &str) -> Result<Arc<CombatantTemplate>>;

    /// Look up a skill template.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::SkillNotFound`] for an unknown id.
    fn skill(&self, id: &str) -> Result<Arc<SkillTemplate>>;
}

/// A document holding any mix of skill and combatant templates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSet {
    /// Skill definitions.
    pub skills: Vec<SkillTemplate>,
    /// Combatant definitions.
    pub combatants: Vec<CombatantTemplate>,
}

/// Validated templates keyed by id.
#[derive(Debug, Clone, Default)]
pub struct TemplateLibrary {
    skills: BTreeMap<String, Arc<SkillTemplate>>,
    combatants: BTreeMap<String, Arc<CombatantTemplate>>,
}

impl TemplateLibrary {
    /// Create an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a single RON [`TemplateSet`] and check its skill references.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::DataParseError`] for malformed RON and any
    /// validation error raised by [`Self::extend`] or
    /// [`Self::check_references`].
    pub fn from_ron_str(label: &str, text: &str) -> Result<Self> {
        let set = parse_template_set(label, text)?;
        let mut library = Self::new();
        library.extend(set)?;
        library.check_references()?;
        Ok(library)
    }

    /// Validate and add a skill, replacing any skill with the same id.
    ///
    /// # Errors
    ///
    /// Returns the template's validation error.
    pub fn insert_skill(&mut self, skill: SkillTemplate) -> Result<()> {
        skill.validate()?;
        if self.skills.contains_key(&skill.id) {
            tracing::warn!(id = %skill.id, "Replacing existing skill template");
        }
        self.skills.insert(skill.id.clone(), Arc::new(skill));
        Ok(())
    }

    /// Validate and add a combatant, replacing any combatant with the same id.
    ///
    /// Skill references are not checked here because skills may be loaded
    /// after combatants; call [`Self::check_references`] once loading is done.
    ///
    /// # Errors
    ///
    /// Returns the template's validation error.
    pub fn insert_combatant(&mut self, combatant: CombatantTemplate) -> Result<()> {
        combatant.validate()?;
        if self.combatants.contains_key(&combatant.id) {
            tracing::warn!(id = %combatant.id, "Replacing existing combatant template");
        }
        self.combatants
            .insert(combatant.id.clone(), Arc::new(combatant));
        Ok(())
    }

    /// Add every template of a set.
    ///
    /// # Errors
    ///
    /// Stops at the first invalid template.
    pub fn extend(&mut self, set: TemplateSet) -> Result<()> {
        for skill in set.skills {
            self.insert_skill(skill)?;
        }
        for combatant in set.combatants {
            self.insert_combatant(combatant)?;
        }
        Ok(())
    }

    /// Ensure every skill a combatant knows exists in the library.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::InvalidTemplate`] naming the first dangling
    /// reference.
    pub fn check_references(&self) -> Result<()> {
        for combatant in self.combatants.values() {
            if let Some(missing) = combatant
                .skills
                .iter()
                .find(|id| !self.skills.contains_key(id.as_str()))
            {
                return Err(CombatError::InvalidTemplate {
                    id: combatant.id.clone(),
                    message: format!("references unknown skill '{missing}'"),
                });
            }
        }
        Ok(())
    }

    /// Known skill ids in sorted order.
    pub fn skill_ids(&self) -> impl Iterator<Item = &str> {
        self.skills.keys().map(String::as_str)
    }

    /// Known combatant ids in sorted order.
    pub fn combatant_ids(&self) -> impl Iterator<Item = &str> {
        self.combatants.keys().map(String::as_str)
    }

    /// Number of skill templates.
    #[must_use]
    pub fn skill_count(&self) -> usize {
        self.skills.len()
    }

    /// Number of combatant templates.
    #[must_use]
    pub fn combatant_count(&self) -> usize {
        self.combatants.len()
    }
}

impl TemplateProvider for TemplateLibrary {
    fn combatant(&self, id: &str) -> Result<Arc<CombatantTemplate>> {
        self.combatants
            .get(id)
            .cloned()
            .ok_or_else(|| CombatError::CombatantNotFound(id.to_string()))
    }

    fn skill(&self, id: &str) -> Result<Arc<SkillTemplate>> {
        self.skills
            .get(id)
            .cloned()
            .ok_or_else(|| CombatError::SkillNotFound(id.to_string()))
    }
}

/// Parse a RON [`TemplateSet`] without validating it.
///
/// # Errors
///
/// Returns [`CombatError::DataParseError`] labelled with `label`.
pub fn parse_template_set(label: &str, text: &str) -> Result<TemplateSet> {
    ron::from_str(text).map_err(|e| CombatError::DataParseError {
        path: label.to_string(),
        message: e.to_string(),
    })
}
