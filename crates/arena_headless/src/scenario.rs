//! Scenario loading and configuration.
//!
//! A scenario names the two sides of an encounter by template id and level,
//! the seed that drives every roll, and optional overrides for the round
//! cap and the XP reward.

use std::path::Path;

use arena_core::config::RuleSet;
use arena_core::data::TemplateProvider;
use arena_core::encounter::{CombatantSpec, Encounter};
use arena_core::error::CombatError;
use arena_core::report::EncounterReport;
use arena_core::rng::{RandomSource, SeededRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// The engine rejected the scenario.
    #[error("Invalid scenario: {0}")]
    Core(#[from] CombatError),
}

/// A complete scenario configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Side A, in roster order.
    pub side_a: Vec<CombatantSpec>,
    /// Side B, in roster order.
    pub side_b: Vec<CombatantSpec>,
    /// Default seed when none is given on the command line.
    #[serde(default)]
    pub seed: u64,
    /// Round cap override; `None` keeps the rule set's cap.
    #[serde(default)]
    pub max_rounds: Option<u32>,
    /// Fixed XP for the winners instead of the losers' rewards.
    #[serde(default)]
    pub xp_reward: Option<u32>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::duel()
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable or malformed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Parse a scenario from RON text.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::ParseError`] for malformed input.
    pub fn from_ron_str(text: &str) -> Result<Self, ScenarioError> {
        Ok(ron::from_str(text)?)
    }

    /// Serialize to pretty RON.
    ///
    /// # Errors
    ///
    /// Returns a RON error if serialization fails.
    pub fn to_ron_string(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Built-in one-on-one: Krieger against a level-1 goblin.
    #[must_use]
    pub fn duel() -> Self {
        Self {
            name: "Duel".to_string(),
            description: "Krieger against a single goblin".to_string(),
            side_a: vec![CombatantSpec::new("krieger")],
            side_b: vec![CombatantSpec::new("goblin_lv1")],
            seed: 42,
            max_rounds: None,
            xp_reward: None,
        }
    }

    /// Total combatants on both sides.
    #[must_use]
    pub fn combatant_count(&self) -> usize {
        self.side_a.len() + self.side_b.len()
    }

    /// `base` with this scenario's overrides applied.
    #[must_use]
    pub fn rules_for(&self, base: &RuleSet) -> RuleSet {
        let mut rules = base.clone();
        if let Some(cap) = self.max_rounds {
            rules.max_rounds = Some(cap);
        }
        rules
    }

    /// Build the encounter without running it.
    ///
    /// # Errors
    ///
    /// Returns the engine's error for unknown templates, empty sides or bad
    /// rules.
    pub fn build<R: RandomSource>(
        &self,
        provider: &dyn TemplateProvider,
        rules: &RuleSet,
        rng: R,
    ) -> Result<Encounter<R>, ScenarioError> {
        let encounter = Encounter::from_templates(
            provider,
            &self.side_a,
            &self.side_b,
            self.rules_for(rules),
            rng,
        )?;
        Ok(encounter.with_xp_reward(self.xp_reward))
    }

    /// Run the scenario to completion with AI on both sides.
    ///
    /// # Errors
    ///
    /// See [`Scenario::build`].
    pub fn resolve(
        &self,
        provider: &dyn TemplateProvider,
        rules: &RuleSet,
        seed: u64,
    ) -> Result<EncounterReport, ScenarioError> {
        let mut encounter = self.build(provider, rules, SeededRandom::new(seed))?;
        let mut ai = arena_core::ai::AiController;
        Ok(encounter.run(&mut ai)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::report::Outcome;
    use arena_test_utils::fixtures::{standard_library, standard_rules};

    const AMBUSH: &str = r#"(
        name: "Ambush",
        side_a: [(template_id: "krieger", level: 2)],
        side_b: [(template_id: "goblin_lv1"), (template_id: "goblin_lv1")],
        seed: 9,
        max_rounds: Some(12),
    )"#;

    #[test]
    fn test_parse_with_defaults() {
        let scenario = Scenario::from_ron_str(AMBUSH).unwrap();
        assert_eq!(scenario.name, "Ambush");
        assert!(scenario.description.is_empty());
        assert_eq!(scenario.side_a[0].level, 2);
        assert_eq!(scenario.side_b[1].level, 1);
        assert_eq!(scenario.xp_reward, None);
        assert_eq!(scenario.combatant_count(), 3);
    }

    #[test]
    fn test_round_cap_override() {
        let scenario = Scenario::from_ron_str(AMBUSH).unwrap();
        let rules = scenario.rules_for(&standard_rules());
        assert_eq!(rules.max_rounds, Some(12));

        let duel = Scenario::duel();
        assert_eq!(duel.rules_for(&standard_rules()), standard_rules());
    }

    #[test]
    fn test_ron_round_trip() {
        let duel = Scenario::duel();
        let text = duel.to_ron_string().unwrap();
        assert_eq!(Scenario::from_ron_str(&text).unwrap(), duel);
    }

    #[test]
    fn test_missing_file() {
        let err = Scenario::load("/no/such/scenario.ron").unwrap_err();
        assert!(matches!(err, ScenarioError::FileNotFound(_)));
    }

    #[test]
    fn test_unknown_template_is_rejected() {
        let mut scenario = Scenario::duel();
        scenario.side_b = vec![CombatantSpec::new("dragon")];
        let err = scenario
            .resolve(&standard_library(), &standard_rules(), 1)
            .unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::Core(CombatError::CombatantNotFound(_))
        ));
    }

    #[test]
    fn test_duel_resolves() {
        let report = Scenario::duel()
            .resolve(&standard_library(), &standard_rules(), 42)
            .unwrap();
        assert_ne!(report.outcome, Outcome::Draw);
        assert!(report.rounds_played() >= 1);
    }
}
