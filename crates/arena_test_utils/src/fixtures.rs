//! Test fixtures and helpers.
//!
//! The shipped template and rule files are embedded at compile time so every
//! test exercises the same data the CLI loads from disk.

use arena_core::combatant::CombatantId;
use arena_core::config::RuleSet;
use arena_core::data::{parse_template_set, TemplateLibrary};
use arena_core::encounter::{CombatantSpec, Encounter};
use arena_core::math::Fixed;
use arena_core::rng::RandomSource;

/// Shipped skill definitions.
pub const SKILLS_RON: &str = include_str!("../../../assets/data/templates/skills.ron");
/// Shipped hero definitions.
pub const HEROES_RON: &str = include_str!("../../../assets/data/templates/heroes.ron");
/// Shipped monster definitions.
pub const MONSTERS_RON: &str = include_str!("../../../assets/data/templates/monsters.ron");
/// Shipped rule constants.
pub const RULES_RON: &str = include_str!("../../../assets/data/rules.ron");

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> Fixed {
    Fixed::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
#[must_use]
pub fn fixed_f(n: f64) -> Fixed {
    Fixed::from_num(n)
}

/// Library holding every shipped template.
///
/// # Panics
///
/// Panics if the embedded data does not parse or validate.
#[must_use]
pub fn standard_library() -> TemplateLibrary {
    let mut library = TemplateLibrary::new();
    for (label, text) in [
        ("skills.ron", SKILLS_RON),
        ("heroes.ron", HEROES_RON),
        ("monsters.ron", MONSTERS_RON),
    ] {
        let set = parse_template_set(label, text)
            .unwrap_or_else(|e| panic!("embedded {label} is invalid: {e}"));
        library
            .extend(set)
            .unwrap_or_else(|e| panic!("embedded {label} is invalid: {e}"));
    }
    library
        .check_references()
        .unwrap_or_else(|e| panic!("embedded templates are inconsistent: {e}"));
    library
}

/// Rules parsed from the shipped `rules.ron`.
///
/// # Panics
///
/// Panics if the embedded rules do not parse or validate.
#[must_use]
pub fn standard_rules() -> RuleSet {
    RuleSet::from_ron_str("rules.ron", RULES_RON)
        .unwrap_or_else(|e| panic!("embedded rules.ron is invalid: {e}"))
}

/// Krieger (id 0) against a single level-1 goblin (id 1).
///
/// # Panics
///
/// Panics if the shipped templates are missing either combatant.
#[must_use]
pub fn krieger_vs_goblin<R: RandomSource>(rng: R) -> Encounter<R> {
    Encounter::from_templates(
        &standard_library(),
        &[CombatantSpec::new("krieger")],
        &[CombatantSpec::new("goblin_lv1")],
        standard_rules(),
        rng,
    )
    .unwrap_or_else(|e| panic!("krieger vs goblin fixture failed: {e}"))
}

/// Id of the Krieger in [`krieger_vs_goblin`].
pub const KRIEGER: CombatantId = CombatantId(0);
/// Id of the goblin in [`krieger_vs_goblin`].
pub const GOBLIN: CombatantId = CombatantId(1);

/// Party of four against the mixed goblin band.
#[must_use]
pub fn party_roster() -> (Vec<CombatantSpec>, Vec<CombatantSpec>) {
    let party = ["krieger", "magier", "schurke", "kleriker"]
        .into_iter()
        .map(CombatantSpec::new)
        .collect();
    let band = [
        "goblin_krieger_lv2",
        "goblin_krieger_lv2",
        "goblin_archer_lv2",
        "goblin_shaman_lv3",
    ]
    .into_iter()
    .map(CombatantSpec::new)
    .collect();
    (party, band)
}

/// A random source that replays a fixed list of rolls.
///
/// Once the script runs out every further roll returns the fallback
/// value (0.0 unless changed).
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    rolls: Vec<f64>,
    cursor: usize,
    fallback: f64,
}

impl ScriptedRandom {
    /// Replay `rolls` in order.
    #[must_use]
    pub fn new(rolls: impl Into<Vec<f64>>) -> Self {
        Self {
            rolls: rolls.into(),
            cursor: 0,
            fallback: 0.0,
        }
    }

    /// Return `value` for every roll.
    #[must_use]
    pub fn constant(value: f64) -> Self {
        Self::new(Vec::new()).with_fallback(value)
    }

    /// Value returned after the script is exhausted.
    #[must_use]
    pub fn with_fallback(mut self, value: f64) -> Self {
        self.fallback = value;
        self
    }

    /// Number of rolls drawn so far.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.cursor
    }

    /// Whether every scripted roll has been drawn.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.rolls.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn next_float(&mut self) -> f64 {
        let value = self.rolls.get(self.cursor).copied().unwrap_or(self.fallback);
        self.cursor += 1;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::data::TemplateProvider;

    #[test]
    fn test_shipped_data_loads() {
        let library = standard_library();
        assert!(library.skill_count() >= 10);
        assert!(library.combatant("krieger").is_ok());
        assert!(library.combatant("goblin_lv1").is_ok());
        assert_eq!(standard_rules(), RuleSet::standard());
    }

    #[test]
    fn test_krieger_fixture_matches_reference_stats() {
        let library = standard_library();
        let krieger = library.combatant("krieger").unwrap();
        assert_eq!(krieger.attributes.strength, 14);
        assert_eq!(krieger.attributes.dexterity, 10);
        assert_eq!(krieger.attributes.constitution, 12);
        assert_eq!(krieger.resources.stamina, 100);
        assert_eq!(krieger.armor, 5);

        let goblin = library.combatant("goblin_lv1").unwrap();
        assert_eq!(goblin.armor, 2);
        assert_eq!(goblin.skills, vec!["basic_strike_phys".to_string()]);
    }

    #[test]
    fn test_scripted_random_replays_then_falls_back() {
        let mut rng = ScriptedRandom::new([0.25, 0.75]).with_fallback(0.5);
        assert!((rng.next_float() - 0.25).abs() < f64::EPSILON);
        assert!((rng.next_float() - 0.75).abs() < f64::EPSILON);
        assert!(rng.is_exhausted());
        assert!((rng.next_float() - 0.5).abs() < f64::EPSILON);
        assert_eq!(rng.consumed(), 3);
    }
}
