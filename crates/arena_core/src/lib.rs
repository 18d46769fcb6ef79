//! # Arena Core
//!
//! Deterministic turn-based combat engine.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No console or file IO outside explicit save/load helpers
//! - No ambient randomness (every roll comes from an injected [`rng::RandomSource`])
//! - Fixed-point arithmetic for every derived stat
//!
//! This separation enables:
//! - Seed-exact replays of whole encounters
//! - Headless batch runs and balance sweeps
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`data`] - Skill and combatant templates
//! - [`config`] - Tunable rule constants
//! - [`formulas`] - Pure combat formulas
//! - [`effects`] - Status effect registry
//! - [`combatant`] - Per-encounter combatant state
//! - [`resolution`] - Skill resolution engine
//! - [`encounter`] - Initiative and round scheduler
//! - [`ai`] - Strategy dispatch
//! - [`leveling`] - XP and level-ups
//! - [`report`] - Event log and final report

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ai;
pub mod combatant;
pub mod config;
pub mod data;
pub mod effects;
pub mod encounter;
pub mod error;
pub mod formulas;
pub mod leveling;
pub mod math;
pub mod report;
pub mod resolution;
pub mod rng;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::ai::{AiController, BattleView, Controller, Strategy, StrategyId};
    pub use crate::combatant::{CombatantId, CombatantSnapshot, CombatantState, Side};
    pub use crate::config::RuleSet;
    pub use crate::data::{
        Attribute, Attributes, CombatantTemplate, DamageKind, ResourceCost, ResourceKind,
        SkillTemplate, TargetMode, TemplateLibrary, TemplateProvider,
    };
    pub use crate::effects::EffectKind;
    pub use crate::encounter::{run_encounter, CombatantSpec, Encounter, Phase};
    pub use crate::error::{CombatError, Result};
    pub use crate::math::Fixed;
    pub use crate::report::{CombatEvent, EncounterReport, Outcome, RoundEvent};
    pub use crate::resolution::{Action, ActionOutcome, PassReason, ResolutionResult};
    pub use crate::rng::{RandomSource, SeededRandom};
}
