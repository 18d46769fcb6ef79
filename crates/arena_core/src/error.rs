//! Error types for the combat engine.

use thiserror::Error;

use crate::data::ResourceKind;

/// Result type alias using [`CombatError`].
pub type Result<T> = std::result::Result<T, CombatError>;

/// Top-level error type for all combat engine errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatError {
    /// A required rule constant is absent from the configuration map.
    #[error("Missing configuration key: {0}")]
    MissingConfigKey(String),

    /// A rule constant is present but outside its valid range.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidConfigValue {
        /// Configuration key.
        key: String,
        /// Why the value was rejected.
        message: String,
    },

    /// Unknown combatant template id.
    #[error("Combatant template not found: {0}")]
    CombatantNotFound(String),

    /// Unknown skill template id.
    #[error("Skill template not found: {0}")]
    SkillNotFound(String),

    /// Not enough of a resource to pay a skill cost.
    #[error("Insufficient {resource}: need {required}, have {available}")]
    InsufficientResources {
        /// Resource pool that was checked.
        resource: ResourceKind,
        /// Amount required.
        required: u32,
        /// Amount available.
        available: u32,
    },

    /// The selected target is dead, absent, or on the wrong side.
    #[error("Invalid target {target} for skill '{skill}'")]
    InvalidTarget {
        /// Skill being resolved.
        skill: String,
        /// Combatant id that was rejected.
        target: u32,
    },

    /// Template data violates a structural invariant.
    #[error("Invalid template '{id}': {message}")]
    InvalidTemplate {
        /// Template id.
        id: String,
        /// Violated invariant.
        message: String,
    },

    /// Encounter cannot be constructed from the given rosters.
    #[error("Invalid encounter: {0}")]
    InvalidEncounter(String),

    /// Data document parsing error.
    #[error("Failed to parse data '{path}': {message}")]
    DataParseError {
        /// Source of the document (file path or label).
        path: String,
        /// Error message.
        message: String,
    },

    /// Invalid engine or report state.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl CombatError {
    /// Whether this error aborts the operation that raised it.
    ///
    /// Resource shortfalls and bad targets are recovered inside an encounter
    /// and surface as turn outcomes instead.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::InsufficientResources { .. } | Self::InvalidTarget { .. }
        )
    }
}
