//! Encounter event log and final report.
//!
//! The report is everything a presentation layer needs to render a combat
//! log without re-deriving engine internals. Two runs with the same seed,
//! templates and rules produce byte-identical [`EncounterReport::to_bytes`].

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::combatant::{CombatantId, CombatantSnapshot, Side};
use crate::effects::EffectKind;
use crate::error::{CombatError, Result};
use crate::leveling::XpAward;
use crate::resolution::ResolutionResult;

/// Report format version for compatibility.
pub const REPORT_VERSION: u32 = 1;

/// How an encounter ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Side B has no living combatants.
    WinA,
    /// Side A has no living combatants.
    WinB,
    /// Round cap reached with both sides standing.
    Draw,
}

impl Outcome {
    /// Winning side, if any.
    #[must_use]
    pub const fn winner(self) -> Option<Side> {
        match self {
            Self::WinA => Some(Side::A),
            Self::WinB => Some(Side::B),
            Self::Draw => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WinA => f.write_str("WIN_A"),
            Self::WinB => f.write_str("WIN_B"),
            Self::Draw => f.write_str("DRAW"),
        }
    }
}

/// One entry in a round's event stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// A combatant acted (or passed).
    Turn(ResolutionResult),
    /// A combatant's turn was suppressed by an effect.
    Skipped {
        /// Skipped combatant.
        combatant: CombatantId,
        /// Effect responsible.
        effect: EffectKind,
    },
    /// An invalid primary target was replaced before resolution.
    Retargeted {
        /// Acting combatant.
        actor: CombatantId,
        /// Skill being used.
        skill_id: String,
        /// Rejected target.
        from: CombatantId,
        /// Replacement target.
        to: CombatantId,
    },
    /// A periodic effect fired.
    EffectTick {
        /// Bearer.
        combatant: CombatantId,
        /// Effect kind.
        effect: EffectKind,
        /// HP removed.
        hp_lost: u32,
        /// Whether the tick defeated the bearer.
        defeated: bool,
    },
    /// An effect ran out at round end.
    EffectExpired {
        /// Former bearer.
        combatant: CombatantId,
        /// Effect kind.
        effect: EffectKind,
    },
}

/// Everything that happened in one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundEvent {
    /// Round number, starting at 1.
    pub round: u32,
    /// Turn order computed at round start.
    pub turn_order: Vec<CombatantId>,
    /// Events in the order they happened.
    pub events: Vec<CombatEvent>,
}

impl RoundEvent {
    /// Empty event list for a new round.
    #[must_use]
    pub const fn new(round: u32, turn_order: Vec<CombatantId>) -> Self {
        Self {
            round,
            turn_order,
            events: Vec::new(),
        }
    }

    /// Turn results of this round.
    pub fn turns(&self) -> impl Iterator<Item = &ResolutionResult> {
        self.events.iter().filter_map(|event| match event {
            CombatEvent::Turn(result) => Some(result),
            _ => None,
        })
    }
}

/// Complete result of one encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterReport {
    /// Report format version.
    pub version: u32,
    /// Per-round event log.
    pub rounds: Vec<RoundEvent>,
    /// Final outcome.
    pub outcome: Outcome,
    /// Living side-A combatants at the end, after XP awards.
    pub survivors_a: Vec<CombatantSnapshot>,
    /// Living side-B combatants at the end, after XP awards.
    pub survivors_b: Vec<CombatantSnapshot>,
    /// XP granted to the winners.
    pub leveling: Vec<XpAward>,
}

impl EncounterReport {
    /// Number of rounds in the log (the last one may be partial).
    #[must_use]
    pub fn rounds_played(&self) -> u32 {
        self.rounds.last().map_or(0, |r| r.round)
    }

    /// Survivors of one side.
    #[must_use]
    pub fn survivors(&self, side: Side) -> &[CombatantSnapshot] {
        match side {
            Side::A => &self.survivors_a,
            Side::B => &self.survivors_b,
        }
    }

    /// Every turn result in order.
    pub fn turns(&self) -> impl Iterator<Item = &ResolutionResult> {
        self.rounds.iter().flat_map(RoundEvent::turns)
    }

    /// Canonical binary encoding.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::InvalidState`] if serialization fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| CombatError::InvalidState(format!("Failed to serialize report: {e}")))
    }

    /// Decode from [`Self::to_bytes`] output.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::InvalidState`] for undecodable bytes or a
    /// version mismatch.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let report: Self = bincode::deserialize(bytes)
            .map_err(|e| CombatError::InvalidState(format!("Failed to deserialize report: {e}")))?;
        if report.version != REPORT_VERSION {
            return Err(CombatError::InvalidState(format!(
                "Report version mismatch: expected {}, got {}",
                REPORT_VERSION, report.version
            )));
        }
        Ok(report)
    }

    /// Hash of the canonical encoding, for quick determinism comparisons.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::InvalidState`] if serialization fails.
    pub fn state_hash(&self) -> Result<u64> {
        let mut hasher = DefaultHasher::new();
        self.to_bytes()?.hash(&mut hasher);
        Ok(hasher.finish())
    }

    /// Save to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path.as_ref(), bytes)
            .map_err(|e| CombatError::InvalidState(format!("Failed to write report file: {e}")))
    }

    /// Load from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if file reading, decoding, or the version check fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())
            .map_err(|e| CombatError::InvalidState(format!("Failed to read report file: {e}")))?;
        Self::from_bytes(&bytes)
    }
}
