//! JSON protocol for interactive encounters.
//!
//! The `play` subcommand communicates via JSON lines (one JSON object per
//! line):
//!
//! **Input (stdin):** decisions for the player-controlled side
//! **Output (stdout):** events, decision prompts and state
//!
//! # Protocol Flow
//!
//! 1. Runner starts, outputs `{"type":"ready",...}`
//! 2. Whenever a player combatant is due to act, the runner outputs the new
//!    events followed by a `decision` prompt listing usable skills and
//!    their legal targets
//! 3. The controller answers with `act`, `pass`, `auto`, `query` or `quit`
//! 4. On encounter end, outputs `game_over` and `bye`
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","scenario":"Duel","seed":42,"player_side":"A"}
//! <- {"type":"events","events":[...],"log":["=== Round 1 ===", ...]}
//! <- {"type":"decision","round":1,"actor":0,"name":"Krieger","options":[...]}
//! -> {"cmd":"act","skill_id":"basic_strike_phys","target":1}
//! <- {"type":"events",...}
//! -> {"cmd":"query"}
//! <- {"type":"state","round":2,...}
//! ```

use arena_core::combatant::{CombatantSnapshot, Side};
use arena_core::data::ResourceCost;
use arena_core::encounter::Phase;
use arena_core::leveling::XpAward;
use arena_core::report::{CombatEvent, Outcome};
use serde::{Deserialize, Serialize};

/// Protocol version reported in `ready`.
pub const PROTOCOL_VERSION: &str = "1.0";

// ============================================================================
// Input Commands (controller -> runner)
// ============================================================================

/// Commands that can be sent to the interactive runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Use a skill on a target.
    Act {
        /// Skill to use.
        skill_id: String,
        /// Primary target id.
        target: u32,
        /// Optional secondary target for split skills.
        #[serde(default)]
        secondary: Option<u32>,
    },

    /// Pass the turn.
    Pass,

    /// Let the combatant's own strategy decide this turn.
    Auto,

    /// Query current state without acting.
    Query,

    /// Quit the session.
    Quit,
}

// ============================================================================
// Output Responses (runner -> controller)
// ============================================================================

/// Responses sent from the interactive runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Runner is ready.
    Ready {
        /// Protocol version.
        version: String,
        /// Scenario name.
        scenario: String,
        /// Seed in use.
        seed: u64,
        /// Side the controller plays.
        player_side: Side,
    },

    /// Events since the last `events` response.
    Events {
        /// Raw events.
        events: Vec<CombatEvent>,
        /// Human-readable rendering, one entry per event.
        log: Vec<String>,
    },

    /// A player combatant must act.
    Decision {
        /// Current round.
        round: u32,
        /// Acting combatant id.
        actor: u32,
        /// Acting combatant name.
        name: String,
        /// Skills usable right now.
        options: Vec<SkillOption>,
    },

    /// Current encounter state.
    State {
        /// Current round.
        round: u32,
        /// Scheduler phase.
        phase: Phase,
        /// Every combatant, in id order.
        combatants: Vec<CombatantSnapshot>,
    },

    /// Error processing a command.
    Error {
        /// What went wrong.
        message: String,
        /// Offending command, if it parsed.
        cmd: Option<String>,
    },

    /// Encounter has ended.
    GameOver {
        /// Final outcome.
        outcome: Outcome,
        /// Rounds played.
        rounds: u32,
        /// Surviving combatants of both sides.
        survivors: Vec<CombatantSnapshot>,
        /// XP awarded to the winners.
        leveling: Vec<XpAward>,
    },

    /// Goodbye message before shutdown.
    Bye,
}

/// A usable skill and where it can be aimed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillOption {
    /// Skill id to send back in `act`.
    pub skill_id: String,
    /// Display name.
    pub name: String,
    /// Resource cost.
    pub cost: ResourceCost,
    /// Legal primary targets.
    pub targets: Vec<u32>,
}

// ============================================================================
// Helpers
// ============================================================================

impl Response {
    /// Create a ready response.
    #[must_use]
    pub fn ready(scenario: &str, seed: u64, player_side: Side) -> Self {
        Self::Ready {
            version: PROTOCOL_VERSION.to_string(),
            scenario: scenario.to_string(),
            seed,
            player_side,
        }
    }

    /// Create an error response.
    #[must_use]
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Serialize to JSON line (with newline).
    #[must_use]
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"Serialization failed: {e}","cmd":null}}"#)
        });
        json.push('\n');
        json
    }
}

impl Command {
    /// Parse from a JSON line.
    ///
    /// # Errors
    ///
    /// Returns the JSON error for malformed or unknown commands.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get command name for error reporting.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Act { .. } => "act",
            Self::Pass => "pass",
            Self::Auto => "auto",
            Self::Query => "query",
            Self::Quit => "quit",
        }
    }
}
