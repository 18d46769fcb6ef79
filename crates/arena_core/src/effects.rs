//! Status effect registry.
//!
//! Effects form a closed set of kinds. Each kind's behaviour lives in a
//! static [`EffectBehavior`] table entry of plain function pointers, looked
//! up with [`EffectKind::behavior`]. Adding a kind means adding a variant
//! and one table entry.
//!
//! Stat modifiers are never applied eagerly. [`crate::combatant`] sums
//! [`EffectBehavior::modifiers`] over all active effects whenever its effect
//! map changes, so every derived-stat read sees the current effects.

use std::fmt;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::combatant::CombatantState;

/// Closed set of status effect kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Deals `potency` direct damage each tick, bypassing mitigation and shield.
    Burning,
    /// The combatant's turn is skipped while active.
    Stunned,
    /// Initiative `-5 * potency`, evasion `-potency`.
    Slowed,
    /// Strength `-potency`.
    Weakened,
    /// Accuracy `-potency`.
    AccuracyDown,
    /// Initiative `+potency`.
    InitiativeUp,
    /// Sets shield points to `potency`; leftover shield vanishes on expiry.
    Shielded,
    /// Armor and magic resist `+potency`.
    DefenseUp,
}

impl EffectKind {
    /// Every effect kind in canonical order.
    pub const ALL: [Self; 8] = [
        Self::Burning,
        Self::Stunned,
        Self::Slowed,
        Self::Weakened,
        Self::AccuracyDown,
        Self::InitiativeUp,
        Self::Shielded,
        Self::DefenseUp,
    ];

    /// Behaviour table entry for this kind.
    #[must_use]
    pub fn behavior(self) -> &'static EffectBehavior {
        match self {
            Self::Burning => &BURNING,
            Self::Stunned => &STUNNED,
            Self::Slowed => &SLOWED,
            Self::Weakened => &WEAKENED,
            Self::AccuracyDown => &ACCURACY_DOWN,
            Self::InitiativeUp => &INITIATIVE_UP,
            Self::Shielded => &SHIELDED,
            Self::DefenseUp => &DEFENSE_UP,
        }
    }

    /// Whether the effect helps its bearer.
    #[must_use]
    pub fn is_beneficial(self) -> bool {
        self.behavior().polarity == Polarity::Buff
    }

    /// Whether the bearer loses its turn while the effect is active.
    #[must_use]
    pub fn skips_turn(self) -> bool {
        self.behavior().skips_turn
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Burning => "BURNING",
            Self::Stunned => "STUNNED",
            Self::Slowed => "SLOWED",
            Self::Weakened => "WEAKENED",
            Self::AccuracyDown => "ACCURACY_DOWN",
            Self::InitiativeUp => "INITIATIVE_UP",
            Self::Shielded => "SHIELDED",
            Self::DefenseUp => "DEFENSE_UP",
        };
        f.write_str(name)
    }
}

/// Whether an effect helps or hinders its bearer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    /// Helps the bearer.
    Buff,
    /// Hinders the bearer.
    Debuff,
}

/// Additive stat adjustments contributed by active effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StatModifiers {
    /// Added to initiative.
    pub initiative: i32,
    /// Added to the accuracy modifier.
    pub accuracy: i32,
    /// Added to the evasion modifier.
    pub evasion: i32,
    /// Added to armor.
    pub armor: i32,
    /// Added to magic resist.
    pub magic_resist: i32,
    /// Added to the strength attribute.
    pub strength: i32,
}

impl StatModifiers {
    /// No adjustments.
    pub const NONE: Self = Self {
        initiative: 0,
        accuracy: 0,
        evasion: 0,
        armor: 0,
        magic_resist: 0,
        strength: 0,
    };
}

impl Add for StatModifiers {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            initiative: self.initiative.saturating_add(rhs.initiative),
            accuracy: self.accuracy.saturating_add(rhs.accuracy),
            evasion: self.evasion.saturating_add(rhs.evasion),
            armor: self.armor.saturating_add(rhs.armor),
            magic_resist: self.magic_resist.saturating_add(rhs.magic_resist),
            strength: self.strength.saturating_add(rhs.strength),
        }
    }
}

impl AddAssign for StatModifiers {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Hooks and static properties of one effect kind.
#[derive(Debug)]
pub struct EffectBehavior {
    /// Buff or debuff.
    pub polarity: Polarity,
    /// Suppresses the bearer's action selection.
    pub skips_turn: bool,
    /// One-shot side effect when the effect is added or refreshed.
    pub on_apply: fn(&mut CombatantState, i32),
    /// Per-turn side effect; returns HP lost when the tick did anything.
    pub on_tick: fn(&mut CombatantState, i32) -> Option<u32>,
    /// Cleanup when the effect runs out.
    pub on_expire: fn(&mut CombatantState),
    /// Stat adjustments for a given potency.
    pub modifiers: fn(i32) -> StatModifiers,
}

fn no_apply(_: &mut CombatantState, _: i32) {}

fn no_tick(_: &mut CombatantState, _: i32) -> Option<u32> {
    None
}

fn no_expire(_: &mut CombatantState) {}

fn no_modifiers(_: i32) -> StatModifiers {
    StatModifiers::NONE
}

static BURNING: EffectBehavior = EffectBehavior {
    polarity: Polarity::Debuff,
    skips_turn: false,
    on_apply: no_apply,
    on_tick: |state, potency| {
        let amount = u32::try_from(potency).unwrap_or(0);
        Some(state.lose_hp_direct(amount))
    },
    on_expire: no_expire,
    modifiers: no_modifiers,
};

static STUNNED: EffectBehavior = EffectBehavior {
    polarity: Polarity::Debuff,
    skips_turn: true,
    on_apply: no_apply,
    on_tick: no_tick,
    on_expire: no_expire,
    modifiers: no_modifiers,
};

static SLOWED: EffectBehavior = EffectBehavior {
    polarity: Polarity::Debuff,
    skips_turn: false,
    on_apply: no_apply,
    on_tick: no_tick,
    on_expire: no_expire,
    modifiers: |potency| StatModifiers {
        initiative: potency.saturating_mul(-5),
        evasion: potency.saturating_neg(),
        ..StatModifiers::NONE
    },
};

static WEAKENED: EffectBehavior = EffectBehavior {
    polarity: Polarity::Debuff,
    skips_turn: false,
    on_apply: no_apply,
    on_tick: no_tick,
    on_expire: no_expire,
    modifiers: |potency| StatModifiers {
        strength: potency.saturating_neg(),
        ..StatModifiers::NONE
    },
};

static ACCURACY_DOWN: EffectBehavior = EffectBehavior {
    polarity: Polarity::Debuff,
    skips_turn: false,
    on_apply: no_apply,
    on_tick: no_tick,
    on_expire: no_expire,
    modifiers: |potency| StatModifiers {
        accuracy: potency.saturating_neg(),
        ..StatModifiers::NONE
    },
};

static INITIATIVE_UP: EffectBehavior = EffectBehavior {
    polarity: Polarity::Buff,
    skips_turn: false,
    on_apply: no_apply,
    on_tick: no_tick,
    on_expire: no_expire,
    modifiers: |potency| StatModifiers {
        initiative: potency,
        ..StatModifiers::NONE
    },
};

static SHIELDED: EffectBehavior = EffectBehavior {
    polarity: Polarity::Buff,
    skips_turn: false,
    on_apply: |state, potency| state.set_shield(u32::try_from(potency).unwrap_or(0)),
    on_tick: no_tick,
    on_expire: |state| state.set_shield(0),
    modifiers: no_modifiers,
};

static DEFENSE_UP: EffectBehavior = EffectBehavior {
    polarity: Polarity::Buff,
    skips_turn: false,
    on_apply: no_apply,
    on_tick: no_tick,
    on_expire: no_expire,
    modifiers: |potency| StatModifiers {
        armor: potency,
        magic_resist: potency,
        ..StatModifiers::NONE
    },
};

/// A live effect instance on one combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActiveEffect {
    /// Strength, meaning defined per kind.
    pub potency: i32,
    /// Round-end decrements left before expiry.
    pub remaining_rounds: u32,
}

impl ActiveEffect {
    /// Create a new instance.
    #[must_use]
    pub const fn new(potency: i32, remaining_rounds: u32) -> Self {
        Self {
            potency,
            remaining_rounds,
        }
    }

    /// Refresh: duration becomes the longer of the two, potency is overwritten.
    pub fn reapply(&mut self, potency: i32, duration_rounds: u32) {
        self.potency = potency;
        self.remaining_rounds = self.remaining_rounds.max(duration_rounds);
    }

    /// Count down one round. Returns `true` when the effect has run out.
    pub fn decrement(&mut self) -> bool {
        self.remaining_rounds = self.remaining_rounds.saturating_sub(1);
        self.remaining_rounds == 0
    }
}
