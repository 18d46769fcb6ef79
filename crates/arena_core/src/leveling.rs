//! XP accrual and level-ups.

use serde::{Deserialize, Serialize};

use crate::combatant::{CombatantId, CombatantState, Side};
use crate::config::RuleSet;
use crate::formulas;

/// XP granted to one surviving winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct XpAward {
    /// Recipient.
    pub combatant: CombatantId,
    /// XP granted.
    pub xp_awarded: u32,
    /// Level before the award.
    pub level_before: u32,
    /// Level after the award.
    pub level_after: u32,
    /// XP carried toward the next level afterwards.
    pub xp_after: u32,
}

impl XpAward {
    /// Levels gained.
    #[must_use]
    pub const fn levels_gained(&self) -> u32 {
        self.level_after - self.level_before
    }
}

/// Accrue XP, levelling up while the threshold is met.
///
/// Every level-up restores full HP and all resource pools. There is no level
/// cap. Returns the number of levels gained.
pub fn apply_xp(state: &mut CombatantState, amount: u32, rules: &RuleSet) -> u32 {
    let mut level = state.level();
    let mut xp = state.xp().saturating_add(amount);
    let mut gained = 0;
    loop {
        let threshold = formulas::xp_to_next_level(level, rules);
        if xp < threshold {
            break;
        }
        xp -= threshold;
        level += 1;
        gained += 1;
    }
    state.set_progress(level, xp);
    if gained > 0 {
        state.restore_all();
        tracing::info!(
            combatant = %state.id(),
            name = state.name(),
            level,
            "Level up"
        );
    }
    gained
}

/// XP pool earned by defeating `losers`: the sum of their `xp_reward`.
#[must_use]
pub fn xp_pool(roster: &[CombatantState], losers: Side) -> u32 {
    roster
        .iter()
        .filter(|c| c.side() == losers && !c.is_alive())
        .filter_map(|c| c.template().xp_reward)
        .fold(0, u32::saturating_add)
}

/// Split `total` evenly across the living members of `winners`.
///
/// Integer division; the remainder is dropped.
pub fn distribute_xp(
    roster: &mut [CombatantState],
    winners: Side,
    total: u32,
    rules: &RuleSet,
) -> Vec<XpAward> {
    let recipients = roster
        .iter()
        .filter(|c| c.side() == winners && c.is_alive())
        .count();
    let Ok(recipients) = u32::try_from(recipients) else {
        return Vec::new();
    };
    if recipients == 0 {
        return Vec::new();
    }
    let share = total / recipients;

    roster
        .iter_mut()
        .filter(|c| c.side() == winners && c.is_alive())
        .map(|state| {
            let level_before = state.level();
            apply_xp(state, share, rules);
            XpAward {
                combatant: state.id(),
                xp_awarded: share,
                level_before,
                level_after: state.level(),
                xp_after: state.xp(),
            }
        })
        .collect()
}
