//! Runtime combatant state and the damage pipeline.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::data::{
    Attribute, CombatantTemplate, DamageKind, ResourceCost, ResourceKind, SkillTemplate,
    TemplateProvider,
};
use crate::effects::{ActiveEffect, EffectKind, StatModifiers};
use crate::error::{CombatError, Result};
use crate::formulas;
use crate::math::{floor_i32, percent_to_fraction, Fixed};

/// Position of a combatant within its encounter.
///
/// Side A is registered first, so ascending ids give the side-then-
/// registration order used to break initiative ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CombatantId(pub u32);

impl CombatantId {
    /// Index into the encounter roster.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One of the two opposing sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    /// First roster (usually the players).
    A,
    /// Second roster (usually the opponents).
    B,
}

impl Side {
    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => f.write_str("A"),
            Self::B => f.write_str("B"),
        }
    }
}

/// How an incoming hit was split between shield and HP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DamageTaken {
    /// Points soaked by the shield.
    pub absorbed: u32,
    /// Points removed from HP.
    pub hp_lost: u32,
}

/// Mutable per-encounter state wrapping a shared template.
#[derive(Debug, Clone)]
pub struct CombatantState {
    id: CombatantId,
    side: Side,
    template: Arc<CombatantTemplate>,
    skills: Vec<Arc<SkillTemplate>>,
    level: u32,
    xp: u32,
    current_hp: u32,
    max_hp: u32,
    resources: BTreeMap<ResourceKind, u32>,
    shield: u32,
    effects: BTreeMap<EffectKind, ActiveEffect>,
    /// Sum of all active effect modifiers; rebuilt whenever `effects` changes.
    modifiers: StatModifiers,
}

impl CombatantState {
    /// Create a fresh combatant at full HP and resources.
    ///
    /// `skills` must be the template's skills resolved in order.
    #[must_use]
    pub fn new(
        id: CombatantId,
        side: Side,
        template: Arc<CombatantTemplate>,
        skills: Vec<Arc<SkillTemplate>>,
        level: u32,
    ) -> Self {
        let max_hp = formulas::max_hp(&template);
        let resources = ResourceKind::ALL
            .into_iter()
            .map(|kind| (kind, formulas::max_resource(&template, kind)))
            .filter(|(_, max)| *max > 0)
            .collect();
        Self {
            id,
            side,
            template,
            skills,
            level: level.max(1),
            xp: 0,
            current_hp: max_hp,
            max_hp,
            resources,
            shield: 0,
            effects: BTreeMap::new(),
            modifiers: StatModifiers::NONE,
        }
    }

    /// Create a combatant, resolving its skill ids through `provider`.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::SkillNotFound`] for an unknown skill id.
    pub fn from_template(
        id: CombatantId,
        side: Side,
        template: Arc<CombatantTemplate>,
        provider: &dyn TemplateProvider,
        level: u32,
    ) -> Result<Self> {
        let skills = template
            .skills
            .iter()
            .map(|skill_id| provider.skill(skill_id))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(id, side, template, skills, level))
    }

    /// Encounter-local id.
    #[must_use]
    pub const fn id(&self) -> CombatantId {
        self.id
    }

    /// Owning side.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Shared template.
    #[must_use]
    pub fn template(&self) -> &Arc<CombatantTemplate> {
        &self.template
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.template.name
    }

    /// Known skills in template order.
    #[must_use]
    pub fn skills(&self) -> &[Arc<SkillTemplate>] {
        &self.skills
    }

    /// Look up a known skill by id.
    #[must_use]
    pub fn skill(&self, skill_id: &str) -> Option<&Arc<SkillTemplate>> {
        self.skills.iter().find(|s| s.id == skill_id)
    }

    /// Current level (starts at 1).
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// XP accrued toward the next level.
    #[must_use]
    pub const fn xp(&self) -> u32 {
        self.xp
    }

    /// Current HP.
    #[must_use]
    pub const fn current_hp(&self) -> u32 {
        self.current_hp
    }

    /// Maximum HP.
    #[must_use]
    pub const fn max_hp(&self) -> u32 {
        self.max_hp
    }

    /// Remaining shield points.
    #[must_use]
    pub const fn shield(&self) -> u32 {
        self.shield
    }

    /// `current_hp > 0`.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.current_hp > 0
    }

    /// `current_hp / max_hp`, or zero for a zero-HP template.
    #[must_use]
    pub fn hp_ratio(&self) -> Fixed {
        if self.max_hp == 0 {
            return Fixed::ZERO;
        }
        Fixed::from_num(self.current_hp) / Fixed::from_num(self.max_hp)
    }

    /// Current amount of a resource; zero for pools the combatant lacks.
    #[must_use]
    pub fn resource(&self, kind: ResourceKind) -> u32 {
        self.resources.get(&kind).copied().unwrap_or(0)
    }

    /// Maximum amount of a resource.
    #[must_use]
    pub fn max_resource(&self, kind: ResourceKind) -> u32 {
        formulas::max_resource(&self.template, kind)
    }

    /// Current pools, keyed by kind.
    #[must_use]
    pub fn resources(&self) -> &BTreeMap<ResourceKind, u32> {
        &self.resources
    }

    /// Whether the template carries `tag` (case-insensitive).
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.template.has_tag(tag)
    }

    // ------------------------------------------------------------------
    // Effects and derived stats
    // ------------------------------------------------------------------

    /// Active effects in kind order.
    pub fn effects(&self) -> impl Iterator<Item = (EffectKind, &ActiveEffect)> {
        self.effects.iter().map(|(kind, effect)| (*kind, effect))
    }

    /// Active instance of one effect kind.
    #[must_use]
    pub fn effect(&self, kind: EffectKind) -> Option<&ActiveEffect> {
        self.effects.get(&kind)
    }

    /// Whether any active effect suppresses this combatant's turn.
    #[must_use]
    pub fn is_incapacitated(&self) -> bool {
        self.effects.keys().any(|kind| kind.skips_turn())
    }

    /// Summed modifiers of all active effects.
    #[must_use]
    pub const fn modifiers(&self) -> StatModifiers {
        self.modifiers
    }

    /// Attribute value including effect adjustments.
    #[must_use]
    pub fn attribute(&self, attribute: Attribute) -> i32 {
        let base = self.template.attributes.get(attribute);
        match attribute {
            Attribute::Str => base.saturating_add(self.modifiers.strength),
            _ => base,
        }
    }

    /// DEX bonus plus accuracy modifiers.
    #[must_use]
    pub fn accuracy_mod(&self) -> i32 {
        formulas::attribute_bonus(self.attribute(Attribute::Dex))
            .saturating_add(self.modifiers.accuracy)
    }

    /// DEX bonus plus evasion modifiers.
    #[must_use]
    pub fn evasion_mod(&self) -> i32 {
        formulas::attribute_bonus(self.attribute(Attribute::Dex))
            .saturating_add(self.modifiers.evasion)
    }

    /// Armor including effects.
    #[must_use]
    pub fn armor(&self) -> i32 {
        self.template.armor.saturating_add(self.modifiers.armor)
    }

    /// Magic resist including effects.
    #[must_use]
    pub fn magic_resist(&self) -> i32 {
        self.template
            .magic_resist
            .saturating_add(self.modifiers.magic_resist)
    }

    /// Mitigation that applies to a damage kind.
    #[must_use]
    pub fn mitigation_for(&self, kind: DamageKind) -> i32 {
        if kind.is_physical() {
            self.armor()
        } else {
            self.magic_resist()
        }
    }

    /// Turn-order score for this round.
    #[must_use]
    pub fn initiative(&self) -> i32 {
        formulas::initiative(self.attribute(Attribute::Dex), self.modifiers.initiative)
    }

    /// Add or refresh an effect and fire its `on_apply` hook.
    ///
    /// Returns `true` when an existing instance was refreshed.
    pub fn apply_effect(&mut self, kind: EffectKind, potency: i32, duration_rounds: u32) -> bool {
        let refreshed = match self.effects.get_mut(&kind) {
            Some(active) => {
                active.reapply(potency, duration_rounds);
                true
            }
            None => {
                self.effects
                    .insert(kind, ActiveEffect::new(potency, duration_rounds));
                false
            }
        };
        (kind.behavior().on_apply)(self, potency);
        self.recompute_modifiers();
        refreshed
    }

    /// Fire `on_tick` for every active effect. Returns the ticks that did
    /// something, with the HP each one removed.
    pub fn tick_effects(&mut self) -> Vec<(EffectKind, u32)> {
        let active: Vec<(EffectKind, i32)> = self
            .effects
            .iter()
            .map(|(kind, effect)| (*kind, effect.potency))
            .collect();
        active
            .into_iter()
            .filter_map(|(kind, potency)| {
                (kind.behavior().on_tick)(self, potency).map(|lost| (kind, lost))
            })
            .collect()
    }

    /// Count every effect down one round, removing the ones that run out and
    /// firing their `on_expire` hooks. Returns the expired kinds.
    pub fn decrement_effects(&mut self) -> Vec<EffectKind> {
        let mut expired = Vec::new();
        for (kind, effect) in &mut self.effects {
            if effect.decrement() {
                expired.push(*kind);
            }
        }
        for kind in &expired {
            self.effects.remove(kind);
            (kind.behavior().on_expire)(self);
        }
        if !expired.is_empty() {
            self.recompute_modifiers();
        }
        expired
    }

    fn recompute_modifiers(&mut self) {
        self.modifiers = self
            .effects
            .iter()
            .fold(StatModifiers::NONE, |acc, (kind, effect)| {
                acc + (kind.behavior().modifiers)(effect.potency)
            });
    }

    // ------------------------------------------------------------------
    // HP, shield and resources
    // ------------------------------------------------------------------

    /// Route damage through the shield first, then HP (floored at zero).
    pub fn take_damage(&mut self, amount: u32) -> DamageTaken {
        let absorbed = amount.min(self.shield);
        self.shield -= absorbed;
        let hp_lost = self.lose_hp_direct(amount - absorbed);
        DamageTaken { absorbed, hp_lost }
    }

    /// Remove HP, bypassing the shield. Returns HP actually lost.
    pub fn lose_hp_direct(&mut self, amount: u32) -> u32 {
        let lost = amount.min(self.current_hp);
        self.current_hp -= lost;
        lost
    }

    /// Restore HP up to the maximum. Returns HP actually gained.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let gained = amount.min(self.max_hp - self.current_hp);
        self.current_hp += gained;
        gained
    }

    pub(crate) fn set_shield(&mut self, points: u32) {
        self.shield = points;
    }

    /// Whether a cost can be paid right now.
    #[must_use]
    pub fn can_afford(&self, cost: &ResourceCost) -> bool {
        cost.is_free() || self.resource(cost.kind) >= cost.amount
    }

    /// Deduct a cost, or fail without touching state.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::InsufficientResources`] when the pool is short.
    pub fn try_spend(&mut self, cost: &ResourceCost) -> Result<()> {
        if cost.is_free() {
            return Ok(());
        }
        let available = self.resource(cost.kind);
        if available < cost.amount {
            return Err(CombatError::InsufficientResources {
                resource: cost.kind,
                required: cost.amount,
                available,
            });
        }
        self.resources.insert(cost.kind, available - cost.amount);
        Ok(())
    }

    /// Restore `percent` of each pool's maximum, capped at the maximum.
    /// Returns the amount gained per pool.
    pub fn regenerate(&mut self, percent: Fixed) -> Vec<(ResourceKind, u32)> {
        let fraction = percent_to_fraction(percent);
        let template = Arc::clone(&self.template);
        let mut gains = Vec::new();
        for (kind, current) in &mut self.resources {
            let max = formulas::max_resource(&template, *kind);
            let step = floor_i32(Fixed::from_num(max).saturating_mul(fraction));
            let step = u32::try_from(step).unwrap_or(0);
            let gained = step.min(max.saturating_sub(*current));
            if gained > 0 {
                *current += gained;
                gains.push((*kind, gained));
            }
        }
        gains
    }

    /// Full HP and every pool back to its maximum.
    pub fn restore_all(&mut self) {
        self.current_hp = self.max_hp;
        for (kind, current) in &mut self.resources {
            *current = formulas::max_resource(&self.template, *kind);
        }
    }

    pub(crate) fn set_progress(&mut self, level: u32, xp: u32) {
        self.level = level;
        self.xp = xp;
    }

    /// Check the HP and resource bounds.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::InvalidState`] describing the first violation.
    pub fn check_bounds(&self) -> Result<()> {
        if self.current_hp > self.max_hp {
            return Err(CombatError::InvalidState(format!(
                "{} has {} HP above maximum {}",
                self.id, self.current_hp, self.max_hp
            )));
        }
        for (kind, current) in &self.resources {
            let max = self.max_resource(*kind);
            if *current > max {
                return Err(CombatError::InvalidState(format!(
                    "{} has {current} {kind} above maximum {max}",
                    self.id
                )));
            }
        }
        Ok(())
    }

    /// Serializable view for reports.
    #[must_use]
    pub fn snapshot(&self) -> CombatantSnapshot {
        CombatantSnapshot {
            id: self.id,
            side: self.side,
            template_id: self.template.id.clone(),
            name: self.template.name.clone(),
            level: self.level,
            xp: self.xp,
            current_hp: self.current_hp,
            max_hp: self.max_hp,
            shield: self.shield,
            resources: self.resources.clone(),
            effects: self.effects.clone(),
        }
    }
}

/// Point-in-time copy of a combatant's mutable state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatantSnapshot {
    /// Encounter-local id.
    pub id: CombatantId,
    /// Owning side.
    pub side: Side,
    /// Template the combatant was created from.
    pub template_id: String,
    /// Display name.
    pub name: String,
    /// Level.
    pub level: u32,
    /// XP toward the next level.
    pub xp: u32,
    /// Current HP.
    pub current_hp: u32,
    /// Maximum HP.
    pub max_hp: u32,
    /// Shield points.
    pub shield: u32,
    /// Current resource pools.
    pub resources: BTreeMap<ResourceKind, u32>,
    /// Active effects.
    pub effects: BTreeMap<EffectKind, ActiveEffect>,
}
