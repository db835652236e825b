use crate::elements::Element;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::Display;

/// Stable identifier for an action: its index in the owning catalog.
///
/// Cooldown bookkeeping and creature action lists are keyed by this id, never
/// by name lookups or references into catalog storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionId(pub u16);

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Combat statistics a modifier can touch. Attack, Defense and Speed changes
/// are timed and reversible; Health and Energy changes apply instantly and
/// are never reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum StatKind {
    Health,
    Attack,
    Defense,
    Speed,
    Energy,
}

/// Who an action resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetPattern {
    /// The acting combatant itself.
    User,
    /// One chosen living opponent.
    SingleEnemy,
    /// Every living opponent.
    AllEnemies,
    /// Every living member of the actor's own side, the actor included.
    AllAllies,
    /// Exactly one uniformly random living opponent.
    RandomEnemy,
}

/// A timed periodic effect carried by an action. Each application becomes its
/// own entry on the target; entries are never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffectTemplate {
    pub name: String,
    pub damage_per_round: u32,
    pub heal_per_round: u32,
    pub duration: u8,
}

/// An additive stat change carried by an action. `duration: None` marks a
/// permanent change that is applied once and never ticked or reversed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatModifierTemplate {
    pub stat: StatKind,
    pub amount: i32,
    pub duration: Option<u8>,
}

/// The four action archetypes. Resolution is a match over this union; there
/// is no further dispatch on categories or type tags.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActionKind {
    Attack {
        power: u32,
        hits: u8,
        /// Add the attacker's Attack stat to the base power.
        adds_attack_stat: bool,
        /// Split the base power evenly across the hits of a multi-hit action.
        divide_power_per_hit: bool,
        /// Skip defense mitigation entirely.
        ignores_defense: bool,
        /// Per-hit critical chance, percent.
        crit_chance: u8,
        crit_multiplier: f32,
    },
    Heal {
        power: u32,
    },
    /// Applies the definition's attached modifier/effect templates to allies.
    Buff,
    /// Applies the definition's attached modifier/effect templates to enemies.
    Debuff,
}

/// Static, read-only description of one action. Instances never change during
/// a battle; all mutable bookkeeping (cooldowns, energy) lives on the
/// combatant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDefinition {
    pub name: String,
    pub kind: ActionKind,
    pub element: Element,
    pub target: TargetPattern,
    pub energy_cost: u32,
    /// Rounds the action stays unusable after a use. 0 means no cooldown.
    pub cooldown: u8,
    /// Melee actions move the attacker into contact before the swing.
    pub melee: bool,
    /// Presentation delay between hits of a multi-hit action, seconds.
    pub hit_interval: f32,
    /// Marker consulted by the opponent decision engine; orthogonal to kind.
    pub ultimate: bool,
    pub modifiers: Vec<StatModifierTemplate>,
    pub effects: Vec<StatusEffectTemplate>,
    /// HP restored to the attacker after the action resolves, any kind.
    pub self_heal: Option<u32>,
}

impl ActionDefinition {
    pub fn is_attack(&self) -> bool {
        matches!(self.kind, ActionKind::Attack { .. })
    }

    pub fn is_heal(&self) -> bool {
        matches!(self.kind, ActionKind::Heal { .. })
    }

    pub fn is_buff(&self) -> bool {
        matches!(self.kind, ActionKind::Buff)
    }

    /// Base power for selection heuristics: attack power, heal power, or 0.
    pub fn base_power(&self) -> u32 {
        match self.kind {
            ActionKind::Attack { power, .. } => power,
            ActionKind::Heal { power } => power,
            ActionKind::Buff | ActionKind::Debuff => 0,
        }
    }

    /// Number of hits the action lands; 1 for everything but multi-hit attacks.
    pub fn hit_count(&self) -> u8 {
        match self.kind {
            ActionKind::Attack { hits, .. } => hits.max(1),
            _ => 1,
        }
    }
}
