use crate::catalog::ActionCatalog;
use crate::errors::DataError;
use schema::{
    ActionId, CreatureDefinition, Element, StatKind, StatModifierTemplate, StatusEffectTemplate,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Which roster a combatant fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Player => write!(f, "player"),
            Side::Enemy => write!(f, "enemy"),
        }
    }
}

/// Identifies one combatant for the duration of a battle: its side and its
/// original registration index in that side's roster. Indices never shift,
/// dead combatants included, so the id stays stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatantId {
    pub side: Side,
    pub index: usize,
}

/// One application of a status effect. Duplicate applications of the same
/// template coexist as separate entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveStatusEffect {
    pub template: StatusEffectTemplate,
    pub remaining: u8,
}

/// One applied Attack/Defense/Speed change. The stored amount is subtracted
/// back out exactly once when the entry expires; `remaining: None` entries
/// are permanent and never touched again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveModifier {
    pub stat: StatKind,
    pub amount: i32,
    pub remaining: Option<u8>,
}

/// Per-creature battle state: resources, cooldowns and active effects.
///
/// Stat fields are signed and never clamped on write so that expiry reversal
/// is an exact inverse of application; combat math clamps at zero on read.
/// HP and energy are clamped to `[0, max]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantState {
    pub definition: CreatureDefinition,
    pub side: Side,
    pub current_hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
    pub energy: i32,
    pub max_energy: i32,
    alive: bool,
    pub has_acted: bool,
    pub cooldowns: HashMap<ActionId, u8>,
    pub status_effects: Vec<ActiveStatusEffect>,
    pub modifiers: Vec<ActiveModifier>,
    pub actions: Vec<ActionId>,
}

impl CombatantState {
    /// Builds a combatant from a static definition, resolving its action
    /// names against the catalog and scaling its stats by `scale` (difficulty
    /// scaling for the enemy roster; 1.0 for the player side).
    pub fn from_definition(
        definition: CreatureDefinition,
        side: Side,
        scale: f32,
        catalog: &ActionCatalog,
    ) -> Result<Self, DataError> {
        let actions = definition
            .actions
            .iter()
            .map(|name| {
                catalog
                    .id_of(name)
                    .ok_or_else(|| DataError::UnknownAction(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let scaled = |value: u32| ((value as f32 * scale).round() as i32).max(1);
        let stats = definition.stats;
        let max_hp = scaled(stats.max_hp);
        let max_energy = stats.max_energy as i32;

        Ok(CombatantState {
            side,
            current_hp: max_hp,
            max_hp,
            attack: scaled(stats.attack),
            defense: scaled(stats.defense),
            speed: scaled(stats.speed),
            energy: max_energy / 2,
            max_energy,
            alive: true,
            has_acted: false,
            cooldowns: HashMap::new(),
            status_effects: Vec::new(),
            modifiers: Vec::new(),
            actions,
            definition,
        })
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn element(&self) -> Element {
        self.definition.element
    }

    /// A combatant stays dead: once this returns false it never flips back,
    /// regardless of later healing.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn hp_ratio(&self) -> f32 {
        if self.max_hp <= 0 {
            return 0.0;
        }
        self.current_hp.max(0) as f32 / self.max_hp as f32
    }

    /// Applies damage and reports whether this blow was the killing one.
    /// Returns true at most once over the combatant's lifetime.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        self.current_hp -= amount as i32;
        if self.current_hp <= 0 {
            self.current_hp = 0;
            if self.alive {
                self.alive = false;
                return true;
            }
        }
        false
    }

    /// Heals up to max HP and returns the amount actually restored.
    /// The dead stay at zero.
    pub fn heal(&mut self, amount: u32) -> u32 {
        if !self.alive {
            return 0;
        }
        let healed = (amount as i32).min(self.max_hp - self.current_hp).max(0);
        self.current_hp += healed;
        healed as u32
    }

    pub fn gain_energy(&mut self, amount: i32) {
        self.energy = (self.energy + amount).clamp(0, self.max_energy);
    }

    pub fn spend_energy(&mut self, amount: u32) {
        self.energy = (self.energy - amount as i32).max(0);
    }

    pub fn cooldown_of(&self, action: ActionId) -> u8 {
        self.cooldowns.get(&action).copied().unwrap_or(0)
    }

    pub fn set_cooldown(&mut self, action: ActionId, rounds: u8) {
        if rounds > 0 {
            self.cooldowns.insert(action, rounds);
        }
    }

    /// Decrement every pending cooldown by one round, dropping entries that
    /// reach zero. Absent entries mean ready.
    pub fn tick_cooldowns(&mut self) {
        self.cooldowns.retain(|_, remaining| {
            *remaining = remaining.saturating_sub(1);
            *remaining > 0
        });
    }

    /// Attack stat as used in damage math, floored at zero.
    pub fn attack_value(&self) -> i32 {
        self.attack.max(0)
    }

    pub fn defense_value(&self) -> i32 {
        self.defense.max(0)
    }

    pub fn effective_speed(&self) -> i32 {
        self.speed.max(0)
    }

    /// Actions this combatant could start right now: it is alive, can pay the
    /// energy cost and the action is off cooldown. The has-acted flag is a
    /// turn-sequencing concern checked by the executor, not a usability one.
    pub fn usable_actions(&self, catalog: &ActionCatalog) -> Vec<ActionId> {
        if !self.alive {
            return Vec::new();
        }
        self.actions
            .iter()
            .copied()
            .filter(|&id| {
                catalog
                    .get(id)
                    .map(|def| {
                        self.energy >= def.energy_cost as i32 && self.cooldown_of(id) == 0
                    })
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Applies a timed Attack/Defense/Speed change and records it for expiry
    /// reversal. Health and Energy templates are instantaneous and routed
    /// through the command layer instead.
    pub fn apply_stat_modifier(&mut self, template: &StatModifierTemplate) {
        match template.stat {
            StatKind::Attack => self.attack += template.amount,
            StatKind::Defense => self.defense += template.amount,
            StatKind::Speed => self.speed += template.amount,
            StatKind::Health | StatKind::Energy => return,
        }
        self.modifiers.push(ActiveModifier {
            stat: template.stat,
            amount: template.amount,
            remaining: template.duration,
        });
    }

    pub fn add_status_effect(&mut self, template: StatusEffectTemplate) {
        let remaining = template.duration;
        self.status_effects.push(ActiveStatusEffect {
            template,
            remaining,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ActionCatalog;
    use schema::BaseStats;

    fn sprig() -> CreatureDefinition {
        CreatureDefinition {
            name: "Sprig".to_string(),
            element: Element::Bloom,
            stats: BaseStats {
                max_hp: 40,
                attack: 10,
                defense: 5,
                speed: 8,
                max_energy: 100,
            },
            actions: vec![],
        }
    }

    fn sprig_state() -> CombatantState {
        CombatantState::from_definition(sprig(), Side::Player, 1.0, &ActionCatalog::empty())
            .unwrap()
    }

    #[test]
    fn death_latch_fires_exactly_once() {
        let mut c = sprig_state();
        assert!(!c.take_damage(39));
        assert!(c.is_alive());
        assert!(c.take_damage(5));
        assert!(!c.is_alive());
        assert_eq!(c.current_hp, 0);
        // Further damage never reports a second death.
        assert!(!c.take_damage(100));
    }

    #[test]
    fn healing_caps_at_max_and_skips_the_dead() {
        let mut c = sprig_state();
        c.take_damage(10);
        assert_eq!(c.heal(25), 10);
        assert_eq!(c.current_hp, c.max_hp);

        c.take_damage(100);
        assert_eq!(c.heal(25), 0);
        assert_eq!(c.current_hp, 0);
        assert!(!c.is_alive());
    }

    #[test]
    fn cooldowns_tick_down_and_disappear_at_zero() {
        let mut c = sprig_state();
        let id = ActionId(3);
        c.set_cooldown(id, 2);
        assert_eq!(c.cooldown_of(id), 2);
        c.tick_cooldowns();
        assert_eq!(c.cooldown_of(id), 1);
        c.tick_cooldowns();
        assert_eq!(c.cooldown_of(id), 0);
        assert!(c.cooldowns.is_empty());
    }

    #[test]
    fn stat_modifier_reversal_is_exact_even_below_zero() {
        let mut c = sprig_state();
        let debuff = StatModifierTemplate {
            stat: StatKind::Speed,
            amount: -20,
            duration: Some(1),
        };
        c.apply_stat_modifier(&debuff);
        assert_eq!(c.speed, -12);
        assert_eq!(c.effective_speed(), 0);

        // Reversal restores the original value exactly.
        let entry = c.modifiers.pop().unwrap();
        c.speed -= entry.amount;
        assert_eq!(c.speed, 8);
    }

    #[test]
    fn difficulty_scale_applies_to_stats_but_not_energy() {
        let c = CombatantState::from_definition(
            sprig(),
            Side::Enemy,
            1.5,
            &ActionCatalog::empty(),
        )
        .unwrap();
        assert_eq!(c.max_hp, 60);
        assert_eq!(c.attack, 15);
        assert_eq!(c.max_energy, 100);
    }
}
