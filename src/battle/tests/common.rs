use crate::battle::state::{BattleRng, BattleState};
use crate::catalog::ActionCatalog;
use crate::combatant::{CombatantId, CombatantState, Side};
use schema::{
    ActionDefinition, ActionKind, BaseStats, CreatureDefinition, Element, StatKind,
    StatModifierTemplate, StatusEffectTemplate, TargetPattern,
};

/// A builder for test combatants with sane defaults.
///
/// # Example
/// ```rust,ignore
/// let hero = TestCreatureBuilder::new("Hero", Element::Ember)
///     .speed(20)
///     .actions(&["Strike"])
///     .build(Side::Player, &catalog);
/// ```
pub struct TestCreatureBuilder {
    name: String,
    element: Element,
    stats: BaseStats,
    actions: Vec<String>,
}

impl TestCreatureBuilder {
    pub fn new(name: &str, element: Element) -> Self {
        Self {
            name: name.to_string(),
            element,
            stats: BaseStats {
                max_hp: 60,
                attack: 10,
                defense: 5,
                speed: 10,
                max_energy: 100,
            },
            actions: Vec::new(),
        }
    }

    pub fn hp(mut self, max_hp: u32) -> Self {
        self.stats.max_hp = max_hp;
        self
    }

    pub fn speed(mut self, speed: u32) -> Self {
        self.stats.speed = speed;
        self
    }

    pub fn actions(mut self, names: &[&str]) -> Self {
        self.actions = names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn build(self, side: Side, catalog: &ActionCatalog) -> CombatantState {
        let definition = CreatureDefinition {
            name: self.name,
            element: self.element,
            stats: self.stats,
            actions: self.actions,
        };
        CombatantState::from_definition(definition, side, 1.0, catalog)
            .expect("test creature actions must resolve")
    }
}

/// Plain single-target attack: no crit, no cost, raw power only.
pub fn attack_action(name: &str, power: u32) -> ActionDefinition {
    ActionDefinition {
        name: name.to_string(),
        kind: ActionKind::Attack {
            power,
            hits: 1,
            adds_attack_stat: false,
            divide_power_per_hit: false,
            ignores_defense: false,
            crit_chance: 0,
            crit_multiplier: 1.5,
        },
        element: Element::Neutral,
        target: TargetPattern::SingleEnemy,
        energy_cost: 0,
        cooldown: 0,
        melee: false,
        hit_interval: 0.0,
        ultimate: false,
        modifiers: vec![],
        effects: vec![],
        self_heal: None,
    }
}

pub fn heal_action(name: &str, power: u32) -> ActionDefinition {
    ActionDefinition {
        name: name.to_string(),
        kind: ActionKind::Heal { power },
        element: Element::Neutral,
        target: TargetPattern::User,
        energy_cost: 0,
        cooldown: 0,
        melee: false,
        hit_interval: 0.0,
        ultimate: false,
        modifiers: vec![],
        effects: vec![],
        self_heal: None,
    }
}

pub fn buff_action(name: &str, stat: StatKind, amount: i32, duration: Option<u8>) -> ActionDefinition {
    ActionDefinition {
        name: name.to_string(),
        kind: ActionKind::Buff,
        element: Element::Neutral,
        target: TargetPattern::User,
        energy_cost: 0,
        cooldown: 0,
        melee: false,
        hit_interval: 0.0,
        ultimate: false,
        modifiers: vec![StatModifierTemplate {
            stat,
            amount,
            duration,
        }],
        effects: vec![],
        self_heal: None,
    }
}

pub fn dot_debuff(name: &str, effect: &str, damage_per_round: u32, duration: u8) -> ActionDefinition {
    ActionDefinition {
        name: name.to_string(),
        kind: ActionKind::Debuff,
        element: Element::Neutral,
        target: TargetPattern::SingleEnemy,
        energy_cost: 0,
        cooldown: 0,
        melee: false,
        hit_interval: 0.0,
        ultimate: false,
        modifiers: vec![],
        effects: vec![StatusEffectTemplate {
            name: effect.to_string(),
            damage_per_round,
            heal_per_round: 0,
            duration,
        }],
        self_heal: None,
    }
}

pub fn catalog_of(actions: Vec<ActionDefinition>) -> ActionCatalog {
    ActionCatalog::new(actions).expect("test catalog names must be unique")
}

pub fn battle_of(players: Vec<CombatantState>, enemies: Vec<CombatantState>) -> BattleState {
    BattleState::new("test_battle".to_string(), players, enemies)
}

pub fn id(side: Side, index: usize) -> CombatantId {
    CombatantId { side, index }
}

/// Scripted source whose rolls never pass a crit or gamble check.
pub fn no_luck_rng() -> BattleRng {
    BattleRng::scripted(vec![100; 100])
}
