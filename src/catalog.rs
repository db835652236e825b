//! The action catalog: a dense, read-only table of action definitions with a
//! name index. Everything battle-time refers to actions through the stable
//! [`ActionId`] handed out here.

use crate::errors::DataError;
use schema::{
    ActionDefinition, ActionId, ActionKind, Element, StatKind, StatModifierTemplate,
    StatusEffectTemplate, TargetPattern,
};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct ActionCatalog {
    actions: Vec<ActionDefinition>,
    by_name: HashMap<String, ActionId>,
}

impl ActionCatalog {
    /// Builds a catalog from a definition list, rejecting duplicate names.
    pub fn new(actions: Vec<ActionDefinition>) -> Result<Self, DataError> {
        let mut by_name = HashMap::new();
        for (index, action) in actions.iter().enumerate() {
            if by_name
                .insert(action.name.clone(), ActionId(index as u16))
                .is_some()
            {
                return Err(DataError::DuplicateAction(action.name.clone()));
            }
        }
        Ok(Self { actions, by_name })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads a catalog from a RON file containing a list of definitions.
    pub fn load_from_file(path: &Path) -> Result<Self, DataError> {
        let content = fs::read_to_string(path)?;
        let actions: Vec<ActionDefinition> = ron::from_str(&content)?;
        Self::new(actions)
    }

    pub fn get(&self, id: ActionId) -> Option<&ActionDefinition> {
        self.actions.get(id.0 as usize)
    }

    pub fn id_of(&self, name: &str) -> Option<ActionId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ActionId, &ActionDefinition)> {
        self.actions
            .iter()
            .enumerate()
            .map(|(index, action)| (ActionId(index as u16), action))
    }

    /// The built-in action set used by the demo rosters and the prefab
    /// bestiary. Campaign content replaces this with a RON file.
    pub fn builtin() -> Self {
        Self::new(builtin_actions()).expect("builtin action names are unique")
    }
}

fn strike(name: &str, element: Element, power: u32, cost: u32) -> ActionDefinition {
    ActionDefinition {
        name: name.to_string(),
        kind: ActionKind::Attack {
            power,
            hits: 1,
            adds_attack_stat: true,
            divide_power_per_hit: false,
            ignores_defense: false,
            crit_chance: 10,
            crit_multiplier: 1.5,
        },
        element,
        target: TargetPattern::SingleEnemy,
        energy_cost: cost,
        cooldown: 0,
        melee: false,
        hit_interval: 0.0,
        ultimate: false,
        modifiers: vec![],
        effects: vec![],
        self_heal: None,
    }
}

fn builtin_actions() -> Vec<ActionDefinition> {
    vec![
        ActionDefinition {
            melee: true,
            ..strike("Claw Swipe", Element::Neutral, 12, 0)
        },
        strike("Ember Bolt", Element::Ember, 16, 10),
        strike("Tidal Crash", Element::Tide, 16, 10),
        strike("Boulder Toss", Element::Stone, 18, 12),
        ActionDefinition {
            melee: true,
            ..strike("Razor Gust", Element::Gale, 15, 8)
        },
        strike("Static Lash", Element::Volt, 15, 8),
        ActionDefinition {
            name: "Thorn Volley".to_string(),
            kind: ActionKind::Attack {
                power: 18,
                hits: 3,
                adds_attack_stat: true,
                divide_power_per_hit: true,
                ignores_defense: false,
                crit_chance: 8,
                crit_multiplier: 1.5,
            },
            element: Element::Bloom,
            target: TargetPattern::SingleEnemy,
            energy_cost: 15,
            cooldown: 1,
            melee: false,
            hit_interval: 0.25,
            ultimate: false,
            modifiers: vec![],
            effects: vec![],
            self_heal: None,
        },
        ActionDefinition {
            name: "Wild Frenzy".to_string(),
            kind: ActionKind::Attack {
                power: 14,
                hits: 2,
                adds_attack_stat: true,
                divide_power_per_hit: false,
                ignores_defense: false,
                crit_chance: 12,
                crit_multiplier: 1.5,
            },
            element: Element::Neutral,
            target: TargetPattern::RandomEnemy,
            energy_cost: 12,
            cooldown: 1,
            melee: true,
            hit_interval: 0.2,
            ultimate: false,
            modifiers: vec![],
            effects: vec![],
            self_heal: None,
        },
        ActionDefinition {
            name: "Leeching Bite".to_string(),
            kind: ActionKind::Attack {
                power: 10,
                hits: 1,
                adds_attack_stat: true,
                divide_power_per_hit: false,
                ignores_defense: false,
                crit_chance: 10,
                crit_multiplier: 1.5,
            },
            element: Element::Neutral,
            target: TargetPattern::SingleEnemy,
            energy_cost: 5,
            cooldown: 0,
            melee: true,
            hit_interval: 0.0,
            ultimate: false,
            modifiers: vec![],
            effects: vec![],
            self_heal: Some(6),
        },
        ActionDefinition {
            name: "Mend".to_string(),
            kind: ActionKind::Heal { power: 25 },
            element: Element::Neutral,
            target: TargetPattern::User,
            energy_cost: 15,
            cooldown: 2,
            melee: false,
            hit_interval: 0.0,
            ultimate: false,
            modifiers: vec![],
            effects: vec![],
            self_heal: None,
        },
        ActionDefinition {
            name: "War Chant".to_string(),
            kind: ActionKind::Buff,
            element: Element::Neutral,
            target: TargetPattern::AllAllies,
            energy_cost: 10,
            cooldown: 3,
            melee: false,
            hit_interval: 0.0,
            ultimate: false,
            modifiers: vec![StatModifierTemplate {
                stat: StatKind::Attack,
                amount: 6,
                duration: Some(3),
            }],
            effects: vec![],
            self_heal: None,
        },
        ActionDefinition {
            name: "Stone Skin".to_string(),
            kind: ActionKind::Buff,
            element: Element::Stone,
            target: TargetPattern::User,
            energy_cost: 10,
            cooldown: 2,
            melee: false,
            hit_interval: 0.0,
            ultimate: false,
            modifiers: vec![StatModifierTemplate {
                stat: StatKind::Defense,
                amount: 8,
                duration: Some(3),
            }],
            effects: vec![],
            self_heal: None,
        },
        ActionDefinition {
            name: "Enfeeble".to_string(),
            kind: ActionKind::Debuff,
            element: Element::Neutral,
            target: TargetPattern::SingleEnemy,
            energy_cost: 10,
            cooldown: 2,
            melee: false,
            hit_interval: 0.0,
            ultimate: false,
            modifiers: vec![StatModifierTemplate {
                stat: StatKind::Attack,
                amount: -6,
                duration: Some(2),
            }],
            effects: vec![],
            self_heal: None,
        },
        ActionDefinition {
            name: "Venom Spit".to_string(),
            kind: ActionKind::Debuff,
            element: Element::Bloom,
            target: TargetPattern::SingleEnemy,
            energy_cost: 10,
            cooldown: 2,
            melee: false,
            hit_interval: 0.0,
            ultimate: false,
            modifiers: vec![],
            effects: vec![StatusEffectTemplate {
                name: "Venom".to_string(),
                damage_per_round: 5,
                heal_per_round: 0,
                duration: 3,
            }],
            self_heal: None,
        },
        ActionDefinition {
            name: "Cataclysm".to_string(),
            kind: ActionKind::Attack {
                power: 30,
                hits: 1,
                adds_attack_stat: true,
                divide_power_per_hit: false,
                ignores_defense: true,
                crit_chance: 15,
                crit_multiplier: 1.75,
            },
            element: Element::Ember,
            target: TargetPattern::AllEnemies,
            energy_cost: 40,
            cooldown: 3,
            melee: false,
            hit_interval: 0.0,
            ultimate: true,
            modifiers: vec![],
            effects: vec![],
            self_heal: None,
        },
    ]
}
