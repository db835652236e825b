//! Creature definitions: RON loading for campaign content plus a small
//! prefab set for demos and tests. Action names here must resolve against
//! the catalog the battle is set up with.

use crate::errors::DataError;
use schema::{BaseStats, CreatureDefinition, Element};
use std::fs;
use std::path::Path;

/// Loads a creature list from a RON file.
pub fn load_from_file(path: &Path) -> Result<Vec<CreatureDefinition>, DataError> {
    let content = fs::read_to_string(path)?;
    let creatures: Vec<CreatureDefinition> = ron::from_str(&content)?;
    Ok(creatures)
}

fn creature(
    name: &str,
    element: Element,
    stats: BaseStats,
    actions: &[&str],
) -> CreatureDefinition {
    CreatureDefinition {
        name: name.to_string(),
        element,
        stats,
        actions: actions.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn emberling() -> CreatureDefinition {
    creature(
        "Emberling",
        Element::Ember,
        BaseStats {
            max_hp: 70,
            attack: 14,
            defense: 6,
            speed: 12,
            max_energy: 100,
        },
        &["Claw Swipe", "Ember Bolt", "Mend", "Cataclysm"],
    )
}

pub fn tidecaller() -> CreatureDefinition {
    creature(
        "Tidecaller",
        Element::Tide,
        BaseStats {
            max_hp: 80,
            attack: 12,
            defense: 8,
            speed: 9,
            max_energy: 100,
        },
        &["Claw Swipe", "Tidal Crash", "War Chant", "Enfeeble"],
    )
}

pub fn bloomfang() -> CreatureDefinition {
    creature(
        "Bloomfang",
        Element::Bloom,
        BaseStats {
            max_hp: 75,
            attack: 13,
            defense: 7,
            speed: 11,
            max_energy: 100,
        },
        &["Claw Swipe", "Thorn Volley", "Venom Spit", "Leeching Bite"],
    )
}

pub fn stoneback() -> CreatureDefinition {
    creature(
        "Stoneback",
        Element::Stone,
        BaseStats {
            max_hp: 95,
            attack: 11,
            defense: 12,
            speed: 6,
            max_energy: 100,
        },
        &["Claw Swipe", "Boulder Toss", "Stone Skin", "Wild Frenzy"],
    )
}

pub fn galewing() -> CreatureDefinition {
    creature(
        "Galewing",
        Element::Gale,
        BaseStats {
            max_hp: 65,
            attack: 15,
            defense: 5,
            speed: 15,
            max_energy: 100,
        },
        &["Claw Swipe", "Razor Gust", "Wild Frenzy", "Mend"],
    )
}

pub fn voltpaw() -> CreatureDefinition {
    creature(
        "Voltpaw",
        Element::Volt,
        BaseStats {
            max_hp: 68,
            attack: 14,
            defense: 6,
            speed: 13,
            max_energy: 100,
        },
        &["Claw Swipe", "Static Lash", "Enfeeble", "Mend"],
    )
}

/// The demo player roster.
pub fn demo_player_roster() -> Vec<CreatureDefinition> {
    vec![emberling(), tidecaller(), bloomfang()]
}

/// The demo enemy roster.
pub fn demo_enemy_roster() -> Vec<CreatureDefinition> {
    vec![stoneback(), galewing(), voltpaw()]
}
