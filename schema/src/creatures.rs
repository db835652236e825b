use crate::elements::Element;
use serde::{Deserialize, Serialize};

/// Baseline statistics of a creature before any battle-time scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub max_hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub max_energy: u32,
}

/// Static description of one creature species: its element, baseline stats
/// and the names of the actions it knows. Action names are resolved against
/// an action catalog when a battle is set up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureDefinition {
    pub name: String,
    pub element: Element,
    pub stats: BaseStats,
    pub actions: Vec<String>,
}

/// Read-only tuning knobs applied once at battle setup.
///
/// `strategic_thinking_chance` is the percent chance per enemy turn that the
/// decision engine takes its strategic path instead of picking at random.
/// `stat_multiplier` scales the enemy roster's stats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    pub strategic_thinking_chance: u8,
    pub stat_multiplier: f32,
}

impl DifficultyProfile {
    pub fn easy() -> Self {
        Self {
            strategic_thinking_chance: 25,
            stat_multiplier: 0.85,
        }
    }

    pub fn normal() -> Self {
        Self {
            strategic_thinking_chance: 60,
            stat_multiplier: 1.0,
        }
    }

    pub fn hard() -> Self {
        Self {
            strategic_thinking_chance: 90,
            stat_multiplier: 1.2,
        }
    }
}

impl Default for DifficultyProfile {
    fn default() -> Self {
        Self::normal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_scale_with_difficulty() {
        assert!(
            DifficultyProfile::easy().strategic_thinking_chance
                < DifficultyProfile::normal().strategic_thinking_chance
        );
        assert!(
            DifficultyProfile::normal().strategic_thinking_chance
                < DifficultyProfile::hard().strategic_thinking_chance
        );
        assert_eq!(DifficultyProfile::default(), DifficultyProfile::normal());
    }
}
