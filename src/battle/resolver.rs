//! Pure per-hit damage computation. Nothing in here mutates battle state;
//! the executor turns the returned outcome into commands.

use crate::battle::state::{BattleRng, TimingQuality};
use crate::combatant::CombatantState;
use schema::{ActionDefinition, ActionKind, Element};

/// Pure elemental matchup lookup. Swappable so a campaign can ship its own
/// chart; the engine never assumes anything beyond "multiplier".
pub trait ElementTable: Send + Sync {
    fn advantage(&self, attacker: Element, defender: Element) -> f32;
}

/// The stock matchup chart from the schema crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardElementTable;

impl ElementTable for StandardElementTable {
    fn advantage(&self, attacker: Element, defender: Element) -> f32 {
        schema::elements::advantage(attacker, defender)
    }
}

/// Result of resolving one hit of an attack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitOutcome {
    pub damage: u32,
    pub critical: bool,
    pub elemental: f32,
}

/// Computes the damage of a single hit: timing-scaled base power, optional
/// per-hit division, elemental multiplier, defense mitigation with a floor of
/// 1, then an independent critical roll multiplying the mitigated damage.
///
/// Returns None for non-attack actions.
pub fn resolve_hit(
    attacker: &CombatantState,
    action: &ActionDefinition,
    defender: &CombatantState,
    hit_index: u8,
    timing: TimingQuality,
    table: &dyn ElementTable,
    rng: &mut BattleRng,
) -> Option<HitOutcome> {
    let ActionKind::Attack {
        power,
        hits,
        adds_attack_stat,
        divide_power_per_hit,
        ignores_defense,
        crit_chance,
        crit_multiplier,
    } = action.kind
    else {
        return None;
    };

    let mut base = power as f32
        + if adds_attack_stat {
            attacker.attack_value() as f32
        } else {
            0.0
        };
    base *= timing.multiplier();
    if divide_power_per_hit && hits > 1 {
        base = (base / hits as f32).round().max(1.0);
    }

    let elemental = table.advantage(attacker.element(), defender.element());
    let mut damage = (base * elemental).round() as i64;
    if !ignores_defense {
        damage = (damage - defender.defense_value() as i64).max(1);
    }
    let mut damage = damage.max(0) as u32;

    let reason = format!("Critical Hit Check (hit {})", hit_index);
    let critical = rng.roll(&reason) <= crit_chance;
    if critical {
        damage = (damage as f32 * crit_multiplier).round() as u32;
    }

    Some(HitOutcome {
        damage,
        critical,
        elemental,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ActionCatalog;
    use crate::combatant::Side;
    use pretty_assertions::assert_eq;
    use schema::{BaseStats, CreatureDefinition, TargetPattern};

    fn creature(name: &str, element: Element, attack: u32, defense: u32) -> CombatantState {
        let definition = CreatureDefinition {
            name: name.to_string(),
            element,
            stats: BaseStats {
                max_hp: 100,
                attack,
                defense,
                speed: 10,
                max_energy: 100,
            },
            actions: vec![],
        };
        CombatantState::from_definition(definition, Side::Player, 1.0, &ActionCatalog::empty())
            .unwrap()
    }

    fn attack_action(power: u32) -> ActionDefinition {
        ActionDefinition {
            name: "Test Strike".to_string(),
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

    fn no_crit_rng() -> BattleRng {
        BattleRng::scripted(vec![100; 16])
    }

    #[test]
    fn mitigated_damage_never_drops_below_one() {
        let attacker = creature("A", Element::Neutral, 0, 0);
        let defender = creature("D", Element::Neutral, 0, 500);
        let outcome = resolve_hit(
            &attacker,
            &attack_action(10),
            &defender,
            0,
            TimingQuality::Normal,
            &StandardElementTable,
            &mut no_crit_rng(),
        )
        .unwrap();
        assert_eq!(outcome.damage, 1);
    }

    #[test]
    fn divide_per_hit_rounds_the_split() {
        let attacker = creature("A", Element::Neutral, 0, 0);
        let defender = creature("D", Element::Neutral, 0, 0);
        let mut action = attack_action(10);
        action.kind = ActionKind::Attack {
            power: 10,
            hits: 3,
            adds_attack_stat: false,
            divide_power_per_hit: true,
            ignores_defense: false,
            crit_chance: 0,
            crit_multiplier: 1.5,
        };
        let mut rng = no_crit_rng();
        for hit in 0..3 {
            let outcome = resolve_hit(
                &attacker,
                &action,
                &defender,
                hit,
                TimingQuality::Normal,
                &StandardElementTable,
                &mut rng,
            )
            .unwrap();
            // round(10 / 3) = 3 on every hit
            assert_eq!(outcome.damage, 3);
        }
    }

    #[test]
    fn timing_scales_the_base_before_mitigation() {
        let attacker = creature("A", Element::Neutral, 10, 0);
        let defender = creature("D", Element::Neutral, 0, 5);
        let mut action = attack_action(10);
        action.kind = ActionKind::Attack {
            power: 10,
            hits: 1,
            adds_attack_stat: true,
            divide_power_per_hit: false,
            ignores_defense: false,
            crit_chance: 0,
            crit_multiplier: 1.5,
        };
        let cases = [
            (TimingQuality::Perfect, 25), // round(20 * 1.5) - 5
            (TimingQuality::Normal, 15),  // 20 - 5
            (TimingQuality::Miss, 11),    // round(20 * 0.8) - 5
        ];
        for (timing, expected) in cases {
            let outcome = resolve_hit(
                &attacker,
                &action,
                &defender,
                0,
                timing,
                &StandardElementTable,
                &mut no_crit_rng(),
            )
            .unwrap();
            assert_eq!(outcome.damage, expected, "timing {:?}", timing);
        }
    }

    #[test]
    fn elemental_multiplier_applies_before_defense() {
        let attacker = creature("A", Element::Ember, 0, 0);
        let defender = creature("D", Element::Bloom, 0, 10);
        let outcome = resolve_hit(
            &attacker,
            &attack_action(20),
            &defender,
            0,
            TimingQuality::Normal,
            &StandardElementTable,
            &mut no_crit_rng(),
        )
        .unwrap();
        // round(20 * 2.0) - 10 = 30
        assert_eq!(outcome.damage, 30);
        assert_eq!(outcome.elemental, 2.0);
    }

    #[test]
    fn ignores_defense_skips_mitigation() {
        let attacker = creature("A", Element::Neutral, 0, 0);
        let defender = creature("D", Element::Neutral, 0, 500);
        let mut action = attack_action(12);
        action.kind = ActionKind::Attack {
            power: 12,
            hits: 1,
            adds_attack_stat: false,
            divide_power_per_hit: false,
            ignores_defense: true,
            crit_chance: 0,
            crit_multiplier: 1.5,
        };
        let outcome = resolve_hit(
            &attacker,
            &action,
            &defender,
            0,
            TimingQuality::Normal,
            &StandardElementTable,
            &mut no_crit_rng(),
        )
        .unwrap();
        assert_eq!(outcome.damage, 12);
    }

    #[test]
    fn critical_rolls_are_independent_per_hit() {
        let attacker = creature("A", Element::Neutral, 0, 0);
        let defender = creature("D", Element::Neutral, 0, 0);
        let mut action = attack_action(10);
        action.kind = ActionKind::Attack {
            power: 10,
            hits: 2,
            adds_attack_stat: false,
            divide_power_per_hit: false,
            ignores_defense: false,
            crit_chance: 50,
            crit_multiplier: 2.0,
        };
        // First roll crits (25 <= 50), second does not (80 > 50).
        let mut rng = BattleRng::scripted(vec![25, 80]);
        let first = resolve_hit(
            &attacker,
            &action,
            &defender,
            0,
            TimingQuality::Normal,
            &StandardElementTable,
            &mut rng,
        )
        .unwrap();
        let second = resolve_hit(
            &attacker,
            &action,
            &defender,
            1,
            TimingQuality::Normal,
            &StandardElementTable,
            &mut rng,
        )
        .unwrap();
        assert!(first.critical);
        assert_eq!(first.damage, 20);
        assert!(!second.critical);
        assert_eq!(second.damage, 10);
    }

    #[test]
    fn non_attacks_have_no_hit_outcome() {
        let attacker = creature("A", Element::Neutral, 0, 0);
        let defender = creature("D", Element::Neutral, 0, 0);
        let mut action = attack_action(0);
        action.kind = ActionKind::Heal { power: 10 };
        assert!(resolve_hit(
            &attacker,
            &action,
            &defender,
            0,
            TimingQuality::Normal,
            &StandardElementTable,
            &mut no_crit_rng(),
        )
        .is_none());
    }
}
