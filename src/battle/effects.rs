//! Round-start upkeep: energy regeneration, cooldown ticking and the
//! status-effect / stat-modifier passes. Runs exactly once per living
//! combatant per round, before any turn is taken that round.

use crate::battle::state::{BattleState, CombatEvent, EventBus};
use crate::combatant::CombatantId;
use schema::StatKind;

/// Flat energy restored to every living combatant at the start of a round.
pub const ROUND_ENERGY_REGEN: i32 = 15;

/// Runs the full round-start upkeep for one combatant. The caller guarantees
/// the combatant is alive when this is invoked; it may well be dead by the
/// time it returns.
pub fn round_upkeep(battle: &mut BattleState, id: CombatantId, bus: &mut EventBus) {
    let combatant = battle.combatant_mut(id);
    combatant.has_acted = false;
    combatant.gain_energy(ROUND_ENERGY_REGEN);
    combatant.tick_cooldowns();

    tick_status_effects(battle, id, bus);
    tick_stat_modifiers(battle, id, bus);
}

/// One pass over the combatant's status effects, in application order: apply
/// periodic damage, then periodic healing, then age the entry. Entries that
/// reach zero are removed after the pass and never merged or reapplied.
///
/// Damage can kill mid-pass; once the combatant is down the remainder of its
/// pass is skipped.
fn tick_status_effects(battle: &mut BattleState, id: CombatantId, bus: &mut EventBus) {
    let combatant = battle.combatant_mut(id);

    for slot in 0..combatant.status_effects.len() {
        if !combatant.is_alive() {
            break;
        }
        let effect = combatant.status_effects[slot].template.clone();

        if effect.damage_per_round > 0 {
            let dealt = effect.damage_per_round.min(combatant.current_hp.max(0) as u32);
            let died = combatant.take_damage(effect.damage_per_round);
            bus.push(CombatEvent::StatusDamage {
                target: id,
                effect: effect.name.clone(),
                damage: dealt,
                remaining_hp: combatant.current_hp,
            });
            if died {
                bus.push(CombatEvent::CombatantDied { target: id });
                break;
            }
        }

        if effect.heal_per_round > 0 {
            let healed = combatant.heal(effect.heal_per_round);
            if healed > 0 {
                bus.push(CombatEvent::StatusHealed {
                    target: id,
                    effect: effect.name.clone(),
                    amount: healed,
                });
            }
        }

        let entry = &mut combatant.status_effects[slot];
        entry.remaining = entry.remaining.saturating_sub(1);
        if entry.remaining == 0 {
            bus.push(CombatEvent::StatusExpired {
                target: id,
                effect: effect.name,
            });
        }
    }

    combatant.status_effects.retain(|entry| entry.remaining > 0);
}

/// Ages timed stat modifiers and reverses the additive change of any that
/// expire. Permanent entries (`remaining: None`) are never touched.
fn tick_stat_modifiers(battle: &mut BattleState, id: CombatantId, bus: &mut EventBus) {
    let combatant = battle.combatant_mut(id);
    if !combatant.is_alive() {
        return;
    }

    let mut expired: Vec<(StatKind, i32)> = Vec::new();
    combatant.modifiers.retain_mut(|entry| {
        let Some(remaining) = entry.remaining.as_mut() else {
            return true;
        };
        *remaining = remaining.saturating_sub(1);
        if *remaining > 0 {
            return true;
        }
        expired.push((entry.stat, entry.amount));
        false
    });

    for (stat, amount) in expired {
        match stat {
            StatKind::Attack => combatant.attack -= amount,
            StatKind::Defense => combatant.defense -= amount,
            StatKind::Speed => combatant.speed -= amount,
            // Health/Energy changes are instantaneous and never recorded.
            StatKind::Health | StatKind::Energy => {}
        }
        bus.push(CombatEvent::ModifierExpired { target: id, stat });
    }
}
