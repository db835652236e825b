//! Atomic state-change commands and the bridge that applies them. Planning
//! code stays pure and returns command lists; this module is the only place
//! combat state is mutated during action resolution.

use crate::battle::state::{BattleState, CombatEvent, EventBus};
use crate::combatant::CombatantId;
use schema::{ActionId, StatKind, StatModifierTemplate, StatusEffectTemplate};

/// Atomic commands representing final state changes.
#[derive(Debug, Clone)]
pub enum CombatCommand {
    SpendEnergy {
        actor: CombatantId,
        amount: u32,
    },
    StartCooldown {
        actor: CombatantId,
        action: ActionId,
        rounds: u8,
    },
    DealDamage {
        attacker: CombatantId,
        target: CombatantId,
        amount: u32,
        critical: bool,
    },
    Heal {
        target: CombatantId,
        amount: u32,
    },
    ApplyStatus {
        target: CombatantId,
        template: StatusEffectTemplate,
    },
    ApplyModifier {
        target: CombatantId,
        template: StatModifierTemplate,
    },
    MarkActed {
        actor: CombatantId,
    },
    EmitEvent(CombatEvent),
}

/// Error raised by the command bridge. Commands are built from ids the
/// planner just read out of the same state, so in practice this never fires;
/// it exists so a corrupted batch fails loudly instead of silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionError {
    MissingCombatant,
}

impl std::fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionError::MissingCombatant => write!(f, "Command referenced a missing combatant"),
        }
    }
}

impl std::error::Error for ExecutionError {}

fn exists(battle: &BattleState, id: CombatantId) -> bool {
    id.index < battle.roster(id.side).len()
}

/// Applies one command, pushing the events its state changes produce.
pub fn apply_command(
    command: CombatCommand,
    battle: &mut BattleState,
    bus: &mut EventBus,
) -> Result<(), ExecutionError> {
    match command {
        CombatCommand::SpendEnergy { actor, amount } => {
            if !exists(battle, actor) {
                return Err(ExecutionError::MissingCombatant);
            }
            battle.combatant_mut(actor).spend_energy(amount);
        }
        CombatCommand::StartCooldown {
            actor,
            action,
            rounds,
        } => {
            if !exists(battle, actor) {
                return Err(ExecutionError::MissingCombatant);
            }
            battle.combatant_mut(actor).set_cooldown(action, rounds);
        }
        CombatCommand::DealDamage {
            attacker,
            target,
            amount,
            critical,
        } => {
            if !exists(battle, target) {
                return Err(ExecutionError::MissingCombatant);
            }
            let combatant = battle.combatant_mut(target);
            let dealt = amount.min(combatant.current_hp.max(0) as u32);
            let died = combatant.take_damage(amount);
            bus.push(CombatEvent::HitLanded {
                attacker,
                target,
                damage: dealt,
                critical,
                remaining_hp: combatant.current_hp,
            });
            if died {
                bus.push(CombatEvent::CombatantDied { target });
            }
        }
        CombatCommand::Heal { target, amount } => {
            if !exists(battle, target) {
                return Err(ExecutionError::MissingCombatant);
            }
            let combatant = battle.combatant_mut(target);
            let healed = combatant.heal(amount);
            if healed > 0 {
                bus.push(CombatEvent::Healed {
                    target,
                    amount: healed,
                    new_hp: combatant.current_hp,
                });
            }
        }
        CombatCommand::ApplyStatus { target, template } => {
            if !exists(battle, target) {
                return Err(ExecutionError::MissingCombatant);
            }
            let name = template.name.clone();
            battle.combatant_mut(target).add_status_effect(template);
            bus.push(CombatEvent::StatusApplied {
                target,
                effect: name,
            });
        }
        CombatCommand::ApplyModifier { target, template } => {
            if !exists(battle, target) {
                return Err(ExecutionError::MissingCombatant);
            }
            apply_modifier(battle, bus, target, &template);
        }
        CombatCommand::MarkActed { actor } => {
            if !exists(battle, actor) {
                return Err(ExecutionError::MissingCombatant);
            }
            battle.combatant_mut(actor).has_acted = true;
        }
        CombatCommand::EmitEvent(event) => {
            bus.push(event);
        }
    }
    Ok(())
}

/// Applies a batch of commands in order, stopping at the first failure.
pub fn apply_command_batch(
    commands: Vec<CombatCommand>,
    battle: &mut BattleState,
    bus: &mut EventBus,
) -> Result<(), ExecutionError> {
    for command in commands {
        apply_command(command, battle, bus)?;
    }
    Ok(())
}

/// Attack/Defense/Speed templates become timed, reversible entries on the
/// combatant; Health and Energy templates apply instantly and leave no entry.
fn apply_modifier(
    battle: &mut BattleState,
    bus: &mut EventBus,
    target: CombatantId,
    template: &StatModifierTemplate,
) {
    let combatant = battle.combatant_mut(target);
    match template.stat {
        StatKind::Health => {
            if template.amount >= 0 {
                let healed = combatant.heal(template.amount as u32);
                if healed > 0 {
                    bus.push(CombatEvent::Healed {
                        target,
                        amount: healed,
                        new_hp: combatant.current_hp,
                    });
                }
            } else {
                let amount = template.amount.unsigned_abs();
                let dealt = amount.min(combatant.current_hp.max(0) as u32);
                let died = combatant.take_damage(amount);
                bus.push(CombatEvent::HitLanded {
                    attacker: target,
                    target,
                    damage: dealt,
                    critical: false,
                    remaining_hp: combatant.current_hp,
                });
                if died {
                    bus.push(CombatEvent::CombatantDied { target });
                }
            }
        }
        StatKind::Energy => {
            combatant.gain_energy(template.amount);
        }
        StatKind::Attack | StatKind::Defense | StatKind::Speed => {
            combatant.apply_stat_modifier(template);
            bus.push(CombatEvent::ModifierApplied {
                target,
                stat: template.stat,
                amount: template.amount,
            });
        }
    }
}
