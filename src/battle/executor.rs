//! Orchestrates one use of one action: usability validation, cost payment,
//! target dispatch, the per-hit loop and attached template application.
//! All mutation flows through the command bridge.

use crate::battle::commands::{apply_command_batch, CombatCommand};
use crate::battle::resolver::{resolve_hit, ElementTable};
use crate::battle::state::{
    ActionFailureReason, BattleRng, BattleState, CombatEvent, EventBus, TimingQuality,
};
use crate::catalog::ActionCatalog;
use crate::combatant::CombatantId;
use schema::{ActionDefinition, ActionId, ActionKind};

/// Checks whether `actor` may start `action` right now. Order matters and is
/// observable through the reported reason: alive, hasn't acted, energy,
/// cooldown.
pub fn check_usable(
    battle: &BattleState,
    catalog: &ActionCatalog,
    actor: CombatantId,
    action: ActionId,
) -> Result<(), ActionFailureReason> {
    let combatant = battle.combatant(actor);
    let definition = catalog.get(action).ok_or(ActionFailureReason::UnknownAction)?;

    if !combatant.is_alive() {
        return Err(ActionFailureReason::NotAlive);
    }
    if combatant.has_acted {
        return Err(ActionFailureReason::AlreadyActed);
    }
    if combatant.energy < definition.energy_cost as i32 {
        return Err(ActionFailureReason::InsufficientEnergy);
    }
    if combatant.cooldown_of(action) > 0 {
        return Err(ActionFailureReason::OnCooldown);
    }
    Ok(())
}

/// Resolves one full use of an action against its targets. On rejection the
/// state is untouched and the reason is returned; the caller logs it and the
/// turn still completes.
///
/// Targets are filtered to the living before dispatch; an action whose whole
/// target list is gone is a no-op that still pays its costs and completes the
/// actor's turn. Multi-target actions resolve fully against one target before
/// the next begins.
#[allow(clippy::too_many_arguments)]
pub fn execute_action(
    battle: &mut BattleState,
    catalog: &ActionCatalog,
    table: &dyn ElementTable,
    actor: CombatantId,
    action: ActionId,
    targets: &[CombatantId],
    timing: TimingQuality,
    rng: &mut BattleRng,
    bus: &mut EventBus,
) -> Result<(), ActionFailureReason> {
    check_usable(battle, catalog, actor, action)?;
    let definition = catalog
        .get(action)
        .ok_or(ActionFailureReason::UnknownAction)?
        .clone();

    let mut live_targets: Vec<CombatantId> = targets
        .iter()
        .copied()
        .filter(|&id| battle.combatant(id).is_alive())
        .collect();
    if live_targets.is_empty() && definition.is_heal() {
        // A heal with no resolved target falls back to the actor.
        live_targets.push(actor);
    }

    let mut upfront = vec![
        CombatCommand::SpendEnergy {
            actor,
            amount: definition.energy_cost,
        },
        CombatCommand::EmitEvent(CombatEvent::ActionUsed {
            actor,
            action: definition.name.clone(),
        }),
    ];
    if definition.cooldown > 0 {
        upfront.push(CombatCommand::StartCooldown {
            actor,
            action,
            rounds: definition.cooldown,
        });
    }
    apply_command_batch(upfront, battle, bus).map_err(|err| {
        tracing::error!(%err, "command batch failed");
        ActionFailureReason::UnknownAction
    })?;

    for target in live_targets {
        resolve_against(
            battle,
            table,
            actor,
            &definition,
            target,
            timing,
            rng,
            bus,
        );
    }

    let mut closing = Vec::new();
    if let Some(amount) = definition.self_heal {
        closing.push(CombatCommand::Heal {
            target: actor,
            amount,
        });
    }
    closing.push(CombatCommand::MarkActed { actor });
    apply_command_batch(closing, battle, bus).map_err(|err| {
        tracing::error!(%err, "command batch failed");
        ActionFailureReason::UnknownAction
    })?;

    Ok(())
}

/// Applies the action to a single resolved target: the hit loop for attacks,
/// a capped heal, or the attached templates for buffs and debuffs.
#[allow(clippy::too_many_arguments)]
fn resolve_against(
    battle: &mut BattleState,
    table: &dyn ElementTable,
    actor: CombatantId,
    definition: &ActionDefinition,
    target: CombatantId,
    timing: TimingQuality,
    rng: &mut BattleRng,
    bus: &mut EventBus,
) {
    match definition.kind {
        ActionKind::Attack { .. } => {
            let elemental = table.advantage(
                battle.combatant(actor).element(),
                battle.combatant(target).element(),
            );
            if (elemental - 1.0).abs() > f32::EPSILON {
                bus.push(CombatEvent::ElementalEffectiveness {
                    multiplier: elemental,
                });
            }
            for hit in 0..definition.hit_count() {
                // Later hits of a multi-hit sequence stop once the target drops.
                if !battle.combatant(target).is_alive() {
                    break;
                }
                let outcome = {
                    let attacker = battle.combatant(actor);
                    let defender = battle.combatant(target);
                    resolve_hit(attacker, definition, defender, hit, timing, table, rng)
                };
                let Some(outcome) = outcome else {
                    break;
                };
                let _ = apply_command_batch(
                    vec![CombatCommand::DealDamage {
                        attacker: actor,
                        target,
                        amount: outcome.damage,
                        critical: outcome.critical,
                    }],
                    battle,
                    bus,
                );
            }
        }
        ActionKind::Heal { power } => {
            let _ = apply_command_batch(
                vec![CombatCommand::Heal {
                    target,
                    amount: power,
                }],
                battle,
                bus,
            );
        }
        ActionKind::Buff | ActionKind::Debuff => {
            let mut commands = Vec::new();
            for template in &definition.modifiers {
                commands.push(CombatCommand::ApplyModifier {
                    target,
                    template: template.clone(),
                });
            }
            for template in &definition.effects {
                commands.push(CombatCommand::ApplyStatus {
                    target,
                    template: template.clone(),
                });
            }
            let _ = apply_command_batch(commands, battle, bus);
        }
    }
}
