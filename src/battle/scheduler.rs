//! The round/phase state machine. RoundStart upkeep feeds into the player
//! phase, then the enemy phase, then the next round, until one side has no
//! living members.

use crate::battle::effects;
use crate::battle::state::{BattleState, CombatEvent, CombatOutcome, CombatPhase, EventBus};
use crate::combatant::{CombatantId, Side};
use serde::{Deserialize, Serialize};

/// One slot of a phase's turn order. The original roster index is the
/// speed-tie breaker and never changes during a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOrderEntry {
    pub id: CombatantId,
    pub roster_index: usize,
}

/// What the session should do next.
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerStep {
    /// A combatant is up; resolve its turn, then call `action_resolved`.
    TurnReady { id: CombatantId },
    /// The battle is over.
    Finished { outcome: CombatOutcome },
}

/// Drives rounds and phases over a [`BattleState`]. The order for a phase is
/// fixed when the phase starts and is not rebuilt on mid-phase speed changes;
/// combatants that die before their slot comes up are skipped.
#[derive(Debug, Clone, Default)]
pub struct CombatScheduler {
    order: Vec<TurnOrderEntry>,
    cursor: usize,
    outcome: Option<CombatOutcome>,
}

impl CombatScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcome(&self) -> Option<CombatOutcome> {
        self.outcome
    }

    /// Advances the state machine until a combatant is ready to act or the
    /// battle ends. Round upkeep and phase transitions happen inside.
    pub fn advance(&mut self, battle: &mut BattleState, bus: &mut EventBus) -> SchedulerStep {
        loop {
            match battle.phase {
                CombatPhase::Ended => {
                    return SchedulerStep::Finished {
                        outcome: self.outcome.unwrap_or(CombatOutcome::Aborted),
                    };
                }
                CombatPhase::RoundStart => {
                    self.begin_round(battle, bus);
                    // Round-start effect damage can already decide the battle.
                    if let Some(outcome) = check_defeat(battle, bus) {
                        self.finish(battle, bus, outcome);
                        continue;
                    }
                    self.enter_phase(battle, bus, CombatPhase::PlayerPhase, Side::Player);
                }
                CombatPhase::PlayerPhase | CombatPhase::EnemyPhase => {
                    let side = if battle.phase == CombatPhase::PlayerPhase {
                        Side::Player
                    } else {
                        Side::Enemy
                    };
                    while self.cursor < self.order.len() {
                        let id = self.order[self.cursor].id;
                        if battle.combatant(id).is_alive() {
                            battle.active = Some(id);
                            return SchedulerStep::TurnReady { id };
                        }
                        self.cursor += 1;
                    }
                    match side {
                        Side::Player => {
                            self.enter_phase(battle, bus, CombatPhase::EnemyPhase, Side::Enemy)
                        }
                        Side::Enemy => battle.phase = CombatPhase::RoundStart,
                    }
                }
            }
        }
    }

    /// Called by the session once a turn has fully resolved. Clears the
    /// active marker, moves the cursor and runs the win check: player defeat
    /// takes precedence over enemy defeat, so a double KO is a loss.
    pub fn action_resolved(
        &mut self,
        battle: &mut BattleState,
        bus: &mut EventBus,
    ) -> Option<CombatOutcome> {
        battle.active = None;
        self.cursor += 1;
        if let Some(outcome) = check_defeat(battle, bus) {
            self.finish(battle, bus, outcome);
            return Some(outcome);
        }
        None
    }

    /// Ends the battle immediately without resolving anything in flight.
    pub fn abort(&mut self, battle: &mut BattleState, bus: &mut EventBus) {
        if battle.phase != CombatPhase::Ended {
            self.finish(battle, bus, CombatOutcome::Aborted);
        }
    }

    fn finish(&mut self, battle: &mut BattleState, bus: &mut EventBus, outcome: CombatOutcome) {
        battle.phase = CombatPhase::Ended;
        battle.active = None;
        self.outcome = Some(outcome);
        bus.push(CombatEvent::CombatEnded { outcome });
        tracing::info!(?outcome, round = battle.round, "combat ended");
    }

    fn enter_phase(
        &mut self,
        battle: &mut BattleState,
        bus: &mut EventBus,
        phase: CombatPhase,
        side: Side,
    ) {
        battle.phase = phase;
        self.order = build_turn_order(battle, side);
        self.cursor = 0;
        bus.push(if self.order.is_empty() {
            CombatEvent::PhaseSkipped { side }
        } else {
            CombatEvent::PhaseStarted { side }
        });
    }

    /// Round upkeep: bump the counter, then regenerate energy, tick cooldowns
    /// and run the effect passes for every living combatant on both sides.
    fn begin_round(&mut self, battle: &mut BattleState, bus: &mut EventBus) {
        battle.round += 1;
        bus.push(CombatEvent::RoundStarted {
            round: battle.round,
        });
        tracing::debug!(round = battle.round, "round start");
        for side in [Side::Player, Side::Enemy] {
            for id in battle.living_ids(side) {
                effects::round_upkeep(battle, id, bus);
            }
        }
    }
}

/// Turn order for one side: living combatants sorted by speed descending,
/// ties broken by original registration order (the sort is stable).
pub fn build_turn_order(battle: &BattleState, side: Side) -> Vec<TurnOrderEntry> {
    let mut order: Vec<TurnOrderEntry> = battle
        .roster(side)
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_alive())
        .map(|(index, _)| TurnOrderEntry {
            id: CombatantId { side, index },
            roster_index: index,
        })
        .collect();
    order.sort_by(|a, b| {
        battle
            .combatant(b.id)
            .effective_speed()
            .cmp(&battle.combatant(a.id).effective_speed())
    });
    order
}

/// The win check. A side is defeated exactly when it has no living members;
/// player defeat is evaluated first by policy.
pub fn check_defeat(battle: &BattleState, bus: &mut EventBus) -> Option<CombatOutcome> {
    if battle.side_defeated(Side::Player) {
        bus.push(CombatEvent::SideDefeated { side: Side::Player });
        Some(CombatOutcome::Defeat)
    } else if battle.side_defeated(Side::Enemy) {
        bus.push(CombatEvent::SideDefeated { side: Side::Enemy });
        Some(CombatOutcome::Victory)
    } else {
        None
    }
}
