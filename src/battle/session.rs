//! The external entry point: one `CombatSession` per battle, owning rosters,
//! scheduler, catalog, random source and combat log.
//!
//! Presentation and player input are suspension points, not callbacks-into-
//! state: the core awaits a collaborator future and resumes when it
//! completes. An abort resolves every pending suspension immediately and the
//! battle transitions straight to its end state.

use crate::battle::ai::{Decider, HeuristicAi};
use crate::battle::executor;
use crate::battle::resolver::{ElementTable, StandardElementTable};
use crate::battle::scheduler::{CombatScheduler, SchedulerStep};
use crate::battle::state::{
    ActionFailureReason, BattleRng, BattleState, CombatEvent, CombatLog, CombatOutcome, EventBus,
    TimingQuality,
};
use crate::catalog::ActionCatalog;
use crate::combatant::{CombatantId, CombatantState, Side};
use crate::errors::DataError;
use async_trait::async_trait;
use schema::{ActionDefinition, ActionId, CreatureDefinition, DifficultyProfile};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

/// A player-chosen action and its targets, consumed once per player turn.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerChoice {
    pub action: ActionId,
    pub targets: Vec<CombatantId>,
}

/// Source of player decisions. Asked exactly once per player turn; replying
/// `None` forfeits that turn. The request may suspend indefinitely; the
/// engine imposes no timeout.
#[async_trait]
pub trait PlayerInputSource: Send + Sync {
    async fn request_action(
        &self,
        battle: &BattleState,
        catalog: &ActionCatalog,
        table: &dyn ElementTable,
        actor: CombatantId,
        rng: &mut BattleRng,
    ) -> Option<PlayerChoice>;
}

/// Presentation collaborator. The core suspends on the async methods and
/// never polls animation state; the attack animation's completion carries the
/// timing-minigame outcome. Death and damage-number notifications are
/// fire-and-forget.
#[async_trait]
pub trait PresentationSink: Send + Sync {
    async fn attack_animation(
        &self,
        battle: &BattleState,
        attacker: CombatantId,
        action: &ActionDefinition,
        target: Option<CombatantId>,
    ) -> TimingQuality {
        let _ = (battle, attacker, action, target);
        TimingQuality::Normal
    }

    /// Melee attackers move into contact before the swing.
    async fn approach_target(&self, attacker: CombatantId, target: CombatantId) {
        let _ = (attacker, target);
    }

    fn death(&self, target: CombatantId) {
        let _ = target;
    }

    fn damage_number(&self, target: CombatantId, amount: u32, critical: bool) {
        let _ = (target, amount, critical);
    }
}

/// Sink that completes every request immediately with neutral timing.
pub struct HeadlessSink;

#[async_trait]
impl PresentationSink for HeadlessSink {}

/// Input source that answers with the opponent decision engine. The fallback
/// for non-interactive environments: demos, simulations, tests.
#[derive(Default)]
pub struct AutoPilot {
    ai: HeuristicAi,
    profile: DifficultyProfile,
}

impl AutoPilot {
    pub fn new(profile: DifficultyProfile) -> Self {
        Self {
            ai: HeuristicAi::new(),
            profile,
        }
    }
}

#[async_trait]
impl PlayerInputSource for AutoPilot {
    async fn request_action(
        &self,
        battle: &BattleState,
        catalog: &ActionCatalog,
        table: &dyn ElementTable,
        actor: CombatantId,
        rng: &mut BattleRng,
    ) -> Option<PlayerChoice> {
        self.ai
            .decide(battle, actor, catalog, table, &self.profile, rng)
            .map(|decision| PlayerChoice {
                action: decision.action,
                targets: decision.targets,
            })
    }
}

/// Cancels a running battle from outside. Any pending suspension resolves
/// immediately; the in-flight action is dropped, not resolved.
#[derive(Debug, Clone)]
pub struct AbortHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl AbortHandle {
    pub fn abort(&self) {
        let _ = self.tx.send(true);
    }
}

/// Outcome payload handed to reward/progression systems when the battle
/// ends. Persistence is someone else's job.
#[derive(Debug, Clone, Serialize)]
pub struct BattleOutcome {
    pub battle_id: String,
    pub result: CombatOutcome,
    pub rounds: u32,
    pub survivors: Vec<String>,
}

enum TurnFlow {
    Completed,
    Aborted,
}

/// One battle from setup to outcome. Owns the only mutable combat state;
/// collaborators read it through the interfaces above.
pub struct CombatSession {
    state: BattleState,
    scheduler: CombatScheduler,
    catalog: ActionCatalog,
    table: Box<dyn ElementTable>,
    ai: HeuristicAi,
    profile: DifficultyProfile,
    rng: BattleRng,
    bus: EventBus,
    log: CombatLog,
    abort_tx: Arc<watch::Sender<bool>>,
    abort_rx: watch::Receiver<bool>,
}

impl CombatSession {
    /// Builds both rosters from static definitions. Enemy stats are scaled by
    /// the difficulty profile; the player roster is taken as-is.
    pub fn new(
        battle_id: impl Into<String>,
        players: &[CreatureDefinition],
        enemies: &[CreatureDefinition],
        catalog: ActionCatalog,
        profile: DifficultyProfile,
        rng: BattleRng,
    ) -> Result<Self, DataError> {
        let player_side = players
            .iter()
            .map(|def| CombatantState::from_definition(def.clone(), Side::Player, 1.0, &catalog))
            .collect::<Result<Vec<_>, _>>()?;
        let enemy_side = enemies
            .iter()
            .map(|def| {
                CombatantState::from_definition(
                    def.clone(),
                    Side::Enemy,
                    profile.stat_multiplier,
                    &catalog,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (abort_tx, abort_rx) = watch::channel(false);
        Ok(Self {
            state: BattleState::new(battle_id.into(), player_side, enemy_side),
            scheduler: CombatScheduler::new(),
            catalog,
            table: Box::new(StandardElementTable),
            ai: HeuristicAi::new(),
            profile,
            rng,
            bus: EventBus::new(),
            log: CombatLog::default(),
            abort_tx: Arc::new(abort_tx),
            abort_rx,
        })
    }

    /// Swaps in a campaign-specific elemental chart.
    pub fn with_element_table(mut self, table: Box<dyn ElementTable>) -> Self {
        self.table = table;
        self
    }

    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle {
            tx: Arc::clone(&self.abort_tx),
        }
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn log(&self) -> &CombatLog {
        &self.log
    }

    fn is_aborted(&self) -> bool {
        *self.abort_rx.borrow()
    }

    /// Drives the battle to completion and reports the outcome. Exactly one
    /// combatant is active at a time, for the whole of its action including
    /// every hit and follow-up.
    pub async fn run(
        &mut self,
        input: &dyn PlayerInputSource,
        sink: &dyn PresentationSink,
    ) -> BattleOutcome {
        loop {
            if self.is_aborted() {
                self.scheduler.abort(&mut self.state, &mut self.bus);
                self.flush(sink);
                break;
            }
            let step = self.scheduler.advance(&mut self.state, &mut self.bus);
            self.flush(sink);
            match step {
                SchedulerStep::Finished { .. } => break,
                SchedulerStep::TurnReady { id } => {
                    let flow = self.take_turn(id, input, sink).await;
                    self.flush(sink);
                    if matches!(flow, TurnFlow::Aborted) {
                        continue;
                    }
                    if self
                        .scheduler
                        .action_resolved(&mut self.state, &mut self.bus)
                        .is_some()
                    {
                        self.flush(sink);
                        break;
                    }
                }
            }
        }
        self.outcome()
    }

    /// Resolves one combatant's turn: decision, presentation suspensions,
    /// then synchronous execution through the command layer.
    async fn take_turn(
        &mut self,
        id: CombatantId,
        input: &dyn PlayerInputSource,
        sink: &dyn PresentationSink,
    ) -> TurnFlow {
        let decision = match id.side {
            Side::Player => {
                let mut abort = self.abort_rx.clone();
                if *abort.borrow() {
                    return TurnFlow::Aborted;
                }
                tokio::select! {
                    _ = abort.changed() => return TurnFlow::Aborted,
                    choice = input.request_action(
                        &self.state,
                        &self.catalog,
                        self.table.as_ref(),
                        id,
                        &mut self.rng,
                    ) => choice,
                }
            }
            Side::Enemy => self
                .ai
                .decide(
                    &self.state,
                    id,
                    &self.catalog,
                    self.table.as_ref(),
                    &self.profile,
                    &mut self.rng,
                )
                .map(|decision| PlayerChoice {
                    action: decision.action,
                    targets: decision.targets,
                }),
        };

        let Some(choice) = decision else {
            self.bus.push(CombatEvent::TurnForfeited { actor: id });
            self.state.combatant_mut(id).has_acted = true;
            return TurnFlow::Completed;
        };

        let Some(definition) = self.catalog.get(choice.action).cloned() else {
            self.bus.push(CombatEvent::ActionRejected {
                actor: id,
                reason: ActionFailureReason::UnknownAction,
            });
            self.state.combatant_mut(id).has_acted = true;
            return TurnFlow::Completed;
        };

        let timing = if definition.is_attack() {
            let first_target = choice.targets.first().copied();
            let mut abort = self.abort_rx.clone();
            if *abort.borrow() {
                return TurnFlow::Aborted;
            }
            if definition.melee {
                if let Some(target) = first_target {
                    tokio::select! {
                        _ = abort.changed() => return TurnFlow::Aborted,
                        _ = sink.approach_target(id, target) => {}
                    }
                }
            }
            tokio::select! {
                _ = abort.changed() => return TurnFlow::Aborted,
                timing = sink.attack_animation(&self.state, id, &definition, first_target) => timing,
            }
        } else {
            TimingQuality::Normal
        };

        if let Err(reason) = executor::execute_action(
            &mut self.state,
            &self.catalog,
            self.table.as_ref(),
            id,
            choice.action,
            &choice.targets,
            timing,
            &mut self.rng,
            &mut self.bus,
        ) {
            tracing::debug!(actor = self.state.name_of(id), %reason, "action rejected");
            self.bus.push(CombatEvent::ActionRejected { actor: id, reason });
            self.state.combatant_mut(id).has_acted = true;
        }
        TurnFlow::Completed
    }

    /// Drains buffered events into the combat log and forwards the visual
    /// ones to the presentation sink.
    fn flush(&mut self, sink: &dyn PresentationSink) {
        for event in self.bus.take() {
            self.log.record(&event, &self.state);
            match &event {
                CombatEvent::HitLanded {
                    target,
                    damage,
                    critical,
                    ..
                } => sink.damage_number(*target, *damage, *critical),
                CombatEvent::CombatantDied { target } => sink.death(*target),
                _ => {}
            }
        }
    }

    /// The reportable outcome as of now. Before the battle ends this reads
    /// as aborted.
    pub fn outcome(&self) -> BattleOutcome {
        let result = self.scheduler.outcome().unwrap_or(CombatOutcome::Aborted);
        let survivors = self
            .state
            .living_ids(Side::Player)
            .into_iter()
            .map(|id| self.state.name_of(id).to_string())
            .collect();
        BattleOutcome {
            battle_id: self.state.battle_id.clone(),
            result,
            rounds: self.state.round,
            survivors,
        }
    }
}
