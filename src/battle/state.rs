use crate::combatant::{CombatantId, CombatantState, Side};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use schema::StatKind;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// The scheduler's state machine. One round is a RoundStart upkeep pass
/// followed by the player phase and the enemy phase.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Copy)]
pub enum CombatPhase {
    RoundStart,
    PlayerPhase,
    EnemyPhase,
    Ended,
}

/// How a finished battle came out, from the player's point of view.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatOutcome {
    Victory,
    Defeat,
    Aborted,
}

/// Outcome of the attack-timing minigame, reported by the presentation layer
/// when an attack animation completes. Feeds a damage multiplier.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimingQuality {
    Perfect,
    #[default]
    Normal,
    Miss,
}

impl TimingQuality {
    pub fn multiplier(self) -> f32 {
        match self {
            TimingQuality::Perfect => 1.5,
            TimingQuality::Normal => 1.0,
            TimingQuality::Miss => 0.8,
        }
    }
}

/// Why an action use was rejected. Rejection is local and non-fatal: the
/// turn still completes and the reason only surfaces on the combat log.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionFailureReason {
    NotAlive,
    AlreadyActed,
    InsufficientEnergy,
    OnCooldown,
    UnknownAction,
}

impl std::fmt::Display for ActionFailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionFailureReason::NotAlive => write!(f, "it is down"),
            ActionFailureReason::AlreadyActed => write!(f, "it already acted this round"),
            ActionFailureReason::InsufficientEnergy => write!(f, "not enough energy"),
            ActionFailureReason::OnCooldown => write!(f, "still on cooldown"),
            ActionFailureReason::UnknownAction => write!(f, "no such action"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum CombatEvent {
    // Round/phase flow
    RoundStarted {
        round: u32,
    },
    PhaseStarted {
        side: Side,
    },
    PhaseSkipped {
        side: Side,
    },

    // Action resolution
    ActionUsed {
        actor: CombatantId,
        action: String,
    },
    ActionRejected {
        actor: CombatantId,
        reason: ActionFailureReason,
    },
    TurnForfeited {
        actor: CombatantId,
    },
    HitLanded {
        attacker: CombatantId,
        target: CombatantId,
        damage: u32,
        critical: bool,
        remaining_hp: i32,
    },
    ElementalEffectiveness {
        multiplier: f32,
    },
    Healed {
        target: CombatantId,
        amount: u32,
        new_hp: i32,
    },

    // Timed effects
    StatusApplied {
        target: CombatantId,
        effect: String,
    },
    StatusDamage {
        target: CombatantId,
        effect: String,
        damage: u32,
        remaining_hp: i32,
    },
    StatusHealed {
        target: CombatantId,
        effect: String,
        amount: u32,
    },
    StatusExpired {
        target: CombatantId,
        effect: String,
    },
    ModifierApplied {
        target: CombatantId,
        stat: StatKind,
        amount: i32,
    },
    ModifierExpired {
        target: CombatantId,
        stat: StatKind,
    },

    // Battle end
    CombatantDied {
        target: CombatantId,
    },
    SideDefeated {
        side: Side,
    },
    CombatEnded {
        outcome: CombatOutcome,
    },
}

impl CombatEvent {
    /// Formats the event into a human-readable string using battle context.
    /// Returns None for silent events that should not reach the combat log.
    pub fn format(&self, battle: &BattleState) -> Option<String> {
        match self {
            CombatEvent::RoundStarted { round } => Some(format!("=== Round {} ===", round)),
            CombatEvent::PhaseStarted { .. } => None,
            CombatEvent::PhaseSkipped { side } => {
                Some(format!("No one on the {} side can act.", side))
            }

            CombatEvent::ActionUsed { actor, action } => {
                Some(format!("{} used {}!", battle.name_of(*actor), action))
            }
            CombatEvent::ActionRejected { actor, reason } => Some(format!(
                "{} can't do that: {}.",
                battle.name_of(*actor),
                reason
            )),
            CombatEvent::TurnForfeited { actor } => {
                Some(format!("{} hesitates and does nothing.", battle.name_of(*actor)))
            }
            CombatEvent::HitLanded {
                target,
                damage,
                critical,
                ..
            } => {
                let name = battle.name_of(*target);
                if *critical {
                    Some(format!("A critical hit! {} took {} damage!", name, damage))
                } else {
                    Some(format!("{} took {} damage!", name, damage))
                }
            }
            CombatEvent::ElementalEffectiveness { multiplier } => match *multiplier {
                m if m > 1.0 => Some("It's devastatingly effective!".to_string()),
                m if m < 1.0 => Some("It's not very effective...".to_string()),
                _ => None,
            },
            CombatEvent::Healed { target, amount, .. } => Some(format!(
                "{} recovered {} HP!",
                battle.name_of(*target),
                amount
            )),

            CombatEvent::StatusApplied { target, effect } => Some(format!(
                "{} is affected by {}!",
                battle.name_of(*target),
                effect
            )),
            CombatEvent::StatusDamage {
                target,
                effect,
                damage,
                ..
            } => Some(format!(
                "{} is hurt by {}! ({} damage)",
                battle.name_of(*target),
                effect,
                damage
            )),
            CombatEvent::StatusHealed {
                target,
                effect,
                amount,
            } => Some(format!(
                "{} is restored by {}! (+{} HP)",
                battle.name_of(*target),
                effect,
                amount
            )),
            CombatEvent::StatusExpired { target, effect } => Some(format!(
                "{}'s {} wore off.",
                battle.name_of(*target),
                effect
            )),
            CombatEvent::ModifierApplied {
                target,
                stat,
                amount,
            } => {
                let name = battle.name_of(*target);
                if *amount >= 0 {
                    Some(format!("{}'s {} rose!", name, stat))
                } else {
                    Some(format!("{}'s {} fell!", name, stat))
                }
            }
            CombatEvent::ModifierExpired { target, stat } => Some(format!(
                "{}'s {} returned to normal.",
                battle.name_of(*target),
                stat
            )),

            CombatEvent::CombatantDied { target } => {
                Some(format!("{} was defeated!", battle.name_of(*target)))
            }
            CombatEvent::SideDefeated { side } => {
                Some(format!("The {} side has fallen!", side))
            }
            CombatEvent::CombatEnded { outcome } => Some(match outcome {
                CombatOutcome::Victory => "Victory! The enemy side is wiped out.".to_string(),
                CombatOutcome::Defeat => "Defeat... the player side is wiped out.".to_string(),
                CombatOutcome::Aborted => "The battle was called off.".to_string(),
            }),
        }
    }
}

/// Event bus collecting everything that happened during battle processing.
/// The session drains it after each step to feed the combat log and the
/// presentation sink.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    events: Vec<CombatEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: CombatEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    /// Removes and returns all buffered events.
    pub fn take(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl std::fmt::Display for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for event in &self.events {
            writeln!(f, "  {:?}", event)?;
        }
        Ok(())
    }
}

pub const DEFAULT_LOG_CAPACITY: usize = 256;

/// Bounded ring buffer of human-readable battle text. Oldest lines fall off
/// the front once the capacity is reached; writers never block or fail.
#[derive(Debug, Clone)]
pub struct CombatLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl CombatLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, line: String) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(line);
    }

    /// Formats the event against the battle state and records it, skipping
    /// silent events.
    pub fn record(&mut self, event: &CombatEvent, battle: &BattleState) {
        if let Some(line) = event.format(battle) {
            self.push(line);
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for CombatLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

/// The one random source for a battle, injected through the session so runs
/// are replayable from a seed and scriptable in tests.
///
/// Rolls are 1..=100 and carry a reason string for debugging; a scripted
/// source that runs dry panics with that reason.
#[derive(Debug, Clone)]
pub struct BattleRng {
    source: RngSource,
}

#[derive(Debug, Clone)]
enum RngSource {
    Seeded(StdRng),
    Scripted { outcomes: Vec<u8>, index: usize },
}

impl BattleRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            source: RngSource::Seeded(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn scripted(outcomes: Vec<u8>) -> Self {
        Self {
            source: RngSource::Scripted { outcomes, index: 0 },
        }
    }

    /// Next percentile roll, 1..=100.
    pub fn roll(&mut self, reason: &str) -> u8 {
        let outcome = match &mut self.source {
            RngSource::Seeded(rng) => rng.random_range(1..=100),
            RngSource::Scripted { outcomes, index } => {
                if *index >= outcomes.len() {
                    panic!(
                        "Scripted BattleRng exhausted! Tried to get a value for: '{}'. Need more outcomes.",
                        reason
                    );
                }
                let outcome = outcomes[*index];
                *index += 1;
                outcome
            }
        };
        tracing::trace!(reason, outcome, "rng roll");
        outcome
    }

    /// Uniform index into a non-empty collection. Collections of one element
    /// are answered without consuming an outcome.
    pub fn pick(&mut self, len: usize, reason: &str) -> usize {
        debug_assert!(len > 0, "pick from empty collection: {}", reason);
        if len <= 1 {
            return 0;
        }
        if let RngSource::Seeded(rng) = &mut self.source {
            return rng.random_range(0..len);
        }
        self.roll(reason) as usize % len
    }
}

/// All mutable battle data: both rosters plus round/phase bookkeeping.
/// Exclusively owned and mutated by the combat core; collaborators only read.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BattleState {
    pub battle_id: String,
    pub players: Vec<CombatantState>,
    pub enemies: Vec<CombatantState>,
    pub round: u32,
    pub phase: CombatPhase,
    /// The combatant currently taking its turn, if any.
    pub active: Option<CombatantId>,
}

impl BattleState {
    pub fn new(
        battle_id: String,
        players: Vec<CombatantState>,
        enemies: Vec<CombatantState>,
    ) -> Self {
        Self {
            battle_id,
            players,
            enemies,
            round: 0,
            phase: CombatPhase::RoundStart,
            active: None,
        }
    }

    pub fn roster(&self, side: Side) -> &[CombatantState] {
        match side {
            Side::Player => &self.players,
            Side::Enemy => &self.enemies,
        }
    }

    pub fn roster_mut(&mut self, side: Side) -> &mut [CombatantState] {
        match side {
            Side::Player => &mut self.players,
            Side::Enemy => &mut self.enemies,
        }
    }

    pub fn combatant(&self, id: CombatantId) -> &CombatantState {
        &self.roster(id.side)[id.index]
    }

    pub fn combatant_mut(&mut self, id: CombatantId) -> &mut CombatantState {
        &mut self.roster_mut(id.side)[id.index]
    }

    pub fn name_of(&self, id: CombatantId) -> &str {
        self.combatant(id).name()
    }

    /// Ids of every living member of a side, in registration order.
    pub fn living_ids(&self, side: Side) -> Vec<CombatantId> {
        self.roster(side)
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_alive())
            .map(|(index, _)| CombatantId { side, index })
            .collect()
    }

    /// A side is defeated exactly when it has no living members.
    pub fn side_defeated(&self, side: Side) -> bool {
        !self.roster(side).iter().any(|c| c.is_alive())
    }

    pub fn is_over(&self) -> bool {
        self.phase == CombatPhase::Ended
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_rng_replays_and_panics_when_dry() {
        let mut rng = BattleRng::scripted(vec![10, 99]);
        assert_eq!(rng.roll("first"), 10);
        assert_eq!(rng.roll("second"), 99);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            rng.roll("third");
        }));
        assert!(result.is_err());
    }

    #[test]
    fn seeded_rng_is_deterministic() {
        let mut a = BattleRng::seeded(42);
        let mut b = BattleRng::seeded(42);
        for _ in 0..32 {
            assert_eq!(a.roll("det"), b.roll("det"));
        }
        assert_eq!(a.pick(5, "det"), b.pick(5, "det"));
    }

    #[test]
    fn rolls_stay_in_percentile_range() {
        let mut rng = BattleRng::seeded(7);
        for _ in 0..200 {
            let roll = rng.roll("range");
            assert!((1..=100).contains(&roll));
        }
    }

    #[test]
    fn combat_log_drops_oldest_when_full() {
        let mut log = CombatLog::new(3);
        for i in 0..5 {
            log.push(format!("line {}", i));
        }
        assert_eq!(log.len(), 3);
        let lines: Vec<&str> = log.entries().collect();
        assert_eq!(lines, vec!["line 2", "line 3", "line 4"]);
    }

    #[test]
    fn timing_multipliers_match_the_design() {
        assert_eq!(TimingQuality::Perfect.multiplier(), 1.5);
        assert_eq!(TimingQuality::Normal.multiplier(), 1.0);
        assert_eq!(TimingQuality::Miss.multiplier(), 0.8);
        assert_eq!(TimingQuality::default(), TimingQuality::Normal);
    }
}
