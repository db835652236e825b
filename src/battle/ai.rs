//! Decision-making for non-player combatants.
//!
//! The engine rolls once per turn against the difficulty profile's strategic
//! thinking chance: success takes a fixed-priority strategic path, failure
//! picks uniformly among whatever is usable.

use crate::battle::resolver::ElementTable;
use crate::battle::state::{BattleRng, BattleState};
use crate::catalog::ActionCatalog;
use crate::combatant::CombatantId;
use ordered_float::OrderedFloat;
use schema::{ActionId, DifficultyProfile, TargetPattern};

/// A resolved choice: which action, against whom, and which heuristic made
/// the call. Transient; consumed by the session the same turn.
#[derive(Debug, Clone, PartialEq)]
pub struct AiDecision {
    pub action: ActionId,
    pub targets: Vec<CombatantId>,
    pub reasoning: AiReasoning,
}

/// Which tier of the decision ladder produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiReasoning {
    EmergencyHeal,
    Ultimate,
    OpeningBuff,
    ElementalEdge,
    StrongestAttack,
    Improvised,
}

/// A trait for any system that can decide a combatant's next action.
pub trait Decider {
    /// Inspects the battle and decides. `None` means the turn is forfeited.
    fn decide(
        &self,
        battle: &BattleState,
        actor: CombatantId,
        catalog: &ActionCatalog,
        table: &dyn ElementTable,
        profile: &DifficultyProfile,
        rng: &mut BattleRng,
    ) -> Option<AiDecision>;
}

/// The stock tiered heuristic engine.
pub struct HeuristicAi;

impl HeuristicAi {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HeuristicAi {
    fn default() -> Self {
        Self::new()
    }
}

impl Decider for HeuristicAi {
    fn decide(
        &self,
        battle: &BattleState,
        actor: CombatantId,
        catalog: &ActionCatalog,
        table: &dyn ElementTable,
        profile: &DifficultyProfile,
        rng: &mut BattleRng,
    ) -> Option<AiDecision> {
        let usable = battle.combatant(actor).usable_actions(catalog);
        if usable.is_empty() {
            return None;
        }

        let strategic = rng.roll("Strategic Thinking") <= profile.strategic_thinking_chance;
        let decision = if strategic {
            strategic_path(battle, actor, &usable, catalog, table, rng)
        } else {
            random_path(battle, actor, &usable, catalog, rng)
        };
        if let Some(decision) = &decision {
            tracing::debug!(
                actor = battle.name_of(actor),
                action = ?decision.action,
                reasoning = ?decision.reasoning,
                "ai decision"
            );
        }
        decision
    }
}

/// Fixed priority, first match wins:
/// 1. emergency heal below 30% HP;
/// 2. an ultimate from round 2 on, behind a 30% roll;
/// 3. an opening buff before round 3, behind a 40% roll;
/// 4. the attack with the strictly best elemental matchup;
/// 5. the hardest-hitting attack.
fn strategic_path(
    battle: &BattleState,
    actor: CombatantId,
    usable: &[ActionId],
    catalog: &ActionCatalog,
    table: &dyn ElementTable,
    rng: &mut BattleRng,
) -> Option<AiDecision> {
    let me = battle.combatant(actor);

    // 1. Emergency heal.
    if me.hp_ratio() < 0.30 {
        let heal = usable
            .iter()
            .filter(|&&id| catalog.get(id).map(|d| d.is_heal()).unwrap_or(false))
            .max_by_key(|&&id| catalog.get(id).map(|d| d.base_power()).unwrap_or(0))
            .copied();
        if let Some(action) = heal {
            return Some(AiDecision {
                action,
                targets: vec![actor],
                reasoning: AiReasoning::EmergencyHeal,
            });
        }
    }

    // 2. Ultimate, once the battle has developed.
    if battle.round >= 2 {
        let ultimates: Vec<ActionId> = usable
            .iter()
            .copied()
            .filter(|&id| catalog.get(id).map(|d| d.ultimate).unwrap_or(false))
            .collect();
        if !ultimates.is_empty() && rng.roll("Ultimate Gambit") <= 30 {
            let action = ultimates[rng.pick(ultimates.len(), "Ultimate Pick")];
            let pattern = catalog.get(action).map(|d| d.target)?;
            let targets = resolve_targets(battle, actor, pattern, rng);
            return Some(AiDecision {
                action,
                targets,
                reasoning: AiReasoning::Ultimate,
            });
        }
    }

    // 3. Opening buff.
    if battle.round < 3 {
        let buffs: Vec<ActionId> = usable
            .iter()
            .copied()
            .filter(|&id| {
                catalog
                    .get(id)
                    .map(|d| d.is_buff() && !d.ultimate)
                    .unwrap_or(false)
            })
            .collect();
        if !buffs.is_empty() && rng.roll("Opening Buff") <= 40 {
            let action = buffs[rng.pick(buffs.len(), "Buff Pick")];
            let pattern = catalog.get(action).map(|d| d.target)?;
            let targets = resolve_targets(battle, actor, pattern, rng);
            return Some(AiDecision {
                action,
                targets,
                reasoning: AiReasoning::OpeningBuff,
            });
        }
    }

    // 4/5. Attacks: resolve targets per candidate, then weigh the elemental
    // matchup against the first resolved target.
    let attacks: Vec<(ActionId, Vec<CombatantId>, f32, u32)> = usable
        .iter()
        .copied()
        .filter_map(|id| {
            let definition = catalog.get(id)?;
            if !definition.is_attack() || definition.ultimate {
                return None;
            }
            let targets = resolve_targets(battle, actor, definition.target, rng);
            let elemental = targets
                .first()
                .map(|&t| table.advantage(me.element(), battle.combatant(t).element()))
                .unwrap_or(1.0);
            Some((id, targets, elemental, definition.base_power()))
        })
        .collect();
    if attacks.is_empty() {
        return None;
    }

    // An attack wins on matchup only if its multiplier strictly beats every
    // other candidate's; ties fall through to raw power.
    let best = attacks
        .iter()
        .max_by_key(|candidate| OrderedFloat(candidate.2))?;
    let contested = attacks
        .iter()
        .filter(|candidate| OrderedFloat(candidate.2) == OrderedFloat(best.2))
        .count()
        > 1;
    if !contested && best.2 > 0.0 {
        return Some(AiDecision {
            action: best.0,
            targets: best.1.clone(),
            reasoning: AiReasoning::ElementalEdge,
        });
    }

    let strongest = attacks
        .iter()
        .fold(None::<&(ActionId, Vec<CombatantId>, f32, u32)>, |acc, candidate| {
            match acc {
                Some(current) if current.3 >= candidate.3 => Some(current),
                _ => Some(candidate),
            }
        })?;
    Some(AiDecision {
        action: strongest.0,
        targets: strongest.1.clone(),
        reasoning: AiReasoning::StrongestAttack,
    })
}

/// Uniform pick over everything usable, targets by pattern.
fn random_path(
    battle: &BattleState,
    actor: CombatantId,
    usable: &[ActionId],
    catalog: &ActionCatalog,
    rng: &mut BattleRng,
) -> Option<AiDecision> {
    let action = usable[rng.pick(usable.len(), "Improvised Pick")];
    let pattern = catalog.get(action)?.target;
    let targets = resolve_targets(battle, actor, pattern, rng);
    Some(AiDecision {
        action,
        targets,
        reasoning: AiReasoning::Improvised,
    })
}

/// Resolves a target pattern into concrete living combatants.
///
/// `SingleEnemy` prefers the most wounded opponent below 40% HP and otherwise
/// picks uniformly; the group patterns take every living member of the
/// relevant roster.
pub fn resolve_targets(
    battle: &BattleState,
    actor: CombatantId,
    pattern: TargetPattern,
    rng: &mut BattleRng,
) -> Vec<CombatantId> {
    let opponents = battle.living_ids(actor.side.opponent());
    match pattern {
        TargetPattern::User => vec![actor],
        TargetPattern::SingleEnemy => {
            if opponents.is_empty() {
                return Vec::new();
            }
            let wounded = opponents
                .iter()
                .copied()
                .filter(|&id| battle.combatant(id).hp_ratio() < 0.40)
                .min_by_key(|&id| battle.combatant(id).current_hp);
            match wounded {
                Some(id) => vec![id],
                None => vec![opponents[rng.pick(opponents.len(), "Single Target")]],
            }
        }
        TargetPattern::AllEnemies => opponents,
        TargetPattern::AllAllies => battle.living_ids(actor.side),
        TargetPattern::RandomEnemy => {
            if opponents.is_empty() {
                return Vec::new();
            }
            vec![opponents[rng.pick(opponents.len(), "Random Target")]]
        }
    }
}
