//! Wildclash Battle Engine
//!
//! A deterministic turn-based battle core for a monster-collection RPG. Two
//! rosters resolve rounds of speed-ordered turns; actions deal damage, heal,
//! or apply timed effects; combat ends when one side has no living members.
//! Presentation and player input are async collaborators the core suspends
//! on; it owns no rendering, persistence or UI.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod bestiary;
pub mod catalog;
pub mod combatant;
pub mod errors;

// --- PUBLIC API RE-EXPORTS ---
// The public-facing API of the `wildclash` crate: the most important types
// importable directly from the crate root.

// --- From the `schema` crate ---
// Re-export the static data model.
pub use schema::{
    ActionDefinition,
    ActionId,
    ActionKind,
    BaseStats,
    CreatureDefinition,
    DifficultyProfile,
    Element,
    StatKind,
    StatModifierTemplate,
    StatusEffectTemplate,
    TargetPattern,
};

// --- From this crate's modules (`src/`) ---

// Core battle state and events.
pub use battle::state::{
    ActionFailureReason, BattleRng, BattleState, CombatEvent, CombatLog, CombatOutcome,
    CombatPhase, EventBus, TimingQuality,
};

// The session façade and its collaborator interfaces.
pub use battle::session::{
    AbortHandle, AutoPilot, BattleOutcome, CombatSession, HeadlessSink, PlayerChoice,
    PlayerInputSource, PresentationSink,
};

// Scheduling, damage math and AI.
pub use battle::ai::{AiDecision, AiReasoning, Decider, HeuristicAi};
pub use battle::resolver::{ElementTable, HitOutcome, StandardElementTable};
pub use battle::scheduler::{build_turn_order, CombatScheduler, SchedulerStep, TurnOrderEntry};

// Runtime combatant types and static data access.
pub use catalog::ActionCatalog;
pub use combatant::{ActiveModifier, ActiveStatusEffect, CombatantId, CombatantState, Side};

// Crate-specific error and result types.
pub use errors::{DataError, DataResult};
