use crate::battle::resolver::ElementTable;
use crate::battle::session::{
    AutoPilot, CombatSession, HeadlessSink, PlayerChoice, PlayerInputSource, PresentationSink,
};
use crate::battle::state::{BattleRng, BattleState, CombatOutcome, TimingQuality};
use crate::battle::tests::common::{attack_action, catalog_of, id};
use crate::bestiary;
use crate::catalog::ActionCatalog;
use crate::combatant::{CombatantId, Side};
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use schema::{ActionDefinition, BaseStats, CreatureDefinition, DifficultyProfile, Element};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

fn demo_session(seed: u64) -> CombatSession {
    CombatSession::new(
        "test",
        &bestiary::demo_player_roster(),
        &bestiary::demo_enemy_roster(),
        ActionCatalog::builtin(),
        DifficultyProfile::normal(),
        BattleRng::seeded(seed),
    )
    .expect("demo rosters resolve against the builtin catalog")
}

fn creature(name: &str, speed: u32, max_hp: u32, actions: &[&str]) -> CreatureDefinition {
    CreatureDefinition {
        name: name.to_string(),
        element: Element::Neutral,
        stats: BaseStats {
            max_hp,
            attack: 10,
            defense: 5,
            speed,
            max_energy: 100,
        },
        actions: actions.iter().map(|s| s.to_string()).collect(),
    }
}

/// Hands out a fixed queue of choices, then forfeits.
struct ScriptedInput(Mutex<VecDeque<PlayerChoice>>);

impl ScriptedInput {
    fn new(choices: Vec<PlayerChoice>) -> Self {
        Self(Mutex::new(choices.into()))
    }
}

#[async_trait]
impl PlayerInputSource for ScriptedInput {
    async fn request_action(
        &self,
        _battle: &BattleState,
        _catalog: &ActionCatalog,
        _table: &dyn ElementTable,
        _actor: CombatantId,
        _rng: &mut BattleRng,
    ) -> Option<PlayerChoice> {
        self.0.lock().unwrap().pop_front()
    }
}

/// Records everything forwarded to the presentation layer and answers every
/// attack with a fixed timing.
#[derive(Default)]
struct RecordingSink {
    timing: TimingQuality,
    animations: Mutex<u32>,
    approaches: Mutex<u32>,
    damage_numbers: Mutex<Vec<(CombatantId, u32, bool)>>,
    deaths: Mutex<Vec<CombatantId>>,
}

impl RecordingSink {
    fn with_timing(timing: TimingQuality) -> Self {
        Self {
            timing,
            ..Default::default()
        }
    }
}

#[async_trait]
impl PresentationSink for RecordingSink {
    async fn attack_animation(
        &self,
        _battle: &BattleState,
        _attacker: CombatantId,
        _action: &ActionDefinition,
        _target: Option<CombatantId>,
    ) -> TimingQuality {
        *self.animations.lock().unwrap() += 1;
        self.timing
    }

    async fn approach_target(&self, _attacker: CombatantId, _target: CombatantId) {
        *self.approaches.lock().unwrap() += 1;
    }

    fn death(&self, target: CombatantId) {
        self.deaths.lock().unwrap().push(target);
    }

    fn damage_number(&self, target: CombatantId, amount: u32, critical: bool) {
        self.damage_numbers.lock().unwrap().push((target, amount, critical));
    }
}

/// A hero with a melee 30-power strike against a 40 HP dummy that hits back.
/// Perfect timing one-shots the dummy; a miss leaves it standing.
fn duel_session() -> (CombatSession, PlayerChoice) {
    let mut smite = attack_action("Smite", 30);
    smite.melee = true;
    smite.kind = schema::ActionKind::Attack {
        power: 30,
        hits: 1,
        adds_attack_stat: false,
        divide_power_per_hit: false,
        ignores_defense: true,
        crit_chance: 0,
        crit_multiplier: 1.5,
    };
    let catalog = catalog_of(vec![smite]);
    let action = catalog.id_of("Smite").unwrap();

    let session = CombatSession::new(
        "duel",
        &[creature("Hero", 20, 100, &["Smite"])],
        &[creature("Dummy", 1, 40, &["Smite"])],
        catalog,
        DifficultyProfile::normal(),
        BattleRng::scripted(vec![100; 40]),
    )
    .unwrap();
    let choice = PlayerChoice {
        action,
        targets: vec![id(Side::Enemy, 0)],
    };
    (session, choice)
}

#[tokio::test]
async fn a_perfect_one_shot_wins_in_one_round() {
    let (mut session, choice) = duel_session();
    let sink = RecordingSink::with_timing(TimingQuality::Perfect);

    let outcome = session.run(&ScriptedInput::new(vec![choice]), &sink).await;

    // round(30 * 1.5) = 45 into a 40 HP target.
    assert_eq!(outcome.result, CombatOutcome::Victory);
    assert_eq!(outcome.rounds, 1);
    assert_eq!(outcome.survivors, vec!["Hero".to_string()]);
    assert_eq!(*sink.animations.lock().unwrap(), 1);
    // Smite is melee, so the hero closed in first.
    assert_eq!(*sink.approaches.lock().unwrap(), 1);
    assert_eq!(
        *sink.damage_numbers.lock().unwrap(),
        vec![(id(Side::Enemy, 0), 40, false)]
    );
    assert_eq!(*sink.deaths.lock().unwrap(), vec![id(Side::Enemy, 0)]);
    assert!(session
        .log()
        .entries()
        .any(|line| line.contains("took 40 damage")));
}

#[tokio::test]
async fn a_missed_timing_weakens_the_same_attack() {
    let (mut session, choice) = duel_session();
    let sink = RecordingSink::with_timing(TimingQuality::Miss);

    let outcome = session.run(&ScriptedInput::new(vec![choice]), &sink).await;

    // round(30 * 0.8) = 24: the dummy survives on 16 HP, the hero forfeits
    // every later turn and is ground down.
    assert_eq!(outcome.result, CombatOutcome::Defeat);
    let first_damage = sink.damage_numbers.lock().unwrap()[0];
    assert_eq!(first_damage, (id(Side::Enemy, 0), 24, false));
    assert_eq!(session.state().enemies[0].current_hp, 16);
}

#[tokio::test]
async fn same_seed_same_battle() {
    let mut first = demo_session(1234);
    let first_outcome = first.run(&AutoPilot::default(), &HeadlessSink).await;
    let first_log: Vec<String> = first.log().entries().map(String::from).collect();

    let mut second = demo_session(1234);
    let second_outcome = second.run(&AutoPilot::default(), &HeadlessSink).await;
    let second_log: Vec<String> = second.log().entries().map(String::from).collect();

    assert_eq!(first_outcome.result, second_outcome.result);
    assert_eq!(first_outcome.rounds, second_outcome.rounds);
    assert_eq!(first_log, second_log);
}

#[tokio::test]
async fn a_seeded_autopilot_battle_runs_to_a_decision() {
    let mut session = demo_session(7);
    let outcome = session.run(&AutoPilot::default(), &HeadlessSink).await;

    assert!(matches!(
        outcome.result,
        CombatOutcome::Victory | CombatOutcome::Defeat
    ));
    assert!(outcome.rounds >= 1);
    assert!(!session.log().is_empty());
    assert!(session.state().is_over());
}

#[tokio::test]
async fn aborting_before_the_first_turn_ends_the_battle_unresolved() {
    let mut session = demo_session(7);
    session.abort_handle().abort();

    let outcome = session.run(&AutoPilot::default(), &HeadlessSink).await;

    assert_eq!(outcome.result, CombatOutcome::Aborted);
    assert!(session
        .log()
        .entries()
        .any(|line| line.contains("called off")));
}

#[tokio::test(start_paused = true)]
async fn aborting_resolves_a_pending_player_suspension() {
    struct StallingInput;

    #[async_trait]
    impl PlayerInputSource for StallingInput {
        async fn request_action(
            &self,
            _battle: &BattleState,
            _catalog: &ActionCatalog,
            _table: &dyn ElementTable,
            _actor: CombatantId,
            _rng: &mut BattleRng,
        ) -> Option<PlayerChoice> {
            std::future::pending().await
        }
    }

    let mut session = demo_session(7);
    let handle = session.abort_handle();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();
    });

    let outcome = session.run(&StallingInput, &HeadlessSink).await;
    assert_eq!(outcome.result, CombatOutcome::Aborted);
    assert!(session.state().is_over());
}

#[tokio::test]
async fn a_forfeited_player_turn_still_advances_the_battle() {
    let catalog = catalog_of(vec![attack_action("Strike", 30)]);
    let mut session = CombatSession::new(
        "forfeit",
        &[creature("Mute", 20, 100, &["Strike"])],
        &[creature("Basher", 10, 100, &["Strike"])],
        catalog,
        DifficultyProfile {
            strategic_thinking_chance: 100,
            stat_multiplier: 1.0,
        },
        BattleRng::scripted(vec![1; 60]),
    )
    .unwrap();

    // The player never answers; the enemy grinds the battle out alone.
    let outcome = session.run(&ScriptedInput::new(vec![]), &HeadlessSink).await;

    assert_eq!(outcome.result, CombatOutcome::Defeat);
    assert!(session
        .log()
        .entries()
        .any(|line| line.contains("hesitates")));
}
