use tracing_subscriber::EnvFilter;
use wildclash::{
    bestiary, ActionCatalog, AutoPilot, BattleRng, CombatSession, DifficultyProfile, HeadlessSink,
};

/// Runs a seeded autopilot battle between the demo rosters and prints the
/// combat log plus the outcome payload reward systems would receive.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let seed: u64 = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(0xC0FFEE);

    let catalog = ActionCatalog::builtin();
    let mut session = match CombatSession::new(
        format!("demo-{seed}"),
        &bestiary::demo_player_roster(),
        &bestiary::demo_enemy_roster(),
        catalog,
        DifficultyProfile::normal(),
        BattleRng::seeded(seed),
    ) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("Error setting up battle: {}", err);
            return;
        }
    };

    let outcome = session.run(&AutoPilot::default(), &HeadlessSink).await;

    for line in session.log().entries() {
        println!("{}", line);
    }
    println!();
    match serde_json::to_string_pretty(&outcome) {
        Ok(payload) => println!("{}", payload),
        Err(err) => eprintln!("Error serializing outcome: {}", err),
    }
}
