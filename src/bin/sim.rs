use clap::ValueEnum;
use fleet_duel::{
    init_logging_with_default, Difficulty, GameMode, GameSettings, ManualScheduler,
    MemoryHistory, PlayerSettings, Session,
};
use log::LevelFilter;
use serde_json::json;

/// Upper bound on delivered timers; a 10x10 match needs at most 200 shots.
const MAX_TICKS: usize = 10_000;

fn main() -> anyhow::Result<()> {
    init_logging_with_default(LevelFilter::Warn);
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args.len() > 5 {
        eprintln!(
            "Usage: {} <seed> [difficulty1] [difficulty2] [standard|extended]",
            args[0]
        );
        std::process::exit(1);
    }
    let seed: u64 = args[1].parse()?;
    let parse_difficulty = |i: usize| -> anyhow::Result<Difficulty> {
        match args.get(i) {
            Some(s) => Difficulty::from_str(s, true).map_err(|e| anyhow::anyhow!(e)),
            None => Ok(Difficulty::Medium),
        }
    };
    let first = parse_difficulty(2)?;
    let second = parse_difficulty(3)?;
    let mode = match args.get(4) {
        Some(s) => GameMode::from_str(s, true).map_err(|e| anyhow::anyhow!(e))?,
        None => GameMode::Standard,
    };

    let settings = GameSettings {
        mode,
        players: [
            PlayerSettings::computer("player1", first),
            PlayerSettings::computer("player2", second),
        ],
        computer_delay_ms: 0,
        ..GameSettings::default()
    };

    let scheduler = ManualScheduler::new();
    let mut session = Session::new(
        settings,
        MemoryHistory::shared(),
        Box::new(scheduler.clone()),
        Some(seed),
    );
    session.start();

    let mut ticks = 0;
    while let Some(ticket) = scheduler.pop() {
        session.fire(ticket);
        ticks += 1;
        if ticks >= MAX_TICKS {
            anyhow::bail!("simulation did not finish after {MAX_TICKS} shots");
        }
    }

    let summary = |i: usize| {
        let players = session.players();
        let me = &players[i];
        let target = players[1 - i].board();
        let shots = target.cells().filter(|c| c.is_shot()).count();
        let hits = target.cells().filter(|c| c.is_hit()).count();
        json!({
            "name": me.name(),
            "difficulty": me.ai().map(|c| format!("{:?}", c.difficulty())),
            "shots": shots,
            "hits": hits,
            "lost": me.has_lost(),
        })
    };

    let result = json!({
        "seed": seed,
        "mode": format!("{:?}", mode),
        "phase": session.phase_kind().to_string(),
        "player1": summary(0),
        "player2": summary(1),
        "winner": session.winner().map(|p| p.name().to_owned()),
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
