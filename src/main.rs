use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use fleet_duel::ui::{self, Command};
use fleet_duel::{
    init_logging, Difficulty, GameMode, GameObserver, GameSettings, JsonHistory, MemoryHistory,
    PhaseKind, PlayerSettings, Session, SharedHistory, Side, TokioScheduler,
};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Debug)]
struct GameArgs {
    /// TOML settings file. Flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum)]
    mode: Option<GameMode>,
    /// Strength of the (first) computer player.
    #[arg(long, value_enum)]
    difficulty: Option<Difficulty>,
    #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
    seed: Option<u64>,
    /// Pause before each computer shot, in milliseconds.
    #[arg(long)]
    delay_ms: Option<u64>,
    /// JSON-lines file with the play history used by the hard computer.
    #[arg(long)]
    history: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play against the computer in the terminal.
    Play {
        #[command(flatten)]
        game: GameArgs,
        #[arg(long, default_value = "Player")]
        name: String,
    },
    /// Watch two computers play each other.
    Watch {
        #[command(flatten)]
        game: GameArgs,
        /// Strength of the second computer.
        #[arg(long, value_enum, default_value_t = Difficulty::Medium)]
        opponent: Difficulty,
    },
}

/// Prints phase changes as they happen.
struct Announcer;

impl GameObserver for Announcer {
    fn on_phase_change(&mut self, kind: PhaseKind) {
        println!("\n=== {} phase ===", kind);
    }
}

fn load_settings(args: &GameArgs) -> anyhow::Result<GameSettings> {
    let mut settings = match &args.config {
        Some(path) => GameSettings::load(path)?,
        None => GameSettings::default(),
    };
    if let Some(mode) = args.mode {
        settings.mode = mode;
    }
    if let Some(delay) = args.delay_ms {
        settings.computer_delay_ms = delay;
    }
    if let Some(path) = &args.history {
        settings.history_path = Some(path.clone());
    }
    Ok(settings)
}

fn open_history(settings: &GameSettings) -> anyhow::Result<SharedHistory> {
    let history: SharedHistory = match &settings.history_path {
        Some(path) => Rc::new(RefCell::new(
            JsonHistory::open(path).with_context(|| "opening play history")?,
        )),
        None => MemoryHistory::shared(),
    };
    Ok(history)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Play { game, name } => {
            let mut settings = load_settings(&game)?;
            let difficulty = game
                .difficulty
                .unwrap_or(settings.players[1].difficulty);
            settings.players = [
                PlayerSettings::human(name),
                PlayerSettings::computer(format!("{difficulty:?} computer"), difficulty),
            ];
            if let Some(s) = game.seed {
                println!("Using fixed seed: {} (game will be reproducible)", s);
            }
            play(settings, game.seed).await
        }
        Commands::Watch { game, opponent } => {
            let mut settings = load_settings(&game)?;
            let first = game.difficulty.unwrap_or(Difficulty::Medium);
            settings.players = [
                PlayerSettings::computer(format!("{first:?} computer 1"), first),
                PlayerSettings::computer(format!("{opponent:?} computer 2"), opponent),
            ];
            watch(settings, game.seed).await
        }
    }
}

async fn play(settings: GameSettings, seed: Option<u64>) -> anyhow::Result<()> {
    let history = open_history(&settings)?;
    let (scheduler, mut timers) = TokioScheduler::new();
    let mut session = Session::new(settings, history, Box::new(scheduler), seed);
    session.set_observer(Box::new(Announcer));
    session.start();

    let viewer = session
        .players()
        .iter()
        .position(|p| p.is_human())
        .unwrap_or(0);
    println!("{}", ui::HELP);
    show(&session, viewer);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let Some(command) = ui::parse_command(&line) else {
                    println!("Invalid input");
                    continue;
                };
                if !handle(&mut session, command) {
                    break;
                }
                show(&session, viewer);
            }
            Some(ticket) = timers.recv() => {
                if session.fire(ticket) {
                    show(&session, viewer);
                }
            }
        }
    }
    Ok(())
}

/// Apply one command. Returns false to quit.
fn handle(session: &mut Session, command: Command) -> bool {
    let accepted = match command {
        Command::Cell(at) => {
            let side = match session.phase_kind() {
                PhaseKind::Placement | PhaseKind::ExtendedPlacement => Side::Own,
                _ => Side::Opponent,
            };
            session.attempt_cell_action(at.x, at.y, side).succeeded
        }
        Command::Select(at) => session.attempt_cell_action(at.x, at.y, Side::Own).succeeded,
        Command::Confirm => session.confirm_selection(),
        Command::Rotate => session.toggle_orientation(),
        Command::Auto => session.auto_place_remaining().succeeded,
        Command::Log => {
            println!("{}", session.log().text());
            true
        }
        Command::Restart => {
            session.restart();
            true
        }
        Command::Help => {
            println!("{}", ui::HELP);
            true
        }
        Command::Quit => return false,
    };
    if !accepted {
        println!("Not possible right now.");
    }
    true
}

fn show(session: &Session, viewer: usize) {
    println!("\n{}", ui::render_player_view(session, viewer));
    for entry in session.log().recent(3) {
        println!("{entry}");
    }
    println!("{}", ui::status_line(session));
}

async fn watch(settings: GameSettings, seed: Option<u64>) -> anyhow::Result<()> {
    let history = open_history(&settings)?;
    let (scheduler, mut timers) = TokioScheduler::new();
    let mut session = Session::new(settings, history, Box::new(scheduler), seed);
    session.set_observer(Box::new(Announcer));
    session.start();

    while !session.is_over() {
        if !session.has_pending_timer() {
            break;
        }
        let Some(ticket) = timers.recv().await else {
            break;
        };
        if session.fire(ticket) {
            show(&session, 0);
        }
    }
    println!("\n{}", session.log().text());
    println!("{}", ui::status_line(&session));
    Ok(())
}
