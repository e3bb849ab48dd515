mod ai;
mod board;
mod common;
mod config;
mod game_log;
mod history;
mod logging;
mod object;
pub mod phase;
mod player;
mod session;
mod timer;
pub mod ui;

pub use ai::*;
pub use board::*;
pub use common::*;
pub use config::*;
pub use game_log::*;
pub use history::*;
pub use logging::{init_logging, init_logging_with_default, LOG_ENV};
pub use object::*;
pub use phase::{
    EndPhase, ExtendedShootingPhase, Outcome, Phase, PhaseContext, PhaseKind, PlacementPhase,
    Preview, ShootingPhase, Side,
};
pub use player::*;
pub use session::*;
pub use timer::*;
