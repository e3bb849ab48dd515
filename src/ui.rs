//! Terminal presentation: board rendering and command parsing for the
//! binaries. Reads the session, never mutates it.

use std::fmt::Write as _;

use crate::board::{Board, CellState};
use crate::common::Coord;
use crate::phase::PhaseKind;
use crate::session::Session;

/// A line of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Place or shoot at a cell, e.g. `B7`.
    Cell(Coord),
    /// Select an own ship in extended shooting, e.g. `sel B7`.
    Select(Coord),
    /// Confirm the selected ship.
    Confirm,
    /// Rotate the object being placed.
    Rotate,
    /// Place the remaining fleet at random.
    Auto,
    /// Print the game log.
    Log,
    /// Start a new match.
    Restart,
    Quit,
    Help,
}

pub const HELP: &str = "\
commands:
  B7       place at / shoot at B7
  r        rotate the object being placed
  auto     place the rest of your fleet at random
  sel B7   select your ship at B7 (extended mode)
  ok       confirm the selected ship
  log      show the game log
  new      start a new game
  q        quit";

/// Letter of column `x`. Columns past `Z` fall back to their number.
pub fn column_label(x: usize) -> String {
    u8::try_from(x)
        .ok()
        .filter(|&c| c < 26)
        .map(|c| char::from(b'A' + c).to_string())
        .unwrap_or_else(|| x.saturating_add(1).to_string())
}

pub fn coord_to_string(at: Coord) -> String {
    format!("{}{}", column_label(at.x), at.y.saturating_add(1))
}

pub fn parse_coord(input: &str) -> Option<Coord> {
    if input.len() < 2 {
        return None;
    }
    let mut chars = input.chars();
    let col_ch = chars.next()?.to_ascii_uppercase();
    if !col_ch.is_ascii_uppercase() {
        return None;
    }
    let col = (col_ch as u8 - b'A') as usize;
    let row: usize = chars.as_str().parse().ok()?;
    if row == 0 {
        return None;
    }
    Some(Coord::new(col, row - 1))
}

pub fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let head = parts.next()?;
    let cmd = match head.to_ascii_lowercase().as_str() {
        "r" | "rotate" => Command::Rotate,
        "auto" => Command::Auto,
        "ok" | "confirm" => Command::Confirm,
        "log" => Command::Log,
        "new" | "restart" => Command::Restart,
        "q" | "quit" | "exit" => Command::Quit,
        "h" | "help" | "?" => Command::Help,
        "sel" | "select" => Command::Select(parse_coord(parts.next()?)?),
        _ => Command::Cell(parse_coord(head)?),
    };
    Some(cmd)
}

fn cell_char(board: &Board, at: Coord, reveal: bool) -> char {
    match board.cell_state(at) {
        Some(CellState::HitShip) => 'X',
        Some(CellState::HitMine) => '*',
        Some(CellState::Miss) => 'o',
        Some(CellState::Ship) if reveal => 'S',
        Some(CellState::Mine) if reveal => 'M',
        _ if reveal && board.cell(at).is_some_and(|c| c.is_adjacent()) => '+',
        _ => '.',
    }
}

/// Render `board` as text. Unshot objects are only drawn when `reveal` is set.
pub fn render_board(board: &Board, reveal: bool) -> String {
    let mut out = String::from("   ");
    for c in 0..board.width() {
        let _ = write!(out, " {}", column_label(c));
    }
    out.push('\n');
    for r in 0..board.height() {
        let _ = write!(out, "{:2} ", r + 1);
        for c in 0..board.width() {
            let _ = write!(out, " {}", cell_char(board, Coord::new(c, r), reveal));
        }
        out.push('\n');
    }
    out
}

/// Both boards as seen by player `viewer`: opponent on top, own below.
pub fn render_player_view(session: &Session, viewer: usize) -> String {
    let players = session.players();
    let me = &players[viewer];
    let opponent = &players[1 - viewer];
    let reveal_opponent = session.phase_kind() == PhaseKind::End;
    format!(
        "{} board:\n{}\n{} board:\n{}",
        opponent.name(),
        render_board(opponent.board(), reveal_opponent),
        me.name(),
        render_board(me.board(), true)
    )
}

/// One-line status for the prompt.
pub fn status_line(session: &Session) -> String {
    let player = session.current_player();
    match session.phase_kind() {
        PhaseKind::Placement | PhaseKind::ExtendedPlacement => match session.current_object() {
            Some(template) => format!("{}: place {template}", player.name()),
            None => format!("{}: placing", player.name()),
        },
        PhaseKind::Shooting => format!("{}: fire", player.name()),
        PhaseKind::ExtendedShooting => {
            let active = session
                .active_object()
                .and_then(|id| player.board().object(id));
            match active {
                Some(ship) => format!("{}: fire with {}", player.name(), ship.name()),
                None => format!("{}: select a ship (sel B7, ok) then fire", player.name()),
            }
        }
        PhaseKind::End => match session.winner() {
            Some(winner) => format!("game over, {} wins", winner.name()),
            None => "game over, no winner".to_owned(),
        },
    }
}
