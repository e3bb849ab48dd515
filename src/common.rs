//! Common types: coordinates, orientation, shot results and the error enums.

use core::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::ObjectId;
use crate::object::GameObject;
use crate::phase::PhaseKind;

/// A cell position. `x` is the column, `y` the row.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Shift by a signed delta. Returns `None` when either axis would go negative.
    pub fn offset(self, dx: isize, dy: isize) -> Option<Coord> {
        Some(Coord {
            x: self.x.checked_add_signed(dx)?,
            y: self.y.checked_add_signed(dy)?,
        })
    }
}

impl From<(usize, usize)> for Coord {
    fn from((x, y): (usize, usize)) -> Self {
        Coord { x, y }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Orthogonal steps used by the hunt search.
pub const ORTHOGONAL: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// All eight steps of the Moore neighbourhood.
pub const SURROUNDING: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Orientation of a placement object on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

impl Orientation {
    /// The other orientation.
    pub fn rotated(self) -> Self {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }

    /// Unit step along this orientation.
    pub fn step(self) -> (isize, isize) {
        match self {
            Orientation::Horizontal => (1, 0),
            Orientation::Vertical => (0, 1),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Horizontal => f.write_str("horizontal"),
            Orientation::Vertical => f.write_str("vertical"),
        }
    }
}

/// Result of shooting at a single cell.
///
/// Invalid shots (out of bounds, or a cell that was already shot) come back
/// miss-shaped: `hit` and `destroyed` are false and nothing was mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShootResult {
    /// An object occupied the cell.
    pub hit: bool,
    /// This shot destroyed the object.
    pub destroyed: bool,
    /// The coordinate lies outside the board.
    pub out_of_bounds: bool,
    /// The cell had been shot before.
    pub already_shot: bool,
    /// The object that was hit, if any.
    pub hit_object: Option<ObjectId>,
}

impl ShootResult {
    /// A valid shot into open water.
    pub fn miss() -> Self {
        Self::default()
    }

    /// A rejected shot at a coordinate outside the board.
    pub fn out_of_bounds() -> Self {
        Self {
            out_of_bounds: true,
            ..Self::default()
        }
    }

    /// A rejected shot at a cell that was already shot.
    pub fn already_shot() -> Self {
        Self {
            already_shot: true,
            ..Self::default()
        }
    }

    /// Whether the shot was accepted by the board.
    pub fn is_valid(&self) -> bool {
        !self.out_of_bounds && !self.already_shot
    }
}

/// Why an object could not be placed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CannotPlaceReason {
    /// The object has no coordinates yet.
    #[error("object has no position")]
    Unpositioned,
    /// A target cell lies outside the board.
    #[error("position is out of bounds")]
    OutOfBounds,
    /// A target cell is already occupied.
    #[error("position is already occupied")]
    Overlap,
    /// A cell next to the target (diagonals included) is occupied.
    #[error("position touches another object")]
    Adjacent,
}

/// Error returned by [`Board::place`](crate::Board::place). Hands the rejected
/// object back to the caller.
#[derive(Error)]
#[error("could not place {}: {reason}", .object.name())]
pub struct PlaceError {
    reason: CannotPlaceReason,
    object: Box<GameObject>,
}

impl PlaceError {
    pub(crate) fn new(reason: CannotPlaceReason, object: GameObject) -> Self {
        Self {
            reason,
            object: Box::new(object),
        }
    }

    /// Why placement was refused.
    pub fn reason(&self) -> CannotPlaceReason {
        self.reason
    }

    /// The object that was not placed.
    pub fn object(&self) -> &GameObject {
        &self.object
    }

    /// Take the rejected object back.
    pub fn into_object(self) -> GameObject {
        *self.object
    }
}

impl fmt::Debug for PlaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Errors from the persisted history store.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed history record on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not encode history record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors from loading game settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("settings file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("board must be at least 1x1, got {width}x{height}")]
    EmptyBoard { width: usize, height: usize },
    #[error("board is {width} columns wide, at most {max} can be labelled")]
    TooWide { width: usize, max: usize },
}

/// Wiring errors in the phase machine. These indicate a bug, not a game state.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PhaseError {
    #[error("no transition from {from:?} to {to:?}")]
    InvalidTransition { from: PhaseKind, to: PhaseKind },
}
