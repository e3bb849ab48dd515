//! Player-facing record of what happened during a match.

use core::fmt;

use chrono::{DateTime, Local};

use crate::common::{Coord, ShootResult};
use crate::object::ObjectKind;

/// Name used for entries not tied to a player.
pub const SYSTEM: &str = "System";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub player: String,
    pub action: String,
    pub result: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} - {}: {}",
            self.timestamp.format("%H:%M:%S"),
            self.player,
            self.action,
            self.result
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct GameLog {
    entries: Vec<LogEntry>,
}

impl GameLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        player: impl Into<String>,
        action: impl Into<String>,
        result: impl Into<String>,
    ) {
        self.entries.push(LogEntry {
            timestamp: Local::now(),
            player: player.into(),
            action: action.into(),
            result: result.into(),
        });
    }

    pub fn game_start(&mut self, first: &str, second: &str) {
        self.push(SYSTEM, "game started", format!("{first} vs {second}"));
    }

    pub fn placement(&mut self, player: &str, kind: ObjectKind, at: Coord, success: bool) {
        let result = if success { "ok" } else { "rejected" };
        self.push(player, format!("places {kind} at {at}"), result);
    }

    /// A shot. `kind` is the kind of the object that was hit, if any.
    pub fn shot(&mut self, player: &str, at: Coord, result: &ShootResult, kind: Option<ObjectKind>) {
        let outcome = match kind {
            _ if !result.hit => "miss".to_owned(),
            Some(ObjectKind::Mine) => "hits a mine - explosion".to_owned(),
            Some(kind) if result.destroyed => format!("hits {kind} - destroyed"),
            Some(kind) => format!("hits {kind}"),
            None => "hit".to_owned(),
        };
        self.push(player, format!("shoots at {at}"), outcome);
    }

    /// The firing ship was lost to a mine.
    pub fn mine_explosion(&mut self, player: &str, ship: ObjectKind) {
        self.push(player, "mine triggered", format!("own {ship} destroyed"));
    }

    pub fn forced_pass(&mut self, player: &str) {
        self.push(player, "passes", "no targets left");
    }

    pub fn game_end(&mut self, winner: Option<&str>) {
        let result = match winner {
            Some(name) => format!("winner: {name}"),
            None => "no winner".to_owned(),
        };
        self.push(SYSTEM, "game over", result);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// The last `count` entries, oldest first.
    pub fn recent(&self, count: usize) -> &[LogEntry] {
        let start = self.entries.len().saturating_sub(count);
        &self.entries[start..]
    }

    /// All entries, one per line.
    pub fn text(&self) -> String {
        self.entries
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
