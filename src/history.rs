//! Historical record of human play, used as a frequency oracle by the
//! statistical computer.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::common::{Coord, HistoryError, Orientation};
use crate::object::{ObjectKind, ObjectTemplate};

/// Occurrence count per coordinate.
pub type Heatmap = HashMap<Coord, u32>;

/// History shared between the players of a session.
pub type SharedHistory = Rc<RefCell<dyn History>>;

/// A human placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub player: String,
    pub kind: ObjectKind,
    pub x: usize,
    pub y: usize,
    pub orientation: Orientation,
}

/// A human shot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotRecord {
    pub player: String,
    pub x: usize,
    pub y: usize,
    pub hit: bool,
}

/// Append-only store of placements and shots.
pub trait History {
    fn record_placement(
        &mut self,
        player: &str,
        kind: ObjectKind,
        at: Coord,
        orientation: Orientation,
    ) -> Result<(), HistoryError>;

    fn record_shot(&mut self, player: &str, at: Coord, hit: bool) -> Result<(), HistoryError>;

    /// How often each cell was covered by a placed object. Every cell of
    /// the footprint counts, not just the start cell a record stores.
    fn placement_frequency(&self) -> Heatmap;

    /// How often each cell was shot at.
    fn shot_frequency(&self) -> Heatmap;
}

/// In-process history. Also the in-memory state of [`JsonHistory`].
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    placements: Vec<PlacementRecord>,
    shots: Vec<ShotRecord>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap in the shared handle the session expects.
    pub fn shared() -> SharedHistory {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn placements(&self) -> &[PlacementRecord] {
        &self.placements
    }

    pub fn shots(&self) -> &[ShotRecord] {
        &self.shots
    }
}

impl History for MemoryHistory {
    fn record_placement(
        &mut self,
        player: &str,
        kind: ObjectKind,
        at: Coord,
        orientation: Orientation,
    ) -> Result<(), HistoryError> {
        self.placements.push(PlacementRecord {
            player: player.to_owned(),
            kind,
            x: at.x,
            y: at.y,
            orientation,
        });
        Ok(())
    }

    fn record_shot(&mut self, player: &str, at: Coord, hit: bool) -> Result<(), HistoryError> {
        self.shots.push(ShotRecord {
            player: player.to_owned(),
            x: at.x,
            y: at.y,
            hit,
        });
        Ok(())
    }

    fn placement_frequency(&self) -> Heatmap {
        let mut heat = Heatmap::new();
        for p in &self.placements {
            let template = ObjectTemplate::new(p.kind, p.orientation);
            for c in template.footprint(Coord::new(p.x, p.y)) {
                *heat.entry(c).or_default() += 1;
            }
        }
        heat
    }

    fn shot_frequency(&self) -> Heatmap {
        let mut heat = Heatmap::new();
        for s in &self.shots {
            *heat.entry(Coord::new(s.x, s.y)).or_default() += 1;
        }
        heat
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Record {
    Placement(PlacementRecord),
    Shot(ShotRecord),
}

/// History persisted as JSON lines, one record per line.
#[derive(Debug)]
pub struct JsonHistory {
    path: PathBuf,
    memory: MemoryHistory,
}

impl JsonHistory {
    /// Open `path`, reading any existing records. A missing file is an empty
    /// history; it is created on the first write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
        let path = path.as_ref().to_path_buf();
        let mut memory = MemoryHistory::new();
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no history at {}, starting empty", path.display());
                return Ok(Self { path, memory });
            }
            Err(source) => return Err(HistoryError::Io { path, source }),
        };
        for (i, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|source| HistoryError::Io {
                path: path.clone(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let record: Record = serde_json::from_str(&line)
                .map_err(|source| HistoryError::Json { line: i + 1, source })?;
            match record {
                Record::Placement(p) => memory.placements.push(p),
                Record::Shot(s) => memory.shots.push(s),
            }
        }
        debug!(
            "loaded {} placements and {} shots from {}",
            memory.placements.len(),
            memory.shots.len(),
            path.display()
        );
        Ok(Self { path, memory })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &MemoryHistory {
        &self.memory
    }

    fn append(&self, record: &Record) -> Result<(), HistoryError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let io = |source| HistoryError::Io {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io)?;
        file.write_all(line.as_bytes()).map_err(io)
    }
}

impl History for JsonHistory {
    fn record_placement(
        &mut self,
        player: &str,
        kind: ObjectKind,
        at: Coord,
        orientation: Orientation,
    ) -> Result<(), HistoryError> {
        let record = PlacementRecord {
            player: player.to_owned(),
            kind,
            x: at.x,
            y: at.y,
            orientation,
        };
        self.append(&Record::Placement(record.clone()))?;
        self.memory.placements.push(record);
        Ok(())
    }

    fn record_shot(&mut self, player: &str, at: Coord, hit: bool) -> Result<(), HistoryError> {
        let record = ShotRecord {
            player: player.to_owned(),
            x: at.x,
            y: at.y,
            hit,
        };
        self.append(&Record::Shot(record.clone()))?;
        self.memory.shots.push(record);
        Ok(())
    }

    fn placement_frequency(&self) -> Heatmap {
        self.memory.placement_frequency()
    }

    fn shot_frequency(&self) -> Heatmap {
        self.memory.shot_frequency()
    }
}

/// Record through a shared history, logging instead of failing the turn.
pub(crate) fn log_failure(result: Result<(), HistoryError>) {
    if let Err(e) = result {
        warn!("could not record history: {e}");
    }
}
