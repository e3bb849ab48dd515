//! Computer targeting and placement.
//!
//! Every computer keeps the set of coordinates it has not tried yet. How the
//! next target is drawn from that set depends on the [`Strategy`]:
//!
//! * `Easy` draws uniformly at random.
//! * `Hunt` follows up hits through a FIFO search queue and, once two hits
//!   line up, keeps shooting along that axis.
//! * `Statistical` hunts the same way but biases the random fallback towards
//!   cells where humans have historically placed ships, and places its own
//!   fleet where humans rarely shoot.
//! * `Impossible` only ever aims at cells the opponent actually occupies.

use std::collections::VecDeque;

use log::{debug, trace};
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::board::Board;
use crate::common::{Coord, Orientation, ORTHOGONAL};
use crate::config::Difficulty;
use crate::history::Heatmap;
use crate::object::{ObjectKind, ObjectTemplate};

/// Number of best-scoring placements the statistical player chooses from.
const PLACEMENT_SHORTLIST: usize = 10;

/// Follow-up state of the hunt-and-target search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HuntState {
    search_queue: VecDeque<Coord>,
    first_hit: Option<Coord>,
    current_direction: Option<(isize, isize)>,
}

impl HuntState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pending follow-up targets, front first.
    pub fn search_queue(&self) -> &VecDeque<Coord> {
        &self.search_queue
    }

    /// First hit on the ship currently being hunted.
    pub fn first_hit(&self) -> Option<Coord> {
        self.first_hit
    }

    /// Axis established by two hits on the same ship.
    pub fn current_direction(&self) -> Option<(isize, isize)> {
        self.current_direction
    }

    fn clear(&mut self) {
        self.search_queue.clear();
        self.first_hit = None;
        self.current_direction = None;
    }
}

/// How a computer picks targets and places its fleet.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    Easy,
    Hunt(HuntState),
    Statistical {
        hunt: HuntState,
        /// Where humans placed ships, per cell.
        placement_heatmap: Heatmap,
        /// Where humans shot, per cell.
        shot_heatmap: Heatmap,
    },
    Impossible,
}

impl Strategy {
    fn hunt_mut(&mut self) -> Option<&mut HuntState> {
        match self {
            Strategy::Hunt(hunt) | Strategy::Statistical { hunt, .. } => Some(hunt),
            Strategy::Easy | Strategy::Impossible => None,
        }
    }

    fn hunt(&self) -> Option<&HuntState> {
        match self {
            Strategy::Hunt(hunt) | Strategy::Statistical { hunt, .. } => Some(hunt),
            Strategy::Easy | Strategy::Impossible => None,
        }
    }
}

/// Decision state of one computer player.
#[derive(Debug, Clone, PartialEq)]
pub struct Computer {
    difficulty: Difficulty,
    strategy: Strategy,
    width: usize,
    height: usize,
    available_targets: Vec<Coord>,
}

impl Computer {
    /// A computer for a `width` x `height` opponent board. The statistical
    /// player starts with empty heatmaps; see [`Computer::statistical`].
    pub fn new(difficulty: Difficulty, width: usize, height: usize) -> Self {
        let strategy = match difficulty {
            Difficulty::Easy => Strategy::Easy,
            Difficulty::Medium => Strategy::Hunt(HuntState::new()),
            Difficulty::Hard => Strategy::Statistical {
                hunt: HuntState::new(),
                placement_heatmap: Heatmap::new(),
                shot_heatmap: Heatmap::new(),
            },
            Difficulty::Impossible => Strategy::Impossible,
        };
        Self::with_strategy(difficulty, strategy, width, height)
    }

    /// A statistical computer primed with historical heatmaps.
    pub fn statistical(
        width: usize,
        height: usize,
        placement_heatmap: Heatmap,
        shot_heatmap: Heatmap,
    ) -> Self {
        let strategy = Strategy::Statistical {
            hunt: HuntState::new(),
            placement_heatmap,
            shot_heatmap,
        };
        Self::with_strategy(Difficulty::Hard, strategy, width, height)
    }

    fn with_strategy(
        difficulty: Difficulty,
        strategy: Strategy,
        width: usize,
        height: usize,
    ) -> Self {
        // The cheating player fills its candidates from the opponent's board
        // on first use.
        let available_targets = match strategy {
            Strategy::Impossible => Vec::new(),
            _ => (0..width)
                .flat_map(|x| (0..height).map(move |y| Coord::new(x, y)))
                .collect(),
        };
        Self {
            difficulty,
            strategy,
            width,
            height,
            available_targets,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Hunt state, for the strategies that keep one.
    pub fn hunt(&self) -> Option<&HuntState> {
        self.strategy.hunt()
    }

    /// Coordinates not yet tried.
    pub fn available_targets(&self) -> &[Coord] {
        &self.available_targets
    }

    /// Replace the candidate set.
    pub fn set_available_targets(&mut self, targets: Vec<Coord>) {
        self.available_targets = targets;
    }

    /// Pick the next coordinate to fire at on `opponent`. The coordinate is
    /// removed from the candidate set. `None` when nothing is left to try.
    pub fn select_target<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        opponent: &Board,
    ) -> Option<Coord> {
        // Cells can be shot behind the computer's back (mine chains), so
        // forget anything the board already reports as shot.
        self.available_targets
            .retain(|&c| opponent.cell(c).is_some_and(|cell| !cell.is_shot()));

        if matches!(self.strategy, Strategy::Impossible) && self.available_targets.is_empty() {
            self.available_targets = opponent.unshot_occupied();
            trace!(
                "refreshed {} ground-truth targets",
                self.available_targets.len()
            );
        }

        if let Some(target) = self.pop_search_queue() {
            return Some(target);
        }

        let weighted = match &self.strategy {
            Strategy::Statistical {
                placement_heatmap, ..
            } if !placement_heatmap.is_empty() => Some(weighted_index(
                rng,
                &self.available_targets,
                placement_heatmap,
            )),
            _ => None,
        };
        let target = match weighted {
            Some(index) => index.map(|i| self.available_targets.swap_remove(i)),
            None => self.take_random(rng),
        };
        if target.is_none() {
            debug!("{:?} computer has no targets left", self.difficulty);
        }
        target
    }

    /// Pop follow-up targets until one is still untried.
    fn pop_search_queue(&mut self) -> Option<Coord> {
        let Some(hunt) = self.strategy.hunt_mut() else {
            return None;
        };
        while let Some(candidate) = hunt.search_queue.pop_front() {
            if let Some(i) = self.available_targets.iter().position(|&c| c == candidate) {
                self.available_targets.swap_remove(i);
                return Some(candidate);
            }
        }
        None
    }

    fn take_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Coord> {
        if self.available_targets.is_empty() {
            return None;
        }
        let i = rng.random_range(0..self.available_targets.len());
        Some(self.available_targets.swap_remove(i))
    }

    /// Feed back the outcome of a shot at `at`. `destroyed_cells` lists the
    /// footprint of the ship when `destroyed` is set.
    pub fn process_shot_result(
        &mut self,
        at: Coord,
        hit: bool,
        destroyed: bool,
        destroyed_cells: &[Coord],
    ) {
        if let Some(i) = self.available_targets.iter().position(|&c| c == at) {
            self.available_targets.swap_remove(i);
        }
        if self.strategy.hunt().is_none() {
            return;
        }

        if !hit {
            self.on_miss();
            return;
        }

        if destroyed {
            if let Some(hunt) = self.strategy.hunt_mut() {
                hunt.clear();
            }
            // Nothing can touch a destroyed ship, so its surroundings are
            // known to be empty.
            let (width, height) = (self.width, self.height);
            self.available_targets.retain(|&c| {
                !destroyed_cells
                    .iter()
                    .any(|&d| is_surrounding(d, c, width, height))
            });
            return;
        }

        let first_hit = self.hunt().and_then(HuntState::first_hit);
        match first_hit {
            None => {
                let neighbours = self.untried_neighbours(at);
                if let Some(hunt) = self.strategy.hunt_mut() {
                    hunt.first_hit = Some(at);
                    hunt.search_queue.extend(neighbours);
                }
            }
            Some(first) => {
                let next = {
                    let Some(hunt) = self.strategy.hunt_mut() else {
                        return;
                    };
                    let direction = *hunt
                        .current_direction
                        .get_or_insert_with(|| direction_from(first, at));
                    at.offset(direction.0, direction.1)
                };
                if let Some(next) = next.filter(|c| self.available_targets.contains(c)) {
                    if let Some(hunt) = self.strategy.hunt_mut() {
                        hunt.search_queue.push_front(next);
                    }
                }
            }
        }
    }

    fn on_miss(&mut self) {
        let probe = self.hunt().and_then(|hunt| {
            let (dx, dy) = hunt.current_direction?;
            hunt.first_hit?.offset(-dx, -dy)
        });
        let queued = |hunt: &HuntState, c: &Coord| hunt.search_queue.contains(c);
        let probe = probe.filter(|c| {
            self.available_targets.contains(c) && !self.hunt().is_some_and(|h| queued(h, c))
        });
        if let Some(hunt) = self.strategy.hunt_mut() {
            if let Some(probe) = probe {
                hunt.search_queue.push_front(probe);
            }
            hunt.current_direction = None;
        }
    }

    /// Orthogonal neighbours of `at` that are on the board, untried and not
    /// queued yet.
    fn untried_neighbours(&self, at: Coord) -> Vec<Coord> {
        let queued = self.hunt().map(HuntState::search_queue);
        ORTHOGONAL
            .iter()
            .filter_map(|&(dx, dy)| at.offset(dx, dy))
            .filter(|c| c.x < self.width && c.y < self.height)
            .filter(|c| self.available_targets.contains(c))
            .filter(|c| !queued.is_some_and(|q| q.contains(c)))
            .collect()
    }

    /// Choose where to put an object of `kind` on `board`. The statistical
    /// player draws from its shortlist of historically quiet positions, the
    /// quietest being the likeliest; everyone else places uniformly at
    /// random.
    pub fn choose_placement<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        board: &Board,
        kind: ObjectKind,
    ) -> Option<(Coord, Orientation)> {
        match &self.strategy {
            Strategy::Statistical { shot_heatmap, .. } if !shot_heatmap.is_empty() => {
                let shortlist = best_placements(board, kind, shot_heatmap);
                let ranked: Vec<(usize, (Coord, Orientation))> =
                    shortlist.into_iter().enumerate().collect();
                ranked
                    .choose_weighted(rng, |&(rank, _)| rank_weight(rank))
                    .ok()
                    .map(|&(_, placement)| placement)
                    .or_else(|| board.random_placement(rng, kind))
            }
            _ => board.random_placement(rng, kind),
        }
    }
}

/// Unit step from `from` towards `to` along the axis they share.
fn direction_from(from: Coord, to: Coord) -> (isize, isize) {
    if to.x == from.x {
        if to.y > from.y {
            (0, 1)
        } else {
            (0, -1)
        }
    } else if to.x > from.x {
        (1, 0)
    } else {
        (-1, 0)
    }
}

/// Whether `c` lies in the Moore neighbourhood of `center` on a board of the
/// given size.
fn is_surrounding(center: Coord, c: Coord, width: usize, height: usize) -> bool {
    c != center
        && c.x < width
        && c.y < height
        && c.x.abs_diff(center.x) <= 1
        && c.y.abs_diff(center.y) <= 1
}

/// Index into `targets` drawn with weight `max(1, heat)` per cell.
fn weighted_index<R: Rng + ?Sized>(
    rng: &mut R,
    targets: &[Coord],
    heatmap: &Heatmap,
) -> Option<usize> {
    if targets.is_empty() {
        return None;
    }
    let weight = |c: &Coord| u64::from(heatmap.get(c).copied().unwrap_or(0).max(1));
    let total: u64 = targets.iter().map(weight).sum();
    let threshold = rng.random_range(0..total);
    let mut cumulative = 0;
    for (i, c) in targets.iter().enumerate() {
        cumulative += weight(c);
        if threshold < cumulative {
            return Some(i);
        }
    }
    Some(targets.len() - 1)
}

/// Draw weight of the shortlist entry at `rank` (0 is best). The best entry
/// is `PLACEMENT_SHORTLIST` times as likely as the last.
fn rank_weight(rank: usize) -> usize {
    PLACEMENT_SHORTLIST.saturating_sub(rank).max(1)
}

/// Mean heat over the footprint of a placement.
pub fn placement_score(heatmap: &Heatmap, footprint: &[Coord]) -> f64 {
    if footprint.is_empty() {
        return 0.0;
    }
    let total: u64 = footprint
        .iter()
        .map(|c| u64::from(heatmap.get(c).copied().unwrap_or(0)))
        .sum();
    total as f64 / footprint.len() as f64
}

/// The lowest-scoring valid placements of `kind`, best first.
pub fn best_placements(
    board: &Board,
    kind: ObjectKind,
    shot_heatmap: &Heatmap,
) -> Vec<(Coord, Orientation)> {
    let mut scored: Vec<(f64, Coord, Orientation)> = board
        .placement_candidates(kind)
        .into_iter()
        .map(|(at, orientation)| {
            let footprint = ObjectTemplate::new(kind, orientation).footprint(at);
            (placement_score(shot_heatmap, &footprint), at, orientation)
        })
        .collect();
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));
    scored
        .into_iter()
        .take(PLACEMENT_SHORTLIST)
        .map(|(_, at, orientation)| (at, orientation))
        .collect()
}
