use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;

use crate::ai::Computer;
use crate::board::{Board, ObjectId};
use crate::common::Coord;
use crate::config::{Difficulty, PlayerKind, PlayerSettings};
use crate::history::SharedHistory;
use crate::object::{Hittable, ObjectTemplate};

/// Where a player's decisions come from.
#[derive(Debug, Clone)]
pub enum Controller {
    /// Decisions arrive as external input.
    Human,
    /// Decisions are computed.
    Computer(Computer),
}

/// One side of a match: a name, a board holding the fleet, and a controller.
#[derive(Debug, Clone)]
pub struct Player {
    name: String,
    board: Board,
    controller: Controller,
    rng: SmallRng,
}

impl Player {
    pub fn human(name: impl Into<String>, width: usize, height: usize, rng: SmallRng) -> Self {
        Self {
            name: name.into(),
            board: Board::new(width, height),
            controller: Controller::Human,
            rng,
        }
    }

    /// A computer player. The statistical difficulty reads its heatmaps from
    /// `history` once, here.
    pub fn computer(
        name: impl Into<String>,
        difficulty: Difficulty,
        width: usize,
        height: usize,
        rng: SmallRng,
        history: &SharedHistory,
    ) -> Self {
        let computer = match difficulty {
            Difficulty::Hard => {
                let history = history.borrow();
                Computer::statistical(
                    width,
                    height,
                    history.placement_frequency(),
                    history.shot_frequency(),
                )
            }
            _ => Computer::new(difficulty, width, height),
        };
        Self {
            name: name.into(),
            board: Board::new(width, height),
            controller: Controller::Computer(computer),
            rng,
        }
    }

    pub fn from_settings(
        settings: &PlayerSettings,
        width: usize,
        height: usize,
        rng: SmallRng,
        history: &SharedHistory,
    ) -> Self {
        match settings.kind {
            PlayerKind::Human => Self::human(settings.name.clone(), width, height, rng),
            PlayerKind::Computer => Self::computer(
                settings.name.clone(),
                settings.difficulty,
                width,
                height,
                rng,
                history,
            ),
        }
    }

    /// Convenience constructor with a seeded rng.
    pub fn seeded_computer(
        name: impl Into<String>,
        difficulty: Difficulty,
        width: usize,
        height: usize,
        seed: u64,
        history: &SharedHistory,
    ) -> Self {
        Self::computer(
            name,
            difficulty,
            width,
            height,
            SmallRng::seed_from_u64(seed),
            history,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn is_human(&self) -> bool {
        matches!(self.controller, Controller::Human)
    }

    pub fn is_computer(&self) -> bool {
        !self.is_human()
    }

    /// Decision state, for computer players.
    pub fn ai(&self) -> Option<&Computer> {
        match &self.controller {
            Controller::Computer(c) => Some(c),
            Controller::Human => None,
        }
    }

    pub fn ai_mut(&mut self) -> Option<&mut Computer> {
        match &mut self.controller {
            Controller::Computer(c) => Some(c),
            Controller::Human => None,
        }
    }

    /// True once every placed object is destroyed, including when nothing
    /// was placed.
    pub fn has_lost(&self) -> bool {
        self.board.all_destroyed()
    }

    /// Place `template` at a position chosen by the controller's placement
    /// strategy (uniform random for humans). `None` when no position fits.
    pub fn place_random(&mut self, template: ObjectTemplate) -> Option<ObjectId> {
        let kind = template.kind;
        let choice = match &self.controller {
            Controller::Computer(c) => c.choose_placement(&mut self.rng, &self.board, kind),
            Controller::Human => self.board.random_placement(&mut self.rng, kind),
        };
        let (at, orientation) = choice?;
        self.board
            .place(template.with_orientation(orientation).instantiate(at))
            .ok()
    }

    /// Next coordinate a computer wants to fire at on `opponent`.
    /// Always `None` for humans.
    pub fn select_target(&mut self, opponent: &Board) -> Option<Coord> {
        match &mut self.controller {
            Controller::Computer(c) => c.select_target(&mut self.rng, opponent),
            Controller::Human => None,
        }
    }

    /// Tell a computer how a shot it knows about turned out.
    pub fn observe_shot(&mut self, at: Coord, hit: bool, destroyed: bool, cells: &[Coord]) {
        if let Controller::Computer(c) = &mut self.controller {
            c.process_shot_result(at, hit, destroyed, cells);
        }
    }

    /// Own ships that can still fire.
    pub fn live_ships(&self) -> Vec<ObjectId> {
        self.board
            .objects()
            .filter(|(_, obj)| obj.is_ship() && !obj.is_destroyed())
            .map(|(id, _)| id)
            .collect()
    }

    /// A uniformly random ship from [`live_ships`](Self::live_ships).
    pub fn random_live_ship(&mut self) -> Option<ObjectId> {
        self.live_ships().choose(&mut self.rng).copied()
    }
}
