use log::{debug, info};

use super::{Outcome, PhaseContext, Side};
use crate::common::{Coord, Orientation};
use crate::config::{GameMode, GameSettings};
use crate::history;
use crate::object::ObjectTemplate;

/// Footprint of the object being placed, as it would land at a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub cells: Vec<Coord>,
    pub placeable: bool,
}

/// Both players place their fleet, one object at a time, in fleet order.
/// Player 0 goes first; once both are done the phase is complete.
///
/// The fleet is never modified. Rotation only changes the orientation of
/// the object in hand, which starts over as the template's own for each
/// new object.
#[derive(Debug, Clone)]
pub struct PlacementPhase {
    current: usize,
    fleet: Vec<ObjectTemplate>,
    index: usize,
    orientation: Orientation,
    extended: bool,
    complete: bool,
}

impl PlacementPhase {
    pub fn new(settings: &GameSettings) -> Self {
        Self::with_fleet(settings.fleet(), settings.mode == GameMode::Extended)
    }

    /// A placement phase over an explicit fleet.
    pub fn with_fleet(fleet: Vec<ObjectTemplate>, extended: bool) -> Self {
        let orientation = fleet
            .first()
            .map_or(Orientation::Horizontal, |t| t.orientation);
        Self {
            current: 0,
            fleet,
            index: 0,
            orientation,
            extended,
            complete: false,
        }
    }

    pub fn is_extended(&self) -> bool {
        self.extended
    }

    pub fn current_player_index(&self) -> usize {
        self.current
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn fleet(&self) -> &[ObjectTemplate] {
        &self.fleet
    }

    /// Position in the fleet of the object placed next.
    pub fn fleet_index(&self) -> usize {
        self.index
    }

    pub fn current_object(&self) -> Option<ObjectTemplate> {
        if self.complete {
            return None;
        }
        self.fleet
            .get(self.index)
            .map(|t| t.with_orientation(self.orientation))
    }

    pub fn toggle_orientation(&mut self) {
        self.orientation = self.orientation.rotated();
    }

    pub fn cell_action(&mut self, ctx: &mut PhaseContext<'_>, at: Coord, side: Side) -> Outcome {
        if self.complete || side != Side::Own || ctx.players[self.current].is_computer() {
            return Outcome::rejected();
        }
        self.attempt(ctx, at)
    }

    /// Place the current object with its start at `at`.
    fn attempt(&mut self, ctx: &mut PhaseContext<'_>, at: Coord) -> Outcome {
        let Some(template) = self.current_object() else {
            return Outcome::rejected();
        };
        let player = &mut ctx.players[self.current];
        let placed = match player.board_mut().place(template.instantiate(at)) {
            Ok(_) => true,
            Err(e) => {
                debug!("{}: {e}", player.name());
                false
            }
        };
        ctx.log
            .placement(player.name(), template.kind, at, placed);
        if !placed {
            return Outcome::rejected();
        }
        if player.is_human() {
            history::log_failure(ctx.history.borrow_mut().record_placement(
                player.name(),
                template.kind,
                at,
                template.orientation,
            ));
        }
        player.board_mut().clear_adjacent_markers();
        self.advance();
        Outcome {
            succeeded: true,
            hit: false,
            phase_complete: self.complete,
        }
    }

    /// Place the rest of the acting player's fleet at random positions and
    /// end their turn. Fails if some object found no room.
    pub fn auto_place_remaining(&mut self, ctx: &mut PhaseContext<'_>) -> Outcome {
        if self.complete {
            return Outcome::rejected();
        }
        let player = &mut ctx.players[self.current];
        let mut all_placed = true;
        while let Some(template) = self.fleet.get(self.index).copied() {
            match player.place_random(template) {
                Some(id) => {
                    let at = player
                        .board()
                        .object(id)
                        .and_then(|obj| obj.origin())
                        .unwrap_or_default();
                    ctx.log.placement(player.name(), template.kind, at, true);
                }
                None => {
                    info!("{}: no room left for {}", player.name(), template.kind);
                    all_placed = false;
                }
            }
            self.index += 1;
        }
        player.board_mut().clear_adjacent_markers();
        self.finish_player();
        Outcome {
            succeeded: all_placed,
            hit: false,
            phase_complete: self.complete,
        }
    }

    pub fn computer_move(&mut self, ctx: &mut PhaseContext<'_>) -> Option<Outcome> {
        if self.complete || ctx.players[self.current].is_human() {
            return None;
        }
        Some(self.auto_place_remaining(ctx))
    }

    /// Where the current object would land at `at`. Marks the cells around
    /// it on the acting player's board.
    pub fn preview(&self, ctx: &mut PhaseContext<'_>, at: Coord) -> Option<Preview> {
        let template = self.current_object()?;
        let board = ctx.players[self.current].board_mut();
        let probe = template.instantiate(at);
        board.clear_adjacent_markers();
        board.mark_adjacent_for(&probe);
        Some(Preview {
            placeable: board.can_place(&probe),
            cells: probe.coordinates().to_vec(),
        })
    }

    fn advance(&mut self) {
        self.index += 1;
        if self.index >= self.fleet.len() {
            self.finish_player();
        } else {
            self.reset_orientation();
        }
    }

    fn finish_player(&mut self) {
        self.index = 0;
        self.reset_orientation();
        if self.current == 1 {
            info!("placement complete");
            self.complete = true;
        } else {
            self.current = 1;
        }
    }

    fn reset_orientation(&mut self) {
        if let Some(template) = self.fleet.get(self.index) {
            self.orientation = template.orientation;
        }
    }
}
