use log::{debug, info};

use super::shooting::Turns;
use super::{pair, Outcome, PhaseContext, Side};
use crate::board::ObjectId;
use crate::common::Coord;
use crate::object::{Hittable, ObjectKind};
use crate::timer::TimerTicket;

/// Shooting where every turn is fired by one of the acting player's own
/// ships.
///
/// The player selects a ship on their own board and confirms it. That ship
/// then gets up to `size` shots; without a confirmed ship the turn has a
/// single shot. A miss ends the turn early. Hitting a mine destroys the
/// firing ship and ends the turn at once.
#[derive(Debug, Default)]
pub struct ExtendedShootingPhase {
    turns: Turns,
    selected: Option<ObjectId>,
    shooting: Option<ObjectId>,
    selection_done: bool,
    shots: usize,
}

impl ExtendedShootingPhase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_player_index(&self) -> usize {
        self.turns.current()
    }

    pub fn is_complete(&self) -> bool {
        self.turns.is_finished()
    }

    pub fn winner(&self) -> Option<usize> {
        self.turns.winner()
    }

    pub fn has_pending_timer(&self) -> bool {
        self.turns.has_pending()
    }

    pub fn cancel_timers(&mut self) {
        self.turns.cancel();
    }

    /// Tentative selection, not yet confirmed.
    pub fn selected_object(&self) -> Option<ObjectId> {
        self.selected
    }

    /// Ship firing this turn.
    pub fn active_object(&self) -> Option<ObjectId> {
        self.shooting
    }

    pub fn is_selection_done(&self) -> bool {
        self.selection_done
    }

    /// Shots fired so far this turn.
    pub fn shots_fired(&self) -> usize {
        self.shots
    }

    pub fn cell_action(&mut self, ctx: &mut PhaseContext<'_>, at: Coord, side: Side) -> Outcome {
        match side {
            Side::Own => {
                let selected = self.turns.accepts_input(ctx, side, Side::Own)
                    && self.select_at(ctx, at);
                Outcome {
                    succeeded: selected,
                    ..Outcome::default()
                }
            }
            Side::Opponent => {
                if !self.turns.accepts_input(ctx, side, Side::Opponent) || !self.selection_done {
                    return Outcome::rejected();
                }
                self.shoot(ctx, at)
            }
        }
    }

    /// Toggle the selection of the own ship at `at`. Only ships that are
    /// still afloat can be picked, and only before the first shot.
    fn select_at(&mut self, ctx: &PhaseContext<'_>, at: Coord) -> bool {
        let board = ctx.players[self.turns.current()].board();
        let Some((id, object)) = board.object_at(at) else {
            return false;
        };
        if !object.is_ship() || object.is_destroyed() {
            return false;
        }
        self.select(id)
    }

    /// Toggle `id` as the tentative selection.
    pub fn select(&mut self, id: ObjectId) -> bool {
        if self.shots > 0 {
            return false;
        }
        self.selected = if self.selected == Some(id) {
            None
        } else {
            Some(id)
        };
        true
    }

    /// Make the tentative selection the firing ship. Confirming with nothing
    /// selected allows a single shot.
    pub fn confirm_selection(&mut self) -> bool {
        if self.shots > 0 {
            return false;
        }
        self.shooting = self.selected.take();
        self.selection_done = true;
        true
    }

    fn allowance(&self, ctx: &PhaseContext<'_>) -> usize {
        self.shooting
            .and_then(|id| ctx.players[self.turns.current()].board().object(id))
            .map_or(1, |ship| ship.size())
    }

    fn shoot(&mut self, ctx: &mut PhaseContext<'_>, at: Coord) -> Outcome {
        let allowance = self.allowance(ctx);
        let Some(fired) = self.turns.fire_at(ctx, at) else {
            return Outcome::rejected();
        };
        self.shots += 1;

        let hit_mine = fired.result.hit && fired.kind == Some(ObjectKind::Mine);
        if hit_mine {
            if let Some(ship) = self.shooting {
                self.explode(ctx, fired.shooter, ship);
            }
        }

        if !fired.result.hit || hit_mine || self.shots >= allowance {
            self.next_player();
        }
        self.turns.check_over(ctx.players, fired.shooter);
        Outcome {
            succeeded: true,
            hit: fired.result.hit,
            phase_complete: self.is_complete(),
        }
    }

    /// The firing ship ran into a mine: it is destroyed, its cells are shown
    /// as shot, and the opponent learns about them.
    fn explode(&mut self, ctx: &mut PhaseContext<'_>, shooter: usize, ship: ObjectId) {
        let (me, opponent) = pair(ctx.players, shooter);
        let Some(object) = me.board_mut().object_mut(ship) else {
            return;
        };
        object.destroy();
        let kind = object.kind();
        let cells = object.coordinates().to_vec();
        ctx.log.mine_explosion(me.name(), kind);
        info!("{} loses its {kind} to a mine", me.name());

        for &c in &cells {
            let result = me.board_mut().shoot_at(c);
            if result.is_valid() {
                opponent.observe_shot(c, result.hit, result.destroyed, &cells);
            }
        }
    }

    fn next_player(&mut self) {
        self.selected = None;
        self.shooting = None;
        self.selection_done = false;
        self.shots = 0;
        self.turns.pass();
    }

    /// A computer picks one of its live ships at random, confirms it and
    /// schedules its first shot.
    pub fn computer_move(&mut self, ctx: &mut PhaseContext<'_>) -> Option<Outcome> {
        let current = self.turns.current();
        if self.is_complete() || self.turns.has_pending() || ctx.players[current].is_human() {
            return None;
        }
        if !self.selection_done {
            self.selected = ctx.players[current].random_live_ship();
            self.confirm_selection();
            debug!(
                "{} fires with {:?}",
                ctx.players[current].name(),
                self.shooting
            );
        }
        let outcome = self.turns.schedule_computer_shot(ctx);
        if outcome.is_some() {
            // The turn passed without a shot.
            self.selected = None;
            self.shooting = None;
            self.selection_done = false;
            self.shots = 0;
        }
        outcome
    }

    pub fn fire(&mut self, ctx: &mut PhaseContext<'_>, ticket: TimerTicket) -> Option<Outcome> {
        let target = self.turns.take_pending(ticket)?;
        Some(self.shoot(ctx, target))
    }
}
