use log::{debug, info};

use super::{pair, Outcome, PhaseContext, Side};
use crate::common::{Coord, ShootResult};
use crate::history;
use crate::object::ObjectKind;
use crate::player::Player;
use crate::timer::{TimerHandle, TimerTicket};

/// Forced passes in a row after which the match is called off.
const MAX_CONSECUTIVE_PASSES: usize = 2;

/// A computer shot waiting for its timer.
#[derive(Debug)]
struct PendingShot {
    handle: TimerHandle,
    target: Coord,
}

/// A shot that the opponent's board accepted.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Fired {
    pub result: ShootResult,
    pub kind: Option<ObjectKind>,
    pub shooter: usize,
}

/// Turn bookkeeping shared by both shooting phases.
#[derive(Debug, Default)]
pub(crate) struct Turns {
    current: usize,
    pending: Option<PendingShot>,
    passes: usize,
    finished: Option<Option<usize>>,
}

impl Turns {
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn is_finished(&self) -> bool {
        self.finished.is_some()
    }

    pub fn winner(&self) -> Option<usize> {
        self.finished.flatten()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pass(&mut self) {
        self.current = 1 - self.current;
    }

    /// Whether the acting player may act on `side` from outside input.
    pub fn accepts_input(&self, ctx: &PhaseContext<'_>, side: Side, wanted: Side) -> bool {
        !self.is_finished() && side == wanted && ctx.players[self.current].is_human()
    }

    /// Fire at `at` on the opponent's board. Invalid shots change nothing
    /// and return `None`.
    pub fn fire_at(&mut self, ctx: &mut PhaseContext<'_>, at: Coord) -> Option<Fired> {
        let shooter = self.current;
        let (me, opponent) = pair(ctx.players, shooter);
        let result = opponent.board_mut().shoot_at(at);
        if !result.is_valid() {
            debug!("{} fired at {at}: rejected", me.name());
            return None;
        }
        let hit = result
            .hit_object
            .and_then(|id| opponent.board().object(id));
        let kind = hit.map(|obj| obj.kind());
        let cells = match hit {
            Some(obj) if result.destroyed => obj.coordinates().to_vec(),
            _ => Vec::new(),
        };

        ctx.log.shot(me.name(), at, &result, kind);
        info!(
            "{} fires at {at}: {}",
            me.name(),
            match (result.hit, result.destroyed) {
                (false, _) => "miss",
                (true, false) => "hit",
                (true, true) => "destroyed",
            }
        );
        if me.is_human() {
            history::log_failure(ctx.history.borrow_mut().record_shot(me.name(), at, result.hit));
        }
        me.observe_shot(at, result.hit, result.destroyed, &cells);
        self.passes = 0;
        Some(Fired {
            result,
            kind,
            shooter,
        })
    }

    /// End the match if a fleet is gone. `shooter` fired the last shot.
    pub fn check_over(&mut self, players: &[Player; 2], shooter: usize) -> bool {
        let lost = [players[0].has_lost(), players[1].has_lost()];
        let other = 1 - shooter;
        let winner = match (lost[shooter], lost[other]) {
            (false, false) => return false,
            (_, true) => shooter,
            (true, false) => other,
        };
        info!("{} wins", players[winner].name());
        self.cancel();
        self.finished = Some(Some(winner));
        true
    }

    /// Let the acting computer pick a target and schedule its shot.
    /// Returns the outcome of a forced pass when it has nothing to aim at.
    pub fn schedule_computer_shot(&mut self, ctx: &mut PhaseContext<'_>) -> Option<Outcome> {
        let (me, opponent) = pair(ctx.players, self.current);
        match me.select_target(opponent.board()) {
            Some(target) => {
                let handle = ctx.scheduler.schedule(ctx.settings.computer_delay());
                debug!(
                    "{} will fire at {target} (timer {})",
                    me.name(),
                    handle.ticket().id()
                );
                self.pending = Some(PendingShot { handle, target });
                None
            }
            None => Some(self.forced_pass(ctx)),
        }
    }

    /// The acting player cannot act: the turn passes without a shot.
    pub fn forced_pass(&mut self, ctx: &mut PhaseContext<'_>) -> Outcome {
        let name = ctx.players[self.current].name().to_owned();
        ctx.log.forced_pass(&name);
        self.passes += 1;
        if self.passes >= MAX_CONSECUTIVE_PASSES {
            info!("neither player can act, ending without a winner");
            self.cancel();
            self.finished = Some(None);
        } else {
            info!("{name} has no targets and passes");
            self.pass();
        }
        Outcome {
            succeeded: false,
            hit: false,
            phase_complete: self.is_finished(),
        }
    }

    /// Target of the pending shot if `ticket` belongs to it.
    pub fn take_pending(&mut self, ticket: TimerTicket) -> Option<Coord> {
        let live = self
            .pending
            .as_ref()
            .is_some_and(|p| p.handle.ticket() == ticket);
        if !live {
            debug!("ignoring stale timer {}", ticket.id());
            return None;
        }
        self.pending.take().map(|p| p.target)
    }

    pub fn cancel(&mut self) {
        if let Some(p) = self.pending.take() {
            p.handle.cancel();
        }
    }
}

/// Standard shooting: a hit keeps the turn, a miss passes it.
#[derive(Debug, Default)]
pub struct ShootingPhase {
    turns: Turns,
}

impl ShootingPhase {
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

    pub fn cell_action(&mut self, ctx: &mut PhaseContext<'_>, at: Coord, side: Side) -> Outcome {
        if !self.turns.accepts_input(ctx, side, Side::Opponent) {
            return Outcome::rejected();
        }
        self.shoot(ctx, at)
    }

    fn shoot(&mut self, ctx: &mut PhaseContext<'_>, at: Coord) -> Outcome {
        let Some(fired) = self.turns.fire_at(ctx, at) else {
            return Outcome::rejected();
        };
        if !fired.result.hit {
            self.turns.pass();
        }
        self.turns.check_over(ctx.players, fired.shooter);
        Outcome {
            succeeded: true,
            hit: fired.result.hit,
            phase_complete: self.is_complete(),
        }
    }

    pub fn computer_move(&mut self, ctx: &mut PhaseContext<'_>) -> Option<Outcome> {
        if self.is_complete()
            || self.turns.has_pending()
            || ctx.players[self.turns.current()].is_human()
        {
            return None;
        }
        self.turns.schedule_computer_shot(ctx)
    }

    pub fn fire(&mut self, ctx: &mut PhaseContext<'_>, ticket: TimerTicket) -> Option<Outcome> {
        let target = self.turns.take_pending(ticket)?;
        Some(self.shoot(ctx, target))
    }
}
