//! The match state machine.
//!
//! A match runs `Placement -> Shooting -> End`, or the extended variants of
//! the first two. Phases never change kind in place: the session asks the
//! live phase for its [`successor`](Phase::successor) and drops the old one.
//! Players live in the session and are lent to the live phase through a
//! [`PhaseContext`] for each action.

mod end;
mod extended;
mod placement;
mod shooting;

pub use end::EndPhase;
pub use extended::ExtendedShootingPhase;
pub use placement::{PlacementPhase, Preview};
pub use shooting::ShootingPhase;

use core::fmt;

use crate::board::ObjectId;
use crate::common::{Coord, PhaseError};
use crate::config::GameSettings;
use crate::game_log::GameLog;
use crate::history::SharedHistory;
use crate::object::ObjectTemplate;
use crate::player::Player;
use crate::timer::{Scheduler, TimerTicket};

/// Kind of a phase, as reported to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    Placement,
    ExtendedPlacement,
    Shooting,
    ExtendedShooting,
    End,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PhaseKind::Placement => "placement",
            PhaseKind::ExtendedPlacement => "extended placement",
            PhaseKind::Shooting => "shooting",
            PhaseKind::ExtendedShooting => "extended shooting",
            PhaseKind::End => "end",
        };
        f.write_str(name)
    }
}

/// Which board a cell action targets, seen from the acting player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Own,
    Opponent,
}

/// Result of one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Outcome {
    /// The action was accepted and changed the game.
    pub succeeded: bool,
    /// The action was a shot that hit something.
    pub hit: bool,
    /// The live phase has finished.
    pub phase_complete: bool,
}

impl Outcome {
    pub fn rejected() -> Self {
        Self::default()
    }
}

/// Everything a phase may touch while handling an action.
pub struct PhaseContext<'a> {
    pub settings: &'a GameSettings,
    pub players: &'a mut [Player; 2],
    pub history: &'a SharedHistory,
    pub log: &'a mut GameLog,
    pub scheduler: &'a mut dyn Scheduler,
}

/// Split the players into (acting, opponent).
pub(crate) fn pair(players: &mut [Player; 2], current: usize) -> (&mut Player, &mut Player) {
    let (first, second) = players.split_at_mut(1);
    if current == 0 {
        (&mut first[0], &mut second[0])
    } else {
        (&mut second[0], &mut first[0])
    }
}

/// The live phase.
#[derive(Debug)]
pub enum Phase {
    Placement(PlacementPhase),
    Shooting(ShootingPhase),
    ExtendedShooting(ExtendedShootingPhase),
    End(EndPhase),
}

impl Phase {
    /// First phase of a match.
    pub fn initial(settings: &GameSettings) -> Self {
        Phase::Placement(PlacementPhase::new(settings))
    }

    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::Placement(p) if p.is_extended() => PhaseKind::ExtendedPlacement,
            Phase::Placement(_) => PhaseKind::Placement,
            Phase::Shooting(_) => PhaseKind::Shooting,
            Phase::ExtendedShooting(_) => PhaseKind::ExtendedShooting,
            Phase::End(_) => PhaseKind::End,
        }
    }

    pub fn current_player_index(&self) -> usize {
        match self {
            Phase::Placement(p) => p.current_player_index(),
            Phase::Shooting(p) => p.current_player_index(),
            Phase::ExtendedShooting(p) => p.current_player_index(),
            Phase::End(p) => p.winner().unwrap_or(0),
        }
    }

    pub fn is_complete(&self) -> bool {
        match self {
            Phase::Placement(p) => p.is_complete(),
            Phase::Shooting(p) => p.is_complete(),
            Phase::ExtendedShooting(p) => p.is_complete(),
            Phase::End(_) => false,
        }
    }

    /// Kind of the phase that follows a completed one.
    pub fn next_kind(&self) -> Option<PhaseKind> {
        match self.kind() {
            PhaseKind::Placement => Some(PhaseKind::Shooting),
            PhaseKind::ExtendedPlacement => Some(PhaseKind::ExtendedShooting),
            PhaseKind::Shooting | PhaseKind::ExtendedShooting => Some(PhaseKind::End),
            PhaseKind::End => None,
        }
    }

    /// Build the phase of kind `to` that follows this one.
    pub fn successor(
        &self,
        to: PhaseKind,
        ctx: &mut PhaseContext<'_>,
    ) -> Result<Phase, PhaseError> {
        let from = self.kind();
        match (from, to) {
            (PhaseKind::Placement, PhaseKind::Shooting) => Ok(Phase::Shooting(ShootingPhase::new())),
            (PhaseKind::ExtendedPlacement, PhaseKind::ExtendedShooting) => {
                Ok(Phase::ExtendedShooting(ExtendedShootingPhase::new()))
            }
            (PhaseKind::Shooting | PhaseKind::ExtendedShooting, PhaseKind::End) => {
                Ok(Phase::End(EndPhase::new(self.winner(), ctx)))
            }
            _ => Err(PhaseError::InvalidTransition { from, to }),
        }
    }

    /// Index of the winning player once known.
    pub fn winner(&self) -> Option<usize> {
        match self {
            Phase::Placement(_) => None,
            Phase::Shooting(p) => p.winner(),
            Phase::ExtendedShooting(p) => p.winner(),
            Phase::End(p) => p.winner(),
        }
    }

    /// Click equivalent on a cell of the acting player's own board or the
    /// opponent's.
    pub fn cell_action(&mut self, ctx: &mut PhaseContext<'_>, at: Coord, side: Side) -> Outcome {
        match self {
            Phase::Placement(p) => p.cell_action(ctx, at, side),
            Phase::Shooting(p) => p.cell_action(ctx, at, side),
            Phase::ExtendedShooting(p) => p.cell_action(ctx, at, side),
            Phase::End(_) => Outcome::rejected(),
        }
    }

    /// Rotate the object being placed. False outside placement.
    pub fn toggle_orientation(&mut self) -> bool {
        match self {
            Phase::Placement(p) => {
                p.toggle_orientation();
                true
            }
            _ => false,
        }
    }

    /// Template of the object the acting player places next.
    pub fn current_object(&self) -> Option<ObjectTemplate> {
        match self {
            Phase::Placement(p) => p.current_object(),
            _ => None,
        }
    }

    /// Let the acting computer move: place its fleet, or pick a target and
    /// schedule the shot. Returns the outcome when something changed
    /// immediately, `None` when nothing was due or a shot is now pending.
    pub fn computer_move(&mut self, ctx: &mut PhaseContext<'_>) -> Option<Outcome> {
        match self {
            Phase::Placement(p) => p.computer_move(ctx),
            Phase::Shooting(p) => p.computer_move(ctx),
            Phase::ExtendedShooting(p) => p.computer_move(ctx),
            Phase::End(_) => None,
        }
    }

    /// Deliver a fired timer. Stale tickets are ignored and return `None`.
    pub fn fire(&mut self, ctx: &mut PhaseContext<'_>, ticket: TimerTicket) -> Option<Outcome> {
        match self {
            Phase::Shooting(p) => p.fire(ctx, ticket),
            Phase::ExtendedShooting(p) => p.fire(ctx, ticket),
            Phase::Placement(_) | Phase::End(_) => None,
        }
    }

    /// Whether a computer shot is waiting on a timer.
    pub fn has_pending_timer(&self) -> bool {
        match self {
            Phase::Shooting(p) => p.has_pending_timer(),
            Phase::ExtendedShooting(p) => p.has_pending_timer(),
            Phase::Placement(_) | Phase::End(_) => false,
        }
    }

    /// Cancel every outstanding timer. Called before the phase is dropped.
    pub fn cancel_timers(&mut self) {
        match self {
            Phase::Shooting(p) => p.cancel_timers(),
            Phase::ExtendedShooting(p) => p.cancel_timers(),
            Phase::Placement(_) | Phase::End(_) => {}
        }
    }

    /// Extended mode: the tentatively selected ship.
    pub fn selected_object(&self) -> Option<ObjectId> {
        match self {
            Phase::ExtendedShooting(p) => p.selected_object(),
            _ => None,
        }
    }

    /// Extended mode: the ship confirmed for this turn.
    pub fn active_object(&self) -> Option<ObjectId> {
        match self {
            Phase::ExtendedShooting(p) => p.active_object(),
            _ => None,
        }
    }
}
