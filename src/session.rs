//! A running match: the single live phase, the two players, and the
//! plumbing around them.

use log::{debug, info};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::board::{CellState, ObjectId};
use crate::common::Coord;
use crate::config::GameSettings;
use crate::game_log::GameLog;
use crate::history::SharedHistory;
use crate::object::{Hittable, ObjectTemplate};
use crate::phase::{Outcome, Phase, PhaseContext, PhaseKind, Preview, Side};
use crate::player::Player;
use crate::timer::{Scheduler, TimerTicket};

/// Presentation hooks. Both methods default to doing nothing.
pub trait GameObserver {
    /// Called after every action with whether it was accepted and whether
    /// it finished the live phase.
    fn on_turn(&mut self, _succeeded: bool, _phase_complete: bool) {}

    /// Called when a new phase becomes live.
    fn on_phase_change(&mut self, _kind: PhaseKind) {}
}

pub struct Session {
    settings: GameSettings,
    players: [Player; 2],
    history: SharedHistory,
    log: GameLog,
    scheduler: Box<dyn Scheduler>,
    phase: Phase,
    observer: Option<Box<dyn GameObserver>>,
    seeder: SmallRng,
}

impl Session {
    /// Create a session with players built from `settings`. Nothing moves
    /// until [`start`](Self::start) is called.
    pub fn new(
        settings: GameSettings,
        history: SharedHistory,
        scheduler: Box<dyn Scheduler>,
        seed: Option<u64>,
    ) -> Self {
        let mut seeder = match seed {
            Some(s) => SmallRng::seed_from_u64(s),
            None => {
                let mut seed_rng = rand::rng();
                SmallRng::from_rng(&mut seed_rng)
            }
        };
        let players = build_players(&settings, &history, &mut seeder);
        Self::assemble(settings, players, history, scheduler, seeder)
    }

    /// Create a session around players built by the caller.
    pub fn with_players(
        settings: GameSettings,
        players: [Player; 2],
        history: SharedHistory,
        scheduler: Box<dyn Scheduler>,
    ) -> Self {
        let mut seed_rng = rand::rng();
        let seeder = SmallRng::from_rng(&mut seed_rng);
        Self::assemble(settings, players, history, scheduler, seeder)
    }

    fn assemble(
        settings: GameSettings,
        players: [Player; 2],
        history: SharedHistory,
        scheduler: Box<dyn Scheduler>,
        seeder: SmallRng,
    ) -> Self {
        let phase = Phase::initial(&settings);
        Self {
            settings,
            players,
            history,
            log: GameLog::new(),
            scheduler,
            phase,
            observer: None,
            seeder,
        }
    }

    pub fn set_observer(&mut self, observer: Box<dyn GameObserver>) {
        self.observer = Some(observer);
    }

    /// Announce the first phase and let computers take their turns.
    pub fn start(&mut self) {
        info!(
            "starting {} vs {}",
            self.players[0].name(),
            self.players[1].name()
        );
        self.log
            .game_start(self.players[0].name(), self.players[1].name());
        let kind = self.phase.kind();
        if let Some(observer) = &mut self.observer {
            observer.on_phase_change(kind);
        }
        self.advance();
    }

    /// Abandon the current match and start a fresh one with new players.
    /// Pending timers of the old match are cancelled.
    pub fn restart(&mut self) {
        self.phase.cancel_timers();
        self.players = build_players(&self.settings, &self.history, &mut self.seeder);
        self.phase = Phase::initial(&self.settings);
        self.log.clear();
        self.start();
    }

    fn context(&mut self) -> (&mut Phase, PhaseContext<'_>) {
        (
            &mut self.phase,
            PhaseContext {
                settings: &self.settings,
                players: &mut self.players,
                history: &self.history,
                log: &mut self.log,
                scheduler: &mut *self.scheduler,
            },
        )
    }

    /// Click equivalent: place or shoot at (x, y) on the acting player's own
    /// board or the opponent's, depending on the live phase.
    pub fn attempt_cell_action(&mut self, x: usize, y: usize, side: Side) -> Outcome {
        let (phase, mut ctx) = self.context();
        let outcome = phase.cell_action(&mut ctx, Coord::new(x, y), side);
        self.after_action(outcome)
    }

    /// Rotate the object being placed.
    pub fn toggle_orientation(&mut self) -> bool {
        self.phase.toggle_orientation()
    }

    /// Place the acting human's remaining fleet at random.
    pub fn auto_place_remaining(&mut self) -> Outcome {
        if !self.current_player().is_human() {
            return Outcome::rejected();
        }
        let (phase, mut ctx) = self.context();
        let outcome = match phase {
            Phase::Placement(p) => p.auto_place_remaining(&mut ctx),
            _ => return Outcome::rejected(),
        };
        self.after_action(outcome)
    }

    /// Footprint of the current object at (x, y), marking its surroundings
    /// on the acting player's board.
    pub fn placement_preview(&mut self, x: usize, y: usize) -> Option<Preview> {
        let (phase, mut ctx) = self.context();
        match phase {
            Phase::Placement(p) => p.preview(&mut ctx, Coord::new(x, y)),
            _ => None,
        }
    }

    /// Extended shooting: toggle one of the acting human's own ships as the
    /// tentative firing ship.
    pub fn select_object(&mut self, id: ObjectId) -> bool {
        let current = self.current_player();
        let valid = current.is_human()
            && current
                .board()
                .object(id)
                .is_some_and(|obj| obj.is_ship() && !obj.is_destroyed());
        match &mut self.phase {
            Phase::ExtendedShooting(p) if valid => p.select(id),
            _ => false,
        }
    }

    /// Extended shooting: confirm the tentative selection.
    pub fn confirm_selection(&mut self) -> bool {
        if !self.current_player().is_human() {
            return false;
        }
        match &mut self.phase {
            Phase::ExtendedShooting(p) => p.confirm_selection(),
            _ => false,
        }
    }

    /// Deliver a fired timer. Returns whether it still belonged to the live
    /// phase and was acted on.
    pub fn fire(&mut self, ticket: TimerTicket) -> bool {
        let (phase, mut ctx) = self.context();
        match phase.fire(&mut ctx, ticket) {
            Some(outcome) => {
                self.after_action(outcome);
                true
            }
            None => false,
        }
    }

    fn after_action(&mut self, outcome: Outcome) -> Outcome {
        self.notify_turn(outcome);
        self.advance();
        outcome
    }

    fn notify_turn(&mut self, outcome: Outcome) {
        if let Some(observer) = &mut self.observer {
            observer.on_turn(outcome.succeeded, outcome.phase_complete);
        }
    }

    /// Apply pending transitions and let computers act until a human's input
    /// or a timer is needed.
    fn advance(&mut self) {
        loop {
            if self.phase.is_complete() {
                let Some(to) = self.phase.next_kind() else {
                    break;
                };
                self.transition(to);
                continue;
            }
            let (phase, mut ctx) = self.context();
            match phase.computer_move(&mut ctx) {
                Some(outcome) => self.notify_turn(outcome),
                None => break,
            }
        }
    }

    /// Replace the live phase. An impossible transition is a wiring bug and
    /// aborts.
    fn transition(&mut self, to: PhaseKind) {
        let from = self.phase.kind();
        self.phase.cancel_timers();
        let (phase, mut ctx) = self.context();
        let next = match phase.successor(to, &mut ctx) {
            Ok(next) => next,
            Err(e) => panic!("{e}"),
        };
        info!("phase {from} -> {to}");
        self.phase = next;
        if let Some(observer) = &mut self.observer {
            observer.on_phase_change(to);
        }
        debug!("now {} to act", self.current_player().name());
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn phase_kind(&self) -> PhaseKind {
        self.phase.kind()
    }

    pub fn is_over(&self) -> bool {
        self.phase.kind() == PhaseKind::End
    }

    pub fn players(&self) -> &[Player; 2] {
        &self.players
    }

    pub fn current_player_index(&self) -> usize {
        self.phase.current_player_index()
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current_player_index()]
    }

    /// Template of the object being placed, during placement.
    pub fn current_object(&self) -> Option<ObjectTemplate> {
        self.phase.current_object()
    }

    /// Display state of a cell on player `player`'s board.
    pub fn cell_state(&self, player: usize, x: usize, y: usize) -> Option<CellState> {
        self.players
            .get(player)?
            .board()
            .cell_state(Coord::new(x, y))
    }

    /// The winner once the match is over. `None` while running, or when the
    /// match ended without one.
    pub fn winner(&self) -> Option<&Player> {
        match &self.phase {
            Phase::End(end) => end.winner().map(|i| &self.players[i]),
            _ => None,
        }
    }

    pub fn selected_object(&self) -> Option<ObjectId> {
        self.phase.selected_object()
    }

    pub fn active_object(&self) -> Option<ObjectId> {
        self.phase.active_object()
    }

    pub fn has_pending_timer(&self) -> bool {
        self.phase.has_pending_timer()
    }

    pub fn log(&self) -> &GameLog {
        &self.log
    }

    pub fn history(&self) -> &SharedHistory {
        &self.history
    }
}

fn build_players(
    settings: &GameSettings,
    history: &SharedHistory,
    seeder: &mut SmallRng,
) -> [Player; 2] {
    let [first, second] = &settings.players;
    let mut make = |p| {
        let rng = SmallRng::seed_from_u64(seeder.random());
        Player::from_settings(p, settings.width, settings.height, rng, history)
    };
    [make(first), make(second)]
}
