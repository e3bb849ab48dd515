use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use fleet_duel::{
    Coord, Difficulty, GameLog, GameSettings, ManualScheduler, MemoryHistory, ObjectTemplate,
    Orientation, Phase, PhaseContext, PhaseError, PhaseKind, PlacementPhase, Player,
    SharedHistory, ShipClass, ShootingPhase, Side,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;

struct Fixture {
    settings: GameSettings,
    players: [Player; 2],
    memory: Rc<RefCell<MemoryHistory>>,
    history: SharedHistory,
    log: GameLog,
    scheduler: ManualScheduler,
}

impl Fixture {
    fn new(players: [Player; 2]) -> Self {
        let memory = Rc::new(RefCell::new(MemoryHistory::new()));
        let history: SharedHistory = memory.clone();
        Self {
            settings: GameSettings {
                computer_delay_ms: 250,
                ..GameSettings::default()
            },
            players,
            memory,
            history,
            log: GameLog::new(),
            scheduler: ManualScheduler::new(),
        }
    }

    fn humans() -> Self {
        Self::new([human("Ada", 1), human("Bob", 2)])
    }

    fn ctx(&mut self) -> PhaseContext<'_> {
        PhaseContext {
            settings: &self.settings,
            players: &mut self.players,
            history: &self.history,
            log: &mut self.log,
            scheduler: &mut self.scheduler,
        }
    }
}

fn human(name: &str, seed: u64) -> Player {
    Player::human(name, 10, 10, SmallRng::seed_from_u64(seed))
}

fn computer(name: &str, seed: u64, history: &SharedHistory) -> Player {
    Player::seeded_computer(name, Difficulty::Easy, 10, 10, seed, history)
}

/// A one-submarine fleet, placed at (0,0) by both players.
fn shooting_phase(fx: &mut Fixture) -> Phase {
    let mut phase = Phase::Placement(PlacementPhase::with_fleet(
        vec![ObjectTemplate::ship(ShipClass::Submarine)],
        false,
    ));
    let mut ctx = fx.ctx();
    assert!(phase.cell_action(&mut ctx, Coord::new(0, 0), Side::Own).succeeded);
    let done = phase.cell_action(&mut ctx, Coord::new(0, 0), Side::Own);
    assert!(done.phase_complete);
    phase.successor(PhaseKind::Shooting, &mut ctx).unwrap()
}

#[test]
fn test_placement_alternates_players() {
    let mut fx = Fixture::humans();
    let fleet = vec![
        ObjectTemplate::ship(ShipClass::Submarine),
        ObjectTemplate::mine(),
    ];
    let mut phase = Phase::Placement(PlacementPhase::with_fleet(fleet, false));
    let mut ctx = fx.ctx();

    assert_eq!(phase.kind(), PhaseKind::Placement);
    assert_eq!(phase.current_player_index(), 0);
    assert_eq!(
        phase.current_object(),
        Some(ObjectTemplate::ship(ShipClass::Submarine))
    );

    // Placement happens on the own board only.
    assert!(!phase.cell_action(&mut ctx, Coord::new(0, 0), Side::Opponent).succeeded);

    let placed = phase.cell_action(&mut ctx, Coord::new(0, 0), Side::Own);
    assert!(placed.succeeded);
    assert!(!placed.phase_complete);
    assert_eq!(phase.current_object(), Some(ObjectTemplate::mine()));

    // Touching the submarine diagonally is refused and the mine stays current.
    assert!(!phase.cell_action(&mut ctx, Coord::new(2, 1), Side::Own).succeeded);
    assert_eq!(phase.current_player_index(), 0);

    assert!(phase.cell_action(&mut ctx, Coord::new(5, 5), Side::Own).succeeded);
    assert_eq!(phase.current_player_index(), 1);

    assert!(phase.cell_action(&mut ctx, Coord::new(8, 9), Side::Own).succeeded);
    let last = phase.cell_action(&mut ctx, Coord::new(0, 9), Side::Own);
    assert!(last.succeeded);
    assert!(last.phase_complete);
    assert!(phase.is_complete());
    assert_eq!(phase.next_kind(), Some(PhaseKind::Shooting));
    drop(ctx);

    assert_eq!(fx.players[0].board().object_count(), 2);
    assert_eq!(fx.players[1].board().object_count(), 2);
    assert_eq!(fx.memory.borrow().placements().len(), 4);
    let rejected = fx
        .log
        .entries()
        .iter()
        .filter(|e| e.result == "rejected")
        .count();
    assert_eq!(rejected, 1);
}

#[test]
fn test_toggle_orientation_rotates_current_object() {
    let mut fx = Fixture::humans();
    let mut phase = Phase::Placement(PlacementPhase::with_fleet(
        vec![ObjectTemplate::ship(ShipClass::Destroyer)],
        false,
    ));
    assert!(phase.toggle_orientation());
    assert_eq!(
        phase.current_object().map(|t| t.orientation),
        Some(Orientation::Vertical)
    );
    let mut ctx = fx.ctx();
    assert!(phase.cell_action(&mut ctx, Coord::new(3, 0), Side::Own).succeeded);
    drop(ctx);
    let board = fx.players[0].board();
    for y in 0..3 {
        assert!(board.cell(Coord::new(3, y)).unwrap().is_occupied());
    }
    assert_eq!(
        fx.memory.borrow().placements()[0].orientation,
        Orientation::Vertical
    );
}

#[test]
fn test_rotation_does_not_carry_over_to_later_objects() {
    let mut fx = Fixture::humans();
    let fleet = vec![
        ObjectTemplate::ship(ShipClass::Destroyer),
        ObjectTemplate::ship(ShipClass::Submarine),
    ];
    let mut phase = Phase::Placement(PlacementPhase::with_fleet(fleet.clone(), false));
    let mut ctx = fx.ctx();

    assert!(phase.toggle_orientation());
    assert!(phase.cell_action(&mut ctx, Coord::new(0, 0), Side::Own).succeeded);
    assert_eq!(
        phase.current_object().map(|t| t.orientation),
        Some(Orientation::Horizontal)
    );

    assert!(phase.toggle_orientation());
    assert!(phase.cell_action(&mut ctx, Coord::new(5, 5), Side::Own).succeeded);
    assert_eq!(phase.current_player_index(), 1);
    assert_eq!(
        phase.current_object(),
        Some(ObjectTemplate::ship(ShipClass::Destroyer))
    );
    match &phase {
        Phase::Placement(p) => assert_eq!(p.fleet(), fleet.as_slice()),
        other => panic!("unexpected phase {:?}", other.kind()),
    }
}

#[test]
fn test_computer_places_immediately() {
    let history = MemoryHistory::shared();
    let mut fx = Fixture::new([human("Ada", 1), computer("Cpu", 2, &history)]);
    let mut phase = Phase::Placement(PlacementPhase::with_fleet(
        fleet_duel::standard_fleet(),
        false,
    ));
    let mut ctx = fx.ctx();
    // Nothing to do while the human is placing.
    assert_eq!(phase.computer_move(&mut ctx), None);

    let Phase::Placement(placement) = &mut phase else {
        unreachable!()
    };
    assert!(placement.auto_place_remaining(&mut ctx).succeeded);
    let outcome = phase.computer_move(&mut ctx).unwrap();
    assert!(outcome.phase_complete);
    drop(ctx);
    assert_eq!(fx.players[1].board().object_count(), 10);
    // Automatic placements are not learned from.
    assert!(fx.memory.borrow().placements().is_empty());
}

#[test]
fn test_invalid_transition_is_an_error() {
    let mut fx = Fixture::humans();
    let phase = Phase::initial(&fx.settings);
    let mut ctx = fx.ctx();
    let err = phase.successor(PhaseKind::End, &mut ctx).unwrap_err();
    assert_eq!(
        err,
        PhaseError::InvalidTransition {
            from: PhaseKind::Placement,
            to: PhaseKind::End
        }
    );
    assert!(phase.successor(PhaseKind::Shooting, &mut ctx).is_ok());
    assert!(phase.successor(PhaseKind::ExtendedShooting, &mut ctx).is_err());
}

#[test]
fn test_turn_alternation() {
    let mut fx = Fixture::humans();
    let mut phase = shooting_phase(&mut fx);
    let mut ctx = fx.ctx();
    assert_eq!(phase.kind(), PhaseKind::Shooting);
    assert_eq!(phase.current_player_index(), 0);

    // Own board is not a target.
    assert!(!phase.cell_action(&mut ctx, Coord::new(5, 5), Side::Own).succeeded);

    let hit = phase.cell_action(&mut ctx, Coord::new(0, 0), Side::Opponent);
    assert!(hit.succeeded && hit.hit);
    assert_eq!(phase.current_player_index(), 0);

    // A repeated shot is ignored and does not use up the turn.
    assert!(!phase.cell_action(&mut ctx, Coord::new(0, 0), Side::Opponent).succeeded);
    assert_eq!(phase.current_player_index(), 0);

    let miss = phase.cell_action(&mut ctx, Coord::new(5, 5), Side::Opponent);
    assert!(miss.succeeded && !miss.hit);
    assert_eq!(phase.current_player_index(), 1);

    let miss = phase.cell_action(&mut ctx, Coord::new(7, 7), Side::Opponent);
    assert!(!miss.hit);
    assert_eq!(phase.current_player_index(), 0);
}

#[test]
fn test_final_hit_ends_shooting() {
    let mut fx = Fixture::humans();
    let mut phase = shooting_phase(&mut fx);
    let mut ctx = fx.ctx();
    phase.cell_action(&mut ctx, Coord::new(0, 0), Side::Opponent);
    let last = phase.cell_action(&mut ctx, Coord::new(1, 0), Side::Opponent);
    assert!(last.hit);
    assert!(last.phase_complete);
    assert_eq!(phase.winner(), Some(0));
    assert!(ctx.players[1].has_lost());
    assert!(!ctx.players[0].has_lost());

    let end = phase.successor(PhaseKind::End, &mut ctx).unwrap();
    assert_eq!(end.kind(), PhaseKind::End);
    assert_eq!(end.winner(), Some(0));
    assert_eq!(end.next_kind(), None);
    drop(ctx);

    assert_eq!(fx.memory.borrow().shots().len(), 2);
    let last_line = fx.log.entries().last().unwrap();
    assert_eq!(last_line.result, "winner: Ada");
}

#[test]
fn test_computer_shot_waits_for_its_timer() {
    let history = MemoryHistory::shared();
    let mut fx = Fixture::new([human("Ada", 1), computer("Cpu", 2, &history)]);
    let mut phase = Phase::Shooting(ShootingPhase::new());
    fx.players[0]
        .board_mut()
        .place(ObjectTemplate::mine().instantiate(Coord::new(9, 9)))
        .unwrap();
    fx.players[1]
        .board_mut()
        .place(ObjectTemplate::mine().instantiate(Coord::new(9, 9)))
        .unwrap();
    let scheduler = fx.scheduler.clone();
    let mut ctx = fx.ctx();

    phase.cell_action(&mut ctx, Coord::new(0, 0), Side::Opponent);
    assert_eq!(phase.current_player_index(), 1);
    assert_eq!(phase.computer_move(&mut ctx), None);
    assert!(phase.has_pending_timer());
    // A second request while the shot is pending does nothing.
    assert_eq!(phase.computer_move(&mut ctx), None);

    let pending = scheduler.pending();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].1, Duration::from_millis(250));
    let ticket = scheduler.pop().unwrap();

    // Humans cannot act for the computer meanwhile.
    assert!(!phase.cell_action(&mut ctx, Coord::new(1, 1), Side::Opponent).succeeded);

    let outcome = phase.fire(&mut ctx, ticket).unwrap();
    assert!(outcome.succeeded);
    assert!(!phase.has_pending_timer());
    // The same ticket cannot fire twice.
    assert_eq!(phase.fire(&mut ctx, ticket), None);
    drop(ctx);

    let shot = fx.players[0].board().cells().filter(|c| c.is_shot()).count();
    assert_eq!(shot, 1);
    // Computer shots are not learned from.
    assert_eq!(fx.memory.borrow().shots().len(), 1);
}

#[test]
fn test_forced_passes_end_without_winner() {
    let history = MemoryHistory::shared();
    let mut fx = Fixture::new([computer("A", 1, &history), computer("B", 2, &history)]);
    for player in &mut fx.players {
        player
            .board_mut()
            .place(ObjectTemplate::mine().instantiate(Coord::new(4, 4)))
            .unwrap();
        player.ai_mut().unwrap().set_available_targets(Vec::new());
    }
    let mut phase = Phase::Shooting(ShootingPhase::new());
    let mut ctx = fx.ctx();

    let first = phase.computer_move(&mut ctx).unwrap();
    assert!(!first.succeeded);
    assert!(!first.phase_complete);
    assert_eq!(phase.current_player_index(), 1);

    let second = phase.computer_move(&mut ctx).unwrap();
    assert!(second.phase_complete);
    assert!(phase.is_complete());
    assert_eq!(phase.winner(), None);

    let end = phase.successor(PhaseKind::End, &mut ctx).unwrap();
    assert_eq!(end.winner(), None);
    drop(ctx);
    let passes = fx
        .log
        .entries()
        .iter()
        .filter(|e| e.action == "passes")
        .count();
    assert_eq!(passes, 2);
}

#[test]
fn test_cancel_drops_pending_shot() {
    let history = MemoryHistory::shared();
    let mut fx = Fixture::new([computer("A", 1, &history), human("Bob", 2)]);
    fx.players[1]
        .board_mut()
        .place(ObjectTemplate::mine().instantiate(Coord::new(4, 4)))
        .unwrap();
    let scheduler = fx.scheduler.clone();
    let mut phase = Phase::Shooting(ShootingPhase::new());
    let mut ctx = fx.ctx();
    assert_eq!(phase.computer_move(&mut ctx), None);
    phase.cancel_timers();
    assert!(!phase.has_pending_timer());
    let stale = scheduler.pop().unwrap();
    assert_eq!(phase.fire(&mut ctx, stale), None);
}
