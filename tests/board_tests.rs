use fleet_duel::{
    Board, CannotPlaceReason, CellState, Coord, Hittable, ObjectTemplate, Orientation, ShipClass,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn ship(class: ShipClass, x: usize, y: usize) -> fleet_duel::GameObject {
    ObjectTemplate::ship(class).instantiate(Coord::new(x, y))
}

#[test]
fn test_destroyer_blocks_diagonal_neighbour() {
    let mut board = Board::new(10, 10);
    let id = board.place(ship(ShipClass::Destroyer, 0, 0)).unwrap();
    let placed = board.object(id).unwrap();
    assert_eq!(
        placed.coordinates(),
        &[Coord::new(0, 0), Coord::new(1, 0), Coord::new(2, 0)]
    );
    assert!(placed.is_placed());

    let sub = ship(ShipClass::Submarine, 1, 1);
    assert!(!board.can_place(&sub));
    let err = board.place(sub).unwrap_err();
    assert_eq!(err.reason(), CannotPlaceReason::Adjacent);
    assert!(!err.into_object().is_placed());
    assert_eq!(board.object_count(), 1);
    assert!(!board.cell(Coord::new(1, 1)).unwrap().is_occupied());
}

#[test]
fn test_placement_rejections() {
    let mut board = Board::new(5, 5);
    board.place(ship(ShipClass::Submarine, 0, 0)).unwrap();

    let overlap = board.check_placement(&ship(ShipClass::Submarine, 1, 0));
    assert_eq!(overlap, Err(CannotPlaceReason::Overlap));

    let off_edge = board.check_placement(&ship(ShipClass::Battleship, 1, 4));
    assert_eq!(off_edge, Err(CannotPlaceReason::OutOfBounds));

    let unpositioned = fleet_duel::GameObject::new(
        fleet_duel::ObjectKind::Mine,
        Orientation::Horizontal,
    );
    assert_eq!(
        board.check_placement(&unpositioned),
        Err(CannotPlaceReason::Unpositioned)
    );

    let far_right = ship(ShipClass::Cruiser, usize::MAX, 0);
    assert_eq!(board.check_placement(&far_right), Err(CannotPlaceReason::OutOfBounds));
    let far_down = ObjectTemplate::ship(ShipClass::Cruiser)
        .rotated()
        .instantiate(Coord::new(0, usize::MAX - 1));
    assert_eq!(board.check_placement(&far_down), Err(CannotPlaceReason::OutOfBounds));

    // One free column between objects is enough.
    assert!(board.can_place(&ship(ShipClass::Submarine, 3, 0)));
}

#[test]
fn test_shot_into_water_is_idempotent() {
    let mut board = Board::new(10, 10);
    let first = board.shoot_at(Coord::new(5, 5));
    assert!(!first.hit);
    assert!(!first.destroyed);
    assert!(first.is_valid());

    let again = board.shoot_at(Coord::new(5, 5));
    assert!(!again.hit);
    assert!(!again.destroyed);
    assert!(again.already_shot);
    assert_eq!(board.cell_state(Coord::new(5, 5)), Some(CellState::Miss));
}

#[test]
fn test_submarine_is_destroyed_by_second_hit() {
    let mut board = Board::new(10, 10);
    let id = board.place(ship(ShipClass::Submarine, 0, 0)).unwrap();

    let first = board.shoot_at(Coord::new(0, 0));
    assert!(first.hit);
    assert!(!first.destroyed);
    assert_eq!(first.hit_object, Some(id));

    let second = board.shoot_at(Coord::new(1, 0));
    assert!(second.hit);
    assert!(second.destroyed);
    let sub = board.object(id).unwrap();
    assert!(sub.is_destroyed());
    assert_eq!(sub.hits(), sub.size());

    // Re-shooting a destroyed ship changes nothing.
    let repeat = board.shoot_at(Coord::new(1, 0));
    assert!(!repeat.hit);
    assert_eq!(board.object(id).unwrap().hits(), 2);
}

#[test]
fn test_out_of_bounds_shot_is_rejected() {
    let mut board = Board::new(3, 3);
    let result = board.shoot_at(Coord::new(3, 0));
    assert!(result.out_of_bounds);
    assert!(!result.is_valid());
    assert!(board.cells().all(|c| !c.is_shot()));
}

#[test]
fn test_all_destroyed_fixtures() {
    // Nothing placed: vacuously lost.
    let empty = Board::new(4, 4);
    assert!(empty.all_destroyed());

    let mut single = Board::new(4, 4);
    single
        .place(ObjectTemplate::mine().instantiate(Coord::new(2, 2)))
        .unwrap();
    assert!(!single.all_destroyed());
    single.shoot_at(Coord::new(2, 2));
    assert!(single.all_destroyed());

    let mut fleet = Board::new(10, 10);
    fleet.place(ship(ShipClass::Submarine, 0, 0)).unwrap();
    fleet.place(ship(ShipClass::Destroyer, 0, 5)).unwrap();
    for (x, y) in [(0, 0), (1, 0), (0, 5), (1, 5)] {
        fleet.shoot_at(Coord::new(x, y));
    }
    assert!(!fleet.all_destroyed());
    fleet.shoot_at(Coord::new(2, 5));
    assert!(fleet.all_destroyed());
}

#[test]
fn test_random_placement_of_full_fleet() {
    let mut rng = SmallRng::seed_from_u64(42);
    let mut board = Board::new(10, 10);
    for template in fleet_duel::extended_fleet() {
        let (at, orientation) = board.random_placement(&mut rng, template.kind).unwrap();
        board
            .place(template.with_orientation(orientation).instantiate(at))
            .unwrap();
    }
    assert_eq!(board.object_count(), 13);
    let occupied = board.cells().filter(|c| c.is_occupied()).count();
    assert_eq!(occupied, 5 + 2 * 4 + 3 * 3 + 4 * 2 + 3);
}

#[test]
fn test_remove_frees_cells() {
    let mut board = Board::new(6, 6);
    let id = board.place(ship(ShipClass::Destroyer, 1, 1)).unwrap();
    let object = board.remove(id).unwrap();
    assert!(!object.is_placed());
    assert!(board.cells().all(|c| !c.is_occupied()));
    assert!(board.object(id).is_none());
}

#[test]
fn test_adjacent_markers_are_cosmetic() {
    let mut board = Board::new(5, 5);
    let probe = ship(ShipClass::Submarine, 1, 1);
    board.mark_adjacent_for(&probe);
    let marked = board.cells().filter(|c| c.is_adjacent()).count();
    // 4x3 box around a horizontal pair, minus the two footprint cells.
    assert_eq!(marked, 10);
    assert!(board.can_place(&probe));
    board.clear_adjacent_markers();
    assert!(board.cells().all(|c| !c.is_adjacent()));
}

#[test]
fn test_unshot_occupied_tracks_shots() {
    let mut board = Board::new(5, 5);
    board.place(ship(ShipClass::Submarine, 0, 0)).unwrap();
    board.shoot_at(Coord::new(0, 0));
    assert_eq!(board.unshot_occupied(), vec![Coord::new(1, 0)]);
}
