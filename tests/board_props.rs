use fleet_duel::{Board, Coord, Hittable, ObjectKind, ObjectTemplate, Orientation, ShipClass};
use proptest::prelude::*;
use rand::{rngs::SmallRng, Rng, SeedableRng};

const SIZE: usize = 10;

fn kind_strategy() -> impl Strategy<Value = ObjectKind> {
    prop_oneof![
        Just(ObjectKind::Ship(ShipClass::Battleship)),
        Just(ObjectKind::Ship(ShipClass::Cruiser)),
        Just(ObjectKind::Ship(ShipClass::Destroyer)),
        Just(ObjectKind::Ship(ShipClass::Submarine)),
        Just(ObjectKind::Mine),
    ]
}

fn orientation_strategy() -> impl Strategy<Value = Orientation> {
    prop_oneof![Just(Orientation::Horizontal), Just(Orientation::Vertical)]
}

/// A board with a few random objects and random shots.
fn random_board(seed: u64) -> Board {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut board = Board::new(SIZE, SIZE);
    for template in fleet_duel::extended_fleet().into_iter().take(6) {
        if let Some((at, orientation)) = board.random_placement(&mut rng, template.kind) {
            board
                .place(template.with_orientation(orientation).instantiate(at))
                .unwrap();
        }
    }
    let shots = rng.random_range(0..SIZE * SIZE);
    for _ in 0..shots {
        let at = Coord::new(rng.random_range(0..SIZE), rng.random_range(0..SIZE));
        board.shoot_at(at);
    }
    board
}

fn snapshot(board: &Board) -> Vec<(bool, bool, usize)> {
    board
        .cells()
        .map(|c| {
            let hits = c
                .object()
                .and_then(|id| board.object(id))
                .map_or(0, |obj| obj.hits());
            (c.is_occupied(), c.is_shot(), hits)
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn placement_never_touches_existing_objects(
        seed in any::<u64>(),
        kind in kind_strategy(),
        orientation in orientation_strategy(),
        x in 0..SIZE,
        y in 0..SIZE,
    ) {
        let mut board = random_board(seed);
        let before = snapshot(&board);
        let count = board.object_count();
        let object = ObjectTemplate::new(kind, orientation).instantiate(Coord::new(x, y));
        let footprint = object.coordinates().to_vec();

        let touched = footprint.iter().any(|&c| {
            board.cell(c).map_or(true, |cell| cell.is_occupied())
                || board.surrounding(c).iter().any(|&n| board.cell(n).is_some_and(|cell| cell.is_occupied()))
        });

        match board.place(object) {
            Ok(_) => {
                prop_assert!(!touched);
                prop_assert_eq!(board.object_count(), count + 1);
            }
            Err(_) => {
                prop_assert!(touched);
                prop_assert_eq!(snapshot(&board), before);
                prop_assert_eq!(board.object_count(), count);
            }
        }
    }

    #[test]
    fn repeated_shot_changes_nothing(seed in any::<u64>(), x in 0..SIZE, y in 0..SIZE) {
        let mut board = random_board(seed);
        let at = Coord::new(x, y);
        board.shoot_at(at);
        let after_first = snapshot(&board);
        let destroyed: Vec<bool> = board.objects().map(|(_, o)| o.is_destroyed()).collect();

        let again = board.shoot_at(at);
        prop_assert!(again.already_shot);
        prop_assert!(!again.hit);
        prop_assert!(!again.destroyed);
        prop_assert_eq!(snapshot(&board), after_first);
        let destroyed_again: Vec<bool> = board.objects().map(|(_, o)| o.is_destroyed()).collect();
        prop_assert_eq!(destroyed, destroyed_again);
    }

    #[test]
    fn hits_never_exceed_size(seed in any::<u64>()) {
        let board = random_board(seed);
        for (_, object) in board.objects() {
            prop_assert!(object.hits() <= object.size());
            prop_assert_eq!(object.is_destroyed(), object.hits() == object.size());
            let shot_cells = object
                .coordinates()
                .iter()
                .filter(|&&c| board.cell(c).is_some_and(|cell| cell.is_shot()))
                .count();
            prop_assert_eq!(shot_cells, object.hits());
        }
    }
}
