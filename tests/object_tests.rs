use fleet_duel::{
    Body, Coord, GameObject, Hittable, Mine, ObjectKind, ObjectTemplate, Orientation, Ship,
    ShipClass,
};

#[test]
fn test_ship_sizes() {
    assert_eq!(ShipClass::Battleship.size(), 5);
    assert_eq!(ShipClass::Cruiser.size(), 4);
    assert_eq!(ShipClass::Destroyer.size(), 3);
    assert_eq!(ShipClass::Submarine.size(), 2);
    assert_eq!(ObjectKind::Mine.size(), 1);
}

#[test]
fn test_ship_destroyed_after_size_hits() {
    let mut ship = Ship::new(ShipClass::Destroyer);
    assert!(!ship.on_hit(Coord::new(0, 0)));
    assert!(!ship.on_hit(Coord::new(1, 0)));
    assert!(ship.on_hit(Coord::new(2, 0)));
    assert!(ship.is_destroyed());
    // Extra hits never push the count past the size.
    ship.on_hit(Coord::new(2, 0));
    assert_eq!(ship.hits(), 3);
}

#[test]
fn test_mine_destroyed_by_first_hit() {
    let mut mine = Mine::new();
    assert!(!mine.is_destroyed());
    assert!(mine.on_hit(Coord::new(4, 4)));
    assert!(mine.triggered());
}

#[test]
fn test_forced_destroy() {
    let mut object = ObjectTemplate::ship(ShipClass::Cruiser).instantiate(Coord::new(0, 0));
    object.on_hit(Coord::new(0, 0));
    object.destroy();
    assert!(object.is_destroyed());
    assert_eq!(object.hits(), 4);
    assert!(matches!(object.body(), Body::Ship(s) if s.class() == ShipClass::Cruiser));
}

#[test]
fn test_templates_produce_fresh_objects() {
    let template = ObjectTemplate::ship(ShipClass::Submarine);
    let a = template.instantiate(Coord::new(0, 0));
    let mut b = template.instantiate(Coord::new(5, 5));
    b.on_hit(Coord::new(5, 5));
    assert_eq!(a.hits(), 0);
    assert_eq!(b.hits(), 1);
    assert_eq!(template.orientation, Orientation::Horizontal);
    assert_eq!(template.rotated().rotated(), template);
}

#[test]
fn test_unplaced_object_has_no_coordinates() {
    let object = GameObject::new(ObjectKind::Mine, Orientation::Vertical);
    assert!(object.coordinates().is_empty());
    assert_eq!(object.origin(), None);
    assert!(object.is_mine());
    assert!(!object.is_placed());
    assert_eq!(object.name(), "Mine");
}
