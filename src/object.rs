//! Placement objects: ships and mines, plus the immutable templates the
//! placement phase instantiates them from.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::common::{Coord, Orientation};

/// Ship classes of the fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipClass {
    /// Length 5.
    Battleship,
    /// Length 4.
    Cruiser,
    /// Length 3.
    Destroyer,
    /// Length 2.
    Submarine,
}

impl ShipClass {
    pub const fn size(self) -> usize {
        match self {
            ShipClass::Battleship => 5,
            ShipClass::Cruiser => 4,
            ShipClass::Destroyer => 3,
            ShipClass::Submarine => 2,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ShipClass::Battleship => "Battleship",
            ShipClass::Cruiser => "Cruiser",
            ShipClass::Destroyer => "Destroyer",
            ShipClass::Submarine => "Submarine",
        }
    }
}

/// What a placement object is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Ship(ShipClass),
    Mine,
}

impl ObjectKind {
    /// Number of cells the object occupies.
    pub const fn size(self) -> usize {
        match self {
            ObjectKind::Ship(class) => class.size(),
            ObjectKind::Mine => 1,
        }
    }

    /// Display name.
    pub const fn name(self) -> &'static str {
        match self {
            ObjectKind::Ship(class) => class.name(),
            ObjectKind::Mine => "Mine",
        }
    }

    pub fn is_mine(self) -> bool {
        matches!(self, ObjectKind::Mine)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cells covered by an object of `size` starting at `origin`.
///
/// Stops short where a coordinate would overflow. The origin of such a
/// footprint lies past the end of any board, so it never validates.
fn footprint(size: usize, origin: Coord, orientation: Orientation) -> Vec<Coord> {
    (0..size)
        .map_while(|i| match orientation {
            Orientation::Horizontal => origin.x.checked_add(i).map(|x| Coord::new(x, origin.y)),
            Orientation::Vertical => origin.y.checked_add(i).map(|y| Coord::new(origin.x, y)),
        })
        .collect()
}

/// Capability shared by everything that can be shot.
pub trait Hittable {
    /// Register a hit at `at`. Returns whether the object is now destroyed.
    fn on_hit(&mut self, at: Coord) -> bool;

    /// Whether the object is destroyed.
    fn is_destroyed(&self) -> bool;
}

/// Hit accounting for a ship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ship {
    class: ShipClass,
    hits: usize,
}

impl Ship {
    pub fn new(class: ShipClass) -> Self {
        Self { class, hits: 0 }
    }

    pub fn class(&self) -> ShipClass {
        self.class
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Destroy the ship outright, whatever its previous damage.
    pub fn destroy(&mut self) {
        self.hits = self.class.size();
    }
}

impl Hittable for Ship {
    fn on_hit(&mut self, _at: Coord) -> bool {
        if self.hits < self.class.size() {
            self.hits += 1;
        }
        self.is_destroyed()
    }

    fn is_destroyed(&self) -> bool {
        self.hits >= self.class.size()
    }
}

/// A single-cell mine. Destroyed by the first hit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mine {
    triggered: bool,
}

impl Mine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triggered(&self) -> bool {
        self.triggered
    }
}

impl Hittable for Mine {
    fn on_hit(&mut self, _at: Coord) -> bool {
        self.triggered = true;
        self.is_destroyed()
    }

    fn is_destroyed(&self) -> bool {
        self.triggered
    }
}

/// Ship or mine state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Ship(Ship),
    Mine(Mine),
}

/// An object that can be positioned and placed on a [`Board`](crate::Board).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameObject {
    body: Body,
    orientation: Orientation,
    coordinates: Vec<Coord>,
    placed: bool,
}

impl GameObject {
    /// Create an unplaced, unpositioned object.
    pub fn new(kind: ObjectKind, orientation: Orientation) -> Self {
        let body = match kind {
            ObjectKind::Ship(class) => Body::Ship(Ship::new(class)),
            ObjectKind::Mine => Body::Mine(Mine::new()),
        };
        Self {
            body,
            orientation,
            coordinates: Vec::new(),
            placed: false,
        }
    }

    pub fn kind(&self) -> ObjectKind {
        match &self.body {
            Body::Ship(ship) => ObjectKind::Ship(ship.class()),
            Body::Mine(_) => ObjectKind::Mine,
        }
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn size(&self) -> usize {
        self.kind().size()
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Occupied cells, empty until [`set_position`](Self::set_position) is called.
    pub fn coordinates(&self) -> &[Coord] {
        &self.coordinates
    }

    /// First cell of the footprint.
    pub fn origin(&self) -> Option<Coord> {
        self.coordinates.first().copied()
    }

    pub fn is_placed(&self) -> bool {
        self.placed
    }

    pub(crate) fn set_placed(&mut self, placed: bool) {
        self.placed = placed;
    }

    pub fn is_ship(&self) -> bool {
        matches!(self.body, Body::Ship(_))
    }

    pub fn is_mine(&self) -> bool {
        matches!(self.body, Body::Mine(_))
    }

    /// Hits taken so far. A triggered mine counts as one.
    pub fn hits(&self) -> usize {
        match &self.body {
            Body::Ship(ship) => ship.hits(),
            Body::Mine(mine) => usize::from(mine.triggered()),
        }
    }

    /// Compute coordinates from `origin` and the current orientation.
    pub fn set_position(&mut self, origin: Coord) {
        self.coordinates = footprint(self.size(), origin, self.orientation);
    }

    /// Toggle orientation. Coordinates are dropped until the object is
    /// positioned again.
    pub fn rotate(&mut self) {
        self.orientation = self.orientation.rotated();
        self.coordinates.clear();
    }

    /// Force destruction: a ship takes full damage, a mine is triggered.
    pub fn destroy(&mut self) {
        match &mut self.body {
            Body::Ship(ship) => ship.destroy(),
            Body::Mine(mine) => mine.triggered = true,
        }
    }
}

impl Hittable for GameObject {
    fn on_hit(&mut self, at: Coord) -> bool {
        match &mut self.body {
            Body::Ship(ship) => ship.on_hit(at),
            Body::Mine(mine) => mine.on_hit(at),
        }
    }

    fn is_destroyed(&self) -> bool {
        match &self.body {
            Body::Ship(ship) => ship.is_destroyed(),
            Body::Mine(mine) => mine.is_destroyed(),
        }
    }
}

impl fmt::Display for GameObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) [{}]", self.name(), self.size(), self.orientation)
    }
}

/// Immutable description of an object to place: kind plus orientation.
///
/// A placement request is a template plus a start cell; every request
/// produces a fresh [`GameObject`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectTemplate {
    pub kind: ObjectKind,
    pub orientation: Orientation,
}

impl ObjectTemplate {
    pub const fn new(kind: ObjectKind, orientation: Orientation) -> Self {
        Self { kind, orientation }
    }

    pub const fn ship(class: ShipClass) -> Self {
        Self::new(ObjectKind::Ship(class), Orientation::Horizontal)
    }

    pub const fn mine() -> Self {
        Self::new(ObjectKind::Mine, Orientation::Horizontal)
    }

    /// Same kind, other orientation.
    pub fn rotated(self) -> Self {
        Self {
            orientation: self.orientation.rotated(),
            ..self
        }
    }

    /// Same kind, given orientation.
    pub fn with_orientation(self, orientation: Orientation) -> Self {
        Self {
            orientation,
            ..self
        }
    }

    /// Cells the object would cover when started at `origin`.
    pub fn footprint(&self, origin: Coord) -> Vec<Coord> {
        footprint(self.kind.size(), origin, self.orientation)
    }

    /// A fresh, positioned but unplaced object.
    pub fn instantiate(&self, origin: Coord) -> GameObject {
        let mut object = GameObject::new(self.kind, self.orientation);
        object.set_position(origin);
        object
    }
}

impl fmt::Display for ObjectTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) [{}]",
            self.kind.name(),
            self.kind.size(),
            self.orientation
        )
    }
}
