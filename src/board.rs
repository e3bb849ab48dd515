//! Game board: a fixed grid of cells, the registry of placed objects, and the
//! placement and shooting rules.

use std::collections::BTreeMap;

use log::debug;
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::common::{
    CannotPlaceReason, Coord, Orientation, PlaceError, ShootResult, ORTHOGONAL, SURROUNDING,
};
use crate::config::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::object::{GameObject, Hittable, ObjectKind, ObjectTemplate};

/// Handle to an object in a board's registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(usize);

/// What a cell looks like to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Empty,
    Ship,
    Mine,
    HitShip,
    HitMine,
    Miss,
}

/// A single grid position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    coord: Coord,
    object: Option<ObjectId>,
    shot: bool,
    adjacent: bool,
}

impl Cell {
    fn new(coord: Coord) -> Self {
        Self {
            coord,
            object: None,
            shot: false,
            adjacent: false,
        }
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }

    /// The occupying object, if any.
    pub fn object(&self) -> Option<ObjectId> {
        self.object
    }

    pub fn is_occupied(&self) -> bool {
        self.object.is_some()
    }

    pub fn is_shot(&self) -> bool {
        self.shot
    }

    /// Shot and occupied.
    pub fn is_hit(&self) -> bool {
        self.shot && self.object.is_some()
    }

    /// Shot and empty.
    pub fn is_miss(&self) -> bool {
        self.shot && self.object.is_none()
    }

    /// Preview marker only. Never consulted by the rules.
    pub fn is_adjacent(&self) -> bool {
        self.adjacent
    }
}

/// A player's board.
#[derive(Debug, Clone)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    objects: BTreeMap<ObjectId, GameObject>,
    next_id: usize,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl Board {
    /// Create an empty `width` x `height` board.
    pub fn new(width: usize, height: usize) -> Self {
        let cells = (0..height)
            .flat_map(|y| (0..width).map(move |x| Cell::new(Coord::new(x, y))))
            .collect();
        Self {
            width,
            height,
            cells,
            objects: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, at: Coord) -> bool {
        at.x < self.width && at.y < self.height
    }

    fn index(&self, at: Coord) -> Option<usize> {
        self.in_bounds(at).then(|| at.y * self.width + at.x)
    }

    /// The cell at `at`, or `None` when out of bounds.
    pub fn cell(&self, at: Coord) -> Option<&Cell> {
        let i = self.index(at)?;
        self.cells.get(i)
    }

    fn cell_mut(&mut self, at: Coord) -> Option<&mut Cell> {
        let i = self.index(at)?;
        self.cells.get_mut(i)
    }

    /// All cells, row by row.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Every coordinate of the board, column by column.
    pub fn coordinates(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.width).flat_map(move |x| (0..self.height).map(move |y| Coord::new(x, y)))
    }

    /// In-bounds orthogonal neighbours of `at`.
    pub fn neighbors(&self, at: Coord) -> Vec<Coord> {
        self.offsets(at, &ORTHOGONAL)
    }

    /// In-bounds Moore neighbourhood of `at` (diagonals included).
    pub fn surrounding(&self, at: Coord) -> Vec<Coord> {
        self.offsets(at, &SURROUNDING)
    }

    fn offsets(&self, at: Coord, steps: &[(isize, isize)]) -> Vec<Coord> {
        steps
            .iter()
            .filter_map(|&(dx, dy)| at.offset(dx, dy))
            .filter(|c| self.in_bounds(*c))
            .collect()
    }

    /// Placed objects in placement order.
    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &GameObject)> {
        self.objects.iter().map(|(id, obj)| (*id, obj))
    }

    pub fn object(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(&id)
    }

    pub(crate) fn object_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.objects.get_mut(&id)
    }

    /// The object occupying `at`, if any.
    pub fn object_at(&self, at: Coord) -> Option<(ObjectId, &GameObject)> {
        let id = self.cell(at)?.object?;
        self.object(id).map(|obj| (id, obj))
    }

    /// Number of placed objects.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Whether every placed object is destroyed. Vacuously true for an empty board.
    pub fn all_destroyed(&self) -> bool {
        self.objects.values().all(|obj| obj.is_destroyed())
    }

    /// Explain why `object` cannot be placed, or `Ok` if it can.
    pub fn check_placement(&self, object: &GameObject) -> Result<(), CannotPlaceReason> {
        if object.coordinates().is_empty() {
            return Err(CannotPlaceReason::Unpositioned);
        }
        for &at in object.coordinates() {
            match self.cell(at) {
                None => return Err(CannotPlaceReason::OutOfBounds),
                Some(cell) if cell.is_occupied() => return Err(CannotPlaceReason::Overlap),
                Some(_) => {}
            }
        }
        for &at in object.coordinates() {
            if self
                .surrounding(at)
                .into_iter()
                .any(|n| self.cell(n).is_some_and(Cell::is_occupied))
            {
                return Err(CannotPlaceReason::Adjacent);
            }
        }
        Ok(())
    }

    /// Whether `object` fits: in bounds, free, and not touching anything.
    pub fn can_place(&self, object: &GameObject) -> bool {
        self.check_placement(object).is_ok()
    }

    /// Place `object`. On failure the board is untouched and the object is
    /// handed back inside the error.
    pub fn place(&mut self, mut object: GameObject) -> Result<ObjectId, PlaceError> {
        if let Err(reason) = self.check_placement(&object) {
            return Err(PlaceError::new(reason, object));
        }
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        for &at in object.coordinates() {
            if let Some(cell) = self.cell_mut(at) {
                cell.object = Some(id);
            }
        }
        object.set_placed(true);
        debug!("placed {} at {:?}", object, object.coordinates());
        self.objects.insert(id, object);
        Ok(id)
    }

    /// Take an object off the board for relocation.
    pub fn remove(&mut self, id: ObjectId) -> Option<GameObject> {
        let mut object = self.objects.remove(&id)?;
        for &at in object.coordinates() {
            if let Some(cell) = self.cell_mut(at) {
                if cell.object == Some(id) {
                    cell.object = None;
                }
            }
        }
        object.set_placed(false);
        Some(object)
    }

    /// Fire at `at`. Out-of-bounds and repeated shots change nothing.
    pub fn shoot_at(&mut self, at: Coord) -> ShootResult {
        let Some(cell) = self.cell_mut(at) else {
            return ShootResult::out_of_bounds();
        };
        if cell.shot {
            return ShootResult::already_shot();
        }
        cell.shot = true;
        let Some(id) = cell.object else {
            return ShootResult::miss();
        };
        let destroyed = match self.objects.get_mut(&id) {
            Some(object) => object.on_hit(at),
            None => false,
        };
        ShootResult {
            hit: true,
            destroyed,
            hit_object: Some(id),
            ..ShootResult::default()
        }
    }

    /// Display state of `at`.
    pub fn cell_state(&self, at: Coord) -> Option<CellState> {
        let cell = self.cell(at)?;
        let mine = self.object_at(at).is_some_and(|(_, obj)| obj.is_mine());
        Some(match (cell.is_occupied(), mine, cell.shot) {
            (true, false, true) => CellState::HitShip,
            (true, true, true) => CellState::HitMine,
            (false, _, true) => CellState::Miss,
            (true, false, false) => CellState::Ship,
            (true, true, false) => CellState::Mine,
            (false, _, false) => CellState::Empty,
        })
    }

    /// Occupied cells that have not been shot yet.
    pub fn unshot_occupied(&self) -> Vec<Coord> {
        self.coordinates()
            .filter(|&c| self.cell(c).is_some_and(|cell| cell.is_occupied() && !cell.shot))
            .collect()
    }

    /// Every start cell and orientation at which `kind` could be placed now.
    pub fn placement_candidates(&self, kind: ObjectKind) -> Vec<(Coord, Orientation)> {
        let mut out = Vec::new();
        for at in self.coordinates() {
            for orientation in [Orientation::Horizontal, Orientation::Vertical] {
                let probe = ObjectTemplate::new(kind, orientation).instantiate(at);
                if self.can_place(&probe) {
                    out.push((at, orientation));
                }
            }
        }
        out
    }

    /// A uniformly random valid start cell and orientation for `kind`.
    pub fn random_placement<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        kind: ObjectKind,
    ) -> Option<(Coord, Orientation)> {
        self.placement_candidates(kind).choose(rng).copied()
    }

    /// Mark the free cells around `object` for a placement preview.
    pub fn mark_adjacent_for(&mut self, object: &GameObject) {
        let around: Vec<Coord> = object
            .coordinates()
            .iter()
            .flat_map(|&c| self.surrounding(c))
            .filter(|c| !object.coordinates().contains(c))
            .collect();
        for at in around {
            if let Some(cell) = self.cell_mut(at) {
                if !cell.is_occupied() {
                    cell.adjacent = true;
                }
            }
        }
    }

    /// Clear every preview marker.
    pub fn clear_adjacent_markers(&mut self) {
        for cell in &mut self.cells {
            cell.adjacent = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_neighbourhoods_are_clipped() {
        let board = Board::new(10, 10);
        assert_eq!(board.neighbors(Coord::new(0, 0)).len(), 2);
        assert_eq!(board.surrounding(Coord::new(0, 0)).len(), 3);
        assert_eq!(board.surrounding(Coord::new(5, 5)).len(), 8);
    }

    #[test]
    fn cell_state_priority() {
        let mut board = Board::new(4, 4);
        board
            .place(ObjectTemplate::mine().instantiate(Coord::new(0, 0)))
            .unwrap();
        assert_eq!(board.cell_state(Coord::new(0, 0)), Some(CellState::Mine));
        board.shoot_at(Coord::new(0, 0));
        assert_eq!(board.cell_state(Coord::new(0, 0)), Some(CellState::HitMine));
        board.shoot_at(Coord::new(3, 3));
        assert_eq!(board.cell_state(Coord::new(3, 3)), Some(CellState::Miss));
        assert_eq!(board.cell_state(Coord::new(2, 2)), Some(CellState::Empty));
        assert_eq!(board.cell_state(Coord::new(4, 0)), None);
    }
}
