//! The bounded spatial index: building placement, removal, and neighbor
//! lookup on a fixed W x H grid.
//!
//! The grid owns every building. Cells map to building ids through a
//! `BTreeMap`, buildings live in a versioned `SlotMap`, and a separate
//! registration-order list provides the stable tick sequence. Invariant:
//! every cell inside a building's footprint refers back to exactly that
//! building, and no two footprints overlap.

use crate::building::{Building, BuildingKind};
use crate::id::BuildingId;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Cardinal directions. The declaration order is clockwise, so rotation
/// is an index step mod 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All four cardinal directions, clockwise from North.
    pub fn all() -> [Direction; 4] {
        [
            Direction::North,
            Direction::East,
            Direction::South,
            Direction::West,
        ]
    }

    /// Rotate 90 degrees clockwise.
    pub fn rotate_cw(self) -> Self {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }

    pub fn opposite(self) -> Self {
        self.rotate_cw().rotate_cw()
    }

    /// Unit grid vector, mathematical convention (north is +y).
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
        }
    }

    /// Index in clockwise declaration order, for flat records.
    pub fn index(self) -> u8 {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }

    pub fn from_index(index: u8) -> Option<Direction> {
        match index {
            0 => Some(Direction::North),
            1 => Some(Direction::East),
            2 => Some(Direction::South),
            3 => Some(Direction::West),
            _ => None,
        }
    }
}

/// A position on the 2D grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The adjacent position one step in the given direction.
    pub fn step(self, dir: Direction) -> GridPosition {
        let (dx, dy) = dir.offset();
        GridPosition::new(self.x + dx, self.y + dy)
    }
}

/// The footprint (size) of a building on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    pub width: u32,
    pub height: u32,
}

impl Footprint {
    /// A 1x1 building.
    pub fn single() -> Self {
        Self {
            width: 1,
            height: 1,
        }
    }

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Iterate over all cells covered by this footprint at the given
    /// anchor (the building's minimum corner).
    pub fn cells(&self, anchor: GridPosition) -> impl Iterator<Item = GridPosition> {
        let w = self.width as i32;
        let h = self.height as i32;
        let ax = anchor.x;
        let ay = anchor.y;
        (0..h).flat_map(move |dy| (0..w).map(move |dx| GridPosition::new(ax + dx, ay + dy)))
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Placement failures. Reported with no side effect on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PlaceError {
    #[error("footprint overlaps an occupied cell")]
    Occupied,
    #[error("footprint extends outside the grid bounds")]
    OutOfBounds,
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// A bounded W x H spatial index that owns the placed buildings.
#[derive(Debug)]
pub struct Grid {
    width: u32,
    height: u32,
    buildings: SlotMap<BuildingId, Building>,
    /// Registration order; the canonical tick sequence.
    order: Vec<BuildingId>,
    /// Cell -> occupying building.
    cells: BTreeMap<GridPosition, BuildingId>,
}

impl Grid {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            buildings: SlotMap::with_key(),
            order: Vec::new(),
            cells: BTreeMap::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn in_bounds(&self, pos: GridPosition) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    // -- Placement --

    /// Place a building. Every footprint cell must be in bounds and
    /// unoccupied before anything is written; a failed placement leaves
    /// the grid untouched.
    pub fn place(
        &mut self,
        kind: BuildingKind,
        position: GridPosition,
        direction: Direction,
    ) -> Result<BuildingId, PlaceError> {
        let footprint = kind.footprint();
        for cell in footprint.cells(position) {
            if !self.in_bounds(cell) {
                return Err(PlaceError::OutOfBounds);
            }
            if self.cells.contains_key(&cell) {
                return Err(PlaceError::Occupied);
            }
        }

        let id = self.buildings.insert(Building {
            position,
            footprint,
            direction,
            kind,
        });
        for cell in footprint.cells(position) {
            self.cells.insert(cell, id);
        }
        self.order.push(id);
        Ok(id)
    }

    /// Remove the building covering `position`, clearing its entire
    /// recorded footprint (not just the queried cell). No-op on an empty
    /// or out-of-bounds cell; idempotent.
    pub fn remove(&mut self, position: GridPosition) {
        let Some(id) = self.id_at(position) else {
            return;
        };
        let (anchor, footprint) = {
            let building = &self.buildings[id];
            (building.position, building.footprint)
        };
        for cell in footprint.cells(anchor) {
            self.cells.remove(&cell);
        }
        self.order.retain(|&other| other != id);
        self.buildings.remove(id);
    }

    /// Discard all buildings and reset the index. Used before a full
    /// snapshot load.
    pub fn clear(&mut self) {
        self.buildings.clear();
        self.order.clear();
        self.cells.clear();
    }

    // -- Queries --

    /// The building id covering a position, if any. Out of bounds is an
    /// ordinary miss.
    pub fn id_at(&self, position: GridPosition) -> Option<BuildingId> {
        self.cells.get(&position).copied()
    }

    pub fn building_at(&self, position: GridPosition) -> Option<&Building> {
        self.id_at(position).and_then(|id| self.buildings.get(id))
    }

    pub fn building_at_mut(&mut self, position: GridPosition) -> Option<&mut Building> {
        let id = self.id_at(position)?;
        self.buildings.get_mut(id)
    }

    pub fn get(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.get(id)
    }

    pub fn get_mut(&mut self, id: BuildingId) -> Option<&mut Building> {
        self.buildings.get_mut(id)
    }

    /// Mutable access to two distinct buildings at once, for synchronous
    /// transfer between a building and its neighbor within one tick step.
    pub fn get_pair_mut(
        &mut self,
        a: BuildingId,
        b: BuildingId,
    ) -> Option<[&mut Building; 2]> {
        self.buildings.get_disjoint_mut([a, b])
    }

    pub fn contains(&self, id: BuildingId) -> bool {
        self.buildings.contains_key(id)
    }

    /// All active building ids in registration order. This is the stable
    /// sequence the tick scheduler snapshots and iterates.
    pub fn active(&self) -> &[BuildingId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::belt::Belt;
    use crate::building::BuildingKind;
    use crate::endpoint::Sink;
    use crate::fixed::Fixed64;
    use crate::machine::{Machine, MachineConfig};

    fn belt() -> BuildingKind {
        BuildingKind::Belt(Belt::new(Fixed64::ONE))
    }

    fn wide_machine() -> BuildingKind {
        BuildingKind::Machine(Machine::new(MachineConfig {
            input_capacity: 10,
            output_capacity: 10,
            footprint: Footprint::new(2, 2),
        }))
    }

    #[test]
    fn direction_rotation_is_clockwise_mod_4() {
        let mut d = Direction::North;
        let expected = [
            Direction::East,
            Direction::South,
            Direction::West,
            Direction::North,
        ];
        for e in expected {
            d = d.rotate_cw();
            assert_eq!(d, e);
        }
    }

    #[test]
    fn direction_offsets_are_unit_vectors() {
        assert_eq!(Direction::North.offset(), (0, 1));
        assert_eq!(Direction::East.offset(), (1, 0));
        assert_eq!(Direction::South.offset(), (0, -1));
        assert_eq!(Direction::West.offset(), (-1, 0));
    }

    #[test]
    fn direction_opposite() {
        assert_eq!(Direction::North.opposite(), Direction::South);
        assert_eq!(Direction::East.opposite(), Direction::West);
    }

    #[test]
    fn direction_index_round_trip() {
        for d in Direction::all() {
            assert_eq!(Direction::from_index(d.index()), Some(d));
        }
        assert_eq!(Direction::from_index(4), None);
    }

    #[test]
    fn footprint_cells_cover_the_rectangle() {
        let cells: Vec<_> = Footprint::new(2, 2).cells(GridPosition::new(3, 4)).collect();
        assert_eq!(cells.len(), 4);
        assert!(cells.contains(&GridPosition::new(3, 4)));
        assert!(cells.contains(&GridPosition::new(4, 5)));
    }

    #[test]
    fn place_and_query() {
        let mut grid = Grid::new(10, 10);
        let id = grid
            .place(belt(), GridPosition::new(2, 3), Direction::East)
            .unwrap();
        assert_eq!(grid.id_at(GridPosition::new(2, 3)), Some(id));
        assert_eq!(grid.len(), 1);
        let b = grid.get(id).unwrap();
        assert_eq!(b.position, GridPosition::new(2, 3));
        assert_eq!(b.direction, Direction::East);
    }

    #[test]
    fn place_out_of_bounds_fails() {
        let mut grid = Grid::new(10, 10);
        assert_eq!(
            grid.place(belt(), GridPosition::new(-1, 0), Direction::North),
            Err(PlaceError::OutOfBounds)
        );
        assert_eq!(
            grid.place(belt(), GridPosition::new(10, 0), Direction::North),
            Err(PlaceError::OutOfBounds)
        );
        assert!(grid.is_empty());
    }

    #[test]
    fn multi_cell_footprint_must_fit_entirely() {
        let mut grid = Grid::new(10, 10);
        // Anchor in bounds, but the 2x2 footprint spills over the edge.
        assert_eq!(
            grid.place(wide_machine(), GridPosition::new(9, 9), Direction::North),
            Err(PlaceError::OutOfBounds)
        );
        assert!(grid.is_empty());
    }

    #[test]
    fn overlapping_placement_is_rejected_without_side_effects() {
        let mut grid = Grid::new(10, 10);
        let first = grid
            .place(wide_machine(), GridPosition::new(2, 2), Direction::North)
            .unwrap();
        // Overlaps the (3, 3) corner of the machine.
        assert_eq!(
            grid.place(wide_machine(), GridPosition::new(3, 3), Direction::North),
            Err(PlaceError::Occupied)
        );
        assert_eq!(grid.len(), 1);
        // Every cell of the original footprint still points at it.
        for cell in Footprint::new(2, 2).cells(GridPosition::new(2, 2)) {
            assert_eq!(grid.id_at(cell), Some(first));
        }
    }

    #[test]
    fn every_footprint_cell_maps_back_to_the_building() {
        let mut grid = Grid::new(10, 10);
        let id = grid
            .place(wide_machine(), GridPosition::new(4, 4), Direction::North)
            .unwrap();
        for cell in Footprint::new(2, 2).cells(GridPosition::new(4, 4)) {
            assert_eq!(grid.id_at(cell), Some(id));
        }
    }

    #[test]
    fn remove_clears_the_whole_footprint() {
        let mut grid = Grid::new(10, 10);
        grid.place(wide_machine(), GridPosition::new(4, 4), Direction::North)
            .unwrap();
        // Remove by a non-anchor cell; the recorded footprint drives the clear.
        grid.remove(GridPosition::new(5, 5));
        assert!(grid.is_empty());
        for cell in Footprint::new(2, 2).cells(GridPosition::new(4, 4)) {
            assert_eq!(grid.id_at(cell), None);
        }
    }

    #[test]
    fn remove_empty_cell_is_a_noop() {
        let mut grid = Grid::new(10, 10);
        grid.remove(GridPosition::new(5, 5));
        grid.remove(GridPosition::new(-3, 99));
        assert!(grid.is_empty());
    }

    #[test]
    fn removed_id_is_stale() {
        let mut grid = Grid::new(10, 10);
        let id = grid
            .place(belt(), GridPosition::new(1, 1), Direction::North)
            .unwrap();
        grid.remove(GridPosition::new(1, 1));
        assert!(!grid.contains(id));
        // A replacement at the same cell gets a fresh key.
        let other = grid
            .place(BuildingKind::Sink(Sink::new()), GridPosition::new(1, 1), Direction::North)
            .unwrap();
        assert_ne!(id, other);
        assert!(grid.get(id).is_none());
    }

    #[test]
    fn active_preserves_registration_order_across_removal() {
        let mut grid = Grid::new(10, 10);
        let a = grid.place(belt(), GridPosition::new(0, 0), Direction::North).unwrap();
        let b = grid.place(belt(), GridPosition::new(1, 0), Direction::North).unwrap();
        let c = grid.place(belt(), GridPosition::new(2, 0), Direction::North).unwrap();
        assert_eq!(grid.active(), &[a, b, c]);
        grid.remove(GridPosition::new(1, 0));
        assert_eq!(grid.active(), &[a, c]);
    }

    #[test]
    fn clear_resets_everything() {
        let mut grid = Grid::new(10, 10);
        grid.place(belt(), GridPosition::new(0, 0), Direction::North).unwrap();
        grid.place(wide_machine(), GridPosition::new(4, 4), Direction::North).unwrap();
        grid.clear();
        assert!(grid.is_empty());
        assert_eq!(grid.id_at(GridPosition::new(0, 0)), None);
        assert_eq!(grid.id_at(GridPosition::new(4, 4)), None);
    }

    #[test]
    fn get_pair_mut_requires_distinct_ids() {
        let mut grid = Grid::new(10, 10);
        let a = grid.place(belt(), GridPosition::new(0, 0), Direction::North).unwrap();
        let b = grid.place(belt(), GridPosition::new(1, 0), Direction::North).unwrap();
        assert!(grid.get_pair_mut(a, b).is_some());
        assert!(grid.get_pair_mut(a, a).is_none());
    }
}
