use std::fmt;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::buildings::BuildingId;
use crate::config::{GRID_HEIGHT, GRID_WIDTH};

/// A bounded integer grid coordinate. Hashes and compares by value so it can
/// key maps directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    pub x: usize,
    pub y: usize,
}

impl GridPos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Enumerates the cells of a `width × height` footprint anchored at `origin`
/// (top-left), row-major. Does no bounds checking; callers validate against
/// the grid.
pub fn footprint_cells(origin: GridPos, width: usize, height: usize) -> Vec<GridPos> {
    let mut cells = Vec::with_capacity(width * height);
    for dy in 0..height {
        for dx in 0..width {
            cells.push(GridPos::new(origin.x + dx, origin.y + dy));
        }
    }
    cells
}

/// One cell of the occupancy map. `primary` is the sole owner of the cell;
/// `overlay` is a second entity sharing it (a utility line under a road, or
/// the inverse after promotion). At most one of each per cell, ever.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Cell {
    pub primary: Option<BuildingId>,
    pub overlay: Option<BuildingId>,
}

/// Primary + overlay occupancy, dense over the map bounds. Lookups by cell
/// are O(1); multi-cell buildings appear once per occupied cell, every entry
/// pointing at the same instance.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct WorldGrid {
    cells: Vec<Cell>,
    width: usize,
    height: usize,
}

impl Default for WorldGrid {
    fn default() -> Self {
        Self::new(GRID_WIDTH, GRID_HEIGHT)
    }
}

impl WorldGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            cells: vec![Cell::default(); width * height],
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn index(&self, pos: GridPos) -> usize {
        pos.y * self.width + pos.x
    }

    #[inline]
    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// The primary occupant recorded at `pos`, if any. This is the raw map
    /// entry; liveness against the registry is the caller's concern.
    pub fn primary_at(&self, pos: GridPos) -> Option<BuildingId> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.cells[self.index(pos)].primary
    }

    /// The overlay occupant recorded at `pos`, if any (raw entry, see
    /// [`WorldGrid::primary_at`]).
    pub fn overlay_at(&self, pos: GridPos) -> Option<BuildingId> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.cells[self.index(pos)].overlay
    }

    pub fn set_primary(&mut self, pos: GridPos, id: BuildingId) {
        let idx = self.index(pos);
        self.cells[idx].primary = Some(id);
    }

    pub fn clear_primary(&mut self, pos: GridPos) {
        let idx = self.index(pos);
        self.cells[idx].primary = None;
    }

    pub fn set_overlay(&mut self, pos: GridPos, id: BuildingId) {
        let idx = self.index(pos);
        self.cells[idx].overlay = Some(id);
    }

    pub fn clear_overlay(&mut self, pos: GridPos) {
        let idx = self.index(pos);
        self.cells[idx].overlay = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buildings::{Building, BuildingRegistry};
    use crate::catalog::BuildingKind;

    fn some_id() -> BuildingId {
        let mut registry = BuildingRegistry::default();
        registry.insert(Building::new(BuildingKind::House, GridPos::new(0, 0), 1, 1))
    }

    #[test]
    fn test_out_of_bounds() {
        let grid = WorldGrid::new(10, 10);
        assert!(grid.in_bounds(GridPos::new(9, 9)));
        assert!(!grid.in_bounds(GridPos::new(10, 0)));
        assert!(!grid.in_bounds(GridPos::new(0, 10)));
        assert_eq!(grid.primary_at(GridPos::new(10, 10)), None);
    }

    #[test]
    fn test_primary_set_clear() {
        let mut grid = WorldGrid::new(10, 10);
        let id = some_id();
        let pos = GridPos::new(3, 4);

        grid.set_primary(pos, id);
        assert_eq!(grid.primary_at(pos), Some(id));
        assert_eq!(grid.overlay_at(pos), None);

        grid.clear_primary(pos);
        assert_eq!(grid.primary_at(pos), None);
    }

    #[test]
    fn test_overlay_independent_of_primary() {
        let mut grid = WorldGrid::new(10, 10);
        let id = some_id();
        let pos = GridPos::new(5, 5);

        grid.set_overlay(pos, id);
        assert_eq!(grid.overlay_at(pos), Some(id));
        assert_eq!(grid.primary_at(pos), None);

        grid.clear_overlay(pos);
        assert_eq!(grid.overlay_at(pos), None);
    }

    #[test]
    fn test_footprint_cells_row_major() {
        let cells = footprint_cells(GridPos::new(2, 3), 2, 2);
        assert_eq!(
            cells,
            vec![
                GridPos::new(2, 3),
                GridPos::new(3, 3),
                GridPos::new(2, 4),
                GridPos::new(3, 4),
            ]
        );
    }
}
