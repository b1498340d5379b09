//! Placement validation façade: the pure planning pass every interactive
//! placement runs before any state is touched.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::buildings::BuildingRegistry;
use crate::catalog::{BuildingCatalog, BuildingKind};
use crate::grid::{footprint_cells, GridPos, WorldGrid};
use crate::overlay;
use crate::policy::{DensityOracle, TerrainOracle};
use crate::roads::RoadNetwork;

/// Everything that can stop a placement or removal. Returned, never thrown;
/// callers decide whether to surface it.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum PlacementError {
    #[error("Unknown building type")]
    UnknownBuilding,
    #[error("Building extends outside map")]
    OutOfBounds,
    #[error("Cell already occupied at {pos}")]
    CellOccupied { pos: GridPos },
    #[error("Terrain not buildable at {pos}: {reason}")]
    TerrainBlocked { pos: GridPos, reason: String },
    #[error("No road adjacent to building site")]
    NoRoadNearby,
    #[error("Adjacent road does not allow direct access")]
    RoadAccessRestricted,
    #[error("Density limit exceeded: {0}")]
    DensityExceeded(String),
    #[error("Insufficient funds ({amount} required)")]
    InsufficientFunds { amount: i64 },
    #[error("No building at {pos}")]
    NoBuildingAt { pos: GridPos },
    #[error("Invalid building reference at {pos}")]
    StaleBuildingRef { pos: GridPos },
    #[error("Invalid overlay reference at {pos}")]
    StaleOverlayRef { pos: GridPos },
}

/// Result of [`plan_placement`]: whether the placement is legal, every
/// blocking reason found, the footprint cells, and the subset of cells where
/// the new building would ride as (or trigger promotion over) an overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementPlan {
    pub can_place: bool,
    pub reasons: Vec<PlacementError>,
    pub occupied_cells: Vec<GridPos>,
    pub overlay_cells: Vec<GridPos>,
}

impl PlacementPlan {
    fn denied(reason: PlacementError) -> Self {
        Self {
            can_place: false,
            reasons: vec![reason],
            occupied_cells: Vec::new(),
            overlay_cells: Vec::new(),
        }
    }
}

/// Validates a placement request against the current state without mutating
/// anything.
///
/// Unknown-type, bounds, and per-cell collision failures return immediately;
/// terrain, road-adjacency, and density failures accumulate into `reasons`
/// so a caller can report every fixable issue at once.
#[allow(clippy::too_many_arguments)]
pub fn plan_placement(
    origin: GridPos,
    kind: BuildingKind,
    catalog: &BuildingCatalog,
    grid: &WorldGrid,
    buildings: &BuildingRegistry,
    roads: &RoadNetwork,
    terrain: &dyn TerrainOracle,
    density: &dyn DensityOracle,
) -> PlacementPlan {
    let Some(def) = catalog.get(kind) else {
        return PlacementPlan::denied(PlacementError::UnknownBuilding);
    };

    let cells = footprint_cells(origin, def.size.0, def.size.1);
    if cells.iter().any(|&c| !grid.in_bounds(c)) {
        return PlacementPlan::denied(PlacementError::OutOfBounds);
    }

    let mut overlay_cells = Vec::new();
    for &cell in &cells {
        // Entries pointing at demolished buildings read as empty; the next
        // mutation through this cell purges them.
        let Some(occupant) = grid.primary_at(cell).and_then(|id| buildings.get(id)) else {
            continue;
        };
        let occupant_def = catalog.get(occupant.kind);

        let overlay_taken = grid
            .overlay_at(cell)
            .is_some_and(|id| buildings.contains(id));
        let compatible = occupant_def.is_some_and(|p| overlay::overlay_compatible(p, def));

        if compatible && !overlay_taken {
            overlay_cells.push(cell);
        } else {
            return PlacementPlan::denied(PlacementError::CellOccupied { pos: cell });
        }
    }

    let mut reasons = Vec::new();
    for &cell in &cells {
        let check = terrain.is_buildable(cell, def);
        if !check.allowed {
            reasons.push(PlacementError::TerrainBlocked {
                pos: cell,
                reason: check.reason.unwrap_or_default(),
            });
        }
    }

    if def.requires_road_access {
        let mut road_found = false;
        let mut access_found = false;
        for cell in perimeter_cells(origin, def.size.0, def.size.1, grid) {
            if let Some(class) = roads.class_at(cell) {
                road_found = true;
                if class.allows_direct_access() {
                    access_found = true;
                    break;
                }
            }
        }
        if !road_found {
            reasons.push(PlacementError::NoRoadNearby);
        } else if !access_found {
            reasons.push(PlacementError::RoadAccessRestricted);
        }
    }

    let far = density.is_far_compliant(origin, def);
    if !far.allowed {
        reasons.push(PlacementError::DensityExceeded(
            far.reason.unwrap_or_default(),
        ));
    }

    PlacementPlan {
        can_place: reasons.is_empty(),
        reasons,
        occupied_cells: cells,
        overlay_cells,
    }
}

/// Boolean projection of [`plan_placement`] for callers that don't need the
/// cell lists.
#[allow(clippy::too_many_arguments)]
pub fn can_place_building(
    origin: GridPos,
    kind: BuildingKind,
    catalog: &BuildingCatalog,
    grid: &WorldGrid,
    buildings: &BuildingRegistry,
    roads: &RoadNetwork,
    terrain: &dyn TerrainOracle,
    density: &dyn DensityOracle,
) -> (bool, Vec<PlacementError>) {
    let plan = plan_placement(origin, kind, catalog, grid, buildings, roads, terrain, density);
    (plan.can_place, plan.reasons)
}

/// The 1-cell ring of in-bounds cells 4-adjacent to the footprint (sides
/// only, not corners; road access is a cardinal-adjacency property).
fn perimeter_cells(origin: GridPos, width: usize, height: usize, grid: &WorldGrid) -> Vec<GridPos> {
    let mut cells = Vec::with_capacity(2 * (width + height));
    for dx in 0..width {
        let x = origin.x + dx;
        if origin.y > 0 {
            cells.push(GridPos::new(x, origin.y - 1));
        }
        cells.push(GridPos::new(x, origin.y + height));
    }
    for dy in 0..height {
        let y = origin.y + dy;
        if origin.x > 0 {
            cells.push(GridPos::new(origin.x - 1, y));
        }
        cells.push(GridPos::new(origin.x + width, y));
    }
    cells.retain(|&c| grid.in_bounds(c));
    cells
}
