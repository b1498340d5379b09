//! Overlay mechanics: the rules that let a road and a utility line share one
//! cell, and the demotion/removal paths that keep both layers consistent.

use crate::buildings::{BuildingId, BuildingRegistry};
use crate::catalog::{BuildingCatalog, BuildingDef};
use crate::config::REFUND_FRACTION;
use crate::construction::DemolitionReceipt;
use crate::economy::CityTreasury;
use crate::events::{GridEvent, GridEventLog};
use crate::grid::{GridPos, WorldGrid};
use crate::placement::PlacementError;
use crate::roads::RoadNetwork;
use crate::spatial_hash::SpatialHash;

/// Only a road and a utility line may share a cell, in either stacking
/// order. Everything else collides.
pub fn overlay_compatible(primary: &BuildingDef, incoming: &BuildingDef) -> bool {
    (primary.is_road() && incoming.is_utility_line())
        || (primary.is_utility_line() && incoming.is_road())
}

/// Records `id` as the overlay occupant of `cell`. Eligibility is not
/// checked here; callers establish it through
/// [`crate::placement::plan_placement`] before routing a cell this way.
pub fn add_overlay(grid: &mut WorldGrid, cell: GridPos, id: BuildingId) {
    grid.set_overlay(cell, id);
}

/// Moves the primary occupant of `cell` into the overlay slot, vacating the
/// primary slot for an incoming road. The demoted entity keeps its spatial
/// entries for cells where it is still primary; this cell's entry is dropped
/// because overlay-only occupancy is not indexed.
pub fn demote_to_overlay(
    grid: &mut WorldGrid,
    spatial: &mut SpatialHash,
    cell: GridPos,
) -> Option<BuildingId> {
    let occupant = grid.primary_at(cell)?;
    grid.clear_primary(cell);
    grid.set_overlay(cell, occupant);
    spatial.remove_cell(occupant, cell);
    Some(occupant)
}

/// Resolves the overlay occupant of `pos`, purging a stale reference left by
/// an out-of-band deletion.
pub fn live_overlay_at(
    grid: &mut WorldGrid,
    buildings: &BuildingRegistry,
    pos: GridPos,
) -> Result<Option<BuildingId>, PlacementError> {
    let Some(id) = grid.overlay_at(pos) else {
        return Ok(None);
    };
    if buildings.contains(id) {
        Ok(Some(id))
    } else {
        grid.clear_overlay(pos);
        Err(PlacementError::StaleOverlayRef { pos })
    }
}

/// Removes whatever overlay occupies `cell`. A stale reference is purged and
/// reported as `StaleOverlayRef`; callers treat it as non-fatal and retry
/// against the primary occupant.
#[allow(clippy::too_many_arguments)]
pub fn remove_overlay_at(
    pos: GridPos,
    grid: &mut WorldGrid,
    buildings: &mut BuildingRegistry,
    spatial: &mut SpatialHash,
    roads: &mut RoadNetwork,
    treasury: &mut CityTreasury,
    catalog: &BuildingCatalog,
    events: &mut GridEventLog,
) -> Result<DemolitionReceipt, PlacementError> {
    match live_overlay_at(grid, buildings, pos)? {
        Some(id) => remove_overlay(id, grid, buildings, spatial, roads, treasury, catalog, events),
        None => Err(PlacementError::NoBuildingAt { pos }),
    }
}

/// Removes an overlay entity entirely: every cell where it rides as overlay,
/// plus any cells where it is still primary (a utility line partially demoted
/// by a road keeps primary status on its unshared cells).
#[allow(clippy::too_many_arguments)]
pub fn remove_overlay(
    id: BuildingId,
    grid: &mut WorldGrid,
    buildings: &mut BuildingRegistry,
    spatial: &mut SpatialHash,
    roads: &mut RoadNetwork,
    treasury: &mut CityTreasury,
    catalog: &BuildingCatalog,
    events: &mut GridEventLog,
) -> Result<DemolitionReceipt, PlacementError> {
    let Some(building) = buildings.get(id) else {
        return Err(PlacementError::UnknownBuilding);
    };
    let kind = building.kind;
    let origin = building.origin;
    let cells = building.cells();
    let def = catalog.get(kind);

    for &cell in &cells {
        if grid.overlay_at(cell) == Some(id) {
            grid.clear_overlay(cell);
        }
        if grid.primary_at(cell) == Some(id) {
            grid.clear_primary(cell);
        }
    }
    spatial.remove(id);

    if let Some(def) = def {
        if def.is_road() {
            roads.begin_batch();
            for &cell in &cells {
                roads.remove_road(cell);
            }
            roads.end_batch();
        }
        for &cell in &cells {
            if def.touches_power() {
                events.push(GridEvent::PowerNetworkChanged {
                    pos: cell,
                    added: false,
                });
            }
            if def.touches_water() {
                events.push(GridEvent::WaterNetworkChanged {
                    pos: cell,
                    added: false,
                });
            }
        }
    }

    let refund = def.map_or(0, |d| (d.cost as f64 * REFUND_FRACTION).floor() as i64);
    treasury.earn(refund);
    treasury.decrement_count(kind);
    buildings.remove(id);

    events.push(GridEvent::BuildingRemoved {
        pos: origin,
        building: id,
    });

    Ok(DemolitionReceipt {
        building: id,
        refund,
        was_overlay: true,
    })
}
