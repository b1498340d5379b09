//! Placement and demolition transactions. Validation happens up front in
//! [`crate::placement::plan_placement`]; once funds are committed the
//! remaining steps are infallible, so a caller never observes a half-applied
//! placement.

use std::collections::HashSet;

use bevy::prelude::*;

use crate::buildings::{Building, BuildingId, BuildingRegistry};
use crate::catalog::{BuildingCatalog, BuildingDef, BuildingKind};
use crate::config::REFUND_FRACTION;
use crate::economy::CityTreasury;
use crate::events::{GridEvent, GridEventLog};
use crate::grid::{GridPos, WorldGrid};
use crate::overlay;
use crate::placement::{plan_placement, PlacementError, PlacementPlan};
use crate::policy::GridPolicies;
use crate::roads::RoadNetwork;
use crate::spatial_hash::SpatialHash;

/// What a successful placement paid and who it created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementReceipt {
    pub building: BuildingId,
    pub cost_paid: i64,
}

/// What a successful demolition tore down and returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemolitionReceipt {
    pub building: BuildingId,
    pub refund: i64,
    pub was_overlay: bool,
}

/// Places a building, charging the treasury the floored effective cost.
///
/// Fails without side effects on any validation error; an unaffordable cost
/// additionally journals an `InsufficientFunds` event so UI layers can react
/// without inspecting the error.
#[allow(clippy::too_many_arguments)]
pub fn place_building(
    origin: GridPos,
    kind: BuildingKind,
    catalog: &BuildingCatalog,
    grid: &mut WorldGrid,
    buildings: &mut BuildingRegistry,
    spatial: &mut SpatialHash,
    roads: &mut RoadNetwork,
    treasury: &mut CityTreasury,
    policies: &GridPolicies,
    events: &mut GridEventLog,
) -> Result<PlacementReceipt, PlacementError> {
    let plan = plan_placement(
        origin,
        kind,
        catalog,
        grid,
        buildings,
        roads,
        policies.terrain.as_ref(),
        policies.density.as_ref(),
    );
    if !plan.can_place {
        let reason = plan.reasons.into_iter().next().unwrap_or(PlacementError::UnknownBuilding);
        debug!("placement of {:?} at {} rejected: {}", kind, origin, reason);
        return Err(reason);
    }
    // plan_placement only passes for cataloged kinds.
    let def = catalog.get(kind).ok_or(PlacementError::UnknownBuilding)?;

    let cost = (def.cost as f64 * policies.cost_multiplier() as f64).floor() as i64;
    if !treasury.can_afford(cost) {
        events.push(GridEvent::InsufficientFunds { amount: cost });
        return Err(PlacementError::InsufficientFunds { amount: cost });
    }
    treasury.spend(cost);

    let id = register_building(origin, kind, def, &plan, grid, buildings, spatial, roads, treasury);

    for &cell in &plan.occupied_cells {
        if def.touches_power() {
            events.push(GridEvent::PowerNetworkChanged { pos: cell, added: true });
        }
        if def.touches_water() {
            events.push(GridEvent::WaterNetworkChanged { pos: cell, added: true });
        }
    }
    events.push(GridEvent::BuildingPlaced { pos: origin, building: id });

    Ok(PlacementReceipt { building: id, cost_paid: cost })
}

/// Save-load registration path: rebuilds the grid, spatial, road, and count
/// state for a building without charging funds. Terrain and adjacency rules
/// are not re-checked; occupancy still is, and the same network and placed
/// notifications are journaled so observers see loaded buildings too.
#[allow(clippy::too_many_arguments)]
pub fn place_for_load(
    origin: GridPos,
    kind: BuildingKind,
    catalog: &BuildingCatalog,
    grid: &mut WorldGrid,
    buildings: &mut BuildingRegistry,
    spatial: &mut SpatialHash,
    roads: &mut RoadNetwork,
    treasury: &mut CityTreasury,
    events: &mut GridEventLog,
) -> Result<BuildingId, PlacementError> {
    let plan = plan_placement(
        origin,
        kind,
        catalog,
        grid,
        buildings,
        roads,
        &crate::policy::OpenTerrain,
        &crate::policy::UnlimitedDensity,
    );
    // The hard failures (unknown kind, bounds, collision) report before the
    // footprint is resolved; soft reasons like missing road access are
    // ignored for loaded data.
    if plan.occupied_cells.is_empty() {
        let reason = plan.reasons.into_iter().next().unwrap_or(PlacementError::UnknownBuilding);
        warn!("skipping loaded {:?} at {}: {}", kind, origin, reason);
        return Err(reason);
    }
    let def = catalog.get(kind).ok_or(PlacementError::UnknownBuilding)?;
    let id = register_building(origin, kind, def, &plan, grid, buildings, spatial, roads, treasury);

    for &cell in &plan.occupied_cells {
        if def.touches_power() {
            events.push(GridEvent::PowerNetworkChanged { pos: cell, added: true });
        }
        if def.touches_water() {
            events.push(GridEvent::WaterNetworkChanged { pos: cell, added: true });
        }
    }
    events.push(GridEvent::BuildingPlaced { pos: origin, building: id });
    Ok(id)
}

/// Step 4 onward of a placement: registry insert, grid writes (with per-cell
/// promotion when a road lands on a utility line), spatial indexing, road
/// wiring, and the count bump. Infallible once the plan has passed.
#[allow(clippy::too_many_arguments)]
fn register_building(
    origin: GridPos,
    kind: BuildingKind,
    def: &BuildingDef,
    plan: &PlacementPlan,
    grid: &mut WorldGrid,
    buildings: &mut BuildingRegistry,
    spatial: &mut SpatialHash,
    roads: &mut RoadNetwork,
    treasury: &mut CityTreasury,
) -> BuildingId {
    let id = buildings.insert(Building::new(kind, origin, def.size.0, def.size.1));

    let mut primary_cells = Vec::with_capacity(plan.occupied_cells.len());
    for &cell in &plan.occupied_cells {
        if plan.overlay_cells.contains(&cell) {
            if def.is_road() {
                // Road over utility: the utility drops to the overlay slot
                // on this cell and the road takes primary.
                overlay::demote_to_overlay(grid, spatial, cell);
                grid.set_primary(cell, id);
                primary_cells.push(cell);
            } else {
                overlay::add_overlay(grid, cell, id);
            }
        } else {
            grid.set_primary(cell, id);
            primary_cells.push(cell);
        }
    }
    spatial.insert_multi(id, &primary_cells);

    if let Some(class) = def.road_class {
        roads.begin_batch();
        for &cell in &plan.occupied_cells {
            roads.add_road(cell, class);
        }
        roads.end_batch();
    }
    treasury.increment_count(kind);
    id
}

/// Removes whatever occupies `pos`, overlay first.
///
/// A shared cell takes two calls to clear: the first removes the overlay
/// entity and returns, the second removes the primary. Stale references are
/// purged and reported instead of silently skipped.
#[allow(clippy::too_many_arguments)]
pub fn remove_at(
    pos: GridPos,
    catalog: &BuildingCatalog,
    grid: &mut WorldGrid,
    buildings: &mut BuildingRegistry,
    spatial: &mut SpatialHash,
    roads: &mut RoadNetwork,
    treasury: &mut CityTreasury,
    events: &mut GridEventLog,
) -> Result<DemolitionReceipt, PlacementError> {
    match overlay::live_overlay_at(grid, buildings, pos) {
        Ok(Some(oid)) => {
            return overlay::remove_overlay(
                oid, grid, buildings, spatial, roads, treasury, catalog, events,
            );
        }
        Ok(None) => {}
        // A dangling overlay pointer never blocks removing the building
        // underneath it; the entry is already purged, keep going.
        Err(_) => warn!("purged stale overlay reference at {}", pos),
    }

    let Some(pid) = grid.primary_at(pos) else {
        return Err(PlacementError::NoBuildingAt { pos });
    };
    if !buildings.contains(pid) {
        grid.clear_primary(pos);
        spatial.remove_cell(pid, pos);
        warn!("purged stale building reference at {}", pos);
        return Err(PlacementError::StaleBuildingRef { pos });
    }

    let building = buildings
        .get(pid)
        .cloned()
        .ok_or(PlacementError::NoBuildingAt { pos })?;
    let cells = building.cells();
    let def = catalog.get(building.kind);

    // One overlay can span several of these cells; refund it once.
    let mut removed_overlays: HashSet<BuildingId> = HashSet::new();
    for &cell in &cells {
        if grid.primary_at(cell) == Some(pid) {
            grid.clear_primary(cell);
        }
        if let Some(oid) = grid.overlay_at(cell) {
            if oid != pid && buildings.contains(oid) {
                if removed_overlays.insert(oid) {
                    overlay::remove_overlay(
                        oid, grid, buildings, spatial, roads, treasury, catalog, events,
                    )?;
                }
            } else {
                grid.clear_overlay(cell);
            }
        }
    }
    spatial.remove(pid);

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
                events.push(GridEvent::PowerNetworkChanged { pos: cell, added: false });
            }
            if def.touches_water() {
                events.push(GridEvent::WaterNetworkChanged { pos: cell, added: false });
            }
        }
    }

    let refund = def.map_or(0, |d| (d.cost as f64 * REFUND_FRACTION).floor() as i64);
    treasury.earn(refund);
    treasury.decrement_count(building.kind);
    buildings.remove(pid);

    events.push(GridEvent::BuildingRemoved { pos: building.origin, building: pid });

    Ok(DemolitionReceipt { building: pid, refund, was_overlay: false })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct World {
        catalog: BuildingCatalog,
        grid: WorldGrid,
        buildings: BuildingRegistry,
        spatial: SpatialHash,
        roads: RoadNetwork,
        treasury: CityTreasury,
        policies: GridPolicies,
        events: GridEventLog,
    }

    impl World {
        fn new(funds: i64) -> Self {
            Self {
                catalog: BuildingCatalog::standard(),
                grid: WorldGrid::new(32, 32),
                buildings: BuildingRegistry::default(),
                spatial: SpatialHash::new(32, 32),
                roads: RoadNetwork::default(),
                treasury: CityTreasury::with_funds(funds),
                policies: GridPolicies::default(),
                events: GridEventLog::default(),
            }
        }

        fn place(
            &mut self,
            origin: GridPos,
            kind: BuildingKind,
        ) -> Result<PlacementReceipt, PlacementError> {
            place_building(
                origin,
                kind,
                &self.catalog,
                &mut self.grid,
                &mut self.buildings,
                &mut self.spatial,
                &mut self.roads,
                &mut self.treasury,
                &self.policies,
                &mut self.events,
            )
        }

        fn remove(&mut self, pos: GridPos) -> Result<DemolitionReceipt, PlacementError> {
            remove_at(
                pos,
                &self.catalog,
                &mut self.grid,
                &mut self.buildings,
                &mut self.spatial,
                &mut self.roads,
                &mut self.treasury,
                &mut self.events,
            )
        }
    }

    #[test]
    fn test_place_road_pays_and_registers() {
        let mut world = World::new(100);
        let pos = GridPos::new(4, 4);
        let receipt = world.place(pos, BuildingKind::LocalRoad).unwrap();

        assert_eq!(receipt.cost_paid, 10);
        assert_eq!(world.treasury.funds, 90);
        assert_eq!(world.grid.primary_at(pos), Some(receipt.building));
        assert!(world.roads.has_road_at(pos));
        assert_eq!(world.spatial.query_rect(pos, pos), vec![receipt.building]);
        assert_eq!(world.treasury.count_of(BuildingKind::LocalRoad), 1);

        let log = world.events.drain();
        assert_eq!(
            log,
            vec![GridEvent::BuildingPlaced { pos, building: receipt.building }]
        );
    }

    #[test]
    fn test_failed_placement_leaves_no_trace() {
        let mut world = World::new(1_000);
        let pos = GridPos::new(4, 4);
        // Houses need an accessible road nearby; there is none.
        let err = world.place(pos, BuildingKind::House).unwrap_err();
        assert_eq!(err, PlacementError::NoRoadNearby);

        assert_eq!(world.treasury.funds, 1_000);
        assert!(world.buildings.is_empty());
        assert_eq!(world.grid.primary_at(pos), None);
        assert_eq!(world.spatial.entry_count(), 0);
        assert!(world.events.is_empty());
    }

    #[test]
    fn test_insufficient_funds_fails_before_mutation() {
        let mut world = World::new(5);
        let pos = GridPos::new(4, 4);
        let err = world.place(pos, BuildingKind::LocalRoad).unwrap_err();
        assert_eq!(err, PlacementError::InsufficientFunds { amount: 10 });

        assert_eq!(world.treasury.funds, 5);
        assert!(world.buildings.is_empty());
        assert!(!world.roads.has_road_at(pos));
        assert_eq!(world.events.drain(), vec![GridEvent::InsufficientFunds { amount: 10 }]);
    }

    #[test]
    fn test_cost_multiplier_floors() {
        struct Weather;
        impl crate::policy::CostModifier for Weather {
            fn construction_cost_multiplier(&self) -> f32 {
                1.25
            }
        }

        let mut world = World::new(100);
        world.policies.cost = Some(Box::new(Weather));
        // 10 * 1.25 = 12.5, floored to 12.
        let receipt = world.place(GridPos::new(4, 4), BuildingKind::LocalRoad).unwrap();
        assert_eq!(receipt.cost_paid, 12);
        assert_eq!(world.treasury.funds, 88);
    }

    #[test]
    fn test_multi_cell_building_occupies_full_footprint() {
        let mut world = World::new(10_000);
        world.place(GridPos::new(9, 10), BuildingKind::LocalRoad).unwrap();
        let receipt = world.place(GridPos::new(10, 10), BuildingKind::Hospital).unwrap();

        for cell in crate::grid::footprint_cells(GridPos::new(10, 10), 3, 3) {
            assert_eq!(world.grid.primary_at(cell), Some(receipt.building));
        }
        // Removal from a non-origin cell clears every cell.
        world.events.clear();
        let demo = world.remove(GridPos::new(12, 12)).unwrap();
        assert_eq!(demo.building, receipt.building);
        assert_eq!(demo.refund, 500);
        for cell in crate::grid::footprint_cells(GridPos::new(10, 10), 3, 3) {
            assert_eq!(world.grid.primary_at(cell), None);
        }
        assert!(world.spatial.query_rect(GridPos::new(10, 10), GridPos::new(12, 12)).is_empty());
    }

    #[test]
    fn test_utility_over_road_becomes_overlay() {
        let mut world = World::new(1_000);
        let pos = GridPos::new(6, 6);
        let road = world.place(pos, BuildingKind::LocalRoad).unwrap();
        world.events.clear();
        let pipe = world.place(pos, BuildingKind::WaterPipe).unwrap();

        assert_eq!(world.grid.primary_at(pos), Some(road.building));
        assert_eq!(world.grid.overlay_at(pos), Some(pipe.building));
        // Overlay occupancy is not spatially indexed.
        assert_eq!(world.spatial.query_rect(pos, pos), vec![road.building]);
        assert_eq!(
            world.events.drain(),
            vec![
                GridEvent::WaterNetworkChanged { pos, added: true },
                GridEvent::BuildingPlaced { pos, building: pipe.building },
            ]
        );
    }

    #[test]
    fn test_road_over_utility_promotes_road() {
        let mut world = World::new(1_000);
        let pos = GridPos::new(6, 6);
        let pipe = world.place(pos, BuildingKind::WaterPipe).unwrap();
        let road = world.place(pos, BuildingKind::LocalRoad).unwrap();

        assert_eq!(world.grid.primary_at(pos), Some(road.building));
        assert_eq!(world.grid.overlay_at(pos), Some(pipe.building));
        assert_eq!(world.spatial.query_rect(pos, pos), vec![road.building]);
        assert!(world.roads.has_road_at(pos));
    }

    #[test]
    fn test_remove_clears_overlay_before_primary() {
        let mut world = World::new(1_000);
        let pos = GridPos::new(6, 6);
        let road = world.place(pos, BuildingKind::LocalRoad).unwrap();
        let pipe = world.place(pos, BuildingKind::WaterPipe).unwrap();

        let first = world.remove(pos).unwrap();
        assert_eq!(first.building, pipe.building);
        assert!(first.was_overlay);
        assert_eq!(world.grid.primary_at(pos), Some(road.building));
        assert!(world.roads.has_road_at(pos));

        let second = world.remove(pos).unwrap();
        assert_eq!(second.building, road.building);
        assert!(!second.was_overlay);
        assert!(!world.roads.has_road_at(pos));
        assert_eq!(world.remove(pos), Err(PlacementError::NoBuildingAt { pos }));
    }

    #[test]
    fn test_demoted_utility_is_removed_before_its_road() {
        let mut world = World::new(1_000);
        let pos = GridPos::new(6, 6);
        let pipe = world.place(pos, BuildingKind::WaterPipe).unwrap();
        let road = world.place(pos, BuildingKind::LocalRoad).unwrap();

        // The demoted pipe sits in the overlay slot, so it goes first.
        let demo = world.remove(pos).unwrap();
        assert_eq!(demo.building, pipe.building);
        assert!(demo.was_overlay);
        assert_eq!(world.grid.primary_at(pos), Some(road.building));
        assert!(world.roads.has_road_at(pos));

        let demo = world.remove(pos).unwrap();
        assert_eq!(demo.building, road.building);
        assert!(world.buildings.is_empty());
    }

    #[test]
    fn test_removing_multi_cell_primary_takes_overlays_with_it() {
        // A 3x1 road variant so an overlay can sit on a non-queried cell.
        let mut world = World::new(1_000);
        let mut def = world.catalog.get(BuildingKind::Avenue).unwrap().clone();
        def.size = (3, 1);
        def.cost = 30;
        world.catalog.insert(def);

        let pipe = world.place(GridPos::new(6, 5), BuildingKind::WaterPipe).unwrap();
        let road = world.place(GridPos::new(5, 5), BuildingKind::Avenue).unwrap();
        assert_eq!(world.grid.overlay_at(GridPos::new(6, 5)), Some(pipe.building));

        // Remove via a cell with no overlay: the road goes, and so does the
        // pipe riding its middle cell.
        let demo = world.remove(GridPos::new(5, 5)).unwrap();
        assert_eq!(demo.building, road.building);
        assert!(!world.buildings.contains(pipe.building));
        assert_eq!(world.grid.overlay_at(GridPos::new(6, 5)), None);
        // Road refund 15 plus pipe refund 2.
        assert_eq!(world.treasury.funds, 1_000 - 5 - 30 + 15 + 2);
        assert_eq!(world.treasury.count_of(BuildingKind::WaterPipe), 0);
    }

    #[test]
    fn test_stale_overlay_falls_through_to_primary() {
        let mut world = World::new(1_000);
        let pos = GridPos::new(6, 6);
        let road = world.place(pos, BuildingKind::LocalRoad).unwrap();
        let pipe = world.place(pos, BuildingKind::WaterPipe).unwrap();
        // Out-of-band deletion leaves a dangling overlay pointer.
        world.buildings.remove(pipe.building);

        // The dangling overlay never blocks removing the road underneath.
        let demo = world.remove(pos).unwrap();
        assert_eq!(demo.building, road.building);
        assert!(!demo.was_overlay);
        assert_eq!(world.grid.overlay_at(pos), None);
        assert_eq!(world.grid.primary_at(pos), None);
    }

    #[test]
    fn test_place_remove_pair_nets_floored_refund() {
        let mut world = World::new(1_000);
        let pos = GridPos::new(6, 6);
        world.place(pos, BuildingKind::WaterPipe).unwrap();
        let demo = world.remove(pos).unwrap();
        // Cost 5, refund floor(2.5) = 2.
        assert_eq!(demo.refund, 2);
        assert_eq!(world.treasury.funds, 1_000 - 5 + 2);
        assert_eq!(world.treasury.count_of(BuildingKind::WaterPipe), 0);
    }

    #[test]
    fn test_stale_primary_is_purged_and_reported() {
        let mut world = World::new(1_000);
        let pos = GridPos::new(6, 6);
        let road = world.place(pos, BuildingKind::LocalRoad).unwrap();
        // Out-of-band deletion leaves the grid pointing at a dead id.
        world.buildings.remove(road.building);

        let err = world.remove(pos).unwrap_err();
        assert_eq!(err, PlacementError::StaleBuildingRef { pos });
        assert_eq!(world.grid.primary_at(pos), None);
        // Healed: the cell is placeable again.
        assert!(world.place(pos, BuildingKind::House).is_err());
        assert!(world.place(pos, BuildingKind::LocalRoad).is_ok());
    }

    #[test]
    fn test_place_for_load_charges_nothing_but_still_notifies() {
        let mut world = World::new(0);
        let pos = GridPos::new(6, 6);
        let id = place_for_load(
            pos,
            BuildingKind::House,
            &world.catalog,
            &mut world.grid,
            &mut world.buildings,
            &mut world.spatial,
            &mut world.roads,
            &mut world.treasury,
            &mut world.events,
        )
        .unwrap();

        assert_eq!(world.treasury.funds, 0);
        assert_eq!(world.grid.primary_at(pos), Some(id));
        assert_eq!(world.treasury.count_of(BuildingKind::House), 1);
        // Loaded buildings journal the same notifications as fresh ones.
        assert_eq!(
            world.events.drain(),
            vec![
                GridEvent::PowerNetworkChanged { pos, added: true },
                GridEvent::WaterNetworkChanged { pos, added: true },
                GridEvent::BuildingPlaced { pos, building: id },
            ]
        );

        // Occupancy still enforced on the load path.
        let err = place_for_load(
            pos,
            BuildingKind::House,
            &world.catalog,
            &mut world.grid,
            &mut world.buildings,
            &mut world.spatial,
            &mut world.roads,
            &mut world.treasury,
            &mut world.events,
        )
        .unwrap_err();
        assert_eq!(err, PlacementError::CellOccupied { pos });
        assert!(world.events.is_empty());
    }
}
