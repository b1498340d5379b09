//! Read-only queries over the placed world: point and area lookups plus the
//! whole-city aggregates the economy and utility overlays report on.

use std::collections::HashMap;

use crate::buildings::{Building, BuildingId, BuildingRegistry};
use crate::catalog::{BuildingCatalog, BuildingCategory, BuildingKind};
use crate::grid::{GridPos, WorldGrid};
use crate::roads::RoadNetwork;
use crate::spatial_hash::SpatialHash;

/// Live primary occupant of a cell. A grid entry pointing at a demolished
/// building reads as empty here; the mutation paths purge it.
pub fn building_at(
    pos: GridPos,
    grid: &WorldGrid,
    buildings: &BuildingRegistry,
) -> Option<BuildingId> {
    grid.primary_at(pos).filter(|&id| buildings.contains(id))
}

/// Live overlay occupant of a cell.
pub fn overlay_at(
    pos: GridPos,
    grid: &WorldGrid,
    buildings: &BuildingRegistry,
) -> Option<BuildingId> {
    grid.overlay_at(pos).filter(|&id| buildings.contains(id))
}

/// Buildings whose footprint touches the given radius, liveness filtered.
pub fn buildings_in_radius(
    center: GridPos,
    radius: f32,
    spatial: &SpatialHash,
    buildings: &BuildingRegistry,
) -> Vec<BuildingId> {
    let mut ids = spatial.query_radius(center, radius);
    ids.retain(|&id| buildings.contains(id));
    ids
}

/// Buildings whose footprint intersects the inclusive rectangle.
pub fn buildings_in_rect(
    min: GridPos,
    max: GridPos,
    spatial: &SpatialHash,
    buildings: &BuildingRegistry,
) -> Vec<BuildingId> {
    let mut ids = spatial.query_rect(min, max);
    ids.retain(|&id| buildings.contains(id));
    ids
}

pub fn buildings_of_kind(
    kind: BuildingKind,
    buildings: &BuildingRegistry,
) -> Vec<(BuildingId, GridPos)> {
    buildings
        .iter()
        .filter(|(_, b)| b.kind == kind)
        .map(|(id, b)| (id, b.origin))
        .collect()
}

/// Per-tick upkeep across every placed instance, single pass over the
/// unique-entity cache.
pub fn total_maintenance(buildings: &BuildingRegistry, catalog: &BuildingCatalog) -> i64 {
    buildings
        .iter()
        .filter_map(|(_, b)| catalog.get(b.kind))
        .map(|def| def.maintenance)
        .sum()
}

pub fn buildings_by_category(
    buildings: &BuildingRegistry,
    catalog: &BuildingCatalog,
) -> HashMap<BuildingCategory, u32> {
    let mut counts = HashMap::new();
    for (_, b) in buildings.iter() {
        if let Some(def) = catalog.get(b.kind) {
            *counts.entry(def.category).or_insert(0) += 1;
        }
    }
    counts
}

/// Citywide power production minus demand. Only operational buildings
/// produce; demand is counted regardless, which is what makes a brownout
/// visible as a negative balance.
pub fn total_power_balance(buildings: &BuildingRegistry, catalog: &BuildingCatalog) -> i64 {
    utility_balance(buildings, catalog, |b, def| {
        let output = if b.operational { def.power_output } else { 0 };
        (output, def.power_demand)
    })
}

/// Citywide water production minus demand, same rules as power.
pub fn total_water_balance(buildings: &BuildingRegistry, catalog: &BuildingCatalog) -> i64 {
    utility_balance(buildings, catalog, |b, def| {
        let output = if b.operational { def.water_output } else { 0 };
        (output, def.water_demand)
    })
}

/// Road-graph reachability between two cells. Both must be road cells.
pub fn is_connected_by_road(a: GridPos, b: GridPos, roads: &RoadNetwork) -> bool {
    roads.is_connected(a, b)
}

fn utility_balance(
    buildings: &BuildingRegistry,
    catalog: &BuildingCatalog,
    select: impl Fn(&Building, &crate::catalog::BuildingDef) -> (i32, i32),
) -> i64 {
    let mut balance = 0i64;
    for (_, b) in buildings.iter() {
        if let Some(def) = catalog.get(b.kind) {
            let (output, demand) = select(b, def);
            balance += i64::from(output) - i64::from(demand);
        }
    }
    balance
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(kinds: &[(BuildingKind, GridPos)]) -> BuildingRegistry {
        let catalog = BuildingCatalog::standard();
        let mut registry = BuildingRegistry::default();
        for &(kind, origin) in kinds {
            let def = catalog.get(kind).unwrap();
            registry.insert(Building::new(kind, origin, def.size.0, def.size.1));
        }
        registry
    }

    #[test]
    fn test_point_lookup_filters_dead_ids() {
        let mut grid = WorldGrid::new(16, 16);
        let mut registry = BuildingRegistry::default();
        let pos = GridPos::new(2, 2);
        let id = registry.insert(Building::new(BuildingKind::Park, pos, 1, 1));
        grid.set_primary(pos, id);

        assert_eq!(building_at(pos, &grid, &registry), Some(id));
        registry.remove(id);
        assert_eq!(building_at(pos, &grid, &registry), None);
    }

    #[test]
    fn test_radius_query_filters_dead_ids() {
        let mut spatial = SpatialHash::new(16, 16);
        let mut registry = BuildingRegistry::default();
        let pos = GridPos::new(2, 2);
        let id = registry.insert(Building::new(BuildingKind::Park, pos, 1, 1));
        spatial.insert_multi(id, &[pos]);

        assert_eq!(buildings_in_radius(pos, 3.0, &spatial, &registry), vec![id]);
        registry.remove(id);
        assert!(buildings_in_radius(pos, 3.0, &spatial, &registry).is_empty());
    }

    #[test]
    fn test_maintenance_and_categories() {
        let catalog = BuildingCatalog::standard();
        let registry = registry_with(&[
            (BuildingKind::House, GridPos::new(0, 0)),
            (BuildingKind::House, GridPos::new(2, 0)),
            (BuildingKind::FireStation, GridPos::new(4, 0)),
        ]);

        let house = catalog.get(BuildingKind::House).unwrap().maintenance;
        let station = catalog.get(BuildingKind::FireStation).unwrap().maintenance;
        assert_eq!(total_maintenance(&registry, &catalog), 2 * house + station);

        let by_category = buildings_by_category(&registry, &catalog);
        assert_eq!(by_category.get(&BuildingCategory::Residential), Some(&2));
        assert_eq!(by_category.get(&BuildingCategory::Civic), Some(&1));
    }

    #[test]
    fn test_power_balance_ignores_offline_plants() {
        let catalog = BuildingCatalog::standard();
        let mut registry = registry_with(&[
            (BuildingKind::CoalPlant, GridPos::new(0, 0)),
            (BuildingKind::House, GridPos::new(8, 0)),
        ]);
        let plant_output =
            i64::from(catalog.get(BuildingKind::CoalPlant).unwrap().power_output);
        let house_demand = i64::from(catalog.get(BuildingKind::House).unwrap().power_demand);

        assert_eq!(
            total_power_balance(&registry, &catalog),
            plant_output - house_demand
        );

        let (plant_id, _) = registry
            .iter()
            .find(|(_, b)| b.kind == BuildingKind::CoalPlant)
            .unwrap();
        registry.set_operational(plant_id, false);
        // Offline plant stops producing but the house still demands.
        assert_eq!(total_power_balance(&registry, &catalog), -house_demand);
    }

    #[test]
    fn test_connected_by_road_delegates_to_graph() {
        let mut roads = RoadNetwork::default();
        for x in 0..4 {
            roads.add_road(GridPos::new(x, 0), crate::catalog::RoadClass::Local);
        }
        assert!(is_connected_by_road(GridPos::new(0, 0), GridPos::new(3, 0), &roads));
        assert!(!is_connected_by_road(GridPos::new(0, 0), GridPos::new(0, 5), &roads));
    }

    #[test]
    fn test_buildings_of_kind() {
        let registry = registry_with(&[
            (BuildingKind::House, GridPos::new(0, 0)),
            (BuildingKind::Shop, GridPos::new(2, 0)),
            (BuildingKind::House, GridPos::new(4, 0)),
        ]);
        let houses = buildings_of_kind(BuildingKind::House, &registry);
        assert_eq!(houses.len(), 2);
        assert!(houses.iter().all(|&(_, p)| p.y == 0));
    }
}
