//! Grid entity management and spatial indexing for a tile-based city.
//!
//! The engine owns four index structures (cell occupancy, unique-entity
//! cache, spatial hash, road graph) and keeps them consistent through
//! transactional placement and removal. Everything mutates through
//! [`construction`] or the [`actions`] queue; reads go through [`queries`].

use bevy::prelude::*;

pub mod actions;
pub mod buildings;
pub mod catalog;
pub mod config;
pub mod construction;
pub mod economy;
pub mod events;
pub mod grid;
pub mod overlay;
pub mod placement;
pub mod policy;
pub mod queries;
pub mod roads;
pub mod spatial_hash;


pub use actions::{
    execute_queued_actions, execute_single, ActionOutcome, ActionSource, GridAction,
    GridActionLog, GridActionQueue, QueuedAction,
};
pub use buildings::{Building, BuildingId, BuildingRegistry};
pub use catalog::{
    BuildingCatalog, BuildingCategory, BuildingDef, BuildingKind, RoadClass, UtilityClass,
};
pub use construction::{
    place_building, place_for_load, remove_at, DemolitionReceipt, PlacementReceipt,
};
pub use economy::CityTreasury;
pub use events::{GridEvent, GridEventLog};
pub use grid::{footprint_cells, Cell, GridPos, WorldGrid};
pub use overlay::{add_overlay, overlay_compatible, remove_overlay_at};
pub use placement::{can_place_building, plan_placement, PlacementError, PlacementPlan};
pub use policy::{
    BuildCheck, CostModifier, DensityOracle, GridPolicies, OpenTerrain, TerrainOracle,
    UnlimitedDensity,
};
pub use roads::RoadNetwork;
pub use spatial_hash::{CoverageCell, CoverageMasks, SpatialHash};

/// Registers every engine resource and the action executor.
pub struct GridEnginePlugin;

impl Plugin for GridEnginePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WorldGrid>()
            .init_resource::<BuildingCatalog>()
            .init_resource::<BuildingRegistry>()
            .init_resource::<SpatialHash>()
            .init_resource::<CoverageMasks>()
            .init_resource::<RoadNetwork>()
            .init_resource::<CityTreasury>()
            .init_resource::<GridPolicies>()
            .init_resource::<GridEventLog>()
            .init_resource::<GridActionQueue>()
            .init_resource::<GridActionLog>()
            .add_systems(FixedUpdate, execute_queued_actions);
    }
}
