//! Action executor system: drains the [`GridActionQueue`] each fixed-update
//! tick, applies every queued action through the placement transactions, and
//! records outcomes in the [`GridActionLog`].

use bevy::prelude::*;

use crate::buildings::BuildingRegistry;
use crate::catalog::BuildingCatalog;
use crate::construction;
use crate::economy::CityTreasury;
use crate::events::GridEventLog;
use crate::grid::WorldGrid;
use crate::policy::GridPolicies;
use crate::roads::RoadNetwork;
use crate::spatial_hash::SpatialHash;

use super::result_log::GridActionLog;
use super::{ActionOutcome, GridAction, GridActionQueue};

/// Drains all pending actions and executes them in order.
#[allow(clippy::too_many_arguments)]
pub fn execute_queued_actions(
    mut queue: ResMut<GridActionQueue>,
    mut log: ResMut<GridActionLog>,
    catalog: Res<BuildingCatalog>,
    mut grid: ResMut<WorldGrid>,
    mut buildings: ResMut<BuildingRegistry>,
    mut spatial: ResMut<SpatialHash>,
    mut roads: ResMut<RoadNetwork>,
    mut treasury: ResMut<CityTreasury>,
    policies: Res<GridPolicies>,
    mut events: ResMut<GridEventLog>,
) {
    for queued in queue.drain() {
        let outcome = execute_single(
            &queued.action,
            &catalog,
            &mut grid,
            &mut buildings,
            &mut spatial,
            &mut roads,
            &mut treasury,
            &policies,
            &mut events,
        );
        log.push(queued.action, outcome);
    }
}

/// Applies one action. Free function so tests and replay tooling can execute
/// actions without an ECS schedule.
#[allow(clippy::too_many_arguments)]
pub fn execute_single(
    action: &GridAction,
    catalog: &BuildingCatalog,
    grid: &mut WorldGrid,
    buildings: &mut BuildingRegistry,
    spatial: &mut SpatialHash,
    roads: &mut RoadNetwork,
    treasury: &mut CityTreasury,
    policies: &GridPolicies,
    events: &mut GridEventLog,
) -> ActionOutcome {
    match *action {
        GridAction::Place { pos, kind } => {
            match construction::place_building(
                pos, kind, catalog, grid, buildings, spatial, roads, treasury, policies, events,
            ) {
                Ok(receipt) => ActionOutcome::Placed {
                    building: receipt.building,
                    cost_paid: receipt.cost_paid,
                },
                Err(err) => ActionOutcome::Rejected(err),
            }
        }
        GridAction::PlaceForLoad { pos, kind } => {
            match construction::place_for_load(
                pos, kind, catalog, grid, buildings, spatial, roads, treasury, events,
            ) {
                Ok(building) => ActionOutcome::Loaded { building },
                Err(err) => ActionOutcome::Rejected(err),
            }
        }
        GridAction::Demolish { pos } => {
            match construction::remove_at(
                pos, catalog, grid, buildings, spatial, roads, treasury, events,
            ) {
                Ok(receipt) => ActionOutcome::Demolished {
                    building: receipt.building,
                    refund: receipt.refund,
                    was_overlay: receipt.was_overlay,
                },
                Err(err) => ActionOutcome::Rejected(err),
            }
        }
    }
}
