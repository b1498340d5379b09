use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::catalog::BuildingKind;
use crate::grid::{footprint_cells, GridPos};

slotmap::new_key_type! {
    /// Generational handle to a placed building. Once the building is
    /// demolished the key stops resolving, which is how stale map entries
    /// are detected.
    pub struct BuildingId;
}

/// A live placed instance. Footprint dimensions are copied out of the catalog
/// at placement time so the occupied-cell set can be derived without a
/// catalog lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub kind: BuildingKind,
    /// Top-left cell of the footprint.
    pub origin: GridPos,
    pub width: usize,
    pub height: usize,
    /// Set and cleared by external collaborators (power/water coverage,
    /// construction progress); the grid engine only stores it.
    pub operational: bool,
}

impl Building {
    pub fn new(kind: BuildingKind, origin: GridPos, width: usize, height: usize) -> Self {
        Self {
            kind,
            origin,
            width,
            height,
            operational: true,
        }
    }

    /// Derived occupied-cell set: `{origin + (dx, dy)}` over the footprint.
    pub fn cells(&self) -> Vec<GridPos> {
        footprint_cells(self.origin, self.width, self.height)
    }
}

/// Unique-entity cache: one entry per placed instance regardless of footprint
/// size, so whole-city iteration is O(buildings) rather than O(occupied
/// cells). Doubles as the liveness oracle for stale-reference healing.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildingRegistry {
    buildings: SlotMap<BuildingId, Building>,
}

impl BuildingRegistry {
    pub fn insert(&mut self, building: Building) -> BuildingId {
        self.buildings.insert(building)
    }

    pub fn remove(&mut self, id: BuildingId) -> Option<Building> {
        self.buildings.remove(id)
    }

    pub fn get(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.get(id)
    }

    pub fn get_mut(&mut self, id: BuildingId) -> Option<&mut Building> {
        self.buildings.get_mut(id)
    }

    pub fn contains(&self, id: BuildingId) -> bool {
        self.buildings.contains_key(id)
    }

    pub fn set_operational(&mut self, id: BuildingId, operational: bool) -> bool {
        match self.buildings.get_mut(id) {
            Some(b) => {
                b.operational = operational;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BuildingId, &Building)> {
        self.buildings.iter()
    }
}
