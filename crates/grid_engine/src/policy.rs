//! Capability interfaces for the external collaborators consulted during
//! validation. Implementations are injected at composition time through
//! [`GridPolicies`]; the engine never reaches for ambient global state, so
//! every policy can be swapped out in tests.

use bevy::prelude::*;

use crate::catalog::BuildingDef;
use crate::grid::GridPos;

/// Outcome of a single collaborator check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCheck {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl BuildCheck {
    pub fn pass() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Terrain buildability, evaluated per footprint cell.
pub trait TerrainOracle: Send + Sync {
    fn is_buildable(&self, pos: GridPos, def: &BuildingDef) -> BuildCheck;
}

/// Floor-area-ratio / density compliance, evaluated per placement.
pub trait DensityOracle: Send + Sync {
    fn is_far_compliant(&self, pos: GridPos, def: &BuildingDef) -> BuildCheck;
}

/// Optional construction-cost scaling (weather, season). Absent means 1.0.
pub trait CostModifier: Send + Sync {
    fn construction_cost_multiplier(&self) -> f32;
}

/// Terrain oracle that allows building everywhere.
pub struct OpenTerrain;

impl TerrainOracle for OpenTerrain {
    fn is_buildable(&self, _pos: GridPos, _def: &BuildingDef) -> BuildCheck {
        BuildCheck::pass()
    }
}

/// Density oracle with no FAR limit.
pub struct UnlimitedDensity;

impl DensityOracle for UnlimitedDensity {
    fn is_far_compliant(&self, _pos: GridPos, _def: &BuildingDef) -> BuildCheck {
        BuildCheck::pass()
    }
}

/// The composed set of policy collaborators the placement pipeline consults.
#[derive(Resource)]
pub struct GridPolicies {
    pub terrain: Box<dyn TerrainOracle>,
    pub density: Box<dyn DensityOracle>,
    pub cost: Option<Box<dyn CostModifier>>,
}

impl Default for GridPolicies {
    fn default() -> Self {
        Self {
            terrain: Box::new(OpenTerrain),
            density: Box::new(UnlimitedDensity),
            cost: None,
        }
    }
}

impl GridPolicies {
    pub fn cost_multiplier(&self) -> f32 {
        self.cost
            .as_ref()
            .map_or(1.0, |c| c.construction_cost_multiplier())
    }
}
