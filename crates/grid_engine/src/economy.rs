use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::catalog::BuildingKind;
use crate::config::STARTING_FUNDS;

/// City funds and per-kind building counts. Currency is integral: effective
/// costs and refunds are floored before they ever reach the treasury, so a
/// place/remove pair nets exactly `-cost + floor(cost * REFUND_FRACTION)`.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct CityTreasury {
    pub funds: i64,
    building_counts: HashMap<BuildingKind, u32>,
}

impl Default for CityTreasury {
    fn default() -> Self {
        Self {
            funds: STARTING_FUNDS,
            building_counts: HashMap::new(),
        }
    }
}

impl CityTreasury {
    pub fn with_funds(funds: i64) -> Self {
        Self {
            funds,
            building_counts: HashMap::new(),
        }
    }

    pub fn can_afford(&self, amount: i64) -> bool {
        self.funds >= amount
    }

    pub fn spend(&mut self, amount: i64) {
        self.funds -= amount;
    }

    pub fn earn(&mut self, amount: i64) {
        self.funds += amount;
    }

    pub fn increment_count(&mut self, kind: BuildingKind) {
        *self.building_counts.entry(kind).or_insert(0) += 1;
    }

    pub fn decrement_count(&mut self, kind: BuildingKind) {
        if let Some(count) = self.building_counts.get_mut(&kind) {
            *count = count.saturating_sub(1);
        }
    }

    pub fn count_of(&self, kind: BuildingKind) -> u32 {
        self.building_counts.get(&kind).copied().unwrap_or(0)
    }
}
