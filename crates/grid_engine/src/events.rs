use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::buildings::BuildingId;
use crate::grid::GridPos;

/// Structural change notifications emitted by the placement and overlay
/// operations. By the time `BuildingPlaced`/`BuildingRemoved` is observed,
/// every index structure is already consistent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GridEvent {
    BuildingPlaced { pos: GridPos, building: BuildingId },
    BuildingRemoved { pos: GridPos, building: BuildingId },
    PowerNetworkChanged { pos: GridPos, added: bool },
    WaterNetworkChanged { pos: GridPos, added: bool },
    InsufficientFunds { amount: i64 },
}

/// Bounded journal of grid events. Consumers (UI refresh, audio, agents)
/// drain it each tick; if nobody drains, the oldest entries are evicted.
#[derive(Resource, Debug, Clone)]
pub struct GridEventLog {
    events: Vec<GridEvent>,
    pub max_events: usize,
}

impl Default for GridEventLog {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            max_events: 1024,
        }
    }
}

impl GridEventLog {
    pub fn push(&mut self, event: GridEvent) {
        self.events.push(event);
        if self.events.len() > self.max_events {
            let excess = self.events.len() - self.max_events;
            self.events.drain(0..excess);
        }
    }

    pub fn drain(&mut self) -> Vec<GridEvent> {
        self.events.drain(..).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GridEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
