use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::GridAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionSource {
    Player,
    Agent,
    Replay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedAction {
    pub tick: u64,
    pub source: ActionSource,
    pub action: GridAction,
}

/// FIFO queue of pending grid mutations, drained by
/// [`super::execute_queued_actions`] once per fixed tick.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridActionQueue {
    pending: Vec<QueuedAction>,
}

impl GridActionQueue {
    pub fn push(&mut self, tick: u64, source: ActionSource, action: GridAction) {
        self.pending.push(QueuedAction {
            tick,
            source,
            action,
        });
    }

    pub fn push_queued(&mut self, queued: QueuedAction) {
        self.pending.push(queued);
    }

    pub fn drain(&mut self) -> Vec<QueuedAction> {
        self.pending.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
