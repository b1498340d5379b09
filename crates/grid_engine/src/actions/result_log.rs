//! Ring-buffer log of recently executed actions and their outcomes, so
//! callers (agents, UI, replay verification) can inspect what happened
//! without watching every tick.

use bevy::prelude::*;

use super::{ActionOutcome, GridAction};

const MAX_ENTRIES: usize = 64;

/// The last [`MAX_ENTRIES`] action/outcome pairs; oldest evicted first.
#[derive(Resource, Debug, Clone, Default)]
pub struct GridActionLog {
    entries: Vec<(GridAction, ActionOutcome)>,
}

impl GridActionLog {
    pub fn push(&mut self, action: GridAction, outcome: ActionOutcome) {
        if self.entries.len() >= MAX_ENTRIES {
            self.entries.remove(0);
        }
        self.entries.push((action, outcome));
    }

    /// The last `n` entries, or fewer if the log is shorter.
    pub fn last_n(&self, n: usize) -> &[(GridAction, ActionOutcome)] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
