use serde::{Deserialize, Serialize};

use crate::buildings::BuildingId;
use crate::placement::PlacementError;

/// What a single executed action did to the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionOutcome {
    Placed {
        building: BuildingId,
        cost_paid: i64,
    },
    Loaded {
        building: BuildingId,
    },
    Demolished {
        building: BuildingId,
        refund: i64,
        was_overlay: bool,
    },
    Rejected(PlacementError),
}

impl ActionOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, ActionOutcome::Rejected(_))
    }

    pub fn rejection(&self) -> Option<&PlacementError> {
        match self {
            ActionOutcome::Rejected(err) => Some(err),
            _ => None,
        }
    }
}
