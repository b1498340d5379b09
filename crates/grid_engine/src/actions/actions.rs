use serde::{Deserialize, Serialize};

use crate::catalog::BuildingKind;
use crate::grid::GridPos;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridAction {
    Place { pos: GridPos, kind: BuildingKind },
    /// Replay path used by save-load: registers without charging funds or
    /// journaling events.
    PlaceForLoad { pos: GridPos, kind: BuildingKind },
    Demolish { pos: GridPos },
}
