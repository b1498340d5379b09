//! Queued command surface over the placement transactions. UI, agents, and
//! save-load replay all mutate the grid through the same FIFO queue so every
//! mutation is ordered, logged, and inspectable after the fact.

pub mod actions;
pub mod executor;
pub mod queue;
pub mod result_log;
pub mod results;

pub use actions::GridAction;
pub use executor::{execute_queued_actions, execute_single};
pub use queue::{ActionSource, GridActionQueue, QueuedAction};
pub use result_log::GridActionLog;
pub use results::ActionOutcome;
