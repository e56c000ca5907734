//! Command delays and multi-stage actions.
//!
//! - [`Blocking`]: the contract command dispatch queries ("is this actor
//!   blocked from running `move`, and why?")
//! - [`CommandDelay`]: blocks commands until one timeout elapses
//! - [`StagedAction`]: blocks commands across several scheduled stages

mod blocking;
mod command;
mod staged;

pub use blocking::{BlockList, Blocking};
pub use command::{CommandDelay, CompletionCallback};
pub use staged::{StageAction, StageIntervals, StagedAction};
