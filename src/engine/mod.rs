//! The effect lifecycle engine.
//!
//! - [`EffectEngine`]: owner table, lifecycle, scheduling, combat hub
//! - [`EffectContext`]: engine access from inside an effect's hooks
//! - [`EngineEvent`]: outbound notifications for the host

mod context;
#[allow(clippy::module_inception)]
mod engine;
mod events;

pub use context::EffectContext;
pub use engine::{EffectEngine, OwnerRecord};
pub use events::{EngineEvent, RemovalReason};
