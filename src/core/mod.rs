//! Core engine types: identifiers, logical time, configuration, errors.
//!
//! These are the building blocks shared by every other module. Hosts
//! configure behavior via `EngineConfig` rather than modifying the core.

pub mod entity;
pub mod time;
pub mod config;
pub mod error;

pub use entity::{CombatId, EffectId, EntityId, EntityKind};
pub use time::{GameTime, Ticks};
pub use config::EngineConfig;
pub use error::EffectError;
