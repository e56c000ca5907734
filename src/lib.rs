//! # world-effects
//!
//! A lifecycle engine for attached, time-limited world effects: buffs,
//! debuffs, command delays, stances, disguises and similar state layered on
//! characters, items and locations.
//!
//! ## Design Principles
//!
//! 1. **Capabilities Over Inheritance**: Variants declare a set of named
//!    contracts (blocks commands, overrides description, ...). Subsystems
//!    query contracts and never learn concrete types.
//!
//! 2. **One Removal Path**: However an effect goes away (timeout, explicit
//!    removal, cascade, owner destroyed, combat ended), it detaches through
//!    the same steps and its removal hook runs at most once.
//!
//! 3. **Non-Owning References**: The scheduler, the combat hub and
//!    dependent links hold ids, never effects. Detaching always
//!    unsubscribes.
//!
//! ## Architecture
//!
//! - **Tick-Driven**: One logical clock, advanced by the host. Waiting is a
//!   scheduled future tick, never a blocked thread.
//!
//! - **Deterministic Order**: Due expirations fire by due time, then by
//!   insertion order, from a snapshot taken before any hook runs.
//!
//! - **Recoverable Failures**: Unknown types, dangling references and
//!   failing predicates are logged and skipped, never fatal.
//!
//! ## Modules
//!
//! - `core`: Entity/effect/combat ids, logical time, configuration, errors
//! - `predicates`: Applicability conditions and the host predicate hook
//! - `effects`: The effect trait, capabilities, type registry
//! - `schedule`: Due-time table
//! - `combat`: Combat bindings and the subscription hub
//! - `delay`: Command delays and multi-stage actions
//! - `engine`: The lifecycle engine, hook context, outbound events
//! - `persistence`: Saving and loading effect definitions
//! - `variants`: Reference effect variants

pub mod core;
pub mod predicates;
pub mod effects;
pub mod schedule;
pub mod combat;
pub mod delay;
pub mod engine;
pub mod persistence;
pub mod variants;

// Re-export commonly used types
pub use crate::core::{
    CombatId, EffectError, EffectId, EngineConfig, EntityId, EntityKind, GameTime, Ticks,
};

pub use crate::predicates::{Condition, ConditionContext, ConditionEvaluator, PredicateEvaluator};

pub use crate::effects::{
    Capability, CapabilitySet, Contract, DescriptionOverride, Effect, EffectRegistry, Expiry,
    Lifecycle, PositionLock, Target,
};

pub use crate::schedule::Scheduler;

pub use crate::combat::{CombatBinding, CombatHub, CombatLinked};

pub use crate::delay::{Blocking, CommandDelay, StageIntervals, StagedAction};

pub use crate::engine::{EffectContext, EffectEngine, EngineEvent, RemovalReason};

pub use crate::persistence::{
    load_effects, save_effects, EffectDefinition, LoadContext, LoadReport, SavedEffects,
};
