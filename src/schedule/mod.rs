//! Timed expiry scheduling.
//!
//! The [`Scheduler`] binds a subset of active effects to an absolute due
//! time. Each game tick the engine advances the clock, snapshots the
//! entries that are due, and fires their expirations in ascending due-time
//! order, breaking ties by insertion order.
//!
//! ## Policies
//!
//! - At most one live entry per effect. `add` replaces ("restart the timer").
//! - `reschedule_if_longer` only replaces when the new due time is strictly
//!   later, so stacking the same buff never shortens it.
//! - An entry is consumed before its expiration runs, so an effect that
//!   reschedules itself from its own expire hook is never double-processed.

mod scheduler;

pub use scheduler::{ScheduleKey, Scheduler};
