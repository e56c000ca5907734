//! Due-time table for scheduled expirations.
//!
//! The scheduler holds non-owning associations `effect -> due time`. It
//! never touches effect objects; the engine asks it which entries are due
//! and runs the expirations itself.
//!
//! ## Ordering
//!
//! Entries are ordered by `(due, seq)`, where `seq` is a per-scheduler
//! insertion counter. Two entries due at the same time fire in the order
//! they were scheduled. Replacing an entry gives it a fresh `seq`.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;

use crate::core::{EffectId, GameTime, Ticks};

/// One live schedule entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScheduleKey {
    /// Absolute due time.
    pub due: GameTime,
    /// Insertion counter, breaks ties between equal due times.
    pub seq: u64,
    /// The scheduled effect.
    pub effect: EffectId,
}

/// Logical clock plus due-time table.
///
/// ## Usage
///
/// ```
/// use world_effects::core::{EffectId, GameTime, Ticks};
/// use world_effects::schedule::Scheduler;
///
/// let mut scheduler = Scheduler::new();
/// scheduler.add(EffectId(1), Ticks::new(10));
///
/// // Stacking never shortens the remaining time
/// assert!(!scheduler.reschedule_if_longer(EffectId(1), Ticks::new(5)));
/// assert_eq!(scheduler.remaining(EffectId(1)), Some(Ticks::new(10)));
///
/// assert!(scheduler.reschedule_if_longer(EffectId(1), Ticks::new(20)));
/// assert_eq!(scheduler.due_time(EffectId(1)), Some(GameTime::new(20)));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    /// Current logical time.
    now: GameTime,

    /// Entries ordered by due time, then insertion.
    queue: BTreeSet<ScheduleKey>,

    /// Live entry per effect (at most one).
    by_effect: FxHashMap<EffectId, ScheduleKey>,

    /// Next insertion counter.
    next_seq: u64,
}

impl Scheduler {
    /// Create an empty scheduler at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty scheduler at the given time.
    #[must_use]
    pub fn starting_at(now: GameTime) -> Self {
        Self {
            now,
            ..Self::default()
        }
    }

    /// Current logical time.
    #[must_use]
    pub fn now(&self) -> GameTime {
        self.now
    }

    /// Move the clock forward. Never moves it backwards.
    pub fn advance_to(&mut self, now: GameTime) {
        if now > self.now {
            self.now = now;
        }
    }

    /// Schedule `effect` to fire `duration` from now, replacing any
    /// existing entry. Returns the new due time.
    pub fn add(&mut self, effect: EffectId, duration: Ticks) -> GameTime {
        let due = self.now + duration;
        self.add_at(effect, due);
        due
    }

    /// Schedule `effect` at an absolute due time, replacing any existing entry.
    pub fn add_at(&mut self, effect: EffectId, due: GameTime) {
        self.cancel(effect);

        let key = ScheduleKey {
            due,
            seq: self.next_seq,
            effect,
        };
        self.next_seq += 1;

        self.queue.insert(key);
        self.by_effect.insert(effect, key);
    }

    /// Replace the entry only if the new due time is strictly later.
    ///
    /// An effect with no entry is scheduled unconditionally.
    /// Returns true if the schedule changed.
    pub fn reschedule_if_longer(&mut self, effect: EffectId, duration: Ticks) -> bool {
        let candidate = self.now + duration;
        match self.by_effect.get(&effect) {
            Some(existing) if existing.due >= candidate => false,
            _ => {
                self.add_at(effect, candidate);
                true
            }
        }
    }

    /// Remove an effect's entry. Returns its due time if there was one.
    pub fn cancel(&mut self, effect: EffectId) -> Option<GameTime> {
        let key = self.by_effect.remove(&effect)?;
        self.queue.remove(&key);
        Some(key.due)
    }

    /// The effect's due time, if scheduled.
    #[must_use]
    pub fn due_time(&self, effect: EffectId) -> Option<GameTime> {
        self.by_effect.get(&effect).map(|k| k.due)
    }

    /// Time left until the effect fires, if scheduled.
    #[must_use]
    pub fn remaining(&self, effect: EffectId) -> Option<Ticks> {
        self.due_time(effect).map(|due| due.since(self.now))
    }

    /// Check if an effect has a live entry.
    #[must_use]
    pub fn is_scheduled(&self, effect: EffectId) -> bool {
        self.by_effect.contains_key(&effect)
    }

    /// Earliest due time, if anything is scheduled.
    #[must_use]
    pub fn next_due(&self) -> Option<GameTime> {
        self.queue.first().map(|k| k.due)
    }

    /// Entries due at or before `now`, in firing order.
    ///
    /// This is a snapshot: entries added after it is taken are not part of
    /// it, even if already due.
    #[must_use]
    pub fn due_snapshot(&self, now: GameTime) -> Vec<ScheduleKey> {
        self.queue
            .iter()
            .take_while(|k| k.due <= now)
            .copied()
            .collect()
    }

    /// Consume a snapshotted entry before firing it.
    ///
    /// Returns false if the entry was cancelled or replaced since the
    /// snapshot was taken, in which case it must not fire.
    pub fn consume(&mut self, key: ScheduleKey) -> bool {
        if self.by_effect.get(&key.effect) != Some(&key) {
            return false;
        }
        self.by_effect.remove(&key.effect);
        self.queue.remove(&key);
        true
    }

    /// Iterate live entries in firing order.
    pub fn iter(&self) -> impl Iterator<Item = &ScheduleKey> {
        self.queue.iter()
    }

    /// Get the number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_effect.len()
    }

    /// Check if nothing is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_effect.is_empty()
    }
}
