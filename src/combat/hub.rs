//! Combat lifecycle subscriptions.
//!
//! The hub records which effects listen to which combat's "ends" and
//! "merged" notifications. It is an explicit observer table: the engine
//! subscribes an effect when it attaches and always unsubscribes it when it
//! detaches, so a combat never keeps a reference to a detached effect.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::core::{CombatId, EffectId};

/// Subscriber list for one combat, in subscription order.
type Subscribers = SmallVec<[EffectId; 4]>;

/// Observer table for combat notifications.
#[derive(Clone, Debug, Default)]
pub struct CombatHub {
    /// Combat -> subscribed effects.
    subscribers: FxHashMap<CombatId, Subscribers>,

    /// Effect -> combat it listens to (at most one).
    by_effect: FxHashMap<EffectId, CombatId>,
}

impl CombatHub {
    /// Create an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe an effect to a combat, dropping any previous subscription.
    pub fn subscribe(&mut self, effect: EffectId, combat: CombatId) {
        self.unsubscribe(effect);
        self.subscribers.entry(combat).or_default().push(effect);
        self.by_effect.insert(effect, combat);
    }

    /// Remove an effect's subscription. Returns the combat it listened to.
    pub fn unsubscribe(&mut self, effect: EffectId) -> Option<CombatId> {
        let combat = self.by_effect.remove(&effect)?;
        if let Some(list) = self.subscribers.get_mut(&combat) {
            list.retain(|e| *e != effect);
            if list.is_empty() {
                self.subscribers.remove(&combat);
            }
        }
        Some(combat)
    }

    /// The combat an effect listens to.
    #[must_use]
    pub fn subscription_of(&self, effect: EffectId) -> Option<CombatId> {
        self.by_effect.get(&effect).copied()
    }

    /// Check if an effect listens to any combat.
    #[must_use]
    pub fn is_subscribed(&self, effect: EffectId) -> bool {
        self.by_effect.contains_key(&effect)
    }

    /// Effects listening to a combat, in subscription order.
    #[must_use]
    pub fn subscribers(&self, combat: CombatId) -> Vec<EffectId> {
        self.subscribers
            .get(&combat)
            .map(|list| list.to_vec())
            .unwrap_or_default()
    }

    /// Number of effects listening to a combat.
    #[must_use]
    pub fn subscriber_count(&self, combat: CombatId) -> usize {
        self.subscribers.get(&combat).map_or(0, |list| list.len())
    }

    /// Remove every subscription to a combat that has ended.
    ///
    /// Returns the former subscribers in subscription order.
    pub fn take_subscribers(&mut self, combat: CombatId) -> Vec<EffectId> {
        let list = self.subscribers.remove(&combat).unwrap_or_default();
        for effect in &list {
            self.by_effect.remove(effect);
        }
        list.into_vec()
    }

    /// Move every subscription from `old` to `new`.
    ///
    /// Returns the moved effects. Existing subscribers of `new` keep their
    /// place ahead of the moved ones.
    pub fn merge(&mut self, old: CombatId, new: CombatId) -> Vec<EffectId> {
        if old == new {
            return Vec::new();
        }
        let moved = self.subscribers.remove(&old).unwrap_or_default();
        if moved.is_empty() {
            return Vec::new();
        }
        let target = self.subscribers.entry(new).or_default();
        for effect in &moved {
            target.push(*effect);
            self.by_effect.insert(*effect, new);
        }
        moved.into_vec()
    }

    /// Total number of live subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_effect.len()
    }

    /// Check if there are no subscriptions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_effect.is_empty()
    }
}
