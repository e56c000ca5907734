//! Capability tags and contracts.
//!
//! External subsystems never downcast to a concrete effect variant. They
//! ask "does this effect implement capability C" and, if it does, use C's
//! contract. Each variant declares a fixed [`CapabilitySet`].

use serde::{Deserialize, Serialize};

use crate::combat::CombatLinked;
use crate::core::EntityId;
use crate::delay::Blocking;

/// A named behavioral contract an effect variant may opt into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Blocks specified commands or command categories.
    BlocksCommands,
    /// Replaces the owner's short and full descriptions.
    OverridesDescription,
    /// Prevents the owner from changing position.
    PreventsPositionChange,
    /// Bound to the lifecycle of a combat context.
    CombatLinked,
    /// Removed when the owner leaves combat.
    CombatEndCleanup,
    /// Removed when the owner moves.
    RemovedOnMove,
}

impl Capability {
    /// Every capability, in declaration order.
    pub const ALL: [Capability; 6] = [
        Capability::BlocksCommands,
        Capability::OverridesDescription,
        Capability::PreventsPositionChange,
        Capability::CombatLinked,
        Capability::CombatEndCleanup,
        Capability::RemovedOnMove,
    ];

    const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// A fixed set of capabilities.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Capability>", into = "Vec<Capability>")]
pub struct CapabilitySet(u16);

impl CapabilitySet {
    /// No capabilities.
    pub const EMPTY: Self = Self(0);

    /// Build a set from a slice.
    #[must_use]
    pub const fn of(capabilities: &[Capability]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < capabilities.len() {
            bits |= capabilities[i].bit();
            i += 1;
        }
        Self(bits)
    }

    /// Add a capability (builder pattern).
    #[must_use]
    pub const fn with(self, capability: Capability) -> Self {
        Self(self.0 | capability.bit())
    }

    /// Check membership.
    #[must_use]
    pub const fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    /// Check if the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of capabilities in the set.
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

impl From<Vec<Capability>> for CapabilitySet {
    fn from(capabilities: Vec<Capability>) -> Self {
        capabilities.into_iter().collect()
    }
}

impl From<CapabilitySet> for Vec<Capability> {
    fn from(set: CapabilitySet) -> Self {
        set.iter().collect()
    }
}

impl std::fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Overrides how the owner is described to viewers.
pub trait DescriptionOverride {
    /// One-line description shown in lists.
    fn short_description(&self, viewer: Option<EntityId>) -> String;

    /// Full description shown on inspection.
    fn full_description(&self, viewer: Option<EntityId>) -> String;
}

/// Prevents the owner from changing position.
pub trait PositionLock {
    /// Whether moving into `position` is prevented.
    fn prevents_position_change(&self, position: &str) -> bool;

    /// Why the change is prevented.
    fn position_lock_reason(&self, position: &str) -> String;
}

/// A capability's contract, as returned by `<dyn Effect>::contract`.
pub enum Contract<'a> {
    /// See [`Blocking`].
    BlocksCommands(&'a dyn Blocking),
    /// See [`DescriptionOverride`].
    OverridesDescription(&'a dyn DescriptionOverride),
    /// See [`PositionLock`].
    PreventsPositionChange(&'a dyn PositionLock),
    /// See [`CombatLinked`].
    CombatLinked(&'a dyn CombatLinked),
    /// Capabilities with no methods; the engine acts on the tag alone.
    Marker(Capability),
}
