//! Identifier types.
//!
//! Everything the engine references across a save/reload boundary is
//! addressed by a stable numeric id, never by a live reference:
//!
//! - [`EntityId`]: an owner entity (character, item, location)
//! - [`EffectId`]: an attached effect instance, allocated by the engine
//! - [`CombatId`]: an external combat context
//!
//! ## Usage
//!
//! ```
//! use world_effects::core::{EntityId, EffectId};
//!
//! let goblin = EntityId::new(42);
//! assert_eq!(goblin.raw(), 42);
//! assert_eq!(format!("{}", goblin), "Entity(42)");
//!
//! let first = EffectId::FIRST;
//! assert!(first < first.next());
//! ```

use serde::{Deserialize, Serialize};

/// Stable identifier of a world entity that can own effects.
///
/// This is the form persisted in effect payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl EntityId {
    /// Create a new entity ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Identifier of an attached effect instance.
///
/// Allocated by the engine in increasing order and never reused, so an id
/// below the allocation cursor that no longer resolves is known to be
/// detached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectId(pub u64);

impl EffectId {
    /// The first id an engine hands out.
    pub const FIRST: Self = Self(1);

    /// Create a new effect ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// The id allocated after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for EffectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Effect({})", self.0)
    }
}

/// Identifier of an external combat context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CombatId(pub u64);

impl CombatId {
    /// Create a new combat ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for CombatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Combat({})", self.0)
    }
}

/// Broad category of an owner entity.
///
/// The engine does not model entities beyond this; variants use it for
/// applicability checks and morph handling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// A player or NPC.
    #[default]
    Character,
    /// A carried or placed object.
    Item,
    /// A room, cell or other place.
    Location,
    /// Anything else that can carry effects.
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id() {
        let id = EntityId::new(7);
        assert_eq!(id.raw(), 7);
        assert_eq!(EntityId::from(7), id);
        assert_eq!(format!("{}", id), "Entity(7)");
    }

    #[test]
    fn test_effect_id_ordering() {
        let a = EffectId::FIRST;
        let b = a.next();
        assert!(a < b);
        assert_eq!(b.raw(), 2);
        assert_eq!(format!("{}", b), "Effect(2)");
    }

    #[test]
    fn test_combat_id_display() {
        assert_eq!(format!("{}", CombatId::new(3)), "Combat(3)");
    }

    #[test]
    fn test_serialization_is_transparent() {
        let json = serde_json::to_string(&EntityId(123)).unwrap();
        assert_eq!(json, "123");
        let back: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, EntityId(123));
    }

    #[test]
    fn test_default_kind() {
        assert_eq!(EntityKind::default(), EntityKind::Character);
    }
}
