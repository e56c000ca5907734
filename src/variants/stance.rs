//! Combat stances.

use crate::combat::{CombatBinding, CombatLinked};
use crate::core::{EffectError, EntityId};
use crate::effects::{Capability, CapabilitySet, Effect, Expiry, PositionLock};
use crate::engine::EffectContext;

/// A fighting stance held for the rest of the current fight.
///
/// Bound to the owner's combat: it ends with the combat, follows merges,
/// and is dropped if the owner leaves the fight. While held, the owner
/// cannot change into any other position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CombatStance {
    stance: String,
    binding: CombatBinding,
}

impl CombatStance {
    /// Type discriminator.
    pub const TYPE: &'static str = "CombatStance";

    /// Hold `stance`.
    pub fn new(stance: impl Into<String>) -> Self {
        Self {
            stance: stance.into(),
            binding: CombatBinding::new(),
        }
    }

    /// The stance name.
    #[must_use]
    pub fn stance(&self) -> &str {
        &self.stance
    }
}

impl CombatLinked for CombatStance {
    fn binding(&self) -> &CombatBinding {
        &self.binding
    }

    fn binding_mut(&mut self) -> &mut CombatBinding {
        &mut self.binding
    }
}

impl PositionLock for CombatStance {
    fn prevents_position_change(&self, position: &str) -> bool {
        !position.eq_ignore_ascii_case(&self.stance)
    }

    fn position_lock_reason(&self, position: &str) -> String {
        format!(
            "You cannot go {position} while holding your {} stance.",
            self.stance
        )
    }
}

impl Effect for CombatStance {
    fn effect_type(&self) -> &'static str {
        Self::TYPE
    }

    fn describe(&self, _viewer: Option<EntityId>) -> String {
        match self.binding.combat() {
            Some(combat) => format!("{} stance ({combat})", self.stance),
            None => format!("{} stance (no combat)", self.stance),
        }
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of(&[
            Capability::CombatLinked,
            Capability::CombatEndCleanup,
            Capability::PreventsPositionChange,
        ])
    }

    fn on_expire(&mut self, ctx: &mut EffectContext<'_>) -> Result<Expiry, EffectError> {
        ctx.message_owner(format!("You relax your {} stance.", self.stance));
        Ok(Expiry::Detach)
    }

    fn position_lock(&self) -> Option<&dyn PositionLock> {
        Some(self)
    }

    fn combat_linked(&self) -> Option<&dyn CombatLinked> {
        Some(self)
    }

    fn combat_linked_mut(&mut self) -> Option<&mut dyn CombatLinked> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::core::{CombatId, EntityKind};
    use crate::engine::EffectEngine;

    #[test]
    fn test_binds_to_owner_combat() {
        let mut engine = EffectEngine::default();
        engine.spawn_entity(EntityId(1), EntityKind::Character);
        engine.enter_combat(EntityId(1), CombatId(9)).unwrap();

        let id = engine
            .add_effect(EntityId(1), Box::new(CombatStance::new("defensive")))
            .unwrap();

        let stance = engine.get::<CombatStance>(id).unwrap();
        assert_eq!(stance.combat(), Some(CombatId(9)));
        assert_eq!(engine.combats().subscription_of(id), Some(CombatId(9)));
        assert_eq!(
            engine.describe(id, None).as_deref(),
            Some("defensive stance (Combat(9))")
        );
    }

    #[test]
    fn test_position_lock() {
        let mut engine = EffectEngine::default();
        engine.spawn_entity(EntityId(1), EntityKind::Character);
        engine
            .add_effect(EntityId(1), Box::new(CombatStance::new("crouching")))
            .unwrap();

        assert!(engine.position_change_blocker(EntityId(1), "Crouching").is_none());
        assert_eq!(
            engine.position_change_blocker(EntityId(1), "sitting").as_deref(),
            Some("You cannot go sitting while holding your crouching stance.")
        );
    }

    #[test]
    fn test_unbound_outside_combat() {
        let mut engine = EffectEngine::default();
        engine.spawn_entity(EntityId(1), EntityKind::Character);
        let id = engine
            .add_effect(EntityId(1), Box::new(CombatStance::new("aggressive")))
            .unwrap();

        assert_eq!(engine.get::<CombatStance>(id).unwrap().combat(), None);
        assert!(engine.combats().is_empty());
    }
}
