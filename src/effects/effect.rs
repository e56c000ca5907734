//! The base effect contract.
//!
//! An effect is a unit of attached, possibly time-limited state that
//! modifies the behavior of its owner. Concrete variants implement
//! [`Effect`]; the engine drives their lifecycle and never needs to know
//! which variant it is holding.
//!
//! ## Lifecycle
//!
//! ```text
//!            ┌── scheduled timeout ──> Expired ──┐
//! Active ────┤                                   ├──> Detached
//!            └── explicit / cascade ─> Removed ──┘
//! ```
//!
//! - `on_expire` runs exactly once per scheduled timeout that elapses.
//! - `on_removal` runs at most once, whenever the effect leaves Active for
//!   any reason (including after `on_expire` asks to detach).
//! - Operations on a detached effect are no-ops.

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::combat::CombatLinked;
use crate::core::{EffectError, EntityId};
use crate::delay::Blocking;
use crate::engine::EffectContext;
use crate::predicates::Condition;

use super::capability::{
    Capability, CapabilitySet, Contract, DescriptionOverride, PositionLock,
};

/// What an effect is being checked against in [`Effect::applies_to`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target<'a> {
    /// No particular target.
    None,
    /// A world entity (a viewer, a limb, an item).
    Entity(EntityId),
    /// A named trait or skill.
    Trait(&'a str),
    /// A command name or category.
    Command(&'a str),
}

impl<'a> Target<'a> {
    /// The target entity, if this targets one.
    #[must_use]
    pub fn entity(&self) -> Option<EntityId> {
        match self {
            Self::Entity(id) => Some(*id),
            _ => None,
        }
    }

    /// The target trait name, if this targets one.
    #[must_use]
    pub fn trait_name(&self) -> Option<&'a str> {
        match self {
            Self::Trait(name) => Some(name),
            _ => None,
        }
    }

    /// The target command, if this targets one.
    #[must_use]
    pub fn command(&self) -> Option<&'a str> {
        match self {
            Self::Command(name) => Some(name),
            _ => None,
        }
    }
}

/// Outcome of an expire hook.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Expiry {
    /// Detach the effect (the normal outcome).
    #[default]
    Detach,
    /// Keep the effect attached. The hook is responsible for scheduling
    /// itself again if it wants another firing.
    Retain,
}

/// Lifecycle state of an effect instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lifecycle {
    /// Attached and live.
    Active,
    /// Its expire hook is running.
    Expired,
    /// Its removal hook is running.
    Removed,
    /// Gone. Terminal.
    Detached,
}

/// A concrete effect variant.
///
/// Only [`effect_type`](Effect::effect_type) and
/// [`describe`](Effect::describe) are required; every other method has a
/// default matching a plain, non-persistent effect with no capabilities.
///
/// Capability accessors (`blocking`, `description_override`, ...) must
/// agree with [`capabilities`](Effect::capabilities): a variant declaring
/// [`Capability::BlocksCommands`] returns `Some` from `blocking`.
pub trait Effect: Any + Send {
    /// Stable discriminator, unique per variant.
    fn effect_type(&self) -> &'static str;

    /// Side-effect-free description for introspection and admin tooling.
    fn describe(&self, viewer: Option<EntityId>) -> String;

    /// Whether this effect survives a save/reload cycle.
    fn saving_effect(&self) -> bool {
        false
    }

    /// The capability contracts this variant implements.
    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::EMPTY
    }

    /// Optional applicability condition.
    fn condition(&self) -> Option<&Condition> {
        None
    }

    /// Structural applicability check, run before the condition.
    fn applies_to(&self, _target: &Target<'_>) -> bool {
        true
    }

    /// Called when a scheduled timeout elapses.
    fn on_expire(&mut self, _ctx: &mut EffectContext<'_>) -> Result<Expiry, EffectError> {
        Ok(Expiry::Detach)
    }

    /// Called once when the effect leaves Active. Release external state here.
    fn on_removal(&mut self, _ctx: &mut EffectContext<'_>) {}

    /// Type-specific payload for persistence. Only consulted when
    /// [`saving_effect`](Effect::saving_effect) is true.
    fn save_definition(&self) -> Option<serde_json::Value> {
        None
    }

    /// Re-target this effect onto an entity that replaces its owner.
    fn on_entity_morph(&self, _old: EntityId, _new: EntityId) -> Option<Box<dyn Effect>> {
        None
    }

    // === Capability contracts ===

    /// Command blocking contract.
    fn blocking(&self) -> Option<&dyn Blocking> {
        None
    }

    /// Description override contract.
    fn description_override(&self) -> Option<&dyn DescriptionOverride> {
        None
    }

    /// Position lock contract.
    fn position_lock(&self) -> Option<&dyn PositionLock> {
        None
    }

    /// Combat binding contract.
    fn combat_linked(&self) -> Option<&dyn CombatLinked> {
        None
    }

    /// Mutable combat binding contract, used when combats merge.
    fn combat_linked_mut(&mut self) -> Option<&mut dyn CombatLinked> {
        None
    }
}

impl dyn Effect {
    /// Is the concrete variant `T`?
    #[must_use]
    pub fn is<T: Effect>(&self) -> bool {
        let any: &dyn Any = self;
        any.is::<T>()
    }

    /// Downcast to a concrete variant.
    #[must_use]
    pub fn downcast_ref<T: Effect>(&self) -> Option<&T> {
        let any: &dyn Any = self;
        any.downcast_ref::<T>()
    }

    /// Downcast to a concrete variant, mutably.
    pub fn downcast_mut<T: Effect>(&mut self) -> Option<&mut T> {
        let any: &mut dyn Any = self;
        any.downcast_mut::<T>()
    }

    /// Does this effect implement `capability`, and if so, its contract.
    #[must_use]
    pub fn contract(&self, capability: Capability) -> Option<Contract<'_>> {
        if !self.capabilities().contains(capability) {
            return None;
        }
        match capability {
            Capability::BlocksCommands => self.blocking().map(Contract::BlocksCommands),
            Capability::OverridesDescription => {
                self.description_override().map(Contract::OverridesDescription)
            }
            Capability::PreventsPositionChange => {
                self.position_lock().map(Contract::PreventsPositionChange)
            }
            Capability::CombatLinked => self.combat_linked().map(Contract::CombatLinked),
            Capability::CombatEndCleanup | Capability::RemovedOnMove => {
                Some(Contract::Marker(capability))
            }
        }
    }
}

impl std::fmt::Debug for dyn Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("type", &self.effect_type())
            .field("capabilities", &self.capabilities())
            .finish()
    }
}
