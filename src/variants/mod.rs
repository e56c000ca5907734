//! Reference effect variants.
//!
//! Concrete effects built on the engine, one per capability combination:
//!
//! | Variant | Saving | Capabilities |
//! |---------|--------|--------------|
//! | [`Marker`] | yes | (condition, expiry message) |
//! | [`Watching`] | yes | re-arms while its target stays |
//! | [`Sneaking`] / [`SawSneaker`] | no | dependents, `RemovedOnMove` |
//! | [`CombatStance`] | no | `CombatLinked`, `CombatEndCleanup`, `PreventsPositionChange` |
//! | [`Disguise`] | yes | `OverridesDescription` |
//! | [`Enchantment`] | yes | morph-aware |
//!
//! Hosts call [`register_builtin`] once at startup to make the saving
//! variants loadable.

mod disguise;
mod enchantment;
mod marker;
mod sneaking;
mod stance;
mod watching;

pub use disguise::Disguise;
pub use enchantment::Enchantment;
pub use marker::Marker;
pub use sneaking::{SawSneaker, Sneaking};
pub use stance::CombatStance;
pub use watching::Watching;

use crate::core::EffectError;
use crate::effects::EffectRegistry;

/// Register every saving built-in variant.
///
/// Fails on the first name that is already bound.
pub fn register_builtin(registry: &mut EffectRegistry) -> Result<(), EffectError> {
    registry.register(Marker::TYPE, Marker::from_definition)?;
    registry.register(Watching::TYPE, Watching::from_definition)?;
    registry.register(Disguise::TYPE, Disguise::from_definition)?;
    registry.register(Enchantment::TYPE, Enchantment::from_definition)?;
    Ok(())
}
