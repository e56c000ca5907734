//! Effect abstraction and type registry.
//!
//! - [`Effect`]: the base contract every variant implements
//! - [`Capability`] / [`CapabilitySet`]: named contracts a variant opts into
//! - [`EffectRegistry`]: type discriminator -> reconstruction factory
//!
//! ## Design Philosophy
//!
//! Variants combine capabilities freely instead of inheriting from one
//! another. A subsystem that cares about, say, position locks asks each
//! effect for that contract and never learns the concrete type.

mod capability;
mod effect;
mod registry;

pub use capability::{Capability, CapabilitySet, Contract, DescriptionOverride, PositionLock};
pub use effect::{Effect, Expiry, Lifecycle, Target};
pub use registry::{EffectFactory, EffectRegistry};
