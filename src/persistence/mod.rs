//! Persistence adapter.
//!
//! Saving effects are written as a [`SavedEffects`] document per owner:
//! a list of [`EffectDefinition`]s, each a type discriminator plus a
//! variant-specific JSON payload. Loading looks each discriminator up in
//! the [`EffectRegistry`](crate::effects::EffectRegistry) and attaches the
//! rebuilt effect.
//!
//! ## Failure policy
//!
//! Loading never fails because of one bad effect. Unknown types, dangling
//! entity references and malformed payloads are logged, counted in the
//! [`LoadReport`], and skipped.

mod adapter;
mod definition;

pub use adapter::{load_all, load_effects, save_all, save_effects, LoadContext};
pub use definition::{EffectDefinition, LoadReport, SavedEffects, FORMAT_VERSION};
