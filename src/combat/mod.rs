//! Combat-linked effects.
//!
//! Some effects live exactly as long as the fight their owner is in. Such
//! a variant embeds a [`CombatBinding`], implements [`CombatLinked`], and
//! declares `Capability::CombatLinked`. The engine then:
//!
//! 1. binds it to the owner's current combat on attach and subscribes it in
//!    the [`CombatHub`];
//! 2. expires it when that combat ends (`EffectEngine::end_combat`);
//! 3. moves the subscription and rebinds it when the combat merges into
//!    another (`EffectEngine::merge_combat`);
//! 4. unsubscribes it whenever it detaches, however that happens.

mod binding;
mod hub;

pub use binding::{CombatBinding, CombatLinked};
pub use hub::CombatHub;
