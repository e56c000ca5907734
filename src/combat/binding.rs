//! Per-effect combat binding.

use crate::core::CombatId;

/// Non-owning reference from an effect to the combat it is bound to.
///
/// The engine fills this in when the effect is attached (from the owner's
/// current combat) and rewrites it when that combat merges into another.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CombatBinding {
    combat: Option<CombatId>,
}

impl CombatBinding {
    /// An unbound binding.
    #[must_use]
    pub const fn new() -> Self {
        Self { combat: None }
    }

    /// The combat currently held, if any.
    #[must_use]
    pub const fn combat(&self) -> Option<CombatId> {
        self.combat
    }

    /// Check if bound to a combat.
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.combat.is_some()
    }

    /// Bind (or unbind) this binding.
    pub fn bind(&mut self, combat: Option<CombatId>) {
        self.combat = combat;
    }

    /// Follow a merge from `old` into `new`. Returns false if this binding
    /// was not on `old`.
    pub fn rebind(&mut self, old: CombatId, new: CombatId) -> bool {
        if self.combat != Some(old) {
            return false;
        }
        self.combat = Some(new);
        true
    }
}

/// Contract for effects bound to a combat's lifecycle.
///
/// When the combat ends the engine expires the effect; when it merges the
/// engine moves the subscription and rebinds. Variants only embed a
/// [`CombatBinding`] and expose it.
pub trait CombatLinked {
    /// The embedded binding.
    fn binding(&self) -> &CombatBinding;

    /// The embedded binding, mutably.
    fn binding_mut(&mut self) -> &mut CombatBinding;

    /// The combat currently held, if any.
    fn combat(&self) -> Option<CombatId> {
        self.binding().combat()
    }
}
