//! Effect type registry.
//!
//! Maps each variant's stable type discriminator to the factory that
//! rebuilds it from a persisted definition. Hosts build one registry at
//! startup, registering every saving variant exactly once, and hand it to
//! the persistence adapter when loading.

use rustc_hash::FxHashMap;

use crate::core::EffectError;
use crate::persistence::{EffectDefinition, LoadContext};

use super::effect::Effect;

/// Rebuilds an effect from its persisted definition.
pub type EffectFactory =
    fn(&EffectDefinition, &LoadContext<'_>) -> Result<Box<dyn Effect>, EffectError>;

/// Registry of effect factories.
///
/// ## Example
///
/// ```
/// use world_effects::core::EffectError;
/// use world_effects::effects::EffectRegistry;
/// use world_effects::variants::Marker;
///
/// let mut registry = EffectRegistry::new();
/// registry.register(Marker::TYPE, Marker::from_definition).unwrap();
///
/// let again = registry.register(Marker::TYPE, Marker::from_definition);
/// assert!(matches!(again, Err(EffectError::DuplicateRegistration(_))));
/// ```
#[derive(Clone, Debug, Default)]
pub struct EffectRegistry {
    factories: FxHashMap<String, EffectFactory>,
}

impl EffectRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a type name to its factory.
    ///
    /// Fails if the name is already bound; the existing binding is kept.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: EffectFactory,
    ) -> Result<(), EffectError> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(EffectError::DuplicateRegistration(name));
        }
        tracing::debug!(effect_type = %name, "registered effect factory");
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Rebuild an effect from its definition.
    pub fn reconstruct(
        &self,
        definition: &EffectDefinition,
        ctx: &LoadContext<'_>,
    ) -> Result<Box<dyn Effect>, EffectError> {
        let factory = self
            .factories
            .get(&definition.effect_type)
            .ok_or_else(|| EffectError::UnknownEffectType(definition.effect_type.clone()))?;

        let effect = factory(definition, ctx)?;
        if effect.effect_type() != definition.effect_type {
            tracing::warn!(
                registered = %definition.effect_type,
                built = effect.effect_type(),
                "factory built an effect of a different type"
            );
        }
        Ok(effect)
    }

    /// Check if a type name is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered type names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Get the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Drop every binding. Intended for test isolation.
    pub fn clear(&mut self) {
        self.factories.clear();
    }
}
