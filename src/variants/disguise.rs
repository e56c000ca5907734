//! Disguises.

use serde::{Deserialize, Serialize};

use crate::core::{EffectError, EntityId};
use crate::effects::{Capability, CapabilitySet, DescriptionOverride, Effect};
use crate::persistence::{EffectDefinition, LoadContext};
use crate::predicates::Condition;

/// Replaces how the owner looks to others.
///
/// By default the owner still sees through their own disguise; a custom
/// condition can widen that (say, to anyone with keen eyes).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disguise {
    short: String,
    full: String,
    fooled: Condition,
}

impl Disguise {
    /// Type discriminator.
    pub const TYPE: &'static str = "Disguise";

    /// Appear as `short` / `full` to everyone but the owner.
    pub fn new(short: impl Into<String>, full: impl Into<String>) -> Self {
        Self {
            short: short.into(),
            full: full.into(),
            fooled: Condition::TargetIsOwner.negate(),
        }
    }

    /// Only viewers matching `condition` are fooled.
    #[must_use]
    pub fn fooling(mut self, condition: Condition) -> Self {
        self.fooled = condition;
        self
    }

    /// Registry factory.
    pub fn from_definition(
        definition: &EffectDefinition,
        _ctx: &LoadContext<'_>,
    ) -> Result<Box<dyn Effect>, EffectError> {
        let disguise: Disguise = definition.decode()?;
        Ok(Box::new(disguise))
    }
}

impl DescriptionOverride for Disguise {
    fn short_description(&self, _viewer: Option<EntityId>) -> String {
        self.short.clone()
    }

    fn full_description(&self, _viewer: Option<EntityId>) -> String {
        self.full.clone()
    }
}

impl Effect for Disguise {
    fn effect_type(&self) -> &'static str {
        Self::TYPE
    }

    fn describe(&self, _viewer: Option<EntityId>) -> String {
        format!("Disguised as {}", self.short)
    }

    fn saving_effect(&self) -> bool {
        true
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of(&[Capability::OverridesDescription])
    }

    fn condition(&self) -> Option<&Condition> {
        Some(&self.fooled)
    }

    fn save_definition(&self) -> Option<serde_json::Value> {
        serde_json::to_value(self).ok()
    }

    fn description_override(&self) -> Option<&dyn DescriptionOverride> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::core::EntityKind;
    use crate::engine::EffectEngine;

    const SPY: EntityId = EntityId(1);
    const GUARD: EntityId = EntityId(2);

    fn setup() -> EffectEngine {
        let mut engine = EffectEngine::default();
        engine.spawn_entity(SPY, EntityKind::Character);
        engine.spawn_entity(GUARD, EntityKind::Character);
        engine
    }

    #[test]
    fn test_others_are_fooled() {
        let mut engine = setup();
        engine
            .add_effect(SPY, Box::new(Disguise::new("a baker", "A flour-dusted baker.")))
            .unwrap();

        assert_eq!(
            engine.description_override(SPY, Some(GUARD)),
            Some(("a baker".to_string(), "A flour-dusted baker.".to_string()))
        );
        assert_eq!(engine.description_override(SPY, Some(SPY)), None);
    }

    #[test]
    fn test_latest_disguise_wins() {
        let mut engine = setup();
        engine
            .add_effect(SPY, Box::new(Disguise::new("a baker", "A baker.")))
            .unwrap();
        engine
            .add_effect(SPY, Box::new(Disguise::new("a monk", "A quiet monk.")))
            .unwrap();

        let (short, _) = engine.description_override(SPY, Some(GUARD)).unwrap();
        assert_eq!(short, "a monk");
    }

    #[test]
    fn test_custom_condition() {
        let mut engine = setup();
        let disguise = Disguise::new("a shadow", "Just a shadow.").fooling(Condition::Never);
        engine.add_effect(SPY, Box::new(disguise)).unwrap();
        assert_eq!(engine.description_override(SPY, Some(GUARD)), None);
    }
}
