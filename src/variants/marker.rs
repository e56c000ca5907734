//! Named timed tags.
//!
//! A `Marker` is the simplest saving effect: a name, a description, an
//! optional condition and an optional message shown when it wears off.
//! Game logic uses markers for things like "wet", "recently fed" or
//! "already searched this room".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{EffectError, EntityId};
use crate::effects::{Effect, Expiry};
use crate::engine::EffectContext;
use crate::persistence::{EffectDefinition, LoadContext};
use crate::predicates::Condition;

/// A named tag with optional condition and expiry message.
///
/// ## Example
///
/// ```
/// use world_effects::core::{EntityId, EntityKind, Ticks};
/// use world_effects::engine::EffectEngine;
/// use world_effects::variants::Marker;
///
/// let mut engine = EffectEngine::default();
/// engine.spawn_entity(EntityId::new(1), EntityKind::Character);
///
/// let wet = Marker::new("wet", "Soaked to the bone.").with_expiry_message("You dry off.");
/// engine.add_effect_for(EntityId::new(1), Box::new(wet), Ticks::new(30)).unwrap();
///
/// assert!(engine.has_effect_of_type(EntityId::new(1), Marker::TYPE));
/// assert_eq!(engine.effects_of_type::<Marker>(EntityId::new(1))[0].name(), "wet");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    name: String,
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    condition: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expiry_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    applied_at: Option<DateTime<Utc>>,
}

impl Marker {
    /// Type discriminator.
    pub const TYPE: &'static str = "Marker";

    /// Create a marker.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            condition: None,
            expiry_message: None,
            applied_at: None,
        }
    }

    /// Only apply when `condition` holds.
    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Tell the owner `message` when the marker wears off.
    #[must_use]
    pub fn with_expiry_message(mut self, message: impl Into<String>) -> Self {
        self.expiry_message = Some(message.into());
        self
    }

    /// Record the wall-clock time the marker was applied.
    #[must_use]
    pub fn with_applied_at(mut self, at: DateTime<Utc>) -> Self {
        self.applied_at = Some(at);
        self
    }

    /// Marker name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// When the marker was applied, if recorded.
    #[must_use]
    pub fn applied_at(&self) -> Option<DateTime<Utc>> {
        self.applied_at
    }

    /// Registry factory.
    pub fn from_definition(
        definition: &EffectDefinition,
        _ctx: &LoadContext<'_>,
    ) -> Result<Box<dyn Effect>, EffectError> {
        let marker: Marker = definition.decode()?;
        Ok(Box::new(marker))
    }
}

impl Effect for Marker {
    fn effect_type(&self) -> &'static str {
        Self::TYPE
    }

    fn describe(&self, _viewer: Option<EntityId>) -> String {
        format!("{}: {}", self.name, self.description)
    }

    fn saving_effect(&self) -> bool {
        true
    }

    fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    fn on_expire(&mut self, ctx: &mut EffectContext<'_>) -> Result<Expiry, EffectError> {
        if let Some(message) = &self.expiry_message {
            ctx.message_owner(message.clone());
        }
        Ok(Expiry::Detach)
    }

    fn save_definition(&self) -> Option<serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(name = %self.name, error = %err, "marker failed to encode");
                None
            }
        }
    }
}
