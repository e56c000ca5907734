//! Item enchantments.

use serde::{Deserialize, Serialize};

use crate::core::{EffectError, EntityId};
use crate::effects::{Effect, Target};
use crate::persistence::{EffectDefinition, LoadContext};

/// A lasting enchantment on an item.
///
/// Follows the item when it is replaced in place (reforged, upgraded):
/// the engine asks for a copy bound to the new item and carries the
/// remaining duration over.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enchantment {
    name: String,
    item: EntityId,
    power: u32,
}

impl Enchantment {
    /// Type discriminator.
    pub const TYPE: &'static str = "Enchantment";

    /// Enchant `item`.
    pub fn new(name: impl Into<String>, item: EntityId, power: u32) -> Self {
        Self {
            name: name.into(),
            item,
            power,
        }
    }

    /// The enchanted item.
    #[must_use]
    pub fn item(&self) -> EntityId {
        self.item
    }

    /// Enchantment strength.
    #[must_use]
    pub fn power(&self) -> u32 {
        self.power
    }

    /// Registry factory. The enchanted item must still exist.
    pub fn from_definition(
        definition: &EffectDefinition,
        ctx: &LoadContext<'_>,
    ) -> Result<Box<dyn Effect>, EffectError> {
        let enchantment: Enchantment = definition.decode()?;
        ctx.resolve(Self::TYPE, enchantment.item)?;
        Ok(Box::new(enchantment))
    }
}

impl Effect for Enchantment {
    fn effect_type(&self) -> &'static str {
        Self::TYPE
    }

    fn describe(&self, _viewer: Option<EntityId>) -> String {
        format!("{} +{} on {}", self.name, self.power, self.item)
    }

    fn saving_effect(&self) -> bool {
        true
    }

    fn applies_to(&self, target: &Target<'_>) -> bool {
        matches!(target, Target::None) || target.entity() == Some(self.item)
    }

    fn save_definition(&self) -> Option<serde_json::Value> {
        serde_json::to_value(self).ok()
    }

    fn on_entity_morph(&self, old: EntityId, new: EntityId) -> Option<Box<dyn Effect>> {
        if self.item != old {
            return None;
        }
        Some(Box::new(Self {
            item: new,
            ..self.clone()
        }))
    }
}
