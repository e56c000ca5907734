//! "Saw a hidden entity" memory.

use serde::{Deserialize, Serialize};

use crate::core::{EffectError, EntityId, Ticks};
use crate::effects::{Effect, Expiry, Target};
use crate::engine::EffectContext;
use crate::persistence::{EffectDefinition, LoadContext};

/// The owner has spotted a hidden entity and keeps track of it.
///
/// Each time its timer runs out the watcher checks whether the watched
/// entity is still in the same place as the owner. If it is, the memory
/// re-arms for another `rearm` ticks, with no limit on how often. Once
/// the entity leaves (or no longer exists) the memory fades.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watching {
    watched: EntityId,
    rearm: Ticks,
}

impl Watching {
    /// Type discriminator.
    pub const TYPE: &'static str = "Watching";

    /// Default time between checks.
    pub const DEFAULT_REARM: Ticks = Ticks(60);

    /// Watch `watched`, re-checking every [`Self::DEFAULT_REARM`] ticks.
    #[must_use]
    pub fn new(watched: EntityId) -> Self {
        Self {
            watched,
            rearm: Self::DEFAULT_REARM,
        }
    }

    /// Re-check every `rearm` ticks.
    #[must_use]
    pub fn with_rearm(mut self, rearm: Ticks) -> Self {
        self.rearm = rearm;
        self
    }

    /// The watched entity.
    #[must_use]
    pub fn watched(&self) -> EntityId {
        self.watched
    }

    /// Time between checks.
    #[must_use]
    pub fn rearm(&self) -> Ticks {
        self.rearm
    }

    /// Registry factory. The watched entity must still exist.
    pub fn from_definition(
        definition: &EffectDefinition,
        ctx: &LoadContext<'_>,
    ) -> Result<Box<dyn Effect>, EffectError> {
        let watching: Watching = definition.decode()?;
        ctx.resolve(Self::TYPE, watching.watched)?;
        Ok(Box::new(watching))
    }
}

impl Effect for Watching {
    fn effect_type(&self) -> &'static str {
        Self::TYPE
    }

    fn describe(&self, _viewer: Option<EntityId>) -> String {
        format!("Watching {} (re-checks every {})", self.watched, self.rearm)
    }

    fn saving_effect(&self) -> bool {
        true
    }

    fn applies_to(&self, target: &Target<'_>) -> bool {
        target.entity() == Some(self.watched)
    }

    fn on_expire(&mut self, ctx: &mut EffectContext<'_>) -> Result<Expiry, EffectError> {
        let engine = ctx.engine();
        let here = engine.location_of(ctx.owner());
        let still_here = engine.entity_exists(self.watched)
            && here.is_some()
            && engine.location_of(self.watched) == here;

        if still_here {
            tracing::trace!(owner = %ctx.owner(), watched = %self.watched, "still watching");
            ctx.schedule_self(self.rearm);
            return Ok(Expiry::Retain);
        }
        Ok(Expiry::Detach)
    }

    fn save_definition(&self) -> Option<serde_json::Value> {
        serde_json::to_value(self).ok()
    }
}
