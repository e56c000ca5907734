//! Context handed to effect hooks.

use crate::core::{EffectError, EffectId, EntityId, GameTime, Ticks};
use crate::effects::Effect;

use super::engine::EffectEngine;
use super::events::EngineEvent;

/// Access to the engine from inside an effect's own hook.
///
/// While a hook runs, the effect is lent out of the engine: the hook gets
/// it as `&mut self` and the rest of the engine through this context.
/// Requests that target the running effect itself (removing it, for
/// example) are deferred until the hook returns.
pub struct EffectContext<'a> {
    engine: &'a mut EffectEngine,
    effect: EffectId,
    owner: EntityId,
}

impl<'a> EffectContext<'a> {
    pub(crate) fn new(engine: &'a mut EffectEngine, effect: EffectId, owner: EntityId) -> Self {
        Self {
            engine,
            effect,
            owner,
        }
    }

    /// The effect whose hook is running.
    #[must_use]
    pub fn effect(&self) -> EffectId {
        self.effect
    }

    /// Its owner.
    #[must_use]
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    /// Current logical time.
    #[must_use]
    pub fn now(&self) -> GameTime {
        self.engine.now()
    }

    /// Read access to the engine.
    #[must_use]
    pub fn engine(&self) -> &EffectEngine {
        &*self.engine
    }

    /// Write access to the engine.
    pub fn engine_mut(&mut self) -> &mut EffectEngine {
        &mut *self.engine
    }

    /// Schedule the running effect to fire again `duration` from now.
    pub fn schedule_self(&mut self, duration: Ticks) -> bool {
        self.engine.schedule(self.effect, duration)
    }

    /// Queue an outbound event.
    pub fn emit(&mut self, event: EngineEvent) {
        self.engine.emit(event);
    }

    /// Queue a message to the owner.
    pub fn message_owner(&mut self, text: impl Into<String>) {
        let owner = self.owner;
        self.engine.emit(EngineEvent::message(owner, text));
    }

    /// Attach a new effect to any entity.
    pub fn add_effect(
        &mut self,
        owner: EntityId,
        effect: Box<dyn Effect>,
    ) -> Result<EffectId, EffectError> {
        self.engine.add_effect(owner, effect)
    }

    /// Remove an effect, running its removal hook.
    pub fn remove_effect(&mut self, effect: EffectId) -> bool {
        self.engine.remove_effect(effect, true)
    }
}
