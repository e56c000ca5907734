//! Outbound engine events.
//!
//! The engine never calls into the host directly. Anything the host may
//! want to react to (show a message, re-enable a command, update a UI) is
//! queued as an [`EngineEvent`] and drained with
//! `EffectEngine::drain_events`.

use serde::{Deserialize, Serialize};

use crate::core::{EffectId, EntityId};

/// Why an effect left the Active state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalReason {
    /// Its scheduled timeout elapsed.
    Expired,
    /// Removed by game logic.
    Explicit,
    /// Its parent effect was removed.
    Cascade,
    /// Its owner was destroyed.
    OwnerDestroyed,
    /// Its owner moved.
    OwnerMoved,
    /// The combat it was bound to ended.
    CombatEnded,
    /// Its owner left combat.
    LeftCombat,
    /// Its owner was replaced by a morphed copy.
    Morphed,
    /// Its expire hook failed.
    HookFailed,
}

/// Something the host may want to react to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// An effect was attached.
    EffectAdded {
        /// The new effect.
        effect: EffectId,
        /// Its owner.
        owner: EntityId,
        /// Its type discriminator.
        effect_type: String,
    },

    /// An effect's expire hook ran and the effect is leaving.
    EffectExpired {
        /// The effect.
        effect: EffectId,
        /// Its owner.
        owner: EntityId,
        /// Its type discriminator.
        effect_type: String,
    },

    /// An effect's expire hook ran and kept it active.
    EffectRetained {
        /// The effect.
        effect: EffectId,
        /// Its owner.
        owner: EntityId,
        /// Its type discriminator.
        effect_type: String,
    },

    /// An effect detached.
    EffectRemoved {
        /// The effect.
        effect: EffectId,
        /// Its former owner.
        owner: EntityId,
        /// Its type discriminator.
        effect_type: String,
        /// Why it left.
        reason: RemovalReason,
    },

    /// A command delay finished; the listed commands are unblocked.
    DelayExpired {
        /// The delay effect.
        effect: EffectId,
        /// The actor that was delayed.
        owner: EntityId,
        /// Commands that were blocked.
        commands: Vec<String>,
    },

    /// One stage of a multi-stage action ran.
    StageCompleted {
        /// The staged action effect.
        effect: EffectId,
        /// The acting entity.
        owner: EntityId,
        /// Stages completed so far (1-based).
        stage: u32,
    },

    /// Text to show an entity.
    Message {
        /// Recipient.
        to: EntityId,
        /// Message body.
        text: String,
    },
}

impl EngineEvent {
    /// Create a message event.
    pub fn message(to: EntityId, text: impl Into<String>) -> Self {
        Self::Message {
            to,
            text: text.into(),
        }
    }

    /// The entity the event concerns.
    #[must_use]
    pub fn entity(&self) -> EntityId {
        match self {
            Self::EffectAdded { owner, .. }
            | Self::EffectExpired { owner, .. }
            | Self::EffectRetained { owner, .. }
            | Self::EffectRemoved { owner, .. }
            | Self::DelayExpired { owner, .. }
            | Self::StageCompleted { owner, .. } => *owner,
            Self::Message { to, .. } => *to,
        }
    }

    /// The effect the event concerns, if any.
    #[must_use]
    pub fn effect(&self) -> Option<EffectId> {
        match self {
            Self::EffectAdded { effect, .. }
            | Self::EffectExpired { effect, .. }
            | Self::EffectRetained { effect, .. }
            | Self::EffectRemoved { effect, .. }
            | Self::DelayExpired { effect, .. }
            | Self::StageCompleted { effect, .. } => Some(*effect),
            Self::Message { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let event = EngineEvent::DelayExpired {
            effect: EffectId(3),
            owner: EntityId(1),
            commands: vec!["move".into()],
        };
        assert_eq!(event.entity(), EntityId(1));
        assert_eq!(event.effect(), Some(EffectId(3)));

        let msg = EngineEvent::message(EntityId(2), "You feel better.");
        assert_eq!(msg.entity(), EntityId(2));
        assert_eq!(msg.effect(), None);
    }

    #[test]
    fn test_serialization() {
        let event = EngineEvent::EffectRemoved {
            effect: EffectId(9),
            owner: EntityId(4),
            effect_type: "Marker".into(),
            reason: RemovalReason::Cascade,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: EngineEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
