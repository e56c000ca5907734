//! Error types.
//!
//! Only [`EffectError::DuplicateRegistration`] is meant to be fatal, and only
//! at startup. Every other variant is recoverable: the engine and the
//! persistence adapter log it and carry on with the remaining effects.

use thiserror::Error;

use super::entity::{EffectId, EntityId};

/// Errors raised by the effect engine.
#[derive(Debug, Error)]
pub enum EffectError {
    /// Two variants claim the same type discriminator.
    #[error("effect type `{0}` is already registered")]
    DuplicateRegistration(String),

    /// No factory is bound to a persisted type discriminator.
    #[error("unknown effect type `{0}`")]
    UnknownEffectType(String),

    /// A persisted payload refers to an entity that no longer exists.
    #[error("effect `{effect_type}` references missing {entity}")]
    DanglingReference {
        /// Type of the effect being reconstructed.
        effect_type: String,
        /// The entity that failed to resolve.
        entity: EntityId,
    },

    /// An external applicability predicate failed to evaluate.
    #[error("predicate `{name}` failed: {reason}")]
    PredicateEvaluationFailure {
        /// Predicate name.
        name: String,
        /// Evaluator message.
        reason: String,
    },

    /// A persisted payload does not match the variant's shape.
    #[error("malformed definition for `{effect_type}`: {source}")]
    MalformedDefinition {
        /// Type of the effect being reconstructed.
        effect_type: String,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// The owner entity is not known to the engine.
    #[error("unknown owner {0}")]
    UnknownEntity(EntityId),

    /// An effect hook reported a failure.
    #[error("hook failed on {effect}: {reason}")]
    Hook {
        /// The effect whose hook failed.
        effect: EffectId,
        /// Hook message.
        reason: String,
    },

    /// Engine configuration could not be parsed.
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),

    /// A saved effect document could not be encoded or decoded.
    #[error("saved effects could not be encoded: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl EffectError {
    /// Whether this error is only acceptable to surface at startup.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::DuplicateRegistration(_))
    }
}
