//! Applicability conditions.
//!
//! A [`Condition`] narrows when an effect's behavior applies to a specific
//! target. The engine provides structural conditions; anything
//! game-specific goes through [`Condition::External`], which is handed to
//! the host's [`PredicateEvaluator`].

use serde::{Deserialize, Serialize};

use crate::core::{EffectError, EntityId, EntityKind};
use crate::effects::Target;

/// A rule that must hold for an effect to apply to a target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    // === Target Matching ===

    /// Target must be a specific entity.
    TargetIs(EntityId),

    /// Target must be the entity that owns the effect.
    TargetIsOwner,

    /// Target must be an entity of the given kind.
    TargetKind(EntityKind),

    /// Target must be the named trait (case-insensitive).
    TraitIs(String),

    // === Combinators ===

    /// All conditions must be true.
    All(Vec<Condition>),

    /// At least one condition must be true.
    Any(Vec<Condition>),

    /// Condition must be false.
    Not(Box<Condition>),

    // === Special ===

    /// Always matches.
    Always,

    /// Never matches.
    Never,

    /// Evaluated by the host's predicate engine.
    External {
        /// Predicate name, as the host knows it.
        name: String,
        /// Opaque argument passed through unchanged.
        argument: String,
    },
}

impl Condition {
    /// Create an external predicate condition.
    pub fn external(name: impl Into<String>, argument: impl Into<String>) -> Self {
        Self::External {
            name: name.into(),
            argument: argument.into(),
        }
    }

    /// Create an AND condition.
    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::All(conditions.into_iter().collect())
    }

    /// Create an OR condition.
    pub fn any(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::Any(conditions.into_iter().collect())
    }

    /// Negate this condition.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Add another condition with AND.
    #[must_use]
    pub fn and(self, other: Condition) -> Self {
        match self {
            Self::All(mut conditions) => {
                conditions.push(other);
                Self::All(conditions)
            }
            _ => Self::All(vec![self, other]),
        }
    }

    /// Add another condition with OR.
    #[must_use]
    pub fn or(self, other: Condition) -> Self {
        match self {
            Self::Any(mut conditions) => {
                conditions.push(other);
                Self::Any(conditions)
            }
            _ => Self::Any(vec![self, other]),
        }
    }
}

/// Arguments handed to an external predicate.
#[derive(Clone, Copy, Debug)]
pub struct PredicateCall<'a> {
    /// Predicate name.
    pub name: &'a str,
    /// Opaque argument from the condition.
    pub argument: &'a str,
    /// Owner of the effect being checked.
    pub owner: EntityId,
    /// What the effect is being checked against.
    pub target: &'a Target<'a>,
}

/// The host's predicate engine.
///
/// Failures are reported as `Err` and treated as "does not apply".
pub trait PredicateEvaluator: Send {
    /// Evaluate a named predicate.
    fn execute(&self, call: &PredicateCall<'_>) -> Result<bool, String>;
}

impl<F> PredicateEvaluator for F
where
    F: Fn(&PredicateCall<'_>) -> Result<bool, String> + Send,
{
    fn execute(&self, call: &PredicateCall<'_>) -> Result<bool, String> {
        self(call)
    }
}

/// Context for evaluating conditions.
pub struct ConditionContext<'a> {
    /// Owner of the effect.
    pub owner: EntityId,
    /// What the effect is being checked against.
    pub target: &'a Target<'a>,
    /// Kind of the target entity, when the target is a known entity.
    pub target_kind: Option<EntityKind>,
    /// External predicate engine.
    pub evaluator: Option<&'a dyn PredicateEvaluator>,
}

impl<'a> ConditionContext<'a> {
    /// Create a new context.
    pub fn new(owner: EntityId, target: &'a Target<'a>) -> Self {
        Self {
            owner,
            target,
            target_kind: None,
            evaluator: None,
        }
    }

    /// Supply the target's entity kind.
    #[must_use]
    pub fn with_target_kind(mut self, kind: Option<EntityKind>) -> Self {
        self.target_kind = kind;
        self
    }

    /// Add an external predicate evaluator.
    #[must_use]
    pub fn with_evaluator(mut self, evaluator: &'a dyn PredicateEvaluator) -> Self {
        self.evaluator = Some(evaluator);
        self
    }
}

/// Evaluator for conditions.
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Check if a condition is satisfied.
    ///
    /// Fail-closed: external predicates that error, or that have no
    /// evaluator to run on, count as false.
    pub fn evaluate(condition: &Condition, ctx: &ConditionContext) -> bool {
        match condition {
            Condition::TargetIs(entity) => ctx.target.entity() == Some(*entity),

            Condition::TargetIsOwner => ctx.target.entity() == Some(ctx.owner),

            Condition::TargetKind(kind) => {
                ctx.target.entity().is_some() && ctx.target_kind == Some(*kind)
            }

            Condition::TraitIs(name) => ctx
                .target
                .trait_name()
                .is_some_and(|t| t.eq_ignore_ascii_case(name)),

            Condition::All(conditions) => conditions.iter().all(|c| Self::evaluate(c, ctx)),

            Condition::Any(conditions) => conditions.iter().any(|c| Self::evaluate(c, ctx)),

            Condition::Not(inner) => !Self::evaluate(inner, ctx),

            Condition::Always => true,

            Condition::Never => false,

            Condition::External { name, argument } => {
                let Some(evaluator) = ctx.evaluator else {
                    tracing::debug!(predicate = %name, "no predicate evaluator installed");
                    return false;
                };
                let call = PredicateCall {
                    name,
                    argument,
                    owner: ctx.owner,
                    target: ctx.target,
                };
                match evaluator.execute(&call) {
                    Ok(result) => result,
                    Err(reason) => {
                        let err = EffectError::PredicateEvaluationFailure {
                            name: name.clone(),
                            reason,
                        };
                        tracing::warn!(owner = %ctx.owner, error = %err, "treating predicate as false");
                        false
                    }
                }
            }
        }
    }
}
