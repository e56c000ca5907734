//! Applicability predicates.
//!
//! Effects may carry an optional [`Condition`]. When present,
//! `EffectEngine::effect_applies` defers to it; when absent, the effect
//! applies to anything its own structural check accepts.
//!
//! Game-specific predicates are delegated to a host-supplied
//! [`PredicateEvaluator`]. Evaluation failures are never propagated: they
//! are logged and the predicate counts as false.
//!
//! ```
//! use world_effects::core::EntityId;
//! use world_effects::effects::Target;
//! use world_effects::predicates::{Condition, ConditionContext, ConditionEvaluator};
//!
//! let only_the_left_arm = Condition::TargetIs(EntityId(77));
//! let target = Target::Entity(EntityId(77));
//! let ctx = ConditionContext::new(EntityId(1), &target);
//!
//! assert!(ConditionEvaluator::evaluate(&only_the_left_arm, &ctx));
//! ```

mod condition;

pub use condition::{
    Condition, ConditionContext, ConditionEvaluator, PredicateCall, PredicateEvaluator,
};
