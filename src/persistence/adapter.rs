//! Saving and loading effects.

use chrono::Utc;

use crate::core::{EffectError, EntityId};
use crate::effects::EffectRegistry;
use crate::engine::EffectEngine;

use super::definition::{EffectDefinition, LoadReport, SavedEffects};

/// What a factory may consult while rebuilding an effect.
pub struct LoadContext<'a> {
    engine: &'a EffectEngine,
    owner: EntityId,
}

impl<'a> LoadContext<'a> {
    /// Create a context for loading onto `owner`.
    #[must_use]
    pub fn new(engine: &'a EffectEngine, owner: EntityId) -> Self {
        Self { engine, owner }
    }

    /// The owner being loaded.
    #[must_use]
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    /// The engine (read-only).
    #[must_use]
    pub fn engine(&self) -> &'a EffectEngine {
        self.engine
    }

    /// Resolve a persisted entity reference.
    ///
    /// Fails with `DanglingReference` if the entity no longer exists.
    pub fn resolve(&self, effect_type: &str, entity: EntityId) -> Result<EntityId, EffectError> {
        if self.engine.entity_exists(entity) {
            Ok(entity)
        } else {
            Err(EffectError::DanglingReference {
                effect_type: effect_type.to_string(),
                entity,
            })
        }
    }
}

/// Snapshot every saving effect on `owner`, in attachment order.
pub fn save_effects(engine: &EffectEngine, owner: EntityId) -> Result<SavedEffects, EffectError> {
    if !engine.entity_exists(owner) {
        return Err(EffectError::UnknownEntity(owner));
    }

    let mut saved = SavedEffects::new(owner, Utc::now());
    for &id in engine.effects_of(owner) {
        let Some(effect) = engine.effect(id) else {
            continue;
        };
        if !effect.saving_effect() {
            continue;
        }
        match effect.save_definition() {
            Some(payload) => saved.effects.push(
                EffectDefinition::new(effect.effect_type(), payload)
                    .with_remaining(engine.remaining(id)),
            ),
            None => tracing::warn!(
                effect = %id,
                effect_type = effect.effect_type(),
                "saving effect produced no definition"
            ),
        }
    }

    tracing::debug!(%owner, count = saved.len(), "saved effects");
    Ok(saved)
}

/// Rebuild saved effects onto their owner.
///
/// Unknown types, dangling references and malformed payloads skip that one
/// effect; the rest keep loading. Restored schedules resume from the
/// engine's current time.
pub fn load_effects(
    engine: &mut EffectEngine,
    registry: &EffectRegistry,
    saved: &SavedEffects,
) -> Result<LoadReport, EffectError> {
    let owner = saved.owner;
    if !engine.entity_exists(owner) {
        return Err(EffectError::UnknownEntity(owner));
    }

    let mut report = LoadReport::default();
    for definition in &saved.effects {
        let built = registry.reconstruct(definition, &LoadContext::new(engine, owner));
        match built {
            Ok(effect) => {
                let id = engine.add_effect(owner, effect)?;
                if let Some(remaining) = definition.remaining {
                    engine.schedule(id, remaining);
                }
                report.loaded.push(id);
            }
            Err(err) => {
                tracing::warn!(%owner, effect_type = %definition.effect_type, error = %err, "skipping saved effect");
                match err {
                    EffectError::UnknownEffectType(_) => report.skipped_unknown += 1,
                    EffectError::DanglingReference { .. } => report.skipped_dangling += 1,
                    _ => report.skipped_malformed += 1,
                }
            }
        }
    }

    tracing::debug!(
        %owner,
        loaded = report.loaded.len(),
        skipped = report.skipped(),
        "loaded effects"
    );
    Ok(report)
}

/// Snapshot every owner that has at least one saving effect.
#[must_use]
pub fn save_all(engine: &EffectEngine) -> Vec<SavedEffects> {
    engine
        .entity_ids()
        .into_iter()
        .filter_map(|owner| save_effects(engine, owner).ok())
        .filter(|saved| !saved.is_empty())
        .collect()
}

/// Load a batch of documents. Documents whose owner no longer exists are
/// counted as dangling.
pub fn load_all(
    engine: &mut EffectEngine,
    registry: &EffectRegistry,
    documents: &[SavedEffects],
) -> LoadReport {
    let mut report = LoadReport::default();
    for saved in documents {
        match load_effects(engine, registry, saved) {
            Ok(loaded) => report.merge(loaded),
            Err(err) => {
                tracing::warn!(owner = %saved.owner, error = %err, "skipping saved owner");
                report.skipped_dangling += saved.len();
            }
        }
    }
    report
}
