//! Persistence tests.
//!
//! These tests verify save and reload of saving effects:
//! - Round trip preserves descriptions, capabilities and schedules
//! - Unknown types, dangling references and malformed payloads are skipped
//! - Non-saving effects are left out

use serde_json::json;

use world_effects::core::{EffectError, EntityId, EntityKind, GameTime, Ticks};
use world_effects::delay::CommandDelay;
use world_effects::effects::EffectRegistry;
use world_effects::engine::EffectEngine;
use world_effects::persistence::{
    load_all, load_effects, save_all, save_effects, EffectDefinition, SavedEffects,
};
use world_effects::variants::{register_builtin, Disguise, Enchantment, Marker, Watching};

const HERO: EntityId = EntityId(1);
const ROOM: EntityId = EntityId(2);
const COIN: EntityId = EntityId(3);
const RING: EntityId = EntityId(4);

fn world() -> EffectEngine {
    let mut engine = EffectEngine::default();
    engine.spawn_entity(HERO, EntityKind::Character);
    engine.spawn_entity(ROOM, EntityKind::Location);
    engine.spawn_entity(COIN, EntityKind::Item);
    engine.spawn_entity(RING, EntityKind::Item);
    engine
}

fn registry() -> EffectRegistry {
    let mut registry = EffectRegistry::new();
    register_builtin(&mut registry).unwrap();
    registry
}

fn populated() -> EffectEngine {
    let mut engine = world();
    engine
        .add_effect_for(HERO, Box::new(Marker::new("wet", "Soaked.")), Ticks(30))
        .unwrap();
    engine
        .add_effect(HERO, Box::new(CommandDelay::new(["move"], "recovering")))
        .unwrap();
    engine
        .add_effect_for(HERO, Box::new(Watching::new(COIN)), Ticks(60))
        .unwrap();
    engine
        .add_effect(HERO, Box::new(Disguise::new("a baker", "A flour-dusted baker.")))
        .unwrap();
    engine
        .add_effect(RING, Box::new(Enchantment::new("Glow", RING, 1)))
        .unwrap();
    engine
}

fn summary(engine: &EffectEngine, owner: EntityId) -> Vec<(String, String)> {
    engine
        .effects_of(owner)
        .iter()
        .map(|id| {
            let effect = engine.effect(*id).unwrap();
            (effect.describe(None), format!("{:?}", effect.capabilities()))
        })
        .collect()
}

// =============================================================================
// Round Trip
// =============================================================================

/// Saving effects survive save, encode, decode and load onto a fresh world.
#[test]
fn test_round_trip() {
    let mut engine = populated();
    engine.tick(GameTime(10));

    let saved = save_effects(&engine, HERO).unwrap();
    assert_eq!(saved.len(), 3);
    assert_eq!(saved.effects[0].remaining, Some(Ticks(20)));
    assert_eq!(saved.effects[1].effect_type, Watching::TYPE);
    assert_eq!(saved.effects[2].remaining, None);

    let json = saved.to_json().unwrap();
    let decoded = SavedEffects::from_json(&json).unwrap();

    let mut fresh = world();
    let report = load_effects(&mut fresh, &registry(), &decoded).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.loaded.len(), 3);

    let saving_only: Vec<_> = summary(&engine, HERO)
        .into_iter()
        .filter(|(text, _)| !text.starts_with("Delayed"))
        .collect();
    assert_eq!(summary(&fresh, HERO), saving_only);
    assert_eq!(fresh.remaining(report.loaded[0]), Some(Ticks(20)));
    assert_eq!(fresh.remaining(report.loaded[1]), Some(Ticks(50)));
}

/// Equal state encodes to identical bytes.
#[test]
fn test_stable_encoding() {
    let engine = populated();
    let first = save_effects(&engine, HERO).unwrap();
    let mut second = save_effects(&engine, HERO).unwrap();
    second.saved_at = first.saved_at;

    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

/// Every owner with saving effects gets a document.
#[test]
fn test_save_all_and_load_all() {
    let engine = populated();
    let documents = save_all(&engine);
    let owners: Vec<_> = documents.iter().map(|d| d.owner).collect();
    assert_eq!(owners, vec![HERO, RING]);

    let mut fresh = world();
    let report = load_all(&mut fresh, &registry(), &documents);
    assert_eq!(report.loaded.len(), 4);
    assert!(fresh.has_effect_of_type(RING, Enchantment::TYPE));
}

// =============================================================================
// Recoverable Failures
// =============================================================================

/// An unknown type skips that one effect; the rest still load.
#[test]
fn test_unknown_type_skipped() {
    let engine = populated();
    let mut saved = save_effects(&engine, HERO).unwrap();
    saved
        .effects
        .insert(1, EffectDefinition::new("Ghost", json!({ "boo": true })));

    let mut fresh = world();
    let report = load_effects(&mut fresh, &registry(), &saved).unwrap();
    assert_eq!(report.skipped_unknown, 1);
    assert_eq!(report.loaded.len(), 3);
}

/// A reference to a deleted entity yields no effect rather than an error.
#[test]
fn test_dangling_reference_skipped() {
    let engine = populated();
    let saved = save_effects(&engine, HERO).unwrap();

    let mut fresh = world();
    fresh.despawn_entity(COIN);
    let report = load_effects(&mut fresh, &registry(), &saved).unwrap();

    assert_eq!(report.skipped_dangling, 1);
    assert_eq!(report.loaded.len(), 2);
    assert!(!fresh.has_effect_of_type(HERO, Watching::TYPE));
}

/// A payload of the wrong shape is skipped.
#[test]
fn test_malformed_payload_skipped() {
    let mut saved = SavedEffects::new(HERO, chrono::Utc::now());
    saved
        .effects
        .push(EffectDefinition::new(Marker::TYPE, json!({ "name": 12 })));
    saved.effects.push(EffectDefinition::new(
        Marker::TYPE,
        json!({ "name": "dry", "description": "Finally dry." }),
    ));

    let mut fresh = world();
    let report = load_effects(&mut fresh, &registry(), &saved).unwrap();
    assert_eq!(report.skipped_malformed, 1);
    assert_eq!(report.loaded.len(), 1);
}

/// Loading onto an owner that does not exist is an error for that owner.
#[test]
fn test_unknown_owner() {
    let saved = SavedEffects::new(EntityId(404), chrono::Utc::now());
    let mut fresh = world();
    let err = load_effects(&mut fresh, &registry(), &saved).unwrap_err();
    assert!(matches!(err, EffectError::UnknownEntity(id) if id == EntityId(404)));
    assert!(save_effects(&fresh, EntityId(404)).is_err());
}

/// Non-saving effects never appear in a document.
#[test]
fn test_non_saving_left_out() {
    let mut engine = world();
    engine
        .add_effect(HERO, Box::new(CommandDelay::new(["move"], "recovering")))
        .unwrap();
    assert!(save_effects(&engine, HERO).unwrap().is_empty());
    assert!(save_all(&engine).is_empty());
}
