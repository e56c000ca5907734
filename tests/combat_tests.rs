//! Combat-linked effect tests.
//!
//! These tests verify the combat notification flow:
//! - Combat end expires bound effects and unsubscribes them
//! - Combat merges rebind effects the game never touches directly
//! - Leaving combat removes combat-end cleanup effects

use world_effects::core::{CombatId, EntityId, EntityKind};
use world_effects::effects::{Capability, Lifecycle};
use world_effects::engine::{EffectEngine, EngineEvent, RemovalReason};
use world_effects::variants::{CombatStance, Marker, Sneaking};
use world_effects::CombatLinked;

const KNIGHT: EntityId = EntityId(1);
const ORC: EntityId = EntityId(2);
const FIGHT_A: CombatId = CombatId(10);
const FIGHT_B: CombatId = CombatId(20);

fn setup() -> EffectEngine {
    let mut engine = EffectEngine::default();
    engine.spawn_entity(KNIGHT, EntityKind::Character);
    engine.spawn_entity(ORC, EntityKind::Character);
    engine.enter_combat(KNIGHT, FIGHT_A).unwrap();
    engine.enter_combat(ORC, FIGHT_B).unwrap();
    engine
}

// =============================================================================
// Combat End
// =============================================================================

/// Ending a combat expires its bound effects and leaves no subscription.
#[test]
fn test_combat_end_expires_and_unsubscribes() {
    let mut engine = setup();
    let stance = engine
        .add_effect(KNIGHT, Box::new(CombatStance::new("defensive")))
        .unwrap();
    assert_eq!(engine.combats().subscribers(FIGHT_A), vec![stance]);
    engine.drain_events();

    assert_eq!(engine.end_combat(FIGHT_A), 1);
    assert_eq!(engine.lifecycle(stance), Lifecycle::Detached);
    assert!(!engine.combats().is_subscribed(stance));
    assert_eq!(engine.combat_of(KNIGHT), None);

    let events = engine.drain_events();
    assert!(events.contains(&EngineEvent::message(KNIGHT, "You relax your defensive stance.")));
    assert!(events.iter().any(|e| matches!(
        e,
        EngineEvent::EffectRemoved { reason: RemovalReason::CombatEnded, .. }
    )));

    // A second notification finds nobody listening.
    assert_eq!(engine.end_combat(FIGHT_A), 0);
    assert!(engine.drain_events().is_empty());
}

/// Ending one combat leaves effects bound to another alone.
#[test]
fn test_other_combats_unaffected() {
    let mut engine = setup();
    let knight = engine.add_effect(KNIGHT, Box::new(CombatStance::new("defensive"))).unwrap();
    let orc = engine.add_effect(ORC, Box::new(CombatStance::new("berserk"))).unwrap();

    engine.end_combat(FIGHT_B);
    assert!(engine.is_active(knight));
    assert!(!engine.is_active(orc));
}

/// Participants lose their combat-end cleanup effects when the fight ends.
#[test]
fn test_combat_end_cleans_participants() {
    let mut engine = setup();
    let sneak = engine.add_effect(KNIGHT, Box::new(Sneaking::new(10))).unwrap();
    let marker = engine.add_effect(KNIGHT, Box::new(Marker::new("bruised", "Sore."))).unwrap();

    engine.end_combat(FIGHT_A);
    assert!(!engine.is_active(sneak));
    assert!(engine.is_active(marker));
}

// =============================================================================
// Combat Merge
// =============================================================================

/// A merge moves the subscription and rebinds the effect.
#[test]
fn test_merge_rebinds() {
    let mut engine = setup();
    let stance = engine
        .add_effect(KNIGHT, Box::new(CombatStance::new("defensive")))
        .unwrap();

    assert_eq!(engine.merge_combat(FIGHT_A, FIGHT_B), 1);
    assert_eq!(engine.get::<CombatStance>(stance).unwrap().combat(), Some(FIGHT_B));
    assert_eq!(engine.combats().subscription_of(stance), Some(FIGHT_B));
    assert_eq!(engine.combat_of(KNIGHT), Some(FIGHT_B));

    // The obsolete combat no longer reaches the effect.
    assert_eq!(engine.end_combat(FIGHT_A), 0);
    assert!(engine.is_active(stance));

    assert_eq!(engine.end_combat(FIGHT_B), 1);
    assert!(!engine.is_active(stance));
}

/// Effects attached outside combat are never subscribed.
#[test]
fn test_no_combat_no_subscription() {
    let mut engine = EffectEngine::default();
    engine.spawn_entity(KNIGHT, EntityKind::Character);
    let stance = engine.add_effect(KNIGHT, Box::new(CombatStance::new("ready"))).unwrap();

    assert!(!engine.combats().is_subscribed(stance));
    assert_eq!(engine.end_combat(FIGHT_A), 0);
    assert!(engine.is_active(stance));
}

// =============================================================================
// Leaving Combat
// =============================================================================

/// Leaving a fight removes cleanup effects and their subscriptions.
#[test]
fn test_leave_combat() {
    let mut engine = setup();
    let stance = engine
        .add_effect(KNIGHT, Box::new(CombatStance::new("defensive")))
        .unwrap();
    engine.drain_events();

    assert_eq!(engine.leave_combat(KNIGHT).unwrap(), 1);
    assert!(!engine.is_active(stance));
    assert!(!engine.combats().is_subscribed(stance));
    assert!(engine.drain_events().iter().any(|e| matches!(
        e,
        EngineEvent::EffectRemoved { reason: RemovalReason::LeftCombat, .. }
    )));

    assert_eq!(engine.leave_combat(KNIGHT).unwrap(), 0);
}

/// Explicit removal also drops the subscription.
#[test]
fn test_removal_unsubscribes() {
    let mut engine = setup();
    let stance = engine
        .add_effect(KNIGHT, Box::new(CombatStance::new("defensive")))
        .unwrap();
    assert_eq!(engine.effects_with(KNIGHT, Capability::CombatLinked), vec![stance]);

    engine.remove_effect(stance, false);
    assert_eq!(engine.combats().subscriber_count(FIGHT_A), 0);
}

/// Switching combats leaves the old one first.
#[test]
fn test_switch_combat() {
    let mut engine = setup();
    let stance = engine
        .add_effect(KNIGHT, Box::new(CombatStance::new("defensive")))
        .unwrap();

    engine.enter_combat(KNIGHT, FIGHT_B).unwrap();
    assert!(!engine.is_active(stance));
    assert_eq!(engine.combat_of(KNIGHT), Some(FIGHT_B));
}
