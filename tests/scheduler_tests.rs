//! Scheduling tests.
//!
//! These tests verify timed expiry through the engine:
//! - Deterministic firing order (due time, then insertion order)
//! - Reschedule-if-longer never shortens a timer
//! - Reentrant hooks and the per-tick snapshot
//! - Clock rewind handling

use proptest::prelude::*;

use world_effects::core::{EffectError, EffectId, EngineConfig, EntityId, EntityKind, GameTime, Ticks};
use world_effects::effects::{Effect, Expiry};
use world_effects::engine::{EffectContext, EffectEngine, EngineEvent};
use world_effects::schedule::Scheduler;
use world_effects::variants::Marker;

const HERO: EntityId = EntityId(1);

/// Attaches a follow-up effect that is already due when it fires.
struct Spawner;

impl Effect for Spawner {
    fn effect_type(&self) -> &'static str {
        "Spawner"
    }

    fn describe(&self, _viewer: Option<EntityId>) -> String {
        "spawner".to_string()
    }

    fn on_expire(&mut self, ctx: &mut EffectContext<'_>) -> Result<Expiry, EffectError> {
        let follow_up = Marker::new("echo", "An echo.").with_expiry_message("echo fades");
        let owner = ctx.owner();
        let id = ctx.add_effect(owner, Box::new(follow_up))?;
        ctx.engine_mut().schedule(id, Ticks::ZERO);
        Ok(Expiry::Detach)
    }
}

fn setup() -> EffectEngine {
    let mut engine = EffectEngine::default();
    engine.spawn_entity(HERO, EntityKind::Character);
    engine
}

fn timed_marker(engine: &mut EffectEngine, message: &str, duration: u64) -> EffectId {
    let marker = Marker::new(message, "tag").with_expiry_message(message);
    engine.add_effect_for(HERO, Box::new(marker), Ticks(duration)).unwrap()
}

fn messages(engine: &mut EffectEngine) -> Vec<String> {
    engine
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            EngineEvent::Message { text, .. } => Some(text),
            _ => None,
        })
        .collect()
}

// =============================================================================
// Ordering
// =============================================================================

/// Entries due at the same time fire in insertion order.
#[test]
fn test_ties_fire_in_insertion_order() {
    let mut engine = setup();
    timed_marker(&mut engine, "first", 10);
    timed_marker(&mut engine, "second", 10);

    assert_eq!(engine.tick(GameTime(10)), 2);
    assert_eq!(messages(&mut engine), vec!["first", "second"]);
}

/// Earlier due times fire first regardless of insertion order.
#[test]
fn test_due_order() {
    let mut engine = setup();
    timed_marker(&mut engine, "late", 8);
    timed_marker(&mut engine, "early", 3);
    timed_marker(&mut engine, "never", 30);

    assert_eq!(engine.tick(GameTime(10)), 2);
    assert_eq!(messages(&mut engine), vec!["early", "late"]);
    assert_eq!(engine.scheduler().len(), 1);
}

/// Restarting a timer moves the entry behind others due at the same time.
#[test]
fn test_restart_timer() {
    let mut engine = setup();
    let a = timed_marker(&mut engine, "a", 5);
    timed_marker(&mut engine, "b", 5);

    assert!(engine.schedule(a, Ticks(5)));
    engine.tick(GameTime(5));
    assert_eq!(messages(&mut engine), vec!["b", "a"]);
}

// =============================================================================
// Reschedule If Longer
// =============================================================================

/// Stacking a shorter duration keeps the longer timer; a longer one wins.
#[test]
fn test_reschedule_if_longer_scenario() {
    let mut engine = setup();
    let id = timed_marker(&mut engine, "buff", 10);

    assert!(!engine.reschedule_if_longer(id, Ticks(5)));
    assert_eq!(engine.remaining(id), Some(Ticks(10)));

    assert!(engine.reschedule_if_longer(id, Ticks(20)));
    assert_eq!(engine.remaining(id), Some(Ticks(20)));
}

/// Detached effects cannot be scheduled.
#[test]
fn test_schedule_detached_is_noop() {
    let mut engine = setup();
    let id = timed_marker(&mut engine, "gone", 10);
    engine.remove_effect(id, true);

    assert!(!engine.schedule(id, Ticks(5)));
    assert!(!engine.reschedule_if_longer(id, Ticks(50)));
    assert!(!engine.cancel_schedule(id));
    assert_eq!(engine.due_time(id), None);
}

// =============================================================================
// Reentrancy
// =============================================================================

/// An effect attached during a tick waits for the next tick, even if due.
#[test]
fn test_added_during_tick_waits() {
    let mut engine = setup();
    engine.add_effect_for(HERO, Box::new(Spawner), Ticks(10)).unwrap();

    assert_eq!(engine.tick(GameTime(10)), 1);
    assert!(engine.has_effect_of_type(HERO, Marker::TYPE));
    assert!(messages(&mut engine).is_empty());

    assert_eq!(engine.tick(GameTime(10)), 1);
    assert!(!engine.has_effect_of_type(HERO, Marker::TYPE));
    assert_eq!(messages(&mut engine), vec!["echo fades"]);
}

/// A removed effect that was due in the same tick does not fire.
#[test]
fn test_cancelled_entry_skipped() {
    let mut engine = setup();
    let a = timed_marker(&mut engine, "a", 5);
    let b = timed_marker(&mut engine, "b", 5);
    engine.remove_effect(b, false);

    assert_eq!(engine.tick(GameTime(5)), 1);
    assert_eq!(messages(&mut engine), vec!["a"]);
    assert!(!engine.is_active(a));
}

// =============================================================================
// Clock
// =============================================================================

/// A rewinding tick is ignored.
#[test]
fn test_clock_rewind_rejected() {
    let mut engine = setup();
    engine.tick(GameTime(10));
    let id = timed_marker(&mut engine, "late", 5);
    assert_eq!(engine.due_time(id), Some(GameTime(15)));

    assert_eq!(engine.tick(GameTime(4)), 0);
    assert_eq!(engine.now(), GameTime(10));
}

/// With rewind allowed the clock stays put and nothing early fires.
#[test]
fn test_clock_rewind_allowed() {
    let mut engine = EffectEngine::new(EngineConfig::default().allow_clock_rewind());
    engine.spawn_entity(HERO, EntityKind::Character);
    engine.tick(GameTime(10));
    timed_marker(&mut engine, "late", 5);

    assert_eq!(engine.tick(GameTime(4)), 0);
    assert_eq!(engine.now(), GameTime(10));
    assert_eq!(engine.advance(Ticks(5)), 1);
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    /// Reschedule-if-longer never decreases the time left.
    #[test]
    fn prop_reschedule_never_shortens(first in 0u64..1_000, elapsed in 0u64..1_000, second in 0u64..1_000) {
        let mut scheduler = Scheduler::new();
        let effect = EffectId(1);
        scheduler.add(effect, Ticks(first));
        scheduler.advance_to(GameTime(elapsed.min(first)));

        let before = scheduler.remaining(effect).unwrap();
        scheduler.reschedule_if_longer(effect, Ticks(second));
        let after = scheduler.remaining(effect).unwrap();

        prop_assert!(after >= before);
        prop_assert_eq!(after, before.max(Ticks(second)));
    }

    /// A tick fires entries by due time, then by insertion order.
    #[test]
    fn prop_tick_order(durations in prop::collection::vec(0u64..20, 1..30)) {
        let mut engine = setup();
        for (i, d) in durations.iter().enumerate() {
            timed_marker(&mut engine, &i.to_string(), *d);
        }

        let fired = engine.tick(GameTime(20));
        prop_assert_eq!(fired, durations.len());

        let mut expected: Vec<_> = (0..durations.len()).collect();
        expected.sort_by_key(|i| durations[*i]);
        let expected: Vec<String> = expected.iter().map(ToString::to_string).collect();
        prop_assert_eq!(messages(&mut engine), expected);
    }
}
