//! Scheduler and tick throughput benchmarks.
//!
//! Run with: `cargo bench`

#![allow(clippy::unwrap_used)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use world_effects::core::{EffectId, EntityId, EntityKind, GameTime, Ticks};
use world_effects::delay::CommandDelay;
use world_effects::engine::EffectEngine;
use world_effects::schedule::Scheduler;
use world_effects::variants::Marker;

fn bench_scheduler_add_and_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler");
    for count in [100u64, 1_000, 10_000] {
        group.throughput(Throughput::Elements(count));
        group.bench_with_input(BenchmarkId::new("add_and_drain", count), &count, |b, &count| {
            b.iter(|| {
                let mut scheduler = Scheduler::new();
                for i in 0..count {
                    scheduler.add(EffectId(i + 1), Ticks(i % 97));
                }
                scheduler.advance_to(GameTime(100));
                let due = scheduler.due_snapshot(GameTime(100));
                for key in due {
                    black_box(scheduler.consume(key));
                }
            });
        });
    }
    group.finish();
}

fn bench_reschedule_if_longer(c: &mut Criterion) {
    let mut scheduler = Scheduler::new();
    for i in 0..1_000u64 {
        scheduler.add(EffectId(i + 1), Ticks(50));
    }
    c.bench_function("scheduler/reschedule_if_longer", |b| {
        let mut i = 0u64;
        b.iter(|| {
            i = (i + 1) % 1_000;
            black_box(scheduler.reschedule_if_longer(EffectId(i + 1), Ticks(i % 100)));
        });
    });
}

fn bench_engine_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");
    for owners in [10u64, 100] {
        group.throughput(Throughput::Elements(owners * 10));
        group.bench_with_input(BenchmarkId::new("tick", owners), &owners, |b, &owners| {
            b.iter(|| {
                let mut engine = EffectEngine::default();
                for owner in 0..owners {
                    let id = EntityId(owner + 1);
                    engine.spawn_entity(id, EntityKind::Character);
                    for n in 0..5u64 {
                        let marker = Marker::new(format!("m{n}"), "tag");
                        engine.add_effect_for(id, Box::new(marker), Ticks(n + 1)).unwrap();
                        let delay = CommandDelay::new(["move"], "busy");
                        engine.add_effect_for(id, Box::new(delay), Ticks(n + 2)).unwrap();
                    }
                }
                for t in 1..=7 {
                    black_box(engine.tick(GameTime(t)));
                }
                black_box(engine.drain_events().len())
            });
        });
    }
    group.finish();
}

fn bench_blocking_query(c: &mut Criterion) {
    let mut engine = EffectEngine::default();
    let actor = EntityId(1);
    engine.spawn_entity(actor, EntityKind::Character);
    for n in 0..20u64 {
        engine
            .add_effect(actor, Box::new(Marker::new(format!("m{n}"), "tag")))
            .unwrap();
    }
    engine
        .add_effect(actor, Box::new(CommandDelay::new(["move", "flee"], "recovering")))
        .unwrap();

    c.bench_function("engine/blocking_reason", |b| {
        b.iter(|| black_box(engine.blocking_reason(actor, black_box("FLEE"))));
    });
}

criterion_group!(
    benches,
    bench_scheduler_add_and_drain,
    bench_reschedule_if_longer,
    bench_engine_tick,
    bench_blocking_query
);
criterion_main!(benches);
