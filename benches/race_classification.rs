//! Benchmarks for race-wide classifications
//!
//! Every race query recomputes all stages, so these track how GC, points
//! and mountain ranking scale with the number of stages and riders.
//!
//! Platform: Cross-platform (generated fixtures, CI-safe)

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use peloton::test_utils::{RaceShape, build_race};
use std::hint::black_box;

fn bench_general_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("general_classification");

    for (stages, riders) in [(3, 50), (21, 50), (21, 180)] {
        let shape = RaceShape { stages, riders, sprints_per_stage: 2, spread_secs: 3600 };
        let fixture = build_race(shape).expect("fixture should build");
        let id = format!("{stages}x{riders}");

        group.bench_with_input(BenchmarkId::new("full", &id), &fixture, |b, fixture| {
            b.iter(|| black_box(fixture.portal.race_classification(black_box(fixture.race))))
        });

        group.bench_with_input(BenchmarkId::new("gc_rank", &id), &fixture, |b, fixture| {
            b.iter(|| {
                black_box(fixture.portal.riders_general_classification_rank(black_box(fixture.race)))
            })
        });
    }

    group.finish();
}

fn bench_secondary_rankings(c: &mut Criterion) {
    let shape = RaceShape { stages: 21, riders: 180, sprints_per_stage: 2, spread_secs: 3600 };
    let fixture = build_race(shape).expect("fixture should build");
    let classification =
        fixture.portal.race_classification(fixture.race).expect("race should classify");

    let mut group = c.benchmark_group("secondary_rankings");

    group.bench_function("points_rank", |b| {
        b.iter(|| black_box(black_box(&classification).points_rank()))
    });

    group.bench_function("mountain_rank", |b| {
        b.iter(|| black_box(black_box(&classification).mountain_rank()))
    });

    group.finish();
}

criterion_group!(benches, bench_general_classification, bench_secondary_rankings);
criterion_main!(benches);
