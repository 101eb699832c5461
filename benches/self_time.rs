/// Self-time pipeline benchmarks
///
/// Measures EventStore → SelfTimeCalculator → flatten over synthetic build
/// profiles with nested actions, for both nesting strategies.
use buildprof::ingest::compute_records;
use buildprof::self_time::NestingStrategy;
use buildprof::trace_event::TraceEvent;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Build `actions` parent events per thread, each preceded by two children
fn synthetic_profile(threads: i64, actions: i64) -> Vec<TraceEvent> {
    let mut events = Vec::new();
    for tid in 0..threads {
        for i in 0..actions {
            let ts = i * 1_000;
            events.push(TraceEvent::complete("Compiling", "action", ts + 10, 200, tid));
            events.push(TraceEvent::complete("Linking", "action", ts + 300, 400, tid));
            events.push(TraceEvent::complete(
                &format!("Action {}", i % 50),
                "action processing",
                ts,
                900,
                tid,
            ));
        }
    }
    events
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("self_time_pipeline");

    for actions in [100i64, 500, 1_000] {
        let events = synthetic_profile(4, actions);
        group.throughput(Throughput::Elements(events.len() as u64));

        for strategy in [NestingStrategy::ArrivalOrder, NestingStrategy::StartTimeStack] {
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", strategy), actions),
                &events,
                |b, events| {
                    b.iter(|| {
                        let records = compute_records(black_box(events.clone()), strategy)
                            .expect("synthetic profile is well formed");
                        black_box(records)
                    })
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
