use criterion::{black_box, criterion_group, criterion_main, Criterion};
use edit_core::history::History;

fn history_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("history_operations");

    group.bench_function("insert_100_sequential", |b| {
        b.iter_batched(
            || History::new(0),
            |mut history| {
                for i in 0..100 {
                    black_box(history.insert(i, b"x").unwrap());
                }
                history
            },
            criterion::BatchSize::SmallInput,
        )
    });

    group.bench_function("undo_redo_50_of_100", |b| {
        b.iter_batched(
            || {
                let mut h = History::new(0);
                for i in 0..100 {
                    h.insert(i, b"x").unwrap();
                }
                h
            },
            |mut history| {
                for _ in 0..50 {
                    black_box(history.undo().unwrap());
                }
                for _ in 0..50 {
                    black_box(history.redo().unwrap());
                }
            },
            criterion::BatchSize::SmallInput,
        )
    });

    group.bench_function("undo_replay_deep", |b| {
        b.iter_batched(
            || {
                let mut h = History::new(100_000);
                for i in 0..1000 {
                    h.insert((i * 37) % 99_000, b"yy").unwrap();
                }
                h
            },
            |mut history| {
                black_box(history.undo().unwrap());
            },
            criterion::BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, history_operations);
criterion_main!(benches);
