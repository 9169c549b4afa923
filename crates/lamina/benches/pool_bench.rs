//! Benchmarks for thread pool scheduling.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use lamina::pool::ThreadPool;

fn bench_schedule_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_schedule");

    for threads in [1, 2, 4, 8] {
        let pool = ThreadPool::new(threads).expect("pool startup");
        group.bench_with_input(BenchmarkId::new("10k_tasks", threads), &threads, |b, _| {
            b.iter(|| {
                let counter = Arc::new(AtomicUsize::new(0));
                for _ in 0..10_000 {
                    let counter = Arc::clone(&counter);
                    pool.schedule(move || {
                        counter.fetch_add(1, Ordering::Relaxed);
                    });
                }
                pool.wait();
                black_box(counter.load(Ordering::Relaxed))
            });
        });
    }

    group.finish();
}

fn bench_scope_chunks(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_scope");
    let pool = ThreadPool::new(4).expect("pool startup");
    let mut data = vec![1.0f64; 1 << 20];

    for chunks in [4, 16, 64] {
        let chunk = data.len() / chunks;
        group.bench_with_input(BenchmarkId::new("scale", chunks), &chunks, |b, _| {
            b.iter(|| {
                pool.scope(|s| {
                    for part in data.chunks_mut(chunk) {
                        s.spawn(move || part.iter_mut().for_each(|v| *v *= 1.000_001));
                    }
                });
            });
        });
    }

    black_box(&data);
    group.finish();
}

fn bench_resize(c: &mut Criterion) {
    let pool = ThreadPool::new(1).expect("pool startup");
    c.bench_function("pool_resize_1_8_1", |b| {
        b.iter(|| {
            pool.resize(8).expect("grow");
            pool.resize(1).expect("shrink");
        });
    });
}

criterion_group!(benches, bench_schedule_throughput, bench_scope_chunks, bench_resize);

criterion_main!(benches);
