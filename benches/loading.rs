use std::hint::black_box;
use std::io;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use loadcache::LoadingCache;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const CAPACITY: usize = 1024;

fn identity_cache(capacity: usize) -> LoadingCache<u64, u64, io::Error> {
    LoadingCache::new(capacity, |k: &u64| Ok(Some(*k)))
}

fn warmed(capacity: usize) -> LoadingCache<u64, u64, io::Error> {
    let cache = identity_cache(capacity);
    for k in 0..capacity as u64 {
        let _ = cache.get(&k);
    }
    cache
}

fn bench_hit_path(c: &mut Criterion) {
    let cache = warmed(CAPACITY);
    let mut rng = StdRng::seed_from_u64(42);
    let keys: Vec<u64> = (0..4096).map(|_| rng.gen_range(0..CAPACITY as u64)).collect();

    c.bench_function("loading_get_hit", |b| {
        b.iter(|| {
            for k in &keys {
                let _ = black_box(cache.get(black_box(k)));
            }
        })
    });
}

fn bench_miss_churn(c: &mut Criterion) {
    c.bench_function("loading_get_miss_evict", |b| {
        b.iter_batched(
            || warmed(CAPACITY),
            |cache| {
                for k in 0..4096u64 {
                    let _ = black_box(cache.get(&black_box(10_000 + k)));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_remove_oldest_n(c: &mut Criterion) {
    c.bench_function("loading_remove_oldest_n", |b| {
        b.iter_batched(
            || warmed(CAPACITY),
            |cache| black_box(cache.remove_oldest_n(CAPACITY / 2)),
            BatchSize::SmallInput,
        )
    });
}

fn concurrent_hits(threads: usize, iters: u64) -> Duration {
    let cache = Arc::new(warmed(CAPACITY));
    let barrier = Arc::new(Barrier::new(threads + 1));

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(t as u64);
                barrier.wait();
                for _ in 0..iters {
                    let key = rng.gen_range(0..CAPACITY as u64);
                    let _ = black_box(cache.get(&key));
                }
            })
        })
        .collect();

    barrier.wait();
    let start = Instant::now();
    for handle in handles {
        let _ = handle.join();
    }
    start.elapsed()
}

fn bench_concurrent_hits(c: &mut Criterion) {
    let mut group = c.benchmark_group("loading_concurrent_hits");
    for threads in [2usize, 4, 8] {
        group.bench_function(format!("{threads}_threads"), |b| {
            b.iter_custom(|iters| concurrent_hits(threads, iters))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_hit_path,
    bench_miss_churn,
    bench_remove_oldest_n,
    bench_concurrent_hits
);
criterion_main!(benches);
