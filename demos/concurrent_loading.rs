//! Many threads requesting the same slow key share one load.
//!
//! Run with `RUST_LOG=loadcache=debug cargo run --example concurrent_loading`.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use loadcache::LoadingCache;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_thread_names(true)
        .init();

    let loads = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&loads);
    let cache = Arc::new(LoadingCache::new(64, move |key: &String| {
        counter.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(250));
        Ok::<_, io::Error>(Some(key.to_uppercase()))
    }));

    let threads = 32;
    let barrier = Arc::new(Barrier::new(threads));
    let start = Instant::now();

    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            thread::Builder::new()
                .name(format!("worker-{i}"))
                .spawn(move || {
                    barrier.wait();
                    // Half the workers share one key, the rest use their own.
                    let key = if i % 2 == 0 {
                        "shared".to_string()
                    } else {
                        format!("key-{i}")
                    };
                    cache.get(&key).map(|value| value.len())
                })
        })
        .collect::<Result<_, _>>()
        .unwrap_or_else(|err| panic!("failed to spawn worker: {err}"));

    let ok = handles
        .into_iter()
        .filter_map(|handle| handle.join().ok())
        .filter(Result::is_ok)
        .count();

    println!(
        "{ok}/{threads} lookups succeeded with {} loads in {:?}",
        loads.load(Ordering::SeqCst),
        start.elapsed()
    );
}
