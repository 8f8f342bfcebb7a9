//! Basic loading cache usage.
//!
//! Run with `RUST_LOG=loadcache=debug cargo run --example basic_loading`.

use std::collections::HashMap;
use std::io;

use loadcache::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), LoadError<io::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let table: HashMap<u32, &'static str> =
        [(1, "alice"), (2, "bob"), (3, "carol")].into_iter().collect();

    let cache = LoadingCache::builder(2)
        .on_evicted(|id: &u32, name: &String| println!("evicted {id} -> {name}"))
        .build(move |id: &u32| Ok::<_, io::Error>(table.get(id).map(|name| name.to_string())));

    println!("1 -> {}", cache.get(&1)?);
    println!("2 -> {}", cache.get(&2)?);
    println!("1 -> {} (cached)", cache.get(&1)?);
    println!("3 -> {}", cache.get(&3)?);

    match cache.get(&42) {
        Ok(name) => println!("42 -> {name}"),
        Err(err) => println!("42 -> error: {err}"),
    }

    println!("cached keys: {}", cache.len());
    cache.clear();
    Ok(())
}
