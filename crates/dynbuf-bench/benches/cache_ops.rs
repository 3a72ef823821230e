//! Criterion micro-benchmarks for cache updates and snapshots.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use dynbuf_bench::channel_stream;
use dynbuf_cache::LastKnownValueCache;

const CHANNELS: u32 = 1024;

fn bench_update_stream(c: &mut Criterion) {
    let stream = channel_stream(42, CHANNELS, 100_000);
    let mut cache = LastKnownValueCache::new(CHANNELS as usize, f64::NAN).unwrap();
    c.bench_function("cache_update_100k", |b| {
        b.iter(|| {
            for &(ch, v) in &stream {
                cache.update(ch, v).unwrap();
            }
            black_box(cache.sequences().len())
        });
    });
}

fn bench_snapshot_copy(c: &mut Criterion) {
    let mut cache = LastKnownValueCache::new(CHANNELS as usize, f64::NAN).unwrap();
    for &(ch, v) in &channel_stream(7, CHANNELS, 4096) {
        cache.update(ch, v).unwrap();
    }
    c.bench_function("cache_snapshot_1024", |b| {
        b.iter(|| black_box(cache.snapshot()));
    });

    let mut out = vec![0.0f64; CHANNELS as usize];
    c.bench_function("cache_snapshot_into_1024", |b| {
        b.iter(|| black_box(cache.snapshot_into(&mut out).unwrap()));
    });
}

criterion_group!(benches, bench_update_stream, bench_snapshot_copy);
criterion_main!(benches);
