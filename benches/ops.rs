//! Micro-operation benchmarks for the cache engine.
//!
//! Run with: `cargo bench --bench ops`
//!
//! Measures per-operation latency for lookups and inserts under both
//! policies, plus the watermark-burst insert path.

use std::hint::black_box;
use std::time::Instant;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use tidecache::cache::{Cache, CacheCore};
use tidecache::policy::EvictionPolicy;

const RESIDENT: usize = 16_384;
const OPS: u64 = 100_000;

fn resident_core(policy: EvictionPolicy) -> CacheCore<u64, u64> {
    let mut cache = CacheCore::new(policy, RESIDENT, RESIDENT * 2);
    for i in 0..RESIDENT as u64 {
        cache.insert(i, i);
    }
    cache
}

// ============================================================================
// Lookup Hit Latency
// ============================================================================

fn bench_lookup_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup_hit_ns");
    group.throughput(Throughput::Elements(OPS));

    group.bench_function("lru_get", |b| {
        b.iter_custom(|iters| {
            let mut cache = resident_core(EvictionPolicy::Lru);
            let start = Instant::now();
            for _ in 0..iters {
                for i in 0..OPS {
                    black_box(cache.get(&(i % RESIDENT as u64)));
                }
            }
            start.elapsed()
        })
    });

    group.bench_function("lru_peek", |b| {
        b.iter_custom(|iters| {
            let cache = resident_core(EvictionPolicy::Lru);
            let start = Instant::now();
            for _ in 0..iters {
                for i in 0..OPS {
                    black_box(cache.peek(&(i % RESIDENT as u64)));
                }
            }
            start.elapsed()
        })
    });

    group.bench_function("fifo_get", |b| {
        b.iter_custom(|iters| {
            let mut cache = resident_core(EvictionPolicy::Fifo);
            let start = Instant::now();
            for _ in 0..iters {
                for i in 0..OPS {
                    black_box(cache.get(&(i % RESIDENT as u64)));
                }
            }
            start.elapsed()
        })
    });

    group.finish();
}

// ============================================================================
// Insert Latency
// ============================================================================

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_ns");
    group.throughput(Throughput::Elements(OPS));

    group.bench_function("new_keys_unbounded", |b| {
        b.iter_custom(|iters| {
            let mut total = std::time::Duration::ZERO;
            for _ in 0..iters {
                let mut cache: CacheCore<u64, u64> = CacheCore::unbounded();
                let start = Instant::now();
                for i in 0..OPS {
                    cache.insert(black_box(i), i);
                }
                total += start.elapsed();
            }
            total
        })
    });

    group.bench_function("replacements", |b| {
        b.iter_custom(|iters| {
            let mut cache = resident_core(EvictionPolicy::Lru);
            let start = Instant::now();
            for _ in 0..iters {
                for i in 0..OPS {
                    cache.insert(black_box(i % RESIDENT as u64), i);
                }
            }
            start.elapsed()
        })
    });

    group.bench_function("with_watermark_bursts", |b| {
        b.iter_custom(|iters| {
            let mut total = std::time::Duration::ZERO;
            for _ in 0..iters {
                let mut cache: CacheCore<u64, u64> =
                    CacheCore::new(EvictionPolicy::Fifo, RESIDENT / 2, RESIDENT);
                let start = Instant::now();
                for i in 0..OPS {
                    cache.insert(black_box(i), i);
                }
                total += start.elapsed();
            }
            total
        })
    });

    group.finish();
}

// ============================================================================
// Concurrent Read Throughput
// ============================================================================

fn bench_concurrent_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_read_ns");
    group.throughput(Throughput::Elements(OPS));

    group.bench_function("read_locked_peeks_4_threads", |b| {
        b.iter_custom(|iters| {
            let cache: Cache<u64, u64> = Cache::new(EvictionPolicy::Fifo, RESIDENT, RESIDENT * 2);
            for i in 0..RESIDENT as u64 {
                cache.insert(i, i);
            }

            let start = Instant::now();
            for _ in 0..iters {
                let threads: Vec<_> = (0..4)
                    .map(|t| {
                        let cache = cache.clone();
                        std::thread::spawn(move || {
                            for i in 0..OPS / 4 {
                                let key = (i * 4 + t) % RESIDENT as u64;
                                black_box(cache.try_get_value(&key, false));
                            }
                        })
                    })
                    .collect();
                for handle in threads {
                    handle.join().unwrap();
                }
            }
            start.elapsed()
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_lookup_hit,
    bench_insert,
    bench_concurrent_reads
);
criterion_main!(benches);
