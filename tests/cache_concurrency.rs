// ==============================================
// CACHE CONCURRENCY TESTS (integration)
// ==============================================
//
// Multi-threaded behavior of the shared cache: parallel read-only lookups,
// writer/reader atomicity, callback accounting under contention, and
// invariant preservation across interleavings. These require real threads
// and cannot live inline.

#![cfg(feature = "concurrency")]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use tidecache::cache::Cache;
use tidecache::policy::EvictionPolicy;

// ==============================================
// Parallel Read-Only Lookups
// ==============================================

mod read_path {
    use super::*;

    #[test]
    fn fifo_lookups_and_len_run_concurrently() {
        let cache: Cache<u32, u64> = Cache::new(EvictionPolicy::Fifo, 900, 1000);
        for i in 0..500 {
            cache.insert(i, u64::from(i) * 3);
        }

        let readers = 8;
        let barrier = Arc::new(Barrier::new(readers + 1));
        let mut handles = Vec::new();

        for t in 0..readers {
            let cache = cache.clone();
            let barrier = Arc::clone(&barrier);
            handles.push(thread::spawn(move || {
                barrier.wait();
                for round in 0..2_000u32 {
                    let key = (round.wrapping_mul(7).wrapping_add(t as u32)) % 500;
                    let value = cache
                        .try_get_value(&key, false)
                        .expect("resident key must be found");
                    assert_eq!(*value, u64::from(key) * 3);
                }
            }));
        }

        let len_reader = {
            let cache = cache.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..2_000 {
                    assert_eq!(cache.len(), 500);
                }
            })
        };

        for handle in handles {
            handle.join().unwrap();
        }
        len_reader.join().unwrap();
    }

    #[test]
    fn lru_read_only_lookups_never_reorder() {
        let cache: Cache<u32, u32> = Cache::new(EvictionPolicy::Lru, 4, 5);
        for i in 0..5 {
            cache.insert(i, i);
        }

        let barrier = Arc::new(Barrier::new(4));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = cache.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for _ in 0..5_000 {
                        let _ = cache.try_get_value(&0, false);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // key 0 was only peeked, so it is still the next victim
        cache.insert(5, 5);
        assert!(!cache.contains(&0));
    }
}

// ==============================================
// Writers vs Readers
// ==============================================

mod write_read_interleaving {
    use super::*;

    #[test]
    fn readers_see_complete_states_only() {
        // each writer round inserts key 0 with a fresh even value, then
        // replaces it with value + 1; readers must never observe a value
        // from a torn update (anything not written by some round)
        let cache: Cache<u32, u64> = Cache::unbounded();
        cache.insert(0, 0);

        let rounds = 2_000u64;
        let writer = {
            let cache = cache.clone();
            thread::spawn(move || {
                for round in 1..=rounds {
                    cache.insert(0, round * 2);
                    cache.insert(0, round * 2 + 1);
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let cache = cache.clone();
                thread::spawn(move || {
                    for _ in 0..5_000 {
                        let value = *cache.try_get_value(&0, false).expect("key 0 never leaves");
                        assert!(value <= rounds * 2 + 1);
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(
            cache.try_get_value(&0, false).map(|v| *v),
            Some(rounds * 2 + 1)
        );
    }

    #[test]
    fn concurrent_writers_keep_structures_in_lockstep() {
        let cache: Cache<u64, u64> = Cache::new(EvictionPolicy::Lru, 64, 128);
        let writers = 4;
        let per_writer = 2_000u64;
        let barrier = Arc::new(Barrier::new(writers as usize));

        let handles: Vec<_> = (0..writers)
            .map(|w| {
                let cache = cache.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for i in 0..per_writer {
                        let key = w * per_writer + i;
                        cache.insert(key, key);
                        if i % 3 == 0 {
                            let _ = cache.get(&key);
                        }
                        if i % 7 == 0 {
                            cache.erase(&key);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(cache.check_invariants().is_ok());
        assert!(cache.len() < cache.high_watermark());
    }
}

// ==============================================
// Callback Accounting Under Contention
// ==============================================

mod callback_accounting {
    use super::*;

    #[test]
    fn every_departure_is_reported_exactly_once() {
        // distinct keys only, so there are no replacements: every key is
        // either still resident or was reported by the callback exactly once
        let cache: Cache<u64, u64> = Cache::new(EvictionPolicy::Fifo, 32, 64);
        let departures = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&departures);
        cache.set_post_eviction_callback(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        let writers = 4u64;
        let per_writer = 1_000u64;
        let barrier = Arc::new(Barrier::new(writers as usize));
        let handles: Vec<_> = (0..writers)
            .map(|w| {
                let cache = cache.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for i in 0..per_writer {
                        cache.insert(w * per_writer + i, i);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let inserted = (writers * per_writer) as usize;
        assert_eq!(cache.len() + departures.load(Ordering::Relaxed), inserted);
        assert!(cache.check_invariants().is_ok());
    }

    #[test]
    fn visitors_run_against_a_stable_snapshot() {
        let cache: Cache<u64, u64> = Cache::new(EvictionPolicy::Lru, 200, 400);
        for i in 0..300 {
            cache.insert(i, i);
        }

        let stop = Arc::new(AtomicUsize::new(0));
        let writer = {
            let cache = cache.clone();
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let mut key = 300u64;
                while stop.load(Ordering::Relaxed) == 0 {
                    cache.insert(key, key);
                    key += 1;
                }
            })
        };

        for _ in 0..50 {
            // the visitor holds the read lock for the whole walk, so each
            // resolved entry must be present and self-consistent
            let mut walked = 0usize;
            cache.visit(|key, value| {
                assert_eq!(*key, *value);
                walked += 1;
                true
            });
            assert!(walked <= cache.high_watermark());
        }
        stop.store(1, Ordering::Relaxed);
        writer.join().unwrap();
        assert!(cache.check_invariants().is_ok());
    }
}
