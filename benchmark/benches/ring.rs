// SPDX-License-Identifier: Apache-2.0

//! Broadcast ring microbenchmarks.
//!
//! Measures push, consume, and reservation cost at several record
//! sizes, plus push throughput under producer contention.

use std::sync::Arc;
use std::time::{Duration, Instant};

use criterion::measurement::WallTime;
use criterion::{
    black_box, criterion_group, criterion_main, BenchmarkGroup, BenchmarkId, Criterion, Throughput,
};

use shmbus_benchmark::ScopedKey;
use shmbus_core::Ring;

/// Slot count for every benchmark ring. Producers lap freely; the
/// benchmarks never read behind themselves.
const SLOTS: u64 = 1024;

fn push_for_size<const N: usize>(group: &mut BenchmarkGroup<'_, WallTime>) {
    group.throughput(Throughput::Bytes(N as u64));

    group.bench_with_input(BenchmarkId::from_parameter(N), &N, |b, _| {
        let scoped = ScopedKey::fresh();
        let ring: Ring<[u8; N]> = Ring::attach(scoped.key(), SLOTS);
        let payload = [0xABu8; N];

        b.iter(|| {
            black_box(ring.push(black_box(&payload)));
        });
    });
}

/// Benchmark record publication at various record sizes.
fn bench_ring_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_push");
    group.measurement_time(Duration::from_secs(5));

    push_for_size::<8>(&mut group);
    push_for_size::<64>(&mut group);
    push_for_size::<256>(&mut group);
    push_for_size::<1024>(&mut group);

    group.finish();
}

/// Benchmark a full publish-consume cycle through the shared segment.
fn bench_ring_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_roundtrip");
    group.measurement_time(Duration::from_secs(5));
    group.throughput(Throughput::Bytes(64 * 2)); // push + copy out

    group.bench_function("push_try_next_64", |b| {
        let scoped = ScopedKey::fresh();
        let mut ring: Ring<[u8; 64]> = Ring::attach(scoped.key(), SLOTS);
        let payload = [0xABu8; 64];

        b.iter(|| {
            ring.push(black_box(&payload));
            black_box(ring.try_next());
        });
    });

    group.finish();
}

/// Benchmark in-place slot filling against push's copy-in.
fn bench_ring_reserve_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_reserve_commit");
    group.measurement_time(Duration::from_secs(5));
    group.throughput(Throughput::Bytes(1024));

    group.bench_function("fill_in_place_1024", |b| {
        let scoped = ScopedKey::fresh();
        let ring: Ring<[u8; 1024]> = Ring::attach(scoped.key(), SLOTS);

        b.iter(|| {
            let mut slot = ring.reserve();
            slot[0] = 0xAB;
            slot[1023] = 0xCD;
            black_box(slot.commit());
        });
    });

    group.finish();
}

/// Benchmark push throughput with four producers contending on the
/// tail counter.
fn bench_ring_contended_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_contended_push");
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("4_producers_64", |b| {
        let scoped = ScopedKey::fresh();
        let ring: Arc<Ring<[u8; 64]>> = Arc::new(Ring::attach(scoped.key(), SLOTS));
        let payload = [0xABu8; 64];

        b.iter_custom(|iters| {
            let start = Instant::now();
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let ring = Arc::clone(&ring);
                    std::thread::spawn(move || {
                        for _ in 0..iters {
                            ring.push(black_box(&payload));
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().expect("producer thread panicked");
            }
            start.elapsed()
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_ring_push,
    bench_ring_roundtrip,
    bench_ring_reserve_commit,
    bench_ring_contended_push,
);

criterion_main!(benches);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benchmark_setup_can_run() {
        // Just verify the setup works
        let scoped = ScopedKey::fresh();
        let mut ring: Ring<[u8; 64]> = Ring::attach(scoped.key(), 16);
        let payload = [0x5Au8; 64];

        let seq = ring.push(&payload);
        assert_eq!(seq, 0);
        let (seq, value) = ring.try_next().expect("record should be ready");
        assert_eq!(seq, 0);
        assert_eq!(value, payload);
    }
}
