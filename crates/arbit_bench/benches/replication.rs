//! Replicated bit vector benchmarks.

use arbit_bench::utils::random_positions;
use arbit_bits::{BitVector, PagedBitVector};
use arbit_core::{Arbit, Config, InMemoryBackend};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tempfile::TempDir;

const LENGTH: u64 = 1 << 24;
const OPS: usize = 10_000;

/// Benchmark the in-memory vector alone, as a baseline.
fn bench_bits_only(c: &mut Criterion) {
    let mut group = c.benchmark_group("bits_only");
    group.throughput(Throughput::Elements(OPS as u64));

    let bits = PagedBitVector::with_length(LENGTH);
    let positions = random_positions(OPS, LENGTH);

    group.bench_function("flip", |b| {
        b.iter(|| {
            for &pos in &positions {
                black_box(bits.flip(pos));
            }
        });
    });

    group.bench_function("get", |b| {
        b.iter(|| {
            for &pos in &positions {
                black_box(bits.get(pos));
            }
        });
    });

    group.finish();
}

/// Benchmark replicated mutations against an in-memory log.
fn bench_replicated_memory(c: &mut Criterion) {
    let mut group = c.benchmark_group("replicated_memory");
    group.throughput(Throughput::Elements(OPS as u64));

    for capacity in [1024usize, 1 << 16].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            capacity,
            |b, &capacity| {
                let config = Config::new().queue_capacity(capacity);
                let bits =
                    Arbit::with_backend(LENGTH, Box::new(InMemoryBackend::new()), config).unwrap();
                let positions = random_positions(OPS, LENGTH);

                b.iter(|| {
                    for &pos in &positions {
                        black_box(bits.flip(pos));
                    }
                });
                bits.close().unwrap();
            },
        );
    }

    group.finish();
}

/// Benchmark replicated mutations against a file log.
fn bench_replicated_file(c: &mut Criterion) {
    let mut group = c.benchmark_group("replicated_file");
    group.sample_size(20);
    group.throughput(Throughput::Elements(OPS as u64));

    for sync in [false, true].iter() {
        group.bench_with_input(BenchmarkId::new("sync", sync), sync, |b, &sync| {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("bench.log");
            let config = Config::new().queue_capacity(1 << 16).sync_on_flush(sync);
            let bits = Arbit::open_with_config(LENGTH, &path, config).unwrap();
            let positions = random_positions(OPS, LENGTH);

            b.iter(|| {
                for &pos in &positions {
                    black_box(bits.set(pos));
                }
            });
            bits.close().unwrap();
        });
    }

    group.finish();
}

/// Benchmark open, one mutation, close.
fn bench_open_close(c: &mut Criterion) {
    let mut group = c.benchmark_group("open_close");
    group.sample_size(20);

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bench.log");

    group.bench_function("file", |b| {
        b.iter(|| {
            let config = Config::new().queue_capacity(1024);
            let bits = Arbit::open_with_config(1024, &path, config).unwrap();
            bits.set(1);
            bits.close().unwrap();
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_bits_only,
    bench_replicated_memory,
    bench_replicated_file,
    bench_open_close,
);

criterion_main!(benches);
