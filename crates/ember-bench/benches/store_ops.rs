//! Criterion benchmarks for store creation, synchronization and full runs.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use ember_bench::{bench_config, reference_dims};
use ember_core::GridDims;
use ember_engine::{simulate, Controller};
use ember_store::{DurabilityMode, Store};
use ember_test_utils::ScratchDir;

/// Create, map and size a fresh 512x512 store.
fn bench_store_create(c: &mut Criterion) {
    let dir = ScratchDir::new();
    let dims = reference_dims();
    let mut n = 0u64;

    c.bench_function("store_create_512", |b| {
        b.iter(|| {
            let path = dir.store_path(&format!("create-{n}.ember"));
            n += 1;
            let store = Store::create(&path, dims, DurabilityMode::ForceMsync).unwrap();
            black_box(store.len());
            drop(store);
            std::fs::remove_file(&path).unwrap();
        });
    });
}

/// One step followed by a whole-store synchronization on 512x512.
fn bench_step_then_synchronize(c: &mut Criterion) {
    let dir = ScratchDir::new();
    let dims = reference_dims();
    let controller = Controller::new(&bench_config(1), dims).unwrap();
    let mut store = Store::create(
        dir.store_path("sync.ember"),
        dims,
        DurabilityMode::ForceMsync,
    )
    .unwrap();
    controller.prepare(&mut store).unwrap();

    c.bench_function("step_then_synchronize_512", |b| {
        b.iter(|| {
            let mut arena = store.arena().unwrap();
            controller.step(&mut arena);
            drop(arena);
            store.synchronize_all().unwrap();
        });
    });
}

/// End to end: create, seed, 100 steps, release.
fn bench_simulate_small(c: &mut Criterion) {
    let dir = ScratchDir::new();
    let dims = GridDims::new(128, 128).unwrap();
    let config = bench_config(2);
    let mut n = 0u64;

    c.bench_function("simulate_128_x100", |b| {
        b.iter(|| {
            let path = dir.store_path(&format!("run-{n}.ember"));
            n += 1;
            let summary = simulate(&path, dims, 100, &config).unwrap();
            black_box(summary.residual);
            std::fs::remove_file(&path).unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_store_create,
    bench_step_then_synchronize,
    bench_simulate_small
);
criterion_main!(benches);
