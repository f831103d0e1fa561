// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Push Hot Path Benchmarks
//!
//! Measures the per-marker cost of `push_start` / `push_end` against a sink that drops
//! everything, so only ring bookkeeping and label derivation are timed.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use devtrace_context::{ContextIdGenerator, DeviceContext, ManualClock, NullSink};
use devtrace_structures::{HardwareAddress, Marker, MarkerPhase};
use std::sync::Arc;

fn marker(name: &str, runtime_host_id: u64) -> Marker {
    Marker::new(
        HardwareAddress::new(0, 3, 4, 0),
        7,
        123_456,
        MarkerPhase::Start,
        runtime_host_id,
        "matmul",
        "brisc.cc",
        88,
        name,
        serde_json::Value::Null,
    )
}

fn bench_push(c: &mut Criterion) {
    let ids = ContextIdGenerator::new();
    let mut context =
        DeviceContext::create(&ids, Arc::new(NullSink), Arc::new(ManualClock::default()));
    context.populate(1, 0.0, 1.2).unwrap();

    let mut group = c.benchmark_group("push");
    group.bench_function("start_labelled", |b| {
        b.iter_batched(
            || marker("BRISC-FW", 42),
            |m| black_box(context.push_start(m)),
            BatchSize::SmallInput,
        )
    });
    group.bench_function("start_unlabelled", |b| {
        b.iter_batched(
            || marker("kernel-zone", 0),
            |m| black_box(context.push_start(m)),
            BatchSize::SmallInput,
        )
    });
    group.bench_function("end", |b| {
        b.iter_batched(
            || marker("BRISC-FW", 42),
            |m| black_box(context.push_end(m)),
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_push);
criterion_main!(benches);
