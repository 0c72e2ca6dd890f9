//! Criterion micro-benchmarks for single operator calls.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use icosa_bench::reference_torus;
use icosa_field::{Bindings, Field};
use icosa_operator::call;
use icosa_stencils::icon::{cell, edge, k};
use icosa_stencils::tutorial::{add, sum_adjacent_cells};
use icosa_test_utils::random_field;

/// `Σ_E2C cells` on every edge of the 64×64 torus.
fn bench_neighbor_sum_12k(c: &mut Criterion) {
    let mesh = reference_torus();
    let provider = mesh.provider().unwrap();
    let op = sum_adjacent_cells().unwrap();
    let mut bindings = Bindings::new()
        .with_field("cells", random_field([cell()], &[mesh.cells()], 1).unwrap())
        .with_field("edge_values", Field::<f64>::zeros([edge()], &[mesh.edges()]).unwrap());

    c.bench_function("neighbor_sum_12k", |b| {
        b.iter(|| {
            call::<f64>(&op, &mut bindings, "edge_values", &provider).unwrap();
            black_box(bindings.field("edge_values"));
        });
    });
}

/// Pointwise `a + b` on `[Cell, K]` with the same point count.
fn bench_pointwise_add(c: &mut Criterion) {
    let mesh = reference_torus();
    let provider = mesh.provider().unwrap();
    let op = add().unwrap();
    let shape = [mesh.cells(), 65];
    let mut bindings = Bindings::new()
        .with_field("a", random_field([cell(), k()], &shape, 2).unwrap())
        .with_field("b", random_field([cell(), k()], &shape, 3).unwrap())
        .with_field("out", Field::<f64>::zeros([cell(), k()], &shape).unwrap());

    c.bench_function("pointwise_add_532k", |b| {
        b.iter(|| {
            call::<f64>(&op, &mut bindings, "out", &provider).unwrap();
            black_box(bindings.field("out"));
        });
    });
}

criterion_group!(benches, bench_neighbor_sum_12k, bench_pointwise_add);
criterion_main!(benches);
