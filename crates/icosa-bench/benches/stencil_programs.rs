//! Criterion benchmarks for the diffusion stencil programs.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use icosa_bench::{default_programs, diffusion_bindings, reference_torus, Torus};
use icosa_engine::Program;
use icosa_mesh::Domain;
use icosa_stencils::DiffusionStencil;

const LEVELS: usize = 65;

/// Each stencil over its default band on the 64×64 torus.
fn bench_default_bands(c: &mut Criterion) {
    let mesh = reference_torus();
    let provider = mesh.provider().unwrap();
    let mut group = c.benchmark_group("diffusion_default_band");
    for (stencil, program) in default_programs::<f64>().unwrap() {
        let mut bindings = diffusion_bindings(stencil, mesh, LEVELS, 42).unwrap();
        group.bench_function(stencil.name(), |b| {
            b.iter(|| {
                let metrics = program.run(&mut bindings, &provider).unwrap();
                black_box(&metrics);
            });
        });
    }
    group.finish();
}

/// Stencil 13 over the whole mesh at increasing resolution.
fn bench_theta_gradient_scaling(c: &mut Criterion) {
    let program: Program<f64> = DiffusionStencil::ThetaGradient
        .program_over(Domain::full())
        .unwrap();
    let mut group = c.benchmark_group("theta_gradient_full");
    for n in [16, 32, 64, 128] {
        let mesh = Torus { nx: n, ny: n };
        let provider = mesh.provider().unwrap();
        let mut bindings =
            diffusion_bindings(DiffusionStencil::ThetaGradient, mesh, LEVELS, 7).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(mesh.edges()), &n, |b, _| {
            b.iter(|| {
                program.run(&mut bindings, &provider).unwrap();
                black_box(bindings.field("z_nabla2_e"));
            });
        });
    }
    group.finish();
}

/// Up-front checks alone: an empty band still validates every binding.
fn bench_validation_overhead(c: &mut Criterion) {
    let mesh = reference_torus();
    let provider = mesh.provider().unwrap();
    let program = DiffusionStencil::CellDivergence
        .program_over::<f64>(Domain::full().across(0..0))
        .unwrap();
    let mut bindings =
        diffusion_bindings(DiffusionStencil::CellDivergence, mesh, LEVELS, 3).unwrap();

    c.bench_function("validation_overhead", |b| {
        b.iter(|| {
            let metrics = program.run(&mut bindings, &provider).unwrap();
            black_box(metrics.validation_us);
        });
    });
}

criterion_group!(
    benches,
    bench_default_bands,
    bench_theta_gradient_scaling,
    bench_validation_overhead
);
criterion_main!(benches);
