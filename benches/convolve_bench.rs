//! Benchmarks for the strided block-reduction engine.
//!
//! Run with: `cargo bench --bench convolve_bench`
//!
//! Compares coarsening factors and batch depths on model-sized fields.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::{Array2, ArrayD, Dimension, IxDyn};

use croco_prep::convolve2d;

/// Generate a smooth synthetic field with the given shape.
fn generate_field(shape: &[usize]) -> ArrayD<f64> {
    ArrayD::from_shape_fn(IxDyn(shape), |ix| {
        let i = ix[ix.ndim() - 2] as f64;
        let j = ix[ix.ndim() - 1] as f64;
        (0.1 * i).sin() + (0.07 * j).cos()
    })
}

fn bench_factors(c: &mut Criterion) {
    let mut group = c.benchmark_group("convolve2d_factor");
    let data = generate_field(&[258, 514]);

    for &n in &[2usize, 4, 8] {
        let kernel = Array2::from_elem((n, n), 1.0 / (n * n) as f64);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| convolve2d(black_box(data.view()), black_box(&kernel), (n, n)).unwrap());
        });
    }
    group.finish();
}

fn bench_batch_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("convolve2d_batch");
    let kernel = Array2::from_elem((4, 4), 1.0 / 16.0);

    for &depth in &[1usize, 8, 32] {
        let data = generate_field(&[depth, 130, 258]);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            b.iter(|| convolve2d(black_box(data.view()), black_box(&kernel), (4, 4)).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_factors, bench_batch_depth);
criterion_main!(benches);
