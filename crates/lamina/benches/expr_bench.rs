//! Benchmarks for sparse row vector times dense matrix.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::distributions::Uniform;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use lamina::linalg::random::{random_sparse_vector, random_symmetric, randomize_dense};
use lamina::linalg::smp;
use lamina::prelude::*;

/// Generates a sparse row vector with 10% fill and a dense matrix.
fn operands<SO: StorageOrder>(
    n: usize,
) -> (CompressedVector<f64, RowVector>, DynamicMatrix<f64, SO>) {
    let mut rng = ChaCha8Rng::seed_from_u64(n as u64);
    let dist = Uniform::new(-1.0, 1.0);
    let x = random_sparse_vector(n, n / 10, &mut rng, &dist);
    let mut a = DynamicMatrix::zeros(n, n);
    randomize_dense(&mut a, &mut rng, &dist);
    (x, a)
}

fn bench_storage_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("tsvec_dmat_mult");

    for n in [100, 400, 1000] {
        let (x, rm) = operands::<RowMajor>(n);
        let cm = DynamicMatrix::<f64, ColumnMajor>::from_expr(&rm);

        group.bench_with_input(BenchmarkId::new("row_major", n), &n, |b, _| {
            b.iter(|| black_box((&x * &rm).eval()));
        });
        group.bench_with_input(BenchmarkId::new("column_major", n), &n, |b, _| {
            b.iter(|| black_box((&x * &cm).eval()));
        });
    }

    group.finish();
}

fn bench_serial_vs_smp(c: &mut Criterion) {
    let mut group = c.benchmark_group("tsvec_dmat_mult_smp");
    group.sample_size(30);

    // Above the default parallel threshold
    let n = 40_000;
    let rows = 200;
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let dist = Uniform::new(-1.0, 1.0);
    let x: CompressedVector<f64, RowVector> = random_sparse_vector(rows, 20, &mut rng, &dist);
    let mut a = DynamicMatrix::<f64, ColumnMajor>::zeros(rows, n);
    randomize_dense(&mut a, &mut rng, &dist);

    group.bench_function("serial", |b| {
        b.iter(|| smp::serial_section(|| black_box((&x * &a).eval())));
    });
    group.bench_function("smp", |b| b.iter(|| black_box((&x * &a).eval())));

    group.finish();
}

fn bench_symmetric_routing(c: &mut Criterion) {
    let mut group = c.benchmark_group("symmetric_operand");

    let n = 500;
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let dist = Uniform::new(-1.0, 1.0);
    let sparse = random_symmetric::<f64, ColumnMajor, _, _>(n, 20 * n, &mut rng, &dist);
    let dense = SymmetricMatrix::<DynamicMatrix<f64, ColumnMajor>>::try_from_matrix(&sparse)
        .expect("symmetric source");
    let x: CompressedVector<f64, RowVector> = random_sparse_vector(n, n / 10, &mut rng, &dist);

    group.bench_function("column_major_symmetric", |b| {
        b.iter(|| black_box((&x * &dense).eval()));
    });
    group.bench_function("declared_product", |b| {
        b.iter(|| {
            let product = mat_mat_mult(dense.storage(), dense.storage()).expect("square operands");
            black_box(multiply(&x, product).expect("matching sizes").eval())
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_storage_order,
    bench_serial_vs_smp,
    bench_symmetric_routing
);

criterion_main!(benches);
