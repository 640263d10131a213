//! Benchmarks for churnkit-model preparation and scoring.
#![allow(missing_docs)]

use churnkit_model::{BundledClassifier, DataFramePreparer, LogisticClassifier, ModelBundle};
use churnkit_traits::FrameTransform;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use polars::prelude::*;
use rand::Rng;

const CONTRACTS: [&str; 3] = ["Month-to-month", "One year", "Two year"];
const PAYMENTS: [&str; 4] =
    ["Electronic check", "Mailed check", "Bank transfer (automatic)", "Credit card (automatic)"];

fn random_customers(n: usize) -> DataFrame {
    let mut rng = rand::thread_rng();

    let tenure: Vec<Option<i64>> =
        (0..n).map(|_| rng.gen_bool(0.95).then(|| rng.gen_range(0..72))).collect();
    let charges: Vec<Option<f64>> =
        (0..n).map(|_| rng.gen_bool(0.9).then(|| rng.gen_range(18.0..120.0))).collect();
    let contract: Vec<&str> = (0..n).map(|_| CONTRACTS[rng.gen_range(0..CONTRACTS.len())]).collect();
    let payment: Vec<Option<&str>> = (0..n)
        .map(|_| rng.gen_bool(0.97).then(|| PAYMENTS[rng.gen_range(0..PAYMENTS.len())]))
        .collect();

    df! {
        "tenure" => tenure,
        "MonthlyCharges" => charges,
        "Contract" => contract,
        "PaymentMethod" => payment,
    }
    .unwrap()
}

fn bench_preparer_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("preparer_fit");
    group.sample_size(30);

    for n_rows in [1_000, 10_000, 100_000] {
        group.throughput(Throughput::Elements(n_rows as u64));
        group.bench_with_input(BenchmarkId::new("n_rows", n_rows), &n_rows, |b, &n_rows| {
            let df = random_customers(n_rows);
            b.iter(|| {
                let mut preparer = DataFramePreparer::new();
                preparer.fit(black_box(&df)).unwrap();
                preparer
            });
        });
    }

    group.finish();
}

fn bench_preparer_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("preparer_transform");
    group.sample_size(30);

    let mut preparer = DataFramePreparer::new();
    preparer.fit(&random_customers(10_000)).unwrap();

    for n_rows in [1, 100, 10_000, 100_000] {
        group.throughput(Throughput::Elements(n_rows as u64));
        group.bench_with_input(BenchmarkId::new("n_rows", n_rows), &n_rows, |b, &n_rows| {
            let df = random_customers(n_rows);
            b.iter(|| preparer.transform(black_box(&df)).unwrap());
        });
    }

    group.finish();
}

fn bench_bundle_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("bundle_score");
    group.sample_size(30);

    let mut preparer = DataFramePreparer::new();
    preparer.fit(&random_customers(10_000)).unwrap();
    let n_features = preparer.output_columns().len();
    let classifier = LogisticClassifier::new(vec![0.1; n_features], -0.5);
    let bundle = ModelBundle::new(&preparer, BundledClassifier::Logistic(classifier)).unwrap();

    for n_rows in [100, 10_000] {
        group.throughput(Throughput::Elements(n_rows as u64));
        group.bench_with_input(BenchmarkId::new("n_rows", n_rows), &n_rows, |b, &n_rows| {
            let df = random_customers(n_rows);
            b.iter(|| bundle.score(black_box(&df)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_preparer_fit, bench_preparer_transform, bench_bundle_score);

criterion_main!(benches);
