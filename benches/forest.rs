//! Benchmarks for random forest training and prediction.

use building_energy::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn synthetic(n_samples: usize) -> (Matrix<f64>, Vector<f64>) {
    let mut data = Vec::with_capacity(n_samples * 7);
    let mut target = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        let sqft = 800.0 + 37.0 * (i % 97) as f64;
        let temperature = -10.0 + 0.7 * (i % 53) as f64;
        let age = (i % 80) as f64;
        data.extend_from_slice(&[
            sqft,
            (1 + i % 20) as f64,
            temperature,
            40.0 + (i % 30) as f64,
            age,
            (i % 2) as f64,
            (i % 3) as f64,
        ]);
        target.push(1.2 * sqft - 30.0 * temperature + 8.0 * age);
    }
    let x = Matrix::from_vec(n_samples, 7, data).expect("valid shape");
    (x, Vector::from_vec(target))
}

fn bench_forest_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_forest_fit");
    group.sample_size(10);

    for size in [100, 500, 1000].iter() {
        let (x, y) = synthetic(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let mut forest = ForestConfig::default()
                    .with_n_estimators(20)
                    .build()
                    .expect("valid config");
                forest.fit(black_box(&x), black_box(&y)).expect("fit")
            });
        });
    }

    group.finish();
}

fn bench_forest_predict(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_forest_predict");

    for size in [100, 500, 1000].iter() {
        let (x, y) = synthetic(*size);
        let mut forest = ForestConfig::default()
            .with_n_estimators(20)
            .build()
            .expect("valid config");
        forest.fit(&x, &y).expect("fit");

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| forest.predict(black_box(&x)).expect("fitted"));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_forest_fit, bench_forest_predict);
criterion_main!(benches);
