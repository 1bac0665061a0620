use criterion::{black_box, criterion_group, criterion_main, Criterion};
use driftwatch::concept::{ConceptDriftConfig, ConceptDriftDetector};
use driftwatch::drift::{compute_categorical_drift, compute_numeric_drift, DriftThresholds};
use driftwatch::model::{Classifier, ModelType};
use driftwatch::synthetic::{binary_categories, generate_day, normal_vec, DayProfile};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

pub fn drift_benchmarks(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let baseline = normal_vec(&mut rng, 10_000, 0.0, 1.0);
    let current = normal_vec(&mut rng, 2_000, 1.0, 1.3);
    let thresholds = DriftThresholds::default();
    c.bench_function("compute_numeric_drift", |b| {
        b.iter(|| compute_numeric_drift(black_box(&baseline), black_box(&current), black_box(&thresholds)))
    });

    let base_cat = binary_categories(&mut rng, 10_000, 0.7);
    let cur_cat = binary_categories(&mut rng, 2_000, 0.5);
    c.bench_function("compute_categorical_drift", |b| {
        b.iter(|| compute_categorical_drift(black_box(&base_cat), black_box(&cur_cat), black_box(&thresholds)))
    });

    let errors: Vec<u8> = (0..5_000).map(|i| u8::from(i >= 2_500)).collect();
    for detector in ["adwin", "ddm", "pagehinkley", "kswin"] {
        let config = ConceptDriftConfig {
            detector: detector.to_string(),
            ..ConceptDriftConfig::default()
        };
        c.bench_function(&format!("{} update", detector), |b| {
            b.iter(|| {
                let mut d = ConceptDriftDetector::new(&config).unwrap();
                errors.iter().filter(|&&e| d.update(black_box(e)).change_detected).count()
            })
        });
    }

    let train = generate_day(&mut rng, 2_000, DayProfile::STABLE).unwrap();
    let numeric_cols = vec!["f1".to_string(), "f2".to_string(), "f3".to_string()];
    let cat_cols = vec!["cat".to_string()];
    let mut group = c.benchmark_group("slow");
    group.measurement_time(Duration::from_secs(20));
    group.sample_size(10);
    group.bench_function("fit logistic regression", |b| {
        b.iter(|| {
            Classifier::fit(
                black_box(&train),
                "y",
                &numeric_cols,
                &cat_cols,
                ModelType::LogisticRegression,
            )
            .unwrap()
        })
    });
    group.finish();
}

criterion_group!(benches, drift_benchmarks);
criterion_main!(benches);
