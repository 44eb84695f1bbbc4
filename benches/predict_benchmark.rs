//! Cipherscope Performance Benchmarks
//!
//! Feature extraction and single-vector inference sit on the request path,
//! so both must stay O(length) / O(tree count) with no surprises.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use cipherscope::{corpus, features, ClassifierModel, ForestConfig, Predictor};

/// Representative ciphertext samples
fn sample_payloads() -> Vec<(&'static str, String)> {
    vec![
        ("vigenere_short", "RIJVSUYVJN".to_string()),
        ("substitution_short", "ZEBBWTBOBW".to_string()),
        ("hex_digest", "8f9a3b1c0e7d9f4d".to_string()),
        ("base64_block", "U2FsdGVkX1/8gqu8NZ+ZLOSVfwyJQkbaRd0uIKxfiM4=".to_string()),
        ("long_letters", "SECUREMESSAGE".repeat(40)),
        ("long_mixed", "a1B2c3D4e5F6!?".repeat(40)),
    ]
}

fn trained_predictor() -> Predictor {
    let config = ForestConfig {
        num_trees: 50,
        ..ForestConfig::default()
    };
    let mut rng = ChaCha20Rng::seed_from_u64(42);
    let dataset = corpus::generate(60, &mut rng);
    let (model, _) = ClassifierModel::fit(&dataset, &config).expect("fit");
    Predictor::fitted(model)
}

fn bench_feature_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");
    for (name, payload) in sample_payloads() {
        group.throughput(Throughput::Bytes(payload.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &payload, |b, p| {
            b.iter(|| features::extract(black_box(p)));
        });
    }
    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let predictor = trained_predictor();
    let mut group = c.benchmark_group("predict");
    for (name, payload) in sample_payloads() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &payload, |b, p| {
            b.iter(|| predictor.predict(black_box(p)).unwrap());
        });
    }
    group.finish();
}

fn bench_heuristic_fallback(c: &mut Criterion) {
    let predictor = Predictor::heuristic();
    c.bench_function("predict/heuristic", |b| {
        b.iter(|| predictor.predict(black_box("ZEBBWTBOBW")).unwrap());
    });
}

criterion_group!(
    benches,
    bench_feature_extraction,
    bench_prediction,
    bench_heuristic_fallback
);
criterion_main!(benches);
