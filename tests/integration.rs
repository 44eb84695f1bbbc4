//! Integration Tests for Cipherscope
//!
//! End-to-end flows: corpus synthesis through fitting, persistence, and
//! inference, exercised the way the training and serving binaries use the
//! library.

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use cipherscope::{
    corpus, store, CipherScheme, ClassifierModel, EvaluationReport, ForestConfig, LoadOutcome,
    PredictError, Predictor,
};

/// Fit a small but realistic model on a seeded corpus
fn train_model(seed: u64) -> (ClassifierModel, EvaluationReport) {
    let config = ForestConfig {
        num_trees: 60,
        max_depth: 10,
        min_samples_split: 2,
        test_fraction: 0.2,
        seed,
    };
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let dataset = corpus::generate(100, &mut rng);
    ClassifierModel::fit(&dataset, &config).expect("fit succeeds on a generated corpus")
}

fn probability_of(predictor: &Predictor, ciphertext: &str, scheme: CipherScheme) -> f64 {
    let prediction = predictor.predict(ciphertext).expect("valid ciphertext");
    prediction
        .probabilities
        .iter()
        .find(|(s, _)| *s == scheme)
        .map(|(_, p)| *p)
        .expect("scheme present in probability map")
}

mod training {
    use super::*;

    #[test]
    fn test_fit_beats_chance_on_held_out_data() {
        let (_, report) = train_model(42);
        assert!(
            report.accuracy > 0.6,
            "held-out accuracy {} barely above chance",
            report.accuracy
        );
        assert_eq!(report.per_class.len(), 4);
    }

    #[test]
    fn test_same_seed_reproduces_the_run() {
        let (model_a, report_a) = train_model(7);
        let (model_b, report_b) = train_model(7);

        assert_eq!(report_a.accuracy, report_b.accuracy);

        let probe = cipherscope::extract("ZEBBWTBOBW").to_array();
        assert_eq!(model_a.predict_proba(&probe), model_b.predict_proba(&probe));
        assert_eq!(model_a.predict(&probe), model_b.predict(&probe));
    }
}

mod persistence {
    use super::*;

    #[test]
    fn test_save_load_round_trip_is_exact() {
        let (model, _) = train_model(42);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");

        store::save_model(&path, &model).unwrap();
        let reloaded = store::load_model(&path).unwrap();

        let mut rng = ChaCha20Rng::seed_from_u64(99);
        let probes = corpus::generate(5, &mut rng);
        for row in &probes.features {
            assert_eq!(model.predict(row), reloaded.predict(row));
            assert_eq!(model.predict_proba(row), reloaded.predict_proba(row));
        }
    }

    #[test]
    fn test_three_tier_resolution_reaches_heuristic() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = store::resolve(
            &dir.path().join("missing-primary.bin"),
            &dir.path().join("missing-legacy.bin"),
        );
        assert!(matches!(outcome, LoadOutcome::Unavailable));

        let predictor = Predictor::from_outcome(outcome);
        let prediction = predictor.predict("HELLOWORLD").unwrap();
        assert_eq!(prediction.confidence, 0.25);
    }
}

mod inference {
    use super::*;

    #[test]
    fn test_empty_ciphertext_is_invalid_input() {
        let (model, _) = train_model(42);
        let predictor = Predictor::fitted(model);
        assert_eq!(
            predictor.predict("").unwrap_err(),
            PredictError::EmptyCiphertext
        );
    }

    #[test]
    fn test_substitution_sample_concentrates_mass() {
        let (model, _) = train_model(42);
        let predictor = Predictor::fitted(model);

        // A monoalphabetic substitution of HELLOWORLD: letter repetition
        // survives, letter identities diverge from English.
        let p = probability_of(&predictor, "ZEBBWTBOBW", CipherScheme::Substitution);
        assert!(
            p > 0.25,
            "Substitution mass {p} not above the uniform baseline"
        );
    }

    #[test]
    fn test_probabilities_cover_all_classes_and_sum_to_one() {
        let (model, _) = train_model(42);
        let predictor = Predictor::fitted(model);
        let prediction = predictor.predict("8f9a3b1c0e7d9f4d").unwrap();

        assert_eq!(prediction.probabilities.len(), 4);
        let schemes: Vec<CipherScheme> =
            prediction.probabilities.iter().map(|(s, _)| *s).collect();
        assert_eq!(schemes, CipherScheme::ALL);

        let sum: f64 = prediction.probabilities.iter().map(|(_, p)| p).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_features_echoed_for_observability() {
        let (model, _) = train_model(42);
        let predictor = Predictor::fitted(model);
        let prediction = predictor.predict("RIJVSUYVJN").unwrap();

        assert_eq!(prediction.features.length, 10.0);
        assert_eq!(prediction.features.alpha_ratio, 1.0);
        assert_eq!(prediction.features.digit_ratio, 0.0);
        assert_eq!(prediction.features.symbol_ratio, 0.0);
    }

    #[test]
    fn test_inference_is_deterministic() {
        let (model, _) = train_model(13);
        let predictor = Predictor::fitted(model);

        let a = predictor.predict("ZEBBWTBOBW").unwrap();
        let b = predictor.predict("ZEBBWTBOBW").unwrap();
        assert_eq!(a.algorithm, b.algorithm);
        assert_eq!(a.confidence, b.confidence);
        assert_eq!(a.probabilities, b.probabilities);
    }

    #[test]
    fn test_algorithms_listing_in_canonical_order() {
        let (model, _) = train_model(42);
        assert_eq!(Predictor::fitted(model).algorithms(), CipherScheme::ALL);
        assert_eq!(Predictor::heuristic().algorithms(), CipherScheme::ALL);
    }
}
