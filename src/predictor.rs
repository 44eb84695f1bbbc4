//! Predictor Facade
//!
//! The single inference entry point: extracts features from a ciphertext and
//! asks whichever classifier backend the process resolved at startup — the
//! fitted ensemble, or the rule-based heuristic when no trained model was
//! available. The backend is chosen once at construction and never changes,
//! so concurrent `predict` calls share the facade without locking.

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::features::{self, FeatureVector};
use crate::forest::ClassifierModel;
use crate::schemes::CipherScheme;
use crate::store::LoadOutcome;

/// Errors surfaced to inference callers
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PredictError {
    #[error("ciphertext is empty")]
    EmptyCiphertext,
}

/// Which backend the facade resolved at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PredictorMode {
    /// Serving the primary fitted model
    Fitted,
    /// Serving a fitted model loaded from the legacy artifact
    FittedLegacy,
    /// Serving the rule-based fallback
    Heuristic,
}

impl PredictorMode {
    /// Stable name reported by the health endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictorMode::Fitted => "fitted",
            PredictorMode::FittedLegacy => "fitted-legacy",
            PredictorMode::Heuristic => "heuristic",
        }
    }
}

/// Result of a single inference call
#[derive(Debug, Clone)]
pub struct Prediction {
    /// Most probable scheme
    pub algorithm: CipherScheme,
    /// Probability assigned to `algorithm`, in [0, 1]
    pub confidence: f64,
    /// Per-class probabilities in the backend's class order, each in [0, 1]
    pub probabilities: Vec<(CipherScheme, f64)>,
    /// The extracted features, echoed back for observability
    pub features: FeatureVector,
}

/// Rule-based fallback used when no trained model exists.
///
/// A deterministic decision list over the extracted features. It has no real
/// confidence signal, so `predict_proba` is a uniform distribution — a
/// known-weak degraded mode, not a calibrated probability.
#[derive(Debug, Default)]
pub struct HeuristicClassifier;

impl HeuristicClassifier {
    /// Decision list, evaluated in order
    pub fn predict(&self, features: &FeatureVector) -> CipherScheme {
        if features.entropy < 2.0 {
            CipherScheme::Substitution
        } else if features.alpha_ratio < 0.5 {
            CipherScheme::Modern
        } else {
            CipherScheme::Transposition
        }
    }

    /// Uniform distribution over all classes
    pub fn predict_proba(&self) -> Vec<f64> {
        vec![1.0 / CipherScheme::ALL.len() as f64; CipherScheme::ALL.len()]
    }
}

enum Backend {
    Fitted(ClassifierModel),
    Heuristic(HeuristicClassifier),
}

/// Inference facade over the resolved classifier backend
pub struct Predictor {
    backend: Backend,
    mode: PredictorMode,
}

impl Predictor {
    /// Build a predictor from the store's startup resolution
    pub fn from_outcome(outcome: LoadOutcome) -> Self {
        match outcome {
            LoadOutcome::Loaded(model) => Self::fitted(model),
            LoadOutcome::LoadedLegacy(model) => Self {
                backend: Backend::Fitted(model),
                mode: PredictorMode::FittedLegacy,
            },
            LoadOutcome::Unavailable => Self::heuristic(),
        }
    }

    /// Serve with a fitted model
    pub fn fitted(model: ClassifierModel) -> Self {
        Self {
            backend: Backend::Fitted(model),
            mode: PredictorMode::Fitted,
        }
    }

    /// Serve with the rule-based fallback
    pub fn heuristic() -> Self {
        warn!("Predictor running in heuristic mode; confidences are uniform, not calibrated");
        Self {
            backend: Backend::Heuristic(HeuristicClassifier),
            mode: PredictorMode::Heuristic,
        }
    }

    /// Which backend this predictor serves with
    pub fn mode(&self) -> PredictorMode {
        self.mode
    }

    /// The classes the backend can assign, in canonical order
    pub fn algorithms(&self) -> Vec<CipherScheme> {
        match &self.backend {
            Backend::Fitted(model) => model.classes().to_vec(),
            Backend::Heuristic(_) => CipherScheme::ALL.to_vec(),
        }
    }

    /// Classify a ciphertext sample.
    ///
    /// Stateless and side-effect free; rejects empty input rather than
    /// producing a prediction from the degenerate zero vector.
    pub fn predict(&self, ciphertext: &str) -> Result<Prediction, PredictError> {
        if ciphertext.is_empty() {
            return Err(PredictError::EmptyCiphertext);
        }

        let features = features::extract(ciphertext);
        let array = features.to_array();

        let (algorithm, proba) = match &self.backend {
            Backend::Fitted(model) => {
                let proba = model.predict_proba(&array);
                (model.predict(&array), proba)
            }
            Backend::Heuristic(heuristic) => {
                (heuristic.predict(&features), heuristic.predict_proba())
            }
        };

        let confidence = proba.iter().cloned().fold(0.0f64, f64::max);
        let probabilities = self
            .algorithms()
            .into_iter()
            .zip(proba)
            .collect();

        Ok(Prediction {
            algorithm,
            confidence,
            probabilities,
            features,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForestConfig;
    use crate::corpus;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn heuristic_features(entropy: f64, alpha_ratio: f64) -> FeatureVector {
        FeatureVector {
            entropy,
            alpha_ratio,
            ..FeatureVector::zero()
        }
    }

    #[test]
    fn test_empty_ciphertext_rejected() {
        let predictor = Predictor::heuristic();
        assert_eq!(
            predictor.predict("").unwrap_err(),
            PredictError::EmptyCiphertext
        );
    }

    #[test]
    fn test_heuristic_decision_list() {
        let heuristic = HeuristicClassifier;
        assert_eq!(
            heuristic.predict(&heuristic_features(1.5, 1.0)),
            CipherScheme::Substitution
        );
        assert_eq!(
            heuristic.predict(&heuristic_features(3.9, 0.4)),
            CipherScheme::Modern
        );
        assert_eq!(
            heuristic.predict(&heuristic_features(3.0, 1.0)),
            CipherScheme::Transposition
        );
    }

    #[test]
    fn test_heuristic_proba_is_uniform() {
        let predictor = Predictor::heuristic();
        let prediction = predictor.predict("HELLOWORLD").unwrap();

        assert_eq!(prediction.confidence, 0.25);
        assert_eq!(prediction.probabilities.len(), 4);
        for (_, p) in &prediction.probabilities {
            assert_eq!(*p, 0.25);
        }
    }

    #[test]
    fn test_heuristic_mode_reported() {
        assert_eq!(Predictor::heuristic().mode(), PredictorMode::Heuristic);
        assert_eq!(PredictorMode::Heuristic.as_str(), "heuristic");
    }

    #[test]
    fn test_fitted_predictor_echoes_features() {
        let mut rng = ChaCha20Rng::seed_from_u64(12);
        let dataset = corpus::generate(20, &mut rng);
        let config = ForestConfig {
            num_trees: 15,
            ..ForestConfig::default()
        };
        let (model, _) = crate::forest::ClassifierModel::fit(&dataset, &config).unwrap();
        let predictor = Predictor::fitted(model);

        let prediction = predictor.predict("RIJVSUYVJN").unwrap();
        assert_eq!(prediction.features.length, 10.0);
        assert_eq!(prediction.features.alpha_ratio, 1.0);

        let sum: f64 = prediction.probabilities.iter().map(|(_, p)| p).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(prediction.confidence > 0.0 && prediction.confidence <= 1.0);
        // The reported algorithm carries the maximum probability
        let assigned = prediction
            .probabilities
            .iter()
            .find(|(scheme, _)| *scheme == prediction.algorithm)
            .map(|(_, p)| *p)
            .unwrap();
        assert_eq!(assigned, prediction.confidence);
        let max = prediction
            .probabilities
            .iter()
            .map(|(_, p)| *p)
            .fold(0.0f64, f64::max);
        assert_eq!(assigned, max);
    }

    #[test]
    fn test_prediction_deterministic() {
        let predictor = Predictor::heuristic();
        let a = predictor.predict("ZEBBWTBOBW").unwrap();
        let b = predictor.predict("ZEBBWTBOBW").unwrap();
        assert_eq!(a.algorithm, b.algorithm);
        assert_eq!(a.confidence, b.confidence);
    }
}
