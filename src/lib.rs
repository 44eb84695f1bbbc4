//! Cipherscope Library
//!
//! Statistically classifies a ciphertext sample by the encryption scheme
//! that likely produced it, choosing among Vigenère, monoalphabetic
//! substitution, columnar transposition, and modern block-cipher output.
//!
//! # Features
//!
//! - **Cryptanalytic features**: entropy, index of coincidence, chi-square
//!   divergence from English, and character-class ratios
//! - **Trainable classifier**: bagged CART ensemble fit on a synthetic
//!   corpus, reproducible from a single seed
//! - **Graceful degradation**: primary artifact → legacy artifact →
//!   rule-based heuristic, resolved once at startup
//! - **Deterministic inference**: same input, same label, same probabilities
//!
//! # Example
//!
//! ```ignore
//! use cipherscope::{corpus, ClassifierModel, ForestConfig, Predictor};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let mut rng = ChaCha20Rng::seed_from_u64(42);
//! let dataset = corpus::generate(300, &mut rng);
//! let (model, report) = ClassifierModel::fit(&dataset, &ForestConfig::default())?;
//! println!("{report}");
//!
//! let predictor = Predictor::fitted(model);
//! let prediction = predictor.predict("ZEBBWTBOBW")?;
//! println!("{} ({:.2})", prediction.algorithm, prediction.confidence);
//! ```

pub mod config;
pub mod corpus;
pub mod features;
pub mod forest;
pub mod predictor;
pub mod schemes;
pub mod server;
pub mod store;

// Re-exports for convenience
pub use config::{ForestConfig, ServerConfig, StoreConfig, TrainingConfig};
pub use corpus::Dataset;
pub use features::{extract, FeatureVector};
pub use forest::{ClassifierModel, EvaluationReport, TrainError};
pub use predictor::{PredictError, Prediction, Predictor, PredictorMode};
pub use schemes::CipherScheme;
pub use store::{resolve, LoadOutcome, StoreError};
