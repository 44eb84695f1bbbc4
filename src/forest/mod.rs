//! Bagged Decision-Tree Ensemble
//!
//! The trainable classifier at the heart of the crate: a bootstrap-aggregated
//! forest of CART trees fit on the synthetic corpus. Inference averages the
//! per-tree leaf distributions, so votes are real-valued probabilities rather
//! than discrete counts and need no extra tie-breaking machinery.
//!
//! Fitting is reproducible from a single seed: the stratified split draws
//! from the seed directly and every tree gets its own RNG derived as
//! `seed + tree_index`, which keeps parallel fitting deterministic regardless
//! of thread scheduling.
//!
//! # Modules
//!
//! - `tree`: single CART tree (Gini splits, random feature subsets)
//! - `eval`: held-out accuracy and per-class precision/recall/F1

pub mod eval;
pub mod tree;

pub use eval::{ClassMetrics, EvaluationReport};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::ForestConfig;
use crate::corpus::Dataset;
use crate::features::FeatureVector;
use crate::schemes::CipherScheme;
use tree::{DecisionTree, TreeParams};

/// Errors surfaced while fitting the ensemble
#[derive(Debug, Error)]
pub enum TrainError {
    #[error("training dataset is empty")]
    EmptyDataset,
    #[error("forest config requests zero trees")]
    ZeroTrees,
}

/// A fitted, immutable classifier.
///
/// Owns the tree arena plus the ordered list of classes it was trained on;
/// never mutated after `fit` returns. Serializes to the opaque model blob
/// handled by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierModel {
    trees: Vec<DecisionTree>,
    classes: Vec<CipherScheme>,
    n_features: usize,
}

impl ClassifierModel {
    /// Fit an ensemble on `dataset` and evaluate it on a held-out split.
    ///
    /// The dataset is split 80/20 (per `config.test_fraction`) with class
    /// proportions preserved, trees are grown on bootstrap resamples of the
    /// train side, and the returned report describes the test side.
    pub fn fit(
        dataset: &Dataset,
        config: &ForestConfig,
    ) -> Result<(Self, EvaluationReport), TrainError> {
        if dataset.is_empty() {
            return Err(TrainError::EmptyDataset);
        }
        if config.num_trees == 0 {
            return Err(TrainError::ZeroTrees);
        }

        // Classes present in the data, in canonical order
        let classes: Vec<CipherScheme> = CipherScheme::ALL
            .into_iter()
            .filter(|c| dataset.labels.contains(c))
            .collect();
        let class_index = |scheme: CipherScheme| {
            classes
                .iter()
                .position(|&c| c == scheme)
                .expect("label drawn from the class list")
        };
        let labels: Vec<usize> = dataset.labels.iter().map(|&l| class_index(l)).collect();

        let mut split_rng = ChaCha20Rng::seed_from_u64(config.seed);
        let (train, test) = dataset.stratified_split(config.test_fraction, &mut split_rng);

        info!(
            examples = dataset.len(),
            train = train.len(),
            test = test.len(),
            trees = config.num_trees,
            max_depth = config.max_depth,
            seed = config.seed,
            "Fitting classifier ensemble"
        );

        let params = TreeParams {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            feature_subset: feature_subset_size(),
        };

        let trees: Vec<DecisionTree> = (0..config.num_trees)
            .into_par_iter()
            .map(|tree_index| {
                let mut rng =
                    ChaCha20Rng::seed_from_u64(config.seed.wrapping_add(1 + tree_index as u64));
                let bootstrap: Vec<usize> = (0..train.len())
                    .map(|_| train[rng.gen_range(0..train.len())])
                    .collect();
                DecisionTree::fit(
                    &dataset.features,
                    &labels,
                    &bootstrap,
                    classes.len(),
                    &params,
                    &mut rng,
                )
            })
            .collect();

        let model = Self {
            trees,
            classes,
            n_features: FeatureVector::LEN,
        };

        let truth: Vec<usize> = test.iter().map(|&i| labels[i]).collect();
        let predicted: Vec<usize> = test
            .iter()
            .map(|&i| model.predict_index(&dataset.features[i]))
            .collect();
        let report = EvaluationReport::from_predictions(&model.classes, &truth, &predicted);

        info!(
            accuracy = report.accuracy,
            test_examples = report.test_examples,
            "Ensemble fitted"
        );

        Ok((model, report))
    }

    /// Predict the most probable scheme for a feature vector
    pub fn predict(&self, features: &[f64; FeatureVector::LEN]) -> CipherScheme {
        self.classes[self.predict_index(features)]
    }

    /// Per-class probabilities in the model's class order.
    ///
    /// The average of every tree's leaf distribution; entries sum to 1.
    pub fn predict_proba(&self, features: &[f64; FeatureVector::LEN]) -> Vec<f64> {
        let mut summed = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (acc, p) in summed.iter_mut().zip(tree.predict_proba(features)) {
                *acc += p;
            }
        }
        let scale = 1.0 / self.trees.len() as f64;
        for p in &mut summed {
            *p *= scale;
        }
        summed
    }

    /// Classes this model was trained on, in canonical order
    pub fn classes(&self) -> &[CipherScheme] {
        &self.classes
    }

    /// Number of features the model expects
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Number of trees in the ensemble
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Argmax over averaged probabilities; the earliest class in model order
    /// wins an exact tie.
    fn predict_index(&self, features: &[f64; FeatureVector::LEN]) -> usize {
        let proba = self.predict_proba(features);
        let mut best = 0;
        for (i, &p) in proba.iter().enumerate() {
            if p > proba[best] {
                best = i;
            }
        }
        best
    }
}

/// Features examined per split: √LEN rounded down, the usual bagged-forest
/// default
fn feature_subset_size() -> usize {
    ((FeatureVector::LEN as f64).sqrt() as usize).max(1)
}
