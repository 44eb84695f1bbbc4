//! Configuration Types
//!
//! Settings for ensemble fitting, the model store, and the inference
//! server. All structs deserialize from kebab-case JSON so they can be
//! supplied from a config file as well as the CLI.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for fitting the bagged tree ensemble
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ForestConfig {
    /// Number of trees in the ensemble
    #[serde(default = "default_num_trees")]
    pub num_trees: usize,
    /// Maximum depth of each tree
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Minimum examples required to split a node
    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,
    /// Fraction of the dataset held out for evaluation
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    /// Seed driving the split and every per-tree RNG
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            num_trees: default_num_trees(),
            max_depth: default_max_depth(),
            min_samples_split: default_min_samples_split(),
            test_fraction: default_test_fraction(),
            seed: default_seed(),
        }
    }
}

fn default_num_trees() -> usize {
    200
}

fn default_max_depth() -> usize {
    10
}

fn default_min_samples_split() -> usize {
    2
}

fn default_test_fraction() -> f64 {
    0.2
}

fn default_seed() -> u64 {
    42
}

/// Configuration for an offline training run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TrainingConfig {
    /// Examples generated per scheme class
    #[serde(default = "default_samples_per_class")]
    pub samples_per_class: usize,
    /// Ensemble settings
    #[serde(default)]
    pub forest: ForestConfig,
    /// Where the fitted model artifact is written
    #[serde(default = "default_primary_path")]
    pub output: PathBuf,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            samples_per_class: default_samples_per_class(),
            forest: ForestConfig::default(),
            output: default_primary_path(),
        }
    }
}

fn default_samples_per_class() -> usize {
    300
}

/// Locations the model store searches at startup, in order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StoreConfig {
    /// Primary model artifact
    #[serde(default = "default_primary_path")]
    pub primary_path: PathBuf,
    /// Secondary artifact from an earlier training run
    #[serde(default = "default_legacy_path")]
    pub legacy_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            primary_path: default_primary_path(),
            legacy_path: default_legacy_path(),
        }
    }
}

fn default_primary_path() -> PathBuf {
    PathBuf::from("model/cipherscope.model")
}

fn default_legacy_path() -> PathBuf {
    PathBuf::from("model/cipherscope-legacy.model")
}

/// Configuration for the inference HTTP server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> String {
    "127.0.0.1:5001".to_string()
}
