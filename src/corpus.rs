//! Synthetic Training Corpus
//!
//! Generates labeled training data by sampling plaintext from a fixed
//! vocabulary, encrypting it under every scheme, and extracting features
//! from the resulting ciphertext. The corpus is consumed directly by the
//! classifier's fit step and never persisted.
//!
//! All randomness flows through the caller's seeded RNG handle, so a corpus
//! is fully reproducible from a single seed.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::features::{self, FeatureVector};
use crate::schemes::{encrypt_sample, CipherScheme};

/// Words sampled into training plaintext
const VOCABULARY: [&str; 14] = [
    "HELLO",
    "WORLD",
    "CRYPTO",
    "SECURE",
    "ATTACK",
    "PASSWORD",
    "MESSAGE",
    "CIPHER",
    "ALGORITHM",
    "ENCRYPTION",
    "DECRYPTION",
    "SECURITY",
    "PRIVACY",
    "AUTHENTICATION",
];

/// Token count range for sampled plaintext
const MIN_TOKENS: usize = 8;
const MAX_TOKENS: usize = 20;

/// Labeled feature vectors, kept as parallel columns
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Feature rows in canonical order
    pub features: Vec<[f64; FeatureVector::LEN]>,
    /// Class label per row
    pub labels: Vec<CipherScheme>,
}

impl Dataset {
    /// Number of examples
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True when the dataset holds no examples
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn push(&mut self, features: [f64; FeatureVector::LEN], label: CipherScheme) {
        self.features.push(features);
        self.labels.push(label);
    }

    /// Partition row indices into disjoint train/test sets, preserving each
    /// class's proportional representation.
    ///
    /// Classes with at least two examples contribute at least one row to each
    /// side; singleton classes stay entirely in the train set.
    pub fn stratified_split<R: Rng>(
        &self,
        test_fraction: f64,
        rng: &mut R,
    ) -> (Vec<usize>, Vec<usize>) {
        let mut train = Vec::new();
        let mut test = Vec::new();

        for class in CipherScheme::ALL {
            let mut indices: Vec<usize> = (0..self.len())
                .filter(|&i| self.labels[i] == class)
                .collect();
            if indices.is_empty() {
                continue;
            }
            indices.shuffle(rng);

            let n_test = if indices.len() < 2 {
                0
            } else {
                let want = (indices.len() as f64 * test_fraction).round() as usize;
                want.clamp(1, indices.len() - 1)
            };

            test.extend_from_slice(&indices[..n_test]);
            train.extend_from_slice(&indices[n_test..]);
        }

        (train, test)
    }
}

/// Sample a plaintext of 8-20 vocabulary tokens joined by single spaces
pub fn random_plaintext<R: Rng>(rng: &mut R) -> String {
    let tokens = rng.gen_range(MIN_TOKENS..=MAX_TOKENS);
    let words: Vec<&str> = (0..tokens)
        .map(|_| VOCABULARY.choose(rng).copied().unwrap_or(VOCABULARY[0]))
        .collect();
    words.join(" ")
}

/// Generate a labeled corpus of `samples_per_class` examples per scheme.
///
/// Each iteration draws one plaintext and encrypts it under all four
/// schemes, so the resulting dataset holds `4 * samples_per_class` examples
/// with perfectly balanced classes.
pub fn generate<R: Rng>(samples_per_class: usize, rng: &mut R) -> Dataset {
    let mut dataset = Dataset::default();

    for _ in 0..samples_per_class {
        let plaintext = random_plaintext(rng);
        for scheme in CipherScheme::ALL {
            let ciphertext = encrypt_sample(scheme, &plaintext, rng);
            dataset.push(features::extract(&ciphertext).to_array(), scheme);
        }
    }

    dataset
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn rng(seed: u64) -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(seed)
    }

    #[test]
    fn test_random_plaintext_draws_from_vocabulary() {
        let mut rng = rng(1);
        for _ in 0..20 {
            let plaintext = random_plaintext(&mut rng);
            let words: Vec<&str> = plaintext.split(' ').collect();
            assert!(words.len() >= MIN_TOKENS && words.len() <= MAX_TOKENS);
            for word in words {
                assert!(VOCABULARY.contains(&word), "unexpected token {word}");
            }
        }
    }

    #[test]
    fn test_generate_balanced_classes() {
        let mut rng = rng(2);
        let dataset = generate(5, &mut rng);
        assert_eq!(dataset.len(), 20);
        for class in CipherScheme::ALL {
            let count = dataset.labels.iter().filter(|&&l| l == class).count();
            assert_eq!(count, 5);
        }
    }

    #[test]
    fn test_generate_reproducible_from_seed() {
        let a = generate(3, &mut rng(42));
        let b = generate(3, &mut rng(42));
        assert_eq!(a.features, b.features);
        assert_eq!(a.labels, b.labels);
    }

    #[test]
    fn test_stratified_split_preserves_proportions() {
        let dataset = generate(10, &mut rng(5));
        let (train, test) = dataset.stratified_split(0.2, &mut rng(42));

        assert_eq!(train.len() + test.len(), dataset.len());
        for class in CipherScheme::ALL {
            let in_test = test
                .iter()
                .filter(|&&i| dataset.labels[i] == class)
                .count();
            assert_eq!(in_test, 2, "each class contributes 20% to the test set");
        }
    }

    #[test]
    fn test_stratified_split_is_disjoint() {
        let dataset = generate(6, &mut rng(9));
        let (train, test) = dataset.stratified_split(0.25, &mut rng(0));
        for i in &test {
            assert!(!train.contains(i));
        }
    }
}
