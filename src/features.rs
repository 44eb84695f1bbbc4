//! Ciphertext Feature Extraction
//!
//! Computes the statistical fingerprint that drives classification. Every
//! sample — whether synthesized during training or received at inference
//! time — is reduced to the same fixed-length vector of classical
//! cryptanalytic statistics:
//!
//! - Character-class ratios (alphabetic / numeric / everything else)
//! - Shannon entropy over the full character distribution
//! - Index of coincidence over the case-folded letters
//! - Chi-square divergence from English letter frequencies
//!
//! Training and inference MUST agree on the order and definition of these
//! features; [`FeatureVector::to_array`] is the single canonical ordering.

use rustc_hash::FxHashMap;
use serde::Serialize;

/// Reference English letter frequencies (A..Z), in percent.
///
/// The percentages sum to ≈100 and are the expected distribution the
/// chi-square statistic is measured against.
const ENGLISH_LETTER_FREQ: [f64; 26] = [
    8.2, 1.5, 2.8, 4.3, 12.7, 2.2, 2.0, 6.1, 7.0, 0.2, 0.8, 4.0, 2.4, 6.7, 7.5, 1.9, 0.1, 6.0,
    6.3, 9.1, 2.8, 1.0, 2.4, 0.2, 2.0, 0.1,
];

/// Statistical fingerprint of a ciphertext sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    /// Character count
    pub length: f64,
    /// Fraction of alphabetic characters (0.0 - 1.0)
    pub alpha_ratio: f64,
    /// Fraction of numeric characters (0.0 - 1.0)
    pub digit_ratio: f64,
    /// Fraction of non-alphanumeric characters (0.0 - 1.0)
    pub symbol_ratio: f64,
    /// Shannon entropy in bits over the full character distribution
    pub entropy: f64,
    /// Index of coincidence over case-folded letters
    pub index_of_coincidence: f64,
    /// Chi-square divergence from English letter frequencies
    pub chi_square: f64,
}

impl FeatureVector {
    /// Number of features in the canonical vector
    pub const LEN: usize = 7;

    /// The all-zero vector produced for degenerate (empty) input
    pub fn zero() -> Self {
        Self {
            length: 0.0,
            alpha_ratio: 0.0,
            digit_ratio: 0.0,
            symbol_ratio: 0.0,
            entropy: 0.0,
            index_of_coincidence: 0.0,
            chi_square: 0.0,
        }
    }

    /// Canonical ordering used by the classifier for both training and
    /// inference.
    pub fn to_array(self) -> [f64; Self::LEN] {
        [
            self.length,
            self.alpha_ratio,
            self.digit_ratio,
            self.symbol_ratio,
            self.entropy,
            self.index_of_coincidence,
            self.chi_square,
        ]
    }
}

/// Extract the feature vector for a ciphertext sample.
///
/// Total and deterministic: defined for every input, including the empty
/// string (which maps to the all-zero vector without touching the ratio
/// denominators).
pub fn extract(ciphertext: &str) -> FeatureVector {
    if ciphertext.is_empty() {
        return FeatureVector::zero();
    }

    let mut length = 0usize;
    let mut alpha = 0usize;
    let mut digit = 0usize;
    let mut symbol = 0usize;

    for c in ciphertext.chars() {
        length += 1;
        if c.is_alphabetic() {
            alpha += 1;
        }
        if c.is_numeric() {
            digit += 1;
        }
        if !c.is_alphanumeric() {
            symbol += 1;
        }
    }

    let len = length as f64;
    FeatureVector {
        length: len,
        alpha_ratio: alpha as f64 / len,
        digit_ratio: digit as f64 / len,
        symbol_ratio: symbol as f64 / len,
        entropy: shannon_entropy(ciphertext),
        index_of_coincidence: index_of_coincidence(ciphertext),
        chi_square: chi_square_score(ciphertext),
    }
}

/// Shannon entropy (bits) of the empirical character distribution.
///
/// Case-sensitive, all characters counted. Zero for empty input and for a
/// single repeated character.
pub fn shannon_entropy(text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }

    let mut counts: FxHashMap<char, usize> = FxHashMap::default();
    let mut total = 0usize;
    for c in text.chars() {
        *counts.entry(c).or_insert(0) += 1;
        total += 1;
    }

    let total = total as f64;
    let mut entropy = 0.0;
    for &count in counts.values() {
        let p = count as f64 / total;
        entropy -= p * p.log2();
    }
    entropy
}

/// Index of coincidence over the case-folded ASCII letters of `text`.
///
/// For n letters with per-letter counts f: `Σ f·(f−1) / (n·(n−1))`.
/// Defined as 0 when fewer than two letters are present.
pub fn index_of_coincidence(text: &str) -> f64 {
    let counts = letter_counts(text);
    let n: usize = counts.iter().sum();
    if n <= 1 {
        return 0.0;
    }

    let numerator: usize = counts.iter().map(|&f| f * f.saturating_sub(1)).sum();
    numerator as f64 / (n * (n - 1)) as f64
}

/// Chi-square statistic of the letter distribution against English.
///
/// Observed frequencies are percentages of the case-folded letter count;
/// letters that never appear contribute their expected mass. Zero when the
/// text contains no letters at all.
pub fn chi_square_score(text: &str) -> f64 {
    let counts = letter_counts(text);
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }

    let total = total as f64;
    let mut score = 0.0;
    for (i, &expected) in ENGLISH_LETTER_FREQ.iter().enumerate() {
        let observed = counts[i] as f64 / total * 100.0;
        score += (observed - expected).powi(2) / expected;
    }
    score
}

/// Per-letter counts (A..Z) of the case-folded ASCII letters in `text`
fn letter_counts(text: &str) -> [usize; 26] {
    let mut counts = [0usize; 26];
    for c in text.chars() {
        if c.is_ascii_alphabetic() {
            counts[(c.to_ascii_uppercase() as u8 - b'A') as usize] += 1;
        }
    }
    counts
}
