//! Held-Out Evaluation
//!
//! Offline diagnostics computed on the test split after fitting: overall
//! accuracy, a confusion matrix, and per-class precision/recall/F1. This is
//! reporting only — nothing at inference time depends on it.

use std::fmt;

use crate::schemes::CipherScheme;

/// Precision/recall/F1 for one class
#[derive(Debug, Clone)]
pub struct ClassMetrics {
    /// The class these metrics describe
    pub label: CipherScheme,
    /// Of the rows predicted as this class, the fraction that were correct
    pub precision: f64,
    /// Of the rows truly in this class, the fraction recovered
    pub recall: f64,
    /// Harmonic mean of precision and recall
    pub f1: f64,
    /// True examples of this class in the test split
    pub support: usize,
}

/// Diagnostic report for a fitted ensemble
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    /// Fraction of test rows classified correctly
    pub accuracy: f64,
    /// Per-class metrics in canonical class order
    pub per_class: Vec<ClassMetrics>,
    /// `confusion[truth][predicted]` counts
    pub confusion: Vec<Vec<usize>>,
    /// Number of test rows evaluated
    pub test_examples: usize,
}

impl EvaluationReport {
    /// Build a report from parallel truth/prediction class indices.
    ///
    /// `classes` maps class indices back to their labels; an empty test set
    /// produces a zeroed report rather than dividing by zero.
    pub fn from_predictions(
        classes: &[CipherScheme],
        truth: &[usize],
        predicted: &[usize],
    ) -> Self {
        debug_assert_eq!(truth.len(), predicted.len());
        let n = classes.len();
        let mut confusion = vec![vec![0usize; n]; n];
        let mut correct = 0usize;

        for (&t, &p) in truth.iter().zip(predicted) {
            confusion[t][p] += 1;
            if t == p {
                correct += 1;
            }
        }

        let accuracy = if truth.is_empty() {
            0.0
        } else {
            correct as f64 / truth.len() as f64
        };

        let per_class = classes
            .iter()
            .enumerate()
            .map(|(i, &label)| {
                let support: usize = confusion[i].iter().sum();
                let predicted_as: usize = confusion.iter().map(|row| row[i]).sum();
                let hits = confusion[i][i];

                let precision = ratio(hits, predicted_as);
                let recall = ratio(hits, support);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };

                ClassMetrics {
                    label,
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect();

        Self {
            accuracy,
            per_class,
            confusion,
            test_examples: truth.len(),
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "accuracy {:.4} on {} held-out examples",
            self.accuracy, self.test_examples
        )?;
        writeln!(
            f,
            "{:<15} {:>9} {:>9} {:>9} {:>9}",
            "class", "precision", "recall", "f1", "support"
        )?;
        for m in &self.per_class {
            writeln!(
                f,
                "{:<15} {:>9.3} {:>9.3} {:>9.3} {:>9}",
                m.label.as_str(),
                m.precision,
                m.recall,
                m.f1,
                m.support
            )?;
        }
        Ok(())
    }
}
