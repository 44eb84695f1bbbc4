//! CART Decision Tree
//!
//! A single classification tree grown greedily on Gini impurity. Nodes live
//! in a flat arena indexed by position, which keeps the fitted tree trivially
//! serializable and cache-friendly to walk at inference time.
//!
//! Each split considers a random subset of features, so trees inside a
//! bagged ensemble decorrelate even when one feature dominates.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;

/// Growth limits applied while fitting a tree
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    /// Maximum node depth (root is depth 0)
    pub max_depth: usize,
    /// Minimum examples required to attempt a split
    pub min_samples_split: usize,
    /// Features considered per split
    pub feature_subset: usize,
}

/// A node in the fitted tree
#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    /// Internal split: `x[feature] <= threshold` goes left
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Terminal node carrying a class probability distribution
    Leaf { distribution: Vec<f64> },
}

/// A fitted classification tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Grow a tree on the rows of `features`/`labels` selected by `indices`
    /// (repeats allowed, which is how bootstrap resampling enters).
    ///
    /// `labels` are class indices in `0..num_classes`.
    pub fn fit(
        features: &[[f64; FeatureVector::LEN]],
        labels: &[usize],
        indices: &[usize],
        num_classes: usize,
        params: &TreeParams,
        rng: &mut ChaCha20Rng,
    ) -> Self {
        debug_assert!(!indices.is_empty(), "cannot fit a tree on zero rows");
        let mut tree = Self { nodes: Vec::new() };
        let mut indices = indices.to_vec();
        tree.grow(features, labels, &mut indices, num_classes, params, rng, 0);
        tree
    }

    /// Class probability distribution for a single feature vector
    pub fn predict_proba(&self, x: &[f64; FeatureVector::LEN]) -> &[f64] {
        let mut node = 0;
        loop {
            match &self.nodes[node] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if x[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                Node::Leaf { distribution } => return distribution,
            }
        }
    }

    /// Number of nodes in the fitted tree
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Recursively grow the subtree for `indices`, returning its node id.
    ///
    /// `indices` is partitioned in place around the chosen threshold before
    /// recursing, so no per-node allocations beyond the arena itself.
    #[allow(clippy::too_many_arguments)]
    fn grow(
        &mut self,
        features: &[[f64; FeatureVector::LEN]],
        labels: &[usize],
        indices: &mut [usize],
        num_classes: usize,
        params: &TreeParams,
        rng: &mut ChaCha20Rng,
        depth: usize,
    ) -> usize {
        let counts = class_counts(labels, indices, num_classes);
        let impurity = gini(&counts, indices.len());

        let should_stop = depth >= params.max_depth
            || indices.len() < params.min_samples_split
            || impurity == 0.0;

        let split = if should_stop {
            None
        } else {
            best_split(features, labels, indices, num_classes, params, rng, impurity)
        };

        match split {
            Some((feature, threshold)) => {
                let mid = partition(features, indices, feature, threshold);
                // A degenerate partition means every candidate threshold
                // collapsed onto one side; emit a leaf instead.
                if mid == 0 || mid == indices.len() {
                    return self.push_leaf(&counts, indices.len());
                }

                let id = self.nodes.len();
                // Placeholder patched once both children exist
                self.nodes.push(Node::Leaf {
                    distribution: Vec::new(),
                });

                let (left_indices, right_indices) = indices.split_at_mut(mid);
                let left = self.grow(
                    features,
                    labels,
                    left_indices,
                    num_classes,
                    params,
                    rng,
                    depth + 1,
                );
                let right = self.grow(
                    features,
                    labels,
                    right_indices,
                    num_classes,
                    params,
                    rng,
                    depth + 1,
                );

                self.nodes[id] = Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                };
                id
            }
            None => self.push_leaf(&counts, indices.len()),
        }
    }

    fn push_leaf(&mut self, counts: &[usize], total: usize) -> usize {
        let distribution = counts
            .iter()
            .map(|&c| c as f64 / total as f64)
            .collect();
        self.nodes.push(Node::Leaf { distribution });
        self.nodes.len() - 1
    }
}

/// Class histogram over the selected rows
fn class_counts(labels: &[usize], indices: &[usize], num_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; num_classes];
    for &i in indices {
        counts[labels[i]] += 1;
    }
    counts
}

/// Gini impurity: `1 - Σ p²`
fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

/// Find the (feature, threshold) pair with the best Gini gain over a random
/// feature subset, or None when no candidate improves on the parent.
fn best_split(
    features: &[[f64; FeatureVector::LEN]],
    labels: &[usize],
    indices: &[usize],
    num_classes: usize,
    params: &TreeParams,
    rng: &mut ChaCha20Rng,
    parent_impurity: f64,
) -> Option<(usize, f64)> {
    let mut candidates: Vec<usize> = (0..FeatureVector::LEN).collect();
    candidates.shuffle(rng);
    candidates.truncate(params.feature_subset.clamp(1, FeatureVector::LEN));

    let total = indices.len() as f64;
    let mut best: Option<(usize, f64)> = None;
    let mut best_score = parent_impurity - 1e-12;

    for &feature in &candidates {
        // Sort rows by this feature to sweep thresholds incrementally
        let mut order: Vec<usize> = indices.to_vec();
        order.sort_by(|&a, &b| features[a][feature].total_cmp(&features[b][feature]));

        let mut left_counts = vec![0usize; num_classes];
        let mut right_counts = class_counts(labels, indices, num_classes);

        for pos in 0..order.len() - 1 {
            let row = order[pos];
            left_counts[labels[row]] += 1;
            right_counts[labels[row]] -= 1;

            let here = features[row][feature];
            let next = features[order[pos + 1]][feature];
            if here == next {
                continue;
            }

            let n_left = (pos + 1) as f64;
            let n_right = total - n_left;
            let weighted = (n_left / total) * gini(&left_counts, pos + 1)
                + (n_right / total) * gini(&right_counts, order.len() - pos - 1);

            if weighted < best_score {
                best_score = weighted;
                best = Some((feature, (here + next) / 2.0));
            }
        }
    }

    best
}

/// Partition `indices` in place so rows with `x[feature] <= threshold` come
/// first; returns the boundary position.
fn partition(
    features: &[[f64; FeatureVector::LEN]],
    indices: &mut [usize],
    feature: usize,
    threshold: f64,
) -> usize {
    let mut mid = 0;
    for i in 0..indices.len() {
        if features[indices[i]][feature] <= threshold {
            indices.swap(i, mid);
            mid += 1;
        }
    }
    mid
}
