//! Isolation forest outlier model.
//!
//! An ensemble of random binary trees, each grown on a random sub-sample:
//! every internal node picks a random feature and a uniform random split
//! between that feature's min and max. Outliers are isolated in fewer splits,
//! so a short average path length means an anomalous point.
//!
//! Scoring follows Liu, Ting & Zhou (2008):
//!
//! ```text
//! s(x, n) = 2^(-E[h(x)] / c(n))
//! c(n)    = 2 H(n-1) - 2 (n-1) / n,   H(i) ≈ ln(i) + γ
//! ```
//!
//! The decision threshold is the training-score quantile matching the
//! configured contamination, so roughly that fraction of the fitted data is
//! labelled anomalous.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::scaler::{FeatureVector, NUM_FEATURES};
use crate::config::AnomalyConfig;

/// Euler–Mascheroni constant.
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Average path length of an unsuccessful BST search over `n` points.
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
    Leaf {
        size: usize,
    },
}

#[derive(Debug, Clone)]
struct IsolationTree {
    root: Node,
}

impl IsolationTree {
    fn grow(data: &[FeatureVector], indices: Vec<usize>, max_depth: usize, rng: &mut StdRng) -> Self {
        Self {
            root: Self::grow_node(data, indices, 0, max_depth, rng),
        }
    }

    fn grow_node(
        data: &[FeatureVector],
        indices: Vec<usize>,
        depth: usize,
        max_depth: usize,
        rng: &mut StdRng,
    ) -> Node {
        if depth >= max_depth || indices.len() <= 1 {
            return Node::Leaf { size: indices.len() };
        }

        // Only features that still vary inside this node can split it
        let mut candidates: Vec<(usize, f64, f64)> = Vec::with_capacity(NUM_FEATURES);
        for feature in 0..NUM_FEATURES {
            let (lo, hi) = indices.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
                (lo.min(data[i][feature]), hi.max(data[i][feature]))
            });
            if hi > lo {
                candidates.push((feature, lo, hi));
            }
        }
        if candidates.is_empty() {
            return Node::Leaf { size: indices.len() };
        }

        let (feature, lo, hi) = candidates[rng.gen_range(0..candidates.len())];
        let threshold = rng.gen_range(lo..hi);

        // threshold in [lo, hi): both sides are non-empty with `<=`
        let (left, right): (Vec<usize>, Vec<usize>) =
            indices.into_iter().partition(|&i| data[i][feature] <= threshold);

        Node::Split {
            feature,
            threshold,
            left: Box::new(Self::grow_node(data, left, depth + 1, max_depth, rng)),
            right: Box::new(Self::grow_node(data, right, depth + 1, max_depth, rng)),
        }
    }

    fn path_length(&self, x: &FeatureVector) -> f64 {
        let mut node = &self.root;
        let mut depth = 0.0;
        loop {
            match node {
                Node::Split { feature, threshold, left, right } => {
                    node = if x[*feature] <= *threshold { left } else { right };
                    depth += 1.0;
                }
                Node::Leaf { size } => return depth + average_path_length(*size),
            }
        }
    }
}

/// A fitted isolation forest.
#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    sample_size: usize,
    /// Scores strictly above this are outliers
    threshold: f64,
}

impl IsolationForest {
    /// Fit on `data` using the estimator count, sub-sample size, contamination
    /// and seed from `config`. Returns `None` for an empty data set.
    ///
    /// Identical data and seed always produce an identical forest.
    pub fn fit(data: &[FeatureVector], config: &AnomalyConfig) -> Option<Self> {
        if data.is_empty() {
            return None;
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let sample_size = config.max_samples.clamp(1, data.len());
        let max_depth = (sample_size.max(2) as f64).log2().ceil() as usize;

        let trees = (0..config.n_estimators.max(1))
            .map(|_| {
                let indices = rand::seq::index::sample(&mut rng, data.len(), sample_size).into_vec();
                IsolationTree::grow(data, indices, max_depth, &mut rng)
            })
            .collect();

        let mut forest = Self {
            trees,
            sample_size,
            threshold: f64::INFINITY,
        };

        let scores: Vec<f64> = data.iter().map(|x| forest.score(x)).collect();
        forest.threshold = quantile(&scores, 1.0 - config.contamination);
        Some(forest)
    }

    /// Anomaly score in (0, 1]. Values near 1 are outliers, values well
    /// below 0.5 are normal.
    pub fn score(&self, x: &FeatureVector) -> f64 {
        let mean_path = self.trees.iter().map(|t| t.path_length(x)).sum::<f64>() / self.trees.len() as f64;
        let norm = average_path_length(self.sample_size);
        if norm <= 0.0 {
            return 0.5;
        }
        2.0_f64.powf(-mean_path / norm)
    }

    pub fn is_outlier(&self, x: &FeatureVector) -> bool {
        self.score(x) > self.threshold
    }

    /// Fit on `data` and label every row (`true` = outlier).
    pub fn fit_predict(data: &[FeatureVector], config: &AnomalyConfig) -> Vec<bool> {
        match Self::fit(data, config) {
            Some(forest) => data.iter().map(|x| forest.is_outlier(x)).collect(),
            None => Vec::new(),
        }
    }
}

/// Quantile with linear interpolation between closest ranks.
fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return f64::INFINITY;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}
