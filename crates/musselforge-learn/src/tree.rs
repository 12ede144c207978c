//! CART regression trees.
//!
//! Array-based representation: nodes live in one vector and refer to their
//! children by index. Samples with `x[feature] <= threshold` go left.

#[cfg(test)]
mod tests;

use rand::seq::index::sample;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::{LearnError, Result};
use crate::Regressor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// Growth limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    /// `None` grows until leaves are pure.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Features sampled per split; `None` considers all.
    pub max_features: Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            max_features: None,
        }
    }
}

impl TreeParams {
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
    n_features: usize,
}

struct SplitChoice {
    feature: usize,
    threshold: f64,
    score: f64,
}

impl RegressionTree {
    /// Fits a tree considering every feature at every split.
    pub fn fit(data: &Dataset, params: TreeParams) -> Result<Self> {
        Self::fit_with_rng(data, params, &mut StdRng::seed_from_u64(0))
    }

    /// Fits a tree, drawing per-split feature subsets from `rng` when
    /// `max_features` is set.
    pub fn fit_with_rng(data: &Dataset, params: TreeParams, rng: &mut impl Rng) -> Result<Self> {
        if data.is_empty() {
            return Err(LearnError::EmptyDataset);
        }
        let mut tree = Self {
            nodes: Vec::new(),
            n_features: data.n_features(),
        };
        let indices: Vec<usize> = (0..data.len()).collect();
        tree.grow(data, indices, 0, &params, rng);
        Ok(tree)
    }

    /// Builds a tree directly from nodes; node 0 is the root.
    pub fn from_nodes(nodes: Vec<TreeNode>, n_features: usize) -> Result<Self> {
        let valid = !nodes.is_empty()
            && nodes.iter().all(|n| match n {
                TreeNode::Split {
                    feature,
                    left,
                    right,
                    ..
                } => *feature < n_features && *left < nodes.len() && *right < nodes.len(),
                TreeNode::Leaf { .. } => true,
            });
        if !valid {
            return Err(LearnError::InvalidTree(
                "nodes reference missing children or features".into(),
            ));
        }
        Ok(Self { nodes, n_features })
    }

    fn grow(
        &mut self,
        data: &Dataset,
        indices: Vec<usize>,
        depth: usize,
        params: &TreeParams,
        rng: &mut impl Rng,
    ) -> usize {
        let id = self.nodes.len();
        let value = mean_target(data, &indices);
        self.nodes.push(TreeNode::Leaf { value });

        let depth_left = params.max_depth.map_or(true, |max| depth < max);
        if !depth_left || indices.len() < params.min_samples_split.max(2) {
            return id;
        }
        let Some(choice) = self.best_split(data, &indices, params, rng) else {
            return id;
        };
        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| data.features()[i][choice.feature] <= choice.threshold);

        let left = self.grow(data, left_idx, depth + 1, params, rng);
        let right = self.grow(data, right_idx, depth + 1, params, rng);
        self.nodes[id] = TreeNode::Split {
            feature: choice.feature,
            threshold: choice.threshold,
            left,
            right,
        };
        id
    }

    // Maximizes the reduction in squared error; thresholds are midpoints
    // between consecutive distinct values.
    fn best_split(
        &self,
        data: &Dataset,
        indices: &[usize],
        params: &TreeParams,
        rng: &mut impl Rng,
    ) -> Option<SplitChoice> {
        let candidates: Vec<usize> = match params.max_features {
            Some(k) if k < self.n_features => sample(rng, self.n_features, k.max(1)).into_vec(),
            _ => (0..self.n_features).collect(),
        };

        let n = indices.len() as f64;
        let total: f64 = indices.iter().map(|&i| data.targets()[i]).sum();
        let parent = total * total / n;
        let mut best: Option<SplitChoice> = None;

        for feature in candidates {
            let mut order: Vec<(f64, f64)> = indices
                .iter()
                .map(|&i| (data.features()[i][feature], data.targets()[i]))
                .collect();
            order.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_sum = 0.0;
            for k in 0..order.len() - 1 {
                left_sum += order[k].1;
                let (here, next) = (order[k].0, order[k + 1].0);
                if here == next {
                    continue;
                }
                let n_left = (k + 1) as f64;
                let n_right = n - n_left;
                let right_sum = total - left_sum;
                // Maximizing sum^2/n per side is equivalent to minimizing SSE.
                let score = left_sum * left_sum / n_left + right_sum * right_sum / n_right - parent;
                if score > 1e-12 && best.as_ref().map_or(true, |b| score > b.score) {
                    best = Some(SplitChoice {
                        feature,
                        threshold: here + (next - here) / 2.0,
                        score,
                    });
                }
            }
        }
        best
    }

    pub fn predict_row(&self, x: &[f64]) -> f64 {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let v = x.get(*feature).copied().unwrap_or(0.0);
                    id = if v <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn root(&self) -> &TreeNode {
        &self.nodes[0]
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Number of splits on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[TreeNode], id: usize) -> usize {
            match &nodes[id] {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => {
                    1 + walk(nodes, *left).max(walk(nodes, *right))
                }
            }
        }
        walk(&self.nodes, 0)
    }
}

impl Regressor for RegressionTree {
    fn predict_row(&self, x: &[f64]) -> f64 {
        RegressionTree::predict_row(self, x)
    }
}

fn mean_target(data: &Dataset, indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| data.targets()[i]).sum::<f64>() / indices.len() as f64
}
