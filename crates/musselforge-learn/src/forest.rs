//! Bootstrap-aggregated regression forest.


use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dataset::Dataset;
use crate::error::{LearnError, Result};
use crate::tree::{RegressionTree, TreeParams};
use crate::Regressor;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestParams {
    pub n_trees: usize,
    pub tree: TreeParams,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            tree: TreeParams::default(),
            seed: 42,
        }
    }
}

/// Mean of bootstrap-trained trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    /// Trains `n_trees` trees in parallel. Each tree draws its bootstrap
    /// sample from its own seed, so the result does not depend on thread
    /// scheduling.
    pub fn fit(data: &Dataset, params: ForestParams) -> Result<Self> {
        if data.is_empty() {
            return Err(LearnError::EmptyDataset);
        }
        let mut master = ChaCha8Rng::seed_from_u64(params.seed);
        let seeds: Vec<u64> = (0..params.n_trees.max(1)).map(|_| master.random()).collect();

        let trees = seeds
            .into_par_iter()
            .map(|seed| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let n = data.len();
                let sample: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();
                RegressionTree::fit_with_rng(&data.subset(&sample), params.tree, &mut rng)
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(event = "forest_trained", trees = trees.len(), rows = data.len());
        Ok(Self { trees })
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    pub fn predict_row(&self, x: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict_row(x)).sum();
        sum / self.trees.len() as f64
    }
}

impl Regressor for RandomForest {
    fn predict_row(&self, x: &[f64]) -> f64 {
        RandomForest::predict_row(self, x)
    }
}
