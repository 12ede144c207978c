//! The fitted mortality predictor.


use musselforge_config::TrainingConfig;
use musselforge_core::{Conditions, FeatureNormalizer, MergedRecord, MortalityPredictor};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dataset::{encode, prepare, Dataset, TrainingRow};
use crate::error::{LearnError, Result};
use crate::forest::{ForestParams, RandomForest};
use crate::metrics::{compare_models, ModelReport};
use crate::tree::{RegressionTree, TreeParams};

/// Prepared rows with the normalizer fitted over them.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    rows: Vec<TrainingRow>,
    normalizer: FeatureNormalizer,
    data: Dataset,
}

impl TrainingSet {
    pub fn prepare(records: &[MergedRecord], config: &TrainingConfig) -> Result<Self> {
        let rows = prepare(records, config.min_day);
        if rows.is_empty() {
            return Err(LearnError::EmptyDataset);
        }
        let normalizer = FeatureNormalizer::fit(rows.iter().map(|r| &r.conditions))?;
        let data = Dataset::from_rows(&rows, &normalizer);
        Ok(Self {
            rows,
            normalizer,
            data,
        })
    }

    pub fn rows(&self) -> &[TrainingRow] {
        &self.rows
    }

    pub fn normalizer(&self) -> &FeatureNormalizer {
        &self.normalizer
    }

    pub fn data(&self) -> &Dataset {
        &self.data
    }

    pub fn compare(&self, config: &TrainingConfig, seed: u64) -> Result<Vec<ModelReport>> {
        compare_models(&self.data, config, seed)
    }

    /// Depth-bounded tree over every row, for transcription into rules.
    pub fn surrogate(&self, max_depth: usize) -> Result<RegressionTree> {
        RegressionTree::fit(&self.data, TreeParams::default().with_max_depth(max_depth))
    }
}

/// Random forest fitted on the full training set, behind the normalizer it
/// was trained with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedPredictor {
    normalizer: FeatureNormalizer,
    forest: RandomForest,
}

impl TrainedPredictor {
    pub fn fit(set: &TrainingSet, config: &TrainingConfig, seed: u64) -> Result<Self> {
        let forest = RandomForest::fit(
            &set.data,
            ForestParams {
                n_trees: config.forest_trees,
                seed,
                ..ForestParams::default()
            },
        )?;
        info!(
            event = "model_trained",
            rows = set.data.len(),
            trees = forest.trees().len(),
            seed,
        );
        Ok(Self {
            normalizer: set.normalizer.clone(),
            forest,
        })
    }

    /// Prepares `records` and fits in one step.
    pub fn train(records: &[MergedRecord], config: &TrainingConfig, seed: u64) -> Result<Self> {
        Self::fit(&TrainingSet::prepare(records, config)?, config, seed)
    }

    pub fn normalizer(&self) -> &FeatureNormalizer {
        &self.normalizer
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }
}

impl MortalityPredictor for TrainedPredictor {
    fn predict(&self, conditions: &Conditions) -> f64 {
        let x = encode(&self.normalizer, conditions);
        self.forest.predict_row(&x).clamp(0.0, 1.0)
    }
}
