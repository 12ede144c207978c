//! Regression metrics and model comparison.


use std::fmt;

use musselforge_config::TrainingConfig;
use serde::Serialize;
use tracing::info;

use crate::dataset::Dataset;
use crate::error::{LearnError, Result};
use crate::forest::{ForestParams, RandomForest};
use crate::linear::LinearRegression;
use crate::tree::{RegressionTree, TreeParams};
use crate::Regressor;

pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p) * (a - p))
        .sum::<f64>()
        / actual.len() as f64
}

/// Coefficient of determination. A constant target scores 1 when predicted
/// exactly and 0 otherwise.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean) * (a - mean)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p) * (a - p))
        .sum();
    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub mse: f64,
    pub rmse: f64,
    pub r2: f64,
}

impl Metrics {
    pub fn evaluate(model: &impl Regressor, data: &Dataset) -> Self {
        let predicted = model.predict(data);
        let mse = mean_squared_error(data.targets(), &predicted);
        Self {
            mse,
            rmse: mse.sqrt(),
            r2: r2_score(data.targets(), &predicted),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    LinearRegression,
    DecisionTree,
    RandomForest,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModelKind::LinearRegression => "Linear Regression",
            ModelKind::DecisionTree => "Decision Tree",
            ModelKind::RandomForest => "Random Forest",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelReport {
    pub model: ModelKind,
    pub metrics: Metrics,
}

/// Fits the three model families on a seeded train split and scores each on
/// the held-out rows.
pub fn compare_models(
    data: &Dataset,
    config: &TrainingConfig,
    seed: u64,
) -> Result<Vec<ModelReport>> {
    let (train, test) = data.split(config.test_fraction, seed);
    if train.is_empty() || test.is_empty() {
        return Err(LearnError::EmptyDataset);
    }

    let linear = LinearRegression::fit(&train)?;
    let tree = RegressionTree::fit(&train, TreeParams::default())?;
    let forest = RandomForest::fit(
        &train,
        ForestParams {
            n_trees: config.forest_trees,
            seed,
            ..ForestParams::default()
        },
    )?;

    let reports = vec![
        ModelReport {
            model: ModelKind::LinearRegression,
            metrics: Metrics::evaluate(&linear, &test),
        },
        ModelReport {
            model: ModelKind::DecisionTree,
            metrics: Metrics::evaluate(&tree, &test),
        },
        ModelReport {
            model: ModelKind::RandomForest,
            metrics: Metrics::evaluate(&forest, &test),
        },
    ];
    for report in &reports {
        info!(
            event = "model_scored",
            model = %report.model,
            mse = report.metrics.mse,
            rmse = report.metrics.rmse,
            r2 = report.metrics.r2,
        );
    }
    Ok(reports)
}
