//! MusselForge Learn - Mortality regression models
//!
//! This crate provides:
//! - Training-set preparation from merged observation records
//! - CART regression trees and a bootstrap random forest
//! - Ordinary least squares
//! - MSE/RMSE/R² metrics and a three-model comparison
//! - [`TrainedPredictor`], the fitted [`MortalityPredictor`](musselforge_core::MortalityPredictor)

pub mod dataset;
pub mod error;
pub mod forest;
pub mod linear;
pub mod metrics;
pub mod predictor;
pub mod tree;

pub use dataset::{
    encode, prepare, Dataset, TrainingRow, FEATURE_NAMES, N_FEATURES, TREATMENT_C, TREATMENT_T,
};
pub use error::{LearnError, Result};
pub use forest::{ForestParams, RandomForest};
pub use linear::LinearRegression;
pub use metrics::{compare_models, mean_squared_error, r2_score, Metrics, ModelKind, ModelReport};
pub use predictor::{TrainedPredictor, TrainingSet};
pub use tree::{RegressionTree, TreeNode, TreeParams};

/// A fitted model over encoded feature rows.
pub trait Regressor {
    fn predict_row(&self, x: &[f64]) -> f64;

    fn predict(&self, data: &Dataset) -> Vec<f64> {
        data.features().iter().map(|x| self.predict_row(x)).collect()
    }
}
