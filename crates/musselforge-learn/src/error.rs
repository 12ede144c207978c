//! Error types for model training.

use musselforge_core::MusselError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LearnError {
    #[error("no usable training rows")]
    EmptyDataset,

    #[error("expected {expected} features per row, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("invalid tree: {0}")]
    InvalidTree(String),

    #[error("normal equations are singular")]
    SingularSystem,

    #[error(transparent)]
    Core(#[from] MusselError),
}

pub type Result<T> = std::result::Result<T, LearnError>;
