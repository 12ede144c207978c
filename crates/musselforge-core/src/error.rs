//! Error types for MusselForge

use thiserror::Error;

use crate::observations::Covariate;
use crate::track::Track;

/// Main error type for MusselForge data and model operations
#[derive(Debug, Error)]
pub enum MusselError {
    /// An exogenous lookup found no value for the day or any fallback
    #[error("missing required input: no {covariate} value for {track} track on day {day} or any fallback")]
    MissingData {
        covariate: Covariate,
        track: Track,
        day: u32,
    },

    /// A feature range collapsed to a single value (or is not finite)
    #[error("degenerate normalization for {feature}: observed range collapses at {value}")]
    DegenerateNormalization { feature: String, value: f64 },

    /// Decision rules violate depth, leaf or threshold invariants
    #[error("invalid decision rules: {0}")]
    InvalidRules(String),

    /// Input tables are inconsistent or unusable
    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for MusselForge operations
pub type Result<T> = std::result::Result<T, MusselError>;
