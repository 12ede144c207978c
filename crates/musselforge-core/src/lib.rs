//! MusselForge Core - Shared domain types for the mussel research workspace
//!
//! This crate provides:
//! - Track and treatment identity for the control/treatment experiment
//! - Observation tables with the day-fallback lookup chain
//! - Min-max feature normalization generic over concrete and symbolic scalars
//! - The mortality predictor seam
//! - The error taxonomy shared by every crate

pub mod error;
pub mod features;
pub mod normalize;
pub mod observations;
pub mod predictor;
pub mod track;

pub use error::{MusselError, Result};
pub use features::{Conditions, Feature, Features, Scalar};
pub use normalize::{FeatureNormalizer, FeatureRange};
pub use observations::{
    load_merged, read_csv, Covariate, DailySeries, Extrapolation, MergedRecord, MortalityRecord,
    ObservationTables, Observations, Resolved, ValueSource,
};
pub use predictor::MortalityPredictor;
pub use track::{Track, TreatmentFlag};
