//! Error types for scenario construction.

use musselforge_core::{Covariate, MusselError, Track};
use musselforge_learn::LearnError;
use musselforge_smt::SolverError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    /// A required exogenous value is absent on the day and every earlier day.
    #[error("missing required input {covariate} for track {track} on day {day}")]
    MissingInput {
        covariate: Covariate,
        track: Track,
        day: u32,
    },

    #[error("scenario has no observation source for {0}")]
    NoObservations(String),

    #[error(transparent)]
    Core(MusselError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error(transparent)]
    Learn(#[from] LearnError),
}

impl From<MusselError> for ScenarioError {
    fn from(err: MusselError) -> Self {
        match err {
            MusselError::MissingData {
                covariate,
                track,
                day,
            } => ScenarioError::MissingInput {
                covariate,
                track,
                day,
            },
            other => ScenarioError::Core(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScenarioError>;
