//! Subcommand implementations.

pub mod compare;
pub mod optimize;
pub mod predict;
pub mod rules;
pub mod search;
pub mod simulate;
pub mod sunlight;

use std::error::Error;

use musselforge::config::MusselConfig;
use musselforge::core::Observations;
use musselforge::learn::{TrainedPredictor, TrainingSet};
use tracing::info;

use crate::GlobalArgs;

pub type CliResult<T = ()> = Result<T, Box<dyn Error>>;

/// Global flags plus the loaded configuration.
pub struct Context {
    pub global: GlobalArgs,
    pub config: MusselConfig,
}

impl Context {
    pub fn new(global: GlobalArgs) -> CliResult<Self> {
        let config = match &global.config {
            Some(path) => MusselConfig::load(path)?,
            None => MusselConfig::default(),
        };
        Ok(Self { global, config })
    }

    pub fn observations(&self) -> CliResult<Observations> {
        Ok(Observations::load_dir(&self.global.data_dir)?)
    }

    pub fn training_set(&self) -> CliResult<TrainingSet> {
        let records = self.observations()?.merged_records();
        info!(event = "records_merged", rows = records.len());
        Ok(TrainingSet::prepare(&records, &self.config.training)?)
    }

    pub fn predictor(&self, set: &TrainingSet) -> CliResult<TrainedPredictor> {
        Ok(TrainedPredictor::fit(
            set,
            &self.config.training,
            self.config.random_seed,
        )?)
    }

    pub fn json(&self) -> bool {
        self.global.json
    }
}
