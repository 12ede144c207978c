//! Time-stepped ecological simulation of the control and treatment tracks.
//!
//! Each track is one solver instance holding every simulated day. Day `t`
//! is defined only through day `t - 1` and day `t`'s exogenous inputs, so
//! the constraints fix each day in turn.

#[cfg(test)]
mod tests;

pub mod ecology;
mod track;

pub use track::{DayState, EndState, EndStateCheck, TrackOutcome, TrackSimulation, TrackVerdict};

use musselforge_config::MusselConfig;
use musselforge_core::{Observations, Track};
use serde::Serialize;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationOutcome {
    pub control: TrackOutcome,
    pub treatment: TrackOutcome,
}

impl SimulationOutcome {
    pub fn track(&self, track: Track) -> &TrackOutcome {
        match track {
            Track::Control => &self.control,
            Track::Treatment => &self.treatment,
        }
    }
}

/// Runs both tracks with separate solvers and no shared constraints.
pub struct Simulator<'a> {
    config: &'a MusselConfig,
    observations: &'a Observations,
}

impl<'a> Simulator<'a> {
    pub fn new(config: &'a MusselConfig, observations: &'a Observations) -> Self {
        Self {
            config,
            observations,
        }
    }

    pub fn build(&self, track: Track) -> Result<TrackSimulation> {
        TrackSimulation::build(track, self.config, self.observations)
    }

    pub fn run_track(&self, track: Track) -> Result<TrackOutcome> {
        self.build(track)?.solve()
    }

    pub fn run(&self) -> Result<SimulationOutcome> {
        Ok(SimulationOutcome {
            control: self.run_track(Track::Control)?,
            treatment: self.run_track(Track::Treatment)?,
        })
    }
}
