//! Minimal copper dose by bisection.
//!
//! The predictor cannot be written as solver terms, so the search fixes
//! copper at the midpoint of the open interval, asks the solver for the
//! remaining conditions, and uses the predictor's output as the oracle.

#[cfg(test)]
mod tests;

use std::fmt;

use musselforge_config::{SearchConfig, SolverSettings};
use musselforge_core::{Conditions, MortalityPredictor, MusselError, TreatmentFlag};
use musselforge_smt::{Quantity, SolverResult};
use serde::Serialize;
use tracing::{debug, info};

use crate::builder::{ConditionVars, ScenarioBuilder};
use crate::error::Result;

/// Probes needed to shrink `width` to at most `tolerance`.
pub fn max_iterations(width: f64, tolerance: f64) -> u32 {
    if width <= tolerance {
        0
    } else {
        (width / tolerance).log2().ceil() as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeVerdict {
    /// Predicted mortality reaches the target.
    Meets,
    Misses,
    /// No conditions within bounds at this dose.
    Infeasible,
    /// The solver gave up; the search stops here.
    Undecided,
}

impl fmt::Display for ProbeVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProbeVerdict::Meets => "meets",
            ProbeVerdict::Misses => "misses",
            ProbeVerdict::Infeasible => "infeasible",
            ProbeVerdict::Undecided => "undecided",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Probe {
    pub copper: f64,
    pub conditions: Option<Conditions>,
    pub predicted: Option<f64>,
    pub verdict: ProbeVerdict,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    /// Smallest probed dose meeting the target, with its conditions.
    pub minimum: Option<Conditions>,
    pub predicted: Option<f64>,
    /// Final bracket.
    pub lower: f64,
    pub upper: f64,
    pub probes: Vec<Probe>,
    /// The last probe was undecided, so the bracket is not final.
    pub undecided: bool,
}

impl SearchOutcome {
    pub fn iterations(&self) -> usize {
        self.probes.len()
    }
}

pub struct CopperSearch<'a, P: ?Sized> {
    config: &'a SearchConfig,
    settings: &'a SolverSettings,
    predictor: &'a P,
    treatment: TreatmentFlag,
}

impl<'a, P: MortalityPredictor + ?Sized> CopperSearch<'a, P> {
    pub fn new(config: &'a SearchConfig, settings: &'a SolverSettings, predictor: &'a P) -> Self {
        Self {
            config,
            settings,
            predictor,
            treatment: TreatmentFlag::Treated,
        }
    }

    pub fn with_treatment(mut self, treatment: TreatmentFlag) -> Self {
        self.treatment = treatment;
        self
    }

    pub fn run(&self) -> Result<SearchOutcome> {
        let (Some(mut lo), Some(mut hi)) = (self.config.copper.min, self.config.copper.max) else {
            return Err(MusselError::InvalidData("copper search needs both bounds".into()).into());
        };

        let mut builder = ScenarioBuilder::new("copper_search", self.settings);
        let vars = ConditionVars::declare(
            &mut builder,
            self.config.copper,
            self.config.temperature,
            self.config.ph,
            self.config.dissolved_oxygen,
        )?;
        let mut scenario = builder.build();

        let budget = max_iterations(hi - lo, self.config.tolerance);
        let mut best: Option<(Conditions, f64)> = None;
        let mut probes = Vec::with_capacity(budget as usize);
        let mut undecided = false;

        while hi - lo > self.config.tolerance {
            let mid = lo + (hi - lo) / 2.0;
            let result = scenario.what_if(Quantity::from(&vars.copper).equals(mid))?;
            let probe = match result {
                SolverResult::Sat(model) => {
                    let conditions = vars.conditions(&model, self.treatment);
                    let predicted = conditions.as_ref().map(|c| self.predictor.predict(c));
                    let verdict = match predicted {
                        Some(p) if p >= self.config.target_mortality => ProbeVerdict::Meets,
                        _ => ProbeVerdict::Misses,
                    };
                    Probe {
                        copper: mid,
                        conditions,
                        predicted,
                        verdict,
                    }
                }
                SolverResult::Unsat => Probe {
                    copper: mid,
                    conditions: None,
                    predicted: None,
                    verdict: ProbeVerdict::Infeasible,
                },
                SolverResult::Unknown(_) => Probe {
                    copper: mid,
                    conditions: None,
                    predicted: None,
                    verdict: ProbeVerdict::Undecided,
                },
            };
            debug!(
                event = "bisection_probe",
                iteration = probes.len() + 1,
                copper = mid,
                predicted = probe.predicted,
                verdict = %probe.verdict,
            );

            match (probe.verdict, probe.conditions, probe.predicted) {
                (ProbeVerdict::Meets, Some(conditions), Some(predicted)) => {
                    hi = mid;
                    best = Some((conditions, predicted));
                }
                (ProbeVerdict::Undecided, _, _) => undecided = true,
                _ => lo = mid,
            }
            probes.push(probe);
            if undecided {
                break;
            }
        }

        info!(
            event = "bisection_done",
            iterations = probes.len(),
            budget,
            undecided,
            minimum = best.as_ref().map(|(c, _)| c.copper),
        );
        Ok(SearchOutcome {
            minimum: best.map(|(c, _)| c),
            predicted: best.map(|(_, p)| p),
            lower: lo,
            upper: hi,
            probes,
            undecided,
        })
    }
}
