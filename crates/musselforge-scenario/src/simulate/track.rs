//! One track's horizon as a single constraint system.

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::fmt;

use musselforge_config::{Bounds, InitialPopulation, MusselConfig, PopulationRule};
use musselforge_core::{Covariate, MusselError, Observations, Resolved, Track};
use musselforge_smt::{Condition, Model, Quantity, SolverResult, Variable};
use serde::Serialize;
use tracing::info;

use super::ecology;
use crate::builder::{Scenario, ScenarioBuilder};
use crate::error::{Result, ScenarioError};

/// Final-day states probed in a scope on a built track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndState {
    /// Population at most 1% of its initial size and clarity at least 0.95.
    Eradication,
    /// Clarity below 0.4.
    LowClarity,
    /// Population at most 20% of its initial size.
    TargetPopulation,
}

impl EndState {
    pub const ALL: [EndState; 3] = [
        EndState::Eradication,
        EndState::LowClarity,
        EndState::TargetPopulation,
    ];
}

impl fmt::Display for EndState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EndState::Eradication => "eradication",
            EndState::LowClarity => "low clarity",
            EndState::TargetPopulation => "target population",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackVerdict {
    Solved,
    Infeasible,
    Undecided,
}

impl fmt::Display for TrackVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TrackVerdict::Solved => "solved",
            TrackVerdict::Infeasible => "infeasible",
            TrackVerdict::Undecided => "undecided",
        })
    }
}

/// Solved state of one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayState {
    pub day: u32,
    pub population: f64,
    pub clarity: f64,
    pub plant_growth: f64,
    pub oxygen_level: f64,
    pub covariates: BTreeMap<Covariate, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndStateCheck {
    pub end_state: EndState,
    /// `None` when the solver could not decide.
    pub reachable: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackOutcome {
    pub track: Track,
    pub verdict: TrackVerdict,
    pub initial_population: f64,
    pub trajectory: Vec<DayState>,
    /// Covariate lookups that used a fallback, as `(day, covariate, resolved)`.
    pub fallbacks: Vec<(u32, Covariate, Resolved)>,
    pub end_states: Vec<EndStateCheck>,
}

struct DayVars {
    population: Variable,
    clarity: Variable,
    plant_growth: Variable,
    oxygen_level: Variable,
    copper: Variable,
    covariates: Vec<(Covariate, Variable)>,
}

impl DayVars {
    fn state(&self, day: u32, model: &Model) -> Option<DayState> {
        let covariates = self
            .covariates
            .iter()
            .map(|(c, var)| model.get(var).map(|v| (*c, v)))
            .collect::<Option<BTreeMap<_, _>>>()?;
        Some(DayState {
            day,
            population: model.get(&self.population)?,
            clarity: model.get(&self.clarity)?,
            plant_growth: model.get(&self.plant_growth)?,
            oxygen_level: model.get(&self.oxygen_level)?,
            covariates,
        })
    }
}

fn covariate_bounds(covariate: Covariate) -> Bounds {
    match covariate {
        Covariate::Ph => Bounds::between(0.0, 14.0),
        _ => Bounds::at_least(0.0),
    }
}

/// A track's variables and constraints for every simulated day.
pub struct TrackSimulation {
    track: Track,
    scenario: Scenario,
    days: Vec<DayVars>,
    initial_population: f64,
    fallbacks: Vec<(u32, Covariate, Resolved)>,
}

impl TrackSimulation {
    /// Builds `Day(0)` through `Day(horizon - 1)`.
    ///
    /// # Errors
    ///
    /// [`ScenarioError::MissingInput`](crate::ScenarioError::MissingInput)
    /// when a covariate has no observation for a day or any fallback.
    pub fn build(track: Track, config: &MusselConfig, observations: &Observations) -> Result<Self> {
        let eco = &config.ecology;
        let sim = &config.simulation;
        if sim.horizon_days == 0 {
            return Err(MusselError::InvalidData(
                "simulation horizon must be at least one day".into(),
            )
            .into());
        }
        let ns = track.namespace();
        let mut builder = ScenarioBuilder::new(format!("simulate_{ns}"), &config.solver)
            .with_observations(observations);

        let initial_population = match sim.initial_population {
            InitialPopulation::Fixed { count } => f64::from(count),
            InitialPopulation::Observed { day } => {
                observations.observed(Covariate::Alive, track, day)?.value.floor()
            }
        }
        .min(eco.carrying_capacity);

        let mut days: Vec<DayVars> = Vec::with_capacity(sim.horizon_days as usize);
        let mut fallbacks = Vec::new();

        for t in 0..sim.horizon_days {
            let population = builder.int(
                &format!("population_{ns}_{t}"),
                Bounds::between(0.0, eco.carrying_capacity),
            )?;
            let clarity = builder.real(&format!("clarity_{ns}_{t}"), Bounds::between(0.0, 1.0))?;
            let plant_growth = builder.real(
                &format!("plant_growth_{ns}_{t}"),
                Bounds::between(0.0, eco.max_plant_growth),
            )?;
            let oxygen_level =
                builder.real(&format!("oxygen_level_{ns}_{t}"), Bounds::between(0.0, 1.0))?;

            let mut covariates = Vec::with_capacity(Covariate::ENVIRONMENT.len());
            let mut copper = None;
            for covariate in Covariate::ENVIRONMENT {
                let var = builder.real(
                    &format!("{}_{ns}_{t}", covariate.name()),
                    covariate_bounds(covariate),
                )?;
                let resolved = builder.resolved(
                    &var,
                    covariate,
                    track,
                    t,
                    sim.observed_through_day,
                    sim.extrapolation,
                )?;
                if resolved.is_fallback() {
                    fallbacks.push((t, covariate, resolved));
                }
                if covariate == Covariate::Copper {
                    copper = Some(var.clone());
                }
                covariates.push((covariate, var));
            }
            let copper = copper.ok_or(ScenarioError::MissingInput {
                covariate: Covariate::Copper,
                track,
                day: t,
            })?;

            let pop_t = Quantity::from(&population);
            let clarity_t = Quantity::from(&clarity);
            let plants_t = Quantity::from(&plant_growth);

            match days.last() {
                None => {
                    builder.define(&population, initial_population);
                    builder.define(&clarity, sim.initial_clarity);
                    builder.define(&oxygen_level, sim.initial_oxygen);
                }
                Some(prev) => {
                    let prev_pop = Quantity::from(&prev.population);
                    let prev_clarity = Quantity::from(&prev.clarity);
                    let prev_oxygen = Quantity::from(&prev.oxygen_level);
                    let prev_copper = Quantity::from(&prev.copper);

                    let modeled = || {
                        let mortality = ecology::mortality_factor(eco, &prev_copper);
                        ecology::next_population(eco, &prev_pop, &prev_oxygen, &mortality)
                    };
                    let next_pop = match sim.track(track).population_rule {
                        PopulationRule::Logistic => modeled(),
                        PopulationRule::Observed { through_day } if t <= through_day => {
                            match observations.mean_at(Covariate::Alive, track, t) {
                                Some(alive) => {
                                    Quantity::Concrete(alive.floor().min(eco.carrying_capacity))
                                }
                                None => prev_pop.clone(),
                            }
                        }
                        PopulationRule::Observed { .. } => modeled(),
                    };
                    builder.define(&population, next_pop);
                    builder.define(&clarity, ecology::next_clarity(eco, &prev_clarity, &pop_t));
                    if sim.clarity_monotone {
                        builder.require(clarity_t.ge(prev_clarity));
                    }
                    builder.define(
                        &oxygen_level,
                        ecology::next_oxygen(eco, &prev_oxygen, &plants_t, &pop_t),
                    );
                }
            }
            builder.define(&plant_growth, ecology::plant_growth(eco, &clarity_t));

            if sim.domain_rules {
                let copper_t = Quantity::from(&copper);
                for (premise, conclusion) in ecology::domain_rules(
                    eco,
                    initial_population,
                    &pop_t,
                    &clarity_t,
                    &plants_t,
                    &copper_t,
                ) {
                    builder.implies(premise, conclusion);
                }
            }

            days.push(DayVars {
                population,
                clarity,
                plant_growth,
                oxygen_level,
                copper,
                covariates,
            });
        }

        info!(
            event = "track_built",
            track = %track,
            days = days.len(),
            initial_population,
            fallbacks = fallbacks.len(),
        );
        Ok(Self {
            track,
            scenario: builder.build(),
            days,
            initial_population,
            fallbacks,
        })
    }

    pub fn track(&self) -> Track {
        self.track
    }

    pub fn horizon(&self) -> usize {
        self.days.len()
    }

    pub fn initial_population(&self) -> f64 {
        self.initial_population
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Copper concentration variable of `day`, which drives the next day's
    /// mortality.
    pub fn copper(&self, day: u32) -> Option<&Variable> {
        self.days.get(day as usize).map(|d| &d.copper)
    }

    pub fn fallbacks(&self) -> &[(u32, Covariate, Resolved)] {
        &self.fallbacks
    }

    fn end_condition(&self, end_state: EndState) -> Condition {
        let Some(last) = self.days.last() else {
            return Condition::Concrete(false);
        };
        let population = Quantity::from(&last.population);
        let clarity = Quantity::from(&last.clarity);
        match end_state {
            EndState::Eradication => population
                .le(0.01 * self.initial_population)
                .and(clarity.ge(0.95)),
            EndState::LowClarity => clarity.lt(0.4),
            EndState::TargetPopulation => population.le(0.2 * self.initial_population),
        }
    }

    /// Whether `end_state` is reachable; the added constraint is scoped.
    pub fn what_if(&mut self, end_state: EndState) -> Result<SolverResult> {
        let condition = self.end_condition(end_state);
        self.scenario.what_if(condition)
    }

    pub fn solve(&mut self) -> Result<TrackOutcome> {
        let result = self.scenario.solve()?;
        let (verdict, trajectory) = match &result {
            SolverResult::Sat(model) => {
                let trajectory = self
                    .days
                    .iter()
                    .zip(0u32..)
                    .map(|(vars, day)| vars.state(day, model))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| {
                        MusselError::InvalidData(format!(
                            "model for {} track is missing a variable",
                            self.track
                        ))
                    })?;
                (TrackVerdict::Solved, trajectory)
            }
            SolverResult::Unsat => (TrackVerdict::Infeasible, Vec::new()),
            SolverResult::Unknown(_) => (TrackVerdict::Undecided, Vec::new()),
        };

        let mut end_states = Vec::new();
        if verdict == TrackVerdict::Solved {
            for end_state in EndState::ALL {
                let reachable = match self.what_if(end_state)? {
                    SolverResult::Sat(_) => Some(true),
                    SolverResult::Unsat => Some(false),
                    SolverResult::Unknown(_) => None,
                };
                end_states.push(EndStateCheck {
                    end_state,
                    reachable,
                });
            }
        }

        info!(
            event = "track_solved",
            track = %self.track,
            verdict = %verdict,
            final_population = trajectory.last().map(|d| d.population),
            final_clarity = trajectory.last().map(|d| d.clarity),
        );
        Ok(TrackOutcome {
            track: self.track,
            verdict,
            initial_population: self.initial_population,
            trajectory,
            fallbacks: self.fallbacks.clone(),
            end_states,
        })
    }
}
