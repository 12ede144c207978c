//! MusselForge Scenario - Constraint scenarios over the mussel experiment
//!
//! This crate provides:
//! - [`DecisionRules`], the piecewise mortality estimate usable in constraints
//! - [`ScenarioBuilder`] for bounded variables, observed inputs and implications
//! - [`CopperSearch`], the predictor-driven bisection for a minimal copper dose
//! - [`RulesOptimizer`], the rules-driven copper minimization
//! - [`Simulator`], the day-by-day control and treatment tracks
//! - [`CrossValidator`], predictor agreement and nearest observed row
//! - Sunlight penetration scenarios

pub mod builder;
pub mod error;
pub mod optimize;
pub mod rules;
pub mod search;
pub mod simulate;
pub mod sunlight;
pub mod validate;

pub use builder::{ConditionVars, Objective, Scenario, ScenarioBuilder};
pub use error::{Result, ScenarioError};
pub use optimize::{OptimizeOutcome, OptimizeVerdict, RoundedConditions, RulesOptimizer};
pub use rules::{DecisionRules, RuleNode, MAX_DEPTH};
pub use search::{max_iterations, CopperSearch, Probe, ProbeVerdict, SearchOutcome};
pub use simulate::{
    DayState, EndState, EndStateCheck, SimulationOutcome, Simulator, TrackOutcome,
    TrackSimulation, TrackVerdict,
};
pub use sunlight::{clearest_density, ClarityOptimum, Segment, SunlightYear, SunlightYearOutcome};
pub use validate::{
    nearest_neighbor, Agreement, CrossValidation, CrossValidator, NeighborMatch, Threshold,
};
