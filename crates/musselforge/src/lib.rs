//! MusselForge - Zebra mussel population and copper treatment scenarios
//!
//! Trains a mortality predictor on the tank experiment, then asks a
//! constraint solver which conditions reach a target mortality and how the
//! lake evolves day by day under control and treatment.
//!
//! # Example
//!
//! ```rust
//! use musselforge::prelude::*;
//!
//! let mut solver = Solver::new();
//! let copper = solver.real("copper");
//! solver.bound(&copper, 0.0, 0.55).unwrap();
//! solver.assert(Formula::ge(&copper, 0.2));
//! let model = solver.check().unwrap().into_model().unwrap();
//! assert!(model.get(&copper).unwrap() >= 0.2);
//! ```

pub mod console;

pub use musselforge_config as config;
pub use musselforge_core as core;
pub use musselforge_learn as learn;
pub use musselforge_scenario as scenario;
pub use musselforge_smt as smt;

pub mod prelude {
    pub use musselforge_config::{Bounds, MusselConfig, PopulationRule, SolverSettings};
    pub use musselforge_core::{
        Conditions, Covariate, Feature, FeatureNormalizer, Features, MortalityPredictor,
        MusselError, Observations, Track, TreatmentFlag,
    };
    pub use musselforge_learn::{compare_models, TrainedPredictor, TrainingSet};
    pub use musselforge_scenario::{
        CopperSearch, CrossValidator, DecisionRules, EndState, RulesOptimizer, ScenarioBuilder,
        ScenarioError, Simulator, SunlightYear,
    };
    pub use musselforge_smt::{Condition, Formula, Model, Quantity, Solver, SolverResult, Term};
}
