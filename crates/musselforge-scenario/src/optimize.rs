//! Minimal copper dose under the decision rules.
//!
//! Unlike the bisection search, the rules are solver terms, so the whole
//! question is one optimization query: minimize copper subject to the rules
//! estimate strictly exceeding the target with treatment applied.


use std::fmt;

use musselforge_config::{OptimizeConfig, SolverSettings};
use musselforge_core::{Conditions, FeatureNormalizer, MortalityPredictor, TreatmentFlag};
use musselforge_learn::TrainingRow;
use musselforge_smt::{Model, SolverResult};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::builder::{ConditionVars, ScenarioBuilder};
use crate::error::Result;
use crate::rules::DecisionRules;
use crate::validate::{CrossValidation, CrossValidator, Threshold};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizeVerdict {
    Optimal,
    Infeasible,
    /// The solver budget ran out before a verdict.
    Undecided,
}

impl fmt::Display for OptimizeVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OptimizeVerdict::Optimal => "optimal",
            OptimizeVerdict::Infeasible => "infeasible",
            OptimizeVerdict::Undecided => "undecided",
        })
    }
}

/// Optimal conditions rounded for display: copper to 3 places, temperature
/// to 1, pH and dissolved oxygen to 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundedConditions {
    pub copper: Decimal,
    pub temperature: Decimal,
    pub ph: Decimal,
    pub dissolved_oxygen: Decimal,
}

impl fmt::Display for RoundedConditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Copper concentration: {}", self.copper)?;
        writeln!(f, "Temperature: {}", self.temperature)?;
        writeln!(f, "pH: {}", self.ph)?;
        write!(f, "Dissolved oxygen: {}", self.dissolved_oxygen)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OptimizeOutcome {
    pub verdict: OptimizeVerdict,
    pub target: f64,
    pub conditions: Option<Conditions>,
    /// Rules estimate at the optimum.
    pub estimate: Option<f64>,
    #[serde(skip)]
    rounded: Option<RoundedConditions>,
}

impl OptimizeOutcome {
    pub fn is_optimal(&self) -> bool {
        self.verdict == OptimizeVerdict::Optimal
    }

    pub fn rounded(&self) -> Option<&RoundedConditions> {
        self.rounded.as_ref()
    }
}

fn round(model: &Model, vars: &ConditionVars) -> Option<RoundedConditions> {
    Some(RoundedConditions {
        copper: model.decimal(&vars.copper, 3)?,
        temperature: model.decimal(&vars.temperature, 1)?,
        ph: model.decimal(&vars.ph, 2)?,
        dissolved_oxygen: model.decimal(&vars.dissolved_oxygen, 2)?,
    })
}

pub struct RulesOptimizer<'a> {
    config: &'a OptimizeConfig,
    settings: &'a SolverSettings,
    rules: &'a DecisionRules,
    normalizer: &'a FeatureNormalizer,
}

impl<'a> RulesOptimizer<'a> {
    pub fn new(
        config: &'a OptimizeConfig,
        settings: &'a SolverSettings,
        rules: &'a DecisionRules,
        normalizer: &'a FeatureNormalizer,
    ) -> Self {
        Self {
            config,
            settings,
            rules,
            normalizer,
        }
    }

    pub fn run(&self) -> Result<OptimizeOutcome> {
        let mut builder = ScenarioBuilder::new("rules_optimize", self.settings);
        let vars = ConditionVars::declare(
            &mut builder,
            self.config.copper,
            self.config.temperature,
            self.config.ph,
            self.config.dissolved_oxygen,
        )?;
        let estimate = builder.rules_estimate(
            self.rules,
            self.normalizer,
            vars.features(TreatmentFlag::Treated),
        );
        builder.require(estimate.gt(self.config.target_mortality));
        builder.minimize(&vars.copper);
        let mut scenario = builder.build();

        let outcome = match scenario.solve()? {
            SolverResult::Sat(model) => {
                let conditions = vars.conditions(&model, TreatmentFlag::Treated);
                let estimate = conditions.as_ref().map(|c| {
                    self.rules
                        .predict(&self.normalizer.normalize_conditions(c))
                });
                OptimizeOutcome {
                    verdict: OptimizeVerdict::Optimal,
                    target: self.config.target_mortality,
                    conditions,
                    estimate,
                    rounded: round(&model, &vars),
                }
            }
            other => OptimizeOutcome {
                verdict: if other.is_unsat() {
                    OptimizeVerdict::Infeasible
                } else {
                    OptimizeVerdict::Undecided
                },
                target: self.config.target_mortality,
                conditions: None,
                estimate: None,
                rounded: None,
            },
        };
        info!(
            event = "rules_optimized",
            verdict = %outcome.verdict,
            copper = outcome.conditions.as_ref().map(|c| c.copper),
            estimate = outcome.estimate,
        );
        Ok(outcome)
    }

    /// Recomputes the optimum with the predictor and finds its nearest
    /// observed row. `None` unless the outcome is optimal.
    pub fn cross_check<P: MortalityPredictor + ?Sized>(
        &self,
        outcome: &OptimizeOutcome,
        predictor: &P,
        rows: &[TrainingRow],
    ) -> Option<CrossValidation> {
        let conditions = outcome.conditions.as_ref()?;
        Some(CrossValidator::new(predictor, rows).validate(
            conditions,
            self.config.target_mortality,
            Threshold::Above,
            outcome.is_optimal(),
        ))
    }
}
