//! Assembles solvable scenarios.
//!
//! A [`ScenarioBuilder`] owns one solver. Variables are declared with their
//! bounds, exogenous values are pinned from observations through the
//! day-fallback chain, and relations are added as conditions. `build`
//! returns a [`Scenario`] that is solved once and discarded.


use musselforge_config::{Bounds, SolverSettings};
use musselforge_core::{
    Conditions, Covariate, Extrapolation, FeatureNormalizer, Features, Observations, Resolved,
    Track, TreatmentFlag,
};
use musselforge_smt::{Condition, Formula, Model, Quantity, Solver, SolverResult, Term, Variable};
use tracing::info;

use crate::error::{Result, ScenarioError};
use crate::rules::DecisionRules;

/// Single optimization directive.
#[derive(Debug, Clone, PartialEq)]
pub enum Objective {
    Minimize(Term),
    Maximize(Term),
}

pub struct ScenarioBuilder<'a> {
    name: String,
    solver: Solver,
    observations: Option<&'a Observations>,
    objective: Option<Objective>,
}

impl<'a> ScenarioBuilder<'a> {
    pub fn new(name: impl Into<String>, settings: &SolverSettings) -> Self {
        Self {
            name: name.into(),
            solver: Solver::with_settings(settings),
            observations: None,
            objective: None,
        }
    }

    pub fn with_observations(mut self, observations: &'a Observations) -> Self {
        self.observations = Some(observations);
        self
    }

    /// Declares a real variable. Fully open `bounds` leave it unbounded,
    /// which [`Scenario::solve`] rejects.
    pub fn real(&mut self, name: &str, bounds: Bounds) -> Result<Variable> {
        let var = self.solver.real(name);
        self.apply(&var, bounds)?;
        Ok(var)
    }

    pub fn int(&mut self, name: &str, bounds: Bounds) -> Result<Variable> {
        let var = self.solver.int(name);
        self.apply(&var, bounds)?;
        Ok(var)
    }

    fn apply(&mut self, var: &Variable, bounds: Bounds) -> Result<()> {
        match (bounds.min, bounds.max) {
            (Some(lo), Some(hi)) => self.solver.bound(var, lo, hi)?,
            (Some(lo), None) => self.solver.at_least(var, lo)?,
            (None, Some(hi)) => self.solver.at_most(var, hi)?,
            (None, None) => {}
        }
        Ok(())
    }

    /// `lo <= var <= hi`.
    pub fn range(&mut self, var: &Variable, lo: f64, hi: f64) -> Result<()> {
        self.solver.bound(var, lo, hi)?;
        Ok(())
    }

    /// Restricts `var` to an enumerated set of levels.
    pub fn levels(&mut self, var: &Variable, levels: &[f64]) -> Result<()> {
        self.solver.levels(var, levels)?;
        Ok(())
    }

    fn source(&self) -> Result<&'a Observations> {
        self.observations
            .ok_or_else(|| ScenarioError::NoObservations(self.name.clone()))
    }

    /// Pins `var` to the observed value for `day`, or the nearest prior day.
    pub fn observed(
        &mut self,
        var: &Variable,
        covariate: Covariate,
        track: Track,
        day: u32,
    ) -> Result<Resolved> {
        let resolved = self.source()?.observed(covariate, track, day)?;
        self.define(var, resolved.value);
        Ok(resolved)
    }

    /// Pins `var` to an observed or extrapolated value.
    pub fn resolved(
        &mut self,
        var: &Variable,
        covariate: Covariate,
        track: Track,
        day: u32,
        observed_through: u32,
        extrapolation: Extrapolation,
    ) -> Result<Resolved> {
        let resolved =
            self.source()?
                .resolve(covariate, track, day, observed_through, extrapolation)?;
        self.define(var, resolved.value);
        Ok(resolved)
    }

    /// `var == value`.
    pub fn define(&mut self, var: &Variable, value: impl Into<Quantity>) {
        self.solver
            .assert(Formula::eq(var, value.into().into_term()));
    }

    /// Adds a condition. A decided `false` makes the scenario infeasible.
    pub fn require(&mut self, condition: Condition) {
        match condition {
            Condition::Concrete(true) => {}
            other => self.solver.assert(other.into_formula()),
        }
    }

    /// `premise => conclusion`.
    pub fn implies(&mut self, premise: Condition, conclusion: Condition) {
        self.require(premise.implies(conclusion));
    }

    /// Rules estimate over raw feature quantities, normalized first.
    pub fn rules_estimate(
        &self,
        rules: &DecisionRules,
        normalizer: &FeatureNormalizer,
        raw: Features<Quantity>,
    ) -> Quantity {
        rules.evaluate(&normalizer.normalize(raw))
    }

    pub fn minimize(&mut self, objective: impl Into<Term>) {
        self.objective = Some(Objective::Minimize(objective.into()));
    }

    pub fn maximize(&mut self, objective: impl Into<Term>) {
        self.objective = Some(Objective::Maximize(objective.into()));
    }

    pub fn solver(&self) -> &Solver {
        &self.solver
    }

    pub fn build(self) -> Scenario {
        info!(
            event = "scenario_built",
            scenario = %self.name,
            variables = self.solver.variables().count(),
            constraints = self.solver.assertions().len(),
            optimize = self.objective.is_some(),
        );
        Scenario {
            name: self.name,
            solver: self.solver,
            objective: self.objective,
        }
    }
}

/// Variables, constraints and an optional objective, ready to solve.
#[derive(Debug, Clone)]
pub struct Scenario {
    name: String,
    solver: Solver,
    objective: Option<Objective>,
}

impl Scenario {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    /// Checks feasibility, or optimizes when an objective is set.
    pub fn solve(&mut self) -> Result<SolverResult> {
        let result = match self.objective.clone() {
            None => self.solver.check()?,
            Some(Objective::Minimize(term)) => self.solver.minimize(term)?,
            Some(Objective::Maximize(term)) => self.solver.maximize(term)?,
        };
        Ok(result)
    }

    /// Feasibility with `condition` added for this check only.
    pub fn what_if(&mut self, condition: Condition) -> Result<SolverResult> {
        let mut scope = self.solver.scope();
        match condition {
            Condition::Concrete(true) => {}
            other => scope.assert(other.into_formula()),
        }
        Ok(scope.check()?)
    }

    pub fn variable(&self, name: &str) -> Result<Variable> {
        Ok(self.solver.variable(name)?)
    }

    pub fn solver(&self) -> &Solver {
        &self.solver
    }

    pub fn solver_mut(&mut self) -> &mut Solver {
        &mut self.solver
    }
}

/// The four continuous predictor inputs as decision variables.
#[derive(Debug, Clone)]
pub struct ConditionVars {
    pub copper: Variable,
    pub temperature: Variable,
    pub ph: Variable,
    pub dissolved_oxygen: Variable,
}

impl ConditionVars {
    pub fn declare(
        builder: &mut ScenarioBuilder<'_>,
        copper: Bounds,
        temperature: Bounds,
        ph: Bounds,
        dissolved_oxygen: Bounds,
    ) -> Result<Self> {
        Ok(Self {
            copper: builder.real("copper_conc", copper)?,
            temperature: builder.real("temperature", temperature)?,
            ph: builder.real("ph", ph)?,
            dissolved_oxygen: builder.real("dissolved_oxygen", dissolved_oxygen)?,
        })
    }

    /// Raw symbolic features with a fixed treatment flag.
    pub fn features(&self, treatment: TreatmentFlag) -> Features<Quantity> {
        Features {
            copper: Quantity::from(&self.copper),
            temperature: Quantity::from(&self.temperature),
            ph: Quantity::from(&self.ph),
            dissolved_oxygen: Quantity::from(&self.dissolved_oxygen),
            treatment: Quantity::Concrete(treatment.as_f64()),
        }
    }

    pub fn conditions(&self, model: &Model, treatment: TreatmentFlag) -> Option<Conditions> {
        Some(Conditions::new(
            model.get(&self.copper)?,
            model.get(&self.temperature)?,
            model.get(&self.ph)?,
            model.get(&self.dissolved_oxygen)?,
            treatment,
        ))
    }
}
