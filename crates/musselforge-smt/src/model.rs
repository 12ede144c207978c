//! Satisfying assignments.

use std::fmt;
use std::sync::Arc;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::eval::{eval_formula, eval_term};
use crate::term::{Formula, Term, Variable};

/// A concrete value for every declared variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    vars: Arc<[Variable]>,
    values: Vec<f64>,
    objective: Option<f64>,
}

impl Model {
    pub(crate) fn new(vars: Arc<[Variable]>, values: Vec<f64>) -> Self {
        Self {
            vars,
            values,
            objective: None,
        }
    }

    pub(crate) fn with_objective(mut self, objective: f64) -> Self {
        self.objective = Some(objective);
        self
    }

    /// Value of `variable`, or `None` if it belongs to another solver.
    pub fn get(&self, variable: &Variable) -> Option<f64> {
        let i = variable.id().index();
        match self.vars.get(i) {
            Some(v) if v == variable => self.values.get(i).copied(),
            _ => None,
        }
    }

    pub fn value_of(&self, name: &str) -> Option<f64> {
        self.vars
            .iter()
            .position(|v| v.name() == name)
            .and_then(|i| self.values.get(i).copied())
    }

    pub fn eval(&self, term: &Term) -> f64 {
        eval_term(term, &self.values)
    }

    /// Exact evaluation of `formula` under this assignment.
    pub fn satisfies(&self, formula: &Formula) -> bool {
        eval_formula(formula, &self.values, 0.0)
    }

    /// Achieved objective value of an optimization query.
    pub fn objective(&self) -> Option<f64> {
        self.objective
    }

    /// Value of `variable` rounded to `dp` decimal places.
    pub fn decimal(&self, variable: &Variable, dp: u32) -> Option<Decimal> {
        self.get(variable)
            .and_then(Decimal::from_f64)
            .map(|d| d.round_dp(dp))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variable, f64)> {
        self.vars.iter().zip(self.values.iter().copied())
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (var, value) in self.iter() {
            writeln!(f, "{var} = {value}")?;
        }
        if let Some(objective) = self.objective {
            writeln!(f, "objective = {objective}")?;
        }
        Ok(())
    }
}
