//! The constraint solver adapter.
//!
//! A [`Solver`] owns a constraint store of declared variables, their
//! bounds and asserted formulas. [`Solver::check`] decides satisfiability
//! with the branch-and-prune backend; [`Solver::minimize`] and
//! [`Solver::maximize`] bisect on the objective value using repeated
//! scoped checks.
//!
//! # Examples
//!
//! ```
//! use musselforge_smt::{Formula, Solver};
//!
//! let mut solver = Solver::new();
//! let x = solver.real("x");
//! solver.bound(&x, 0.0, 10.0).unwrap();
//! solver.assert(Formula::ge(&x * 2.0, 3.0));
//!
//! let result = solver.minimize(&x).unwrap();
//! let model = result.model().unwrap();
//! assert!((model.get(&x).unwrap() - 1.5).abs() < 1e-4);
//! ```

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::{Duration, Instant};

use musselforge_config::SolverSettings;
use tracing::{debug, info};

use crate::error::SolverError;
use crate::interval::Interval;
use crate::model::Model;
use crate::propagate::Propagator;
use crate::search::{BranchAndPrune, Budget, Outcome};
use crate::term::{CmpOp, Formula, Sort, Term, VarId, Variable};

const MAX_OPTIMIZE_STEPS: usize = 128;

/// Why a check gave up without a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownReason {
    NodeLimit,
    TimeLimit,
    /// Boxes narrower than the precision could be neither refuted nor
    /// satisfied.
    Precision,
    /// The objective decreased without limit.
    Unbounded,
}

impl fmt::Display for UnknownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnknownReason::NodeLimit => "node limit reached",
            UnknownReason::TimeLimit => "time limit reached",
            UnknownReason::Precision => "precision exhausted",
            UnknownReason::Unbounded => "objective unbounded",
        })
    }
}

/// Verdict of a check or optimization.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverResult {
    Sat(Model),
    Unsat,
    /// The budget ran out; never reported as satisfiable.
    Unknown(UnknownReason),
}

impl SolverResult {
    pub fn is_sat(&self) -> bool {
        matches!(self, SolverResult::Sat(_))
    }

    pub fn is_unsat(&self) -> bool {
        matches!(self, SolverResult::Unsat)
    }

    pub fn model(&self) -> Option<&Model> {
        match self {
            SolverResult::Sat(model) => Some(model),
            _ => None,
        }
    }

    pub fn into_model(self) -> Option<Model> {
        match self {
            SolverResult::Sat(model) => Some(model),
            _ => None,
        }
    }

    fn verdict(&self) -> &'static str {
        match self {
            SolverResult::Sat(_) => "sat",
            SolverResult::Unsat => "unsat",
            SolverResult::Unknown(_) => "unknown",
        }
    }
}

impl fmt::Display for SolverResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverResult::Unknown(reason) => write!(f, "unknown ({reason})"),
            other => f.write_str(other.verdict()),
        }
    }
}

#[derive(Debug, Clone)]
struct VarDecl {
    var: Variable,
    domain: Interval,
    bounded: bool,
}

#[derive(Debug, Clone)]
struct ScopeMark {
    assertions: usize,
    decls: Vec<VarDecl>,
}

/// An independent constraint store.
#[derive(Debug, Clone)]
pub struct Solver {
    decls: Vec<VarDecl>,
    by_name: HashMap<Arc<str>, VarId>,
    assertions: Vec<Formula>,
    scopes: Vec<ScopeMark>,
    node_limit: u64,
    time_limit: Option<Duration>,
    precision: f64,
}

impl Default for Solver {
    fn default() -> Self {
        Self::with_settings(&SolverSettings::default())
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: &SolverSettings) -> Self {
        Self {
            decls: Vec::new(),
            by_name: HashMap::new(),
            assertions: Vec::new(),
            scopes: Vec::new(),
            node_limit: settings.node_limit,
            time_limit: settings.time_limit(),
            precision: settings.precision,
        }
    }

    /// Declares a variable. Redeclaring a name returns the existing one.
    pub fn declare(&mut self, name: &str, sort: Sort) -> Variable {
        if let Some(&id) = self.by_name.get(name) {
            return self.decls[id.index()].var.clone();
        }
        let id = VarId(self.decls.len());
        let name: Arc<str> = Arc::from(name);
        let var = Variable::new(id, name.clone(), sort);
        self.decls.push(VarDecl {
            var: var.clone(),
            domain: Interval::ENTIRE,
            bounded: false,
        });
        self.by_name.insert(name, id);
        var
    }

    pub fn int(&mut self, name: &str) -> Variable {
        self.declare(name, Sort::Int)
    }

    pub fn real(&mut self, name: &str) -> Variable {
        self.declare(name, Sort::Real)
    }

    pub fn variable(&self, name: &str) -> Result<Variable, SolverError> {
        self.by_name
            .get(name)
            .map(|id| self.decls[id.index()].var.clone())
            .ok_or_else(|| SolverError::UnknownVariable(name.to_string()))
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.decls.iter().map(|d| &d.var)
    }

    pub fn assertions(&self) -> &[Formula] {
        &self.assertions
    }

    /// Restricts `variable` to `[lo, hi]`; either side may be infinite.
    pub fn bound(&mut self, variable: &Variable, lo: f64, hi: f64) -> Result<(), SolverError> {
        if lo.is_nan() || hi.is_nan() || lo > hi {
            return Err(SolverError::InvalidBound {
                name: variable.name().to_string(),
                lo,
                hi,
            });
        }
        let decl = self.decl_mut(variable)?;
        decl.domain = decl.domain.intersect(&Interval::new(lo, hi), 0.0);
        decl.bounded = true;
        Ok(())
    }

    pub fn at_least(&mut self, variable: &Variable, lo: f64) -> Result<(), SolverError> {
        self.bound(variable, lo, f64::INFINITY)
    }

    pub fn at_most(&mut self, variable: &Variable, hi: f64) -> Result<(), SolverError> {
        self.bound(variable, f64::NEG_INFINITY, hi)
    }

    /// Restricts `variable` to an enumerated set of values.
    pub fn levels(&mut self, variable: &Variable, levels: &[f64]) -> Result<(), SolverError> {
        let lo = levels.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = levels.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        self.bound(variable, lo, hi)?;
        self.assertions.push(Formula::or(
            levels.iter().map(|&l| Formula::eq(variable, l)),
        ));
        Ok(())
    }

    fn decl_mut(&mut self, variable: &Variable) -> Result<&mut VarDecl, SolverError> {
        match self.decls.get_mut(variable.id().index()) {
            Some(decl) if decl.var == *variable => Ok(decl),
            _ => Err(SolverError::UnknownVariable(variable.name().to_string())),
        }
    }

    /// Adds a constraint. A comparison between a variable and a constant
    /// also counts as a bound on that variable.
    pub fn assert(&mut self, formula: Formula) {
        self.absorb_bounds(&formula);
        self.assertions.push(formula);
    }

    fn absorb_bounds(&mut self, formula: &Formula) {
        match formula {
            Formula::And(parts) => parts.iter().for_each(|p| self.absorb_bounds(p)),
            Formula::Cmp(op, a, b) => {
                let (var, op, c) = match (a, b) {
                    (Term::Var(v), Term::Const(c)) => (v, *op, *c),
                    (Term::Const(c), Term::Var(v)) => (v, op.flip(), *c),
                    _ => return,
                };
                if c.is_nan() {
                    return;
                }
                let limit = match op {
                    CmpOp::Eq => Interval::point(c),
                    CmpOp::Le | CmpOp::Lt => Interval::at_most(c),
                    CmpOp::Ge | CmpOp::Gt => Interval::at_least(c),
                    CmpOp::Ne => return,
                };
                if let Ok(decl) = self.decl_mut(var) {
                    decl.domain = decl.domain.intersect(&limit, 0.0);
                    decl.bounded = true;
                }
            }
            _ => {}
        }
    }

    /// Opens a scope; [`pop`](Self::pop) discards everything added since.
    pub fn push(&mut self) {
        self.scopes.push(ScopeMark {
            assertions: self.assertions.len(),
            decls: self.decls.clone(),
        });
    }

    pub fn pop(&mut self) -> Result<(), SolverError> {
        let mark = self.scopes.pop().ok_or(SolverError::EmptyScopeStack)?;
        self.assertions.truncate(mark.assertions);
        self.decls = mark.decls;
        let len = self.decls.len();
        self.by_name.retain(|_, id| id.index() < len);
        Ok(())
    }

    /// Opens a scope that is popped when the guard drops.
    pub fn scope(&mut self) -> Scope<'_> {
        self.push();
        Scope { solver: self }
    }

    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    fn ensure_bounded(&self) -> Result<(), SolverError> {
        match self.decls.iter().find(|d| !d.bounded) {
            Some(decl) => Err(SolverError::UnboundedVariable(decl.var.name().to_string())),
            None => Ok(()),
        }
    }

    fn sorts(&self) -> Vec<Sort> {
        self.decls.iter().map(|d| d.var.sort()).collect()
    }

    fn root(&self) -> Vec<Interval> {
        self.decls
            .iter()
            .map(|d| match d.var.sort() {
                Sort::Int => d.domain.to_integers(self.precision),
                Sort::Real => d.domain,
            })
            .collect()
    }

    /// Decides satisfiability of the current store.
    ///
    /// # Errors
    ///
    /// [`SolverError::UnboundedVariable`] when a declared variable has no
    /// bound constraint.
    pub fn check(&self) -> Result<SolverResult, SolverError> {
        self.ensure_bounded()?;
        let started = Instant::now();
        debug!(
            event = "check_start",
            variables = self.decls.len(),
            constraints = self.assertions.len(),
            depth = self.scopes.len(),
        );

        let sorts = self.sorts();
        let search = BranchAndPrune::new(&self.assertions, &sorts, self.precision);
        let budget = Budget {
            node_limit: self.node_limit,
            deadline: self.time_limit.map(|limit| started + limit),
        };
        let (outcome, nodes) = search.run(self.root(), &budget);
        let result = match outcome {
            Outcome::Sat(values) => {
                SolverResult::Sat(Model::new(self.var_list(), self.confine(values)))
            }
            Outcome::Unsat => SolverResult::Unsat,
            Outcome::Unknown(reason) => SolverResult::Unknown(reason),
        };

        debug!(
            event = "check_end",
            verdict = result.verdict(),
            nodes,
            elapsed_ms = started.elapsed().as_millis() as u64,
        );
        Ok(result)
    }

    // Values pinned to their declared domains.
    fn confine(&self, values: Vec<f64>) -> Vec<f64> {
        values
            .into_iter()
            .zip(self.root())
            .map(|(value, domain)| domain.confine(value))
            .collect()
    }

    fn var_list(&self) -> Arc<[Variable]> {
        self.decls.iter().map(|d| d.var.clone()).collect()
    }

    /// Finds an assignment minimizing `objective` to within the precision.
    ///
    /// The returned model carries the achieved objective value. When the
    /// budget runs out part way, the best assignment found so far is
    /// returned.
    pub fn minimize(&mut self, objective: impl Into<Term>) -> Result<SolverResult, SolverError> {
        let objective = objective.into();
        let first = self.check()?;
        let SolverResult::Sat(mut best_model) = first else {
            return Ok(first);
        };
        let mut best = best_model.eval(&objective);

        let sorts = self.sorts();
        let mut dom = self.root();
        let propagator = Propagator::new(&sorts, self.precision);
        propagator.propagate(&self.assertions, &mut dom);
        let mut lo = propagator.eval(&objective, &dom).lo;

        let mut steps = 0;
        if !lo.is_finite() {
            let mut stride = best.abs().max(1.0);
            loop {
                if steps >= MAX_OPTIMIZE_STEPS {
                    return Ok(SolverResult::Unknown(UnknownReason::Unbounded));
                }
                steps += 1;
                let probe = best - stride;
                match self.probe_at_most(&objective, probe)? {
                    SolverResult::Sat(model) => {
                        best = model.eval(&objective);
                        best_model = model;
                        stride *= 2.0;
                    }
                    SolverResult::Unsat => {
                        lo = probe;
                        break;
                    }
                    SolverResult::Unknown(reason) => {
                        debug!(event = "optimize_step", step = steps, stopped = %reason);
                        return Ok(SolverResult::Sat(best_model.with_objective(best)));
                    }
                }
            }
        }

        while best - lo > self.precision * (1.0 + best.abs()) && steps < MAX_OPTIMIZE_STEPS {
            steps += 1;
            let mid = lo + (best - lo) / 2.0;
            match self.probe_at_most(&objective, mid)? {
                SolverResult::Sat(model) => {
                    best = model.eval(&objective).min(best);
                    best_model = model;
                }
                SolverResult::Unsat => lo = mid,
                SolverResult::Unknown(reason) => {
                    debug!(event = "optimize_step", step = steps, stopped = %reason);
                    break;
                }
            }
            debug!(event = "optimize_step", step = steps, lower = lo, best);
        }

        info!(event = "optimize_done", steps, objective = best, lower = lo);
        Ok(SolverResult::Sat(best_model.with_objective(best)))
    }

    /// Finds an assignment maximizing `objective` to within the precision.
    pub fn maximize(&mut self, objective: impl Into<Term>) -> Result<SolverResult, SolverError> {
        let objective = objective.into();
        Ok(match self.minimize(-objective.clone())? {
            SolverResult::Sat(model) => {
                let value = model.eval(&objective);
                SolverResult::Sat(model.with_objective(value))
            }
            other => other,
        })
    }

    fn probe_at_most(&mut self, objective: &Term, limit: f64) -> Result<SolverResult, SolverError> {
        let mut scope = self.scope();
        scope.assert(Formula::le(objective, limit));
        scope.check()
    }
}

/// A scope opened by [`Solver::scope`]; pops on drop.
pub struct Scope<'a> {
    solver: &'a mut Solver,
}

impl Deref for Scope<'_> {
    type Target = Solver;

    fn deref(&self) -> &Solver {
        self.solver
    }
}

impl DerefMut for Scope<'_> {
    fn deref_mut(&mut self) -> &mut Solver {
        self.solver
    }
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        // The guard's own push guarantees a scope to pop.
        let _ = self.solver.pop();
    }
}
