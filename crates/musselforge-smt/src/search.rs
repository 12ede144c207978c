//! Depth-first branch-and-prune over interval boxes.
//!
//! Each node propagates the constraints, tests one representative point
//! and otherwise bisects the widest variable still involved in an
//! undecided constraint. The left half is explored first, so feasible
//! points with smaller coordinates are found earlier.

use std::time::Instant;

use crate::eval::eval_formula;
use crate::interval::Interval;
use crate::propagate::{Propagator, Truth};
use crate::solver::UnknownReason;
use crate::term::{Formula, Sort, VarId};

pub(crate) struct Budget {
    pub node_limit: u64,
    pub deadline: Option<Instant>,
}

pub(crate) enum Outcome {
    Sat(Vec<f64>),
    Unsat,
    Unknown(UnknownReason),
}

pub(crate) struct BranchAndPrune<'a> {
    constraints: &'a [Formula],
    constraint_vars: Vec<Vec<VarId>>,
    sorts: &'a [Sort],
    precision: f64,
    propagator: Propagator<'a>,
}

impl<'a> BranchAndPrune<'a> {
    pub fn new(constraints: &'a [Formula], sorts: &'a [Sort], precision: f64) -> Self {
        let constraint_vars = constraints
            .iter()
            .map(|c| {
                let mut ids = Vec::new();
                c.visit_vars(&mut |v| ids.push(v.id()));
                ids.sort();
                ids.dedup();
                ids
            })
            .collect();
        Self {
            constraints,
            constraint_vars,
            sorts,
            precision,
            propagator: Propagator::new(sorts, precision),
        }
    }

    /// Returns the outcome and the number of nodes visited.
    pub fn run(&self, root: Vec<Interval>, budget: &Budget) -> (Outcome, u64) {
        if root.iter().any(Interval::is_empty) {
            return (Outcome::Unsat, 0);
        }
        let mut stack = vec![root.clone()];
        let mut nodes = 0u64;
        let mut undecided = false;

        while let Some(mut dom) = stack.pop() {
            if nodes >= budget.node_limit {
                return (Outcome::Unknown(UnknownReason::NodeLimit), nodes);
            }
            if budget.deadline.is_some_and(|d| Instant::now() >= d) {
                return (Outcome::Unknown(UnknownReason::TimeLimit), nodes);
            }
            nodes += 1;

            if !self.propagator.propagate(self.constraints, &mut dom) {
                continue;
            }
            let candidate = self.candidate(&dom, &root);
            if self
                .constraints
                .iter()
                .all(|c| eval_formula(c, &candidate, self.precision))
            {
                return (Outcome::Sat(candidate), nodes);
            }
            match self.split_var(&dom) {
                Some(var) => {
                    let (left, right) = self.split(dom[var], self.sorts[var]);
                    let mut right_dom = dom.clone();
                    right_dom[var] = right;
                    dom[var] = left;
                    stack.push(right_dom);
                    stack.push(dom);
                }
                None => undecided = true,
            }
        }

        if undecided {
            (Outcome::Unknown(UnknownReason::Precision), nodes)
        } else {
            (Outcome::Unsat, nodes)
        }
    }

    // One point per variable, kept inside both the node box and the
    // declared domain.
    fn candidate(&self, dom: &[Interval], root: &[Interval]) -> Vec<f64> {
        dom.iter()
            .zip(root)
            .zip(self.sorts)
            .map(|((iv, declared), sort)| {
                let mid = iv.midpoint();
                let point = match sort {
                    Sort::Real => iv.confine(mid),
                    Sort::Int => iv.confine(mid.round()),
                };
                declared.confine(point)
            })
            .collect()
    }

    // Widest splittable variable of any constraint not yet proven on `dom`.
    fn split_var(&self, dom: &[Interval]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (constraint, vars) in self.constraints.iter().zip(&self.constraint_vars) {
            if self.propagator.truth(constraint, dom) == Truth::True {
                continue;
            }
            for id in vars {
                let i = id.index();
                if !self.splittable(dom[i], self.sorts[i]) {
                    continue;
                }
                let width = dom[i].width();
                if best.map_or(true, |(_, w)| width > w) {
                    best = Some((i, width));
                }
            }
        }
        best.map(|(i, _)| i)
    }

    fn splittable(&self, iv: Interval, sort: Sort) -> bool {
        match sort {
            Sort::Int => iv.lo < iv.hi,
            Sort::Real => iv.width() > self.precision * (1.0 + iv.lo.abs().max(iv.hi.abs()).min(1e12)),
        }
    }

    fn split(&self, iv: Interval, sort: Sort) -> (Interval, Interval) {
        let at = match (iv.lo.is_finite(), iv.hi.is_finite()) {
            (true, true) => iv.midpoint(),
            (true, false) => iv.lo + iv.lo.abs().max(1.0) * 2.0,
            (false, true) => iv.hi - iv.hi.abs().max(1.0) * 2.0,
            (false, false) => 0.0,
        };
        match sort {
            Sort::Real => (Interval::new(iv.lo, at), Interval::new(at, iv.hi)),
            Sort::Int => {
                let at = at.floor().clamp(iv.lo, iv.hi - 1.0);
                (Interval::new(iv.lo, at), Interval::new(at + 1.0, iv.hi))
            }
        }
    }
}
