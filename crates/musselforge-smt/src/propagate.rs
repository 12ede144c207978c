//! HC4-style constraint propagation over interval domains.
//!
//! Each asserted formula is enforced by a forward interval evaluation of
//! its terms followed by a backward pass that narrows every subterm to the
//! values compatible with the comparison. Sweeps repeat until no domain
//! moves by more than the precision.

use crate::eval::slack;
use crate::interval::Interval;
use crate::term::{CmpOp, Formula, Sort, Term};

const MAX_SWEEPS: usize = 32;

/// Three-valued truth of a formula over a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Truth {
    True,
    False,
    Unknown,
}

impl Truth {
    fn from_bool(b: bool) -> Self {
        if b {
            Truth::True
        } else {
            Truth::False
        }
    }

    fn not(self) -> Self {
        match self {
            Truth::True => Truth::False,
            Truth::False => Truth::True,
            Truth::Unknown => Truth::Unknown,
        }
    }

    fn is(self, holds: bool) -> bool {
        self == Truth::from_bool(holds)
    }
}

pub(crate) struct Propagator<'a> {
    sorts: &'a [Sort],
    tol: f64,
}

impl<'a> Propagator<'a> {
    pub fn new(sorts: &'a [Sort], tol: f64) -> Self {
        Self { sorts, tol }
    }

    /// Narrows `dom` against every constraint; `false` when a domain empties.
    pub fn propagate(&self, constraints: &[Formula], dom: &mut [Interval]) -> bool {
        for _ in 0..MAX_SWEEPS {
            let before = dom.to_vec();
            for constraint in constraints {
                if !self.enforce(constraint, true, dom) {
                    return false;
                }
            }
            if !self.moved(&before, dom) {
                break;
            }
        }
        true
    }

    fn moved(&self, before: &[Interval], after: &[Interval]) -> bool {
        let shifted = |a: f64, b: f64| {
            if a == b {
                false
            } else if !a.is_finite() || !b.is_finite() {
                true
            } else {
                (a - b).abs() > slack(a, b, self.tol)
            }
        };
        before
            .iter()
            .zip(after)
            .any(|(x, y)| shifted(x.lo, y.lo) || shifted(x.hi, y.hi))
    }

    pub fn eval(&self, term: &Term, dom: &[Interval]) -> Interval {
        match term {
            Term::Const(v) => Interval::point(*v),
            Term::Var(v) => dom.get(v.id().index()).copied().unwrap_or(Interval::EMPTY),
            Term::Add(a, b) => self.eval(a, dom).add(&self.eval(b, dom)),
            Term::Sub(a, b) => self.eval(a, dom).sub(&self.eval(b, dom)),
            Term::Mul(a, b) => self.eval(a, dom).mul(&self.eval(b, dom)),
            Term::Div(a, b) => self.eval(a, dom).div(&self.eval(b, dom)),
            Term::Neg(a) => self.eval(a, dom).neg(),
            Term::Sqrt(a) => self.eval(a, dom).sqrt(),
            Term::Floor(a) => self.eval(a, dom).floor(),
            Term::Min(a, b) => self.eval(a, dom).min(&self.eval(b, dom)),
            Term::Max(a, b) => self.eval(a, dom).max(&self.eval(b, dom)),
            Term::Ite {
                cond,
                then_term,
                else_term,
            } => match self.truth_with(cond, dom, 0.0) {
                Truth::True => self.eval(then_term, dom),
                Truth::False => self.eval(else_term, dom),
                Truth::Unknown => self.eval(then_term, dom).hull(&self.eval(else_term, dom)),
            },
        }
    }

    /// Truth of a top-level constraint, tolerant like the point check.
    pub fn truth(&self, formula: &Formula, dom: &[Interval]) -> Truth {
        self.truth_with(formula, dom, self.tol)
    }

    fn truth_with(&self, formula: &Formula, dom: &[Interval], tol: f64) -> Truth {
        match formula {
            Formula::Const(b) => Truth::from_bool(*b),
            Formula::Cmp(op, a, b) => compare(*op, self.eval(a, dom), self.eval(b, dom), tol),
            Formula::And(parts) => {
                let mut all_true = true;
                for part in parts {
                    match self.truth_with(part, dom, tol) {
                        Truth::False => return Truth::False,
                        Truth::Unknown => all_true = false,
                        Truth::True => {}
                    }
                }
                if all_true {
                    Truth::True
                } else {
                    Truth::Unknown
                }
            }
            Formula::Or(parts) => {
                let mut all_false = true;
                for part in parts {
                    match self.truth_with(part, dom, tol) {
                        Truth::True => return Truth::True,
                        Truth::Unknown => all_false = false,
                        Truth::False => {}
                    }
                }
                if all_false {
                    Truth::False
                } else {
                    Truth::Unknown
                }
            }
            Formula::Not(inner) => self.truth_with(inner, dom, tol).not(),
            Formula::Implies(p, q) => {
                match (self.truth_with(p, dom, tol), self.truth_with(q, dom, tol)) {
                    (Truth::False, _) | (_, Truth::True) => Truth::True,
                    (Truth::True, Truth::False) => Truth::False,
                    _ => Truth::Unknown,
                }
            }
        }
    }

    /// Narrows `dom` so that `formula` evaluates to `holds`.
    pub fn enforce(&self, formula: &Formula, holds: bool, dom: &mut [Interval]) -> bool {
        match formula {
            Formula::Const(b) => *b == holds,
            Formula::Cmp(op, a, b) => {
                let op = if holds { *op } else { op.negate() };
                self.enforce_cmp(op, a, b, dom)
            }
            Formula::Not(inner) => self.enforce(inner, !holds, dom),
            Formula::And(parts) if holds => parts.iter().all(|p| self.enforce(p, true, dom)),
            Formula::Or(parts) if !holds => parts.iter().all(|p| self.enforce(p, false, dom)),
            Formula::And(parts) => {
                let options: Vec<_> = parts.iter().map(|p| (p, false)).collect();
                self.enforce_any(&options, dom)
            }
            Formula::Or(parts) => {
                let options: Vec<_> = parts.iter().map(|p| (p, true)).collect();
                self.enforce_any(&options, dom)
            }
            Formula::Implies(p, q) => {
                if holds {
                    self.enforce_any(&[(p, false), (q, true)], dom)
                } else {
                    self.enforce(p, true, dom) && self.enforce(q, false, dom)
                }
            }
        }
    }

    // At least one option must take its wanted value; unit-propagates when
    // only one remains open.
    fn enforce_any(&self, options: &[(&Formula, bool)], dom: &mut [Interval]) -> bool {
        let mut open = None;
        let mut open_count = 0;
        for &(formula, want) in options {
            let truth = self.truth(formula, dom);
            if truth.is(want) {
                return true;
            }
            if truth == Truth::Unknown {
                open_count += 1;
                open = Some((formula, want));
            }
        }
        match (open_count, open) {
            (1, Some((formula, want))) => self.enforce(formula, want, dom),
            (0, _) => false,
            _ => true,
        }
    }

    fn enforce_cmp(&self, op: CmpOp, a: &Term, b: &Term, dom: &mut [Interval]) -> bool {
        match op {
            CmpOp::Le | CmpOp::Lt => {
                let ib = self.eval(b, dom);
                if !self.narrow(a, Interval::at_most(ib.hi), dom) {
                    return false;
                }
                let ia = self.eval(a, dom);
                if !self.narrow(b, Interval::at_least(ia.lo), dom) {
                    return false;
                }
            }
            CmpOp::Ge | CmpOp::Gt => return self.enforce_cmp(op.flip(), b, a, dom),
            CmpOp::Eq => {
                let ib = self.eval(b, dom);
                if !self.narrow(a, ib, dom) {
                    return false;
                }
                let ia = self.eval(a, dom);
                if !self.narrow(b, ia, dom) {
                    return false;
                }
            }
            CmpOp::Ne => {}
        }
        compare(op, self.eval(a, dom), self.eval(b, dom), self.tol) != Truth::False
    }

    /// Backward pass: restricts the variables of `term` so its value can lie
    /// in `target`.
    fn narrow(&self, term: &Term, target: Interval, dom: &mut [Interval]) -> bool {
        let target = self.eval(term, dom).intersect(&target, self.tol);
        if target.is_empty() {
            return false;
        }
        match term {
            Term::Const(_) => true,
            Term::Var(v) => {
                let i = v.id().index();
                let Some(current) = dom.get(i).copied() else {
                    return false;
                };
                let mut next = current.intersect(&target, self.tol);
                if self.sorts.get(i) == Some(&Sort::Int) {
                    next = next.to_integers(self.tol);
                }
                if next.is_empty() {
                    return false;
                }
                dom[i] = next;
                true
            }
            Term::Add(a, b) => {
                let ib = self.eval(b, dom);
                if !self.narrow(a, target.sub(&ib), dom) {
                    return false;
                }
                let ia = self.eval(a, dom);
                self.narrow(b, target.sub(&ia), dom)
            }
            Term::Sub(a, b) => {
                let ib = self.eval(b, dom);
                if !self.narrow(a, target.add(&ib), dom) {
                    return false;
                }
                let ia = self.eval(a, dom);
                self.narrow(b, ia.sub(&target), dom)
            }
            Term::Neg(a) => self.narrow(a, target.neg(), dom),
            Term::Mul(a, b) => {
                let ib = self.eval(b, dom);
                if !ib.contains(0.0) && !self.narrow(a, target.div(&ib), dom) {
                    return false;
                }
                let ia = self.eval(a, dom);
                if !ia.contains(0.0) && !self.narrow(b, target.div(&ia), dom) {
                    return false;
                }
                true
            }
            Term::Div(a, b) => {
                let ib = self.eval(b, dom);
                if !self.narrow(a, target.mul(&ib), dom) {
                    return false;
                }
                let ia = self.eval(a, dom);
                if !target.contains(0.0) {
                    return self.narrow(b, ia.div(&target), dom);
                }
                true
            }
            Term::Sqrt(a) => {
                let root = target.intersect(&Interval::at_least(0.0), self.tol);
                if root.is_empty() {
                    return false;
                }
                let hi = root.hi * root.hi;
                if root.lo > 0.0 {
                    self.narrow(a, Interval::new(root.lo * root.lo, hi), dom)
                } else {
                    self.narrow(a, Interval::at_most(hi), dom)
                }
            }
            Term::Floor(a) => {
                let whole = target.to_integers(self.tol);
                if whole.is_empty() {
                    return false;
                }
                let below_next = whole.hi + 1.0 - f64::EPSILON * (whole.hi.abs() + 1.0);
                self.narrow(a, Interval::new(whole.lo, below_next), dom)
            }
            Term::Min(a, b) => {
                let floor = Interval::at_least(target.lo);
                if !self.narrow(a, floor, dom) || !self.narrow(b, floor, dom) {
                    return false;
                }
                let (ia, ib) = (self.eval(a, dom), self.eval(b, dom));
                if ib.lo > target.hi {
                    self.narrow(a, target, dom)
                } else if ia.lo > target.hi {
                    self.narrow(b, target, dom)
                } else {
                    true
                }
            }
            Term::Max(a, b) => {
                let ceiling = Interval::at_most(target.hi);
                if !self.narrow(a, ceiling, dom) || !self.narrow(b, ceiling, dom) {
                    return false;
                }
                let (ia, ib) = (self.eval(a, dom), self.eval(b, dom));
                if ib.hi < target.lo {
                    self.narrow(a, target, dom)
                } else if ia.hi < target.lo {
                    self.narrow(b, target, dom)
                } else {
                    true
                }
            }
            Term::Ite {
                cond,
                then_term,
                else_term,
            } => match self.truth_with(cond, dom, 0.0) {
                Truth::True => self.narrow(then_term, target, dom),
                Truth::False => self.narrow(else_term, target, dom),
                Truth::Unknown => {
                    let reachable = |t: &Term| {
                        !self.eval(t, dom).intersect(&target, self.tol).is_empty()
                    };
                    match (reachable(then_term), reachable(else_term)) {
                        (false, false) => false,
                        (true, false) => {
                            self.enforce(cond, true, dom) && self.narrow(then_term, target, dom)
                        }
                        (false, true) => {
                            self.enforce(cond, false, dom) && self.narrow(else_term, target, dom)
                        }
                        (true, true) => true,
                    }
                }
            },
        }
    }
}

fn compare(op: CmpOp, a: Interval, b: Interval, tol: f64) -> Truth {
    if a.is_empty() || b.is_empty() {
        return Truth::False;
    }
    let s = |x: f64, y: f64| {
        if x.is_finite() && y.is_finite() {
            slack(x, y, tol)
        } else {
            0.0
        }
    };
    match op {
        CmpOp::Le => {
            if a.hi <= b.lo + s(a.hi, b.lo) {
                Truth::True
            } else if a.lo > b.hi + s(a.lo, b.hi) {
                Truth::False
            } else {
                Truth::Unknown
            }
        }
        CmpOp::Lt => {
            if a.hi < b.lo {
                Truth::True
            } else if a.lo >= b.hi {
                Truth::False
            } else {
                Truth::Unknown
            }
        }
        CmpOp::Ge => compare(CmpOp::Le, b, a, tol),
        CmpOp::Gt => compare(CmpOp::Lt, b, a, tol),
        CmpOp::Eq => {
            if a.lo > b.hi + s(a.lo, b.hi) || b.lo > a.hi + s(b.lo, a.hi) {
                Truth::False
            } else if a.is_point() && b.is_point() {
                Truth::True
            } else {
                Truth::Unknown
            }
        }
        CmpOp::Ne => compare(CmpOp::Eq, a, b, tol).not(),
    }
}
