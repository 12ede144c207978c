//! Values that are either concrete numbers or symbolic terms.
//!
//! Model equations are written once against [`Quantity`]. When every input
//! is concrete the arithmetic folds to a number; as soon as a symbolic term
//! is involved the result is a term for the solver.


use std::ops::{Add, Div, Mul, Neg, Not, Sub};

use musselforge_core::{Scalar, TreatmentFlag};

use crate::term::{CmpOp, Formula, Term, Variable};

#[derive(Debug, Clone, PartialEq)]
pub enum Quantity {
    Concrete(f64),
    Symbolic(Term),
}

impl Quantity {
    pub fn as_concrete(&self) -> Option<f64> {
        match self {
            Quantity::Concrete(v) => Some(*v),
            Quantity::Symbolic(_) => None,
        }
    }

    pub fn into_term(self) -> Term {
        match self {
            Quantity::Concrete(v) => Term::Const(v),
            Quantity::Symbolic(t) => t,
        }
    }

    fn unary(self, concrete: impl FnOnce(f64) -> f64, symbolic: impl FnOnce(Term) -> Term) -> Self {
        match self {
            Quantity::Concrete(v) => Quantity::Concrete(concrete(v)),
            Quantity::Symbolic(t) => Quantity::Symbolic(symbolic(t)),
        }
    }

    fn binary(
        self,
        rhs: Quantity,
        concrete: impl FnOnce(f64, f64) -> f64,
        symbolic: impl FnOnce(Term, Term) -> Term,
    ) -> Self {
        match (self, rhs) {
            (Quantity::Concrete(a), Quantity::Concrete(b)) => Quantity::Concrete(concrete(a, b)),
            (a, b) => Quantity::Symbolic(symbolic(a.into_term(), b.into_term())),
        }
    }

    /// Square root of the non-negative part.
    pub fn sqrt(self) -> Self {
        self.unary(|v| v.max(0.0).sqrt(), Term::sqrt)
    }

    pub fn floor(self) -> Self {
        self.unary(f64::floor, Term::floor)
    }

    pub fn min(self, other: impl Into<Quantity>) -> Self {
        self.binary(other.into(), f64::min, |a, b| a.min(b))
    }

    pub fn max(self, other: impl Into<Quantity>) -> Self {
        self.binary(other.into(), f64::max, |a, b| a.max(b))
    }

    pub fn clamp(self, lo: f64, hi: f64) -> Self {
        self.min(hi).max(lo)
    }

    /// Selects a branch; a concrete condition picks it immediately.
    pub fn ite(cond: Condition, then_q: impl Into<Quantity>, else_q: impl Into<Quantity>) -> Self {
        match cond {
            Condition::Concrete(true) => then_q.into(),
            Condition::Concrete(false) => else_q.into(),
            Condition::Symbolic(f) => Quantity::Symbolic(Term::ite(
                f,
                then_q.into().into_term(),
                else_q.into().into_term(),
            )),
        }
    }

    fn compare(&self, op: CmpOp, other: Quantity) -> Condition {
        match (self, other) {
            (Quantity::Concrete(a), Quantity::Concrete(b)) => Condition::Concrete(match op {
                CmpOp::Eq => *a == b,
                CmpOp::Ne => *a != b,
                CmpOp::Lt => *a < b,
                CmpOp::Le => *a <= b,
                CmpOp::Gt => *a > b,
                CmpOp::Ge => *a >= b,
            }),
            (a, b) => Condition::Symbolic(Formula::cmp(op, a.clone().into_term(), b.into_term())),
        }
    }

    pub fn equals(&self, other: impl Into<Quantity>) -> Condition {
        self.compare(CmpOp::Eq, other.into())
    }

    pub fn lt(&self, other: impl Into<Quantity>) -> Condition {
        self.compare(CmpOp::Lt, other.into())
    }

    pub fn le(&self, other: impl Into<Quantity>) -> Condition {
        self.compare(CmpOp::Le, other.into())
    }

    pub fn gt(&self, other: impl Into<Quantity>) -> Condition {
        self.compare(CmpOp::Gt, other.into())
    }

    pub fn ge(&self, other: impl Into<Quantity>) -> Condition {
        self.compare(CmpOp::Ge, other.into())
    }
}

impl From<f64> for Quantity {
    fn from(v: f64) -> Self {
        Quantity::Concrete(v)
    }
}

impl From<Term> for Quantity {
    fn from(t: Term) -> Self {
        match t {
            Term::Const(v) => Quantity::Concrete(v),
            other => Quantity::Symbolic(other),
        }
    }
}

impl From<&Variable> for Quantity {
    fn from(v: &Variable) -> Self {
        Quantity::Symbolic(v.term())
    }
}

impl From<&Quantity> for Quantity {
    fn from(q: &Quantity) -> Self {
        q.clone()
    }
}

impl From<Quantity> for Term {
    fn from(q: Quantity) -> Self {
        q.into_term()
    }
}

macro_rules! quantity_binop {
    ($trait:ident, $method:ident, $op:tt) => {
        impl<R: Into<Quantity>> $trait<R> for Quantity {
            type Output = Quantity;

            fn $method(self, rhs: R) -> Quantity {
                self.binary(rhs.into(), |a, b| a $op b, |a, b| a $op b)
            }
        }

        impl $trait<Quantity> for f64 {
            type Output = Quantity;

            fn $method(self, rhs: Quantity) -> Quantity {
                Quantity::Concrete(self).binary(rhs, |a, b| a $op b, |a, b| a $op b)
            }
        }
    };
}

quantity_binop!(Add, add, +);
quantity_binop!(Sub, sub, -);
quantity_binop!(Mul, mul, *);
quantity_binop!(Div, div, /);

impl Neg for Quantity {
    type Output = Quantity;

    fn neg(self) -> Quantity {
        self.unary(|v| -v, |t| -t)
    }
}

impl Scalar for Quantity {
    fn indicator(self) -> Self {
        match self {
            Quantity::Concrete(v) => Quantity::Concrete(TreatmentFlag::from_indicator(v).as_f64()),
            symbolic => Quantity::ite(symbolic.equals(1.0), 1.0, 0.0),
        }
    }
}

/// A boolean that is either decided or a formula for the solver.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Concrete(bool),
    Symbolic(Formula),
}

impl Condition {
    pub fn as_concrete(&self) -> Option<bool> {
        match self {
            Condition::Concrete(b) => Some(*b),
            Condition::Symbolic(_) => None,
        }
    }

    pub fn into_formula(self) -> Formula {
        match self {
            Condition::Concrete(b) => Formula::Const(b),
            Condition::Symbolic(f) => f,
        }
    }

    pub fn and(self, other: Condition) -> Condition {
        match (self, other) {
            (Condition::Concrete(false), _) | (_, Condition::Concrete(false)) => {
                Condition::Concrete(false)
            }
            (Condition::Concrete(true), c) | (c, Condition::Concrete(true)) => c,
            (Condition::Symbolic(a), Condition::Symbolic(b)) => {
                Condition::Symbolic(Formula::and([a, b]))
            }
        }
    }

    pub fn or(self, other: Condition) -> Condition {
        match (self, other) {
            (Condition::Concrete(true), _) | (_, Condition::Concrete(true)) => {
                Condition::Concrete(true)
            }
            (Condition::Concrete(false), c) | (c, Condition::Concrete(false)) => c,
            (Condition::Symbolic(a), Condition::Symbolic(b)) => {
                Condition::Symbolic(Formula::or([a, b]))
            }
        }
    }

    pub fn implies(self, other: Condition) -> Condition {
        (!self).or(other)
    }
}

impl Not for Condition {
    type Output = Condition;

    fn not(self) -> Condition {
        match self {
            Condition::Concrete(b) => Condition::Concrete(!b),
            Condition::Symbolic(f) => Condition::Symbolic(!f),
        }
    }
}

impl From<bool> for Condition {
    fn from(b: bool) -> Self {
        Condition::Concrete(b)
    }
}

impl From<Formula> for Condition {
    fn from(f: Formula) -> Self {
        Condition::Symbolic(f)
    }
}
