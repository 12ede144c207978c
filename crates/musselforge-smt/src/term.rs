//! Symbolic arithmetic terms and boolean formulas.


use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Not, Sub};
use std::sync::Arc;

/// Domain of a solver variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sort {
    Int,
    Real,
}

/// Index of a variable within its solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub(crate) usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A declared solver variable. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    id: VarId,
    name: Arc<str>,
    sort: Sort,
}

impl Variable {
    pub(crate) fn new(id: VarId, name: Arc<str>, sort: Sort) -> Self {
        Self { id, name, sort }
    }

    pub fn id(&self) -> VarId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sort(&self) -> Sort {
        self.sort
    }

    pub fn term(&self) -> Term {
        Term::Var(self.clone())
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A real-valued expression over solver variables.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Const(f64),
    Var(Variable),
    Add(Box<Term>, Box<Term>),
    Sub(Box<Term>, Box<Term>),
    Mul(Box<Term>, Box<Term>),
    Div(Box<Term>, Box<Term>),
    Neg(Box<Term>),
    /// Square root of the non-negative part of the operand.
    Sqrt(Box<Term>),
    /// Rounds toward negative infinity.
    Floor(Box<Term>),
    Min(Box<Term>, Box<Term>),
    Max(Box<Term>, Box<Term>),
    Ite {
        cond: Box<Formula>,
        then_term: Box<Term>,
        else_term: Box<Term>,
    },
}

impl Term {
    pub fn constant(value: f64) -> Self {
        Term::Const(value)
    }

    pub fn var(variable: &Variable) -> Self {
        Term::Var(variable.clone())
    }

    pub fn ite(cond: Formula, then_term: impl Into<Term>, else_term: impl Into<Term>) -> Self {
        Term::Ite {
            cond: Box::new(cond),
            then_term: Box::new(then_term.into()),
            else_term: Box::new(else_term.into()),
        }
    }

    pub fn sqrt(self) -> Self {
        Term::Sqrt(Box::new(self))
    }

    pub fn floor(self) -> Self {
        Term::Floor(Box::new(self))
    }

    pub fn min(self, other: impl Into<Term>) -> Self {
        Term::Min(Box::new(self), Box::new(other.into()))
    }

    pub fn max(self, other: impl Into<Term>) -> Self {
        Term::Max(Box::new(self), Box::new(other.into()))
    }

    /// `max(lo, min(hi, self))`.
    pub fn clamp(self, lo: f64, hi: f64) -> Self {
        self.min(hi).max(lo)
    }

    pub fn as_const(&self) -> Option<f64> {
        match self {
            Term::Const(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_var(&self) -> Option<&Variable> {
        match self {
            Term::Var(v) => Some(v),
            _ => None,
        }
    }

    /// Calls `f` for every variable occurrence, including inside conditions.
    pub fn visit_vars(&self, f: &mut impl FnMut(&Variable)) {
        match self {
            Term::Const(_) => {}
            Term::Var(v) => f(v),
            Term::Add(a, b)
            | Term::Sub(a, b)
            | Term::Mul(a, b)
            | Term::Div(a, b)
            | Term::Min(a, b)
            | Term::Max(a, b) => {
                a.visit_vars(f);
                b.visit_vars(f);
            }
            Term::Neg(a) | Term::Sqrt(a) | Term::Floor(a) => a.visit_vars(f),
            Term::Ite {
                cond,
                then_term,
                else_term,
            } => {
                cond.visit_vars(f);
                then_term.visit_vars(f);
                else_term.visit_vars(f);
            }
        }
    }
}

impl From<f64> for Term {
    fn from(value: f64) -> Self {
        Term::Const(value)
    }
}

impl From<i64> for Term {
    fn from(value: i64) -> Self {
        Term::Const(value as f64)
    }
}

impl From<&Variable> for Term {
    fn from(variable: &Variable) -> Self {
        Term::Var(variable.clone())
    }
}

impl From<Variable> for Term {
    fn from(variable: Variable) -> Self {
        Term::Var(variable)
    }
}

impl From<&Term> for Term {
    fn from(term: &Term) -> Self {
        term.clone()
    }
}

macro_rules! term_binop {
    ($trait:ident, $method:ident, $variant:ident) => {
        impl<R: Into<Term>> $trait<R> for Term {
            type Output = Term;

            fn $method(self, rhs: R) -> Term {
                Term::$variant(Box::new(self), Box::new(rhs.into()))
            }
        }

        impl<R: Into<Term>> $trait<R> for &Variable {
            type Output = Term;

            fn $method(self, rhs: R) -> Term {
                Term::$variant(Box::new(self.term()), Box::new(rhs.into()))
            }
        }

        impl $trait<Term> for f64 {
            type Output = Term;

            fn $method(self, rhs: Term) -> Term {
                Term::$variant(Box::new(Term::Const(self)), Box::new(rhs))
            }
        }

        impl $trait<&Variable> for f64 {
            type Output = Term;

            fn $method(self, rhs: &Variable) -> Term {
                Term::$variant(Box::new(Term::Const(self)), Box::new(rhs.term()))
            }
        }
    };
}

term_binop!(Add, add, Add);
term_binop!(Sub, sub, Sub);
term_binop!(Mul, mul, Mul);
term_binop!(Div, div, Div);

impl Neg for Term {
    type Output = Term;

    fn neg(self) -> Term {
        Term::Neg(Box::new(self))
    }
}

impl Neg for &Variable {
    type Output = Term;

    fn neg(self) -> Term {
        Term::Neg(Box::new(self.term()))
    }
}

/// Relational operator of an atomic comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    /// The operator that holds exactly when `self` does not.
    pub fn negate(self) -> Self {
        match self {
            CmpOp::Eq => CmpOp::Ne,
            CmpOp::Ne => CmpOp::Eq,
            CmpOp::Lt => CmpOp::Ge,
            CmpOp::Le => CmpOp::Gt,
            CmpOp::Gt => CmpOp::Le,
            CmpOp::Ge => CmpOp::Lt,
        }
    }

    /// The operator with its operands swapped.
    pub fn flip(self) -> Self {
        match self {
            CmpOp::Lt => CmpOp::Gt,
            CmpOp::Le => CmpOp::Ge,
            CmpOp::Gt => CmpOp::Lt,
            CmpOp::Ge => CmpOp::Le,
            other => other,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }
}

/// A boolean formula over terms.
#[derive(Debug, Clone, PartialEq)]
pub enum Formula {
    Const(bool),
    Cmp(CmpOp, Term, Term),
    And(Vec<Formula>),
    Or(Vec<Formula>),
    Not(Box<Formula>),
    Implies(Box<Formula>, Box<Formula>),
}

impl Formula {
    pub fn cmp(op: CmpOp, left: impl Into<Term>, right: impl Into<Term>) -> Self {
        Formula::Cmp(op, left.into(), right.into())
    }

    pub fn eq(left: impl Into<Term>, right: impl Into<Term>) -> Self {
        Self::cmp(CmpOp::Eq, left, right)
    }

    pub fn ne(left: impl Into<Term>, right: impl Into<Term>) -> Self {
        Self::cmp(CmpOp::Ne, left, right)
    }

    pub fn lt(left: impl Into<Term>, right: impl Into<Term>) -> Self {
        Self::cmp(CmpOp::Lt, left, right)
    }

    pub fn le(left: impl Into<Term>, right: impl Into<Term>) -> Self {
        Self::cmp(CmpOp::Le, left, right)
    }

    pub fn gt(left: impl Into<Term>, right: impl Into<Term>) -> Self {
        Self::cmp(CmpOp::Gt, left, right)
    }

    pub fn ge(left: impl Into<Term>, right: impl Into<Term>) -> Self {
        Self::cmp(CmpOp::Ge, left, right)
    }

    pub fn and(parts: impl IntoIterator<Item = Formula>) -> Self {
        Formula::And(parts.into_iter().collect())
    }

    pub fn or(parts: impl IntoIterator<Item = Formula>) -> Self {
        Formula::Or(parts.into_iter().collect())
    }

    pub fn implies(self, consequent: Formula) -> Self {
        Formula::Implies(Box::new(self), Box::new(consequent))
    }

    /// Calls `f` for every variable occurrence.
    pub fn visit_vars(&self, f: &mut impl FnMut(&Variable)) {
        match self {
            Formula::Const(_) => {}
            Formula::Cmp(_, a, b) => {
                a.visit_vars(f);
                b.visit_vars(f);
            }
            Formula::And(parts) | Formula::Or(parts) => {
                parts.iter().for_each(|p| p.visit_vars(f));
            }
            Formula::Not(inner) => inner.visit_vars(f),
            Formula::Implies(p, q) => {
                p.visit_vars(f);
                q.visit_vars(f);
            }
        }
    }
}

impl Not for Formula {
    type Output = Formula;

    fn not(self) -> Formula {
        match self {
            Formula::Const(b) => Formula::Const(!b),
            Formula::Not(inner) => *inner,
            other => Formula::Not(Box::new(other)),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Const(v) => write!(f, "{v}"),
            Term::Var(v) => write!(f, "{v}"),
            Term::Add(a, b) => write!(f, "({a} + {b})"),
            Term::Sub(a, b) => write!(f, "({a} - {b})"),
            Term::Mul(a, b) => write!(f, "({a} * {b})"),
            Term::Div(a, b) => write!(f, "({a} / {b})"),
            Term::Neg(a) => write!(f, "-{a}"),
            Term::Sqrt(a) => write!(f, "sqrt({a})"),
            Term::Floor(a) => write!(f, "floor({a})"),
            Term::Min(a, b) => write!(f, "min({a}, {b})"),
            Term::Max(a, b) => write!(f, "max({a}, {b})"),
            Term::Ite {
                cond,
                then_term,
                else_term,
            } => write!(f, "if({cond}, {then_term}, {else_term})"),
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, parts: &[Formula], sep: &str) -> fmt::Result {
            f.write_str("(")?;
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    f.write_str(sep)?;
                }
                write!(f, "{part}")?;
            }
            f.write_str(")")
        }

        match self {
            Formula::Const(b) => write!(f, "{b}"),
            Formula::Cmp(op, a, b) => write!(f, "{a} {} {b}", op.symbol()),
            Formula::And(parts) => join(f, parts, " && "),
            Formula::Or(parts) => join(f, parts, " || "),
            Formula::Not(inner) => write!(f, "!({inner})"),
            Formula::Implies(p, q) => write!(f, "({p} => {q})"),
        }
    }
}
