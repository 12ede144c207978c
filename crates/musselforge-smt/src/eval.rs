//! Point evaluation of terms and formulas.

use crate::term::{CmpOp, Formula, Term};

/// Evaluates `term` with variable values indexed by [`VarId`](crate::VarId).
///
/// Unknown variables evaluate to NaN, which fails every comparison.
pub fn eval_term(term: &Term, values: &[f64]) -> f64 {
    match term {
        Term::Const(v) => *v,
        Term::Var(v) => values.get(v.id().index()).copied().unwrap_or(f64::NAN),
        Term::Add(a, b) => eval_term(a, values) + eval_term(b, values),
        Term::Sub(a, b) => eval_term(a, values) - eval_term(b, values),
        Term::Mul(a, b) => eval_term(a, values) * eval_term(b, values),
        Term::Div(a, b) => eval_term(a, values) / eval_term(b, values),
        Term::Neg(a) => -eval_term(a, values),
        Term::Sqrt(a) => eval_term(a, values).max(0.0).sqrt(),
        Term::Floor(a) => eval_term(a, values).floor(),
        Term::Min(a, b) => eval_term(a, values).min(eval_term(b, values)),
        Term::Max(a, b) => eval_term(a, values).max(eval_term(b, values)),
        Term::Ite {
            cond,
            then_term,
            else_term,
        } => {
            // Branch selection is exact so it agrees with interval truth.
            if eval_formula(cond, values, 0.0) {
                eval_term(then_term, values)
            } else {
                eval_term(else_term, values)
            }
        }
    }
}

/// Evaluates `formula`; equalities and non-strict comparisons accept a
/// relative error of `tol`.
pub fn eval_formula(formula: &Formula, values: &[f64], tol: f64) -> bool {
    match formula {
        Formula::Const(b) => *b,
        Formula::Cmp(op, a, b) => compare(*op, eval_term(a, values), eval_term(b, values), tol),
        Formula::And(parts) => parts.iter().all(|p| eval_formula(p, values, tol)),
        Formula::Or(parts) => parts.iter().any(|p| eval_formula(p, values, tol)),
        Formula::Not(inner) => !eval_formula(inner, values, tol),
        Formula::Implies(p, q) => !eval_formula(p, values, tol) || eval_formula(q, values, tol),
    }
}

pub(crate) fn slack(a: f64, b: f64, tol: f64) -> f64 {
    tol * (1.0 + a.abs().max(b.abs()))
}

fn compare(op: CmpOp, a: f64, b: f64, tol: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return false;
    }
    let s = slack(a, b, tol);
    match op {
        CmpOp::Eq => (a - b).abs() <= s,
        CmpOp::Ne => (a - b).abs() > s,
        CmpOp::Lt => a < b,
        CmpOp::Le => a <= b + s,
        CmpOp::Gt => a > b,
        CmpOp::Ge => a + s >= b,
    }
}
