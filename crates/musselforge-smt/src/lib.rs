//! MusselForge SMT - Symbolic constraints and a small constraint solver
//!
//! This crate provides:
//! - [`Term`] and [`Formula`] expression trees with operator overloading
//! - [`Quantity`], which folds concrete arithmetic and builds terms otherwise
//! - [`Solver`], an interval branch-and-prune backend with scoped
//!   push/pop, satisfiability checks and objective optimization
//!
//! The backend is complete for bounded problems up to its precision and
//! node budget. A budget that runs out yields [`SolverResult::Unknown`],
//! never a satisfying model.

mod error;
mod eval;
mod interval;
mod model;
mod propagate;
mod quantity;
mod search;
mod solver;
mod term;

pub use error::SolverError;
pub use eval::{eval_formula, eval_term};
pub use interval::Interval;
pub use model::Model;
pub use quantity::{Condition, Quantity};
pub use solver::{Scope, Solver, SolverResult, UnknownReason};
pub use term::{CmpOp, Formula, Sort, Term, VarId, Variable};
