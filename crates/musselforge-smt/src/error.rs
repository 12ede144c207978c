//! Solver error types.

use thiserror::Error;

/// Misuse of the solver API.
///
/// Unsatisfiability is not an error; see [`SolverResult`](crate::SolverResult).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    /// The search space is unbounded, so any verdict would be meaningless
    #[error("variable '{0}' has no bound constraint")]
    UnboundedVariable(String),

    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    #[error("pop called without a matching push")]
    EmptyScopeStack,

    #[error("invalid bound for '{name}': [{lo}, {hi}]")]
    InvalidBound { name: String, lo: f64, hi: f64 },
}
