//! The mortality predictor seam.

use crate::features::Conditions;

/// A fitted regression model mapping conditions to a mortality rate.
///
/// Implementations must be pure: repeated calls with the same conditions
/// return the same value, which lies in `[0, 1]`.
pub trait MortalityPredictor {
    fn predict(&self, conditions: &Conditions) -> f64;
}

impl<F> MortalityPredictor for F
where
    F: Fn(&Conditions) -> f64,
{
    fn predict(&self, conditions: &Conditions) -> f64 {
        self(conditions)
    }
}
