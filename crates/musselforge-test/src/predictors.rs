//! Closed-form predictors standing in for a fitted model.

use musselforge_core::{Conditions, MortalityPredictor};

/// Returns the same rate for every input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constant(pub f64);

impl MortalityPredictor for Constant {
    fn predict(&self, _conditions: &Conditions) -> f64 {
        self.0
    }
}

/// `above` once copper reaches `threshold`, `below` otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CopperThreshold {
    pub threshold: f64,
    pub below: f64,
    pub above: f64,
}

impl MortalityPredictor for CopperThreshold {
    fn predict(&self, conditions: &Conditions) -> f64 {
        if conditions.copper >= self.threshold {
            self.above
        } else {
            self.below
        }
    }
}

/// `slope * copper`, clamped to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CopperRamp {
    pub slope: f64,
}

impl MortalityPredictor for CopperRamp {
    fn predict(&self, conditions: &Conditions) -> f64 {
        (self.slope * conditions.copper).clamp(0.0, 1.0)
    }
}
