//! Cross-checks solver answers against the predictor and observed rows.


use musselforge_core::{Conditions, MortalityPredictor};
use musselforge_learn::TrainingRow;
use serde::Serialize;
use tracing::info;

/// How the target is compared against a mortality value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Threshold {
    /// `value >= target`.
    AtLeast,
    /// `value > target`.
    Above,
}

impl Threshold {
    pub fn holds(self, value: f64, target: f64) -> bool {
        match self {
            Threshold::AtLeast => value >= target,
            Threshold::Above => value > target,
        }
    }
}

/// Whether the solver's feasibility claim matches the predictor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Agreement {
    pub predicted: f64,
    pub target: f64,
    pub solver_feasible: bool,
    pub predictor_meets: bool,
}

impl Agreement {
    pub fn agrees(&self) -> bool {
        self.solver_feasible == self.predictor_meets
    }
}

/// The observed row closest to a scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborMatch {
    pub tank: u32,
    pub day: u32,
    pub conditions: Conditions,
    /// Sum of absolute differences over the four continuous features.
    pub distance: f64,
    pub actual: f64,
    pub predicted: f64,
}

impl NeighborMatch {
    /// `1 - |predicted - actual|`.
    pub fn accuracy(&self) -> f64 {
        1.0 - (self.predicted - self.actual).abs()
    }
}

/// Nearest row by Manhattan distance, preferring rows with the same
/// treatment flag. Ties keep the earliest row.
pub fn nearest_neighbor<'r>(
    rows: &'r [TrainingRow],
    conditions: &Conditions,
) -> Option<(&'r TrainingRow, f64)> {
    let same_flag = rows
        .iter()
        .any(|r| r.conditions.treatment == conditions.treatment);
    rows.iter()
        .filter(|r| !same_flag || r.conditions.treatment == conditions.treatment)
        .map(|r| (r, r.conditions.manhattan_distance(conditions)))
        .fold(None, |best: Option<(&TrainingRow, f64)>, (row, d)| match best {
            Some((_, best_d)) if best_d <= d => best,
            _ => Some((row, d)),
        })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossValidation {
    pub conditions: Conditions,
    pub agreement: Agreement,
    pub neighbor: Option<NeighborMatch>,
}

pub struct CrossValidator<'a, P: ?Sized> {
    predictor: &'a P,
    rows: &'a [TrainingRow],
}

impl<'a, P: MortalityPredictor + ?Sized> CrossValidator<'a, P> {
    pub fn new(predictor: &'a P, rows: &'a [TrainingRow]) -> Self {
        Self { predictor, rows }
    }

    pub fn agreement(
        &self,
        conditions: &Conditions,
        target: f64,
        threshold: Threshold,
        solver_feasible: bool,
    ) -> Agreement {
        let predicted = self.predictor.predict(conditions);
        Agreement {
            predicted,
            target,
            solver_feasible,
            predictor_meets: threshold.holds(predicted, target),
        }
    }

    pub fn neighbor(&self, conditions: &Conditions) -> Option<NeighborMatch> {
        let (row, distance) = nearest_neighbor(self.rows, conditions)?;
        Some(NeighborMatch {
            tank: row.tank,
            day: row.day,
            conditions: row.conditions,
            distance,
            actual: row.mortality,
            predicted: self.predictor.predict(conditions),
        })
    }

    pub fn validate(
        &self,
        conditions: &Conditions,
        target: f64,
        threshold: Threshold,
        solver_feasible: bool,
    ) -> CrossValidation {
        let agreement = self.agreement(conditions, target, threshold, solver_feasible);
        let neighbor = self.neighbor(conditions);
        info!(
            event = "cross_validated",
            predicted = agreement.predicted,
            target,
            agrees = agreement.agrees(),
            accuracy = neighbor.as_ref().map(NeighborMatch::accuracy),
        );
        CrossValidation {
            conditions: *conditions,
            agreement,
            neighbor,
        }
    }
}
