//! Training-set preparation.
//!
//! Rows come from the merged mortality/chemistry table. The target is the
//! cumulative mortality rate of each tank, and the feature vector is the
//! normalized water chemistry followed by a one-hot treatment encoding:
//!
//! | column | value |
//! |---|---|
//! | 0 | copper |
//! | 1 | temperature |
//! | 2 | pH |
//! | 3 | dissolved oxygen |
//! | 4 | `Treatment_C` |
//! | 5 | `Treatment_T` |


use std::collections::HashMap;

use musselforge_core::{Conditions, FeatureNormalizer, MergedRecord, Track};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use crate::error::{LearnError, Result};

pub const N_FEATURES: usize = 6;
pub const TREATMENT_C: usize = 4;
pub const TREATMENT_T: usize = 5;

pub const FEATURE_NAMES: [&str; N_FEATURES] = [
    "copper",
    "temperature",
    "ph",
    "dissolved_oxygen",
    "treatment_c",
    "treatment_t",
];

/// One labeled observation.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRow {
    pub tank: u32,
    pub day: u32,
    pub conditions: Conditions,
    /// Cumulative deaths over cumulative deaths plus live count.
    pub mortality: f64,
}

/// Builds labeled rows from merged records.
///
/// Rows before `min_day` are dropped, then deaths are accumulated per
/// (tank, treatment) in day order. An undefined rate counts as zero. Rows
/// missing any chemistry feature are skipped after accumulation.
pub fn prepare(records: &[MergedRecord], min_day: u32) -> Vec<TrainingRow> {
    let mut kept: Vec<&MergedRecord> = records.iter().filter(|r| r.day >= min_day).collect();
    kept.sort_by_key(|r| (r.tank, r.treatment, r.day));

    let mut cumulative: HashMap<(u32, Track), f64> = HashMap::new();
    let mut rows = Vec::with_capacity(kept.len());
    let mut skipped = 0usize;
    for record in kept {
        let total = cumulative.entry((record.tank, record.treatment)).or_insert(0.0);
        if let Some(dead) = record.dead.filter(|d| !d.is_nan()) {
            *total += dead;
        }
        let deaths = *total;
        let rate = record
            .alive
            .map(|alive| deaths / (alive + deaths))
            .filter(|r| r.is_finite())
            .unwrap_or(0.0);
        match record.conditions() {
            Some(conditions) => rows.push(TrainingRow {
                tank: record.tank,
                day: record.day,
                conditions,
                mortality: rate,
            }),
            None => skipped += 1,
        }
    }
    debug!(event = "training_rows", rows = rows.len(), skipped);
    rows
}

/// Encodes conditions as the six-column feature vector.
pub fn encode(normalizer: &FeatureNormalizer, conditions: &Conditions) -> Vec<f64> {
    let scaled = normalizer.normalize_conditions(conditions);
    vec![
        scaled.copper,
        scaled.temperature,
        scaled.ph,
        scaled.dissolved_oxygen,
        1.0 - scaled.treatment,
        scaled.treatment,
    ]
}

/// Dense feature matrix with targets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    features: Vec<Vec<f64>>,
    targets: Vec<f64>,
}

impl Dataset {
    pub fn new(features: Vec<Vec<f64>>, targets: Vec<f64>) -> Result<Self> {
        if features.len() != targets.len() {
            return Err(LearnError::DimensionMismatch {
                expected: features.len(),
                actual: targets.len(),
            });
        }
        if let Some(width) = features.first().map(Vec::len) {
            if let Some(bad) = features.iter().find(|row| row.len() != width) {
                return Err(LearnError::DimensionMismatch {
                    expected: width,
                    actual: bad.len(),
                });
            }
        }
        Ok(Self { features, targets })
    }

    /// Encodes prepared rows with `normalizer`.
    pub fn from_rows(rows: &[TrainingRow], normalizer: &FeatureNormalizer) -> Self {
        Self {
            features: rows
                .iter()
                .map(|r| encode(normalizer, &r.conditions))
                .collect(),
            targets: rows.iter().map(|r| r.mortality).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.features.first().map_or(0, Vec::len)
    }

    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    pub fn row(&self, i: usize) -> (&[f64], f64) {
        (&self.features[i], self.targets[i])
    }

    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            targets: indices.iter().map(|&i| self.targets[i]).collect(),
        }
    }

    /// Seeded shuffle split into `(train, test)`; the test side gets
    /// `ceil(len * test_fraction)` rows.
    pub fn split(&self, test_fraction: f64, seed: u64) -> (Dataset, Dataset) {
        let mut indices: Vec<usize> = (0..self.len()).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);
        let n_test = ((self.len() as f64) * test_fraction).ceil() as usize;
        let n_test = n_test.min(self.len());
        let (test, train) = indices.split_at(n_test);
        (self.subset(train), self.subset(test))
    }
}
