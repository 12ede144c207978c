//! Min-max feature normalization.
//!
//! Continuous features are mapped onto `[0, 1]` using the range observed in
//! the fitted training set. The treatment indicator is not scaled: it maps
//! to `1` when the indicator is exactly `1`, otherwise `0`.
//!
//! Normalization is generic over [`Scalar`], so the same routine produces a
//! concrete value for the predictor or a symbolic term for the solver.

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

use crate::error::{MusselError, Result};
use crate::features::{Conditions, Feature, Features, Scalar};

/// Observed `[min, max]` of one continuous feature.
///
/// Construction rejects zero-width and non-finite ranges, so every
/// normalization performed through a `FeatureRange` is well defined.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct FeatureRange {
    min: f64,
    max: f64,
}

impl FeatureRange {
    pub fn new(feature: Feature, min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(MusselError::DegenerateNormalization {
                feature: feature.to_string(),
                value: if min.is_finite() { max } else { min },
            });
        }
        if max <= min {
            return Err(MusselError::DegenerateNormalization {
                feature: feature.to_string(),
                value: min,
            });
        }
        Ok(Self { min, max })
    }

    /// Fits the range over observed values, skipping NaN entries.
    pub fn fit(feature: Feature, values: impl IntoIterator<Item = f64>) -> Result<Self> {
        let (min, max) = values
            .into_iter()
            .filter(|v| !v.is_nan())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if min > max {
            return Err(MusselError::InvalidData(format!(
                "no observed values for feature {feature}"
            )));
        }
        Self::new(feature, min, max)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// `(value - min) / (max - min)`.
    pub fn normalize<T: Scalar>(&self, value: T) -> T {
        (value - self.min) / self.width()
    }

    /// Inverse of [`normalize`](Self::normalize); exact at `0` and `1`.
    pub fn denormalize(&self, scaled: f64) -> f64 {
        self.min * (1.0 - scaled) + self.max * scaled
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Normalization statistics for the four continuous predictor features.
///
/// Read-only after fitting; shared by every scenario built in a run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FeatureNormalizer {
    pub copper: FeatureRange,
    pub temperature: FeatureRange,
    pub ph: FeatureRange,
    pub dissolved_oxygen: FeatureRange,
}

impl FeatureNormalizer {
    pub fn new(
        copper: FeatureRange,
        temperature: FeatureRange,
        ph: FeatureRange,
        dissolved_oxygen: FeatureRange,
    ) -> Self {
        Self {
            copper,
            temperature,
            ph,
            dissolved_oxygen,
        }
    }

    /// Fits all four ranges from raw condition rows.
    pub fn fit<'a>(rows: impl IntoIterator<Item = &'a Conditions> + Clone) -> Result<Self> {
        Ok(Self {
            copper: FeatureRange::fit(Feature::Copper, rows.clone().into_iter().map(|c| c.copper))?,
            temperature: FeatureRange::fit(
                Feature::Temperature,
                rows.clone().into_iter().map(|c| c.temperature),
            )?,
            ph: FeatureRange::fit(Feature::Ph, rows.clone().into_iter().map(|c| c.ph))?,
            dissolved_oxygen: FeatureRange::fit(
                Feature::DissolvedOxygen,
                rows.into_iter().map(|c| c.dissolved_oxygen),
            )?,
        })
    }

    /// Returns the range for a continuous feature; `None` for treatment.
    pub fn range(&self, feature: Feature) -> Option<&FeatureRange> {
        match feature {
            Feature::Copper => Some(&self.copper),
            Feature::Temperature => Some(&self.temperature),
            Feature::Ph => Some(&self.ph),
            Feature::DissolvedOxygen => Some(&self.dissolved_oxygen),
            Feature::Treatment => None,
        }
    }

    pub fn normalize<T: Scalar>(&self, raw: Features<T>) -> Features<T> {
        raw.map(|feature, value| match self.range(feature) {
            Some(range) => range.normalize(value),
            None => value.indicator(),
        })
    }

    pub fn normalize_conditions(&self, conditions: &Conditions) -> Features<f64> {
        self.normalize(conditions.features())
    }
}
