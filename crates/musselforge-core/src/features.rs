//! Environmental features shared by the predictor and the decision rules.

use std::fmt;
use std::ops::{Div, Sub};

use serde::{Deserialize, Serialize};

use crate::track::TreatmentFlag;

/// A predictor input feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Copper,
    Temperature,
    Ph,
    DissolvedOxygen,
    Treatment,
}

impl Feature {
    /// The four continuous features, in training column order.
    pub const CONTINUOUS: [Feature; 4] = [
        Feature::Copper,
        Feature::Temperature,
        Feature::Ph,
        Feature::DissolvedOxygen,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Feature::Copper => "copper",
            Feature::Temperature => "temperature",
            Feature::Ph => "ph",
            Feature::DissolvedOxygen => "dissolved_oxygen",
            Feature::Treatment => "treatment",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Scalar types the normalizer and decision rules can operate on.
///
/// Implemented for `f64` here and for symbolic quantities by the solver
/// crate, so one normalization routine serves both.
pub trait Scalar: Clone + Sub<f64, Output = Self> + Div<f64, Output = Self> {
    /// Maps a treatment indicator to `1` when it equals `1`, else `0`.
    fn indicator(self) -> Self;
}

impl Scalar for f64 {
    fn indicator(self) -> Self {
        TreatmentFlag::from_indicator(self).as_f64()
    }
}

/// One value per feature.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Features<T> {
    pub copper: T,
    pub temperature: T,
    pub ph: T,
    pub dissolved_oxygen: T,
    pub treatment: T,
}

impl<T> Features<T> {
    pub fn get(&self, feature: Feature) -> &T {
        match feature {
            Feature::Copper => &self.copper,
            Feature::Temperature => &self.temperature,
            Feature::Ph => &self.ph,
            Feature::DissolvedOxygen => &self.dissolved_oxygen,
            Feature::Treatment => &self.treatment,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(Feature, T) -> U) -> Features<U> {
        Features {
            copper: f(Feature::Copper, self.copper),
            temperature: f(Feature::Temperature, self.temperature),
            ph: f(Feature::Ph, self.ph),
            dissolved_oxygen: f(Feature::DissolvedOxygen, self.dissolved_oxygen),
            treatment: f(Feature::Treatment, self.treatment),
        }
    }
}

/// Concrete environmental conditions for one prediction.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Conditions {
    /// Copper concentration (mg/L).
    pub copper: f64,
    /// Water temperature (°C).
    pub temperature: f64,
    pub ph: f64,
    /// Dissolved oxygen (mg/L).
    pub dissolved_oxygen: f64,
    pub treatment: TreatmentFlag,
}

impl Conditions {
    pub fn new(
        copper: f64,
        temperature: f64,
        ph: f64,
        dissolved_oxygen: f64,
        treatment: TreatmentFlag,
    ) -> Self {
        Self {
            copper,
            temperature,
            ph,
            dissolved_oxygen,
            treatment,
        }
    }

    pub fn features(&self) -> Features<f64> {
        Features {
            copper: self.copper,
            temperature: self.temperature,
            ph: self.ph,
            dissolved_oxygen: self.dissolved_oxygen,
            treatment: self.treatment.as_f64(),
        }
    }

    /// Sum of absolute differences over the four continuous features.
    pub fn manhattan_distance(&self, other: &Conditions) -> f64 {
        (self.copper - other.copper).abs()
            + (self.temperature - other.temperature).abs()
            + (self.ph - other.ph).abs()
            + (self.dissolved_oxygen - other.dissolved_oxygen).abs()
    }
}

impl fmt::Display for Conditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Copper: {:.3} mg/L, Temp: {:.1} C, pH: {:.2}, Oxygen: {:.2} mg/L, Treatment: {}",
            self.copper,
            self.temperature,
            self.ph,
            self.dissolved_oxygen,
            u8::from(self.treatment)
        )
    }
}
