//! Experimental tracks.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two parallel experimental conditions.
///
/// Serialized as the categorical `Treatment` column of the input tables
/// (`"C"` for control tanks, `"T"` for copper-treated tanks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub enum Track {
    #[serde(rename = "C")]
    Control,
    #[serde(rename = "T")]
    Treatment,
}

impl Track {
    pub const ALL: [Track; 2] = [Track::Control, Track::Treatment];

    /// Suffix used to namespace solver variables per track.
    pub fn namespace(self) -> &'static str {
        match self {
            Track::Control => "control",
            Track::Treatment => "treatment",
        }
    }

    /// The binary treatment indicator consumed by the predictor.
    pub fn flag(self) -> TreatmentFlag {
        match self {
            Track::Control => TreatmentFlag::Untreated,
            Track::Treatment => TreatmentFlag::Treated,
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.namespace())
    }
}

/// Binary treatment indicator, `0` or `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum TreatmentFlag {
    #[default]
    Untreated,
    Treated,
}

impl TreatmentFlag {
    pub fn as_f64(self) -> f64 {
        match self {
            TreatmentFlag::Untreated => 0.0,
            TreatmentFlag::Treated => 1.0,
        }
    }

    /// Any indicator other than exactly `1` counts as untreated.
    pub fn from_indicator(indicator: f64) -> Self {
        if indicator == 1.0 {
            TreatmentFlag::Treated
        } else {
            TreatmentFlag::Untreated
        }
    }
}

impl From<TreatmentFlag> for u8 {
    fn from(flag: TreatmentFlag) -> u8 {
        match flag {
            TreatmentFlag::Untreated => 0,
            TreatmentFlag::Treated => 1,
        }
    }
}

impl TryFrom<u8> for TreatmentFlag {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(TreatmentFlag::Untreated),
            1 => Ok(TreatmentFlag::Treated),
            other => Err(format!("treatment flag must be 0 or 1, got {other}")),
        }
    }
}
