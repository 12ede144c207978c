//! Row types for the observation CSV files.

use serde::{Deserialize, Serialize};

use crate::features::Conditions;
use crate::track::Track;

/// `Mortality.csv`: counts of live and dead mussels per tank and day.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MortalityRecord {
    #[serde(rename = "Tank")]
    pub tank: u32,
    #[serde(rename = "Day")]
    pub day: u32,
    #[serde(rename = "Treatment")]
    pub treatment: Track,
    #[serde(rename = "Alive")]
    pub alive: Option<f64>,
    #[serde(rename = "Dead")]
    pub dead: Option<f64>,
}

/// `Copper.csv`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CopperRecord {
    #[serde(rename = "Tank", default)]
    pub tank: Option<u32>,
    #[serde(rename = "Day")]
    pub day: u32,
    #[serde(rename = "Treatment")]
    pub treatment: Track,
    #[serde(rename = "Copper")]
    pub copper: Option<f64>,
}

/// `Water Chemistry.csv`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ChemistryRecord {
    #[serde(rename = "Tank", default)]
    pub tank: Option<u32>,
    #[serde(rename = "Day")]
    pub day: u32,
    #[serde(rename = "Treatment")]
    pub treatment: Track,
    #[serde(rename = "pH")]
    pub ph: Option<f64>,
    #[serde(rename = "Dissolved Oxygen")]
    pub dissolved_oxygen: Option<f64>,
    #[serde(rename = "Specific Conductance")]
    pub specific_conductance: Option<f64>,
    #[serde(rename = "Temperature")]
    pub temperature: Option<f64>,
}

/// `Length.csv`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LengthRecord {
    #[serde(rename = "Length")]
    pub length: Option<f64>,
}

/// `Alkalinity and Hardness.csv`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AlkalinityRecord {
    #[serde(rename = "Tank", default)]
    pub tank: Option<u32>,
    #[serde(rename = "Day")]
    pub day: u32,
    #[serde(rename = "Treatment")]
    pub treatment: Track,
    #[serde(rename = "Alkalinity")]
    pub alkalinity: Option<f64>,
    #[serde(rename = "Hardness")]
    pub hardness: Option<f64>,
}

/// `Final_Merged_Dataset.csv`: mortality counts joined with chemistry.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MergedRecord {
    #[serde(rename = "Tank")]
    pub tank: u32,
    #[serde(rename = "Day")]
    pub day: u32,
    #[serde(rename = "Treatment")]
    pub treatment: Track,
    #[serde(rename = "Alive")]
    pub alive: Option<f64>,
    #[serde(rename = "Dead")]
    pub dead: Option<f64>,
    #[serde(rename = "Copper")]
    pub copper: Option<f64>,
    #[serde(rename = "Temperature")]
    pub temperature: Option<f64>,
    #[serde(rename = "pH")]
    pub ph: Option<f64>,
    #[serde(rename = "Dissolved Oxygen")]
    pub dissolved_oxygen: Option<f64>,
}

impl MergedRecord {
    /// The predictor inputs of this row, if every feature is present.
    pub fn conditions(&self) -> Option<Conditions> {
        let present = |v: Option<f64>| v.filter(|x| !x.is_nan());
        Some(Conditions::new(
            present(self.copper)?,
            present(self.temperature)?,
            present(self.ph)?,
            present(self.dissolved_oxygen)?,
            self.treatment.flag(),
        ))
    }
}
