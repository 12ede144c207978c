//! Observed environmental time series and the missing-data fallback chain.
//!
//! Every covariate is stored as a daily series per track. Lookups for a
//! simulated day resolve through a fixed chain:
//!
//! 1. the requested day, when observed;
//! 2. the nearest prior observed day;
//! 3. past the observed window, the configured [`Extrapolation`];
//!
//! and fail with [`MusselError::MissingData`] once the chain is exhausted.
//! Nothing ever defaults to zero.

mod records;


use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{MusselError, Result};
use crate::track::Track;

pub use records::{
    AlkalinityRecord, ChemistryRecord, CopperRecord, LengthRecord, MergedRecord, MortalityRecord,
};

pub const MORTALITY_FILE: &str = "Mortality.csv";
pub const COPPER_FILE: &str = "Copper.csv";
pub const CHEMISTRY_FILE: &str = "Water Chemistry.csv";
pub const LENGTH_FILE: &str = "Length.csv";
pub const ALKALINITY_FILE: &str = "Alkalinity and Hardness.csv";
pub const MERGED_FILE: &str = "Final_Merged_Dataset.csv";

/// An exogenous quantity pulled from the observation tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Covariate {
    Copper,
    Ph,
    DissolvedOxygen,
    SpecificConductance,
    Temperature,
    Alkalinity,
    Hardness,
    /// Live mussel count per tank.
    Alive,
    /// Shell length; pooled over all days and tracks.
    MusselSize,
}

impl Covariate {
    /// Covariates carried through every simulated day.
    pub const ENVIRONMENT: [Covariate; 8] = [
        Covariate::Copper,
        Covariate::Ph,
        Covariate::DissolvedOxygen,
        Covariate::SpecificConductance,
        Covariate::Temperature,
        Covariate::MusselSize,
        Covariate::Alkalinity,
        Covariate::Hardness,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Covariate::Copper => "copper_concentration",
            Covariate::Ph => "ph",
            Covariate::DissolvedOxygen => "dissolved_oxygen",
            Covariate::SpecificConductance => "specific_conductance",
            Covariate::Temperature => "temperature",
            Covariate::Alkalinity => "alkalinity",
            Covariate::Hardness => "hardness",
            Covariate::Alive => "alive",
            Covariate::MusselSize => "zebra_mussel_size",
        }
    }
}

impl fmt::Display for Covariate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How values are produced for days past the observed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Extrapolation {
    /// Repeat the last observed day's value.
    HoldLast,
    /// Mean of every observation in `from..=to`, falling back to the last
    /// observed value when the window is empty.
    WindowMean { from: u32, to: u32 },
}

impl Default for Extrapolation {
    fn default() -> Self {
        Extrapolation::WindowMean { from: 5, to: 10 }
    }
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValueSource {
    Observed { day: u32 },
    PriorDay { day: u32 },
    WindowMean { from: u32, to: u32 },
    HeldLast { day: u32 },
    Pooled,
}

/// A looked-up covariate value and its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Resolved {
    pub value: f64,
    pub source: ValueSource,
}

impl Resolved {
    pub fn is_fallback(&self) -> bool {
        !matches!(self.source, ValueSource::Observed { .. } | ValueSource::Pooled)
    }
}

/// Daily observations of one covariate, keyed by track and day.
///
/// NaN measurements are dropped on insert, so a present key always holds
/// at least one finite value.
#[derive(Debug, Clone, Default)]
pub struct DailySeries {
    values: BTreeMap<(Track, u32), Vec<f64>>,
}

impl DailySeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, track: Track, day: u32, value: f64) {
        if value.is_nan() {
            return;
        }
        self.values.entry((track, day)).or_default().push(value);
    }

    /// Mean of the observations on exactly `day`.
    pub fn mean_at(&self, track: Track, day: u32) -> Option<f64> {
        self.values.get(&(track, day)).map(|v| mean(v))
    }

    /// The nearest observed day at or before `day`, with its mean.
    pub fn latest_at_or_before(&self, track: Track, day: u32) -> Option<(u32, f64)> {
        self.values
            .range((track, 0)..=(track, day))
            .next_back()
            .map(|(&(_, d), v)| (d, mean(v)))
    }

    /// Mean of every observation with `from <= day <= to`.
    pub fn window_mean(&self, track: Track, from: u32, to: u32) -> Option<f64> {
        if from > to {
            return None;
        }
        let pooled: Vec<f64> = self
            .values
            .range((track, from)..=(track, to))
            .flat_map(|(_, v)| v.iter().copied())
            .collect();
        (!pooled.is_empty()).then(|| mean(&pooled))
    }

    pub fn last_day(&self, track: Track) -> Option<u32> {
        self.values
            .range((track, 0)..=(track, u32::MAX))
            .next_back()
            .map(|(&(_, d), _)| d)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Raw rows of the five observation files.
#[derive(Debug, Clone, Default)]
pub struct ObservationTables {
    pub mortality: Vec<MortalityRecord>,
    pub copper: Vec<CopperRecord>,
    pub chemistry: Vec<ChemistryRecord>,
    pub lengths: Vec<LengthRecord>,
    pub alkalinity_hardness: Vec<AlkalinityRecord>,
}

impl ObservationTables {
    /// Reads the five tables from `dir` using their conventional file names.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let tables = Self {
            mortality: read_csv(dir.join(MORTALITY_FILE))?,
            copper: read_csv(dir.join(COPPER_FILE))?,
            chemistry: read_csv(dir.join(CHEMISTRY_FILE))?,
            lengths: read_csv(dir.join(LENGTH_FILE))?,
            alkalinity_hardness: read_csv(dir.join(ALKALINITY_FILE))?,
        };
        info!(
            event = "observations_loaded",
            mortality_rows = tables.mortality.len(),
            copper_rows = tables.copper.len(),
            chemistry_rows = tables.chemistry.len(),
            length_rows = tables.lengths.len(),
            alkalinity_rows = tables.alkalinity_hardness.len(),
        );
        Ok(tables)
    }
}

/// Deserializes every row of a headed CSV file.
pub fn read_csv<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>> {
    let file = File::open(path.as_ref())?;
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);
    reader
        .deserialize()
        .collect::<std::result::Result<Vec<T>, csv::Error>>()
        .map_err(MusselError::from)
}

/// Loads `Final_Merged_Dataset.csv` rows.
pub fn load_merged(path: impl AsRef<Path>) -> Result<Vec<MergedRecord>> {
    read_csv(path)
}

/// Indexed observation series for every covariate.
///
/// Read-only once built; shared by every scenario in a run.
#[derive(Debug, Clone, Default)]
pub struct Observations {
    series: BTreeMap<Covariate, DailySeries>,
    lengths: Vec<f64>,
    mortality: Vec<MortalityRecord>,
}

impl Observations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tables(tables: ObservationTables) -> Self {
        let mut obs = Self::new();
        for row in &tables.copper {
            obs.insert_opt(Covariate::Copper, row.treatment, row.day, row.copper);
        }
        for row in &tables.chemistry {
            obs.insert_opt(Covariate::Ph, row.treatment, row.day, row.ph);
            obs.insert_opt(
                Covariate::DissolvedOxygen,
                row.treatment,
                row.day,
                row.dissolved_oxygen,
            );
            obs.insert_opt(
                Covariate::SpecificConductance,
                row.treatment,
                row.day,
                row.specific_conductance,
            );
            obs.insert_opt(Covariate::Temperature, row.treatment, row.day, row.temperature);
        }
        for row in &tables.alkalinity_hardness {
            obs.insert_opt(Covariate::Alkalinity, row.treatment, row.day, row.alkalinity);
            obs.insert_opt(Covariate::Hardness, row.treatment, row.day, row.hardness);
        }
        for row in &tables.lengths {
            if let Some(length) = row.length {
                obs.push_length(length);
            }
        }
        for row in tables.mortality {
            obs.push_mortality(row);
        }
        obs
    }

    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        ObservationTables::load_dir(dir).map(Self::from_tables)
    }

    fn insert_opt(&mut self, covariate: Covariate, track: Track, day: u32, value: Option<f64>) {
        if let Some(v) = value {
            self.insert(covariate, track, day, v);
        }
    }

    /// Records one measurement. Mussel sizes go through [`push_length`](Self::push_length).
    pub fn insert(&mut self, covariate: Covariate, track: Track, day: u32, value: f64) {
        if covariate == Covariate::MusselSize {
            self.push_length(value);
            return;
        }
        self.series.entry(covariate).or_default().insert(track, day, value);
    }

    pub fn push_length(&mut self, length: f64) {
        if !length.is_nan() {
            self.lengths.push(length);
        }
    }

    /// Records a mortality row; its live count also feeds the `Alive` series.
    pub fn push_mortality(&mut self, record: MortalityRecord) {
        if let Some(alive) = record.alive {
            self.insert(Covariate::Alive, record.treatment, record.day, alive);
        }
        self.mortality.push(record);
    }

    pub fn series(&self, covariate: Covariate) -> Option<&DailySeries> {
        self.series.get(&covariate)
    }

    pub fn mortality(&self) -> &[MortalityRecord] {
        &self.mortality
    }

    /// Mean shell length over every measurement.
    pub fn mussel_size(&self) -> Option<f64> {
        (!self.lengths.is_empty()).then(|| mean(&self.lengths))
    }

    /// Mean of the observations on exactly `day`, without fallback.
    pub fn mean_at(&self, covariate: Covariate, track: Track, day: u32) -> Option<f64> {
        if covariate == Covariate::MusselSize {
            return self.mussel_size();
        }
        self.series(covariate)?.mean_at(track, day)
    }

    /// Observed value for `day`, or the nearest prior observed day.
    ///
    /// # Errors
    ///
    /// [`MusselError::MissingData`] when neither `day` nor any earlier day
    /// has an observation.
    pub fn observed(&self, covariate: Covariate, track: Track, day: u32) -> Result<Resolved> {
        let missing = || MusselError::MissingData {
            covariate,
            track,
            day,
        };
        if covariate == Covariate::MusselSize {
            return self
                .mussel_size()
                .map(|value| Resolved {
                    value,
                    source: ValueSource::Pooled,
                })
                .ok_or_else(missing);
        }
        let (found, value) = self
            .series(covariate)
            .and_then(|s| s.latest_at_or_before(track, day))
            .ok_or_else(missing)?;
        let source = if found == day {
            ValueSource::Observed { day }
        } else {
            debug!(
                event = "exogenous_fallback",
                covariate = %covariate,
                track = %track,
                day,
                from_day = found,
            );
            ValueSource::PriorDay { day: found }
        };
        Ok(Resolved { value, source })
    }

    /// Resolves a covariate for any simulated day.
    ///
    /// Days up to `observed_through` use [`observed`](Self::observed); later
    /// days use `extrapolation`, whose window mean falls back to holding the
    /// last observed value.
    pub fn resolve(
        &self,
        covariate: Covariate,
        track: Track,
        day: u32,
        observed_through: u32,
        extrapolation: Extrapolation,
    ) -> Result<Resolved> {
        if day <= observed_through || covariate == Covariate::MusselSize {
            return self.observed(covariate, track, day);
        }
        if let Extrapolation::WindowMean { from, to } = extrapolation {
            if let Some(value) = self
                .series(covariate)
                .and_then(|s| s.window_mean(track, from, to))
            {
                return Ok(Resolved {
                    value,
                    source: ValueSource::WindowMean { from, to },
                });
            }
        }
        let held = self.observed(covariate, track, observed_through).map_err(|_| {
            MusselError::MissingData {
                covariate,
                track,
                day,
            }
        })?;
        let from_day = match held.source {
            ValueSource::Observed { day } | ValueSource::PriorDay { day } => day,
            _ => observed_through,
        };
        Ok(Resolved {
            value: held.value,
            source: ValueSource::HeldLast { day: from_day },
        })
    }

    /// Mortality rows joined with per-day copper and chemistry means.
    ///
    /// Rows lacking any exact-day measurement are dropped (inner join).
    pub fn merged_records(&self) -> Vec<MergedRecord> {
        self.mortality
            .iter()
            .filter_map(|row| {
                let at = |c| self.mean_at(c, row.treatment, row.day);
                Some(MergedRecord {
                    tank: row.tank,
                    day: row.day,
                    treatment: row.treatment,
                    alive: row.alive,
                    dead: row.dead,
                    copper: Some(at(Covariate::Copper)?),
                    temperature: Some(at(Covariate::Temperature)?),
                    ph: Some(at(Covariate::Ph)?),
                    dissolved_oxygen: Some(at(Covariate::DissolvedOxygen)?),
                })
            })
            .collect()
    }
}
