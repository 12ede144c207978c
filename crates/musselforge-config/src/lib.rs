//! Configuration system for MusselForge.
//!
//! Every ecological threshold, growth factor and search bound used by the
//! scenarios is provisional and lives here as data, so experiments can be
//! re-run with different constants without code changes.
//!
//! # Examples
//!
//! ```
//! use musselforge_config::MusselConfig;
//!
//! let config = MusselConfig::from_toml_str(r#"
//!     random_seed = 7
//!
//!     [ecology]
//!     carrying_capacity = 500
//!
//!     [simulation]
//!     horizon_days = 30
//! "#).unwrap();
//!
//! assert_eq!(config.random_seed, 7);
//! assert_eq!(config.ecology.carrying_capacity, 500.0);
//! assert_eq!(config.simulation.horizon_days, 30);
//! // Untouched sections keep their defaults
//! assert_eq!(config.search.tolerance, 0.01);
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use musselforge_config::MusselConfig;
//!
//! let config = MusselConfig::load("musselforge.toml").unwrap_or_default();
//! ```

#[cfg(test)]
mod tests;

use std::path::Path;
use std::time::Duration;

use musselforge_core::Extrapolation;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MusselConfig {
    /// Seed for the train/test split and the forest's bootstrap samples.
    #[serde(default = "default_seed")]
    pub random_seed: u64,

    #[serde(default)]
    pub ecology: EcologyConfig,

    #[serde(default)]
    pub simulation: SimulationConfig,

    #[serde(default)]
    pub solver: SolverSettings,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub optimize: OptimizeConfig,

    #[serde(default)]
    pub training: TrainingConfig,

    #[serde(default)]
    pub sunlight: SunlightConfig,
}

fn default_seed() -> u64 {
    42
}

impl Default for MusselConfig {
    fn default() -> Self {
        Self {
            random_seed: default_seed(),
            ecology: EcologyConfig::default(),
            simulation: SimulationConfig::default(),
            solver: SolverSettings::default(),
            search: SearchConfig::default(),
            optimize: OptimizeConfig::default(),
            training: TrainingConfig::default(),
            sunlight: SunlightConfig::default(),
        }
    }
}

impl MusselConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file, picking the format by extension.
    ///
    /// `.yaml` and `.yml` are parsed as YAML, anything else as TOML.
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist, fails to parse, or holds
    /// values rejected by [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the random seed.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Sets the number of simulated days.
    pub fn with_horizon(mut self, days: u32) -> Self {
        self.simulation.horizon_days = days;
        self
    }

    /// Sets the per-check solver time budget.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.solver.time_limit_ms = Some(limit.as_millis() as u64);
        self
    }

    /// Sets the exogenous extrapolation policy.
    pub fn with_extrapolation(mut self, extrapolation: Extrapolation) -> Self {
        self.simulation.extrapolation = extrapolation;
        self
    }

    /// Sets the population rule of one track.
    pub fn with_population_rule(
        mut self,
        track: musselforge_core::Track,
        rule: PopulationRule,
    ) -> Self {
        self.simulation.track_mut(track).population_rule = rule;
        self
    }

    /// Checks cross-field invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ecology.validate()?;
        self.search.validate()?;
        self.optimize.validate()?;
        self.sunlight.validate()?;
        if !(self.solver.precision > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "solver.precision must be positive, got {}",
                self.solver.precision
            )));
        }
        if !(0.0..1.0).contains(&self.training.test_fraction) {
            return Err(ConfigError::Invalid(format!(
                "training.test_fraction must lie in [0, 1), got {}",
                self.training.test_fraction
            )));
        }
        if self.training.forest_trees == 0 {
            return Err(ConfigError::Invalid("training.forest_trees must be at least 1".into()));
        }
        let sim = &self.simulation;
        if !(0.0..=1.0).contains(&sim.initial_clarity) || !(0.0..=1.0).contains(&sim.initial_oxygen) {
            return Err(ConfigError::Invalid(
                "simulation initial clarity and oxygen must lie in [0, 1]".into(),
            ));
        }
        Ok(())
    }
}

/// Inclusive numeric bounds; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Bounds {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl Bounds {
    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |lo| value >= lo) && self.max.map_or(true, |hi| value <= hi)
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        match (self.min, self.max) {
            (None, None) => Err(ConfigError::Invalid(format!("{name} needs at least one bound"))),
            (Some(lo), Some(hi)) if lo > hi => Err(ConfigError::Invalid(format!(
                "{name} lower bound {lo} exceeds upper bound {hi}"
            ))),
            _ => Ok(()),
        }
    }
}

/// One step of the copper mortality step function.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MortalityTier {
    /// Tier applies when the previous day's copper is at least this (mg/L).
    pub min_copper: f64,
    /// Fraction of the population lost.
    pub factor: f64,
}

/// Constants of the coupled population/clarity/plant/oxygen model.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct EcologyConfig {
    pub carrying_capacity: f64,
    pub max_plant_growth: f64,
    pub growth_rate: f64,
    pub plant_growth_factor: f64,
    pub clarity_threshold: f64,
    /// Multiplier on plant growth when clarity is below threshold.
    pub below_threshold_plant_factor: f64,
    pub oxygen_threshold: f64,
    pub oxygen_production: f64,
    pub plant_consumption: f64,
    pub mussel_consumption: f64,
    /// Ordered from highest `min_copper` down; copper below every tier
    /// yields zero mortality.
    pub mortality_tiers: Vec<MortalityTier>,
}

impl Default for EcologyConfig {
    fn default() -> Self {
        Self {
            carrying_capacity: 1000.0,
            max_plant_growth: 1.0,
            growth_rate: 0.1,
            plant_growth_factor: 0.8,
            clarity_threshold: 0.7,
            below_threshold_plant_factor: 0.5,
            oxygen_threshold: 0.6,
            oxygen_production: 0.5,
            plant_consumption: 0.2,
            mussel_consumption: 0.4,
            mortality_tiers: vec![
                MortalityTier {
                    min_copper: 0.5,
                    factor: 0.99,
                },
                MortalityTier {
                    min_copper: 0.2,
                    factor: 0.85,
                },
            ],
        }
    }
}

impl EcologyConfig {
    /// Mortality factor for a concrete copper concentration.
    pub fn mortality_factor(&self, copper: f64) -> f64 {
        self.mortality_tiers
            .iter()
            .find(|tier| copper >= tier.min_copper)
            .map_or(0.0, |tier| tier.factor)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.carrying_capacity >= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "ecology.carrying_capacity must be at least 1, got {}",
                self.carrying_capacity
            )));
        }
        for pair in self.mortality_tiers.windows(2) {
            if pair[0].min_copper <= pair[1].min_copper {
                return Err(ConfigError::Invalid(
                    "ecology.mortality_tiers must be ordered by decreasing min_copper".into(),
                ));
            }
        }
        if let Some(tier) = self
            .mortality_tiers
            .iter()
            .find(|t| !(0.0..=1.0).contains(&t.factor))
        {
            return Err(ConfigError::Invalid(format!(
                "mortality factor {} is outside [0, 1]",
                tier.factor
            )));
        }
        Ok(())
    }
}

/// Seed for the day-0 population.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InitialPopulation {
    /// A fixed count for every track.
    Fixed { count: u32 },
    /// Mean observed `Alive` count on `day` for the track.
    Observed { day: u32 },
}

impl Default for InitialPopulation {
    fn default() -> Self {
        InitialPopulation::Fixed { count: 50 }
    }
}

/// How a track's population evolves from one day to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PopulationRule {
    /// Capacity-limited growth gated by oxygen and copper mortality.
    #[default]
    Logistic,
    /// Observed mean live counts through `through_day`, then logistic.
    Observed { through_day: u32 },
}

/// Per-track simulation options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct TrackConfig {
    pub population_rule: PopulationRule,
}

/// Time-stepped simulation options.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct SimulationConfig {
    /// Number of simulated days (`Day(0)` through `Day(horizon_days - 1)`).
    pub horizon_days: u32,
    /// Last day whose exogenous values come from observations.
    pub observed_through_day: u32,
    pub extrapolation: Extrapolation,
    pub initial_clarity: f64,
    pub initial_oxygen: f64,
    pub initial_population: InitialPopulation,
    /// Require clarity never to decrease between consecutive days.
    pub clarity_monotone: bool,
    /// Add the copper/population and clarity/plant implication rules.
    pub domain_rules: bool,
    pub control: TrackConfig,
    pub treatment: TrackConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            horizon_days: 10,
            observed_through_day: 10,
            extrapolation: Extrapolation::default(),
            initial_clarity: 0.5,
            initial_oxygen: 0.8,
            initial_population: InitialPopulation::default(),
            clarity_monotone: true,
            domain_rules: false,
            control: TrackConfig::default(),
            treatment: TrackConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn track(&self, track: musselforge_core::Track) -> &TrackConfig {
        match track {
            musselforge_core::Track::Control => &self.control,
            musselforge_core::Track::Treatment => &self.treatment,
        }
    }

    pub fn track_mut(&mut self, track: musselforge_core::Track) -> &mut TrackConfig {
        match track {
            musselforge_core::Track::Control => &mut self.control,
            musselforge_core::Track::Treatment => &mut self.treatment,
        }
    }
}

/// Backend solver budget.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct SolverSettings {
    /// Maximum search nodes per `check()`.
    pub node_limit: u64,
    /// Wall-clock budget per `check()`, in milliseconds.
    pub time_limit_ms: Option<u64>,
    /// Width below which a box counts as a point.
    pub precision: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            node_limit: 200_000,
            time_limit_ms: None,
            precision: 1e-6,
        }
    }
}

impl SolverSettings {
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }
}

/// Copper bisection search against the predictor.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct SearchConfig {
    pub tolerance: f64,
    /// Predicted mortality the minimal dose must reach.
    pub target_mortality: f64,
    pub copper: Bounds,
    pub temperature: Bounds,
    pub ph: Bounds,
    pub dissolved_oxygen: Bounds,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.01,
            target_mortality: 0.60,
            copper: Bounds::between(0.001, 0.55),
            temperature: Bounds::between(10.0, 20.0),
            ph: Bounds::between(6.5, 9.0),
            dissolved_oxygen: Bounds::at_least(5.0),
        }
    }
}

impl SearchConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tolerance > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "search.tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        match (self.copper.min, self.copper.max) {
            (Some(lo), Some(hi)) if lo < hi => {}
            _ => {
                return Err(ConfigError::Invalid(
                    "search.copper needs finite min < max".into(),
                ))
            }
        }
        self.temperature.validate("search.temperature")?;
        self.ph.validate("search.ph")?;
        self.dissolved_oxygen.validate("search.dissolved_oxygen")
    }
}

/// Rules-based copper minimization.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct OptimizeConfig {
    /// Rules estimate must strictly exceed this.
    pub target_mortality: f64,
    pub copper: Bounds,
    pub temperature: Bounds,
    pub ph: Bounds,
    pub dissolved_oxygen: Bounds,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            target_mortality: 0.5,
            copper: Bounds::at_least(0.0),
            temperature: Bounds::between(5.0, 20.0),
            ph: Bounds::between(6.5, 9.0),
            dissolved_oxygen: Bounds::at_least(5.0),
        }
    }
}

impl OptimizeConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.copper.validate("optimize.copper")?;
        self.temperature.validate("optimize.temperature")?;
        self.ph.validate("optimize.ph")?;
        self.dissolved_oxygen.validate("optimize.dissolved_oxygen")
    }
}

/// Regression training options.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct TrainingConfig {
    pub test_fraction: f64,
    pub forest_trees: usize,
    /// Depth of the surrogate tree transcribed into decision rules.
    pub surrogate_max_depth: usize,
    /// Rows before this day are dropped from the training set.
    pub min_day: u32,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            forest_trees: 100,
            surrogate_max_depth: 5,
            min_day: 2,
        }
    }
}

/// Density, clarity and sunlight scenarios.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct SunlightConfig {
    /// Integer mussel density range searched for the clearest water.
    pub density: Bounds,
    /// Ten-day segments in the simulated year.
    pub segments: u32,
    pub segment_days: u32,
    pub initial_density: f64,
    /// Density that maps to a scaled density of 1.
    pub density_scale: f64,
    pub birth_rate: Bounds,
    pub death_rate: Bounds,
    /// Fraction of the density removed per segment by treatment.
    pub treatment_effect: f64,
    /// Sunlight penetration (m) that ends the year early.
    pub target_penetration: f64,
}

impl Default for SunlightConfig {
    fn default() -> Self {
        Self {
            density: Bounds::between(0.0, 300.0),
            segments: 36,
            segment_days: 10,
            initial_density: 100.0,
            density_scale: 310.0,
            birth_rate: Bounds::between(0.01, 0.05),
            death_rate: Bounds::between(0.02, 0.08),
            treatment_effect: 0.5,
            target_penetration: 8.0,
        }
    }
}

impl SunlightConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, bounds) in [
            ("sunlight.density", self.density),
            ("sunlight.birth_rate", self.birth_rate),
            ("sunlight.death_rate", self.death_rate),
        ] {
            match (bounds.min, bounds.max) {
                (Some(lo), Some(hi)) if lo <= hi => {}
                _ => {
                    return Err(ConfigError::Invalid(format!(
                        "{name} needs finite min <= max"
                    )))
                }
            }
        }
        if !(self.density_scale > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "sunlight.density_scale must be positive, got {}",
                self.density_scale
            )));
        }
        Ok(())
    }
}
