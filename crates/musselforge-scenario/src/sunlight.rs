//! Mussel density, water clarity and sunlight penetration.
//!
//! Two scenarios: the density giving the clearest water, and a year of
//! ten-day segments under treatment, stopping once the target sunlight
//! penetration becomes reachable.


use musselforge_config::{Bounds, SolverSettings, SunlightConfig};
use musselforge_smt::{Quantity, SolverResult, Variable};
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use tracing::{debug, info};

use crate::builder::ScenarioBuilder;
use crate::error::Result;

/// Clarity on a 0-100 scale, falling off more slowly at higher densities.
pub fn density_clarity(density: &Quantity) -> Quantity {
    Quantity::ite(
        density.lt(100.0),
        100.0 - 0.5 * density.clone(),
        Quantity::ite(
            density.lt(200.0),
            90.0 - 0.3 * (density.clone() - 100.0),
            70.0 - 0.1 * (density.clone() - 200.0),
        ),
    )
}

/// Clarity in `[0, 1]` from density scaled by `scale`.
pub fn scaled_clarity(density: &Quantity, scale: f64) -> Quantity {
    let scaled = density.clone() / scale;
    Quantity::ite(
        scaled.le(0.25),
        0.9,
        Quantity::ite(
            scaled.le(0.5),
            0.7,
            Quantity::ite(scaled.le(0.75), 0.5, 0.3),
        ),
    )
}

/// Sunlight penetration depth in meters.
pub fn penetration(clarity: &Quantity) -> Quantity {
    Quantity::ite(
        clarity.le(0.3),
        2.0,
        Quantity::ite(clarity.le(0.5), 4.0, Quantity::ite(clarity.le(0.7), 6.0, 8.0)),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClarityOptimum {
    pub density: f64,
    pub clarity: f64,
}

/// Integer density within bounds that maximizes clarity.
///
/// `None` when the solver finds no assignment or gives up.
pub fn clearest_density(
    config: &SunlightConfig,
    settings: &SolverSettings,
) -> Result<Option<ClarityOptimum>> {
    let mut builder = ScenarioBuilder::new("clearest_density", settings);
    let density = builder.int("zebra_density", config.density)?;
    let clarity = density_clarity(&Quantity::from(&density));
    builder.maximize(clarity.clone());
    let mut scenario = builder.build();

    let optimum = match scenario.solve()? {
        SolverResult::Sat(model) => model.get(&density).map(|d| ClarityOptimum {
            density: d,
            clarity: model
                .objective()
                .unwrap_or_else(|| model.eval(&clarity.clone().into_term())),
        }),
        _ => None,
    };
    info!(
        event = "clearest_density",
        density = optimum.map(|o| o.density),
        clarity = optimum.map(|o| o.clarity),
    );
    Ok(optimum)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    /// 1-based segment number.
    pub index: u32,
    /// Last day of the segment.
    pub day: u32,
    pub density: f64,
    pub clarity: f64,
    pub penetration: f64,
    pub birth_rate: f64,
    pub death_rate: f64,
    /// Whether the target penetration is reachable in this segment.
    pub target_reachable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SunlightYearOutcome {
    pub target_penetration: f64,
    pub segments: Vec<Segment>,
    /// Day the target first became reachable.
    pub reached_on_day: Option<u32>,
}

/// A year of segments, each solved with a fresh solver.
pub struct SunlightYear<'a> {
    config: &'a SunlightConfig,
    settings: &'a SolverSettings,
}

impl<'a> SunlightYear<'a> {
    pub fn new(config: &'a SunlightConfig, settings: &'a SolverSettings) -> Self {
        Self { config, settings }
    }

    pub fn run(&self) -> Result<SunlightYearOutcome> {
        let cfg = self.config;
        let mut density = cfg.initial_density;
        let mut segments = Vec::new();
        let mut reached_on_day = None;

        for index in 1..=cfg.segments {
            let day = index * cfg.segment_days;
            let mut builder =
                ScenarioBuilder::new(format!("sunlight_segment_{index}"), self.settings);
            let density_var = builder.real("density", Bounds::at_least(0.0))?;
            let clarity_var = builder.real("water_clarity", Bounds::between(0.0, 1.0))?;
            let penetration_var =
                builder.real("sunlight_penetration", Bounds::between(0.0, 10.0))?;
            let birth = builder.real("birth_rate", cfg.birth_rate)?;
            let death = builder.real("death_rate", cfg.death_rate)?;

            builder.define(&density_var, density);
            let clarity = scaled_clarity(&Quantity::from(&density_var), cfg.density_scale);
            builder.define(&clarity_var, clarity);
            builder.define(&penetration_var, penetration(&Quantity::from(&clarity_var)));
            let mut scenario = builder.build();

            let SolverResult::Sat(model) = scenario.solve()? else {
                debug!(event = "sunlight_segment", segment = index, feasible = false);
                break;
            };
            let rate = |var: &Variable| {
                model
                    .decimal(var, 3)
                    .and_then(|d| d.to_f64())
                    .unwrap_or_default()
            };
            let birth_rate = rate(&birth);
            let death_rate = rate(&death);
            let reachable = scenario
                .what_if(Quantity::from(&penetration_var).ge(cfg.target_penetration))?
                .is_sat();

            let segment = Segment {
                index,
                day,
                density,
                clarity: model.get(&clarity_var).unwrap_or_default(),
                penetration: model.get(&penetration_var).unwrap_or_default(),
                birth_rate,
                death_rate,
                target_reachable: reachable,
            };
            debug!(
                event = "sunlight_segment",
                segment = index,
                density,
                penetration = segment.penetration,
                reachable,
            );
            segments.push(segment);

            if reachable {
                reached_on_day = Some(day);
                break;
            }
            density *= 1.0 + birth_rate - death_rate - cfg.treatment_effect;
        }

        info!(
            event = "sunlight_year_done",
            segments = segments.len(),
            reached_on_day,
        );
        Ok(SunlightYearOutcome {
            target_penetration: cfg.target_penetration,
            segments,
            reached_on_day,
        })
    }
}
