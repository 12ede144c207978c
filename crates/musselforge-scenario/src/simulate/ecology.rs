//! Day-to-day transition equations.
//!
//! Each function is written once over [`Quantity`]: with concrete inputs it
//! folds to a number, with solver variables it yields a term.

#[cfg(test)]
mod tests;

use musselforge_config::EcologyConfig;
use musselforge_smt::{Condition, Quantity};

/// Population share at which clarity must reach [`DENSE_CLARITY`].
pub const DENSE_POPULATION_SHARE: f64 = 0.8;
pub const DENSE_CLARITY: f64 = 0.9;
/// Plant growth ceiling, as a share of the maximum, below the clarity threshold.
pub const MURKY_PLANT_SHARE: f64 = 0.5;
/// Copper at which at most [`LETHAL_SURVIVAL`] of the initial population may remain.
pub const LETHAL_COPPER: f64 = 0.5;
pub const LETHAL_SURVIVAL: f64 = 0.01;
pub const TOXIC_COPPER: f64 = 0.2;
pub const TOXIC_SURVIVAL: f64 = 0.15;

/// Step function of copper over the configured tiers.
pub fn mortality_factor(config: &EcologyConfig, copper: &Quantity) -> Quantity {
    config
        .mortality_tiers
        .iter()
        .rev()
        .fold(Quantity::Concrete(0.0), |lower, tier| {
            Quantity::ite(copper.ge(tier.min_copper), tier.factor, lower)
        })
}

/// Next day's population.
///
/// With oxygen at or above the survival threshold the population grows
/// logistically, scaled by `1 - mortality`, and a population already at
/// capacity stays there. Below the threshold it shrinks with the oxygen
/// deficit, and oxygen at or below zero wipes it out.
pub fn next_population(
    config: &EcologyConfig,
    population: &Quantity,
    oxygen: &Quantity,
    mortality: &Quantity,
) -> Quantity {
    let capacity = config.carrying_capacity;
    let survivors = population.clone() * (1.0 - mortality.clone());
    let headroom = 1.0 - population.clone() / capacity;
    let grown = (survivors.clone() * (1.0 + config.growth_rate * headroom)).floor();
    let deficit = 1.0 - oxygen.clone();
    let shrunk = (survivors * (1.0 - config.growth_rate * deficit)).floor();

    Quantity::ite(
        oxygen.ge(config.oxygen_threshold),
        Quantity::ite(population.ge(capacity), capacity, grown),
        Quantity::ite(oxygen.le(0.0), 0.0, shrunk),
    )
}

/// Clarity rises with the square root of the population share, capped at 1.
pub fn next_clarity(config: &EcologyConfig, clarity: &Quantity, population: &Quantity) -> Quantity {
    let share = population.clone() / config.carrying_capacity;
    (clarity.clone() + share.sqrt()).min(1.0)
}

pub fn plant_growth(config: &EcologyConfig, clarity: &Quantity) -> Quantity {
    let scaled = clarity.clone() * config.plant_growth_factor;
    Quantity::ite(
        clarity.ge(config.clarity_threshold),
        scaled.clone().min(config.max_plant_growth),
        scaled * config.below_threshold_plant_factor,
    )
}

/// Plant production minus plant and mussel consumption, clipped to `[0, 1]`.
pub fn next_oxygen(
    config: &EcologyConfig,
    oxygen: &Quantity,
    plants: &Quantity,
    population: &Quantity,
) -> Quantity {
    let produced = plants.clone() * config.oxygen_production;
    let consumed = plants.clone() * config.plant_consumption
        + population.clone() / config.carrying_capacity * config.mussel_consumption;
    (oxygen.clone() + produced - consumed).clamp(0.0, 1.0)
}

/// Implications tying population, clarity, plants and copper together.
pub fn domain_rules(
    config: &EcologyConfig,
    initial_population: f64,
    population: &Quantity,
    clarity: &Quantity,
    plants: &Quantity,
    copper: &Quantity,
) -> Vec<(Condition, Condition)> {
    vec![
        (
            population.ge(DENSE_POPULATION_SHARE * config.carrying_capacity),
            clarity.ge(DENSE_CLARITY),
        ),
        (
            clarity.lt(config.clarity_threshold),
            plants.lt(MURKY_PLANT_SHARE * config.max_plant_growth),
        ),
        (
            copper.ge(LETHAL_COPPER),
            population.le(LETHAL_SURVIVAL * initial_population),
        ),
        (
            copper.ge(TOXIC_COPPER),
            population.le(TOXIC_SURVIVAL * initial_population),
        ),
    ]
}
