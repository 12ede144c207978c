use musselforge::scenario::{clearest_density, SunlightYear};
use serde::Serialize;

use super::{CliResult, Context};
use crate::output;

pub fn run(ctx: &Context) -> CliResult {
    let config = &ctx.config.sunlight;
    let optimum = clearest_density(config, &ctx.config.solver)?;
    let year = SunlightYear::new(config, &ctx.config.solver).run()?;

    if ctx.json() {
        #[derive(Serialize)]
        struct Report<'a> {
            clearest: Option<musselforge::scenario::ClarityOptimum>,
            year: &'a musselforge::scenario::SunlightYearOutcome,
        }
        return output::json(&Report {
            clearest: optimum,
            year: &year,
        });
    }

    match optimum {
        Some(optimum) => {
            output::field("Zebra mussel density", optimum.density);
            output::field("Resulting water clarity", format!("{:.1}", optimum.clarity));
        }
        None => output::no_solution(),
    }
    println!();
    for segment in &year.segments {
        println!(
            "  Segment {:>2} (day {:>3}): density {:>8.3}  clarity {:.1}  penetration {:.0} m  birth {:.3}  death {:.3}",
            segment.index,
            segment.day,
            segment.density,
            segment.clarity,
            segment.penetration,
            segment.birth_rate,
            segment.death_rate,
        );
    }
    match year.reached_on_day {
        Some(day) => println!(
            "Sunlight penetration of {} m is possible after {day} days.",
            year.target_penetration
        ),
        None => println!(
            "Sunlight penetration of {} m is not possible over the course of a year.",
            year.target_penetration
        ),
    }
    Ok(())
}
