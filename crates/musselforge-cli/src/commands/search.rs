use clap::Args;
use musselforge::scenario::CopperSearch;

use super::{CliResult, Context};
use crate::output;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Mortality rate the dose must reach
    #[arg(long)]
    pub target: Option<f64>,

    /// Stop once the copper bracket is this narrow
    #[arg(long)]
    pub tolerance: Option<f64>,
}

pub fn run(ctx: &Context, args: SearchArgs) -> CliResult {
    let mut search = ctx.config.search.clone();
    if let Some(target) = args.target {
        search.target_mortality = target;
    }
    if let Some(tolerance) = args.tolerance {
        search.tolerance = tolerance;
    }
    let set = ctx.training_set()?;
    let predictor = ctx.predictor(&set)?;
    let outcome = CopperSearch::new(&search, &ctx.config.solver, &predictor).run()?;

    if ctx.json() {
        return output::json(&outcome);
    }
    for probe in &outcome.probes {
        println!(
            "  copper {:.4}: {}{}",
            probe.copper,
            probe.verdict,
            probe
                .predicted
                .map(|p| format!(" (predicted {p:.4})"))
                .unwrap_or_default()
        );
    }
    if outcome.undecided {
        println!("  Solver budget exhausted; search stopped early.");
    }
    match (outcome.minimum, outcome.predicted) {
        (Some(conditions), Some(predicted)) => {
            output::heading("Minimum copper concentration");
            output::field("Copper", format!("{:.4}", conditions.copper));
            output::field("Temperature", format!("{:.1}", conditions.temperature));
            output::field("pH", format!("{:.2}", conditions.ph));
            output::field("Dissolved oxygen", format!("{:.2}", conditions.dissolved_oxygen));
            output::field("Predicted mortality rate", format!("{predicted:.4}"));
        }
        _ => output::no_solution(),
    }
    Ok(())
}
