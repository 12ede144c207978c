use clap::{Args, ValueEnum};
use musselforge::core::Track;
use musselforge::scenario::{Simulator, TrackOutcome, TrackVerdict};

use super::{CliResult, Context};
use crate::output;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TrackArg {
    Control,
    Treatment,
}

impl From<TrackArg> for Track {
    fn from(arg: TrackArg) -> Self {
        match arg {
            TrackArg::Control => Track::Control,
            TrackArg::Treatment => Track::Treatment,
        }
    }
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Number of simulated days
    #[arg(long)]
    pub horizon: Option<u32>,

    /// Simulate only one track
    #[arg(long, value_enum)]
    pub track: Option<TrackArg>,

    /// Enforce the copper/population and clarity/plant implications
    #[arg(long)]
    pub domain_rules: bool,
}

pub fn run(ctx: &Context, args: SimulateArgs) -> CliResult {
    let mut config = ctx.config.clone();
    if let Some(days) = args.horizon {
        config.simulation.horizon_days = days;
    }
    if args.domain_rules {
        config.simulation.domain_rules = true;
    }
    let observations = ctx.observations()?;
    let simulator = Simulator::new(&config, &observations);

    let outcomes = match args.track {
        Some(track) => vec![simulator.run_track(track.into())?],
        None => {
            let both = simulator.run()?;
            vec![both.control, both.treatment]
        }
    };

    if ctx.json() {
        return output::json(&outcomes);
    }
    for outcome in &outcomes {
        print_track(outcome);
    }
    Ok(())
}

fn print_track(outcome: &TrackOutcome) {
    output::heading(&format!("{} track", outcome.track));
    if outcome.verdict != TrackVerdict::Solved {
        output::no_solution();
        println!();
        return;
    }
    for day in &outcome.trajectory {
        println!(
            "  Day {:>3}: population {:>6.0}  clarity {:.3}  plant growth {:.3}  oxygen {:.3}",
            day.day, day.population, day.clarity, day.plant_growth, day.oxygen_level
        );
    }
    for (day, covariate, resolved) in &outcome.fallbacks {
        println!("  day {day}: {covariate} from {:?}", resolved.source);
    }
    for check in &outcome.end_states {
        let verdict = match check.reachable {
            Some(true) => "possible",
            Some(false) => "not possible",
            None => "undecided",
        };
        output::field(&format!("{} scenario", check.end_state), verdict);
    }
    println!();
}
