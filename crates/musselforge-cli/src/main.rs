//! MusselForge command line.
//!
//! One subcommand per scenario: simulation, copper optimization and
//! search, prediction, model comparison, rule extraction and sunlight.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

mod commands;
mod output;

use commands::{
    compare, optimize, predict, rules, search, simulate, sunlight, CliResult, Context,
};

#[derive(Parser, Debug)]
#[command(name = "musselforge", version, about = "Zebra mussel copper treatment scenarios")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Directory holding the experiment CSV files
    #[arg(long, global = true, default_value = "data")]
    pub data_dir: PathBuf,

    /// TOML or YAML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate the control and treatment tracks day by day
    Simulate(simulate::SimulateArgs),
    /// Minimize copper under the decision rules
    Optimize(optimize::OptimizeArgs),
    /// Bisect for the minimal copper dose using the trained predictor
    Search(search::SearchArgs),
    /// Predict mortality for one set of conditions
    Predict(predict::PredictArgs),
    /// Compare linear, tree and forest regressors
    Compare,
    /// Print decision rules extracted from a surrogate tree
    Rules(rules::RulesArgs),
    /// Density, clarity and sunlight penetration scenarios
    Sunlight,
}

fn run(cli: Cli) -> CliResult {
    let ctx = Context::new(cli.global)?;
    match cli.command {
        Commands::Simulate(args) => simulate::run(&ctx, args),
        Commands::Optimize(args) => optimize::run(&ctx, args),
        Commands::Search(args) => search::run(&ctx, args),
        Commands::Predict(args) => predict::run(&ctx, args),
        Commands::Compare => compare::run(&ctx),
        Commands::Rules(args) => rules::run(&ctx, args),
        Commands::Sunlight => sunlight::run(&ctx),
    }
}

fn main() {
    musselforge::console::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["musselforge", "simulate", "--json", "--data-dir", "lake"])
            .unwrap();
        assert!(cli.global.json);
        assert_eq!(cli.global.data_dir, PathBuf::from("lake"));
        assert!(matches!(cli.command, Commands::Simulate(_)));
    }

    #[test]
    fn test_predict_defaults_to_reference_probe() {
        let cli = Cli::try_parse_from(["musselforge", "predict"]).unwrap();
        let Commands::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(args.copper, 0.54);
        assert_eq!(args.temperature, 8.0);
        assert!(!args.untreated);
    }
}
