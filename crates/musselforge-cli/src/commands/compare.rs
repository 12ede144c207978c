use super::{CliResult, Context};
use crate::output;

pub fn run(ctx: &Context) -> CliResult {
    let set = ctx.training_set()?;
    let reports = set.compare(&ctx.config.training, ctx.config.random_seed)?;

    if ctx.json() {
        return output::json(&reports);
    }
    for report in &reports {
        output::heading(&report.model.to_string());
        output::field("Mean squared error", format!("{:.6}", report.metrics.mse));
        output::field("Root mean squared error", format!("{:.6}", report.metrics.rmse));
        output::field("R-squared", format!("{:.4}", report.metrics.r2));
    }
    Ok(())
}
