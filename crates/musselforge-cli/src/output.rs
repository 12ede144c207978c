//! Console rendering shared by the subcommands.

use owo_colors::OwoColorize;
use serde::Serialize;

use crate::commands::CliResult;

pub const NO_SOLUTION: &str = "No feasible solution found.";

pub fn json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn heading(text: &str) {
    println!("{}", text.bright_cyan().bold());
}

pub fn no_solution() {
    println!("{}", NO_SOLUTION.bright_red());
}

/// `label: value` with the label padded to a column.
pub fn field(label: &str, value: impl std::fmt::Display) {
    println!("  {:<28}{}", format!("{label}:"), value.bright_yellow());
}
