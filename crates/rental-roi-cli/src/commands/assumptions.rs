use clap::Args;
use serde::Serialize;
use serde_json::Value;

use rental_roi_core::AssumptionSet;

use crate::input;

/// Arguments for inspecting assumptions
#[derive(Args)]
pub struct AssumptionsArgs {
    /// JSON file of overrides (stdin is read when omitted)
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Debug, Serialize)]
struct AssumptionsOutput {
    result: AssumptionSet,
    warnings: Vec<String>,
}

pub fn run_assumptions(args: AssumptionsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let assumptions = input::load_assumptions(args.input.as_deref())?;
    let warnings = assumptions.validate_ranges();
    Ok(serde_json::to_value(AssumptionsOutput {
        result: assumptions,
        warnings,
    })?)
}
