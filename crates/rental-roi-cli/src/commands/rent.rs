use clap::Args;
use serde::Serialize;
use serde_json::Value;

use rental_roi_core::analysis::NationalRentContext;
use rental_roi_core::preparation;
use rental_roi_core::rent_model::RentModel;
use rental_roi_core::types::Period;

use crate::input;

/// Arguments for fitting the national rent model
#[derive(Args)]
pub struct RentModelArgs {
    /// Home value CSV
    #[arg(long)]
    pub home: String,

    /// Rent CSV
    #[arg(long)]
    pub rent: String,
}

/// Arguments for a single ZIP's rent history
#[derive(Args)]
pub struct RentHistoryArgs {
    /// Rent CSV
    #[arg(long)]
    pub rent: String,

    /// ZIP code (leading zeros optional)
    #[arg(long)]
    pub zip: String,
}

#[derive(Debug, Serialize)]
struct RentModelOutput {
    period: Period,
    #[serde(flatten)]
    model: RentModel,
}

pub fn run_rent_model(args: RentModelArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let home = input::load_table(&args.home)?;
    let rent = input::load_table(&args.rent)?;

    let period = preparation::latest_common_period(&home, &rent)?;
    let ctx = NationalRentContext::from_tables(&home, &rent, period)?;

    Ok(serde_json::to_value(RentModelOutput {
        period,
        model: ctx.model,
    })?)
}

pub fn run_rent_history(args: RentHistoryArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let rent = input::load_table(&args.rent)?;
    let history = preparation::rent_history(&rent, &args.zip)?;
    Ok(serde_json::to_value(history)?)
}
