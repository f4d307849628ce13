use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use serde_json::Value;

use rental_roi_core::analysis::{self, DealInput, NationalRentContext};
use rental_roi_core::preparation;
use rental_roi_core::rent_model;
use rental_roi_core::table::RegionTable;

use crate::input;

/// Arguments for the single-property analyzer
#[derive(Args)]
pub struct DealArgs {
    /// Home value CSV, used to fit the rent model
    #[arg(long)]
    pub home: Option<String>,

    /// Rent CSV, used to fit the rent model
    #[arg(long)]
    pub rent: Option<String>,

    /// Purchase price
    #[arg(long)]
    pub price: Decimal,

    /// Expected monthly rent; predicted from the tables when omitted
    #[arg(long)]
    pub rent_amount: Option<Decimal>,

    /// ZIP whose rent level adjusts the prediction
    #[arg(long)]
    pub zip: Option<String>,

    /// JSON file of assumption overrides (stdin is read when omitted)
    #[arg(long)]
    pub assumptions: Option<String>,
}

/// Arguments for the rent rule of thumb
#[derive(Args)]
pub struct OnePercentArgs {
    /// Purchase price
    #[arg(long)]
    pub price: Decimal,

    /// Monthly rent as a percentage of price
    #[arg(long, default_value = "1")]
    pub yield_pct: Decimal,
}

#[derive(Debug, Serialize)]
struct OnePercentOutput {
    price: Decimal,
    yield_pct: Decimal,
    estimated_rent: Decimal,
}

pub fn run_deal(args: DealArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let assumptions = input::load_assumptions(args.assumptions.as_deref())?;

    let (national, model_warning) = match (&args.home, &args.rent) {
        (Some(home_path), Some(rent_path)) => {
            let home = input::load_table(home_path)?;
            let rent = input::load_table(rent_path)?;
            fit_national(&home, &rent, args.rent_amount.is_some())?
        }
        (None, None) => (None, None),
        _ => return Err("--home and --rent must be given together".into()),
    };

    let deal = DealInput {
        home_price: args.price,
        rent: args.rent_amount,
        region_id: args.zip,
        assumptions,
    };
    let mut result = analysis::analyze_deal(&deal, national.as_ref())?;
    result.warnings.extend(model_warning);
    Ok(serde_json::to_value(result)?)
}

/// Fit the national model for a deal. With a supplied rent a failed fit is
/// only a warning; without one it is the error.
fn fit_national(
    home: &RegionTable,
    rent: &RegionTable,
    rent_supplied: bool,
) -> Result<(Option<NationalRentContext>, Option<String>), Box<dyn std::error::Error>> {
    let period = preparation::latest_common_period(home, rent)?;
    match NationalRentContext::from_tables(home, rent, period) {
        Ok(ctx) => Ok((Some(ctx), None)),
        Err(e) if rent_supplied => {
            tracing::warn!(error = %e, "rent model unavailable");
            Ok((None, Some(format!("National rent model unavailable: {e}"))))
        }
        Err(e) => Err(e.into()),
    }
}

pub fn run_one_percent(args: OnePercentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let estimated_rent = rent_model::one_percent_rule(args.price, args.yield_pct / dec!(100))?;
    Ok(serde_json::to_value(OnePercentOutput {
        price: args.price,
        yield_pct: args.yield_pct,
        estimated_rent,
    })?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_tables() -> (RegionTable, RegionTable) {
        let home = RegionTable::from_reader(
            "RegionName,2024-01-31\n80903,400000\n80910,320000\n".as_bytes(),
        )
        .unwrap();
        let rent =
            RegionTable::from_reader("RegionName,2024-01-31\n80903,2500\n80910,2300\n".as_bytes())
                .unwrap();
        (home, rent)
    }

    #[test]
    fn test_failed_fit_with_supplied_rent_becomes_warning() {
        let (home, rent) = small_tables();
        let (ctx, warning) = fit_national(&home, &rent, true).unwrap();
        assert!(ctx.is_none());
        assert!(warning.unwrap().contains("rent model unavailable"));
    }

    #[test]
    fn test_failed_fit_without_rent_is_an_error() {
        let (home, rent) = small_tables();
        assert!(fit_national(&home, &rent, false).is_err());
    }

    #[test]
    fn test_model_warning_reaches_deal_output() {
        let (home, rent) = small_tables();
        let (ctx, warning) = fit_national(&home, &rent, true).unwrap();
        let deal = DealInput {
            home_price: dec!(400000),
            rent: Some(dec!(2500)),
            region_id: None,
            assumptions: Default::default(),
        };
        let mut out = analysis::analyze_deal(&deal, ctx.as_ref()).unwrap();
        out.warnings.extend(warning);
        assert!(out.warnings.iter().any(|w| w.contains("rent model unavailable")));
    }
}
