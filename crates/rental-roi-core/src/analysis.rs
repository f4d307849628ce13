//! End-to-end workflows: the market table and the single-deal analyzer.
//!
//! Both return the standard `ComputationOutput` envelope. Data preparation
//! failures abort; a rent model that cannot be fitted only produces a warning.

use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::assumptions::AssumptionSet;
use crate::error::RentalRoiError;
use crate::labels::RegionLabels;
use crate::metrics::{self, PropertyReturns, RegionMetrics};
use crate::preparation::{self, TrainingPoint};
use crate::rent_model::{self, RentComparison, RentModel};
use crate::table::{normalize_region_id, RegionTable};
use crate::types::{with_metadata, ComputationOutput, Money, Period};
use crate::RentalRoiResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Fitted national model together with the sample it was fitted on.
///
/// Built once, then only read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NationalRentContext {
    pub model: RentModel,
    pub training: Vec<TrainingPoint>,
}

impl NationalRentContext {
    pub fn build(training: Vec<TrainingPoint>) -> RentalRoiResult<Self> {
        let model = rent_model::fit(&training)?;
        Ok(Self { model, training })
    }

    /// Fit on every region of both tables for `period`.
    pub fn from_tables(home: &RegionTable, rent: &RegionTable, period: Period) -> RentalRoiResult<Self> {
        Self::build(preparation::national_training_set(home, rent, period)?)
    }

    /// Adjustment ratio at a region's own price and rent, if it is in the sample.
    pub fn region_ratio(&self, region_id: &str) -> Option<RentalRoiResult<Decimal>> {
        let key = normalize_region_id(region_id);
        self.training
            .iter()
            .find(|p| p.region_id == key)
            .map(|p| rent_model::adjustment_ratio_at(&self.model, p.home_price, p.rent))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketAnalysis {
    pub period: Period,
    pub regions_analyzed: usize,
    pub rows_dropped: usize,
    pub metrics: Vec<RegionMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent_model: Option<RentModel>,
    pub rent_comparisons: Vec<RentComparison>,
}

/// A single property under consideration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealInput {
    pub home_price: Money,
    /// Expected monthly rent; predicted from the national model when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rent: Option<Money>,
    /// ZIP used to adjust the national prediction to local conditions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<String>,
    #[serde(default)]
    pub assumptions: AssumptionSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RentSource {
    Supplied,
    NationalModel,
    RegionAdjusted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealAnalysis {
    pub home_price: Money,
    pub rent: Money,
    pub rent_source: RentSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_rent: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment_ratio: Option<Decimal>,
    #[serde(flatten)]
    pub returns: PropertyReturns,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Metrics for every region of the local market plus the national rent model.
pub fn analyze_market(
    home: &RegionTable,
    rent: &RegionTable,
    assumptions: &AssumptionSet,
    labels: Option<&RegionLabels>,
) -> RentalRoiResult<ComputationOutput<MarketAnalysis>> {
    let start = Instant::now();
    let mut warnings = assumptions.validate_ranges();

    let merged = preparation::merge_current(home, rent, labels)?;
    if merged.observations.is_empty() {
        return Err(RentalRoiError::InsufficientData(format!(
            "No region has both a positive home value and rent for {}",
            merged.period
        )));
    }
    if merged.rows_dropped > 0 {
        warnings.push(format!(
            "{} region(s) skipped for missing or non-positive price/rent in {}",
            merged.rows_dropped, merged.period
        ));
    }

    let metrics = metrics::compute(&merged.observations, assumptions)?;

    let negative = metrics
        .iter()
        .filter(|m| m.returns.monthly_cash_flow < Decimal::ZERO)
        .count();
    if negative > 0 {
        warnings.push(format!(
            "{negative} of {} region(s) have negative monthly cash flow",
            metrics.len()
        ));
    }

    let national_model = match NationalRentContext::from_tables(home, rent, merged.period) {
        Ok(ctx) => Some(ctx.model),
        Err(e) => {
            tracing::warn!(error = %e, "national rent model unavailable");
            warnings.push(format!("National rent model unavailable: {e}"));
            None
        }
    };

    let rent_comparisons = match &national_model {
        Some(model) => rent_model::compare_regions(model, &merged.observations)?,
        None => Vec::new(),
    };

    let output = MarketAnalysis {
        period: merged.period,
        regions_analyzed: metrics.len(),
        rows_dropped: merged.rows_dropped,
        metrics,
        rent_model: national_model,
        rent_comparisons,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Leveraged rental returns by region with log-log national rent model",
        assumptions,
        warnings,
        elapsed,
        output,
    ))
}

/// Returns for one property, predicting rent from the national model when
/// the caller does not supply it.
pub fn analyze_deal(
    input: &DealInput,
    national: Option<&NationalRentContext>,
) -> RentalRoiResult<ComputationOutput<DealAnalysis>> {
    let start = Instant::now();
    let mut warnings = input.assumptions.validate_ranges();

    if input.home_price <= Decimal::ZERO {
        return Err(RentalRoiError::InvalidInput {
            field: "home_price".into(),
            reason: "Purchase price must be positive".into(),
        });
    }

    let mut predicted_rent = None;
    let mut adjustment_ratio = None;

    if let Some(ctx) = national {
        let mut predicted = rent_model::predict(&ctx.model, input.home_price)?;
        if let Some(region_id) = input.region_id.as_deref() {
            match ctx.region_ratio(region_id) {
                Some(ratio) => {
                    let ratio = ratio?;
                    predicted =
                        rent_model::adjusted_prediction(&ctx.model, input.home_price, ratio)?;
                    adjustment_ratio = Some(ratio);
                }
                None => warnings.push(format!(
                    "Region {} is not in the national sample; no local adjustment applied",
                    normalize_region_id(region_id)
                )),
            }
        }
        predicted_rent = Some(predicted);
    }

    let (rent, rent_source) = match (input.rent, predicted_rent) {
        (Some(r), _) => (r, RentSource::Supplied),
        (None, Some(p)) if adjustment_ratio.is_some() => (p, RentSource::RegionAdjusted),
        (None, Some(p)) => (p, RentSource::NationalModel),
        (None, None) => {
            return Err(RentalRoiError::InsufficientData(
                "No rent supplied and no national rent model available".into(),
            ))
        }
    };

    let returns = metrics::evaluate(input.home_price, rent, &input.assumptions)?;

    if returns.monthly_cash_flow < Decimal::ZERO {
        warnings.push(format!(
            "Monthly cash flow of {:.0} is negative at this price and rent",
            returns.monthly_cash_flow
        ));
    }

    let output = DealAnalysis {
        home_price: input.home_price,
        rent,
        rent_source,
        predicted_rent,
        adjustment_ratio,
        returns,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Single-property leveraged rental returns",
        input,
        warnings,
        elapsed,
        output,
    ))
}
