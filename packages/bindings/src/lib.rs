use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use rental_roi_core::amortization::{self, MORTGAGE_TERM_MONTHS};
use rental_roi_core::analysis::{self, DealInput, NationalRentContext};
use rental_roi_core::metrics;
use rental_roi_core::preparation::TrainingPoint;
use rental_roi_core::rent_model;
use rental_roi_core::{AssumptionSet, RegionObservation};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct MetricsRequest {
    regions: Vec<RegionObservation>,
    #[serde(default)]
    assumptions: AssumptionSet,
}

#[derive(Deserialize)]
struct RentModelRequest {
    training: Vec<TrainingPoint>,
}

/// A deal plus, optionally, the national sample to predict rent from.
#[derive(Deserialize)]
struct DealRequest {
    #[serde(flatten)]
    deal: DealInput,
    #[serde(default)]
    training: Option<Vec<TrainingPoint>>,
}

#[derive(Deserialize)]
struct PaymentRequest {
    loan_amount: Decimal,
    /// Annual rate as a fraction
    annual_rate: Decimal,
    #[serde(default = "default_term")]
    term_months: u32,
}

fn default_term() -> u32 {
    MORTGAGE_TERM_MONTHS
}

#[derive(Serialize)]
struct PaymentResponse {
    monthly_payment: Decimal,
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_metrics(input_json: String) -> NapiResult<String> {
    let input: MetricsRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = metrics::compute(&input.regions, &input.assumptions).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze_deal(input_json: String) -> NapiResult<String> {
    let input: DealRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let national = input
        .training
        .map(NationalRentContext::build)
        .transpose()
        .map_err(to_napi_error)?;
    let output = analysis::analyze_deal(&input.deal, national.as_ref()).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn default_assumptions() -> NapiResult<String> {
    serde_json::to_string(&AssumptionSet::default()).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Rent model
// ---------------------------------------------------------------------------

#[napi]
pub fn fit_rent_model(input_json: String) -> NapiResult<String> {
    let input: RentModelRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = rent_model::fit(&input.training).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn monthly_payment(input_json: String) -> NapiResult<String> {
    let input: PaymentRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let monthly_rate = input.annual_rate / Decimal::from(12);
    let payment = amortization::monthly_payment(input.loan_amount, monthly_rate, input.term_months)
        .map_err(to_napi_error)?;
    serde_json::to_string(&PaymentResponse {
        monthly_payment: payment,
    })
    .map_err(to_napi_error)
}
