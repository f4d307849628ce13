use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use serde::{Deserialize, Serialize};

use crate::error::RentalRoiError;
use crate::preparation::TrainingPoint;
use crate::types::{Money, Rate, RegionObservation};
use crate::RentalRoiResult;

/// Minimum national sample before the regression is trusted.
pub const MIN_TRAINING_SAMPLES: usize = 100;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Power-law rent model: rent = exp(intercept) * price^slope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RentModel {
    /// Elasticity of rent with respect to price (log-log slope)
    pub slope: Decimal,
    /// ln of the scale constant
    pub intercept: Decimal,
    /// Coefficient of determination in log space
    pub r_squared: Decimal,
    pub sample_size: usize,
}

/// A local region measured against the national model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentComparison {
    pub region_id: String,
    pub label: String,
    pub home_price: Money,
    pub rent: Money,
    pub predicted_rent: Money,
    /// Actual minus predicted; positive means rent runs above trend
    pub rent_difference: Money,
    pub adjustment_ratio: Decimal,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Ordinary least squares of ln(rent) on ln(price).
pub fn fit(training: &[TrainingPoint]) -> RentalRoiResult<RentModel> {
    let sample_size = training.len();
    if sample_size < MIN_TRAINING_SAMPLES {
        return Err(RentalRoiError::InsufficientData(format!(
            "Rent model needs at least {MIN_TRAINING_SAMPLES} regions, got {sample_size}"
        )));
    }

    let mut xs = Vec::with_capacity(sample_size);
    let mut ys = Vec::with_capacity(sample_size);
    for point in training {
        xs.push(ln_positive(point.home_price, "home_price")?);
        ys.push(ln_positive(point.rent, "rent")?);
    }

    let n = Decimal::from(sample_size as u64);
    let x_bar = xs.iter().copied().sum::<Decimal>() / n;
    let y_bar = ys.iter().copied().sum::<Decimal>() / n;

    let mut ss_xx = Decimal::ZERO;
    let mut ss_xy = Decimal::ZERO;
    let mut ss_yy = Decimal::ZERO;
    for (x, y) in xs.iter().zip(&ys) {
        let dx = *x - x_bar;
        let dy = *y - y_bar;
        ss_xx += dx * dx;
        ss_xy += dx * dy;
        ss_yy += dy * dy;
    }

    if ss_xx.is_zero() {
        return Err(RentalRoiError::InsufficientData(
            "Home prices have no spread; slope is undefined".into(),
        ));
    }

    let slope = ss_xy / ss_xx;
    let intercept = y_bar - slope * x_bar;

    let ss_res: Decimal = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| {
            let resid = *y - (intercept + slope * *x);
            resid * resid
        })
        .sum();

    let r_squared = if ss_yy.is_zero() {
        Decimal::ONE
    } else {
        Decimal::ONE - ss_res / ss_yy
    };

    tracing::info!(
        %slope,
        %intercept,
        %r_squared,
        sample_size,
        "fitted national rent model"
    );

    Ok(RentModel {
        slope,
        intercept,
        r_squared,
        sample_size,
    })
}

/// Model rent at `price`: exp(intercept + slope * ln(price)).
pub fn predict(model: &RentModel, price: Money) -> RentalRoiResult<Money> {
    if price <= Decimal::ZERO {
        return Err(RentalRoiError::InvalidInput {
            field: "price".into(),
            reason: "Price must be positive to predict rent".into(),
        });
    }
    let log_rent = model.intercept + model.slope * ln_positive(price, "price")?;
    log_rent
        .checked_exp()
        .ok_or_else(|| RentalRoiError::InvalidInput {
            field: "price".into(),
            reason: format!("Predicted log-rent {log_rent} overflows"),
        })
}

/// How far a region's rent sits from the model at its own price.
pub fn adjustment_ratio(model: &RentModel, observation: &RegionObservation) -> RentalRoiResult<Decimal> {
    adjustment_ratio_at(model, observation.home_price, observation.rent)
}

/// `rent / predict(price)`, or 1 when the prediction is zero.
pub fn adjustment_ratio_at(model: &RentModel, home_price: Money, rent: Money) -> RentalRoiResult<Decimal> {
    let expected = predict(model, home_price)?;
    if expected.is_zero() {
        return Ok(Decimal::ONE);
    }
    Ok(rent / expected)
}

/// Model rent at `price` scaled by a region's adjustment ratio.
pub fn adjusted_prediction(model: &RentModel, price: Money, ratio: Decimal) -> RentalRoiResult<Money> {
    Ok(predict(model, price)? * ratio)
}

/// Compare each local region with the national trend.
pub fn compare_regions(
    model: &RentModel,
    observations: &[RegionObservation],
) -> RentalRoiResult<Vec<RentComparison>> {
    observations
        .iter()
        .map(|obs| {
            let predicted_rent = predict(model, obs.home_price)?;
            let ratio = adjustment_ratio(model, obs)?;
            Ok(RentComparison {
                region_id: obs.region_id.clone(),
                label: obs.label.clone(),
                home_price: obs.home_price,
                rent: obs.rent,
                predicted_rent,
                rent_difference: obs.rent - predicted_rent,
                adjustment_ratio: ratio,
            })
        })
        .collect()
}

/// Rule-of-thumb rent: price times a monthly yield (0.01 for the "1% rule").
pub fn one_percent_rule(price: Money, rent_yield: Rate) -> RentalRoiResult<Money> {
    if price <= Decimal::ZERO {
        return Err(RentalRoiError::InvalidInput {
            field: "price".into(),
            reason: "Price must be positive".into(),
        });
    }
    if rent_yield < Decimal::ZERO {
        return Err(RentalRoiError::InvalidInput {
            field: "rent_yield".into(),
            reason: "Rent yield cannot be negative".into(),
        });
    }
    Ok(price * rent_yield)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ln_positive(value: Decimal, field: &str) -> RentalRoiResult<Decimal> {
    if value <= Decimal::ZERO {
        return Err(RentalRoiError::InvalidInput {
            field: field.into(),
            reason: format!("Logarithm requires a positive value, got {value}"),
        });
    }
    value.checked_ln().ok_or_else(|| RentalRoiError::InvalidInput {
        field: field.into(),
        reason: format!("ln({value}) is not representable"),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
