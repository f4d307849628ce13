use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use serde::{Deserialize, Serialize};

use crate::error::RentalRoiError;
use crate::types::{Money, Rate};
use crate::RentalRoiResult;

/// Payment schedule length for every loan: 30 years of monthly payments.
///
/// The evaluation horizon is configurable; the schedule the payment is
/// derived from is not.
pub const MORTGAGE_TERM_MONTHS: u32 = 360;

/// Principal retired over a horizon and the balance left afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrincipalPaid {
    pub total_principal: Money,
    pub ending_balance: Money,
}

/// Payment plus paydown over one evaluation horizon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationResult {
    pub monthly_payment: Money,
    pub total_principal: Money,
    pub ending_balance: Money,
}

/// Standard fixed-rate mortgage payment: L * r(1+r)^n / ((1+r)^n - 1)
///
/// An interest-free loan amortises straight-line at `L / n`.
pub fn monthly_payment(
    loan_amount: Money,
    monthly_rate: Rate,
    term_months: u32,
) -> RentalRoiResult<Money> {
    if term_months == 0 {
        return Err(RentalRoiError::InvalidInput {
            field: "term_months".into(),
            reason: "Loan term must be at least one month".into(),
        });
    }

    if monthly_rate.is_zero() {
        return Ok(loan_amount / Decimal::from(term_months));
    }

    let compound = (Decimal::ONE + monthly_rate)
        .checked_powu(u64::from(term_months))
        .ok_or_else(|| RentalRoiError::InvalidInput {
            field: "monthly_rate".into(),
            reason: format!("(1 + {monthly_rate})^{term_months} overflows"),
        })?;

    let denominator = compound - Decimal::ONE;
    if denominator.is_zero() {
        return Err(RentalRoiError::DivisionByZero {
            context: "mortgage payment denominator".into(),
        });
    }

    Ok(loan_amount * monthly_rate * compound / denominator)
}

/// Walk the schedule month by month for `months` payments.
///
/// Each period: interest = balance * r, principal = payment - interest.
pub fn principal_paid(
    loan_amount: Money,
    payment: Money,
    monthly_rate: Rate,
    months: u32,
) -> PrincipalPaid {
    let mut balance = loan_amount;
    let mut total_principal = Decimal::ZERO;

    for _ in 0..months {
        let interest = balance * monthly_rate;
        let principal = payment - interest;
        total_principal += principal;
        balance -= principal;
    }

    PrincipalPaid {
        total_principal,
        ending_balance: balance,
    }
}

/// Payment on a `term_months` schedule and the paydown after `horizon_months`.
pub fn amortize(
    loan_amount: Money,
    monthly_rate: Rate,
    term_months: u32,
    horizon_months: u32,
) -> RentalRoiResult<AmortizationResult> {
    let payment = monthly_payment(loan_amount, monthly_rate, term_months)?;
    let paid = principal_paid(loan_amount, payment, monthly_rate, horizon_months);

    Ok(AmortizationResult {
        monthly_payment: payment,
        total_principal: paid.total_principal,
        ending_balance: paid.ending_balance,
    })
}
