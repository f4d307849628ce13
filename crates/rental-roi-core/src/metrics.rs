use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::amortization::{self, MORTGAGE_TERM_MONTHS};
use crate::assumptions::AssumptionSet;
use crate::error::RentalRoiError;
use crate::types::{Money, Rate, RegionObservation};
use crate::RentalRoiResult;

/// US residential rental property recovery period, in years.
pub const DEPRECIATION_YEARS: Decimal = dec!(27.5);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Return metrics for one property at one price and rent.
///
/// Ratios are fractions (0.084 = 8.4%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyReturns {
    pub loan_amount: Money,
    /// Down payment plus closing costs
    pub cash_invested: Money,
    pub monthly_payment: Money,
    /// Debt service plus operating costs
    pub monthly_expenses: Money,
    pub monthly_cash_flow: Money,
    pub annual_cash_flow: Money,
    /// Annual cash flow / cash invested
    pub basic_coc: Rate,
    /// Annual depreciation deduction on the structure
    pub depreciation: Money,
    /// Tax saved by the depreciation deduction
    pub tax_savings: Money,
    pub first_year_principal: Money,
    /// (cash flow + tax savings + year-one principal) / cash invested
    pub first_year_roi: Rate,
    pub appreciation_gain: Money,
    /// Principal retired over the holding period
    pub total_principal: Money,
    /// Loan balance at the end of the holding period
    pub ending_balance: Money,
    pub total_return: Money,
    /// Total return / cash invested
    pub total_roc: Rate,
}

/// Return metrics for a region, keyed by the region it was computed for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionMetrics {
    pub region_id: String,
    pub label: String,
    pub home_price: Money,
    pub rent: Money,
    #[serde(flatten)]
    pub returns: PropertyReturns,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Metrics for every region, in input order.
pub fn compute(
    regions: &[RegionObservation],
    assumptions: &AssumptionSet,
) -> RentalRoiResult<Vec<RegionMetrics>> {
    regions
        .iter()
        .map(|region| {
            let returns = evaluate(region.home_price, region.rent, assumptions).map_err(|e| {
                tracing::debug!(region = %region.region_id, error = %e, "metrics failed");
                e
            })?;
            Ok(RegionMetrics {
                region_id: region.region_id.clone(),
                label: region.label.clone(),
                home_price: region.home_price,
                rent: region.rent,
                returns,
            })
        })
        .collect()
}

/// Full metric composition for one property.
///
/// Later ratios are built from the earlier absolute amounts, so the steps run
/// in a fixed order.
pub fn evaluate(
    home_price: Money,
    rent: Money,
    assumptions: &AssumptionSet,
) -> RentalRoiResult<PropertyReturns> {
    validate_inputs(home_price, rent, assumptions)?;
    let a = assumptions;
    let twelve = dec!(12);

    // 1. Financing
    let loan_amount = home_price * a.loan_to_value();
    let cash_invested = home_price * a.down_payment_pct + home_price * a.closing_cost_pct;
    if cash_invested.is_zero() {
        return Err(RentalRoiError::DivisionByZero {
            context: "cash invested (down payment + closing costs)".into(),
        });
    }

    // 2. Debt service on the fixed 30-year schedule
    let monthly_rate = a.interest_rate / twelve;
    let monthly_payment =
        amortization::monthly_payment(loan_amount, monthly_rate, MORTGAGE_TERM_MONTHS)?;

    // 3-4. Operating cash flow
    let monthly_expenses = monthly_payment
        + a.insurance_annual / twelve
        + home_price * a.maintenance_rate / twelve
        + rent * a.vacancy_rate
        + rent * a.property_mgmt_pct
        + a.capex_monthly
        + home_price * a.property_tax_rate / twelve;
    let monthly_cash_flow = rent - monthly_expenses;
    let annual_cash_flow = monthly_cash_flow * twelve;

    // 5. Depreciation shield
    let depreciation = home_price * a.structure_pct / DEPRECIATION_YEARS;
    let tax_savings = depreciation * a.marginal_tax_rate;

    // 6. Year-one paydown
    let first_year_principal =
        amortization::principal_paid(loan_amount, monthly_payment, monthly_rate, 12).total_principal;

    // 7. First-year ratios
    let basic_coc = annual_cash_flow / cash_invested;
    let first_year_roi = (annual_cash_flow + tax_savings + first_year_principal) / cash_invested;

    // 8. Holding-period paydown, capped at the loan term
    let horizon_months = a
        .appreciation_years
        .checked_mul(12)
        .ok_or_else(|| RentalRoiError::InvalidInput {
            field: "appreciation_years".into(),
            reason: format!("{} years overflows the month count", a.appreciation_years),
        })?
        .min(MORTGAGE_TERM_MONTHS);
    let horizon =
        amortization::principal_paid(loan_amount, monthly_payment, monthly_rate, horizon_months);

    // 9. Appreciation
    let growth = (Decimal::ONE + a.annual_appreciation_pct)
        .checked_powu(u64::from(a.appreciation_years))
        .ok_or_else(|| RentalRoiError::InvalidInput {
            field: "annual_appreciation_pct".into(),
            reason: "Compounded appreciation overflows".into(),
        })?;
    let appreciation_gain = home_price * (growth - Decimal::ONE);

    // 10. Total return
    let years = Decimal::from(a.appreciation_years);
    let total_return = appreciation_gain
        + annual_cash_flow * years
        + tax_savings * years
        + horizon.total_principal;
    let total_roc = total_return / cash_invested;

    Ok(PropertyReturns {
        loan_amount,
        cash_invested,
        monthly_payment,
        monthly_expenses,
        monthly_cash_flow,
        annual_cash_flow,
        basic_coc,
        depreciation,
        tax_savings,
        first_year_principal,
        first_year_roi,
        appreciation_gain,
        total_principal: horizon.total_principal,
        ending_balance: horizon.ending_balance,
        total_return,
        total_roc,
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_inputs(home_price: Money, rent: Money, a: &AssumptionSet) -> RentalRoiResult<()> {
    if home_price <= Decimal::ZERO {
        return Err(RentalRoiError::InvalidInput {
            field: "home_price".into(),
            reason: "Home price must be positive".into(),
        });
    }
    if rent <= Decimal::ZERO {
        return Err(RentalRoiError::InvalidInput {
            field: "rent".into(),
            reason: "Rent must be positive".into(),
        });
    }
    if a.appreciation_years < 1 {
        return Err(RentalRoiError::InvalidInput {
            field: "appreciation_years".into(),
            reason: "Holding period must be at least 1 year".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Period;

    fn approx_eq(a: Decimal, b: Decimal, eps: Decimal) -> bool {
        (a - b).abs() < eps
    }

    fn region(id: &str, price: Decimal, rent: Decimal) -> RegionObservation {
        RegionObservation {
            region_id: id.into(),
            label: id.into(),
            home_price: price,
            rent,
            as_of: Period::from_ymd_opt(2025, 5, 31).unwrap(),
        }
    }

    #[test]
    fn test_reference_property_financing() {
        let r = evaluate(dec!(400000), dec!(2500), &AssumptionSet::default()).unwrap();
        assert_eq!(r.loan_amount, dec!(320000));
        assert_eq!(r.cash_invested, dec!(88000));
        assert!(approx_eq(r.monthly_payment, dec!(2128.97), dec!(0.01)));
    }

    #[test]
    fn test_loan_follows_loan_to_value() {
        let a = AssumptionSet {
            down_payment_pct: dec!(0.25),
            ..AssumptionSet::fixed_ltv()
        };
        let r = evaluate(dec!(400000), dec!(2500), &a).unwrap();
        assert_eq!(r.loan_amount, dec!(400000) * a.loan_to_value());
        assert_eq!(r.loan_amount, dec!(300000));
    }

    #[test]
    fn test_reference_property_cash_flow() {
        let r = evaluate(dec!(400000), dec!(2500), &AssumptionSet::default()).unwrap();
        // 2128.97 + 108.33 + 500 + 125 + 200 + 300 + 136.67 ≈ 3498.97
        assert!(approx_eq(r.monthly_expenses, dec!(3498.97), dec!(0.01)));
        assert!(approx_eq(r.monthly_cash_flow, dec!(-998.97), dec!(0.01)));
        assert_eq!(r.annual_cash_flow, r.monthly_cash_flow * dec!(12));
        assert!(approx_eq(r.basic_coc, dec!(-0.13622), dec!(0.0001)));
    }

    #[test]
    fn test_reference_property_tax_shield() {
        let r = evaluate(dec!(400000), dec!(2500), &AssumptionSet::default()).unwrap();
        // 400,000 * 0.85 / 27.5 = 12,363.64 ; * 24% = 2,967.27
        assert!(approx_eq(r.depreciation, dec!(12363.636), dec!(0.001)));
        assert!(approx_eq(r.tax_savings, dec!(2967.273), dec!(0.001)));
    }

    #[test]
    fn test_first_year_roi_exceeds_basic_coc() {
        let r = evaluate(dec!(400000), dec!(2500), &AssumptionSet::default()).unwrap();
        assert!(r.tax_savings + r.first_year_principal > Decimal::ZERO);
        assert!(r.first_year_roi > r.basic_coc);
    }

    #[test]
    fn test_total_return_composition() {
        let a = AssumptionSet::default();
        let r = evaluate(dec!(400000), dec!(2500), &a).unwrap();
        // 400,000 * (1.03^5 - 1) = 63,709.63
        assert!(approx_eq(r.appreciation_gain, dec!(63709.63), dec!(0.01)));
        let expected = r.appreciation_gain
            + r.annual_cash_flow * dec!(5)
            + r.tax_savings * dec!(5)
            + r.total_principal;
        assert_eq!(r.total_return, expected);
        assert_eq!(r.total_roc, r.total_return / r.cash_invested);
        assert!(approx_eq(r.total_principal + r.ending_balance, r.loan_amount, dec!(0.000001)));
    }

    #[test]
    fn test_one_year_horizon_matches_first_year_paydown() {
        let a = AssumptionSet {
            appreciation_years: 1,
            ..AssumptionSet::default()
        };
        let r = evaluate(dec!(300000), dec!(2200), &a).unwrap();
        assert_eq!(r.total_principal, r.first_year_principal);
    }

    #[test]
    fn test_holding_period_beyond_term_stops_at_payoff() {
        let a = AssumptionSet {
            appreciation_years: 40,
            ..AssumptionSet::default()
        };
        let r = evaluate(dec!(400000), dec!(2500), &a).unwrap();
        assert!(approx_eq(r.total_principal, r.loan_amount, dec!(0.01)));
        assert!(approx_eq(r.ending_balance, Decimal::ZERO, dec!(0.01)));
        assert!(r.total_principal <= r.loan_amount + dec!(0.01));
    }

    #[test]
    fn test_huge_holding_period_is_invalid_input() {
        let a = AssumptionSet {
            appreciation_years: 357_913_942,
            ..AssumptionSet::default()
        };
        let err = evaluate(dec!(400000), dec!(2500), &a).unwrap_err();
        assert!(matches!(
            err,
            RentalRoiError::InvalidInput { ref field, .. } if field == "appreciation_years"
        ));
    }

    #[test]
    fn test_all_cash_purchase_has_no_debt_service() {
        let a = AssumptionSet {
            down_payment_pct: Decimal::ONE,
            ..AssumptionSet::default()
        };
        let r = evaluate(dec!(250000), dec!(2000), &a).unwrap();
        assert_eq!(r.loan_amount, Decimal::ZERO);
        assert_eq!(r.monthly_payment, Decimal::ZERO);
        assert_eq!(r.first_year_principal, Decimal::ZERO);
    }

    #[test]
    fn test_zero_cash_invested_is_division_by_zero() {
        let a = AssumptionSet {
            down_payment_pct: Decimal::ZERO,
            closing_cost_pct: Decimal::ZERO,
            ..AssumptionSet::default()
        };
        let err = evaluate(dec!(250000), dec!(2000), &a).unwrap_err();
        assert!(matches!(err, RentalRoiError::DivisionByZero { .. }));
    }

    #[test]
    fn test_zero_interest_rate() {
        let a = AssumptionSet {
            interest_rate: Decimal::ZERO,
            ..AssumptionSet::default()
        };
        let r = evaluate(dec!(360000), dec!(2500), &a).unwrap();
        assert_eq!(r.monthly_payment, dec!(800));
        assert_eq!(r.first_year_principal, dec!(9600));
    }

    #[test]
    fn test_rejects_non_positive_inputs() {
        let a = AssumptionSet::default();
        assert!(matches!(
            evaluate(Decimal::ZERO, dec!(2000), &a),
            Err(RentalRoiError::InvalidInput { .. })
        ));
        assert!(evaluate(dec!(200000), dec!(-1), &a).is_err());

        let no_horizon = AssumptionSet {
            appreciation_years: 0,
            ..AssumptionSet::default()
        };
        assert!(evaluate(dec!(200000), dec!(1800), &no_horizon).is_err());
    }

    #[test]
    fn test_compute_preserves_order_and_count() {
        let regions = vec![
            region("80910", dec!(350000), dec!(2100)),
            region("80903", dec!(420000), dec!(2600)),
            region("80906", dec!(750000), dec!(3400)),
        ];
        let out = compute(&regions, &AssumptionSet::default()).unwrap();
        let ids: Vec<&str> = out.iter().map(|m| m.region_id.as_str()).collect();
        assert_eq!(ids, vec!["80910", "80903", "80906"]);

        let single = evaluate(dec!(420000), dec!(2600), &AssumptionSet::default()).unwrap();
        assert_eq!(out[1].returns, single);
    }

    #[test]
    fn test_compute_empty_input() {
        assert!(compute(&[], &AssumptionSet::default()).unwrap().is_empty());
    }

    #[test]
    fn test_returns_rise_with_rent() {
        let a = AssumptionSet::default();
        let mut prev = evaluate(dec!(400000), dec!(1500), &a).unwrap();
        for rent in [dec!(2000), dec!(2500), dec!(3000), dec!(4000)] {
            let next = evaluate(dec!(400000), rent, &a).unwrap();
            assert!(next.basic_coc >= prev.basic_coc);
            assert!(next.first_year_roi >= prev.first_year_roi);
            prev = next;
        }
    }

    #[test]
    fn test_returns_fall_with_interest_rate() {
        let mut prev: Option<PropertyReturns> = None;
        for rate in [dec!(0.03), dec!(0.05), dec!(0.07), dec!(0.09), dec!(0.11)] {
            let a = AssumptionSet {
                interest_rate: rate,
                ..AssumptionSet::default()
            };
            let next = evaluate(dec!(400000), dec!(2500), &a).unwrap();
            if let Some(p) = prev {
                assert!(next.basic_coc <= p.basic_coc);
                assert!(next.first_year_roi <= p.first_year_roi);
            }
            prev = Some(next);
        }
    }
}
