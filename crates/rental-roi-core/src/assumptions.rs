use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

/// Investment assumptions applied uniformly to every region.
///
/// All rates are fractions (0.07 = 7%). Missing fields fall back to the
/// defaults when deserialized, so a JSON file only needs the overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssumptionSet {
    /// Annual mortgage interest rate
    pub interest_rate: Rate,
    /// Share of price paid in cash at purchase
    pub down_payment_pct: Rate,
    /// Closing costs as a share of price
    pub closing_cost_pct: Rate,
    /// Annual maintenance as a share of price
    pub maintenance_rate: Rate,
    pub insurance_annual: Money,
    /// Share of rent lost to vacancy
    pub vacancy_rate: Rate,
    /// Management fee as a share of rent
    pub property_mgmt_pct: Rate,
    pub capex_monthly: Money,
    pub marginal_tax_rate: Rate,
    /// Depreciable share of price (excludes land)
    pub structure_pct: Rate,
    pub annual_appreciation_pct: Rate,
    /// Holding period for total-return metrics, in whole years
    pub appreciation_years: u32,
    /// Annual property tax as a share of price
    pub property_tax_rate: Rate,
}

impl Default for AssumptionSet {
    fn default() -> Self {
        Self {
            interest_rate: dec!(0.07),
            down_payment_pct: dec!(0.20),
            closing_cost_pct: dec!(0.02),
            maintenance_rate: dec!(0.015),
            insurance_annual: dec!(1300),
            vacancy_rate: dec!(0.05),
            property_mgmt_pct: dec!(0.08),
            capex_monthly: dec!(300),
            marginal_tax_rate: dec!(0.24),
            structure_pct: dec!(0.85),
            annual_appreciation_pct: dec!(0.03),
            appreciation_years: 5,
            property_tax_rate: dec!(0.0041),
        }
    }
}

impl AssumptionSet {
    /// Defaults financed at a fixed 80% loan-to-value.
    pub fn fixed_ltv() -> Self {
        Self {
            down_payment_pct: dec!(0.20),
            ..Self::default()
        }
    }

    /// Loan-to-value implied by the down payment.
    pub fn loan_to_value(&self) -> Rate {
        Decimal::ONE - self.down_payment_pct
    }

    /// Flag values outside the ranges the dashboard offers.
    ///
    /// These are advisory: the engine computes with whatever it is given and
    /// only rejects inputs that make the math undefined.
    pub fn validate_ranges(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let rate_checks: [(&str, Rate, Rate, Rate); 10] = [
            ("interest_rate", self.interest_rate, dec!(0.02), dec!(0.12)),
            ("down_payment_pct", self.down_payment_pct, Decimal::ZERO, Decimal::ONE),
            ("closing_cost_pct", self.closing_cost_pct, Decimal::ZERO, dec!(0.05)),
            ("maintenance_rate", self.maintenance_rate, Decimal::ZERO, dec!(0.05)),
            ("vacancy_rate", self.vacancy_rate, Decimal::ZERO, dec!(0.15)),
            ("property_mgmt_pct", self.property_mgmt_pct, Decimal::ZERO, dec!(0.15)),
            ("marginal_tax_rate", self.marginal_tax_rate, Decimal::ZERO, dec!(0.50)),
            ("structure_pct", self.structure_pct, dec!(0.50), Decimal::ONE),
            ("annual_appreciation_pct", self.annual_appreciation_pct, Decimal::ZERO, dec!(0.10)),
            ("property_tax_rate", self.property_tax_rate, dec!(0.001), dec!(0.03)),
        ];
        for (field, value, lo, hi) in rate_checks {
            if value < lo || value > hi {
                warnings.push(format!(
                    "{field} of {:.2}% is outside the expected {:.2}%–{:.2}% range",
                    value * dec!(100),
                    lo * dec!(100),
                    hi * dec!(100)
                ));
            }
        }

        if self.insurance_annual < dec!(500) || self.insurance_annual > dec!(3000) {
            warnings.push(format!(
                "insurance_annual of {} is outside the expected 500–3000 range",
                self.insurance_annual
            ));
        }
        if self.capex_monthly < Decimal::ZERO || self.capex_monthly > dec!(1000) {
            warnings.push(format!(
                "capex_monthly of {} is outside the expected 0–1000 range",
                self.capex_monthly
            ));
        }
        if !(1..=30).contains(&self.appreciation_years) {
            warnings.push(format!(
                "appreciation_years of {} is outside the expected 1–30 range",
                self.appreciation_years
            ));
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_in_range() {
        assert!(AssumptionSet::default().validate_ranges().is_empty());
    }

    #[test]
    fn test_fixed_ltv_is_eighty_percent() {
        assert_eq!(AssumptionSet::fixed_ltv().loan_to_value(), dec!(0.80));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let a: AssumptionSet =
            serde_json::from_str(r#"{"interest_rate": "0.065", "appreciation_years": 10}"#).unwrap();
        assert_eq!(a.interest_rate, dec!(0.065));
        assert_eq!(a.appreciation_years, 10);
        assert_eq!(a.down_payment_pct, dec!(0.20));
        assert_eq!(a.capex_monthly, dec!(300));
    }

    #[test]
    fn test_out_of_range_values_are_flagged() {
        let a = AssumptionSet {
            interest_rate: dec!(0.15),
            vacancy_rate: dec!(0.30),
            appreciation_years: 40,
            ..AssumptionSet::default()
        };
        let warnings = a.validate_ranges();
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].starts_with("interest_rate"));
    }
}
