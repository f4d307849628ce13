use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::metrics::RegionMetrics;
use crate::types::Money;

/// Fields a result table can be ranked or sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricField {
    BasicCoc,
    FirstYearRoi,
    TotalRoc,
    TotalReturn,
    HomePrice,
    Rent,
    MonthlyCashFlow,
}

impl MetricField {
    pub fn value(self, m: &RegionMetrics) -> Decimal {
        match self {
            MetricField::BasicCoc => m.returns.basic_coc,
            MetricField::FirstYearRoi => m.returns.first_year_roi,
            MetricField::TotalRoc => m.returns.total_roc,
            MetricField::TotalReturn => m.returns.total_return,
            MetricField::HomePrice => m.home_price,
            MetricField::Rent => m.rent,
            MetricField::MonthlyCashFlow => m.returns.monthly_cash_flow,
        }
    }
}

/// Price band plus ordering for the explorer table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenCriteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<Money>,
    pub sort_by: MetricField,
    pub ascending: bool,
}

impl Default for ScreenCriteria {
    fn default() -> Self {
        Self {
            min_price: None,
            max_price: None,
            sort_by: MetricField::BasicCoc,
            ascending: false,
        }
    }
}

/// The `n` best regions by `field`, highest first. Ties keep input order.
pub fn top_n(metrics: &[RegionMetrics], field: MetricField, n: usize) -> Vec<RegionMetrics> {
    let mut ranked = metrics.to_vec();
    ranked.sort_by(|a, b| field.value(b).cmp(&field.value(a)));
    ranked.truncate(n);
    ranked
}

/// Regions priced within the inclusive band, sorted by the chosen field.
pub fn screen(metrics: &[RegionMetrics], criteria: &ScreenCriteria) -> Vec<RegionMetrics> {
    let mut rows: Vec<RegionMetrics> = metrics
        .iter()
        .filter(|m| criteria.min_price.map_or(true, |lo| m.home_price >= lo))
        .filter(|m| criteria.max_price.map_or(true, |hi| m.home_price <= hi))
        .cloned()
        .collect();

    let field = criteria.sort_by;
    rows.sort_by(|a, b| {
        let ord: Ordering = field.value(a).cmp(&field.value(b));
        if criteria.ascending {
            ord
        } else {
            ord.reverse()
        }
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::PropertyReturns;
    use rust_decimal_macros::dec;

    fn row(id: &str, price: Decimal, coc: Decimal, total_return: Decimal) -> RegionMetrics {
        RegionMetrics {
            region_id: id.into(),
            label: id.into(),
            home_price: price,
            rent: price / dec!(150),
            returns: PropertyReturns {
                loan_amount: Decimal::ZERO,
                cash_invested: dec!(1),
                monthly_payment: Decimal::ZERO,
                monthly_expenses: Decimal::ZERO,
                monthly_cash_flow: Decimal::ZERO,
                annual_cash_flow: Decimal::ZERO,
                basic_coc: coc,
                depreciation: Decimal::ZERO,
                tax_savings: Decimal::ZERO,
                first_year_principal: Decimal::ZERO,
                first_year_roi: coc,
                appreciation_gain: Decimal::ZERO,
                total_principal: Decimal::ZERO,
                ending_balance: Decimal::ZERO,
                total_return,
                total_roc: total_return,
            },
        }
    }

    fn sample() -> Vec<RegionMetrics> {
        vec![
            row("80910", dec!(320000), dec!(-0.05), dec!(40000)),
            row("80903", dec!(410000), dec!(-0.12), dec!(55000)),
            row("80916", dec!(290000), dec!(-0.02), dec!(38000)),
            row("80906", dec!(780000), dec!(-0.20), dec!(90000)),
            row("80909", dec!(305000), dec!(-0.02), dec!(36000)),
        ]
    }

    fn ids(rows: &[RegionMetrics]) -> Vec<&str> {
        rows.iter().map(|r| r.region_id.as_str()).collect()
    }

    #[test]
    fn test_top_n_descending_with_stable_ties() {
        let top = top_n(&sample(), MetricField::BasicCoc, 3);
        assert_eq!(ids(&top), vec!["80916", "80909", "80910"]);
    }

    #[test]
    fn test_top_n_larger_than_input() {
        let top = top_n(&sample(), MetricField::TotalReturn, 10);
        assert_eq!(top.len(), 5);
        assert_eq!(top[0].region_id, "80906");
    }

    #[test]
    fn test_screen_price_band_is_inclusive() {
        let criteria = ScreenCriteria {
            min_price: Some(dec!(305000)),
            max_price: Some(dec!(410000)),
            sort_by: MetricField::HomePrice,
            ascending: true,
        };
        let rows = screen(&sample(), &criteria);
        assert_eq!(ids(&rows), vec!["80909", "80910", "80903"]);
    }

    #[test]
    fn test_screen_default_sorts_by_coc_descending() {
        let rows = screen(&sample(), &ScreenCriteria::default());
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].region_id, "80916");
        assert_eq!(rows[4].region_id, "80906");
    }

    #[test]
    fn test_metric_field_names() {
        let field: MetricField = serde_json::from_str(r#""first_year_roi""#).unwrap();
        assert_eq!(field, MetricField::FirstYearRoi);
    }
}
