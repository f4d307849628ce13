use rental_roi_core::amortization;
use rental_roi_core::analysis::{analyze_deal, DealInput, NationalRentContext, RentSource};
use rental_roi_core::metrics;
use rental_roi_core::preparation::TrainingPoint;
use rental_roi_core::rent_model;
use rental_roi_core::{AssumptionSet, RentalRoiError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn national_context() -> NationalRentContext {
    let mut training: Vec<TrainingPoint> = (0..120)
        .map(|i| {
            let price = Decimal::from(120_000 + 5_000 * i);
            TrainingPoint {
                region_id: format!("{}", 30000 + i),
                home_price: price,
                rent: price * dec!(0.008),
            }
        })
        .collect();
    // One ZIP renting well above the national curve
    training.push(TrainingPoint {
        region_id: "80903".into(),
        home_price: dec!(400000),
        rent: dec!(4000),
    });
    NationalRentContext::build(training).unwrap()
}

fn deal(price: Decimal, rent: Option<Decimal>, region_id: Option<&str>) -> DealInput {
    DealInput {
        home_price: price,
        rent,
        region_id: region_id.map(String::from),
        assumptions: AssumptionSet::default(),
    }
}

// ===========================================================================
// Supplied rent
// ===========================================================================

#[test]
fn test_supplied_rent_matches_evaluate() {
    let out = analyze_deal(&deal(dec!(400000), Some(dec!(2500)), None), None).unwrap();
    let expected = metrics::evaluate(dec!(400000), dec!(2500), &AssumptionSet::default()).unwrap();

    assert_eq!(out.result.rent_source, RentSource::Supplied);
    assert_eq!(out.result.returns, expected);
    assert!(out.result.predicted_rent.is_none());
}

#[test]
fn test_reference_deal() {
    let out = analyze_deal(&deal(dec!(400000), Some(dec!(2500)), None), None).unwrap();
    let r = &out.result.returns;

    assert_eq!(r.loan_amount, dec!(320000));
    assert_eq!(r.cash_invested, dec!(88000));
    assert!((r.monthly_payment - dec!(2128.97)).abs() < dec!(0.01));
    assert!((r.monthly_expenses - dec!(3498.97)).abs() < dec!(0.01));
    assert!((r.monthly_cash_flow - dec!(-998.97)).abs() < dec!(0.01));
    assert!((r.depreciation - dec!(12363.636)).abs() < dec!(0.001));
    assert!((r.tax_savings - dec!(2967.273)).abs() < dec!(0.001));
    assert!((r.appreciation_gain - dec!(63709.63)).abs() < dec!(0.01));
    assert!((r.first_year_principal - dec!(3250.59)).abs() < dec!(0.01));
    assert!(r.first_year_roi > r.basic_coc);
    assert!(out.warnings.iter().any(|w| w.contains("negative")));
}

#[test]
fn test_full_term_repays_loan() {
    let payment = amortization::monthly_payment(
        dec!(320000),
        dec!(0.07) / dec!(12),
        amortization::MORTGAGE_TERM_MONTHS,
    )
    .unwrap();
    let paid = amortization::principal_paid(
        dec!(320000),
        payment,
        dec!(0.07) / dec!(12),
        amortization::MORTGAGE_TERM_MONTHS,
    );
    assert!((paid.total_principal - dec!(320000)).abs() < dec!(0.01));
}

// ===========================================================================
// Predicted rent
// ===========================================================================

#[test]
fn test_predicted_rent_from_national_model() {
    let ctx = national_context();
    let out = analyze_deal(&deal(dec!(300000), None, None), Some(&ctx)).unwrap();
    let predicted = rent_model::predict(&ctx.model, dec!(300000)).unwrap();

    assert_eq!(out.result.rent_source, RentSource::NationalModel);
    assert_eq!(out.result.rent, predicted);
    // close to the national 0.8% yield
    assert!((out.result.rent - dec!(2400)).abs() < dec!(50));
}

#[test]
fn test_region_adjusted_prediction() {
    let ctx = national_context();
    let out = analyze_deal(&deal(dec!(300000), None, Some("80903")), Some(&ctx)).unwrap();

    let ratio = out.result.adjustment_ratio.unwrap();
    assert!(ratio > Decimal::ONE);
    let expected = rent_model::adjusted_prediction(&ctx.model, dec!(300000), ratio).unwrap();
    assert_eq!(out.result.rent_source, RentSource::RegionAdjusted);
    assert_eq!(out.result.rent, expected);
}

#[test]
fn test_unknown_region_falls_back_with_warning() {
    let ctx = national_context();
    let out = analyze_deal(&deal(dec!(300000), None, Some("99999")), Some(&ctx)).unwrap();
    assert_eq!(out.result.rent_source, RentSource::NationalModel);
    assert!(out.result.adjustment_ratio.is_none());
    assert!(out.warnings.iter().any(|w| w.contains("99999")));
}

#[test]
fn test_supplied_rent_wins_over_prediction() {
    let ctx = national_context();
    let out = analyze_deal(&deal(dec!(300000), Some(dec!(2000)), None), Some(&ctx)).unwrap();
    assert_eq!(out.result.rent, dec!(2000));
    assert_eq!(out.result.rent_source, RentSource::Supplied);
    assert!(out.result.predicted_rent.is_some());
}

// ===========================================================================
// Errors and rules of thumb
// ===========================================================================

#[test]
fn test_no_rent_and_no_model() {
    let err = analyze_deal(&deal(dec!(300000), None, None), None).unwrap_err();
    assert!(matches!(err, RentalRoiError::InsufficientData(_)));
}

#[test]
fn test_non_positive_price_rejected() {
    let err = analyze_deal(&deal(Decimal::ZERO, Some(dec!(2000)), None), None).unwrap_err();
    assert!(matches!(err, RentalRoiError::InvalidInput { .. }));
}

#[test]
fn test_one_percent_rule() {
    assert_eq!(rent_model::one_percent_rule(dec!(350000), dec!(0.01)).unwrap(), dec!(3500));
    assert!(rent_model::one_percent_rule(dec!(-1), dec!(0.01)).is_err());
}

#[test]
fn test_deal_input_from_json_defaults() {
    let input: DealInput =
        serde_json::from_str(r#"{"home_price": "400000", "rent": "2500"}"#).unwrap();
    assert_eq!(input.assumptions, AssumptionSet::default());
    let out = analyze_deal(&input, None).unwrap();
    assert_eq!(out.result.home_price, dec!(400000));
}
