use bond_valuation_core::fixed_income::analysis::{analyze_bond, BondAnalysisInput};
use bond_valuation_core::fixed_income::{Bond, BondTerms};
use bond_valuation_core::ValuationError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn bond(
    coupon_rate: Decimal,
    current_price: Decimal,
    days_to_maturity: u32,
    rating: &str,
    frequency: u32,
) -> Bond {
    Bond::new(BondTerms {
        coupon_rate,
        face_value: dec!(1000),
        current_price,
        days_to_maturity,
        rating: rating.into(),
        frequency,
        transaction_costs: Decimal::ZERO,
    })
    .unwrap()
}

// ===========================================================================
// Reference scenarios
// ===========================================================================

#[test]
fn test_one_year_discount_bond_construction() {
    let b = bond(dec!(0.05), dec!(950), 365, "A", 1);
    assert_eq!(b.coupon(), dec!(50));
    assert_eq!(b.days_to_next_coupon(), 0);
    assert_eq!(b.accrued_interest(), Decimal::ZERO);
    assert_eq!(b.clean_price(), dec!(950));
    assert_eq!(b.cashflows().to_vec(), vec![dec!(-950), dec!(1050)]);
}

#[test]
fn test_present_value_at_coupon_rate_is_face() {
    let b = bond(dec!(0.05), dec!(950), 365, "A", 1);
    let pv = b.present_value(dec!(0.05)).unwrap();
    assert!((pv - dec!(1000)).abs() < dec!(0.0001), "got {pv}");
}

#[test]
fn test_single_period_irr_matches_price_growth() {
    let b = bond(dec!(0.05), dec!(950), 365, "A", 1);
    let r = b.irr().unwrap();
    assert!(b.net_present_value(r).unwrap().abs() < dec!(0.0001));
    // 950 * (1 + r) ~= 1050
    assert!((dec!(950) * (Decimal::ONE + r) - dec!(1050)).abs() < dec!(0.001));
}

#[test]
fn test_two_year_zero_coupon() {
    let b = bond(Decimal::ZERO, dec!(900), 730, "B", 1);
    assert_eq!(b.cashflows().to_vec(), vec![dec!(-900), dec!(0), dec!(1000)]);
    for rate in [dec!(0.001), dec!(0.03), dec!(0.25), dec!(1.5)] {
        let d = b.macaulay_duration(rate).unwrap();
        assert!((d - dec!(2)).abs() < dec!(0.0000001), "rate {rate}: got {d}");
    }
}

// ===========================================================================
// Schedule properties
// ===========================================================================

#[test]
fn test_schedule_shape_for_many_terms() {
    for days in [1, 100, 364, 365, 366, 730, 1000, 3650, 3651] {
        for frequency in [1, 2, 4, 12] {
            let b = bond(dec!(0.045), dec!(987.5), days, "BBB", frequency);
            let cfs = b.cashflows();
            let years = days.div_ceil(365) as usize;

            assert_eq!(cfs.len(), years * frequency as usize + 1);
            assert_eq!(cfs[0], -b.clean_price());
            assert!(cfs[0] <= Decimal::ZERO);
            assert_eq!(
                cfs[cfs.len() - 1],
                b.coupon() / Decimal::from(frequency) + dec!(1000)
            );
            assert_eq!(
                b.discounted_cashflows(dec!(0.07)).unwrap().len(),
                cfs.len() - 1
            );
        }
    }
}

#[test]
fn test_cash_flow_in_period_out_of_range() {
    let b = bond(dec!(0.05), dec!(950), 365, "A", 1);
    assert!(matches!(
        b.cash_flow_in_period(5),
        Err(ValuationError::PeriodOutOfRange { period: 5, len: 2 })
    ));
}

#[test]
fn test_valuation_does_not_mutate_bond() {
    let b = bond(dec!(0.05), dec!(990), 800, "A", 2);
    let before = b.clone();
    b.present_value(dec!(0.08)).unwrap();
    b.irr().unwrap();
    b.convexity(dec!(0.04), dec!(0.01)).unwrap();
    assert_eq!(b, before);
}

// ===========================================================================
// Yield and risk properties
// ===========================================================================

#[test]
fn test_irr_zeroes_npv_for_typical_bonds() {
    let cases = [
        (dec!(0.05), dec!(950), 365 * 5, 1),
        (dec!(0.03), dec!(1020), 365 * 7, 2),
        (dec!(0.08), dec!(870), 400, 4),
        (dec!(0.065), dec!(1000), 365 * 20, 12),
    ];
    for (coupon_rate, price, days, frequency) in cases {
        let b = bond(coupon_rate, price, days, "A", frequency);
        let r = b.irr().unwrap();
        let npv = b.net_present_value(r).unwrap();
        assert!(npv.abs() < dec!(0.0001), "{coupon_rate}/{price}/{days}: npv {npv}");
    }
}

#[test]
fn test_modified_duration_below_macaulay() {
    let b = bond(dec!(0.06), dec!(1000), 365 * 8, "AA", 2);
    for rate in [dec!(0.001), dec!(0.02), dec!(0.06), dec!(0.15)] {
        let mac = b.macaulay_duration(rate).unwrap();
        let modified = b.modified_duration(rate).unwrap();
        assert!(modified < mac, "rate {rate}: {modified} >= {mac}");
    }
}

#[test]
fn test_longer_maturity_higher_duration() {
    let short = bond(dec!(0.05), dec!(1000), 365 * 3, "A", 1);
    let long = bond(dec!(0.05), dec!(1000), 365 * 15, "A", 1);
    assert!(long.macaulay_duration(dec!(0.05)).unwrap() > short.macaulay_duration(dec!(0.05)).unwrap());
    assert!(long.convexity(dec!(0.05), dec!(0.01)).unwrap() > short.convexity(dec!(0.05), dec!(0.01)).unwrap());
}

#[test]
fn test_analysis_matches_direct_calls() {
    let terms = BondTerms {
        coupon_rate: dec!(0.04),
        face_value: dec!(1000),
        current_price: dec!(960),
        days_to_maturity: 1400,
        rating: String::new(),
        frequency: 2,
        transaction_costs: dec!(2.5),
    };
    let b = Bond::new(terms.clone()).unwrap();
    let input = BondAnalysisInput {
        terms,
        discount_rate: dec!(0.05),
        rate_change: Some(dec!(0.005)),
        settlement_date: None,
        maturity_date: None,
    };
    let out = analyze_bond(&input).unwrap().result;

    assert_eq!(out.present_value, b.present_value(dec!(0.05)).unwrap());
    assert_eq!(out.irr, b.irr().unwrap());
    assert_eq!(out.macaulay_duration, b.macaulay_duration(dec!(0.05)).unwrap());
    assert_eq!(
        out.effective_duration,
        b.effective_duration(dec!(0.05), Some(dec!(0.005))).unwrap()
    );
    assert_eq!(out.convexity, b.convexity(dec!(0.05), dec!(0.005)).unwrap());
}
