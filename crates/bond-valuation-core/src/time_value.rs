use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::ValuationError;
use crate::solver::{bisect_decreasing, SolverOutcome};
use crate::types::{Money, Rate, Years};
use crate::ValuationResult;

/// Growth factor `(1 + rate)^years`.
pub fn compound_growth(rate: Rate, years: Years) -> ValuationResult<Decimal> {
    if rate <= dec!(-1) {
        return Err(ValuationError::Domain {
            function: "compound_growth".into(),
            reason: "Rate must be greater than -100%".into(),
        });
    }

    (Decimal::ONE + rate)
        .checked_powd(years)
        .ok_or_else(|| ValuationError::Domain {
            function: "compound_growth".into(),
            reason: format!("(1 + {rate})^{years} is not representable"),
        })
}

/// Rate implied by a growth factor over `years`: `growth^(1/years) - 1`.
pub fn implied_rate(growth_factor: Decimal, years: Years) -> ValuationResult<Rate> {
    if years.is_zero() {
        return Err(ValuationError::Domain {
            function: "implied_rate".into(),
            reason: "Time in years must be non-zero".into(),
        });
    }
    if growth_factor < Decimal::ZERO {
        return Err(ValuationError::Domain {
            function: "implied_rate".into(),
            reason: "Growth factor cannot be negative".into(),
        });
    }

    let root = growth_factor
        .checked_powd(Decimal::ONE / years)
        .ok_or_else(|| ValuationError::Domain {
            function: "implied_rate".into(),
            reason: format!("{growth_factor}^(1/{years}) is not representable"),
        })?;

    Ok(root - Decimal::ONE)
}

/// Years needed to reach a growth factor at `rate`: `ln(growth) / ln(1 + rate)`.
pub fn implied_time(growth_factor: Decimal, rate: Rate) -> ValuationResult<Years> {
    if growth_factor <= Decimal::ZERO {
        return Err(ValuationError::Domain {
            function: "implied_time".into(),
            reason: "Growth factor must be positive".into(),
        });
    }
    if rate <= dec!(-1) {
        return Err(ValuationError::Domain {
            function: "implied_time".into(),
            reason: "Rate must be greater than -100%".into(),
        });
    }
    if rate.is_zero() {
        return Err(ValuationError::Domain {
            function: "implied_time".into(),
            reason: "Logarithm base 1 is undefined at a zero rate".into(),
        });
    }

    let numerator = growth_factor.checked_ln().ok_or_else(|| ValuationError::Domain {
        function: "implied_time".into(),
        reason: format!("ln({growth_factor}) is undefined"),
    })?;
    let denominator = (Decimal::ONE + rate)
        .checked_ln()
        .ok_or_else(|| ValuationError::Domain {
            function: "implied_time".into(),
            reason: format!("ln(1 + {rate}) is undefined"),
        })?;

    Ok(numerator / denominator)
}

/// Closed-form present value of a level-coupon instrument plus redemption.
///
/// value = (F*c/f) * (1 - (1+d/f)^(-T*f)) / (d/f) + F * (1+d/f)^(-T*f)
///
/// The annuity factor is singular at `discount_rate == 0`; that case is
/// reported as `DivisionByZero` rather than replaced by its limit.
pub fn present_value_basic(
    coupon_rate: Rate,
    face_value: Money,
    time_to_maturity: Years,
    discount_rate: Rate,
    frequency: u32,
) -> ValuationResult<Money> {
    if frequency == 0 {
        return Err(ValuationError::InvalidInput {
            field: "frequency".into(),
            reason: "Payment frequency must be at least 1".into(),
        });
    }
    if discount_rate.is_zero() {
        return Err(ValuationError::DivisionByZero {
            context: "annuity factor at a zero discount rate".into(),
        });
    }

    let freq = Decimal::from(frequency);
    let periodic_rate = discount_rate / freq;
    let one_plus_r = Decimal::ONE + periodic_rate;
    if one_plus_r <= Decimal::ZERO {
        return Err(ValuationError::InvalidInput {
            field: "discount_rate".into(),
            reason: "Periodic discount rate must be greater than -100%".into(),
        });
    }

    let growth = one_plus_r
        .checked_powd(time_to_maturity * freq)
        .ok_or_else(|| ValuationError::Domain {
            function: "present_value_basic".into(),
            reason: format!("(1 + {periodic_rate})^{} is not representable", time_to_maturity * freq),
        })?;
    if growth.is_zero() {
        return Err(ValuationError::DivisionByZero {
            context: "present_value_basic discount factor".into(),
        });
    }
    let discount = Decimal::ONE / growth;

    let coupon_per_period = face_value * coupon_rate / freq;
    let annuity_factor = (Decimal::ONE - discount) / periodic_rate;

    Ok(coupon_per_period * annuity_factor + face_value * discount)
}

/// Discount rate at which `present_value_basic` reproduces `target_value`.
pub fn implied_discount_rate_basic(
    coupon_rate: Rate,
    face_value: Money,
    time_to_maturity: Years,
    target_value: Money,
    frequency: u32,
) -> ValuationResult<SolverOutcome> {
    if target_value <= Decimal::ZERO {
        return Err(ValuationError::InvalidInput {
            field: "target_value".into(),
            reason: "Target present value must be positive".into(),
        });
    }

    bisect_decreasing(|rate| {
        let value =
            present_value_basic(coupon_rate, face_value, time_to_maturity, rate, frequency)?;
        Ok(value - target_value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_compound_growth_integer_years() {
        let result = compound_growth(dec!(0.05), dec!(2)).unwrap();
        assert_eq!(result, dec!(1.1025));
    }

    #[test]
    fn test_compound_growth_rejects_total_loss_rate() {
        assert!(compound_growth(dec!(-1), dec!(2)).is_err());
    }

    #[test]
    fn test_implied_rate_inverts_growth() {
        let result = implied_rate(dec!(1.1025), dec!(2)).unwrap();
        assert!((result - dec!(0.05)).abs() < dec!(0.000000001));
    }

    #[test]
    fn test_implied_rate_zero_years_is_domain_error() {
        let err = implied_rate(dec!(1.1), Decimal::ZERO).unwrap_err();
        assert!(matches!(err, ValuationError::Domain { .. }));
    }

    #[test]
    fn test_implied_time_inverts_growth() {
        let result = implied_time(dec!(1.1025), dec!(0.05)).unwrap();
        assert!((result - dec!(2)).abs() < dec!(0.000000001));
    }

    #[test]
    fn test_implied_time_domain_errors() {
        assert!(matches!(
            implied_time(Decimal::ZERO, dec!(0.05)),
            Err(ValuationError::Domain { .. })
        ));
        assert!(matches!(
            implied_time(dec!(-2), dec!(0.05)),
            Err(ValuationError::Domain { .. })
        ));
        assert!(matches!(
            implied_time(dec!(1.5), dec!(-1)),
            Err(ValuationError::Domain { .. })
        ));
    }

    #[test]
    fn test_present_value_basic_par_when_coupon_equals_discount() {
        let result = present_value_basic(dec!(0.05), dec!(1000), dec!(10), dec!(0.05), 1).unwrap();
        assert!((result - dec!(1000)).abs() < dec!(0.0000001));

        let semi = present_value_basic(dec!(0.06), dec!(1000), dec!(5), dec!(0.06), 2).unwrap();
        assert!((semi - dec!(1000)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_present_value_basic_discount_bond() {
        // 50 * 4.212364 + 1000 * 0.747258 = 957.88
        let result = present_value_basic(dec!(0.05), dec!(1000), dec!(5), dec!(0.06), 1).unwrap();
        assert!((result - dec!(957.88)).abs() < dec!(0.01), "got {result}");
    }

    #[test]
    fn test_present_value_basic_singular_at_zero_rate() {
        let err = present_value_basic(dec!(0.05), dec!(1000), dec!(5), Decimal::ZERO, 1).unwrap_err();
        assert!(matches!(err, ValuationError::DivisionByZero { .. }));
    }

    #[test]
    fn test_present_value_basic_zero_frequency_rejected() {
        assert!(present_value_basic(dec!(0.05), dec!(1000), dec!(5), dec!(0.05), 0).is_err());
    }

    #[test]
    fn test_implied_discount_rate_round_trip() {
        let rate = dec!(0.0632);
        let target = present_value_basic(dec!(0.045), dec!(1000), dec!(7.5), rate, 2).unwrap();
        let solved = implied_discount_rate_basic(dec!(0.045), dec!(1000), dec!(7.5), target, 2).unwrap();
        assert!(solved.converged);
        assert!(
            (solved.rate - rate).abs() < dec!(0.000001),
            "expected {rate}, got {}",
            solved.rate
        );
    }
}
