//! Interest-rate risk measures for a [`Bond`]: Macaulay, modified and
//! effective duration, and convexity.
//!
//! Macaulay duration weights each discounted cash flow by its period count in
//! years. Effective duration and convexity are central finite differences of
//! [`Bond::present_value`], so they include the stub-period adjustment and
//! transaction costs exactly as valuation does.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::ValuationError;
use crate::fixed_income::bond::Bond;
use crate::types::{Rate, Years};
use crate::ValuationResult;

/// Rate shift used by [`Bond::effective_duration`] when none is given.
pub const DEFAULT_RATE_CHANGE: Rate = dec!(0.01);

impl Bond {
    /// Present-value-weighted average time to receipt, in years.
    pub fn macaulay_duration(&self, discount_rate: Rate) -> ValuationResult<Years> {
        let pv = self.present_value(discount_rate)?;
        if pv.is_zero() {
            return Err(ValuationError::DivisionByZero {
                context: "Macaulay duration: present value is zero".into(),
            });
        }

        let freq = Decimal::from(self.frequency());
        let duration: Decimal = self
            .discounted_cashflows(discount_rate)?
            .iter()
            .enumerate()
            .map(|(i, dcf)| dcf / pv * Decimal::from(i as u64 + 1) / freq)
            .sum();

        Ok(duration)
    }

    /// Macaulay duration / (1 + r/freq).
    pub fn modified_duration(&self, discount_rate: Rate) -> ValuationResult<Years> {
        let freq = Decimal::from(self.frequency());
        let divisor = Decimal::ONE + discount_rate / freq;
        if divisor.is_zero() {
            return Err(ValuationError::DivisionByZero {
                context: "modified duration: 1 + r/freq is zero".into(),
            });
        }
        Ok(self.macaulay_duration(discount_rate)? / divisor)
    }

    /// (PV(r - dr) - PV(r + dr)) / (2 * dr * PV(r)).
    pub fn effective_duration(
        &self,
        discount_rate: Rate,
        rate_change: Option<Rate>,
    ) -> ValuationResult<Decimal> {
        let dr = rate_change.unwrap_or(DEFAULT_RATE_CHANGE);
        let (down, base, up) = self.shifted_values(discount_rate, dr, "effective duration")?;
        Ok((down - up) / (dec!(2) * dr * base))
    }

    /// (PV(r - dr) + PV(r + dr) - 2 * PV(r)) / (PV(r) * dr^2).
    pub fn convexity(&self, discount_rate: Rate, rate_change: Rate) -> ValuationResult<Decimal> {
        let (down, base, up) = self.shifted_values(discount_rate, rate_change, "convexity")?;
        Ok((down + up - dec!(2) * base) / (base * rate_change * rate_change))
    }

    fn shifted_values(
        &self,
        discount_rate: Rate,
        rate_change: Rate,
        measure: &str,
    ) -> ValuationResult<(Decimal, Decimal, Decimal)> {
        if rate_change.is_zero() {
            return Err(ValuationError::DivisionByZero {
                context: format!("{measure}: rate change is zero"),
            });
        }
        let base = self.present_value(discount_rate)?;
        if base.is_zero() {
            return Err(ValuationError::DivisionByZero {
                context: format!("{measure}: present value is zero"),
            });
        }
        let down = self.present_value(discount_rate - rate_change)?;
        let up = self.present_value(discount_rate + rate_change)?;
        Ok((down, base, up))
    }
}
