//! Single-instrument bond model.
//!
//! A [`Bond`] is built once from its [`BondTerms`]: the constructor derives the
//! stub period to the next coupon, accrued interest, the full purchase price
//! and the fixed-length cash-flow schedule. Every valuation method is a pure
//! function of that stored schedule and its discount-rate argument.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ValuationError;
use crate::types::{Money, Rate};
use crate::ValuationResult;

#[cfg(feature = "scenarios")]
use crate::scenarios::sensitivity::{rate_samples, sweep, RateSweep, DEFAULT_RATE_STEP};
#[cfg(feature = "scenarios")]
use crate::time_value::present_value_basic;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Day count used for every year fraction in this model.
pub const DAYS_PER_YEAR: u32 = 365;

/// Lowest discount rate sampled by [`Bond::sensitivity`] when none is given.
pub const DEFAULT_SENSITIVITY_FROM: Rate = dec!(0.001);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Terms of a single bond as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondTerms {
    /// Annual coupon rate as a decimal (e.g. 0.05 = 5%)
    pub coupon_rate: Rate,
    /// Nominal redemption value
    pub face_value: Money,
    /// Quoted market price, excluding accrued interest
    pub current_price: Money,
    /// Days until redemption (may exceed one year)
    #[serde(default)]
    pub days_to_maturity: u32,
    /// Credit rating label, carried for reference only
    #[serde(default)]
    pub rating: String,
    /// Coupon payments per year
    #[serde(default = "default_frequency")]
    pub frequency: u32,
    /// Flat deduction applied to every present value
    #[serde(default)]
    pub transaction_costs: Money,
}

fn default_frequency() -> u32 {
    1
}

/// Whether a scheduled cash flow is the purchase, a coupon, or the final
/// coupon plus redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CashflowKind {
    Purchase,
    Coupon,
    CouponAndPrincipal,
}

/// A bond with its derived valuation state. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bond {
    terms: BondTerms,
    days_to_next_coupon: u32,
    accrued_interest: Money,
    clean_price: Money,
    cashflows: Vec<Money>,
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl Bond {
    /// Validate the terms and derive accrued interest, the full purchase price
    /// and the cash-flow schedule.
    pub fn new(terms: BondTerms) -> ValuationResult<Self> {
        validate_terms(&terms)?;

        let coupon = terms.coupon_rate * terms.face_value;
        let days_to_next_coupon = terms.days_to_maturity % DAYS_PER_YEAR;
        let accrued_interest = if days_to_next_coupon == 0 {
            Decimal::ZERO
        } else {
            coupon * Decimal::from(DAYS_PER_YEAR - days_to_next_coupon)
                / Decimal::from(DAYS_PER_YEAR)
        };
        let clean_price = terms.current_price + accrued_interest;
        let cashflows = build_cashflow_schedule(&terms, coupon, clean_price);

        Ok(Self {
            terms,
            days_to_next_coupon,
            accrued_interest,
            clean_price,
            cashflows,
        })
    }

    pub fn terms(&self) -> &BondTerms {
        &self.terms
    }

    pub fn coupon_rate(&self) -> Rate {
        self.terms.coupon_rate
    }

    pub fn face_value(&self) -> Money {
        self.terms.face_value
    }

    pub fn rating(&self) -> &str {
        &self.terms.rating
    }

    pub fn frequency(&self) -> u32 {
        self.terms.frequency
    }

    pub fn transaction_costs(&self) -> Money {
        self.terms.transaction_costs
    }

    pub fn days_to_maturity(&self) -> u32 {
        self.terms.days_to_maturity
    }

    /// Days from valuation to the next coupon; 0 on a coupon date.
    pub fn days_to_next_coupon(&self) -> u32 {
        self.days_to_next_coupon
    }

    pub fn accrued_interest(&self) -> Money {
        self.accrued_interest
    }

    /// Quoted price plus accrued interest (the full price paid).
    pub fn clean_price(&self) -> Money {
        self.clean_price
    }

    /// The schedule: purchase outflow at index 0, then one slot per coupon
    /// period with face value added to the last.
    pub fn cashflows(&self) -> &[Money] {
        &self.cashflows
    }

    /// Kind of the cash flow at `period`, for display.
    pub fn cashflow_kind(&self, period: usize) -> ValuationResult<CashflowKind> {
        let last = self.cashflows.len() - 1;
        match period {
            0 => Ok(CashflowKind::Purchase),
            p if p < last => Ok(CashflowKind::Coupon),
            p if p == last => Ok(CashflowKind::CouponAndPrincipal),
            _ => Err(ValuationError::PeriodOutOfRange {
                period,
                len: self.cashflows.len(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Valuation
// ---------------------------------------------------------------------------

impl Bond {
    /// Annual coupon amount.
    pub fn coupon(&self) -> Money {
        self.terms.coupon_rate * self.terms.face_value
    }

    /// Current yield: annual coupon over the full price. Not the IRR.
    pub fn current_rate(&self) -> Rate {
        self.coupon() / self.clean_price
    }

    pub fn cash_flow_in_period(&self, period: usize) -> ValuationResult<Money> {
        self.cashflows
            .get(period)
            .copied()
            .ok_or(ValuationError::PeriodOutOfRange {
                period,
                len: self.cashflows.len(),
            })
    }

    /// Cash flow at `period` discounted over whole annual periods:
    /// `cf / (1 + r)^period`.
    pub fn present_value_of_cash_flow(
        &self,
        period: usize,
        discount_rate: Rate,
    ) -> ValuationResult<Money> {
        let cashflow = self.cash_flow_in_period(period)?;
        let one_plus_r = Decimal::ONE + discount_rate;

        let mut df = Decimal::ONE;
        for _ in 0..period {
            df = match df.checked_mul(one_plus_r) {
                Some(next) => next,
                None => return Ok(Decimal::ZERO),
            };
        }

        cashflow
            .checked_div(df)
            .ok_or_else(|| ValuationError::DivisionByZero {
                context: format!("discount factor for period {period}"),
            })
    }

    /// Every cash flow after the purchase, discounted to the valuation date.
    ///
    /// Element `i` is `cashflows[i + 1] / (1 + r/f)^(i + stub)` where `stub` is
    /// the fraction of a coupon period to the next coupon, or a full period
    /// when valuing on a coupon date. Discount factors too large to represent
    /// discount their cash flow to zero.
    pub fn discounted_cashflows(&self, discount_rate: Rate) -> ValuationResult<Vec<Money>> {
        let freq = Decimal::from(self.terms.frequency);
        let periodic = Decimal::ONE + discount_rate / freq;
        if periodic <= Decimal::ZERO {
            return Err(ValuationError::InvalidInput {
                field: "discount_rate".into(),
                reason: "Periodic discount rate must be greater than -100%".into(),
            });
        }

        let stub = self.stub_fraction();
        let mut df = if stub == Decimal::ONE {
            periodic
        } else {
            periodic
                .checked_powd(stub)
                .ok_or_else(|| ValuationError::Domain {
                    function: "discounted_cashflows".into(),
                    reason: format!("({periodic})^{stub} is not representable"),
                })?
        };

        let mut discounted = Vec::with_capacity(self.cashflows.len() - 1);
        let mut exhausted = false;

        for (i, cashflow) in self.cashflows.iter().skip(1).enumerate() {
            if i > 0 && !exhausted {
                match df.checked_mul(periodic) {
                    Some(next) => df = next,
                    None => exhausted = true,
                }
            }
            if exhausted {
                discounted.push(Decimal::ZERO);
                continue;
            }

            let value = cashflow
                .checked_div(df)
                .ok_or_else(|| ValuationError::DivisionByZero {
                    context: format!("discount factor for cash flow {}", i + 1),
                })?;
            discounted.push(value);
        }

        Ok(discounted)
    }

    /// Sum of the discounted cash flows less transaction costs.
    pub fn present_value(&self, discount_rate: Rate) -> ValuationResult<Money> {
        let total: Money = self.discounted_cashflows(discount_rate)?.iter().sum();
        Ok(total - self.terms.transaction_costs)
    }

    /// Present value less the full purchase price.
    ///
    /// The purchase outflow stored at index 0 is not part of
    /// `present_value`; the price is subtracted here explicitly.
    pub fn net_present_value(&self, discount_rate: Rate) -> ValuationResult<Money> {
        Ok(self.present_value(discount_rate)? - self.clean_price)
    }

    /// Fraction of a coupon period until the next coupon, or one full period
    /// when the valuation date is a coupon date.
    fn stub_fraction(&self) -> Decimal {
        if self.days_to_next_coupon == 0 {
            Decimal::ONE
        } else {
            Decimal::from(self.days_to_next_coupon)
                / Decimal::from(DAYS_PER_YEAR)
                / Decimal::from(self.terms.frequency)
        }
    }
}

// ---------------------------------------------------------------------------
// Sensitivity
// ---------------------------------------------------------------------------

#[cfg(feature = "scenarios")]
impl Bond {
    /// Closed-form present values of a bond with these terms at discount
    /// rates `from, from + 0.001, ...` up to but excluding `to`.
    pub fn sensitivity(
        &self,
        to_discount_rate: Rate,
        from_discount_rate: Option<Rate>,
    ) -> ValuationResult<Vec<Money>> {
        Ok(self
            .sensitivity_curve(to_discount_rate, from_discount_rate)?
            .present_values)
    }

    /// Sampled discount rates paired with their present values.
    pub fn sensitivity_curve(
        &self,
        to_discount_rate: Rate,
        from_discount_rate: Option<Rate>,
    ) -> ValuationResult<RateSweep> {
        let from = from_discount_rate.unwrap_or(DEFAULT_SENSITIVITY_FROM);
        let discount_rates = rate_samples(from, to_discount_rate, DEFAULT_RATE_STEP)?;
        let time_to_maturity =
            Decimal::from(self.terms.days_to_maturity) / Decimal::from(DAYS_PER_YEAR);

        let present_values = sweep(&discount_rates, |rate| {
            present_value_basic(
                self.terms.coupon_rate,
                self.terms.face_value,
                time_to_maturity,
                rate,
                self.terms.frequency,
            )
        })?;

        Ok(RateSweep {
            discount_rates,
            present_values,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Days from settlement to maturity, for callers holding calendar dates.
pub fn days_between(settlement: NaiveDate, maturity: NaiveDate) -> ValuationResult<u32> {
    let days = (maturity - settlement).num_days();
    if days <= 0 {
        return Err(ValuationError::InvalidInput {
            field: "maturity_date".into(),
            reason: "Maturity date must be after settlement date".into(),
        });
    }
    u32::try_from(days).map_err(|_| ValuationError::InvalidInput {
        field: "maturity_date".into(),
        reason: format!("{days} days to maturity is out of range"),
    })
}

fn validate_terms(terms: &BondTerms) -> ValuationResult<()> {
    if terms.face_value <= Decimal::ZERO {
        return Err(ValuationError::InvalidInput {
            field: "face_value".into(),
            reason: "Face value must be positive".into(),
        });
    }
    if terms.coupon_rate < Decimal::ZERO {
        return Err(ValuationError::InvalidInput {
            field: "coupon_rate".into(),
            reason: "Coupon rate cannot be negative".into(),
        });
    }
    if terms.current_price <= Decimal::ZERO {
        return Err(ValuationError::InvalidInput {
            field: "current_price".into(),
            reason: "Current price must be positive".into(),
        });
    }
    if terms.days_to_maturity == 0 {
        return Err(ValuationError::InvalidInput {
            field: "days_to_maturity".into(),
            reason: "Days to maturity must be positive".into(),
        });
    }
    if terms.frequency == 0 {
        return Err(ValuationError::InvalidInput {
            field: "frequency".into(),
            reason: "Coupon frequency must be at least 1".into(),
        });
    }
    if terms.transaction_costs < Decimal::ZERO {
        return Err(ValuationError::InvalidInput {
            field: "transaction_costs".into(),
            reason: "Transaction costs cannot be negative".into(),
        });
    }
    Ok(())
}

fn build_cashflow_schedule(terms: &BondTerms, coupon: Money, clean_price: Money) -> Vec<Money> {
    let years = terms.days_to_maturity.div_ceil(DAYS_PER_YEAR) as usize;
    let len = years * terms.frequency as usize + 1;
    let coupon_per_period = coupon / Decimal::from(terms.frequency);

    let mut cashflows = vec![coupon_per_period; len];
    cashflows[0] = -clean_price;
    cashflows[len - 1] += terms.face_value;
    cashflows
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn terms(coupon_rate: Rate, price: Money, days: u32, frequency: u32) -> BondTerms {
        BondTerms {
            coupon_rate,
            face_value: dec!(1000),
            current_price: price,
            days_to_maturity: days,
            rating: "A".into(),
            frequency,
            transaction_costs: Decimal::ZERO,
        }
    }

    #[test]
    fn test_one_year_annual_schedule() {
        let bond = Bond::new(terms(dec!(0.05), dec!(950), 365, 1)).unwrap();
        assert_eq!(bond.coupon(), dec!(50));
        assert_eq!(bond.days_to_next_coupon(), 0);
        assert_eq!(bond.accrued_interest(), Decimal::ZERO);
        assert_eq!(bond.clean_price(), dec!(950));
        assert_eq!(bond.cashflows(), &[dec!(-950), dec!(1050)][..]);
    }

    #[test]
    fn test_stub_period_accrues_interest() {
        // 500 days: next coupon in 135 days, 230 days accrued
        let bond = Bond::new(terms(dec!(0.073), dec!(980), 500, 1)).unwrap();
        assert_eq!(bond.days_to_next_coupon(), 135);
        let expected_accrued = dec!(73) * dec!(230) / dec!(365);
        assert!((bond.accrued_interest() - expected_accrued).abs() < dec!(0.0000001));
        assert!((bond.clean_price() - dec!(980) - expected_accrued).abs() < dec!(0.0000001));
        assert_eq!(bond.cashflows().len(), 3);
    }

    #[test]
    fn test_semi_annual_schedule_length_and_amounts() {
        let bond = Bond::new(terms(dec!(0.06), dec!(1010), 1095, 2)).unwrap();
        let cfs = bond.cashflows();
        assert_eq!(cfs.len(), 3 * 2 + 1);
        assert_eq!(cfs[0], -bond.clean_price());
        for cf in &cfs[1..cfs.len() - 1] {
            assert_eq!(*cf, dec!(30));
        }
        assert_eq!(cfs[cfs.len() - 1], dec!(1030));
    }

    #[test]
    fn test_cashflow_kinds() {
        let bond = Bond::new(terms(dec!(0.05), dec!(950), 730, 1)).unwrap();
        assert_eq!(bond.cashflow_kind(0).unwrap(), CashflowKind::Purchase);
        assert_eq!(bond.cashflow_kind(1).unwrap(), CashflowKind::Coupon);
        assert_eq!(bond.cashflow_kind(2).unwrap(), CashflowKind::CouponAndPrincipal);
        assert!(bond.cashflow_kind(3).is_err());
    }

    #[test]
    fn test_cash_flow_in_period_out_of_range() {
        let bond = Bond::new(terms(dec!(0.05), dec!(950), 365, 1)).unwrap();
        assert_eq!(bond.cash_flow_in_period(1).unwrap(), dec!(1050));
        let err = bond.cash_flow_in_period(2).unwrap_err();
        assert!(matches!(err, ValuationError::PeriodOutOfRange { period: 2, len: 2 }));
    }

    #[test]
    fn test_present_value_of_cash_flow_whole_periods() {
        let bond = Bond::new(terms(dec!(0.05), dec!(950), 730, 1)).unwrap();
        assert_eq!(bond.present_value_of_cash_flow(0, dec!(0.05)).unwrap(), dec!(-950));
        let pv = bond.present_value_of_cash_flow(2, dec!(0.05)).unwrap();
        assert!((pv - dec!(952.3809523809)).abs() < dec!(0.0000001), "got {pv}");
    }

    #[test]
    fn test_discounted_cashflows_on_coupon_date_use_full_period() {
        let bond = Bond::new(terms(dec!(0.05), dec!(950), 730, 1)).unwrap();
        let dcf = bond.discounted_cashflows(dec!(0.10)).unwrap();
        assert_eq!(dcf.len(), bond.cashflows().len() - 1);
        assert!((dcf[0] - dec!(45.4545454545)).abs() < dec!(0.0000001));
        assert!((dcf[1] - dec!(867.7685950413)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_discounted_cashflows_with_stub_period() {
        // Three full years plus a 182 day stub
        let bond = Bond::new(terms(dec!(0.05), dec!(950), 1277, 1)).unwrap();
        assert_eq!(bond.days_to_next_coupon(), 182);
        let dcf = bond.discounted_cashflows(dec!(0.08)).unwrap();
        let stub = dec!(182) / dec!(365);
        let first = dec!(50) / dec!(1.08).powd(stub);
        assert!((dcf[0] - first).abs() < dec!(0.0000001));
        // Each later coupon is one more full period away
        assert!((dcf[0] / dcf[1] - dec!(1.08)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_discounted_cashflows_zero_rate_returns_raw_flows() {
        let bond = Bond::new(terms(dec!(0.05), dec!(950), 730, 1)).unwrap();
        let dcf = bond.discounted_cashflows(Decimal::ZERO).unwrap();
        assert_eq!(dcf, vec![dec!(50), dec!(1050)]);
    }

    #[test]
    fn test_discounted_cashflows_reject_total_loss_rate() {
        let bond = Bond::new(terms(dec!(0.05), dec!(950), 730, 2)).unwrap();
        assert!(bond.discounted_cashflows(dec!(-2)).is_err());
    }

    #[test]
    fn test_huge_rate_discounts_far_flows_to_zero() {
        let bond = Bond::new(terms(dec!(0.05), dec!(950), 365 * 30, 12)).unwrap();
        let dcf = bond.discounted_cashflows(dec!(1000000)).unwrap();
        assert_eq!(dcf.len(), 360);
        assert_eq!(*dcf.last().unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_present_value_deducts_transaction_costs() {
        let mut t = terms(dec!(0.05), dec!(950), 365, 1);
        t.transaction_costs = dec!(5);
        let bond = Bond::new(t).unwrap();
        let pv = bond.present_value(dec!(0.05)).unwrap();
        assert_eq!(pv, dec!(995));
    }

    #[test]
    fn test_net_present_value_subtracts_price() {
        let bond = Bond::new(terms(dec!(0.05), dec!(950), 365, 1)).unwrap();
        let npv = bond.net_present_value(dec!(0.05)).unwrap();
        assert_eq!(npv, dec!(50));
    }

    #[test]
    fn test_current_rate() {
        let bond = Bond::new(terms(dec!(0.05), dec!(1250), 365, 1)).unwrap();
        assert_eq!(bond.current_rate(), dec!(0.04));
    }

    #[test]
    fn test_invalid_terms_rejected() {
        assert!(Bond::new(terms(dec!(0.05), dec!(950), 0, 1)).is_err());
        assert!(Bond::new(terms(dec!(0.05), dec!(950), 365, 0)).is_err());
        assert!(Bond::new(terms(dec!(-0.01), dec!(950), 365, 1)).is_err());
        assert!(Bond::new(terms(dec!(0.05), Decimal::ZERO, 365, 1)).is_err());

        let mut t = terms(dec!(0.05), dec!(950), 365, 1);
        t.face_value = dec!(-1000);
        assert!(Bond::new(t).is_err());
    }

    #[test]
    fn test_days_between_dates() {
        let settlement = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let maturity = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        assert_eq!(days_between(settlement, maturity).unwrap(), 731);
        assert!(days_between(maturity, settlement).is_err());
        assert!(days_between(settlement, settlement).is_err());
    }

    #[test]
    fn test_terms_deserialize_with_defaults() {
        let json = r#"{"coupon_rate":"0.05","face_value":"1000","current_price":"950","days_to_maturity":365}"#;
        let parsed: BondTerms = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.frequency, 1);
        assert_eq!(parsed.transaction_costs, Decimal::ZERO);
        assert_eq!(parsed.rating, "");
    }

    #[cfg(feature = "scenarios")]
    #[test]
    fn test_sensitivity_samples_half_open_range() {
        let bond = Bond::new(terms(dec!(0.05), dec!(950), 730, 1)).unwrap();
        let curve = bond.sensitivity_curve(dec!(0.1), None).unwrap();
        assert_eq!(curve.discount_rates.len(), 99);
        assert_eq!(curve.discount_rates[0], dec!(0.001));
        assert_eq!(*curve.discount_rates.last().unwrap(), dec!(0.099));
        assert_eq!(curve.present_values.len(), 99);

        // At the coupon rate the closed form prices at par
        let at_coupon = curve.present_values[49];
        assert_eq!(curve.discount_rates[49], dec!(0.05));
        assert!((at_coupon - dec!(1000)).abs() < dec!(0.0000001));

        // Values fall as the discount rate rises
        assert!(curve.present_values.windows(2).all(|w| w[0] > w[1]));
    }

    #[cfg(feature = "scenarios")]
    #[test]
    fn test_sensitivity_custom_start() {
        let bond = Bond::new(terms(dec!(0.05), dec!(950), 730, 1)).unwrap();
        let values = bond.sensitivity(dec!(0.05), Some(dec!(0.04))).unwrap();
        assert_eq!(values.len(), 10);
    }
}
