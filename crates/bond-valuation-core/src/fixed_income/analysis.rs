use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::ValuationError;
use crate::fixed_income::bond::{days_between, Bond, BondTerms, CashflowKind};
use crate::fixed_income::duration::DEFAULT_RATE_CHANGE;
use crate::fixed_income::yields::solve_irr;
use crate::types::{with_metadata, ComputationOutput, Money, Rate, Years};
use crate::ValuationResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input for a full single-bond analysis at one discount rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondAnalysisInput {
    pub terms: BondTerms,
    /// Discount rate for present value, NPV, duration and convexity
    pub discount_rate: Rate,
    /// Rate shift for effective duration and convexity (default 0.01)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_change: Option<Rate>,
    /// Valuation date; with `maturity_date` replaces `terms.days_to_maturity`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settlement_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maturity_date: Option<NaiveDate>,
}

/// One row of the cash-flow schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledCashflow {
    pub period: usize,
    pub amount: Money,
    pub kind: CashflowKind,
}

/// Derived schedule of a bond.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashflowSchedule {
    pub coupon: Money,
    pub days_to_next_coupon: u32,
    pub accrued_interest: Money,
    pub clean_price: Money,
    pub cashflows: Vec<ScheduledCashflow>,
}

/// Valuation and risk measures of a bond at one discount rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondAnalysisOutput {
    /// Annual coupon amount
    pub coupon: Money,
    /// Annual coupon / full price
    pub current_yield: Rate,
    pub days_to_next_coupon: u32,
    pub accrued_interest: Money,
    /// Quoted price plus accrued interest
    pub clean_price: Money,
    pub cashflows: Vec<Money>,
    pub discounted_cashflows: Vec<Money>,
    pub present_value: Money,
    pub net_present_value: Money,
    /// Yield to maturity found by bisection
    pub irr: Rate,
    pub irr_iterations: u32,
    pub irr_converged: bool,
    pub macaulay_duration: Years,
    pub modified_duration: Years,
    pub effective_duration: Decimal,
    pub convexity: Decimal,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the bond and report its valuation, yield and risk measures.
pub fn analyze_bond(
    input: &BondAnalysisInput,
) -> ValuationResult<ComputationOutput<BondAnalysisOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let terms = resolve_terms(input)?;
    let bond = Bond::new(terms)?;
    let rate = input.discount_rate;
    let rate_change = input.rate_change.unwrap_or(DEFAULT_RATE_CHANGE);

    let irr = solve_irr(&bond)?;
    if !irr.converged {
        warnings.push(format!(
            "IRR bisection did not converge after {} iterations (residual NPV {}); reporting best estimate",
            irr.iterations,
            irr.residual.round_dp(6)
        ));
    }
    if bond.clean_price() > bond.cashflows()[1..].iter().sum::<Money>() {
        warnings.push("Full price exceeds the undiscounted sum of future cash flows".into());
    }
    if bond.days_to_next_coupon() != 0 {
        warnings.push(format!(
            "Valuation falls {} days before the next coupon; accrued interest of {} added to the quoted price",
            bond.days_to_next_coupon(),
            bond.accrued_interest().round_dp(2)
        ));
    }
    if !bond.rating().is_empty() {
        warnings.push(format!(
            "Rating '{}' is carried for reference and does not affect valuation",
            bond.rating()
        ));
    }

    let output = BondAnalysisOutput {
        coupon: bond.coupon(),
        current_yield: bond.current_rate(),
        days_to_next_coupon: bond.days_to_next_coupon(),
        accrued_interest: bond.accrued_interest(),
        clean_price: bond.clean_price(),
        cashflows: bond.cashflows().to_vec(),
        discounted_cashflows: bond.discounted_cashflows(rate)?,
        present_value: bond.present_value(rate)?,
        net_present_value: bond.net_present_value(rate)?,
        irr: irr.rate,
        irr_iterations: irr.iterations,
        irr_converged: irr.converged,
        macaulay_duration: bond.macaulay_duration(rate)?,
        modified_duration: bond.modified_duration(rate)?,
        effective_duration: bond.effective_duration(rate, Some(rate_change))?,
        convexity: bond.convexity(rate, rate_change)?,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Bond valuation: annual cash-flow schedule discounted with a stub period to the next coupon; IRR by bisection",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Derive the cash-flow schedule of a bond without valuing it.
pub fn cashflow_schedule(
    terms: &BondTerms,
) -> ValuationResult<ComputationOutput<CashflowSchedule>> {
    let start = Instant::now();

    let bond = Bond::new(terms.clone())?;
    let cashflows = bond
        .cashflows()
        .iter()
        .enumerate()
        .map(|(period, &amount)| {
            Ok(ScheduledCashflow {
                period,
                amount,
                kind: bond.cashflow_kind(period)?,
            })
        })
        .collect::<ValuationResult<Vec<_>>>()?;

    let output = CashflowSchedule {
        coupon: bond.coupon(),
        days_to_next_coupon: bond.days_to_next_coupon(),
        accrued_interest: bond.accrued_interest(),
        clean_price: bond.clean_price(),
        cashflows,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Bond cash-flow schedule: purchase outflow, level coupons, redemption with the final coupon",
        terms,
        Vec::new(),
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn resolve_terms(input: &BondAnalysisInput) -> ValuationResult<BondTerms> {
    let mut terms = input.terms.clone();
    match (input.settlement_date, input.maturity_date) {
        (Some(settlement), Some(maturity)) => {
            terms.days_to_maturity = days_between(settlement, maturity)?;
        }
        (None, None) => {}
        _ => {
            return Err(ValuationError::InvalidInput {
                field: "settlement_date/maturity_date".into(),
                reason: "Both settlement_date and maturity_date must be provided together, or neither"
                    .into(),
            });
        }
    }
    Ok(terms)
}
