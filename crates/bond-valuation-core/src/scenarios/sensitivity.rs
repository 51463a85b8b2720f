//! Sampled present values for plotting.
//!
//! Scalar valuation functions stay scalar; this module walks explicit
//! half-open axes and evaluates them element-wise. A [`RateSweep`] is a 2-D
//! curve (discount rate, present value); a [`SensitivitySurface`] is a
//! (discount rate, time to maturity, present value) grid.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::ValuationError;
use crate::fixed_income::bond::{Bond, BondTerms};
use crate::time_value::present_value_basic;
use crate::types::*;
use crate::ValuationResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const DEFAULT_RATE_STEP: Rate = dec!(0.001);
pub const DEFAULT_PERIOD_STEP: Years = dec!(0.1);
const MAX_SAMPLES: usize = 100_000;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Present value against discount rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSweep {
    pub discount_rates: Vec<Rate>,
    pub present_values: Vec<Money>,
}

/// Input for a single bond's rate sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSensitivityInput {
    pub terms: BondTerms,
    /// Exclusive upper end of the sampled rates
    pub to_discount_rate: Rate,
    /// First sampled rate (default 0.001)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_discount_rate: Option<Rate>,
}

/// Input for the discount rate x time-to-maturity surface of a generic
/// level-coupon bond.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceInput {
    /// Exclusive upper end of the maturity axis (years)
    pub to_period: Years,
    /// Exclusive upper end of the discount rate axis
    pub to_discount_rate: Rate,
    pub coupon_rate: Rate,
    #[serde(default = "default_face_value")]
    pub face_value: Money,
    #[serde(default = "default_from_period")]
    pub from_period: Years,
    #[serde(default = "default_from_discount_rate")]
    pub from_discount_rate: Rate,
    #[serde(default = "default_period_step")]
    pub period_step: Years,
    #[serde(default = "default_rate_step")]
    pub rate_step: Rate,
    #[serde(default = "default_frequency")]
    pub frequency: u32,
}

fn default_face_value() -> Money {
    dec!(1000)
}

fn default_from_period() -> Years {
    dec!(0.1)
}

fn default_from_discount_rate() -> Rate {
    dec!(0.001)
}

fn default_period_step() -> Years {
    DEFAULT_PERIOD_STEP
}

fn default_rate_step() -> Rate {
    DEFAULT_RATE_STEP
}

fn default_frequency() -> u32 {
    1
}

/// Present values over a mesh of discount rates and maturities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivitySurface {
    pub discount_rates: Vec<Rate>,
    pub maturities: Vec<Years>,
    /// `present_values[j][i]` is the value at `maturities[j]`, `discount_rates[i]`
    pub present_values: Vec<Vec<Money>>,
}

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

/// Generate the half-open sweep `[min, max)` for a sensitivity variable.
pub fn generate_sweep_values(var: &SensitivityVariable) -> ValuationResult<Vec<Decimal>> {
    if var.step <= Decimal::ZERO {
        return Err(ValuationError::InvalidInput {
            field: format!("variable:{}", var.name),
            reason: "Step must be positive".into(),
        });
    }
    if var.min > var.max {
        return Err(ValuationError::InvalidInput {
            field: format!("variable:{}", var.name),
            reason: "Min must be <= max".into(),
        });
    }

    let mut values = Vec::new();
    let mut current = var.min;
    while current < var.max {
        if values.len() == MAX_SAMPLES {
            return Err(ValuationError::InvalidInput {
                field: format!("variable:{}", var.name),
                reason: format!("Sweep exceeds {MAX_SAMPLES} samples"),
            });
        }
        values.push(current);
        current += var.step;
    }

    Ok(values)
}

/// Discount rates `from, from + step, ...` below `to`.
pub fn rate_samples(from: Rate, to: Rate, step: Rate) -> ValuationResult<Vec<Rate>> {
    generate_sweep_values(&SensitivityVariable {
        name: "discount_rate".into(),
        min: from,
        max: to,
        step,
    })
}

/// Evaluate `f` at every sample, stopping at the first error.
pub fn sweep<F>(samples: &[Decimal], f: F) -> ValuationResult<Vec<Decimal>>
where
    F: Fn(Decimal) -> ValuationResult<Decimal>,
{
    samples.iter().map(|&x| f(x)).collect()
}

/// Evaluate `f(row, col)` over a mesh: one inner vector per row sample.
pub fn sweep_grid<F>(rows: &[Decimal], cols: &[Decimal], f: F) -> ValuationResult<Vec<Vec<Decimal>>>
where
    F: Fn(Decimal, Decimal) -> ValuationResult<Decimal>,
{
    rows.iter()
        .map(|&row| sweep(cols, |col| f(row, col)))
        .collect()
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Closed-form present value of one bond across a range of discount rates.
pub fn rate_sensitivity(
    input: &RateSensitivityInput,
) -> ValuationResult<ComputationOutput<RateSweep>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let bond = Bond::new(input.terms.clone())?;
    let curve = bond.sensitivity_curve(input.to_discount_rate, input.from_discount_rate)?;
    if curve.discount_rates.is_empty() {
        warnings.push("Sampled rate range is empty".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Bond sensitivity: closed-form level-coupon present value per sampled discount rate",
        input,
        warnings,
        elapsed,
        curve,
    ))
}

/// Present value of a generic level-coupon bond over a discount rate x
/// time-to-maturity mesh.
pub fn general_sensitivity(
    input: &SurfaceInput,
) -> ValuationResult<ComputationOutput<SensitivitySurface>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let discount_rates = generate_sweep_values(&SensitivityVariable {
        name: "discount_rate".into(),
        min: input.from_discount_rate,
        max: input.to_discount_rate,
        step: input.rate_step,
    })?;
    let maturities = generate_sweep_values(&SensitivityVariable {
        name: "time_to_maturity".into(),
        min: input.from_period,
        max: input.to_period,
        step: input.period_step,
    })?;
    if discount_rates.len() * maturities.len() > MAX_SAMPLES {
        return Err(ValuationError::InvalidInput {
            field: "surface".into(),
            reason: format!("Grid exceeds {MAX_SAMPLES} points"),
        });
    }
    if discount_rates.is_empty() || maturities.is_empty() {
        warnings.push("Surface has an empty axis".into());
    }

    let present_values = sweep_grid(&maturities, &discount_rates, |maturity, rate| {
        present_value_basic(
            input.coupon_rate,
            input.face_value,
            maturity,
            rate,
            input.frequency,
        )
    })?;

    let output = SensitivitySurface {
        discount_rates,
        maturities,
        present_values,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Bond sensitivity surface: closed-form present value over discount rate and time to maturity",
        input,
        warnings,
        elapsed,
        output,
    ))
}
