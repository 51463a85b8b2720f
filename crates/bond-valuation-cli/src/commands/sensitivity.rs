use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use bond_valuation_core::scenarios::sensitivity::{self, RateSensitivityInput, SurfaceInput};

use crate::commands::bond::TermsArgs;
use crate::input;

/// Arguments for a single bond's discount-rate sweep
#[derive(Args)]
pub struct SensitivityArgs {
    /// Path to JSON/YAML sweep input (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub terms: TermsArgs,

    /// Exclusive upper discount rate
    #[arg(long)]
    pub to: Option<Decimal>,

    /// First sampled discount rate (default 0.001)
    #[arg(long)]
    pub from: Option<Decimal>,
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sweep_input: RateSensitivityInput = match input::load(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => RateSensitivityInput {
            terms: args.terms.to_terms()?,
            to_discount_rate: args.to.ok_or("--to is required (or provide --input)")?,
            from_discount_rate: args.from,
        },
    };
    let result = sensitivity::rate_sensitivity(&sweep_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the discount rate x maturity surface
#[derive(Args)]
pub struct SurfaceArgs {
    /// Path to JSON/YAML surface input (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Exclusive upper time to maturity in years
    #[arg(long)]
    pub to_period: Option<Decimal>,

    /// Exclusive upper discount rate
    #[arg(long)]
    pub to_discount_rate: Option<Decimal>,

    /// Annual coupon rate as a decimal
    #[arg(long)]
    pub coupon_rate: Option<Decimal>,

    /// Face value
    #[arg(long, default_value = "1000")]
    pub face_value: Decimal,

    /// First sampled time to maturity
    #[arg(long, default_value = "0.1")]
    pub from_period: Decimal,

    /// First sampled discount rate
    #[arg(long, default_value = "0.001")]
    pub from_discount_rate: Decimal,

    /// Coupon payments per year
    #[arg(long, default_value_t = 1)]
    pub frequency: u32,
}

pub fn run_surface(args: SurfaceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let surface_input: SurfaceInput = match input::load(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => SurfaceInput {
            to_period: args
                .to_period
                .ok_or("--to-period is required (or provide --input)")?,
            to_discount_rate: args
                .to_discount_rate
                .ok_or("--to-discount-rate is required (or provide --input)")?,
            coupon_rate: args
                .coupon_rate
                .ok_or("--coupon-rate is required (or provide --input)")?,
            face_value: args.face_value,
            from_period: args.from_period,
            from_discount_rate: args.from_discount_rate,
            period_step: sensitivity::DEFAULT_PERIOD_STEP,
            rate_step: sensitivity::DEFAULT_RATE_STEP,
            frequency: args.frequency,
        },
    };
    let result = sensitivity::general_sensitivity(&surface_input)?;
    Ok(serde_json::to_value(result)?)
}
