use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::time::Instant;

use bond_valuation_core::time_value;
use bond_valuation_core::with_metadata;

/// Arguments for time-value-of-money helpers
#[derive(Args)]
pub struct TvmArgs {
    #[command(subcommand)]
    pub calc: TvmCalc,
}

#[derive(Subcommand)]
pub enum TvmCalc {
    /// Growth factor (1 + rate)^years
    Growth {
        #[arg(long, allow_hyphen_values = true)]
        rate: Decimal,
        #[arg(long)]
        years: Decimal,
    },
    /// Rate implied by a growth factor over a number of years
    Rate {
        #[arg(long)]
        growth: Decimal,
        #[arg(long)]
        years: Decimal,
    },
    /// Years needed to reach a growth factor at a rate
    Time {
        #[arg(long)]
        growth: Decimal,
        #[arg(long, allow_hyphen_values = true)]
        rate: Decimal,
    },
    /// Closed-form present value of a level-coupon bond
    Pv {
        #[arg(long)]
        coupon_rate: Decimal,
        #[arg(long, default_value = "1000")]
        face_value: Decimal,
        #[arg(long)]
        years: Decimal,
        #[arg(long)]
        discount_rate: Decimal,
        #[arg(long, default_value_t = 1)]
        frequency: u32,
    },
}

pub fn run_tvm(args: TvmArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();

    let (methodology, assumptions, result) = match args.calc {
        TvmCalc::Growth { rate, years } => (
            "Compound growth: (1 + r)^t",
            json!({ "rate": rate, "years": years }),
            json!({ "growth_factor": time_value::compound_growth(rate, years)? }),
        ),
        TvmCalc::Rate { growth, years } => (
            "Implied rate: g^(1/t) - 1",
            json!({ "growth_factor": growth, "years": years }),
            json!({ "rate": time_value::implied_rate(growth, years)? }),
        ),
        TvmCalc::Time { growth, rate } => (
            "Implied time: ln(g) / ln(1 + r)",
            json!({ "growth_factor": growth, "rate": rate }),
            json!({ "years": time_value::implied_time(growth, rate)? }),
        ),
        TvmCalc::Pv {
            coupon_rate,
            face_value,
            years,
            discount_rate,
            frequency,
        } => (
            "Closed-form level-coupon present value",
            json!({
                "coupon_rate": coupon_rate,
                "face_value": face_value,
                "years": years,
                "discount_rate": discount_rate,
                "frequency": frequency,
            }),
            json!({
                "present_value": time_value::present_value_basic(
                    coupon_rate,
                    face_value,
                    years,
                    discount_rate,
                    frequency,
                )?
            }),
        ),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(serde_json::to_value(with_metadata(
        methodology,
        &assumptions,
        Vec::new(),
        elapsed,
        result,
    ))?)
}
