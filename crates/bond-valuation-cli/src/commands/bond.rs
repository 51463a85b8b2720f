use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use bond_valuation_core::fixed_income::analysis::{self, BondAnalysisInput};
use bond_valuation_core::fixed_income::BondTerms;

use crate::input;

/// Bond terms given as flags, used when no input file or stdin is supplied.
#[derive(Args)]
pub struct TermsArgs {
    /// Annual coupon rate as a decimal (e.g. 0.05)
    #[arg(long)]
    pub coupon_rate: Option<Decimal>,

    /// Face (redemption) value
    #[arg(long, default_value = "1000")]
    pub face_value: Decimal,

    /// Quoted market price
    #[arg(long)]
    pub current_price: Option<Decimal>,

    /// Days until maturity
    #[arg(long)]
    pub days_to_maturity: Option<u32>,

    /// Credit rating label (reference only)
    #[arg(long)]
    pub rating: Option<String>,

    /// Coupon payments per year
    #[arg(long, default_value_t = 1)]
    pub frequency: u32,

    /// Flat transaction costs deducted from present value
    #[arg(long, default_value = "0")]
    pub transaction_costs: Decimal,
}

impl TermsArgs {
    pub fn to_terms(&self) -> Result<BondTerms, Box<dyn std::error::Error>> {
        Ok(BondTerms {
            coupon_rate: self
                .coupon_rate
                .ok_or("--coupon-rate is required (or provide --input)")?,
            face_value: self.face_value,
            current_price: self
                .current_price
                .ok_or("--current-price is required (or provide --input)")?,
            days_to_maturity: self
                .days_to_maturity
                .ok_or("--days-to-maturity is required (or provide --input)")?,
            rating: self.rating.clone().unwrap_or_default(),
            frequency: self.frequency,
            transaction_costs: self.transaction_costs,
        })
    }
}

/// Arguments for full bond analysis
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to JSON/YAML analysis input (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub terms: TermsArgs,

    /// Discount rate for valuation and risk measures
    #[arg(long)]
    pub discount_rate: Option<Decimal>,

    /// Rate shift for effective duration and convexity
    #[arg(long)]
    pub rate_change: Option<Decimal>,
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let analysis_input: BondAnalysisInput = match input::load(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => BondAnalysisInput {
            terms: args.terms.to_terms()?,
            discount_rate: args
                .discount_rate
                .ok_or("--discount-rate is required (or provide --input)")?,
            rate_change: args.rate_change,
            settlement_date: None,
            maturity_date: None,
        },
    };
    let result = analysis::analyze_bond(&analysis_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the cash-flow schedule
#[derive(Args)]
pub struct CashflowsArgs {
    /// Path to JSON/YAML bond terms (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub terms: TermsArgs,
}

pub fn run_cashflows(args: CashflowsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms: BondTerms = match input::load(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => args.terms.to_terms()?,
    };
    let result = analysis::cashflow_schedule(&terms)?;
    Ok(serde_json::to_value(result)?)
}
