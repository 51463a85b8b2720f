mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::bond::{AnalyzeArgs, CashflowsArgs};
use commands::sensitivity::{SensitivityArgs, SurfaceArgs};
use commands::time_value::TvmArgs;

/// Single-instrument bond valuation
#[derive(Parser)]
#[command(
    name = "bondval",
    version,
    about = "Single-instrument bond valuation",
    long_about = "A CLI for valuing a single bond with decimal precision. Builds the \
                  cash-flow schedule, present value, NPV, IRR, duration and convexity, \
                  and samples present values across discount rates and maturities."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Value a bond: PV, NPV, IRR, durations and convexity
    Analyze(AnalyzeArgs),
    /// Show the derived cash-flow schedule
    Cashflows(CashflowsArgs),
    /// Present value across a range of discount rates
    Sensitivity(SensitivityArgs),
    /// Present value over a discount rate x maturity grid
    Surface(SurfaceArgs),
    /// Time-value-of-money helpers
    Tvm(TvmArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Analyze(args) => commands::bond::run_analyze(args),
        Commands::Cashflows(args) => commands::bond::run_cashflows(args),
        Commands::Sensitivity(args) => commands::sensitivity::run_sensitivity(args),
        Commands::Surface(args) => commands::sensitivity::run_surface(args),
        Commands::Tvm(args) => commands::time_value::run_tvm(args),
        Commands::Version => {
            println!("bondval {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_analyze_flags_parse() {
        let cli = Cli::try_parse_from([
            "bondval",
            "analyze",
            "--coupon-rate",
            "0.05",
            "--current-price",
            "950",
            "--days-to-maturity",
            "365",
            "--discount-rate",
            "0.05",
            "--output",
            "minimal",
        ])
        .unwrap();
        assert!(matches!(cli.output, OutputFormat::Minimal));
        let Commands::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        let terms = args.terms.to_terms().unwrap();
        assert_eq!(terms.days_to_maturity, 365);
        assert_eq!(terms.frequency, 1);
        assert_eq!(args.discount_rate, Some(rust_decimal_macros::dec!(0.05)));
    }

    #[test]
    fn test_tvm_growth() {
        let cli = Cli::try_parse_from(["bondval", "tvm", "growth", "--rate", "0.05", "--years", "2"]).unwrap();
        let Commands::Tvm(args) = cli.command else {
            panic!("expected tvm");
        };
        let value = commands::time_value::run_tvm(args).unwrap();
        assert_eq!(value["result"]["growth_factor"], "1.1025");
    }
}
