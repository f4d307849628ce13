mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::assumptions::AssumptionsArgs;
use commands::deal::{DealArgs, OnePercentArgs};
use commands::market::AnalyzeArgs;
use commands::rent::{RentHistoryArgs, RentModelArgs};

/// Rental property return metrics by ZIP code
#[derive(Parser)]
#[command(
    name = "rroi",
    version,
    about = "Rental property return metrics by ZIP code",
    long_about = "Joins Zillow-style home value and rent tables by ZIP, computes leveraged \
                  rental returns (cash-on-cash, first-year ROI, total return on cash) with \
                  decimal precision, and fits a national log-log rent model."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log diagnostics to stderr (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Return metrics for every region of the market, with rankings and filters
    Analyze(AnalyzeArgs),
    /// Analyze a single property, predicting rent when none is given
    Deal(DealArgs),
    /// Fit the national log-log rent model
    RentModel(RentModelArgs),
    /// Rent series and trailing 12-month average for one ZIP
    RentHistory(RentHistoryArgs),
    /// Rule-of-thumb rent for a purchase price
    OnePercent(OnePercentArgs),
    /// Show the effective assumptions and any out-of-range values
    Assumptions(AssumptionsArgs),
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

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Analyze(args) => commands::market::run_analyze(args),
        Commands::Deal(args) => commands::deal::run_deal(args),
        Commands::RentModel(args) => commands::rent::run_rent_model(args),
        Commands::RentHistory(args) => commands::rent::run_rent_history(args),
        Commands::OnePercent(args) => commands::deal::run_one_percent(args),
        Commands::Assumptions(args) => commands::assumptions::run_assumptions(args),
        Commands::Version => {
            println!("rroi {}", env!("CARGO_PKG_VERSION"));
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
