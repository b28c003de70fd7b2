mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::amortization::{PaymentArgs, ScheduleArgs};
use commands::blending::{BestArgs, BlendArgs, RatioArgs};

/// Amortised loan payments and short/long loan blend optimisation
#[derive(Parser)]
#[command(
    name = "loanblend",
    version,
    about = "Amortised loan payments and short/long loan blend optimisation",
    long_about = "Computes level monthly payments and lifetime interest, and searches \
                  for the split between a short-term offer and a long-term reference \
                  loan that minimises total interest. All maths in decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Emit debug logs to stderr (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly payment and lifetime interest of one loan
    Payment(PaymentArgs),
    /// Month-by-month amortisation schedule
    Schedule(ScheduleArgs),
    /// Smoothed payment of a short + long tranche structure
    Blend(BlendArgs),
    /// Optimal short-tranche ratio for one short/long pair
    Ratio(RatioArgs),
    /// Best candidate offer and ratio against a reference loan
    Best(BestArgs),
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
    logging::init_logger(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Payment(args) => commands::amortization::run_payment(args),
        Commands::Schedule(args) => commands::amortization::run_schedule(args),
        Commands::Blend(args) => commands::blending::run_blend(args),
        Commands::Ratio(args) => commands::blending::run_ratio(args),
        Commands::Best(args) => commands::blending::run_best(args),
        Commands::Version => {
            println!("loanblend {}", env!("CARGO_PKG_VERSION"));
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
