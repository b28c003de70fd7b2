use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use loan_blend_core::blending::model::{self, BlendInput};
use loan_blend_core::blending::ratio_search::{self, RatioSearchInput, SearchConfig};
use loan_blend_core::blending::selector::{self, BestCombinationInput};
use loan_blend_core::LoanOffer;

use super::load_input;

/// Scan-size flags shared by the search commands
#[derive(Args)]
pub struct SearchArgs {
    /// Notional principal split between the tranches
    #[arg(long, default_value = "100")]
    pub total_amount: Decimal,

    /// Ratio scan step
    #[arg(long, default_value = "0.0001")]
    pub precision: Decimal,
}

impl SearchArgs {
    fn config(&self) -> SearchConfig {
        SearchConfig {
            total_amount: self.total_amount,
            precision: self.precision,
        }
    }
}

/// Arguments for a blended two-tranche payment
#[derive(Args)]
pub struct BlendArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount in the short tranche
    #[arg(long)]
    pub amount_short: Option<Decimal>,

    /// Annual rate of the short tranche
    #[arg(long)]
    pub short_rate: Option<Decimal>,

    /// Tenor of the short tranche in months
    #[arg(long)]
    pub short_months: Option<u32>,

    /// Amount in the long tranche
    #[arg(long)]
    pub amount_long: Option<Decimal>,

    /// Annual rate of the long tranche
    #[arg(long)]
    pub long_rate: Option<Decimal>,

    /// Tenor of the long tranche in months
    #[arg(long)]
    pub long_months: Option<u32>,
}

/// Arguments for the optimal ratio search on one loan pair
#[derive(Args)]
pub struct RatioArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Annual rate of the short loan
    #[arg(long)]
    pub short_rate: Option<Decimal>,

    /// Tenor of the short loan in months
    #[arg(long)]
    pub short_months: Option<u32>,

    /// Annual rate of the long loan
    #[arg(long)]
    pub long_rate: Option<Decimal>,

    /// Tenor of the long loan in months
    #[arg(long)]
    pub long_months: Option<u32>,

    #[command(flatten)]
    pub search: SearchArgs,
}

/// Arguments for the best-combination search
#[derive(Args)]
pub struct BestArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Annual rate of the reference (long) loan
    #[arg(long)]
    pub reference_rate: Option<Decimal>,

    /// Tenor of the reference loan in years
    #[arg(long)]
    pub reference_years: Option<Decimal>,

    /// Comma-separated candidate offers as rate:years (e.g. "0.029:10,0.032:12")
    #[arg(long, value_delimiter = ',', value_parser = parse_offer)]
    pub candidates: Vec<LoanOffer>,

    #[command(flatten)]
    pub search: SearchArgs,
}

/// Parse `rate:years`. An empty side is kept as missing so the selector
/// can skip the offer with a warning.
fn parse_offer(s: &str) -> Result<LoanOffer, String> {
    let (rate, years) = s
        .split_once(':')
        .ok_or_else(|| format!("expected rate:years, got '{s}'"))?;
    let field = |v: &str| -> Result<Option<Decimal>, String> {
        let v = v.trim();
        if v.is_empty() {
            Ok(None)
        } else {
            Decimal::from_str(v)
                .map(Some)
                .map_err(|e| format!("invalid number '{v}': {e}"))
        }
    };
    Ok(LoanOffer {
        rate: field(rate)?,
        duration_years: field(years)?,
    })
}

pub fn run_blend(args: BlendArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let blend_input: BlendInput = match load_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => BlendInput {
            amount_short: args
                .amount_short
                .ok_or("--amount-short is required (or provide --input)")?,
            short_rate: args.short_rate,
            short_duration_months: args.short_months,
            amount_long: args
                .amount_long
                .ok_or("--amount-long is required (or provide --input)")?,
            long_rate: args.long_rate,
            long_duration_months: args.long_months,
        },
    };

    let result = model::calculate_blend(&blend_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_ratio(args: RatioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let ratio_input: RatioSearchInput = match load_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => RatioSearchInput {
            short_rate: args.short_rate,
            short_duration_months: args.short_months,
            long_rate: args.long_rate,
            long_duration_months: args.long_months,
            config: args.search.config(),
        },
    };

    let result = ratio_search::search_ratio(&ratio_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_best(args: BestArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let best_input: BestCombinationInput = match load_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => BestCombinationInput {
            reference: LoanOffer {
                rate: args.reference_rate,
                duration_years: args.reference_years,
            },
            candidates: args.candidates,
            config: args.search.config(),
        },
    };

    let result = selector::select_best_combination(&best_input)?;
    Ok(serde_json::to_value(result)?)
}
