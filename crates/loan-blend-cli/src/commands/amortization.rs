use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_blend_core::amortization::{self, PaymentInput};
use loan_blend_core::schedule::{self, ScheduleInput};
use loan_blend_core::LoanOffer;

use super::load_input;

/// Arguments for a single-loan payment calculation
#[derive(Args)]
pub struct PaymentArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Principal borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate as a decimal (0.044 = 4.4%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Tenor in years
    #[arg(long)]
    pub years: Option<Decimal>,
}

/// Arguments for an amortisation schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Principal borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate as a decimal
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Tenor in years
    #[arg(long)]
    pub years: Option<Decimal>,
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let payment_input: PaymentInput = match load_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => PaymentInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            loan: LoanOffer {
                rate: args.rate,
                duration_years: args.years,
            },
        },
    };

    let result = amortization::calculate_payment(&payment_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: ScheduleInput = match load_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => ScheduleInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            loan: LoanOffer {
                rate: args.rate,
                duration_years: args.years,
            },
        },
    };

    let result = schedule::build_schedule(&schedule_input)?;
    let mut value = serde_json::to_value(result)?;
    // Rows become the top-level array so table/CSV output renders one line per month
    if let Some(rows) = value
        .get_mut("result")
        .and_then(|r| r.as_object_mut())
        .and_then(|r| r.remove("rows"))
    {
        value["results"] = rows;
    }
    Ok(value)
}
