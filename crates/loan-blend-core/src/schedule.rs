use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::monthly_payment;
use crate::error::LoanBlendError;
use crate::types::{with_metadata, ComputationOutput, LoanOffer, Money};
use crate::LoanBlendResult;

/// Longest schedule that will be laid out row by row (100 years).
pub const MAX_SCHEDULE_MONTHS: u32 = 1200;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub principal: Money,
    pub loan: LoanOffer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub month: u32,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    pub balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_paid: Money,
    pub rows: Vec<ScheduleRow>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Month-by-month level-payment schedule. The final row pays off whatever
/// balance is left so the loan closes at exactly zero.
pub fn build_schedule(input: &ScheduleInput) -> LoanBlendResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();

    if input.principal <= Decimal::ZERO {
        return Err(LoanBlendError::invalid(
            "principal",
            "Principal must be positive",
        ));
    }
    let term = input.loan.to_term("loan")?;
    let months = term.duration_months();
    if months > MAX_SCHEDULE_MONTHS {
        return Err(LoanBlendError::invalid(
            "loan.duration_years",
            format!("Schedule of {months} months exceeds the {MAX_SCHEDULE_MONTHS}-month limit"),
        ));
    }
    let periodic = term.annual_rate() / dec!(12);
    let payment = monthly_payment(input.principal, term.annual_rate(), months)?;

    let mut rows = Vec::with_capacity(months as usize);
    let mut balance = input.principal;
    let mut total_interest = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;

    for month in 1..=months {
        let overflow = |what: &str| LoanBlendError::overflow(format!("{what} in month {month}"));
        let interest = balance
            .checked_mul(periodic)
            .ok_or_else(|| overflow("interest"))?;
        let (principal, paid) = if month == months {
            let paid = balance
                .checked_add(interest)
                .ok_or_else(|| overflow("final payment"))?;
            (balance, paid)
        } else {
            (payment - interest, payment)
        };
        balance -= principal;
        total_interest = total_interest
            .checked_add(interest)
            .ok_or_else(|| overflow("total interest"))?;
        total_paid = total_paid
            .checked_add(paid)
            .ok_or_else(|| overflow("total paid"))?;
        rows.push(ScheduleRow {
            month,
            payment: paid,
            interest,
            principal,
            balance,
        });
    }

    let output = ScheduleOutput {
        monthly_payment: payment,
        total_interest,
        total_paid,
        rows,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-payment amortisation schedule",
        &serde_json::json!({
            "periodic_rate": periodic.to_string(),
            "months": months,
        }),
        Vec::new(),
        elapsed,
        output,
    ))
}
