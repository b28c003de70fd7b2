//! Level-payment amortisation: payment factor, monthly payment, total
//! interest, and year/month tenor conversion. All math in `Decimal`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::LoanBlendError;
use crate::types::{with_metadata, ComputationOutput, LoanOffer, Money, Rate, Years};
use crate::LoanBlendResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Annuity factor converting principal into a monthly payment.
///
/// `annual_rate` is divided by 12 to get the periodic rate `r`, then
/// `r / (1 - (1 + r)^-n)`. Zero and negative rates are rejected rather than
/// falling back to `principal / n`.
pub fn payment_factor(annual_rate: Rate, duration_months: u32) -> LoanBlendResult<Decimal> {
    if duration_months == 0 {
        return Err(LoanBlendError::invalid(
            "duration_months",
            "Number of periods must be > 0",
        ));
    }
    if annual_rate <= Decimal::ZERO {
        return Err(LoanBlendError::invalid(
            "annual_rate",
            "Rate must be positive (zero-rate amortisation is not supported)",
        ));
    }

    let periodic = annual_rate / MONTHS_PER_YEAR;
    let growth = (Decimal::ONE + periodic)
        .checked_powu(u64::from(duration_months))
        .ok_or_else(|| LoanBlendError::NumericOverflow {
            context: format!("(1 + {periodic})^{duration_months}"),
        })?;

    let denom = Decimal::ONE - Decimal::ONE / growth;
    if denom.is_zero() {
        return Err(LoanBlendError::DivisionByZero {
            context: "payment factor".into(),
        });
    }

    Ok(periodic / denom)
}

/// Level monthly payment on `principal`.
pub fn monthly_payment(
    principal: Money,
    annual_rate: Rate,
    duration_months: u32,
) -> LoanBlendResult<Money> {
    if principal < Decimal::ZERO {
        return Err(LoanBlendError::invalid(
            "principal",
            "Principal cannot be negative",
        ));
    }
    principal
        .checked_mul(payment_factor(annual_rate, duration_months)?)
        .ok_or_else(|| LoanBlendError::overflow("monthly payment"))
}

/// Interest paid over the life of a loan: everything paid minus principal.
/// A negative value means the payment does not amortise the principal.
pub fn total_interest(
    monthly_payment: Money,
    principal: Money,
    duration_months: u32,
) -> LoanBlendResult<Money> {
    monthly_payment
        .checked_mul(Decimal::from(duration_months))
        .and_then(|paid| paid.checked_sub(principal))
        .ok_or_else(|| LoanBlendError::overflow("total interest"))
}

/// Convert a tenor in years to whole months.
pub fn years_to_months(years: Years) -> LoanBlendResult<u32> {
    let months = years
        .checked_mul(MONTHS_PER_YEAR)
        .ok_or_else(|| LoanBlendError::overflow(format!("{years} years in months")))?;
    if months.fract() != Decimal::ZERO {
        return Err(LoanBlendError::invalid(
            "duration_years",
            format!("{years} years is not a whole number of months"),
        ));
    }
    months.to_u32().ok_or_else(|| {
        LoanBlendError::invalid("duration_years", format!("{years} years is out of range"))
    })
}

pub fn months_to_years(months: u32) -> Years {
    Decimal::from(months) / MONTHS_PER_YEAR
}

// ---------------------------------------------------------------------------
// Single-loan payment summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInput {
    pub principal: Money,
    pub loan: LoanOffer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOutput {
    pub duration_months: u32,
    pub payment_factor: Decimal,
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_paid: Money,
}

/// Monthly payment and lifetime interest for one fixed-rate loan.
pub fn calculate_payment(input: &PaymentInput) -> LoanBlendResult<ComputationOutput<PaymentOutput>> {
    let start = Instant::now();

    if input.principal <= Decimal::ZERO {
        return Err(LoanBlendError::invalid(
            "principal",
            "Principal must be positive",
        ));
    }
    let term = input.loan.to_term("loan")?;

    let factor = payment_factor(term.annual_rate(), term.duration_months())?;
    let payment = input
        .principal
        .checked_mul(factor)
        .ok_or_else(|| LoanBlendError::overflow("monthly payment"))?;
    let interest = total_interest(payment, input.principal, term.duration_months())?;
    let total_paid = input
        .principal
        .checked_add(interest)
        .ok_or_else(|| LoanBlendError::overflow("total paid"))?;

    let output = PaymentOutput {
        duration_months: term.duration_months(),
        payment_factor: factor,
        monthly_payment: payment,
        total_interest: interest,
        total_paid,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-payment amortisation (monthly compounding)",
        &serde_json::json!({
            "periodic_rate": (term.annual_rate() / MONTHS_PER_YEAR).to_string(),
            "periods_per_year": 12,
        }),
        Vec::new(),
        elapsed,
        output,
    ))
}
