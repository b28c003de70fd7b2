//! Two-tranche blended payment.
//!
//! A short loan is paid off over its own tenor while the long loan absorbs
//! that payment stream, discounted at the long rate over the short tenor.
//! The combined structure is then re-amortised over the long tenor, giving a
//! single smoothed monthly payment.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{payment_factor, total_interest};
use crate::error::LoanBlendError;
use crate::types::{with_metadata, ComputationOutput, LoanTerm, Money, Rate};
use crate::LoanBlendResult;

/// Evaluation of a single short/long split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendResult {
    /// Percent of the principal placed in the short tranche.
    pub ratio: Decimal,
    pub monthly_payment: Money,
    pub total_interest: Money,
}

/// Payment factors for a short/long pair, computed once so the ratio scan
/// never re-raises powers.
#[derive(Debug, Clone, Copy)]
pub struct BlendModel {
    long: LoanTerm,
    short_factor: Decimal,
    long_factor_short_tenor: Decimal,
    long_factor: Decimal,
}

impl BlendModel {
    pub fn new(short: LoanTerm, long: LoanTerm) -> LoanBlendResult<Self> {
        if short.duration_months() > long.duration_months() {
            return Err(LoanBlendError::invalid(
                "duration_short",
                format!(
                    "Short tranche ({} months) must not outlast the long tranche ({} months)",
                    short.duration_months(),
                    long.duration_months()
                ),
            ));
        }

        let long_factor_short_tenor = payment_factor(long.annual_rate(), short.duration_months())?;
        if long_factor_short_tenor.is_zero() {
            return Err(LoanBlendError::DivisionByZero {
                context: "long-rate factor over the short tenor".into(),
            });
        }

        Ok(BlendModel {
            long,
            short_factor: payment_factor(short.annual_rate(), short.duration_months())?,
            long_factor_short_tenor,
            long_factor: payment_factor(long.annual_rate(), long.duration_months())?,
        })
    }

    /// Monthly payment of the short tranche alone.
    pub fn short_payment(&self, amount_short: Money) -> LoanBlendResult<Money> {
        amount_short
            .checked_mul(self.short_factor)
            .ok_or_else(|| LoanBlendError::overflow("short tranche payment"))
    }

    /// Smoothed payment of the combined structure over the long tenor.
    pub fn smoothed_payment(
        &self,
        amount_short: Money,
        amount_long: Money,
    ) -> LoanBlendResult<Money> {
        self.short_payment(amount_short)?
            .checked_div(self.long_factor_short_tenor)
            .and_then(|absorbed| amount_long.checked_add(absorbed))
            .and_then(|principal| principal.checked_mul(self.long_factor))
            .ok_or_else(|| LoanBlendError::overflow("smoothed payment"))
    }

    /// Evaluate `ratio` percent of `total_amount` in the short tranche.
    pub fn evaluate(&self, ratio: Decimal, total_amount: Money) -> LoanBlendResult<BlendResult> {
        if ratio < Decimal::ZERO || ratio > total_amount {
            return Err(LoanBlendError::invalid(
                "ratio",
                format!("Ratio {ratio} outside [0, {total_amount}]"),
            ));
        }
        let payment = self.smoothed_payment(ratio, total_amount - ratio)?;
        let interest = total_interest(payment, total_amount, self.long.duration_months())?;
        if interest < Decimal::ZERO {
            return Err(LoanBlendError::NegativeInterest {
                context: format!("blend at ratio {ratio}"),
                value: interest,
            });
        }
        Ok(BlendResult {
            ratio,
            monthly_payment: payment,
            total_interest: interest,
        })
    }
}

/// Smoothed monthly payment of a short loan refinanced into a long loan.
pub fn blended_monthly_payment(
    amount_short: Money,
    rate_short: Rate,
    duration_short: u32,
    amount_long: Money,
    rate_long: Rate,
    duration_long: u32,
) -> LoanBlendResult<Money> {
    if amount_short < Decimal::ZERO || amount_long < Decimal::ZERO {
        return Err(LoanBlendError::invalid(
            "amount",
            "Tranche amounts cannot be negative",
        ));
    }
    let short = LoanTerm::validated("short", Some(rate_short), Some(duration_short))?;
    let long = LoanTerm::validated("long", Some(rate_long), Some(duration_long))?;
    BlendModel::new(short, long)?.smoothed_payment(amount_short, amount_long)
}

// ---------------------------------------------------------------------------
// Blend summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlendInput {
    pub amount_short: Money,
    pub short_rate: Option<Rate>,
    pub short_duration_months: Option<u32>,
    pub amount_long: Money,
    pub long_rate: Option<Rate>,
    pub long_duration_months: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlendOutput {
    pub total_principal: Money,
    /// Smoothed payment of the whole structure.
    pub monthly_payment: Money,
    pub short_payment: Money,
    /// Smoothed payment less the short tranche's own payment.
    pub long_payment: Money,
    pub total_interest: Money,
}

pub fn calculate_blend(input: &BlendInput) -> LoanBlendResult<ComputationOutput<BlendOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.amount_short < Decimal::ZERO || input.amount_long < Decimal::ZERO {
        return Err(LoanBlendError::invalid(
            "amount",
            "Tranche amounts cannot be negative",
        ));
    }
    let total = input
        .amount_short
        .checked_add(input.amount_long)
        .ok_or_else(|| LoanBlendError::overflow("total principal"))?;
    if total.is_zero() {
        return Err(LoanBlendError::invalid(
            "amount",
            "At least one tranche must be funded",
        ));
    }

    let short = LoanTerm::validated("short", input.short_rate, input.short_duration_months)?;
    let long = LoanTerm::validated("long", input.long_rate, input.long_duration_months)?;
    let model = BlendModel::new(short, long)?;

    let payment = model.smoothed_payment(input.amount_short, input.amount_long)?;
    let short_payment = model.short_payment(input.amount_short)?;
    let interest = total_interest(payment, total, long.duration_months())?;
    if interest < Decimal::ZERO {
        return Err(LoanBlendError::NegativeInterest {
            context: "blended structure".into(),
            value: interest,
        });
    }
    if payment < short_payment {
        warnings.push("Smoothed payment is below the short tranche's own payment".into());
    }

    let output = BlendOutput {
        total_principal: total,
        monthly_payment: payment,
        short_payment,
        long_payment: payment - short_payment,
        total_interest: interest,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Two-tranche blend re-amortised over the long tenor",
        &serde_json::json!({
            "short_months": short.duration_months(),
            "long_months": long.duration_months(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::monthly_payment;
    use rust_decimal_macros::dec;

    fn term(rate: Decimal, months: u32) -> LoanTerm {
        LoanTerm::new(rate, months).unwrap()
    }

    #[test]
    fn test_matches_closed_form() {
        let got = blended_monthly_payment(dec!(40), dec!(0.03), 120, dec!(60), dec!(0.05), 300)
            .unwrap();
        let short_pmt = monthly_payment(dec!(40), dec!(0.03), 120).unwrap();
        let expected = (dec!(60) + short_pmt / payment_factor(dec!(0.05), 120).unwrap())
            * payment_factor(dec!(0.05), 300).unwrap();
        assert_eq!(got, expected);
        assert!((got - dec!(0.5636)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_all_long_is_plain_amortisation() {
        let model = BlendModel::new(term(dec!(0.03), 120), term(dec!(0.044), 300)).unwrap();
        let plain = monthly_payment(dec!(100), dec!(0.044), 300).unwrap();
        assert_eq!(model.smoothed_payment(Decimal::ZERO, dec!(100)).unwrap(), plain);
    }

    #[test]
    fn test_same_loan_both_tranches_is_neutral() {
        // Splitting a loan with itself changes nothing
        let t = term(dec!(0.044), 300);
        let model = BlendModel::new(t, t).unwrap();
        let plain = monthly_payment(dec!(100), dec!(0.044), 300).unwrap();
        let blended = model.smoothed_payment(dec!(35), dec!(65)).unwrap();
        assert!((blended - plain).abs() < dec!(0.0000000001));
    }

    #[test]
    fn test_short_longer_than_long_rejected() {
        let err = BlendModel::new(term(dec!(0.03), 360), term(dec!(0.04), 300)).unwrap_err();
        match err {
            LoanBlendError::InvalidInput { field, .. } => assert_eq!(field, "duration_short"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_cheaper_short_tranche_lowers_payment() {
        let model = BlendModel::new(term(dec!(0.029), 120), term(dec!(0.044), 300)).unwrap();
        let all_long = model.smoothed_payment(Decimal::ZERO, dec!(100)).unwrap();
        let blended = model.smoothed_payment(dec!(30), dec!(70)).unwrap();
        assert!(blended < all_long);
    }

    #[test]
    fn test_evaluate_interest() {
        let model = BlendModel::new(term(dec!(0.038), 264), term(dec!(0.044), 300)).unwrap();
        let res = model.evaluate(dec!(81.0726), dec!(100)).unwrap();
        assert!((res.total_interest - dec!(57.728)).abs() < dec!(0.001));
        assert_eq!(res.ratio, dec!(81.0726));
    }

    #[test]
    fn test_evaluate_rejects_ratio_out_of_range() {
        let model = BlendModel::new(term(dec!(0.038), 264), term(dec!(0.044), 300)).unwrap();
        assert!(model.evaluate(dec!(101), dec!(100)).is_err());
        assert!(model.evaluate(dec!(-1), dec!(100)).is_err());
    }

    #[test]
    fn test_missing_rate_rejected() {
        let input = BlendInput {
            amount_short: dec!(50),
            short_rate: None,
            short_duration_months: Some(120),
            amount_long: dec!(50),
            long_rate: Some(dec!(0.04)),
            long_duration_months: Some(300),
        };
        match calculate_blend(&input).unwrap_err() {
            LoanBlendError::InvalidInput { field, .. } => assert_eq!(field, "short.rate"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_calculate_blend_splits_payment() {
        let input = BlendInput {
            amount_short: dec!(40),
            short_rate: Some(dec!(0.03)),
            short_duration_months: Some(120),
            amount_long: dec!(60),
            long_rate: Some(dec!(0.05)),
            long_duration_months: Some(300),
        };
        let out = calculate_blend(&input).unwrap().result;
        assert_eq!(out.total_principal, dec!(100));
        assert_eq!(out.long_payment + out.short_payment, out.monthly_payment);
        assert!(out.total_interest > Decimal::ZERO);
    }

    #[test]
    fn test_oversized_tranches_report_overflow() {
        let input = BlendInput {
            amount_short: Decimal::MAX,
            short_rate: Some(dec!(0.03)),
            short_duration_months: Some(120),
            amount_long: dec!(1),
            long_rate: Some(dec!(0.05)),
            long_duration_months: Some(300),
        };
        match calculate_blend(&input).unwrap_err() {
            LoanBlendError::NumericOverflow { context } => assert_eq!(context, "total principal"),
            other => panic!("Expected NumericOverflow, got {other:?}"),
        }
    }

    #[test]
    fn test_smoothed_payment_overflow_reported() {
        // A steep long rate makes the long factor exceed 1.
        let model = BlendModel::new(term(dec!(0.03), 12), term(dec!(24), 24)).unwrap();
        assert!(matches!(
            model.smoothed_payment(Decimal::ZERO, Decimal::MAX),
            Err(LoanBlendError::NumericOverflow { .. })
        ));
    }
}
