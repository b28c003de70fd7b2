//! Discretised search for the short-tranche share of a two-tranche loan.
//!
//! The scan walks the open interval `(0, total_amount)` in `precision`
//! steps. At each step the long tranche's share of the smoothed payment is
//! compared with the minimum needed to cover the long tranche's interest
//! over the short tenor; among covering splits the one with the lowest long
//! payment wins, earliest first on ties.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::amortization::total_interest;
use crate::blending::model::BlendModel;
use crate::error::LoanBlendError;
use crate::types::{with_metadata, ComputationOutput, LoanTerm, Money, Rate};
use crate::LoanBlendResult;

pub const DEFAULT_TOTAL_AMOUNT: Money = dec!(100);
pub const DEFAULT_PRECISION: Decimal = dec!(0.0001);

fn default_total_amount() -> Money {
    DEFAULT_TOTAL_AMOUNT
}

fn default_precision() -> Decimal {
    DEFAULT_PRECISION
}

/// Notional and step size of the ratio scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Notional principal split between the tranches.
    #[serde(default = "default_total_amount")]
    pub total_amount: Money,
    /// Scan step, also the distance kept from both ends of the range.
    #[serde(default = "default_precision")]
    pub precision: Decimal,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            total_amount: DEFAULT_TOTAL_AMOUNT,
            precision: DEFAULT_PRECISION,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> LoanBlendResult<()> {
        if self.total_amount <= Decimal::ZERO {
            return Err(LoanBlendError::invalid(
                "config.total_amount",
                "Total amount must be positive",
            ));
        }
        if self.precision <= Decimal::ZERO {
            return Err(LoanBlendError::invalid(
                "config.precision",
                "Precision must be positive",
            ));
        }
        if self.precision >= self.total_amount / dec!(2) {
            return Err(LoanBlendError::invalid(
                "config.precision",
                "Precision must be less than half the total amount",
            ));
        }
        Ok(())
    }
}

/// Outcome of a full scan. `ratio` is zero when no step covered interest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioScan {
    pub ratio: Decimal,
    pub long_payment: Option<Money>,
    pub min_long_payment: Option<Money>,
    pub feasible_steps: u64,
    pub steps_evaluated: u64,
}

impl RatioScan {
    pub fn is_feasible(&self) -> bool {
        self.ratio > Decimal::ZERO
    }
}

/// Scan every split of `config.total_amount` between `short` and `long`.
pub fn scan_ratios(
    short: &LoanTerm,
    long: &LoanTerm,
    config: &SearchConfig,
) -> LoanBlendResult<RatioScan> {
    config.validate()?;
    let model = BlendModel::new(*short, *long)?;

    let duration_short = Decimal::from(short.duration_months());
    let mut amount_short = config.precision;
    let mut amount_long = config.total_amount - config.precision;

    // (ratio, long payment, minimum long payment)
    let mut best: Option<(Decimal, Money, Money)> = None;
    let mut feasible_steps = 0u64;
    let mut steps_evaluated = 0u64;

    while amount_long > config.precision {
        let smoothed = model.smoothed_payment(amount_short, amount_long)?;
        let short_payment = model.short_payment(amount_short)?;
        let long_payment = smoothed - short_payment;

        let smooth_interest = total_interest(smoothed, config.total_amount, long.duration_months())?;
        let short_interest = total_interest(short_payment, amount_short, short.duration_months())?;
        let min_long_payment = smooth_interest
            .checked_sub(short_interest)
            .ok_or_else(|| LoanBlendError::overflow("long tranche interest"))?
            / duration_short;

        if long_payment >= min_long_payment {
            feasible_steps += 1;
            let improves = match best {
                Some((_, best_payment, _)) => long_payment < best_payment,
                None => true,
            };
            if improves {
                best = Some((amount_short, long_payment, min_long_payment));
            }
        }

        steps_evaluated += 1;
        amount_short += config.precision;
        amount_long -= config.precision;
    }

    let scan = RatioScan {
        ratio: best.map(|(r, _, _)| r).unwrap_or(Decimal::ZERO),
        long_payment: best.map(|(_, p, _)| p),
        min_long_payment: best.map(|(_, _, m)| m),
        feasible_steps,
        steps_evaluated,
    };
    debug!(
        short_rate = %short.annual_rate(),
        short_months = short.duration_months(),
        long_rate = %long.annual_rate(),
        long_months = long.duration_months(),
        ratio = %scan.ratio,
        feasible_steps,
        steps_evaluated,
        "ratio scan finished"
    );
    Ok(scan)
}

/// Optimal short-tranche ratio in percent of `config.total_amount`, or zero
/// if no split covers the long tranche's interest.
pub fn find_optimal_ratio(
    short: &LoanTerm,
    long: &LoanTerm,
    config: &SearchConfig,
) -> LoanBlendResult<Decimal> {
    Ok(scan_ratios(short, long, config)?.ratio)
}

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatioSearchInput {
    pub short_rate: Option<Rate>,
    pub short_duration_months: Option<u32>,
    pub long_rate: Option<Rate>,
    pub long_duration_months: Option<u32>,
    #[serde(default)]
    pub config: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatioSearchOutput {
    pub ratio: Decimal,
    pub long_ratio: Decimal,
    pub feasible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_payment: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_long_payment: Option<Money>,
    pub feasible_steps: u64,
    pub steps_evaluated: u64,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run the ratio scan for a raw short/long pair.
pub fn search_ratio(
    input: &RatioSearchInput,
) -> LoanBlendResult<ComputationOutput<RatioSearchOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let short = LoanTerm::validated("short", input.short_rate, input.short_duration_months)?;
    let long = LoanTerm::validated("long", input.long_rate, input.long_duration_months)?;

    let scan = scan_ratios(&short, &long, &input.config)?;
    if !scan.is_feasible() {
        warnings.push(
            "No split lets the long tranche cover its interest over the short tenor".into(),
        );
    }

    let output = RatioSearchOutput {
        ratio: scan.ratio,
        long_ratio: input.config.total_amount - scan.ratio,
        feasible: scan.is_feasible(),
        long_payment: scan.long_payment,
        min_long_payment: scan.min_long_payment,
        feasible_steps: scan.feasible_steps,
        steps_evaluated: scan.steps_evaluated,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Exhaustive ratio scan minimising the interest-covering long payment",
        &serde_json::json!({
            "total_amount": input.config.total_amount.to_string(),
            "precision": input.config.precision.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn coarse() -> SearchConfig {
        SearchConfig {
            total_amount: dec!(100),
            precision: dec!(0.01),
        }
    }

    fn term(rate: Decimal, months: u32) -> LoanTerm {
        LoanTerm::new(rate, months).unwrap()
    }

    #[test]
    fn test_default_config() {
        let cfg = SearchConfig::default();
        assert_eq!(cfg.total_amount, dec!(100));
        assert_eq!(cfg.precision, dec!(0.0001));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_config_defaults_from_empty_json() {
        let cfg: SearchConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, SearchConfig::default());
    }

    #[test]
    fn test_config_rejects_bad_precision() {
        let cfg = SearchConfig {
            total_amount: dec!(100),
            precision: Decimal::ZERO,
        };
        assert!(cfg.validate().is_err());
        let cfg = SearchConfig {
            total_amount: dec!(100),
            precision: dec!(50),
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_scan_overflow_reported() {
        let cfg = SearchConfig {
            total_amount: Decimal::MAX,
            precision: Decimal::MAX / dec!(4),
        };
        let err = scan_ratios(&term(dec!(0.03), 12), &term(dec!(24), 24), &cfg).unwrap_err();
        assert!(matches!(err, LoanBlendError::NumericOverflow { .. }));
    }

    #[test]
    fn test_coarse_scan_finds_interior_ratio() {
        let ratio =
            find_optimal_ratio(&term(dec!(0.0115), 180), &term(dec!(0.018), 300), &coarse())
                .unwrap();
        assert!((ratio - dec!(51.47)).abs() <= dec!(0.01), "ratio was {ratio}");
    }

    #[test]
    fn test_scan_step_count() {
        let cfg = SearchConfig {
            total_amount: dec!(100),
            precision: dec!(1),
        };
        let scan = scan_ratios(&term(dec!(0.03), 120), &term(dec!(0.044), 300), &cfg).unwrap();
        // amount_short runs 1..=98 while amount_long stays above 1
        assert_eq!(scan.steps_evaluated, 98);
    }

    #[test]
    fn test_ratio_within_bounds() {
        let cfg = SearchConfig {
            total_amount: dec!(100),
            precision: dec!(0.5),
        };
        for (s, l) in [
            (term(dec!(0.029), 120), term(dec!(0.044), 300)),
            (term(dec!(0.05), 120), term(dec!(0.03), 300)),
            (term(dec!(0.2), 12), term(dec!(0.01), 300)),
            (term(dec!(0.044), 300), term(dec!(0.044), 300)),
        ] {
            let ratio = find_optimal_ratio(&s, &l, &cfg).unwrap();
            assert!(ratio >= Decimal::ZERO && ratio < dec!(100), "ratio {ratio}");
        }
    }

    #[test]
    fn test_infeasible_returns_zero() {
        let cfg = SearchConfig {
            total_amount: dec!(100),
            precision: dec!(0.5),
        };
        let scan = scan_ratios(&term(dec!(0.2), 12), &term(dec!(0.01), 300), &cfg).unwrap();
        assert_eq!(scan.ratio, Decimal::ZERO);
        assert!(!scan.is_feasible());
        assert_eq!(scan.feasible_steps, 0);
        assert_eq!(scan.long_payment, None);
    }

    #[test]
    fn test_winner_is_feasible() {
        let scan =
            scan_ratios(&term(dec!(0.035), 180), &term(dec!(0.044), 300), &coarse()).unwrap();
        let long_payment = scan.long_payment.unwrap();
        assert!(long_payment >= scan.min_long_payment.unwrap());
    }

    #[test]
    fn test_idempotent() {
        let short = term(dec!(0.032), 144);
        let long = term(dec!(0.044), 300);
        let a = scan_ratios(&short, &long, &coarse()).unwrap();
        let b = scan_ratios(&short, &long, &coarse()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_short_outlasting_long_rejected() {
        let err =
            find_optimal_ratio(&term(dec!(0.01), 300), &term(dec!(0.2), 12), &coarse()).unwrap_err();
        assert!(matches!(err, LoanBlendError::InvalidInput { .. }));
    }

    #[test]
    fn test_search_ratio_missing_fields() {
        let input = RatioSearchInput {
            short_rate: Some(dec!(0.0115)),
            short_duration_months: None,
            long_rate: Some(dec!(0.018)),
            long_duration_months: Some(300),
            config: coarse(),
        };
        match search_ratio(&input).unwrap_err() {
            LoanBlendError::InvalidInput { field, .. } => assert_eq!(field, "short.duration"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_search_ratio_zero_rate_rejected() {
        let input = RatioSearchInput {
            short_rate: Some(dec!(0.0115)),
            short_duration_months: Some(180),
            long_rate: Some(Decimal::ZERO),
            long_duration_months: Some(300),
            config: coarse(),
        };
        assert!(matches!(
            search_ratio(&input),
            Err(LoanBlendError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_search_ratio_infeasible_warns() {
        let input = RatioSearchInput {
            short_rate: Some(dec!(0.03)),
            short_duration_months: Some(120),
            long_rate: Some(dec!(0.05)),
            long_duration_months: Some(300),
            config: SearchConfig {
                total_amount: dec!(100),
                precision: dec!(0.5),
            },
        };
        let out = search_ratio(&input).unwrap();
        assert!(!out.result.feasible);
        assert_eq!(out.result.ratio, Decimal::ZERO);
        assert_eq!(out.result.long_ratio, dec!(100));
        assert_eq!(out.warnings.len(), 1);
    }
}
