use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::{months_to_years, years_to_months};
use crate::error::LoanBlendError;
use crate::LoanBlendResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Annual rates expressed as decimals (0.044 = 4.4%). Never as percentages.
pub type Rate = Decimal;

/// Loan tenor in (possibly fractional) years
pub type Years = Decimal;

/// A validated fixed-rate loan: positive annual rate, positive whole-month duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoanTerm {
    annual_rate: Rate,
    duration_months: u32,
}

impl LoanTerm {
    pub fn new(annual_rate: Rate, duration_months: u32) -> LoanBlendResult<Self> {
        Self::validated("loan", Some(annual_rate), Some(duration_months))
    }

    /// Validate optional scalars into a term. `field` prefixes error messages.
    pub fn validated(
        field: &str,
        annual_rate: Option<Rate>,
        duration_months: Option<u32>,
    ) -> LoanBlendResult<Self> {
        let annual_rate = match annual_rate {
            None => return Err(LoanBlendError::invalid(format!("{field}.rate"), "Rate is missing")),
            Some(r) if r <= Decimal::ZERO => {
                return Err(LoanBlendError::invalid(
                    format!("{field}.rate"),
                    "Rate must be positive (zero-rate amortisation is not supported)",
                ))
            }
            Some(r) => r,
        };
        let duration_months = match duration_months {
            None => {
                return Err(LoanBlendError::invalid(
                    format!("{field}.duration"),
                    "Duration is missing",
                ))
            }
            Some(0) => {
                return Err(LoanBlendError::invalid(
                    format!("{field}.duration"),
                    "Duration must be greater than zero",
                ))
            }
            Some(m) => m,
        };
        Ok(LoanTerm {
            annual_rate,
            duration_months,
        })
    }

    pub fn annual_rate(&self) -> Rate {
        self.annual_rate
    }

    pub fn duration_months(&self) -> u32 {
        self.duration_months
    }
}

/// A loan as supplied by the caller, rate and tenor in years. Either field
/// may be absent; `to_term` performs the validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanOffer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<Rate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_years: Option<Years>,
}

impl LoanOffer {
    pub fn new(rate: Rate, duration_years: Years) -> Self {
        LoanOffer {
            rate: Some(rate),
            duration_years: Some(duration_years),
        }
    }

    /// Validate and normalise into months.
    pub fn to_term(&self, field: &str) -> LoanBlendResult<LoanTerm> {
        let months = match self.duration_years {
            Some(years) if years > Decimal::ZERO => Some(years_to_months(years).map_err(|e| {
                match e {
                    LoanBlendError::InvalidInput { reason, .. } => {
                        LoanBlendError::invalid(format!("{field}.duration_years"), reason)
                    }
                    other => other,
                }
            })?),
            Some(_) => Some(0),
            None => None,
        };
        LoanTerm::validated(field, self.rate, months)
    }

    pub fn from_term(term: &LoanTerm) -> Self {
        LoanOffer::new(term.annual_rate(), months_to_years(term.duration_months()))
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_offer_to_term_converts_years() {
        let term = LoanOffer::new(dec!(0.044), dec!(25)).to_term("reference").unwrap();
        assert_eq!(term.annual_rate(), dec!(0.044));
        assert_eq!(term.duration_months(), 300);
    }

    #[test]
    fn test_offer_fractional_year_to_whole_months() {
        let term = LoanOffer::new(dec!(0.03), dec!(12.5)).to_term("loan").unwrap();
        assert_eq!(term.duration_months(), 150);
    }

    #[test]
    fn test_offer_missing_rate_rejected() {
        let offer = LoanOffer {
            rate: None,
            duration_years: Some(dec!(10)),
        };
        match offer.to_term("candidates[2]").unwrap_err() {
            LoanBlendError::InvalidInput { field, .. } => assert_eq!(field, "candidates[2].rate"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_offer_zero_duration_rejected() {
        let offer = LoanOffer::new(dec!(0.03), Decimal::ZERO);
        match offer.to_term("loan").unwrap_err() {
            LoanBlendError::InvalidInput { field, .. } => assert_eq!(field, "loan.duration"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_offer_partial_month_rejected() {
        let offer = LoanOffer::new(dec!(0.03), dec!(10.01));
        match offer.to_term("loan").unwrap_err() {
            LoanBlendError::InvalidInput { field, .. } => {
                assert_eq!(field, "loan.duration_years")
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_term_round_trips_to_offer() {
        let term = LoanTerm::new(dec!(0.038), 264).unwrap();
        let offer = LoanOffer::from_term(&term);
        assert_eq!(offer.rate, Some(dec!(0.038)));
        assert_eq!(offer.duration_years, Some(dec!(22)));
    }

    #[test]
    fn test_offer_deserialises_with_missing_fields() {
        let offer: LoanOffer = serde_json::from_str(r#"{"duration_years": 10}"#).unwrap();
        assert_eq!(offer.rate, None);
        assert_eq!(offer.duration_years, Some(dec!(10)));
    }
}
