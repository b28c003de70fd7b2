use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanBlendError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("No feasible combination: {0}")]
    Infeasible(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Numeric overflow in {context}")]
    NumericOverflow { context: String },

    #[error("Negative interest {value} in {context}: payment does not amortise the principal")]
    NegativeInterest { context: String, value: Decimal },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl LoanBlendError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        LoanBlendError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn overflow(context: impl Into<String>) -> Self {
        LoanBlendError::NumericOverflow {
            context: context.into(),
        }
    }
}

impl From<serde_json::Error> for LoanBlendError {
    fn from(e: serde_json::Error) -> Self {
        LoanBlendError::SerializationError(e.to_string())
    }
}
