pub mod amortization;
pub mod error;
pub mod types;

#[cfg(feature = "blending")]
pub mod blending;

#[cfg(feature = "schedule")]
pub mod schedule;

pub use error::LoanBlendError;
pub use types::*;

/// Standard result type for all loan-blend operations
pub type LoanBlendResult<T> = Result<T, LoanBlendError>;
