pub mod error;
pub mod solver;
pub mod time_value;
pub mod types;

#[cfg(feature = "fixed_income")]
pub mod fixed_income;

#[cfg(feature = "scenarios")]
pub mod scenarios;

pub use error::ValuationError;
pub use types::*;

/// Standard result type for all bond valuation operations
pub type ValuationResult<T> = Result<T, ValuationError>;
