//! Error types for input collection and session handling.
//!
//! The calculation core itself is total over its domain; these errors are
//! raised where inputs are collected and where the session enforces its
//! stage ordering.

use crate::money::Money;
use rust_decimal::Decimal;
use thiserror::Error;

/// Result type alias for diagnosis operations
pub type Result<T> = std::result::Result<T, FinanceError>;

/// Errors that can occur while collecting inputs or driving a session.
#[derive(Error, Debug)]
pub enum FinanceError {
    /// Failed to open or read an input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing or writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A currency field that must be non-negative was negative
    #[error("{field} must not be negative (got {value})")]
    NegativeAmount { field: &'static str, value: Money },

    /// A currency field above the accepted input maximum
    #[error("{field} must be at most {max} (got {value})")]
    AmountTooLarge {
        field: &'static str,
        value: Money,
        max: Money,
    },

    /// Projection horizon beyond the supported number of years
    #[error("Projection horizon must be at most {max} years (got {0})", max = crate::projection::MAX_HORIZON_YEARS)]
    HorizonTooLong(u32),

    /// Loan term shorter than one month
    #[error("Loan term must be at least 1 month (got {0})")]
    InvalidTerm(u32),

    /// Annual rate outside the accepted range
    #[error("Annual rate must be between 0 and 120 percent (got {0})")]
    RateOutOfRange(Decimal),

    /// Credit evaluation requested before the cash flow was analyzed
    #[error("Cash flow must be analyzed before evaluating a loan")]
    CashFlowNotAnalyzed,

    /// Credit evaluation requested without a loan amount
    #[error("Loan principal must be greater than zero to evaluate a loan")]
    NoLoanRequested,
}
