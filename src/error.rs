//! Error kinds surfaced by the loan functions, schedules, and matrix engine

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, LoanError>;

/// Every failure is deterministic given its inputs, so callers decide
/// whether to skip, default, or abort; nothing here is retried.
#[derive(Error, Debug)]
pub enum LoanError {
    /// Non-positive term or an unsupported payment frequency
    #[error("Invalid loan terms: {reason}")]
    InvalidLoanTerms { reason: String },

    /// A single period outside `[1, periods_total]`
    #[error("Invalid period {period}: must be within 1..={periods_total}")]
    InvalidPeriod { period: i64, periods_total: u32 },

    /// A period window that is inverted or leaves `[1, periods_total]`
    #[error("Invalid period range {start}..={end}: must satisfy 1 <= start <= end <= {periods_total}")]
    InvalidPeriodRange { start: i64, end: i64, periods_total: u32 },

    /// Operands that cannot be broadcast against each other
    #[error("Dimension mismatch: left is {left_rows}x{left_cols}, right is {right_rows}x{right_cols} ({reason})")]
    DimensionMismatch {
        left_rows: usize,
        left_cols: usize,
        right_rows: usize,
        right_cols: usize,
        reason: String,
    },

    /// A value that should be a number could not be read as one
    #[error("Non-numeric input in {field}: {value:?}")]
    NonNumericInput { field: String, value: String },

    /// A configured column is absent from the input table
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Final-period residual too large to be floating-point drift
    #[error("Balance drift of {residual:e} at period {period} exceeds tolerance {tolerance:e}")]
    BalanceDrift { period: u32, residual: f64, tolerance: f64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoanError {
    pub(crate) fn invalid_terms(reason: impl Into<String>) -> Self {
        LoanError::InvalidLoanTerms { reason: reason.into() }
    }

    pub(crate) fn non_numeric(field: impl Into<String>, value: impl ToString) -> Self {
        LoanError::NonNumericInput {
            field: field.into(),
            value: value.to_string(),
        }
    }
}

impl From<serde_json::Error> for LoanError {
    fn from(e: serde_json::Error) -> Self {
        LoanError::Config(e.to_string())
    }
}
