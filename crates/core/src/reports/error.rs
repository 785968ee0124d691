//! Report error types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tessera_shared::AppError;
use thiserror::Error;

use super::types::TransactionType;

/// Errors that can occur during report generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// Invalid date range.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// Page capacity must be at least one row.
    #[error("Rows per page must be positive, got {0}")]
    InvalidRowsPerPage(usize),

    /// Report type string outside the supported set.
    #[error("Unknown report type: {0}")]
    UnknownReportType(String),

    /// A record in range carries a negative amount.
    #[error("Record {index} has negative amount {amount}")]
    NegativeAmount {
        /// Position of the record in the input.
        index: usize,
        /// Offending amount.
        amount: Decimal,
    },

    /// A record in range has a blank category.
    #[error("Record {index} has an empty category")]
    EmptyCategory {
        /// Position of the record in the input.
        index: usize,
    },

    /// Summed amounts left the representable decimal range.
    #[error("Total of {0} amounts overflows the decimal range")]
    AmountOverflow(TransactionType),
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        Self::Validation(err.to_string())
    }
}
