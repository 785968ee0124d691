//! Financial transaction reporting.
//!
//! This module provides pure business logic for transaction reports:
//! - Aggregation of income/expense records over a date range
//! - Category percentage shares that always sum to 100
//! - Row-level pagination of report tables

pub mod aggregator;
pub mod error;
pub mod paginator;
pub mod shares;
pub mod types;

#[cfg(test)]
mod tests;

pub use aggregator::TransactionAggregator;
pub use error::ReportError;
pub use paginator::{Cell, ReportPage, ReportSection, ReportType, Row, TabularReportPaginator};
pub use types::*;
