//! On-screen view model.

use serde::Serialize;
use tessera_shared::types::{Currency, Money, PageMeta};

use crate::reports::{AggregateReport, ReportPage};

/// One report page with its position in the sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewPage {
    /// Pagination metadata (1-indexed page number).
    pub meta: PageMeta,
    /// The page as produced by the paginator.
    #[serde(flatten)]
    pub page: ReportPage,
}

/// Pass-through model for on-screen preview.
///
/// Carries the aggregate and the pages unchanged, plus display strings for the headline
/// totals so a preview does not reformat amounts itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportViewModel {
    /// Aggregate the pages were built from.
    pub report: AggregateReport,
    /// Headline totals formatted with the report currency.
    pub totals: ViewTotals,
    /// Pages in order.
    pub pages: Vec<ViewPage>,
}

/// Formatted headline totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewTotals {
    /// Total income.
    pub income: String,
    /// Total expense.
    pub expense: String,
    /// Net balance.
    pub net_balance: String,
}

impl ReportViewModel {
    /// Wraps a report and its pages.
    #[must_use]
    pub fn new(report: &AggregateReport, pages: &[ReportPage], currency: Currency) -> Self {
        // A full first page reveals the page capacity; a single partial page is its own total.
        let per_page = pages.first().map_or(1, |p| p.body_rows.len().max(1));
        let total: usize = pages.iter().map(|p| p.body_rows.len()).sum();

        let pages = pages
            .iter()
            .enumerate()
            .map(|(i, page)| ViewPage {
                meta: PageMeta::new(i + 1, per_page, total),
                page: page.clone(),
            })
            .collect();

        Self {
            report: report.clone(),
            totals: ViewTotals {
                income: Money::new(report.total_income, currency).to_string(),
                expense: Money::new(report.total_expense, currency).to_string(),
                net_balance: Money::new(report.net_balance, currency).to_string(),
            },
            pages,
        }
    }
}
