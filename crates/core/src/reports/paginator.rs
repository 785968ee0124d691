//! Row-level pagination of report tables.
//!
//! The paginator turns an [`AggregateReport`] into a sequence of [`ReportPage`]s, each holding
//! at most `rows_per_page` body rows under a header row that is repeated verbatim on every
//! page. Rows are never split across pages.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tessera_shared::types::page_count;
use tracing::debug;

use super::error::ReportError;
use super::types::{AggregateReport, TransactionRecord, TransactionType};

/// Which sections of the aggregate a page sequence includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    /// Totals only, one fixed block.
    Summary,
    /// Every transaction in range.
    Detailed,
    /// Income transactions only.
    Income,
    /// Expense transactions only.
    Expense,
    /// One row per non-zero category total.
    Category,
}

impl ReportType {
    /// All report types.
    pub const ALL: [Self; 5] = [
        Self::Summary,
        Self::Detailed,
        Self::Income,
        Self::Expense,
        Self::Category,
    ];

    /// Returns the canonical string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Detailed => "detailed",
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Category => "category",
        }
    }

    /// Table section the report type paginates.
    #[must_use]
    pub const fn section(self) -> ReportSection {
        match self {
            Self::Summary => ReportSection::Summary,
            Self::Detailed => ReportSection::Transactions,
            Self::Income => ReportSection::IncomeTransactions,
            Self::Expense => ReportSection::ExpenseTransactions,
            Self::Category => ReportSection::Categories,
        }
    }
}

impl std::fmt::Display for ReportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ReportError::UnknownReportType(s.to_string()))
    }
}

/// Logical table a page belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSection {
    /// Summary block.
    Summary,
    /// All transactions.
    Transactions,
    /// Income transactions.
    IncomeTransactions,
    /// Expense transactions.
    ExpenseTransactions,
    /// Category breakdown.
    Categories,
}

impl ReportSection {
    /// Human-readable section title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Summary => "Summary",
            Self::Transactions => "Transactions",
            Self::IncomeTransactions => "Income",
            Self::ExpenseTransactions => "Expenses",
            Self::Categories => "Category Analysis",
        }
    }
}

/// One table cell. Renderers decide how each kind is formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Cell {
    /// Plain text.
    Text(String),
    /// Calendar date.
    Date(NaiveDate),
    /// Money amount.
    Amount(Decimal),
    /// Percentage with two decimals.
    Percent(Decimal),
    /// Record count.
    Count(usize),
}

/// A table row.
pub type Row = Vec<Cell>;

/// One page's worth of table rows plus the repeated header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPage {
    /// Table this page belongs to.
    pub section: ReportSection,
    /// Zero-based position in the page sequence.
    pub page_index: usize,
    /// Column titles, identical on every page of the sequence.
    pub header_row: Vec<String>,
    /// At most `rows_per_page` rows.
    pub body_rows: Vec<Row>,
}

/// Column titles of transaction tables.
#[must_use]
pub fn transaction_header() -> Vec<String> {
    [
        "Date",
        "Type",
        "Category",
        "Description",
        "Payment Method",
        "Reference",
        "Amount",
    ]
    .map(String::from)
    .to_vec()
}

/// Table row for one transaction.
#[must_use]
pub fn transaction_row(record: &TransactionRecord) -> Row {
    vec![
        Cell::Date(record.date.date()),
        Cell::Text(record.kind.as_str().to_string()),
        Cell::Text(record.category_key().to_string()),
        Cell::Text(record.description.clone()),
        Cell::Text(record.payment_method.clone()),
        Cell::Text(record.reference.clone().unwrap_or_default()),
        Cell::Amount(record.amount),
    ]
}

/// Column titles of the category breakdown.
#[must_use]
pub fn category_header() -> Vec<String> {
    ["Type", "Category", "Count", "Amount", "Share %"]
        .map(String::from)
        .to_vec()
}

/// Category breakdown rows for one partition, in report order.
#[must_use]
pub fn category_rows(report: &AggregateReport, kind: TransactionType) -> Vec<Row> {
    report
        .categories(kind)
        .iter()
        .map(|c| {
            vec![
                Cell::Text(kind.as_str().to_string()),
                Cell::Text(c.category.clone()),
                Cell::Count(c.count),
                Cell::Amount(c.total),
                Cell::Percent(c.share_percent),
            ]
        })
        .collect()
}

/// Column titles of the summary block.
#[must_use]
pub fn summary_header() -> Vec<String> {
    vec!["Metric".to_string(), "Value".to_string()]
}

/// Fixed rows of the summary block.
#[must_use]
pub fn summary_rows(report: &AggregateReport) -> Vec<Row> {
    let metric = |name: &str, value: Cell| vec![Cell::Text(name.to_string()), value];
    vec![
        metric("Total Income", Cell::Amount(report.total_income)),
        metric("Total Expense", Cell::Amount(report.total_expense)),
        metric("Net Balance", Cell::Amount(report.net_balance)),
        metric("Transactions", Cell::Count(report.transaction_count)),
        metric("Income Records", Cell::Count(report.income_count)),
        metric("Expense Records", Cell::Count(report.expense_count)),
    ]
}

/// Running page accumulator.
///
/// Holds the page being filled and seals it once it reaches capacity.
struct PageAccumulator {
    section: ReportSection,
    header_row: Vec<String>,
    rows_per_page: usize,
    sealed: Vec<ReportPage>,
    current: Vec<Row>,
}

impl PageAccumulator {
    fn new(section: ReportSection, header_row: Vec<String>, rows_per_page: usize) -> Self {
        Self {
            section,
            header_row,
            rows_per_page,
            sealed: Vec::new(),
            current: Vec::with_capacity(rows_per_page),
        }
    }

    fn push(&mut self, row: Row) {
        if self.current.len() == self.rows_per_page {
            self.seal();
        }
        self.current.push(row);
    }

    fn seal(&mut self) {
        let body_rows = std::mem::replace(&mut self.current, Vec::with_capacity(self.rows_per_page));
        self.sealed.push(ReportPage {
            section: self.section,
            page_index: self.sealed.len(),
            header_row: self.header_row.clone(),
            body_rows,
        });
    }

    /// Seals the last page even if partially filled (or empty, when no rows arrived).
    fn finish(mut self) -> Vec<ReportPage> {
        self.seal();
        self.sealed
    }
}

/// Lays aggregate data out into bounded pages.
pub struct TabularReportPaginator;

impl TabularReportPaginator {
    /// Paginates the section selected by `report_type`.
    ///
    /// `Summary` always yields a single fixed block. Every other type yields
    /// `ceil(rows / rows_per_page)` pages, or one header-only page when there are no rows.
    pub fn paginate(
        report: &AggregateReport,
        report_type: ReportType,
        rows_per_page: usize,
    ) -> Result<Vec<ReportPage>, ReportError> {
        if rows_per_page == 0 {
            return Err(ReportError::InvalidRowsPerPage(rows_per_page));
        }

        let section = report_type.section();

        if report_type == ReportType::Summary {
            return Ok(vec![ReportPage {
                section,
                page_index: 0,
                header_row: summary_header(),
                body_rows: summary_rows(report),
            }]);
        }

        let (header_row, rows): (Vec<String>, Vec<Row>) = match report_type {
            ReportType::Category => {
                let mut rows = category_rows(report, TransactionType::Income);
                rows.extend(category_rows(report, TransactionType::Expense));
                (category_header(), rows)
            }
            ReportType::Income | ReportType::Expense => {
                let kind = if report_type == ReportType::Income {
                    TransactionType::Income
                } else {
                    TransactionType::Expense
                };
                let rows = report
                    .transactions
                    .iter()
                    .filter(|r| r.kind == kind)
                    .map(transaction_row)
                    .collect();
                (transaction_header(), rows)
            }
            ReportType::Detailed | ReportType::Summary => (
                transaction_header(),
                report.transactions.iter().map(transaction_row).collect(),
            ),
        };

        let row_count = rows.len();
        let mut accumulator = PageAccumulator::new(section, header_row, rows_per_page);
        for row in rows {
            accumulator.push(row);
        }
        let pages = accumulator.finish();

        debug_assert_eq!(pages.len(), page_count(row_count, rows_per_page));
        debug!(
            report_type = %report_type,
            rows = row_count,
            pages = pages.len(),
            "paginated report"
        );

        Ok(pages)
    }
}
