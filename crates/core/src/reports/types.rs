//! Report data types.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ReportError;

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money received.
    Income,
    /// Money paid out.
    Expense,
}

impl TransactionType {
    /// Returns the canonical string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {s}")),
        }
    }
}

/// A dated, categorized transaction as persisted by the external store.
///
/// Read-only input: the aggregator never mutates records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// When the transaction happened, in the caller's local time.
    #[serde(with = "record_date")]
    pub date: NaiveDateTime,
    /// Income or expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Free-form category name.
    pub category: String,
    /// Non-negative amount, persisted as a numeric string.
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    /// Payment method (cash, transfer, ...).
    #[serde(default, alias = "paymentMethod")]
    pub payment_method: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Optional external reference (receipt number, invoice id).
    #[serde(default)]
    pub reference: Option<String>,
}

impl TransactionRecord {
    /// Creates a record with empty payment method and description.
    #[must_use]
    pub fn new(
        date: NaiveDateTime,
        kind: TransactionType,
        category: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            date,
            kind,
            category: category.into(),
            amount,
            payment_method: String::new(),
            description: String::new(),
            reference: None,
        }
    }

    /// Category with surrounding whitespace removed; the grouping key.
    #[must_use]
    pub fn category_key(&self) -> &str {
        self.category.trim()
    }
}

/// Inclusive date range.
///
/// Comparison is date-only, so `end` effectively extends to the end of its day and a
/// single-day range includes every record on that day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day included.
    pub start: NaiveDate,
    /// Last day included.
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a validated date range.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ReportError> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    /// Creates a range covering one day.
    #[must_use]
    pub const fn single_day(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    /// Checks that the range does not end before it starts.
    pub fn validate(&self) -> Result<(), ReportError> {
        if self.end < self.start {
            return Err(ReportError::InvalidDateRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Returns true if the timestamp falls on a day inside the range.
    #[must_use]
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        let day = at.date();
        day >= self.start && day <= self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Total for one category within a partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// Category name.
    pub category: String,
    /// Sum of amounts, always positive.
    pub total: Decimal,
    /// Share of the partition total, in percent with two decimals.
    pub share_percent: Decimal,
    /// Number of records in the category.
    pub count: usize,
}

/// Computed totals and category breakdowns for a transaction set over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateReport {
    /// Range the report covers.
    pub period: DateRange,
    /// Sum of income amounts.
    pub total_income: Decimal,
    /// Sum of expense amounts.
    pub total_expense: Decimal,
    /// Income minus expense.
    pub net_balance: Decimal,
    /// Records inside the range.
    pub transaction_count: usize,
    /// Income records inside the range.
    pub income_count: usize,
    /// Expense records inside the range.
    pub expense_count: usize,
    /// Income per category, largest first.
    pub income_by_category: Vec<CategoryTotal>,
    /// Expense per category, largest first.
    pub expense_by_category: Vec<CategoryTotal>,
    /// Records inside the range in chronological order.
    pub transactions: Vec<TransactionRecord>,
}

impl AggregateReport {
    /// Returns true if no records fell inside the range.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transaction_count == 0
    }

    /// Category breakdown for one partition.
    #[must_use]
    pub fn categories(&self, kind: TransactionType) -> &[CategoryTotal] {
        match kind {
            TransactionType::Income => &self.income_by_category,
            TransactionType::Expense => &self.expense_by_category,
        }
    }

    /// Partition total.
    #[must_use]
    pub fn total(&self, kind: TransactionType) -> Decimal {
        match kind {
            TransactionType::Income => self.total_income,
            TransactionType::Expense => self.total_expense,
        }
    }
}

/// Lenient timestamp (de)serialization for store exports.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DDTHH:MM:SS`, with optional
/// fractional seconds. Date-only values mean midnight.
pub mod record_date {
    use chrono::{NaiveDate, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const DATETIME_FORMATS: [&str; 3] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ];

    /// Parses a store timestamp.
    #[must_use]
    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        DATETIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|day| day.and_hms_opt(0, 0, 0))
            })
    }

    /// Serializes as `YYYY-MM-DDTHH:MM:SS[.fff]`.
    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format("%Y-%m-%dT%H:%M:%S%.f"))
    }

    /// Deserializes any accepted timestamp shape.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid transaction date: {raw}")))
    }
}
