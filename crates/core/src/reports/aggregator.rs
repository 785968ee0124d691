//! Transaction aggregation.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::error::ReportError;
use super::shares::percent_shares;
use super::types::{AggregateReport, CategoryTotal, DateRange, TransactionRecord, TransactionType};

/// Filters and groups transaction records into an [`AggregateReport`].
pub struct TransactionAggregator;

impl TransactionAggregator {
    /// Aggregates the records that fall inside `range`.
    ///
    /// Records outside the range are ignored without validation. Records inside must
    /// have a non-negative amount and a non-blank category. Category groups summing to
    /// zero are dropped; the rest are ordered by total descending, then name ascending.
    /// `net_balance` is derived from the two totals, never summed on its own.
    ///
    /// No matching records is not an error: the report is all zeros with empty lists.
    pub fn aggregate(
        records: &[TransactionRecord],
        range: &DateRange,
    ) -> Result<AggregateReport, ReportError> {
        range.validate()?;

        let mut in_range: Vec<&TransactionRecord> = Vec::new();
        for (index, record) in records.iter().enumerate() {
            if !range.contains(record.date) {
                continue;
            }
            Self::validate_record(index, record)?;
            in_range.push(record);
        }

        // Stable: records sharing a timestamp keep their input order.
        in_range.sort_by_key(|r| r.date);

        let (income, expense): (Vec<&TransactionRecord>, Vec<&TransactionRecord>) = in_range
            .iter()
            .copied()
            .partition(|r| r.kind == TransactionType::Income);

        let total_income = Self::checked_total(TransactionType::Income, &income)?;
        let total_expense = Self::checked_total(TransactionType::Expense, &expense)?;

        let report = AggregateReport {
            period: *range,
            total_income,
            total_expense,
            net_balance: total_income - total_expense,
            transaction_count: in_range.len(),
            income_count: income.len(),
            expense_count: expense.len(),
            income_by_category: Self::group_by_category(TransactionType::Income, &income)?,
            expense_by_category: Self::group_by_category(TransactionType::Expense, &expense)?,
            transactions: in_range.into_iter().cloned().collect(),
        };

        debug!(
            period = %range,
            transactions = report.transaction_count,
            income_categories = report.income_by_category.len(),
            expense_categories = report.expense_by_category.len(),
            "aggregated transactions"
        );

        Ok(report)
    }

    fn validate_record(index: usize, record: &TransactionRecord) -> Result<(), ReportError> {
        if record.amount.is_sign_negative() && !record.amount.is_zero() {
            warn!(index, amount = %record.amount, "rejecting negative amount");
            return Err(ReportError::NegativeAmount {
                index,
                amount: record.amount,
            });
        }
        if record.category_key().is_empty() {
            warn!(index, "rejecting blank category");
            return Err(ReportError::EmptyCategory { index });
        }
        Ok(())
    }

    fn checked_total(
        kind: TransactionType,
        records: &[&TransactionRecord],
    ) -> Result<Decimal, ReportError> {
        records
            .iter()
            .try_fold(Decimal::ZERO, |acc, r| acc.checked_add(r.amount))
            .ok_or_else(|| {
                warn!(%kind, "amount total overflow");
                ReportError::AmountOverflow(kind)
            })
    }

    fn group_by_category(
        kind: TransactionType,
        records: &[&TransactionRecord],
    ) -> Result<Vec<CategoryTotal>, ReportError> {
        let mut groups: BTreeMap<&str, (Decimal, usize)> = BTreeMap::new();
        for record in records {
            let entry = groups.entry(record.category_key()).or_default();
            entry.0 = entry
                .0
                .checked_add(record.amount)
                .ok_or(ReportError::AmountOverflow(kind))?;
            entry.1 += 1;
        }

        // BTreeMap yields names ascending; the stable sort keeps that order among ties.
        let mut totals: Vec<(&str, Decimal, usize)> = groups
            .into_iter()
            .filter(|(_, (total, _))| !total.is_zero())
            .map(|(category, (total, count))| (category, total, count))
            .collect();
        totals.sort_by(|a, b| b.1.cmp(&a.1));

        let weights: Vec<Decimal> = totals.iter().map(|t| t.1).collect();
        let shares = percent_shares(&weights).ok_or(ReportError::AmountOverflow(kind))?;

        Ok(totals
            .into_iter()
            .zip(shares)
            .map(|((category, total, count), share_percent)| CategoryTotal {
                category: category.to_string(),
                total,
                share_percent,
                count,
            })
            .collect())
    }
}
