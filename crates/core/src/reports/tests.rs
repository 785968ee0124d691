//! Property-based tests for reports module.

use chrono::{Days, NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::aggregator::TransactionAggregator;
use super::paginator::{ReportType, TabularReportPaginator, transaction_row};
use super::types::{DateRange, TransactionRecord, TransactionType};

const CATEGORIES: [&str; 5] = ["Tuition", "Rent", "Books", "Donation", "Utilities"];

fn base_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// Strategy to generate an amount from 0.00 to 100,000.00.
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn timestamp() -> impl Strategy<Value = NaiveDateTime> {
    (0u64..366, 0u32..24).prop_map(|(offset, hour)| {
        (base_day() + Days::new(offset))
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    })
}

fn record() -> impl Strategy<Value = TransactionRecord> {
    (
        timestamp(),
        prop_oneof![Just(TransactionType::Income), Just(TransactionType::Expense)],
        prop::sample::select(CATEGORIES.to_vec()),
        amount(),
    )
        .prop_map(|(date, kind, category, amount)| {
            TransactionRecord::new(date, kind, category, amount)
        })
}

fn range() -> impl Strategy<Value = DateRange> {
    (0u64..366, 0u64..366).prop_map(|(a, b)| {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        DateRange::new(base_day() + Days::new(lo), base_day() + Days::new(hi)).unwrap()
    })
}

fn report_type() -> impl Strategy<Value = ReportType> {
    prop::sample::select(ReportType::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: Aggregate Consistency
    /// Category totals add up to partition totals and net balance is their difference.
    #[test]
    fn prop_aggregate_consistency(
        records in prop::collection::vec(record(), 0..60),
        range in range(),
    ) {
        let report = TransactionAggregator::aggregate(&records, &range).unwrap();

        let income_sum: Decimal = report.income_by_category.iter().map(|c| c.total).sum();
        let expense_sum: Decimal = report.expense_by_category.iter().map(|c| c.total).sum();
        prop_assert_eq!(income_sum, report.total_income);
        prop_assert_eq!(expense_sum, report.total_expense);
        prop_assert_eq!(report.net_balance, report.total_income - report.total_expense);

        let in_range = records.iter().filter(|r| range.contains(r.date)).count();
        prop_assert_eq!(report.transaction_count, in_range);
        prop_assert_eq!(report.income_count + report.expense_count, in_range);

        for category in report.income_by_category.iter().chain(&report.expense_by_category) {
            prop_assert!(category.total > Decimal::ZERO);
        }
    }

    /// Property: Category Shares Sum To 100
    #[test]
    fn prop_category_shares_sum_to_hundred(
        records in prop::collection::vec(record(), 1..60),
    ) {
        let all_year = DateRange::new(base_day(), base_day() + Days::new(365)).unwrap();
        let report = TransactionAggregator::aggregate(&records, &all_year).unwrap();

        for categories in [&report.income_by_category, &report.expense_by_category] {
            if !categories.is_empty() {
                let shares: Decimal = categories.iter().map(|c| c.share_percent).sum();
                prop_assert_eq!(shares, Decimal::ONE_HUNDRED);
            }
        }
    }

    /// Property: Category Ordering
    /// Totals descending, names ascending among equal totals.
    #[test]
    fn prop_categories_ordered(
        records in prop::collection::vec(record(), 0..60),
    ) {
        let all_year = DateRange::new(base_day(), base_day() + Days::new(365)).unwrap();
        let report = TransactionAggregator::aggregate(&records, &all_year).unwrap();

        for pair in report.expense_by_category.windows(2) {
            prop_assert!(
                pair[0].total > pair[1].total
                    || (pair[0].total == pair[1].total && pair[0].category < pair[1].category)
            );
        }
    }

    /// Property: Pagination Row Integrity
    /// Concatenating body rows reproduces the detailed rows in order, over ceil(n / k) pages.
    #[test]
    fn prop_pagination_row_integrity(
        records in prop::collection::vec(record(), 1..120),
        rows_per_page in 1usize..30,
    ) {
        let all_year = DateRange::new(base_day(), base_day() + Days::new(365)).unwrap();
        let report = TransactionAggregator::aggregate(&records, &all_year).unwrap();

        let pages = TabularReportPaginator::paginate(&report, ReportType::Detailed, rows_per_page)
            .unwrap();

        let expected: Vec<_> = report.transactions.iter().map(transaction_row).collect();
        let concatenated: Vec<_> = pages.iter().flat_map(|p| p.body_rows.clone()).collect();
        prop_assert_eq!(concatenated, expected);
        prop_assert_eq!(pages.len(), report.transactions.len().div_ceil(rows_per_page));

        for page in &pages {
            prop_assert!(page.body_rows.len() <= rows_per_page);
            prop_assert!(!page.body_rows.is_empty());
            prop_assert_eq!(&page.header_row, &pages[0].header_row);
        }
    }

    /// Property: Chronological Detail
    #[test]
    fn prop_detail_rows_chronological(
        records in prop::collection::vec(record(), 0..60),
        range in range(),
    ) {
        let report = TransactionAggregator::aggregate(&records, &range).unwrap();
        for pair in report.transactions.windows(2) {
            prop_assert!(pair[0].date <= pair[1].date);
        }
    }

    /// Property: Idempotence
    /// Aggregating and paginating twice with identical inputs gives equal output.
    #[test]
    fn prop_aggregate_then_paginate_idempotent(
        records in prop::collection::vec(record(), 0..60),
        range in range(),
        report_type in report_type(),
        rows_per_page in 1usize..20,
    ) {
        let first = TransactionAggregator::aggregate(&records, &range).unwrap();
        let second = TransactionAggregator::aggregate(&records, &range).unwrap();
        prop_assert_eq!(&first, &second);

        prop_assert_eq!(
            TabularReportPaginator::paginate(&first, report_type, rows_per_page).unwrap(),
            TabularReportPaginator::paginate(&second, report_type, rows_per_page).unwrap()
        );
    }
}
