//! Spreadsheet workbook rendering.
//!
//! One sheet per logical section, no pagination. Cells stay typed: the XLSX writer keeps
//! amounts, shares and counts numeric, and the CSV export writes them as plain decimal
//! strings.

use std::io::Write;

use csv::WriterBuilder;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{ColNum, Format, RowNum, Worksheet, XlsxError};
use serde::Serialize;
use tracing::debug;

use super::error::RenderError;
use crate::reports::paginator::{
    category_header, category_rows, summary_header, summary_rows, transaction_header,
    transaction_row,
};
use crate::reports::{AggregateReport, Cell, Row, TransactionType};

/// Name of the transactions sheet.
pub const TRANSACTIONS_SHEET: &str = "Transactions";
/// Name of the summary sheet.
pub const SUMMARY_SHEET: &str = "Summary";
/// Name of the category breakdown sheet.
pub const CATEGORY_SHEET: &str = "Category Analysis";

/// A single worksheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sheet {
    /// Sheet tab name.
    pub name: String,
    /// Column titles.
    pub header: Vec<String>,
    /// Every row of the section.
    pub rows: Vec<Row>,
}

impl Sheet {
    /// Writes the sheet as CSV: header row, then one record per row.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), RenderError> {
        let mut wrt = WriterBuilder::new().from_writer(writer);
        wrt.write_record(&self.header)?;
        for row in &self.rows {
            wrt.write_record(row.iter().map(csv_field))?;
        }
        wrt.flush()?;
        Ok(())
    }
}

fn csv_field(cell: &Cell) -> String {
    match cell {
        Cell::Text(text) => text.clone(),
        Cell::Date(date) => date.format("%Y-%m-%d").to_string(),
        Cell::Amount(amount) | Cell::Percent(amount) => amount.to_string(),
        Cell::Count(count) => count.to_string(),
    }
}

/// Multi-sheet workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Workbook {
    /// Sheets in tab order.
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Builds the Transactions, Summary and Category Analysis sheets.
    #[must_use]
    pub fn build(report: &AggregateReport) -> Self {
        let mut categories = category_rows(report, TransactionType::Income);
        categories.extend(category_rows(report, TransactionType::Expense));

        let sheets = vec![
            Sheet {
                name: TRANSACTIONS_SHEET.to_string(),
                header: transaction_header(),
                rows: report.transactions.iter().map(transaction_row).collect(),
            },
            Sheet {
                name: SUMMARY_SHEET.to_string(),
                header: summary_header(),
                rows: summary_rows(report),
            },
            Sheet {
                name: CATEGORY_SHEET.to_string(),
                header: category_header(),
                rows: categories,
            },
        ];

        debug!(
            transactions = sheets[0].rows.len(),
            categories = sheets[2].rows.len(),
            "built workbook"
        );

        Self { sheets }
    }

    /// Looks a sheet up by tab name.
    #[must_use]
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Writes the workbook as an `.xlsx` file, one worksheet per sheet in tab order.
    pub fn write_xlsx<W: Write>(&self, mut writer: W) -> Result<(), RenderError> {
        let mut book = rust_xlsxwriter::Workbook::new();
        let bold = Format::new().set_bold();

        for sheet in &self.sheets {
            let worksheet = book.add_worksheet();
            worksheet.set_name(sheet.name.as_str())?;
            for (col, title) in sheet.header.iter().enumerate() {
                worksheet.write_string_with_format(0, col_num(col)?, title.as_str(), &bold)?;
            }
            for (index, row) in sheet.rows.iter().enumerate() {
                let line = row_num(index + 1)?;
                for (col, cell) in row.iter().enumerate() {
                    write_cell(worksheet, line, col_num(col)?, cell)?;
                }
            }
        }

        let bytes = book.save_to_buffer()?;
        writer.write_all(&bytes)?;
        debug!(sheets = self.sheets.len(), bytes = bytes.len(), "wrote xlsx workbook");
        Ok(())
    }
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: RowNum,
    col: ColNum,
    cell: &Cell,
) -> Result<(), XlsxError> {
    match cell {
        Cell::Text(text) => worksheet.write_string(row, col, text.as_str())?,
        Cell::Date(date) => worksheet.write_string(row, col, date.format("%Y-%m-%d").to_string())?,
        Cell::Amount(value) | Cell::Percent(value) => {
            worksheet.write_number(row, col, xlsx_number(*value)?)?
        }
        Cell::Count(count) => worksheet.write_number(row, col, xlsx_number(Decimal::from(*count))?)?,
    };
    Ok(())
}

fn xlsx_number(value: Decimal) -> Result<f64, XlsxError> {
    value
        .to_f64()
        .ok_or_else(|| XlsxError::ParameterError(format!("{value} is not representable")))
}

fn row_num(index: usize) -> Result<RowNum, XlsxError> {
    RowNum::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)
}

fn col_num(index: usize) -> Result<ColNum, XlsxError> {
    ColNum::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::{DateRange, TransactionAggregator, TransactionRecord};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn report() -> AggregateReport {
        let day = |d: u32| {
            NaiveDate::from_ymd_opt(2024, 3, d)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap()
        };
        let mut tuition = TransactionRecord::new(day(1), TransactionType::Income, "Tuition", dec!(500));
        tuition.description = "Tuition, March".to_string();
        let records = vec![
            tuition,
            TransactionRecord::new(day(2), TransactionType::Income, "Tuition", dec!(800)),
            TransactionRecord::new(day(4), TransactionType::Expense, "Rent", dec!(200)),
        ];
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
        .unwrap();
        TransactionAggregator::aggregate(&records, &range).unwrap()
    }

    #[test]
    fn test_workbook_has_three_sheets_in_order() {
        let workbook = Workbook::build(&report());
        let names: Vec<&str> = workbook.sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Transactions", "Summary", "Category Analysis"]);
        assert_eq!(workbook.sheet(TRANSACTIONS_SHEET).unwrap().rows.len(), 3);
        assert_eq!(workbook.sheet(SUMMARY_SHEET).unwrap().rows.len(), 6);
        assert_eq!(workbook.sheet(CATEGORY_SHEET).unwrap().rows.len(), 2);
        assert!(workbook.sheet("Budget").is_none());
    }

    #[test]
    fn test_transactions_sheet_is_not_paginated() {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let records: Vec<TransactionRecord> = (0..120)
            .map(|i| {
                TransactionRecord::new(
                    (base + chrono::Days::new(i)).and_hms_opt(9, 0, 0).unwrap(),
                    TransactionType::Expense,
                    "Utilities",
                    dec!(1),
                )
            })
            .collect();
        let range = DateRange::new(base, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()).unwrap();
        let report = TransactionAggregator::aggregate(&records, &range).unwrap();

        let workbook = Workbook::build(&report);
        assert_eq!(workbook.sheet(TRANSACTIONS_SHEET).unwrap().rows.len(), 120);
    }

    #[test]
    fn test_write_csv_summary() {
        let workbook = Workbook::build(&report());
        let mut out = Vec::new();
        workbook.sheet(SUMMARY_SHEET).unwrap().write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Metric,Value");
        assert_eq!(lines[1], "Total Income,1300");
        assert_eq!(lines[3], "Net Balance,1100");
        assert_eq!(lines[4], "Transactions,3");
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn test_write_csv_quotes_embedded_commas() {
        let workbook = Workbook::build(&report());
        let mut out = Vec::new();
        workbook
            .sheet(TRANSACTIONS_SHEET)
            .unwrap()
            .write_csv(&mut out)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text.lines().nth(1).unwrap(),
            "2024-03-01,income,Tuition,\"Tuition, March\",,,500"
        );
    }

    fn contains(haystack: &[u8], needle: &str) -> bool {
        haystack
            .windows(needle.len())
            .any(|w| w == needle.as_bytes())
    }

    #[test]
    fn test_write_xlsx_emits_one_worksheet_per_sheet() {
        let workbook = Workbook::build(&report());
        let mut out = Vec::new();
        workbook.write_xlsx(&mut out).unwrap();

        // XLSX is a zip package; entry names sit uncompressed in the local headers.
        assert!(out.starts_with(b"PK"));
        assert!(contains(&out, "xl/workbook.xml"));
        assert!(contains(&out, "xl/worksheets/sheet1.xml"));
        assert!(contains(&out, "xl/worksheets/sheet3.xml"));
        assert!(!contains(&out, "xl/worksheets/sheet4.xml"));
    }

    #[test]
    fn test_write_xlsx_of_empty_report() {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let report =
            TransactionAggregator::aggregate(&[], &DateRange::single_day(base)).unwrap();
        let mut out = Vec::new();
        Workbook::build(&report).write_xlsx(&mut out).unwrap();
        assert!(contains(&out, "xl/worksheets/sheet3.xml"));
    }

    #[test]
    fn test_xlsx_numbers_keep_their_value() {
        assert_eq!(xlsx_number(dec!(1300.25)).unwrap().to_string(), "1300.25");
        assert_eq!(xlsx_number(Decimal::from(3_usize)).unwrap().to_string(), "3");
    }
}
