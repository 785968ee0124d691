//! Artifact file names. Each name encodes the report period.

use crate::reports::DateRange;

/// `financial-report-<start>-to-<end>.pdf`
#[must_use]
pub fn pdf_file_name(period: &DateRange) -> String {
    format!("financial-report-{}-to-{}.pdf", period.start, period.end)
}

/// `Financial_Report_<start>_to_<end>.xlsx`
#[must_use]
pub fn workbook_file_name(period: &DateRange) -> String {
    format!("Financial_Report_{}_to_{}.xlsx", period.start, period.end)
}

/// `financial-report-<start>-to-<end>.json`
#[must_use]
pub fn view_file_name(period: &DateRange) -> String {
    format!("financial-report-{}-to-{}.json", period.start, period.end)
}

/// `Financial_Report_<start>_to_<end>_<Sheet>.csv`, spaces in the sheet name become `_`.
#[must_use]
pub fn sheet_csv_file_name(period: &DateRange, sheet: &str) -> String {
    format!(
        "Financial_Report_{}_to_{}_{}.csv",
        period.start,
        period.end,
        sheet.replace(' ', "_")
    )
}
