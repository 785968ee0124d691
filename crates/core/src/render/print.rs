//! Print rendering: report sections laid onto physical pages.
//!
//! The paginator bounds how many rows a logical page holds. This renderer adds a second,
//! coarser pagination on top: a vertical draw cursor walks down each physical page, and a
//! section that cannot fit its title, header and first row starts on a fresh page. Rows are
//! never split; a row that does not fit moves to the next page under a redrawn header.
//!
//! Coordinates are millimetres from the top-left corner of the page; `y` is the text
//! baseline.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use tessera_shared::config::PrintConfig;
use tessera_shared::types::Currency;
use tracing::debug;

use super::error::RenderError;
use super::{format_cell, pt_to_mm};
use crate::layout::{OutputTarget, TargetKind};
use crate::reports::paginator::{category_header, category_rows, summary_header, summary_rows};
use crate::reports::{AggregateReport, ReportPage, ReportSection, Row, TransactionType};

/// Lines a table needs before its first row can be drawn: title and header.
const TABLE_LEAD_LINES: usize = 2;

/// Print layout options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintOptions {
    /// Physical page the report is printed on.
    pub target: OutputTarget,
    /// Margin on every side, in millimetres.
    pub margin_mm: Decimal,
    /// Height of one line, in millimetres.
    pub line_height_mm: Decimal,
    /// Body font size in points.
    pub font_size_pt: Decimal,
    /// Title font size in points.
    pub title_font_size_pt: Decimal,
    /// Document title.
    pub title: String,
    /// Currency used to format amounts.
    pub currency: Currency,
    /// Draw the income and expense category tables after the summary block.
    pub include_breakdown: bool,
}

impl PrintOptions {
    /// Builds A4 portrait options from configuration.
    #[must_use]
    pub fn from_config(config: &PrintConfig, currency: Currency) -> Self {
        Self {
            target: OutputTarget::preset(TargetKind::A4),
            margin_mm: config.margin_mm,
            line_height_mm: config.line_height_mm,
            font_size_pt: config.font_size_pt,
            title_font_size_pt: config.title_font_size_pt,
            title: config.title.clone(),
            currency,
            include_breakdown: true,
        }
    }

    fn validate(&self) -> Result<(), RenderError> {
        let (width, height) = self.target.page_size();
        if self.line_height_mm <= Decimal::ZERO
            || self.font_size_pt <= Decimal::ZERO
            || self.title_font_size_pt <= Decimal::ZERO
        {
            return Err(RenderError::InvalidPrintOptions(
                "line height and font sizes must be positive".to_string(),
            ));
        }
        if self.margin_mm < Decimal::ZERO || self.margin_mm * Decimal::TWO >= width {
            return Err(RenderError::InvalidPrintOptions(format!(
                "margin {}mm leaves no printable width on a {width}mm page",
                self.margin_mm
            )));
        }
        // Title, table title, header and one row must fit on an empty page.
        let minimum = self.line_height_mm * Decimal::from(TABLE_LEAD_LINES + 2);
        if height - self.margin_mm * Decimal::TWO < minimum {
            return Err(RenderError::InvalidPrintOptions(format!(
                "printable height is below the {minimum}mm needed for a table"
            )));
        }
        Ok(())
    }
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self::from_config(&PrintConfig::default(), Currency::Idr)
    }
}

/// One drawing primitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawInstruction {
    /// A single line of text.
    Text {
        /// Left edge, mm.
        x: Decimal,
        /// Baseline, mm from the top.
        y: Decimal,
        /// Font size in points.
        size_pt: Decimal,
        /// Bold face.
        bold: bool,
        /// Text to draw.
        text: String,
    },
    /// A horizontal rule.
    Rule {
        /// Left edge, mm.
        x: Decimal,
        /// Vertical position, mm from the top.
        y: Decimal,
        /// Length, mm.
        width: Decimal,
    },
}

/// One physical page of a print stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrintPage {
    /// Zero-based page index.
    pub index: usize,
    /// Drawing primitives in paint order.
    pub instructions: Vec<DrawInstruction>,
}

/// Print-ready document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrintStream {
    /// Page width, mm.
    pub page_width: Decimal,
    /// Page height, mm.
    pub page_height: Decimal,
    /// Physical pages in print order.
    pub pages: Vec<PrintPage>,
}

impl PrintStream {
    /// Number of physical pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All text drawn on a page, in paint order.
    #[must_use]
    pub fn page_text(&self, index: usize) -> Vec<&str> {
        self.pages.get(index).map_or_else(Vec::new, |page| {
            page.instructions
                .iter()
                .filter_map(|i| match i {
                    DrawInstruction::Text { text, .. } => Some(text.as_str()),
                    DrawInstruction::Rule { .. } => None,
                })
                .collect()
        })
    }
}

/// Draw cursor over a sequence of physical pages.
struct PageCursor<'a> {
    options: &'a PrintOptions,
    page_width: Decimal,
    page_height: Decimal,
    bottom: Decimal,
    y: Decimal,
    sealed: Vec<PrintPage>,
    current: Vec<DrawInstruction>,
}

impl<'a> PageCursor<'a> {
    fn new(options: &'a PrintOptions) -> Self {
        let (page_width, page_height) = options.target.page_size();
        Self {
            options,
            page_width,
            page_height,
            bottom: page_height - options.margin_mm,
            y: options.margin_mm,
            sealed: Vec::new(),
            current: Vec::new(),
        }
    }

    fn content_width(&self) -> Decimal {
        self.page_width - self.options.margin_mm * Decimal::TWO
    }

    fn fits(&self, lines: usize) -> bool {
        self.y + self.options.line_height_mm * Decimal::from(lines) <= self.bottom
    }

    fn new_page(&mut self) {
        if !self.current.is_empty() {
            let instructions = std::mem::take(&mut self.current);
            self.sealed.push(PrintPage {
                index: self.sealed.len(),
                instructions,
            });
        }
        self.y = self.options.margin_mm;
    }

    fn reserve(&mut self, lines: usize) {
        if !self.fits(lines) {
            self.new_page();
        }
    }

    fn baseline(&self) -> Decimal {
        self.y + self.options.line_height_mm * Decimal::new(7, 1)
    }

    fn text_line(&mut self, text: String, size_pt: Decimal, bold: bool) {
        self.reserve(1);
        self.current.push(DrawInstruction::Text {
            x: self.options.margin_mm,
            y: self.baseline(),
            size_pt,
            bold,
            text,
        });
        self.y += self.options.line_height_mm;
    }

    fn spacer(&mut self) {
        if self.fits(1) {
            self.y += self.options.line_height_mm;
        }
    }

    fn columns(&mut self, cells: &[String], bold: bool) {
        let count = cells.len().max(1);
        let width = self.content_width() / Decimal::from(count);
        let capacity = column_capacity(width, self.options.font_size_pt);
        let baseline = self.baseline();

        for (i, cell) in cells.iter().enumerate() {
            let x = (self.options.margin_mm + width * Decimal::from(i)).round_dp(4);
            self.current.push(DrawInstruction::Text {
                x,
                y: baseline,
                size_pt: self.options.font_size_pt,
                bold,
                text: truncate(cell, capacity),
            });
        }
        self.y += self.options.line_height_mm;
    }

    fn header(&mut self, header: &[String]) {
        self.columns(header, true);
        self.current.push(DrawInstruction::Rule {
            x: self.options.margin_mm,
            y: self.y,
            width: self.content_width(),
        });
    }

    /// Draws a titled table, keeping title, header and first row together.
    fn table(&mut self, title: &str, header: &[String], rows: &[Vec<String>]) {
        self.reserve(TABLE_LEAD_LINES + 1);
        self.text_line(title.to_string(), self.options.font_size_pt, true);
        self.header(header);

        if rows.is_empty() {
            self.text_line("No records".to_string(), self.options.font_size_pt, false);
        }
        for row in rows {
            if !self.fits(1) {
                self.new_page();
                self.header(header);
            }
            self.columns(row, false);
        }
        self.spacer();
    }

    fn finish(mut self) -> PrintStream {
        self.new_page();
        PrintStream {
            page_width: self.page_width,
            page_height: self.page_height,
            pages: self.sealed,
        }
    }
}

/// Characters that fit a column at an average glyph width of half an em.
fn column_capacity(width: Decimal, font_size_pt: Decimal) -> usize {
    let glyph = pt_to_mm(font_size_pt) / Decimal::TWO;
    if glyph <= Decimal::ZERO {
        return 0;
    }
    ((width - Decimal::ONE) / glyph)
        .floor()
        .to_usize()
        .unwrap_or(0)
}

fn truncate(text: &str, capacity: usize) -> String {
    if text.chars().count() <= capacity {
        return text.to_string();
    }
    if capacity <= 3 {
        return text.chars().take(capacity).collect();
    }
    let mut out: String = text.chars().take(capacity - 3).collect();
    out.push_str("...");
    out
}

fn format_rows(rows: &[Row], currency: Currency) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|cell| format_cell(cell, currency)).collect())
        .collect()
}

/// Lays a report out as a print stream.
///
/// Order: title block, summary block, then (with `include_breakdown`) income and expense
/// category tables, then the paginated section. Each logical page after the first starts
/// a new physical page. Summary pages are not redrawn since the summary block already
/// holds them, and category pages replace the breakdown tables.
pub fn render(
    report: &AggregateReport,
    pages: &[ReportPage],
    options: &PrintOptions,
) -> Result<PrintStream, RenderError> {
    options.validate()?;

    let currency = options.currency;
    let section = pages.first().map(|p| p.section);
    let mut cursor = PageCursor::new(options);

    cursor.text_line(options.title.clone(), options.title_font_size_pt, true);
    cursor.text_line(format!("Period: {}", report.period), options.font_size_pt, false);
    cursor.text_line(format!("Currency: {currency}"), options.font_size_pt, false);
    cursor.spacer();

    cursor.table(
        ReportSection::Summary.title(),
        &summary_header(),
        &format_rows(&summary_rows(report), currency),
    );

    if options.include_breakdown && section != Some(ReportSection::Categories) {
        for (title, kind) in [
            ("Income by Category", TransactionType::Income),
            ("Expense by Category", TransactionType::Expense),
        ] {
            cursor.table(
                title,
                &category_header(),
                &format_rows(&category_rows(report, kind), currency),
            );
        }
    }

    if let Some(section) = section.filter(|s| *s != ReportSection::Summary) {
        for (i, page) in pages.iter().enumerate() {
            let title = if i == 0 {
                section.title().to_string()
            } else {
                cursor.new_page();
                format!("{} (continued)", section.title())
            };
            cursor.table(&title, &page.header_row, &format_rows(&page.body_rows, currency));
        }
    }

    let stream = cursor.finish();
    debug!(
        logical_pages = pages.len(),
        physical_pages = stream.page_count(),
        "laid out print stream"
    );
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::{
        DateRange, ReportType, TabularReportPaginator, TransactionAggregator, TransactionRecord,
    };
    use chrono::{Days, NaiveDate};
    use rust_decimal_macros::dec;

    fn report(income: usize, expense: usize) -> AggregateReport {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut records = Vec::new();
        for i in 0..income {
            records.push(TransactionRecord::new(
                (base + Days::new(i as u64)).and_hms_opt(9, 0, 0).unwrap(),
                TransactionType::Income,
                format!("Fee {}", i % 3),
                dec!(100),
            ));
        }
        for i in 0..expense {
            records.push(TransactionRecord::new(
                (base + Days::new(i as u64)).and_hms_opt(15, 0, 0).unwrap(),
                TransactionType::Expense,
                "Supplies",
                dec!(10),
            ));
        }
        let range = DateRange::new(base, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()).unwrap();
        TransactionAggregator::aggregate(&records, &range).unwrap()
    }

    fn assert_within_margins(stream: &PrintStream, options: &PrintOptions) {
        let bottom = stream.page_height - options.margin_mm;
        for page in &stream.pages {
            for instruction in &page.instructions {
                let y = match instruction {
                    DrawInstruction::Text { y, .. } | DrawInstruction::Rule { y, .. } => *y,
                };
                assert!(y >= options.margin_mm && y <= bottom, "y {y} outside margins");
            }
        }
    }

    #[test]
    fn test_title_block_comes_first() {
        let report = report(2, 1);
        let pages = TabularReportPaginator::paginate(&report, ReportType::Summary, 25).unwrap();
        let options = PrintOptions::default();

        let stream = render(&report, &pages, &options).unwrap();

        assert_eq!(stream.page_count(), 1);
        assert_eq!(stream.page_width, dec!(210));
        assert_eq!(stream.page_height, dec!(297));
        match &stream.pages[0].instructions[0] {
            DrawInstruction::Text { text, size_pt, bold, .. } => {
                assert_eq!(text, "Financial Report");
                assert_eq!(*size_pt, dec!(16));
                assert!(*bold);
            }
            other => panic!("unexpected first instruction {other:?}"),
        }
        let text = stream.page_text(0);
        assert!(text.contains(&"Period: 2024-01-01 to 2024-12-31"));
        assert!(text.contains(&"Currency: IDR"));
    }

    #[test]
    fn test_summary_pages_not_drawn_twice() {
        let report = report(3, 3);
        let pages = TabularReportPaginator::paginate(&report, ReportType::Summary, 25).unwrap();
        let stream = render(&report, &pages, &PrintOptions::default()).unwrap();
        let occurrences = stream
            .page_text(0)
            .iter()
            .filter(|t| **t == "Total Income")
            .count();
        assert_eq!(occurrences, 1);
        assert!(stream.page_text(0).contains(&"300.00"));
    }

    #[test]
    fn test_each_logical_page_starts_new_physical_page() {
        let report = report(23, 0);
        let pages = TabularReportPaginator::paginate(&report, ReportType::Detailed, 10).unwrap();

        let stream = render(&report, &pages, &PrintOptions::default()).unwrap();

        assert_eq!(stream.page_count(), 3);
        assert!(stream.page_text(1)[0].ends_with("(continued)"));
        assert!(stream.page_text(2).contains(&"Date"));
    }

    #[test]
    fn test_rows_overflow_with_redrawn_header() {
        let report = report(90, 0);
        let pages = TabularReportPaginator::paginate(&report, ReportType::Detailed, 500).unwrap();
        let options = PrintOptions::default();

        let stream = render(&report, &pages, &options).unwrap();

        assert!(stream.page_count() >= 3);
        for index in 1..stream.page_count() {
            assert_eq!(stream.page_text(index)[0], "Date");
        }
        assert_within_margins(&stream, &options);

        // Every transaction row is drawn exactly once.
        let drawn: usize = (0..stream.page_count())
            .map(|i| stream.page_text(i).iter().filter(|t| **t == "100.00").count())
            .sum();
        assert_eq!(drawn, 90);
    }

    #[test]
    fn test_table_that_cannot_start_moves_to_next_page() {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut records: Vec<TransactionRecord> = (0..20u32)
            .map(|i| {
                TransactionRecord::new(
                    base.and_hms_opt(9, 0, 0).unwrap(),
                    TransactionType::Income,
                    format!("Fee {i:02}"),
                    Decimal::from(100 + i),
                )
            })
            .collect();
        records.push(TransactionRecord::new(
            base.and_hms_opt(10, 0, 0).unwrap(),
            TransactionType::Expense,
            "Supplies",
            dec!(10),
        ));
        let range = DateRange::new(base, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()).unwrap();
        let report = TransactionAggregator::aggregate(&records, &range).unwrap();
        let pages = TabularReportPaginator::paginate(&report, ReportType::Summary, 25).unwrap();
        let options = PrintOptions::default();

        let stream = render(&report, &pages, &options).unwrap();

        // Title block, summary and 20 income rows leave two free lines: room for the
        // expense title and header, but not its first row.
        assert_eq!(stream.page_count(), 2);
        let first = stream.page_text(0);
        assert!(first.contains(&"Income by Category"));
        assert!(first.contains(&"Fee 00"));
        assert!(!first.contains(&"Expense by Category"));

        let last_baseline = stream.pages[0]
            .instructions
            .iter()
            .filter_map(|i| match i {
                DrawInstruction::Text { y, .. } => Some(*y),
                DrawInstruction::Rule { .. } => None,
            })
            .max()
            .unwrap();
        let bottom = stream.page_height - options.margin_mm;
        assert!(last_baseline + options.line_height_mm * Decimal::TWO < bottom);

        let second = stream.page_text(1);
        assert_eq!(second[0], "Expense by Category");
        assert_eq!(second[1], "Type");
        assert!(second.contains(&"Supplies"));
    }

    #[test]
    fn test_category_pages_replace_breakdown_tables() {
        let report = report(6, 2);
        let pages = TabularReportPaginator::paginate(&report, ReportType::Category, 25).unwrap();
        let stream = render(&report, &pages, &PrintOptions::default()).unwrap();
        let text = stream.page_text(0);
        assert!(text.contains(&"Category Analysis"));
        assert!(!text.contains(&"Income by Category"));
        assert!(text.contains(&"100.00%"));
    }

    #[test]
    fn test_breakdown_can_be_disabled() {
        let report = report(6, 2);
        let pages = TabularReportPaginator::paginate(&report, ReportType::Detailed, 25).unwrap();
        let options = PrintOptions {
            include_breakdown: false,
            ..PrintOptions::default()
        };
        let stream = render(&report, &pages, &options).unwrap();
        assert!(!stream.page_text(0).contains(&"Expense by Category"));
    }

    #[test]
    fn test_empty_breakdown_marks_no_records() {
        let report = report(0, 0);
        let pages = TabularReportPaginator::paginate(&report, ReportType::Detailed, 25).unwrap();
        let stream = render(&report, &pages, &PrintOptions::default()).unwrap();
        let no_records = stream
            .page_text(0)
            .iter()
            .filter(|t| **t == "No records")
            .count();
        // Income, expense and transaction tables.
        assert_eq!(no_records, 3);
    }

    #[test]
    fn test_margin_leaving_no_room_rejected() {
        let report = report(1, 0);
        let pages = TabularReportPaginator::paginate(&report, ReportType::Detailed, 25).unwrap();
        let options = PrintOptions {
            margin_mm: dec!(105),
            ..PrintOptions::default()
        };
        assert!(matches!(
            render(&report, &pages, &options),
            Err(RenderError::InvalidPrintOptions(_))
        ));

        let options = PrintOptions {
            line_height_mm: Decimal::ZERO,
            ..PrintOptions::default()
        };
        assert!(render(&report, &pages, &options).is_err());
    }

    #[test]
    fn test_truncate_long_cells() {
        assert_eq!(truncate("Tuition", 10), "Tuition");
        assert_eq!(truncate("Quarterly maintenance", 10), "Quarter...");
        assert_eq!(truncate("abcdef", 2), "ab");
    }
}
