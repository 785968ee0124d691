//! Report rendering.
//!
//! Every renderer consumes the same [`AggregateReport`] and [`ReportPage`] values; none of
//! them recomputes totals. This module provides:
//! - Print: physical pages of draw instructions, serialized to PDF by [`pdf`]
//! - Workbook: one sheet per section, exported sheet by sheet as CSV
//! - View model: a serializable pass-through for on-screen preview

pub mod error;
pub mod naming;
pub mod pdf;
pub mod print;
pub mod view;
pub mod workbook;

use rust_decimal::Decimal;
use tessera_shared::types::{Currency, Money};
use tracing::debug;

use crate::reports::{AggregateReport, Cell, ReportPage};

pub use error::RenderError;
pub use print::{DrawInstruction, PrintOptions, PrintPage, PrintStream};
pub use view::{ReportViewModel, ViewPage, ViewTotals};
pub use workbook::{Sheet, Workbook};

const POINTS_PER_INCH: Decimal = Decimal::from_parts(72, 0, 0, false, 0);
const MM_PER_INCH: Decimal = Decimal::from_parts(254, 0, 0, false, 1);

/// Converts millimetres to PDF points.
#[must_use]
pub fn mm_to_pt(mm: Decimal) -> Decimal {
    mm * POINTS_PER_INCH / MM_PER_INCH
}

/// Converts PDF points to millimetres.
#[must_use]
pub fn pt_to_mm(pt: Decimal) -> Decimal {
    pt * MM_PER_INCH / POINTS_PER_INCH
}

/// Display text for a table cell.
#[must_use]
pub fn format_cell(cell: &Cell, currency: Currency) -> String {
    match cell {
        Cell::Text(text) => text.clone(),
        Cell::Date(date) => date.format("%Y-%m-%d").to_string(),
        Cell::Amount(amount) => Money::new(*amount, currency).to_grouped_string(),
        Cell::Percent(percent) => format!("{percent:.2}%"),
        Cell::Count(count) => count.to_string(),
    }
}

/// Which artifact to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputStyle {
    /// Print-ready page stream.
    Print(PrintOptions),
    /// Multi-sheet workbook.
    Workbook,
    /// On-screen view model, amounts formatted in the given currency.
    View(Currency),
}

/// A rendered artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// Print-ready page stream.
    Print(PrintStream),
    /// Multi-sheet workbook.
    Workbook(Workbook),
    /// On-screen view model.
    View(ReportViewModel),
}

/// Drives aggregate and paginated data into concrete renderings.
pub struct ReportFormatter;

impl ReportFormatter {
    /// Renders one artifact from the shared report model.
    pub fn format(
        report: &AggregateReport,
        pages: &[ReportPage],
        style: &OutputStyle,
    ) -> Result<Rendered, RenderError> {
        debug!(pages = pages.len(), style = style_name(style), "formatting report");
        match style {
            OutputStyle::Print(options) => print::render(report, pages, options).map(Rendered::Print),
            OutputStyle::Workbook => Ok(Rendered::Workbook(Workbook::build(report))),
            OutputStyle::View(currency) => Ok(Rendered::View(ReportViewModel::new(
                report, pages, *currency,
            ))),
        }
    }
}

const fn style_name(style: &OutputStyle) -> &'static str {
    match style {
        OutputStyle::Print(_) => "print",
        OutputStyle::Workbook => "workbook",
        OutputStyle::View(_) => "view",
    }
}
