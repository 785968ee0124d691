//! Render error types.

use tessera_shared::AppError;
use thiserror::Error;

/// Errors that can occur while serializing an artifact.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Print options leave no room for a title line plus a table header and one row.
    #[error("Invalid print options: {0}")]
    InvalidPrintOptions(String),

    /// PDF object model or content stream failure.
    #[error("PDF error: {0}")]
    Pdf(String),

    /// CSV writer failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet writer failure.
    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Underlying writer failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Io(e) => Self::Io(e.to_string()),
            RenderError::InvalidPrintOptions(msg) => Self::Validation(msg),
            other => Self::Render(other.to_string()),
        }
    }
}
