//! Layout error types.

use rust_decimal::Decimal;
use tessera_shared::AppError;
use thiserror::Error;

/// Errors that can occur while resolving page geometry or composing pages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// Layout code is not one of the supported cell counts.
    #[error("Unsupported layout code: {0} (expected one of 1, 2, 4, 8, 9)")]
    UnsupportedLayout(String),

    /// Output target has a non-positive dimension.
    #[error("Degenerate output target: {width} x {height}")]
    DegenerateTarget {
        /// Page width.
        width: Decimal,
        /// Page height.
        height: Decimal,
    },

    /// A batch page holds the wrong number of snapshots for the layout.
    #[error("Page {page} holds {actual} snapshots, layout expects {expected}")]
    SnapshotCountMismatch {
        /// Zero-based page index within the batch.
        page: usize,
        /// Cells per page for the layout.
        expected: usize,
        /// Snapshots supplied for that page.
        actual: usize,
    },

    /// Raster buffer length does not match the declared pixel dimensions.
    #[error("Snapshot '{name}' has {actual} bytes, expected {expected}")]
    MalformedSnapshot {
        /// Snapshot name.
        name: String,
        /// Byte length implied by width x height x 3.
        expected: usize,
        /// Byte length supplied.
        actual: usize,
    },
}

impl From<LayoutError> for AppError {
    fn from(err: LayoutError) -> Self {
        Self::Validation(err.to_string())
    }
}
