//! Multi-up compositor: places rendered units into page cells.
//!
//! Two batch semantics are supported and kept separate:
//! - [`MultiUpCompositor::compose`] replicates one snapshot into every cell of a single page
//!   ("render once, print many copies").
//! - [`MultiUpCompositor::compose_many`] / [`MultiUpCompositor::compose_pages`] place one
//!   distinct snapshot per cell ("render many entities, print one each"). The caller renders a
//!   fresh snapshot per entity; the compositor never personalizes cells itself.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, warn};

use super::error::LayoutError;
use super::geometry::{CellRect, LayoutCode, OutputTarget, PageGeometry};

/// An already-rendered visual unit (ID card, form, testimonial) as an RGB raster.
///
/// The compositor treats it as opaque; only the PDF writer reads the pixels.
/// Cloning shares the raster.
#[derive(Clone, PartialEq, Eq)]
pub struct RenderedUnit {
    name: String,
    width_px: u32,
    height_px: u32,
    pixels: Arc<[u8]>,
}

impl RenderedUnit {
    /// Wraps an 8-bit RGB raster (row-major, 3 bytes per pixel).
    pub fn from_rgb(
        name: impl Into<String>,
        width_px: u32,
        height_px: u32,
        pixels: impl Into<Arc<[u8]>>,
    ) -> Result<Self, LayoutError> {
        let name = name.into();
        let pixels = pixels.into();
        let expected = (width_px as usize)
            .checked_mul(height_px as usize)
            .and_then(|n| n.checked_mul(3));

        if expected.is_none_or(|n| n == 0 || n != pixels.len()) {
            return Err(LayoutError::MalformedSnapshot {
                name,
                // Saturates when width x height x 3 overflows usize.
                expected: expected.unwrap_or(usize::MAX),
                actual: pixels.len(),
            });
        }

        Ok(Self {
            name,
            width_px,
            height_px,
            pixels,
        })
    }

    /// Snapshot name, used for logging and PDF resource naming.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raster width in pixels.
    #[must_use]
    pub const fn width_px(&self) -> u32 {
        self.width_px
    }

    /// Raster height in pixels.
    #[must_use]
    pub const fn height_px(&self) -> u32 {
        self.height_px
    }

    /// Raw RGB bytes.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns true if both units point at the same raster buffer.
    #[must_use]
    pub fn shares_raster_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

impl std::fmt::Debug for RenderedUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderedUnit")
            .field("name", &self.name)
            .field("width_px", &self.width_px)
            .field("height_px", &self.height_px)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// A cell on a composed page and what occupies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Cell rectangle in page millimetres.
    pub rect: CellRect,
    /// Unit drawn in the cell; `None` leaves the cell blank.
    pub unit: Option<RenderedUnit>,
}

/// One physical page of a multi-up stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPage {
    /// Zero-based page index.
    pub index: usize,
    /// One placement per cell, in row-major order.
    pub placements: Vec<Placement>,
}

impl ComposedPage {
    /// Number of cells holding a unit.
    #[must_use]
    pub fn filled_cells(&self) -> usize {
        self.placements.iter().filter(|p| p.unit.is_some()).count()
    }
}

/// Printable page stream produced by the compositor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageStream {
    /// Output target every page is printed on.
    pub target: OutputTarget,
    /// Layout used for every page.
    pub layout: LayoutCode,
    /// Pages in print order.
    pub pages: Vec<ComposedPage>,
}

impl PageStream {
    /// Number of physical pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Places rendered units onto pages.
pub struct MultiUpCompositor;

impl MultiUpCompositor {
    /// Replicates one snapshot into every cell of a single page.
    pub fn compose(
        snapshot: &RenderedUnit,
        target: &OutputTarget,
        layout: LayoutCode,
    ) -> Result<PageStream, LayoutError> {
        let cells = PageGeometry::resolve(target, layout)?;

        let placements = cells
            .into_iter()
            .map(|rect| Placement {
                rect,
                unit: Some(snapshot.clone()),
            })
            .collect();

        debug!(snapshot = snapshot.name(), layout = %layout, "replicated snapshot");

        Ok(PageStream {
            target: *target,
            layout,
            pages: vec![ComposedPage {
                index: 0,
                placements,
            }],
        })
    }

    /// Places distinct snapshots one per cell, filling pages in order.
    ///
    /// Every page but the last is full; the last may be partial, its trailing cells blank.
    pub fn compose_many(
        snapshots: &[RenderedUnit],
        target: &OutputTarget,
        layout: LayoutCode,
    ) -> Result<PageStream, LayoutError> {
        let sheets: Vec<Vec<RenderedUnit>> = snapshots
            .chunks(layout.cells())
            .map(<[RenderedUnit]>::to_vec)
            .collect();

        Self::compose_pages(&sheets, target, layout)
    }

    /// Places pre-grouped snapshots, one group per page.
    ///
    /// Each group but the last must hold exactly `layout.cells()` snapshots; the last
    /// must hold between one and `layout.cells()`. An empty batch is rejected.
    pub fn compose_pages(
        sheets: &[Vec<RenderedUnit>],
        target: &OutputTarget,
        layout: LayoutCode,
    ) -> Result<PageStream, LayoutError> {
        let cells = PageGeometry::resolve(target, layout)?;
        let expected = cells.len();

        if sheets.is_empty() {
            warn!(layout = %layout, "empty snapshot batch");
            return Err(LayoutError::SnapshotCountMismatch {
                page: 0,
                expected,
                actual: 0,
            });
        }

        let last = sheets.len() - 1;
        for (page, sheet) in sheets.iter().enumerate() {
            let valid = if page == last {
                (1..=expected).contains(&sheet.len())
            } else {
                sheet.len() == expected
            };
            if !valid {
                warn!(page, expected, actual = sheet.len(), "snapshot count mismatch");
                return Err(LayoutError::SnapshotCountMismatch {
                    page,
                    expected,
                    actual: sheet.len(),
                });
            }
        }

        let pages: Vec<ComposedPage> = sheets
            .par_iter()
            .enumerate()
            .map(|(index, sheet)| ComposedPage {
                index,
                placements: cells
                    .iter()
                    .enumerate()
                    .map(|(slot, rect)| Placement {
                        rect: *rect,
                        unit: sheet.get(slot).cloned(),
                    })
                    .collect(),
            })
            .collect();

        debug!(pages = pages.len(), layout = %layout, "composed snapshot batch");

        Ok(PageStream {
            target: *target,
            layout,
            pages,
        })
    }
}
