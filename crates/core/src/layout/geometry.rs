//! Page geometry: output targets, layout codes, and cell rectangles.
//!
//! All dimensions are millimetres held as `Decimal`. Cell edges are rounded to
//! [`GEOMETRY_SCALE`] decimal places and every cell extent is the difference of two
//! consecutive edges, so the cells of a page always sum back to the page exactly.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LayoutError;

/// Decimal places kept for cell edges (0.1 µm).
pub const GEOMETRY_SCALE: u32 = 4;

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Height is the longer side.
    Portrait,
    /// Width is the longer side.
    Landscape,
}

/// Document types with a fixed physical output size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetKind {
    /// ISO/IEC 7810 ID-1 card, 85.6 x 53.98 mm, landscape.
    CreditCard,
    /// Portrait identity card, 85 x 110 mm.
    PortraitId,
    /// Landscape identity card, 110 x 85 mm.
    LandscapeId,
    /// ISO 216 A4 sheet, 210 x 297 mm, portrait.
    A4,
}

impl TargetKind {
    /// All supported target kinds.
    pub const ALL: [Self; 4] = [Self::CreditCard, Self::PortraitId, Self::LandscapeId, Self::A4];

    /// Returns the canonical string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreditCard => "credit-card",
            Self::PortraitId => "portrait-id",
            Self::LandscapeId => "landscape-id",
            Self::A4 => "a4",
        }
    }
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "credit-card" => Ok(Self::CreditCard),
            "portrait-id" => Ok(Self::PortraitId),
            "landscape-id" => Ok(Self::LandscapeId),
            "a4" => Ok(Self::A4),
            _ => Err(format!("Unknown output target: {s}")),
        }
    }
}

/// Physical page size and orientation used for composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputTarget {
    /// Sheet width in millimetres, as supplied.
    pub physical_width: Decimal,
    /// Sheet height in millimetres, as supplied.
    pub physical_height: Decimal,
    /// Orientation the sheet is printed in.
    pub orientation: Orientation,
}

impl OutputTarget {
    /// Creates an output target. Dimensions are validated when resolved.
    #[must_use]
    pub const fn new(physical_width: Decimal, physical_height: Decimal, orientation: Orientation) -> Self {
        Self {
            physical_width,
            physical_height,
            orientation,
        }
    }

    /// Returns the output target for a known document type.
    #[must_use]
    pub fn preset(kind: TargetKind) -> Self {
        match kind {
            TargetKind::CreditCard => {
                Self::new(Decimal::new(856, 1), Decimal::new(5398, 2), Orientation::Landscape)
            }
            TargetKind::PortraitId => {
                Self::new(Decimal::from(85), Decimal::from(110), Orientation::Portrait)
            }
            TargetKind::LandscapeId => {
                Self::new(Decimal::from(110), Decimal::from(85), Orientation::Landscape)
            }
            TargetKind::A4 => Self::new(Decimal::from(210), Decimal::from(297), Orientation::Portrait),
        }
    }

    /// Returns `(width, height)` of the page as printed.
    ///
    /// Portrait puts the longer side vertically, landscape horizontally.
    #[must_use]
    pub fn page_size(&self) -> (Decimal, Decimal) {
        let short = self.physical_width.min(self.physical_height);
        let long = self.physical_width.max(self.physical_height);
        match self.orientation {
            Orientation::Portrait => (short, long),
            Orientation::Landscape => (long, short),
        }
    }

    /// Returns the printed page area.
    #[must_use]
    pub fn area(&self) -> Decimal {
        let (width, height) = self.page_size();
        width * height
    }

    fn validate(&self) -> Result<(), LayoutError> {
        if self.physical_width <= Decimal::ZERO || self.physical_height <= Decimal::ZERO {
            return Err(LayoutError::DegenerateTarget {
                width: self.physical_width,
                height: self.physical_height,
            });
        }
        Ok(())
    }
}

/// Number of copies tiled onto one physical page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum LayoutCode {
    /// Full page.
    One,
    /// Two halves along the longer axis.
    Two,
    /// 2 x 2 grid.
    Four,
    /// 2 columns x 4 rows.
    Eight,
    /// 3 x 3 grid.
    Nine,
}

impl LayoutCode {
    /// All supported layout codes.
    pub const ALL: [Self; 5] = [Self::One, Self::Two, Self::Four, Self::Eight, Self::Nine];

    /// Returns the number of cells per page.
    #[must_use]
    pub const fn cells(self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Four => 4,
            Self::Eight => 8,
            Self::Nine => 9,
        }
    }

    /// Returns `(columns, rows)` for a page of the given size.
    #[must_use]
    pub fn grid(self, width: Decimal, height: Decimal) -> (u32, u32) {
        match self {
            Self::One => (1, 1),
            Self::Two if height > width => (1, 2),
            Self::Two => (2, 1),
            Self::Four => (2, 2),
            Self::Eight => (2, 4),
            Self::Nine => (3, 3),
        }
    }
}

impl From<LayoutCode> for u8 {
    fn from(code: LayoutCode) -> Self {
        match code {
            LayoutCode::One => 1,
            LayoutCode::Two => 2,
            LayoutCode::Four => 4,
            LayoutCode::Eight => 8,
            LayoutCode::Nine => 9,
        }
    }
}

impl TryFrom<u8> for LayoutCode {
    type Error = LayoutError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            4 => Ok(Self::Four),
            8 => Ok(Self::Eight),
            9 => Ok(Self::Nine),
            other => Err(LayoutError::UnsupportedLayout(other.to_string())),
        }
    }
}

impl FromStr for LayoutCode {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .map_err(|_| LayoutError::UnsupportedLayout(s.to_string()))
            .and_then(Self::try_from)
    }
}

impl std::fmt::Display for LayoutCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// One cell of a page, origin at the top-left corner, y growing downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRect {
    /// Left edge.
    pub x: Decimal,
    /// Top edge.
    pub y: Decimal,
    /// Width.
    pub width: Decimal,
    /// Height.
    pub height: Decimal,
}

impl CellRect {
    /// Returns the right edge.
    #[must_use]
    pub fn right(&self) -> Decimal {
        self.x + self.width
    }

    /// Returns the bottom edge.
    #[must_use]
    pub fn bottom(&self) -> Decimal {
        self.y + self.height
    }

    /// Returns the cell area.
    #[must_use]
    pub fn area(&self) -> Decimal {
        self.width * self.height
    }

    /// Returns the area shared with another cell (zero when they only touch).
    #[must_use]
    pub fn intersection_area(&self, other: &Self) -> Decimal {
        let overlap_w = self.right().min(other.right()) - self.x.max(other.x);
        let overlap_h = self.bottom().min(other.bottom()) - self.y.max(other.y);
        if overlap_w <= Decimal::ZERO || overlap_h <= Decimal::ZERO {
            Decimal::ZERO
        } else {
            overlap_w * overlap_h
        }
    }
}

/// Resolves output targets into cell rectangles.
pub struct PageGeometry;

impl PageGeometry {
    /// Splits the printed page into `layout.cells()` equal cells.
    ///
    /// Cells are returned in row-major order: left to right, then top to bottom.
    /// Callers map data index `i` to cell `i`.
    pub fn resolve(target: &OutputTarget, layout: LayoutCode) -> Result<Vec<CellRect>, LayoutError> {
        target.validate()?;

        let (width, height) = target.page_size();
        let (columns, rows) = layout.grid(width, height);
        let x_edges = edges(width, columns);
        let y_edges = edges(height, rows);

        let mut cells = Vec::with_capacity(layout.cells());
        for row in y_edges.windows(2) {
            for column in x_edges.windows(2) {
                cells.push(CellRect {
                    x: column[0],
                    y: row[0],
                    width: column[1] - column[0],
                    height: row[1] - row[0],
                });
            }
        }

        debug_assert_eq!(cells.len(), layout.cells());
        Ok(cells)
    }
}

/// Returns `parts + 1` edges from 0 to `extent`, pinned at both ends.
fn edges(extent: Decimal, parts: u32) -> Vec<Decimal> {
    let divisor = Decimal::from(parts);
    (0..=parts)
        .map(|i| match i {
            0 => Decimal::ZERO,
            i if i == parts => extent,
            i => (extent * Decimal::from(i) / divisor).round_dp(GEOMETRY_SCALE),
        })
        .collect()
}
