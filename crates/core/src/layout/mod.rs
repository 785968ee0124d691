//! Multi-up page composition.
//!
//! This module places rendered visual units onto physical pages:
//! - Page geometry: splitting an output target into equal cells
//! - Compositor: replicating one snapshot, or placing a batch of snapshots, into those cells

pub mod compositor;
pub mod error;
pub mod geometry;

#[cfg(test)]
mod geometry_props;

pub use compositor::{ComposedPage, MultiUpCompositor, PageStream, Placement, RenderedUnit};
pub use error::LayoutError;
pub use geometry::{CellRect, LayoutCode, Orientation, OutputTarget, PageGeometry, TargetKind};
