//! Property-based tests for page geometry.
//!
//! Property: Tiling Completeness
//! For every (OutputTarget, LayoutCode) pair the resolved cells are exactly
//! `layout.cells()` rectangles that cover the page with no gap and no overlap.

use proptest::prelude::*;
use rstest::rstest;
use rust_decimal::Decimal;

use super::geometry::{CellRect, LayoutCode, Orientation, OutputTarget, PageGeometry, TargetKind};

/// Strategy to generate a positive dimension from 0.01 to 1000.00 mm.
fn dimension() -> impl Strategy<Value = Decimal> {
    (1i64..100_000i64).prop_map(|hundredths| Decimal::new(hundredths, 2))
}

fn layout_strategy() -> impl Strategy<Value = LayoutCode> {
    prop::sample::select(LayoutCode::ALL.to_vec())
}

fn orientation_strategy() -> impl Strategy<Value = Orientation> {
    prop_oneof![Just(Orientation::Portrait), Just(Orientation::Landscape)]
}

fn assert_tiles(target: &OutputTarget, layout: LayoutCode, cells: &[CellRect]) {
    let (width, height) = target.page_size();

    assert_eq!(cells.len(), layout.cells());
    let covered: Decimal = cells.iter().map(CellRect::area).sum();
    assert_eq!(covered, width * height);

    for (i, a) in cells.iter().enumerate() {
        assert!(a.x >= Decimal::ZERO && a.y >= Decimal::ZERO);
        assert!(a.right() <= width && a.bottom() <= height);
        assert!(a.width > Decimal::ZERO && a.height > Decimal::ZERO);
        for b in &cells[i + 1..] {
            assert_eq!(a.intersection_area(b), Decimal::ZERO);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_cells_tile_page_exactly(
        width in dimension(),
        height in dimension(),
        orientation in orientation_strategy(),
        layout in layout_strategy(),
    ) {
        let target = OutputTarget::new(width, height, orientation);
        let cells = PageGeometry::resolve(&target, layout).unwrap();
        assert_tiles(&target, layout, &cells);
    }

    #[test]
    fn prop_cells_are_row_major(
        width in dimension(),
        height in dimension(),
        layout in layout_strategy(),
    ) {
        let target = OutputTarget::new(width, height, Orientation::Portrait);
        let cells = PageGeometry::resolve(&target, layout).unwrap();

        for pair in cells.windows(2) {
            let same_row = pair[0].y == pair[1].y;
            if same_row {
                prop_assert!(pair[1].x > pair[0].x);
            } else {
                prop_assert!(pair[1].y > pair[0].y);
                prop_assert_eq!(pair[1].x, Decimal::ZERO);
            }
        }
    }

    #[test]
    fn prop_resolve_is_deterministic(
        width in dimension(),
        height in dimension(),
        layout in layout_strategy(),
    ) {
        let target = OutputTarget::new(width, height, Orientation::Landscape);
        prop_assert_eq!(
            PageGeometry::resolve(&target, layout),
            PageGeometry::resolve(&target, layout)
        );
    }
}

#[rstest]
fn test_presets_tile_for_every_layout(
    #[values(
        TargetKind::CreditCard,
        TargetKind::PortraitId,
        TargetKind::LandscapeId,
        TargetKind::A4
    )]
    kind: TargetKind,
    #[values(
        LayoutCode::One,
        LayoutCode::Two,
        LayoutCode::Four,
        LayoutCode::Eight,
        LayoutCode::Nine
    )]
    layout: LayoutCode,
) {
    let target = OutputTarget::preset(kind);
    let cells = PageGeometry::resolve(&target, layout).unwrap();
    assert_tiles(&target, layout, &cells);
}
