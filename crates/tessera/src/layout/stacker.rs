//! The vertical pass.

use log::trace;

use crate::layout::tile::{LayoutTile, Tile};

/// Places `tiles` top to bottom starting at `start_y`, one row per tile, and
/// returns the Y just below the last row.
///
/// Each tile gets its Y exactly once. Tiles that contain other tiles place
/// their children when they receive their own Y.
pub fn stack(tiles: &mut [Tile], start_y: f32) -> f32 {
    let mut y = start_y;
    for tile in tiles {
        tile.callback_y(y);
        let height = tile.preferred_height();
        trace!(kind:? = tile.kind(), y, height; "Placed tile");
        y += height;
    }
    y
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use proptest::prelude::*;
    use tessera_core::text::MonospaceMeasure;

    use super::*;
    use crate::{
        config::LayoutConfig,
        layout::{session::LayoutSession, tile::SpacerTile},
    };

    fn spacers(heights: &[f32]) -> Vec<Tile> {
        let config = LayoutConfig::default();
        let measure = MonospaceMeasure::default();
        let mut session = LayoutSession::new(&config, &measure);
        heights
            .iter()
            .map(|height| Tile::Spacer(SpacerTile::new(&mut session, *height)))
            .collect()
    }

    #[test]
    fn test_rows_follow_each_other() {
        let mut tiles = spacers(&[10.0, 20.0, 15.0]);
        let bottom = stack(&mut tiles, 0.0);

        let ys: Vec<f32> = tiles.iter().filter_map(LayoutTile::y).collect();
        assert_eq!(ys, vec![0.0, 10.0, 30.0]);
        assert_approx_eq!(f32, bottom, 45.0);
    }

    #[test]
    fn test_empty_body_keeps_start() {
        assert_eq!(stack(&mut [], 42.0), 42.0);
    }

    mod proptest_tests {
        use super::*;

        fn heights_strategy() -> impl Strategy<Value = Vec<f32>> {
            prop::collection::vec(0.0f32..200.0, 0..30)
        }

        fn check_rows_never_overlap(heights: Vec<f32>, start: f32) -> Result<(), TestCaseError> {
            let mut tiles = spacers(&heights);
            let bottom = stack(&mut tiles, start);

            let mut expected = start;
            for tile in &tiles {
                let y = tile.y().ok_or_else(|| TestCaseError::fail("tile not placed"))?;
                prop_assert!((y - expected).abs() < 1e-2);
                expected = y + tile.preferred_height();
            }
            prop_assert!((bottom - expected).abs() < 1e-2);
            Ok(())
        }

        proptest! {
            #[test]
            fn rows_never_overlap(heights in heights_strategy(), start in -100.0f32..100.0) {
                check_rows_never_overlap(heights, start)?;
            }
        }
    }
}
