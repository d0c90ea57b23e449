//! Translucent highlight layer for the anomaly map
//!
//! Rather than replacing the photo with a false-color image, the overlay
//! marks only the suspicious half of the score range in red on top of it:
//!
//! - the grid is normalized to its *own* [min, max] (models disagree on the
//!   natural range of their scores)
//! - cells with normalized value <= 0.5 stay fully transparent
//! - above that, alpha ramps linearly from 0 at 0.5 to 128 at 1.0
//!
//! At most 50% opacity, so the underlying image is never hidden.

use super::heatmap::source_index;
use super::PixelBuffer;
use crate::error::Result;
use crate::grid::ScoreGrid;
use log::debug;

const HIGHLIGHT: [u8; 3] = [255, 0, 0];
const MAX_ALPHA: f64 = 128.0;

/// Value scaled into [0, 1] by the grid's own range; 0 for a constant grid
pub fn normalize(value: f64, min: f64, range: f64) -> f64 {
    if range > 0.0 {
        (value - min) / range
    } else {
        0.0
    }
}

/// Alpha for a normalized value, 0 at or below the midpoint
pub fn highlight_alpha(normalized: f64) -> u8 {
    if normalized > 0.5 {
        let intensity = ((normalized - 0.5) * 2.0).min(1.0);
        (intensity * MAX_ALPHA).round() as u8
    } else {
        0
    }
}

/// Build a `base_width` x `base_height` overlay for `grid`
pub fn composite(base_width: usize, base_height: usize, grid: &ScoreGrid) -> Result<PixelBuffer> {
    let mut buffer = PixelBuffer::new(base_width, base_height)?;

    let (min, max) = grid.min_max();
    let range = max - min;
    debug!(
        "overlay {}x{} -> {}x{}, range [{:.4}, {:.4}]",
        grid.cols(),
        grid.rows(),
        base_width,
        base_height,
        min,
        max
    );

    for y in 0..base_height {
        let src_row = source_index(y, base_height, grid.rows());
        for x in 0..base_width {
            let src_col = source_index(x, base_width, grid.cols());
            let Some(value) = grid.get(src_row, src_col) else {
                continue;
            };
            let alpha = highlight_alpha(normalize(value, min, range));
            if alpha > 0 {
                let [r, g, b] = HIGHLIGHT;
                buffer.set_pixel(x, y, [r, g, b, alpha]);
            }
        }
    }

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;

    // ==========================================================================
    // NORMALIZATION / ALPHA TESTS
    // ==========================================================================

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(0.2, 0.2, 0.4), 0.0);
        assert_eq!(normalize(0.6, 0.2, 0.4), 1.0);
        assert_eq!(normalize(0.9, 0.9, 0.0), 0.0);
    }

    #[test]
    fn test_alpha_ramp() {
        assert_eq!(highlight_alpha(0.0), 0);
        assert_eq!(highlight_alpha(0.5), 0);
        assert_eq!(highlight_alpha(0.75), 64);
        assert_eq!(highlight_alpha(1.0), 128);
    }

    // ==========================================================================
    // COMPOSITE TESTS
    // ==========================================================================

    #[test]
    fn test_constant_grid_is_transparent() {
        for value in [0.0, 0.5, 0.99, 7.0] {
            let grid = ScoreGrid::filled(4, 4, value).unwrap();
            let buf = composite(20, 20, &grid).unwrap();
            assert!(
                buf.as_bytes().chunks(4).all(|px| px[3] == 0),
                "constant grid of {} should draw nothing",
                value
            );
        }
    }

    #[test]
    fn test_only_upper_half_highlighted() {
        // normalized: 0.0, 0.5, 0.75, 1.0
        let grid = ScoreGrid::from_rows(vec![vec![0.1, 0.3, 0.4, 0.5]]).unwrap();
        let buf = composite(4, 1, &grid).unwrap();

        assert_eq!(buf.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(buf.pixel(1, 0), Some([0, 0, 0, 0]));
        assert_eq!(buf.pixel(2, 0).map(|p| p[3]), Some(64));
        assert_eq!(buf.pixel(3, 0), Some([255, 0, 0, 128]));
    }

    #[test]
    fn test_never_exceeds_half_opacity() {
        let grid = ScoreGrid::from_rows(vec![vec![-5.0, 0.0, 3.0], vec![10.0, 2.0, 9.5]]).unwrap();
        let buf = composite(30, 30, &grid).unwrap();
        assert!(buf.as_bytes().chunks(4).all(|px| px[3] <= 128));
    }

    #[test]
    fn test_uses_own_range_not_unit_interval() {
        // Scores far outside [0, 1] still produce a full-strength highlight
        let grid = ScoreGrid::from_rows(vec![vec![40.0, 80.0]]).unwrap();
        let buf = composite(2, 1, &grid).unwrap();
        assert_eq!(buf.pixel(1, 0), Some([255, 0, 0, 128]));
        assert_eq!(buf.pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let grid = ScoreGrid::filled(2, 2, 0.4).unwrap();
        let err = composite(0, 0, &grid).unwrap_err();
        assert!(matches!(err, RenderError::InvalidDimensions { .. }));
    }
}
