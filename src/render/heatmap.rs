//! Nearest-neighbor heatmap rasterizer
//!
//! Score grids are usually far smaller than the canvas they're shown on
//! (a 64x64 anomaly map on a 300x300 panel), so each output pixel simply
//! picks the grid cell it falls in:
//!
//! ```text
//! src_col = floor(x / width  * cols)
//! src_row = floor(y / height * rows)
//! ```
//!
//! No interpolation.

use super::{MapType, PixelBuffer};
use crate::error::Result;
use crate::grid::ScoreGrid;
use log::{debug, warn};

const FALLBACK: [u8; 4] = [0, 0, 0, 255];

/// Grid cell index for output coordinate `pos` along an axis of `extent` pixels
pub(crate) fn source_index(pos: usize, extent: usize, cells: usize) -> usize {
    pos * cells / extent
}

/// Render `grid` into a `width` x `height` RGBA buffer using the map type's colormap
pub fn rasterize(grid: &ScoreGrid, map_type: MapType, width: usize, height: usize) -> Result<PixelBuffer> {
    let mut buffer = PixelBuffer::new(width, height)?;

    let (lo, hi) = grid.min_max();
    debug!(
        "rasterize {} map {}x{} -> {}x{}, range [{:.4}, {:.4}]",
        map_type,
        grid.cols(),
        grid.rows(),
        width,
        height,
        lo,
        hi
    );

    let mut fallback_pixels = 0usize;
    for y in 0..height {
        let src_row = source_index(y, height, grid.rows());
        for x in 0..width {
            let src_col = source_index(x, width, grid.cols());
            let rgba = match grid.get(src_row, src_col) {
                Some(value) => map_type.color(value),
                None => {
                    fallback_pixels += 1;
                    FALLBACK
                }
            };
            buffer.set_pixel(x, y, rgba);
        }
    }

    if fallback_pixels > 0 {
        warn!("rasterize: {} pixels fell outside the grid and were filled black", fallback_pixels);
    }

    Ok(buffer)
}
