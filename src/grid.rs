//! Score grids produced by the forensic detector
//!
//! A detector emits one or more 2-D maps of per-region scores: the anomaly
//! (prediction) map, the confidence map and the Noiseprint++ residual. They
//! arrive as JSON arrays of arrays and are validated here, once, so nothing
//! downstream has to worry about ragged rows or empty input:
//!
//! ```text
//! [[0.10, 0.20, 0.15],      rows = 2
//!  [0.90, 0.85, 0.20]]      cols = 3
//! ```
//!
//! Values are nominally in [0, 1] but are *not* clamped here; each consumer
//! clamps or normalizes according to its own contract.

use crate::error::{RenderError, Result};
use serde::{Deserialize, Serialize};

/// Rectangular row-major grid of finite scores, at least 1x1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct ScoreGrid {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl ScoreGrid {
    /// Build a grid from nested rows, rejecting empty, ragged or non-finite input
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let row_count = rows.len();
        if row_count == 0 {
            return Err(RenderError::InvalidGrid("grid has no rows".to_string()));
        }

        let cols = rows[0].len();
        if cols == 0 {
            return Err(RenderError::InvalidGrid("grid has no columns".to_string()));
        }

        let mut values = Vec::with_capacity(row_count * cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != cols {
                return Err(RenderError::InvalidGrid(format!(
                    "row {} has {} cells, expected {}",
                    i,
                    row.len(),
                    cols
                )));
            }
            if let Some(j) = row.iter().position(|v| !v.is_finite()) {
                return Err(RenderError::InvalidGrid(format!(
                    "non-finite value at ({}, {})",
                    i, j
                )));
            }
            values.extend(row);
        }

        Ok(Self {
            rows: row_count,
            cols,
            values,
        })
    }

    /// Grid filled with a single value
    pub fn filled(rows: usize, cols: usize, value: f64) -> Result<Self> {
        Self::from_rows(vec![vec![value; cols]; rows])
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Cell at (row, col), `None` when outside the grid
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            self.values.get(row * self.cols + col).copied()
        } else {
            None
        }
    }

    /// All cells, flattened row by row
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Unweighted arithmetic mean of every cell
    pub fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// Smallest and largest cell
    pub fn min_max(&self) -> (f64, f64) {
        self.values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }
}

impl TryFrom<Vec<Vec<f64>>> for ScoreGrid {
    type Error = RenderError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::from_rows(rows)
    }
}

impl From<ScoreGrid> for Vec<Vec<f64>> {
    fn from(grid: ScoreGrid) -> Self {
        grid.values.chunks(grid.cols).map(|r| r.to_vec()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // CONSTRUCTION / VALIDATION TESTS
    // ==========================================================================
    //
    // A grid is rejected before any index arithmetic happens on it. These
    // tests pin down exactly which shapes count as malformed.
    // ==========================================================================

    #[test]
    fn test_from_rows_valid() {
        let grid = ScoreGrid::from_rows(vec![vec![0.1, 0.2, 0.3], vec![0.4, 0.5, 0.6]]).unwrap();
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.cols(), 3);
        assert_eq!(grid.get(1, 2), Some(0.6));
        assert_eq!(grid.get(0, 0), Some(0.1));
    }

    #[test]
    fn test_empty_grid_rejected() {
        let err = ScoreGrid::from_rows(vec![]).unwrap_err();
        assert!(matches!(err, RenderError::InvalidGrid(_)));
    }

    #[test]
    fn test_empty_row_rejected() {
        let err = ScoreGrid::from_rows(vec![vec![], vec![]]).unwrap_err();
        assert!(matches!(err, RenderError::InvalidGrid(_)));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = ScoreGrid::from_rows(vec![vec![0.1, 0.2], vec![0.3]]).unwrap_err();
        match err {
            RenderError::InvalidGrid(msg) => assert!(msg.contains("row 1"), "got: {}", msg),
            other => panic!("expected InvalidGrid, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_rejected() {
        let err = ScoreGrid::from_rows(vec![vec![0.1, f64::NAN]]).unwrap_err();
        assert!(matches!(err, RenderError::InvalidGrid(_)));

        let err = ScoreGrid::from_rows(vec![vec![f64::INFINITY]]).unwrap_err();
        assert!(matches!(err, RenderError::InvalidGrid(_)));
    }

    #[test]
    fn test_out_of_range_values_accepted() {
        // Clamping is the consumer's job, not the grid's
        let grid = ScoreGrid::from_rows(vec![vec![-0.5, 1.7]]).unwrap();
        assert_eq!(grid.min_max(), (-0.5, 1.7));
    }

    #[test]
    fn test_get_out_of_bounds() {
        let grid = ScoreGrid::filled(2, 2, 0.5).unwrap();
        assert_eq!(grid.get(2, 0), None);
        assert_eq!(grid.get(0, 2), None);
    }

    // ==========================================================================
    // STATISTICS TESTS
    // ==========================================================================

    #[test]
    fn test_mean() {
        let grid = ScoreGrid::from_rows(vec![vec![0.2, 0.4], vec![0.6, 0.8]]).unwrap();
        assert!((grid.mean() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_min_max() {
        let grid = ScoreGrid::from_rows(vec![vec![0.3, 0.9], vec![0.1, 0.5]]).unwrap();
        assert_eq!(grid.min_max(), (0.1, 0.9));
    }

    // ==========================================================================
    // SERDE TESTS
    // ==========================================================================

    #[test]
    fn test_deserialize_validates() {
        let grid: ScoreGrid = serde_json::from_str("[[0.1, 0.2], [0.3, 0.4]]").unwrap();
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.cols(), 2);

        let ragged = serde_json::from_str::<ScoreGrid>("[[0.1, 0.2], [0.3]]");
        assert!(ragged.is_err(), "ragged JSON grid should not deserialize");

        let empty = serde_json::from_str::<ScoreGrid>("[]");
        assert!(empty.is_err(), "empty JSON grid should not deserialize");
    }

    #[test]
    fn test_serialize_as_nested_rows() {
        let grid = ScoreGrid::from_rows(vec![vec![0.5, 1.0], vec![0.0, 0.25]]).unwrap();
        let json = serde_json::to_string(&grid).unwrap();
        assert_eq!(json, "[[0.5,1.0],[0.0,0.25]]");
    }
}
