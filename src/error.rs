//! Error taxonomy for the rendering pipeline
//!
//! Almost everything in the core is total: out-of-range scores are clamped
//! rather than rejected. The only things that can fail are structurally
//! broken inputs (a ragged or empty grid), a target canvas that is zero-sized
//! or too large to allocate, and result JSON that doesn't parse at all.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    /// Grid is empty, ragged, or holds non-finite values
    #[error("invalid score grid: {0}")]
    InvalidGrid(String),

    /// Target canvas has a zero side or exceeds the maximum canvas size
    #[error("invalid canvas dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    /// Detection result JSON could not be parsed
    #[error("could not parse detection result: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RenderError>;
