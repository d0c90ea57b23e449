//! Canvas sizing policy
//!
//! Panels are either a fixed square (300x300 keeps a grid of panels tidy) or
//! sized to the source image's aspect ratio with the longer side pinned to a
//! maximum, so tall and wide photos aren't squashed.

use serde::{Deserialize, Serialize};

pub const DEFAULT_CANVAS_SIZE: usize = 300;

/// Largest canvas side accepted anywhere in the pipeline
pub const MAX_CANVAS_SIZE: usize = 8192;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum CanvasPolicy {
    /// Square `size` x `size` canvas regardless of source shape
    Fixed { size: usize },
    /// Longer side equals `max`, shorter side scaled to match
    AspectFit { max: usize },
}

impl Default for CanvasPolicy {
    fn default() -> Self {
        CanvasPolicy::Fixed {
            size: DEFAULT_CANVAS_SIZE,
        }
    }
}

impl CanvasPolicy {
    /// Canvas (width, height) for a source of `source` (width, height), if known
    pub fn dimensions(&self, source: Option<(usize, usize)>) -> (usize, usize) {
        match *self {
            CanvasPolicy::Fixed { size } => (size, size),
            CanvasPolicy::AspectFit { max: 0 } => (0, 0),
            CanvasPolicy::AspectFit { max } => match source {
                Some((w, h)) if w > 0 && h > 0 => {
                    let scale = max as f64 / w.max(h) as f64;
                    let fit = |side: usize| ((side as f64 * scale).round() as usize).max(1);
                    (fit(w), fit(h))
                }
                _ => (max, max),
            },
        }
    }
}
