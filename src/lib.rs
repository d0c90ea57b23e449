//! Verilens - verdicts and heatmaps for image forensics
//!
//! Verilens takes the output of an image-authenticity detector (an integrity
//! score plus per-pixel anomaly, confidence and Noiseprint++ maps) and turns
//! it into something a person can read: one of five verdicts, and false-color
//! panels showing *where* the detector thinks the image was tampered with.
//!
//! # Overview
//!
//! The detector does the hard part. What it hands back is a pile of numbers:
//! a scalar in [0, 1] and a few grids of scores. Verilens is the deterministic
//! layer between that and a screen:
//!
//! 1. **Decision**: integrity and evidence reliability (the mean of the
//!    confidence map) are rounded to whole percent and run through an ordered
//!    rule table to pick a verdict. Results from classifier-style adapters
//!    carry no integrity; their vendor status is passed through instead.
//!
//! 2. **Rendering**: each score map is rasterized onto a canvas with its own
//!    colormap, and the anomaly map additionally becomes a translucent red
//!    highlight layer to lay over the original photo.
//!
//! # Quick Start
//!
//! ```
//! use verilens::{Assessment, DetectionResult, Renderer, Verdict};
//!
//! let json = r#"{
//!     "integrity": 0.8,
//!     "confidence_map": [[0.6, 0.6], [0.6, 0.6]],
//!     "prediction_map": [[0.1, 0.2], [0.05, 0.9]]
//! }"#;
//! let result = DetectionResult::from_json_str(json).unwrap();
//!
//! let assessment = Assessment::from_result(&result);
//! assert_eq!(assessment.verdict, Verdict::Authentic);
//!
//! let maps = Renderer::new().render(&result).unwrap();
//! assert!(maps.prediction.is_some());
//! ```
//!
//! # Verdicts
//!
//! | Verdict | Meaning |
//! |---------|---------|
//! | AUTHENTIC | High confidence authentic image |
//! | LIKELY_AUTHENTIC | Moderate confidence authentic image |
//! | INCONCLUSIVE | Unable to determine authenticity with confidence |
//! | LIKELY_FORGED | Moderate confidence forged image |
//! | FORGED | High confidence forged image |
//!
//! # Modules
//!
//! - [`decision`]: the verdict rules and their display metadata
//! - [`render`]: colormaps, heatmap rasterizer, overlay compositor
//! - [`grid`] / [`result`]: validated input types
//! - `report` / `serve`: batch reports and the local web UI (feature `cli`)

pub mod decision;
pub mod error;
pub mod grid;
pub mod render;
pub mod result;

#[cfg(feature = "cli")]
pub mod report;
#[cfg(feature = "cli")]
pub mod serve;

pub use decision::{classify, Assessment, Basis, DecisionInfo, Tone, Verdict};
pub use error::RenderError;
pub use grid::ScoreGrid;
pub use render::{CanvasPolicy, Layer, MapType, PixelBuffer, RenderedMaps, Renderer};
pub use result::DetectionResult;

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // PUBLIC API TESTS
    // ==========================================================================
    //
    // These tests verify the public API surface is reachable from the crate
    // root, the way downstream code will use it.
    // ==========================================================================

    #[test]
    fn test_public_exports() {
        assert_eq!(classify(0.9, 0.9), Verdict::Authentic);
        assert_eq!(MapType::Forgery.color(1.0), [255, 0, 0, 255]);
        assert_eq!(CanvasPolicy::default().dimensions(None), (300, 300));

        let grid = ScoreGrid::filled(1, 1, 0.5).unwrap();
        let result = DetectionResult::new(0.2).with_prediction_map(grid);
        assert_eq!(Assessment::from_result(&result).verdict, Verdict::Forged);
    }

    #[test]
    fn test_renderer_defaults() {
        let renderer = Renderer::new();
        assert!(renderer.overlay);
        assert_eq!(renderer.policy, CanvasPolicy::Fixed { size: 300 });
    }

    #[test]
    fn test_verdict_variants() {
        assert_eq!(Verdict::ALL.len(), 5);
        let names: Vec<&str> = Verdict::ALL.iter().map(|v| v.as_str()).collect();
        assert_eq!(
            names,
            ["AUTHENTIC", "LIKELY_AUTHENTIC", "INCONCLUSIVE", "LIKELY_FORGED", "FORGED"]
        );
        assert_eq!(Verdict::ALL.iter().filter(|v| v.is_forged()).count(), 2);
    }

    #[test]
    fn test_errors_display() {
        let err = RenderError::InvalidDimensions { width: 0, height: 300 };
        assert_eq!(err.to_string(), "invalid canvas dimensions 0x300");
    }
}
