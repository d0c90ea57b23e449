//! Rendering score maps into RGBA pixel buffers
//!
//! Every detection result can carry up to three score maps, and each one
//! becomes a panel:
//!
//! | Layer | Source map | Colorization |
//! |-------|------------|--------------|
//! | prediction | `prediction_map` | smooth blue→red ramp ([`MapType::Forgery`]) |
//! | confidence | `confidence_map` | contrast-stretched grayscale |
//! | noiseprint | `noiseprint_map` | plain grayscale |
//! | overlay | `prediction_map` | translucent red highlight for the photo |
//!
//! All panels for one result share the canvas size chosen by the
//! [`CanvasPolicy`].
//!
//! # Usage
//!
//! ```
//! use verilens::render::{CanvasPolicy, Renderer};
//! use verilens::{DetectionResult, ScoreGrid};
//!
//! let grid = ScoreGrid::from_rows(vec![vec![0.1, 0.9], vec![0.4, 0.6]]).unwrap();
//! let result = DetectionResult::new(0.35).with_prediction_map(grid);
//!
//! let maps = Renderer::new()
//!     .with_policy(CanvasPolicy::AspectFit { max: 200 })
//!     .render(&result)
//!     .unwrap();
//!
//! let heatmap = maps.prediction.unwrap();
//! assert_eq!(heatmap.as_bytes().len(), 200 * 200 * 4);
//! ```

pub mod colormap;
pub mod heatmap;
pub mod overlay;
pub mod sizing;

pub use heatmap::rasterize;
pub use overlay::composite;
pub use sizing::{CanvasPolicy, DEFAULT_CANVAS_SIZE, MAX_CANVAS_SIZE};

use crate::error::{RenderError, Result};
use crate::result::DetectionResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which colorization law to apply to a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapType {
    Forgery,
    Confidence,
    Noiseprint,
}

impl MapType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MapType::Forgery => "forgery",
            MapType::Confidence => "confidence",
            MapType::Noiseprint => "noiseprint",
        }
    }

    /// Opaque RGBA color for a raw cell value
    pub fn color(&self, value: f64) -> [u8; 4] {
        match self {
            MapType::Forgery => {
                let [r, g, b] = colormap::smooth_colormap(value);
                [
                    colormap::unit_to_byte(r),
                    colormap::unit_to_byte(g),
                    colormap::unit_to_byte(b),
                    255,
                ]
            }
            MapType::Confidence => {
                let i = colormap::stretched_gray(value);
                [i, i, i, 255]
            }
            MapType::Noiseprint => {
                let i = colormap::plain_gray(value);
                [i, i, i, 255]
            }
        }
    }
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MapType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "forgery" | "prediction" => Ok(MapType::Forgery),
            "confidence" => Ok(MapType::Confidence),
            "noiseprint" => Ok(MapType::Noiseprint),
            other => Err(format!("unknown map type '{}'", other)),
        }
    }
}

/// One rendered panel of a detection result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Prediction,
    Confidence,
    Noiseprint,
    Overlay,
}

impl Layer {
    pub const ALL: [Layer; 4] = [Layer::Prediction, Layer::Confidence, Layer::Noiseprint, Layer::Overlay];

    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Prediction => "prediction",
            Layer::Confidence => "confidence",
            Layer::Noiseprint => "noiseprint",
            Layer::Overlay => "overlay",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layer {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Layer::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown layer '{}'", s))
    }
}

/// Flat RGBA buffer, row-major, top-left origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Fully transparent buffer
    ///
    /// Zero sides, sides above [`MAX_CANVAS_SIZE`] and byte counts that
    /// overflow `usize` are rejected.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let invalid = RenderError::InvalidDimensions { width, height };
        if width == 0 || height == 0 || width > MAX_CANVAS_SIZE || height > MAX_CANVAS_SIZE {
            return Err(invalid);
        }
        let len = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .ok_or(invalid)?;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    pub(crate) fn set_pixel(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        let i = (y * self.width + x) * 4;
        self.data[i..i + 4].copy_from_slice(&rgba);
    }

    /// Source-over blend `overlay` onto this buffer; sizes must match
    pub fn blend_over(&mut self, overlay: &PixelBuffer) -> Result<()> {
        if overlay.width != self.width || overlay.height != self.height {
            return Err(RenderError::InvalidDimensions {
                width: overlay.width,
                height: overlay.height,
            });
        }

        for (dst, src) in self.data.chunks_exact_mut(4).zip(overlay.data.chunks_exact(4)) {
            let sa = src[3] as f64 / 255.0;
            if sa == 0.0 {
                continue;
            }
            let da = dst[3] as f64 / 255.0;
            let out_a = sa + da * (1.0 - sa);
            for c in 0..3 {
                let sc = src[c] as f64 / 255.0;
                let dc = dst[c] as f64 / 255.0;
                let out = (sc * sa + dc * da * (1.0 - sa)) / out_a;
                dst[c] = colormap::unit_to_byte(out);
            }
            dst[3] = colormap::unit_to_byte(out_a);
        }
        Ok(())
    }
}

/// Every panel rendered for one detection result
#[derive(Debug, Clone, Default)]
pub struct RenderedMaps {
    pub width: usize,
    pub height: usize,
    pub prediction: Option<PixelBuffer>,
    pub confidence: Option<PixelBuffer>,
    pub noiseprint: Option<PixelBuffer>,
    pub overlay: Option<PixelBuffer>,
}

impl RenderedMaps {
    pub fn get(&self, layer: Layer) -> Option<&PixelBuffer> {
        match layer {
            Layer::Prediction => self.prediction.as_ref(),
            Layer::Confidence => self.confidence.as_ref(),
            Layer::Noiseprint => self.noiseprint.as_ref(),
            Layer::Overlay => self.overlay.as_ref(),
        }
    }

    /// Present layers in display order
    pub fn layers(&self) -> impl Iterator<Item = (Layer, &PixelBuffer)> {
        Layer::ALL.into_iter().filter_map(move |l| self.get(l).map(|b| (l, b)))
    }
}

/// Render settings for detection results
#[derive(Debug, Clone)]
pub struct Renderer {
    pub policy: CanvasPolicy,
    pub overlay: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            policy: CanvasPolicy::default(),
            overlay: true,
        }
    }

    pub fn with_policy(mut self, policy: CanvasPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_overlay(mut self, overlay: bool) -> Self {
        self.overlay = overlay;
        self
    }

    /// Canvas size this renderer uses for `result`
    pub fn canvas_size(&self, result: &DetectionResult) -> (usize, usize) {
        self.policy.dimensions(result.source_dimensions())
    }

    /// Render one layer; `Ok(None)` when the result has no map for it
    pub fn render_layer(&self, result: &DetectionResult, layer: Layer) -> Result<Option<PixelBuffer>> {
        let (width, height) = self.canvas_size(result);
        let buffer = match layer {
            Layer::Prediction => result
                .prediction_map
                .as_ref()
                .map(|g| rasterize(g, MapType::Forgery, width, height)),
            Layer::Confidence => result
                .confidence_map
                .as_ref()
                .map(|g| rasterize(g, MapType::Confidence, width, height)),
            Layer::Noiseprint => result
                .noiseprint_map
                .as_ref()
                .map(|g| rasterize(g, MapType::Noiseprint, width, height)),
            Layer::Overlay => result
                .prediction_map
                .as_ref()
                .map(|g| composite(width, height, g)),
        };
        buffer.transpose()
    }

    /// Render every layer the result has data for
    pub fn render(&self, result: &DetectionResult) -> Result<RenderedMaps> {
        let (width, height) = self.canvas_size(result);
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }

        Ok(RenderedMaps {
            width,
            height,
            prediction: self.render_layer(result, Layer::Prediction)?,
            confidence: self.render_layer(result, Layer::Confidence)?,
            noiseprint: self.render_layer(result, Layer::Noiseprint)?,
            overlay: if self.overlay {
                self.render_layer(result, Layer::Overlay)?
            } else {
                None
            },
        })
    }
}
