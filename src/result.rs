//! Detection results as delivered by the forensic model service
//!
//! Two shapes of record come back from the detector service. Pixel-level
//! models (TruFor-style: anomaly map + confidence map + Noiseprint++) send an
//! `integrity` score and score maps; those drive the five-tier decision and
//! the renderings. Classifier-style adapters only report a vendor `status`
//! and `score`, which are passed through as-is.
//!
//! ```json
//! {
//!   "model": "TruFor",
//!   "filename": "photo.jpg",
//!   "integrity": 0.82,
//!   "detection_score": 0.82,
//!   "prediction_map": [[0.1, 0.2], [0.7, 0.9]],
//!   "confidence_map": [[0.6, 0.6], [0.6, 0.6]],
//!   "image_size": [480, 640]
//! }
//! ```
//!
//! ```json
//! { "request_id": "rd-1234", "status": "FAKE", "score": 0.91 }
//! ```

use crate::error::{RenderError, Result};
use crate::grid::ScoreGrid;
use serde::{Deserialize, Deserializer, Serialize};
use std::io::Read;

/// Reliability assumed when the detector sends no confidence map
pub const DEFAULT_EVIDENCE_RELIABILITY: f64 = 0.5;

#[derive(Debug, Clone, Default, Serialize)]
pub struct DetectionResult {
    /// Authenticity estimate, 1.0 = authentic. Its presence selects the
    /// five-tier decision.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrity: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_map: Option<ScoreGrid>,

    /// Anomaly (forgery) map
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction_map: Option<ScoreGrid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub noiseprint_map: Option<ScoreGrid>,

    /// Anomaly x confidence, as published by the model authors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weighted_prediction_map: Option<ScoreGrid>,

    pub filename: Option<String>,
    pub model: Option<String>,
    pub detection_score: Option<f64>,
    pub is_fake: Option<bool>,
    pub confidence: Option<f64>,
    /// Original image size as (height, width)
    pub image_size: Option<(u32, u32)>,
    /// Hint about bokeh/portrait-mode artifacts
    pub portrait_note: Option<String>,

    /// Vendor verdict from classifier-style adapters (`AUTHENTIC`, `FAKE`, ...)
    pub status: Option<String>,
    /// Vendor score, 0-1
    pub score: Option<f64>,
    pub request_id: Option<String>,
}

/// Wire shape. Score maps arrive as plain nested arrays and are validated
/// into [`ScoreGrid`]s afterwards, so a malformed map surfaces as
/// [`RenderError::InvalidGrid`] rather than a JSON error.
#[derive(Deserialize)]
struct RawDetectionResult {
    #[serde(default)]
    integrity: Option<f64>,
    #[serde(default)]
    confidence_map: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    prediction_map: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    noiseprint_map: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    weighted_prediction_map: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    detection_score: Option<f64>,
    #[serde(default)]
    is_fake: Option<bool>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    image_size: Option<(u32, u32)>,
    #[serde(default)]
    portrait_note: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    request_id: Option<String>,
}

fn map_grid(name: &str, rows: Option<Vec<Vec<f64>>>) -> Result<Option<ScoreGrid>> {
    rows.map(|rows| {
        ScoreGrid::from_rows(rows).map_err(|e| match e {
            RenderError::InvalidGrid(reason) => RenderError::InvalidGrid(format!("{}: {}", name, reason)),
            other => other,
        })
    })
    .transpose()
}

impl TryFrom<RawDetectionResult> for DetectionResult {
    type Error = RenderError;

    fn try_from(raw: RawDetectionResult) -> Result<Self> {
        Ok(Self {
            integrity: raw.integrity,
            confidence_map: map_grid("confidence_map", raw.confidence_map)?,
            prediction_map: map_grid("prediction_map", raw.prediction_map)?,
            noiseprint_map: map_grid("noiseprint_map", raw.noiseprint_map)?,
            weighted_prediction_map: map_grid("weighted_prediction_map", raw.weighted_prediction_map)?,
            filename: raw.filename,
            model: raw.model,
            detection_score: raw.detection_score,
            is_fake: raw.is_fake,
            confidence: raw.confidence,
            image_size: raw.image_size,
            portrait_note: raw.portrait_note,
            status: raw.status,
            score: raw.score,
            request_id: raw.request_id,
        })
    }
}

impl<'de> Deserialize<'de> for DetectionResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        RawDetectionResult::deserialize(deserializer)?
            .try_into()
            .map_err(serde::de::Error::custom)
    }
}

impl DetectionResult {
    pub fn new(integrity: f64) -> Self {
        Self {
            integrity: Some(integrity),
            ..Default::default()
        }
    }

    /// Record from a classifier-style adapter: vendor status and score only
    pub fn reported(status: &str, score: f64) -> Self {
        Self {
            status: Some(status.to_string()),
            score: Some(score),
            ..Default::default()
        }
    }

    pub fn with_confidence_map(mut self, grid: ScoreGrid) -> Self {
        self.confidence_map = Some(grid);
        self
    }

    pub fn with_prediction_map(mut self, grid: ScoreGrid) -> Self {
        self.prediction_map = Some(grid);
        self
    }

    pub fn with_noiseprint_map(mut self, grid: ScoreGrid) -> Self {
        self.noiseprint_map = Some(grid);
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawDetectionResult = serde_json::from_str(json)?;
        raw.try_into()
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let raw: RawDetectionResult = serde_json::from_reader(reader)?;
        raw.try_into()
    }

    /// Mean of the confidence map, or [`DEFAULT_EVIDENCE_RELIABILITY`] without one
    pub fn evidence_reliability(&self) -> f64 {
        self.confidence_map
            .as_ref()
            .map(ScoreGrid::mean)
            .unwrap_or(DEFAULT_EVIDENCE_RELIABILITY)
    }

    /// Source image size as (width, height), falling back to the prediction grid shape
    pub fn source_dimensions(&self) -> Option<(usize, usize)> {
        if let Some((h, w)) = self.image_size {
            if h > 0 && w > 0 {
                return Some((w as usize, h as usize));
            }
        }
        self.prediction_map.as_ref().map(|g| (g.cols(), g.rows()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // PARSING TESTS
    // ==========================================================================

    #[test]
    fn test_parse_full_record() {
        let json = r#"{
            "status": "success",
            "model": "TruFor",
            "filename": "photo.jpg",
            "is_fake": false,
            "confidence": 0.64,
            "integrity": 0.82,
            "detection_score": 0.82,
            "prediction_map": [[0.1, 0.2], [0.7, 0.9]],
            "confidence_map": [[0.6, 0.6], [0.6, 0.6]],
            "noiseprint_map": [[0.5]],
            "image_size": [480, 640],
            "has_confidence_map": true,
            "portrait_note": ""
        }"#;

        let result = DetectionResult::from_json_str(json).unwrap();
        assert_eq!(result.model.as_deref(), Some("TruFor"));
        assert_eq!(result.filename.as_deref(), Some("photo.jpg"));
        assert_eq!(result.integrity, Some(0.82));
        assert_eq!(result.image_size, Some((480, 640)));
        assert_eq!(result.prediction_map.as_ref().map(|g| g.rows()), Some(2));
        assert_eq!(result.noiseprint_map.as_ref().map(|g| g.cols()), Some(1));
    }

    #[test]
    fn test_parse_minimal_record() {
        let result = DetectionResult::from_json_str(r#"{"integrity": 0.3}"#).unwrap();
        assert_eq!(result.integrity, Some(0.3));
        assert!(result.confidence_map.is_none());
        assert!(result.prediction_map.is_none());
        assert!(result.noiseprint_map.is_none());
    }

    #[test]
    fn test_parse_reported_record() {
        let json = r#"{
            "request_id": "local_clip.mp4_42",
            "media_type": "video",
            "status": "FAKE",
            "score": 0.91,
            "score_scale": "0-1",
            "models": ["ResNet50"]
        }"#;

        let result = DetectionResult::from_json_str(json).unwrap();
        assert_eq!(result.integrity, None);
        assert_eq!(result.status.as_deref(), Some("FAKE"));
        assert_eq!(result.score, Some(0.91));
        assert_eq!(result.request_id.as_deref(), Some("local_clip.mp4_42"));
    }

    #[test]
    fn test_parse_rejects_ragged_map() {
        let json = r#"{"integrity": 0.5, "prediction_map": [[0.1, 0.2], [0.3]]}"#;
        match DetectionResult::from_json_str(json) {
            Err(RenderError::InvalidGrid(reason)) => {
                assert!(reason.starts_with("prediction_map:"), "got {}", reason);
                assert!(reason.contains("row 1"), "got {}", reason);
            }
            other => panic!("expected InvalidGrid, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_empty_map() {
        let err = DetectionResult::from_json_str(r#"{"integrity": 0.5, "confidence_map": []}"#).unwrap_err();
        assert!(matches!(err, RenderError::InvalidGrid(_)), "got {:?}", err);

        let err = DetectionResult::from_reader(&br#"{"noiseprint_map": [[]]}"#[..]).unwrap_err();
        assert!(matches!(err, RenderError::InvalidGrid(_)), "got {:?}", err);
    }

    #[test]
    fn test_parse_syntax_error_is_parse() {
        let err = DetectionResult::from_json_str(r#"{"integrity": "#).unwrap_err();
        assert!(matches!(err, RenderError::Parse(_)), "got {:?}", err);
    }

    #[test]
    fn test_serde_deserialize_validates_maps() {
        let parsed: std::result::Result<DetectionResult, _> =
            serde_json::from_str(r#"{"prediction_map": [[0.1], [0.2, 0.3]]}"#);
        let err = parsed.unwrap_err();
        assert!(err.to_string().contains("prediction_map"), "got {}", err);
    }

    #[test]
    fn test_from_reader() {
        let bytes = br#"{"integrity": 0.9, "confidence_map": [[0.4]]}"#;
        let result = DetectionResult::from_reader(&bytes[..]).unwrap();
        assert_eq!(result.integrity, Some(0.9));
    }

    // ==========================================================================
    // EVIDENCE RELIABILITY TESTS
    // ==========================================================================

    #[test]
    fn test_reliability_defaults_without_confidence_map() {
        let result = DetectionResult::new(0.8);
        assert_eq!(result.evidence_reliability(), DEFAULT_EVIDENCE_RELIABILITY);
    }

    #[test]
    fn test_reliability_is_mean_of_confidence_map() {
        let conf = ScoreGrid::from_rows(vec![vec![0.4, 0.8], vec![0.6, 0.6]]).unwrap();
        let result = DetectionResult::new(0.8).with_confidence_map(conf);
        assert!((result.evidence_reliability() - 0.6).abs() < 1e-12);
    }

    // ==========================================================================
    // SOURCE DIMENSION TESTS
    // ==========================================================================

    #[test]
    fn test_source_dimensions_prefers_image_size() {
        let mut result = DetectionResult::new(0.5)
            .with_prediction_map(ScoreGrid::filled(4, 8, 0.1).unwrap());
        result.image_size = Some((480, 640));
        assert_eq!(result.source_dimensions(), Some((640, 480)));
    }

    #[test]
    fn test_source_dimensions_falls_back_to_grid() {
        let result = DetectionResult::new(0.5)
            .with_prediction_map(ScoreGrid::filled(4, 8, 0.1).unwrap());
        assert_eq!(result.source_dimensions(), Some((8, 4)));
        assert_eq!(DetectionResult::new(0.5).source_dimensions(), None);
    }
}
