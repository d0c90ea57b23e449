//! Report generation for batches of detection results
//!
//! This module provides output formatters for assessed results:
//!
//! - **HTML**: Standalone page with summary cards, a verdict table and the
//!   rendered heatmaps (when PNGs were exported alongside)
//! - **JSON**: Machine-readable format for programmatic consumption
//! - **CSV**: Spreadsheet-compatible format for bulk review
//!
//! plus [`png`] for writing rendered maps to disk.
//!
//! # Usage
//!
//! ```ignore
//! use verilens::report;
//!
//! // Automatically picks format based on extension
//! report::generate("report.html", &entries)?;  // HTML
//! report::generate("report.json", &entries)?;  // JSON
//! report::generate("report.csv", &entries)?;   // CSV
//! ```

pub mod csv;
pub mod html;
pub mod json;
pub mod png;

use crate::decision::{Assessment, Verdict};
use crate::render::Layer;
use crate::result::DetectionResult;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

/// Generate a report in the appropriate format based on file extension
pub fn generate<P: AsRef<Path>>(path: P, entries: &[ReportEntry]) -> io::Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mut file = std::fs::File::create(path)?;

    match ext.as_str() {
        "html" | "htm" => html::write(&mut file, entries),
        "json" => json::write(&mut file, entries),
        _ => csv::write(&mut file, entries),
    }
}

/// A PNG written for one layer of a result
#[derive(Debug, Clone, Serialize)]
pub struct Rendering {
    pub layer: Layer,
    pub path: PathBuf,
}

/// One input file's outcome
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub file_path: String,
    pub file_name: String,
    pub model: Option<String>,
    pub source_filename: Option<String>,
    pub request_id: Option<String>,
    pub portrait_note: Option<String>,
    pub assessment: Option<Assessment>,
    pub renderings: Vec<Rendering>,
    pub error: Option<String>,
}

impl ReportEntry {
    pub fn from_result(path: &Path, result: &DetectionResult) -> Self {
        Self {
            model: result.model.clone(),
            source_filename: result.filename.clone(),
            request_id: result.request_id.clone().filter(|id| !id.is_empty()),
            portrait_note: result.portrait_note.clone().filter(|n| !n.is_empty()),
            assessment: Some(Assessment::from_result(result)),
            ..Self::blank(path)
        }
    }

    pub fn failed(path: &Path, error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::blank(path)
        }
    }

    fn blank(path: &Path) -> Self {
        Self {
            file_path: path.display().to_string(),
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            model: None,
            source_filename: None,
            request_id: None,
            portrait_note: None,
            assessment: None,
            renderings: vec![],
            error: None,
        }
    }

    pub fn verdict(&self) -> Option<Verdict> {
        self.assessment.as_ref().map(|a| a.verdict)
    }

    pub fn has_error(&self) -> bool {
        self.error.as_deref().is_some_and(|e| !e.is_empty())
    }
}

/// Summary statistics for a batch of entries
///
/// `error` counts every entry that carries an error, including results that
/// were assessed but failed to render, so it can overlap the verdict counts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub total: usize,
    pub authentic: usize,
    pub likely_authentic: usize,
    pub inconclusive: usize,
    pub likely_forged: usize,
    pub forged: usize,
    pub error: usize,
}

impl Summary {
    pub fn from_entries(entries: &[ReportEntry]) -> Self {
        let mut summary = Self {
            total: entries.len(),
            ..Self::default()
        };

        for e in entries {
            match e.verdict() {
                Some(Verdict::Authentic) => summary.authentic += 1,
                Some(Verdict::LikelyAuthentic) => summary.likely_authentic += 1,
                Some(Verdict::Inconclusive) => summary.inconclusive += 1,
                Some(Verdict::LikelyForged) => summary.likely_forged += 1,
                Some(Verdict::Forged) => summary.forged += 1,
                None => {}
            }
            if e.verdict().is_none() || e.has_error() {
                summary.error += 1;
            }
        }

        summary
    }

    /// Files in either forged-leaning tier
    pub fn forged_leaning(&self) -> usize {
        self.likely_forged + self.forged
    }
}
