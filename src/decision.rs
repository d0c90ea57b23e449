//! Five-tier authenticity decision
//!
//! The verdict is driven by two numbers:
//!
//! - **integrity**: the model's own authenticity estimate (1.0 = authentic)
//! - **evidence reliability**: how much the confidence map says we can trust
//!   that estimate (mean of the map, 0.5 when absent)
//!
//! Both are clamped to [0, 1] and rounded to whole percent before comparison,
//! so the thresholds behave exactly as they read. Rules are checked top to
//! bottom and the first match wins:
//!
//! | # | Integrity (I) | Reliability (R) | Verdict |
//! |---|---------------|-----------------|---------|
//! | 1 | I >= 70 | R >= 40 | AUTHENTIC |
//! | 2 | 55 <= I < 70 | any | LIKELY_AUTHENTIC |
//! | 3 | 45 <= I < 55 | any | INCONCLUSIVE |
//! | 4 | 30 <= I < 45 | R >= 40 | LIKELY_FORGED |
//! | 5 | I < 30 | R >= 50 | FORGED |
//! | 6 | otherwise | | INCONCLUSIVE |
//!
//! Note that I=70 with R=39 is *not* LIKELY_AUTHENTIC: rule 2 is half-open
//! and the case falls through to rule 6.
//!
//! Results without an integrity score come from classifier-style adapters.
//! Their vendor `status` is taken as the verdict ([`Verdict::from_status`]),
//! and anything unrecognized is INCONCLUSIVE.

use crate::result::DetectionResult;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Authentic,
    LikelyAuthentic,
    Inconclusive,
    LikelyForged,
    Forged,
}

impl Verdict {
    pub const ALL: [Verdict; 5] = [
        Verdict::Authentic,
        Verdict::LikelyAuthentic,
        Verdict::Inconclusive,
        Verdict::LikelyForged,
        Verdict::Forged,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Authentic => "AUTHENTIC",
            Verdict::LikelyAuthentic => "LIKELY_AUTHENTIC",
            Verdict::Inconclusive => "INCONCLUSIVE",
            Verdict::LikelyForged => "LIKELY_FORGED",
            Verdict::Forged => "FORGED",
        }
    }

    /// Verdict for a vendor status string, INCONCLUSIVE when unrecognized
    ///
    /// Accepts the five verdict names plus the adapters' `FAKE`, which maps
    /// to FORGED. `UNCERTAIN` lands on INCONCLUSIVE like any unknown status.
    pub fn from_status(status: &str) -> Verdict {
        match status.trim().to_ascii_uppercase().as_str() {
            "AUTHENTIC" => Verdict::Authentic,
            "LIKELY_AUTHENTIC" => Verdict::LikelyAuthentic,
            "LIKELY_FORGED" => Verdict::LikelyForged,
            "FORGED" | "FAKE" => Verdict::Forged,
            _ => Verdict::Inconclusive,
        }
    }

    /// True for the two forged-leaning tiers
    pub fn is_forged(&self) -> bool {
        matches!(self, Verdict::LikelyForged | Verdict::Forged)
    }

    /// Display metadata for this verdict
    pub fn info(&self) -> DecisionInfo {
        match self {
            Verdict::Authentic => DecisionInfo {
                title: "AUTHENTIC",
                description: "High confidence authentic image.",
                tone: Tone::Success,
            },
            Verdict::LikelyAuthentic => DecisionInfo {
                title: "LIKELY AUTHENTIC",
                description: "Moderate confidence authentic image.",
                tone: Tone::Info,
            },
            Verdict::Inconclusive => DecisionInfo {
                title: "INCONCLUSIVE",
                description: "Unable to determine authenticity with confidence.",
                tone: Tone::Warning,
            },
            Verdict::LikelyForged => DecisionInfo {
                title: "LIKELY FORGED",
                description: "Moderate confidence forged image.",
                tone: Tone::Error,
            },
            Verdict::Forged => DecisionInfo {
                title: "FORGED",
                description: "High confidence forged image.",
                tone: Tone::Error,
            },
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Color family a presentation layer should use for a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Success,
    Info,
    Warning,
    Error,
}

/// Human-facing text for a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DecisionInfo {
    pub title: &'static str,
    pub description: &'static str,
    pub tone: Tone,
}

/// Clamp to [0, 1] and round to whole percent (NaN counts as 0)
pub fn to_percent(value: f64) -> u32 {
    (value.clamp(0.0, 1.0) * 100.0).round() as u32
}

/// Map integrity and evidence reliability to a verdict
pub fn classify(integrity: f64, evidence_reliability: f64) -> Verdict {
    let i = to_percent(integrity);
    let r = to_percent(evidence_reliability);

    let verdict = if i >= 70 && r >= 40 {
        Verdict::Authentic
    } else if (55..70).contains(&i) {
        Verdict::LikelyAuthentic
    } else if (45..55).contains(&i) {
        Verdict::Inconclusive
    } else if (30..45).contains(&i) && r >= 40 {
        Verdict::LikelyForged
    } else if i < 30 && r >= 50 {
        Verdict::Forged
    } else {
        Verdict::Inconclusive
    };

    debug!("decision: integrity={}% reliability={}% -> {}", i, r, verdict);
    verdict
}

/// Where a verdict came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Basis {
    /// Integrity and evidence reliability run through the rule table
    Scored,
    /// Vendor status passed through unchanged
    Reported,
}

/// Verdict plus the derived figures shown next to it
///
/// The integrity figures only exist for [`Basis::Scored`] assessments.
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub verdict: Verdict,
    pub info: DecisionInfo,
    pub basis: Basis,
    pub integrity: Option<f64>,
    pub evidence_reliability: Option<f64>,
    pub integrity_percent: Option<u32>,
    pub reliability_percent: Option<u32>,
    /// round((1 - integrity) * 100)
    pub fake_likelihood_percent: Option<u32>,
    /// Binary lean shown on the integrity gauge (integrity > 0.5)
    pub leans_authentic: Option<bool>,
    /// Figure for the confidence gauge
    pub confidence_percent: u32,
}

impl Assessment {
    pub fn from_result(result: &DetectionResult) -> Self {
        match result.integrity {
            Some(integrity) => Self::scored(result, integrity),
            None => Self::reported(result),
        }
    }

    fn scored(result: &DetectionResult, integrity: f64) -> Self {
        let evidence_reliability = result.evidence_reliability();
        let verdict = classify(integrity, evidence_reliability);

        // Without a confidence map the gauge shows the detector's own confidence
        let confidence_percent = match (&result.confidence_map, result.confidence) {
            (None, Some(confidence)) => to_percent(confidence),
            _ => to_percent(evidence_reliability),
        };

        Self {
            verdict,
            info: verdict.info(),
            basis: Basis::Scored,
            integrity: Some(integrity),
            evidence_reliability: Some(evidence_reliability),
            integrity_percent: Some(to_percent(integrity)),
            reliability_percent: Some(to_percent(evidence_reliability)),
            fake_likelihood_percent: Some(to_percent(1.0 - integrity)),
            leans_authentic: Some(integrity > 0.5),
            confidence_percent,
        }
    }

    fn reported(result: &DetectionResult) -> Self {
        let verdict = result
            .status
            .as_deref()
            .map(Verdict::from_status)
            .unwrap_or(Verdict::Inconclusive);
        debug!(
            "decision: reported status={:?} score={:?} -> {}",
            result.status, result.score, verdict
        );

        Self {
            verdict,
            info: verdict.info(),
            basis: Basis::Reported,
            integrity: None,
            evidence_reliability: None,
            integrity_percent: None,
            reliability_percent: None,
            fake_likelihood_percent: None,
            leans_authentic: None,
            confidence_percent: to_percent(result.score.unwrap_or(0.0)),
        }
    }
}
