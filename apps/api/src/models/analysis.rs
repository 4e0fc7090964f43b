//! Per-candidate analysis records produced by the resume-match pipeline.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const UNKNOWN_CANDIDATE: &str = "Unknown Candidate";

/// Experience-match verdict. The model may only answer Yes / No / Partially;
/// `AnalysisError` is reserved for degraded analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Verdict {
    Yes,
    No,
    Partially,
    AnalysisError,
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Yes => "Yes",
            Verdict::No => "No",
            Verdict::Partially => "Partially",
            Verdict::AnalysisError => "Analysis Error",
        }
    }

    /// CSS class used by the results page.
    pub fn css_class(&self) -> &'static str {
        match self {
            Verdict::Yes => "verdict-yes",
            Verdict::No => "verdict-no",
            Verdict::Partially => "verdict-partial",
            Verdict::AnalysisError => "verdict-error",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<String> for Verdict {
    type Error = String;

    /// Accepts the label case-insensitively, tolerating trailing commentary
    /// such as "Partially - 3 of 5 years".
    fn try_from(raw: String) -> Result<Self, Self::Error> {
        let normalized = raw.trim().to_lowercase();
        if normalized.starts_with("analysis error") {
            return Ok(Verdict::AnalysisError);
        }
        let head = normalized
            .split(|c: char| !c.is_alphabetic())
            .find(|w| !w.is_empty())
            .unwrap_or_default();
        match head {
            "yes" => Ok(Verdict::Yes),
            "no" => Ok(Verdict::No),
            "partially" | "partial" => Ok(Verdict::Partially),
            _ => Err(format!("unrecognised experience_match verdict: '{raw}'")),
        }
    }
}

impl From<Verdict> for String {
    fn from(verdict: Verdict) -> Self {
        verdict.label().to_string()
    }
}

/// The five-field analysis the model is asked to return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub candidate_name: String,
    pub experience_match: Verdict,
    pub experience_analysis: String,
    pub missing_keywords: Vec<String>,
    pub suggestions: String,
}

/// Why an analysis could not be produced.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisFailure {
    /// The model answered but the answer was not the expected JSON.
    Parse(String),
    /// The model call itself failed.
    Model(String),
}

impl AnalysisFailure {
    /// Fixed record rendered in place of a real analysis.
    pub fn fallback_record(&self) -> AnalysisResult {
        match self {
            AnalysisFailure::Parse(_) => AnalysisResult {
                candidate_name: UNKNOWN_CANDIDATE.to_string(),
                experience_match: Verdict::AnalysisError,
                experience_analysis: "Could not analyze experience match - JSON parsing failed"
                    .to_string(),
                missing_keywords: vec!["Analysis failed".to_string()],
                suggestions: "Error in analysis. Please try again.".to_string(),
            },
            AnalysisFailure::Model(detail) => AnalysisResult {
                candidate_name: UNKNOWN_CANDIDATE.to_string(),
                experience_match: Verdict::AnalysisError,
                experience_analysis: format!(
                    "AI analysis failed: {detail}. Please check your API key and try again."
                ),
                missing_keywords: vec!["AI analysis unavailable".to_string()],
                suggestions: "Unable to perform AI analysis. Please ensure your Google API key \
                    is valid and the model is accessible."
                    .to_string(),
            },
        }
    }
}

/// Outcome of analysing one resume. Callers must handle the degraded case.
#[derive(Debug, Clone, PartialEq)]
pub enum Analysis {
    Matched(AnalysisResult),
    Degraded(AnalysisFailure),
}

impl Analysis {
    /// The record to display: the real analysis or the fixed fallback.
    pub fn record(&self) -> AnalysisResult {
        match self {
            Analysis::Matched(result) => result.clone(),
            Analysis::Degraded(failure) => failure.fallback_record(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Analysis::Degraded(_))
    }
}

/// One row of the results page.
#[derive(Debug, Clone)]
pub struct MatchEntry {
    pub filename: String,
    pub analysis: Analysis,
}

/// All analyses for one job-description comparison, in upload order.
#[derive(Debug, Clone)]
pub struct MatchReport {
    pub jd_filename: String,
    pub entries: Vec<MatchEntry>,
    pub generated_at: DateTime<Utc>,
}
