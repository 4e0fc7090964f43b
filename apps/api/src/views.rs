//! HTML pages rendered with askama. Templates live in `templates/`.

use askama::Template;

use crate::models::analysis::{AnalysisResult, MatchReport};

/// Upload form of the resume-match server.
#[derive(Template)]
#[template(path = "upload.html")]
pub struct UploadPage {
    pub flash: Option<String>,
    pub max_resumes: usize,
}

/// One candidate card on the results page.
pub struct ResultRow {
    pub filename: String,
    pub record: AnalysisResult,
    pub degraded: bool,
}

#[derive(Template)]
#[template(path = "results.html")]
pub struct ResultsPage {
    pub jd_filename: String,
    pub rows: Vec<ResultRow>,
    pub generated_at: String,
    pub model: String,
}

impl ResultsPage {
    pub fn from_report(report: &MatchReport, model: &str) -> Self {
        Self {
            jd_filename: report.jd_filename.clone(),
            rows: report
                .entries
                .iter()
                .map(|entry| ResultRow {
                    filename: entry.filename.clone(),
                    record: entry.analysis.record(),
                    degraded: entry.analysis.is_degraded(),
                })
                .collect(),
            generated_at: report.generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            model: model.to_string(),
        }
    }

    /// The page served at `GET /results`: no report attached.
    pub fn empty() -> Self {
        Self {
            jd_filename: String::new(),
            rows: Vec::new(),
            generated_at: String::new(),
            model: String::new(),
        }
    }
}

/// Single page of the document Q&A server.
#[derive(Template, Default)]
#[template(path = "docqa.html")]
pub struct DocQaPage {
    pub flash: Option<String>,
    pub query: String,
    pub folder_input: String,
    pub response: Option<String>,
    pub error: Option<String>,
    /// URLs of uploaded images to preview.
    pub images: Vec<String>,
}
