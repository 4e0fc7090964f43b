//! Axum route handlers for the resume-match server.

use askama::Template;
use axum::{
    extract::{Multipart, Query, State},
    response::Html,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::forms::FormData;
use crate::matching::analyzer::{analyze_batch, StoredResume};
use crate::models::analysis::MatchReport;
use crate::state::AppState;
use crate::views::{ResultsPage, UploadPage};

pub const JD_FIELD: &str = "jd_file";
pub const RESUMES_FIELD: &str = "resume_files";

#[derive(Debug, Default, Deserialize)]
pub struct FlashQuery {
    pub error: Option<String>,
}

/// GET /
pub async fn handle_index(
    State(state): State<AppState>,
    Query(query): Query<FlashQuery>,
) -> Result<Html<String>, AppError> {
    let page = UploadPage {
        flash: query.error,
        max_resumes: state.config.max_resumes,
    };
    Ok(Html(page.render()?))
}

/// POST /upload
///
/// Validates the whole form before anything is written, then runs
/// extract → prompt → model → parse for each resume in upload order.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let mut form = FormData::read(multipart).await?;

    let mut jd_files = form.take_files(JD_FIELD);
    if jd_files.is_empty() {
        return Err(AppError::validation("Please upload a Job Description file"));
    }
    if jd_files.len() > 1 {
        return Err(AppError::validation(
            "Please upload exactly one Job Description file",
        ));
    }
    let jd = jd_files.remove(0);

    let resumes = form.take_files(RESUMES_FIELD);
    if resumes.is_empty() {
        return Err(AppError::validation("Please upload at least one resume file"));
    }
    let max_resumes = state.config.max_resumes;
    if resumes.len() > max_resumes {
        return Err(AppError::validation(format!(
            "Maximum {max_resumes} resumes allowed"
        )));
    }

    let jd_kind = jd
        .kind()
        .ok_or_else(|| AppError::validation("Invalid Job Description file format"))?;

    let upload_dir = &state.config.upload_dir;
    let jd_path = jd.persist(upload_dir, "jd_").await?;
    let jd_text = state.extractor.extract(&jd_path, jd_kind).await;
    if jd_text.trim().is_empty() {
        return Err(AppError::validation(
            "Could not extract text from Job Description",
        ));
    }

    let mut stored = Vec::with_capacity(resumes.len());
    for (i, resume) in resumes.iter().enumerate() {
        let Some(kind) = resume.kind() else {
            warn!("Skipping unsupported resume file {}", resume.original_name);
            continue;
        };
        let path = resume.persist(upload_dir, &format!("resume_{i}_")).await?;
        stored.push(StoredResume {
            filename: resume.safe_name(),
            path,
            kind,
        });
    }

    info!(
        "Analysing {} resume(s) against {}",
        stored.len(),
        jd.safe_name()
    );
    let entries = analyze_batch(
        state.llm.as_ref(),
        state.extractor.as_ref(),
        &jd_text,
        &stored,
    )
    .await;

    if entries.is_empty() {
        return Err(AppError::validation("Could not process any resume files"));
    }

    let report = MatchReport {
        jd_filename: jd.safe_name(),
        entries,
        generated_at: Utc::now(),
    };
    let page = ResultsPage::from_report(&report, state.llm.model_name());
    Ok(Html(page.render()?))
}

/// GET /results
pub async fn handle_results() -> Result<Html<String>, AppError> {
    Ok(Html(ResultsPage::empty().render()?))
}
