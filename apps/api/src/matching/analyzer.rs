//! Resume analysis — orchestrates prompt → model → parser for a batch of resumes.
//!
//! Resumes are processed sequentially in upload order. A resume whose text
//! cannot be extracted is skipped without calling the model; a model or parse
//! failure degrades that single entry and the batch carries on.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::extraction::{DocumentExtractor, DocumentKind};
use crate::llm_client::LanguageModel;
use crate::matching::parser::parse_analysis;
use crate::matching::prompts::build_match_prompt;
use crate::models::analysis::{Analysis, AnalysisFailure, MatchEntry};

/// A resume already written to the uploads directory.
#[derive(Debug, Clone)]
pub struct StoredResume {
    pub filename: String,
    pub path: PathBuf,
    pub kind: DocumentKind,
}

/// Analyses one resume against the JD. Never fails: errors become `Degraded`.
pub async fn analyze_resume(llm: &dyn LanguageModel, jd_text: &str, resume_text: &str) -> Analysis {
    let prompt = build_match_prompt(jd_text, resume_text);
    match llm.generate(&prompt, &[]).await {
        Ok(text) => parse_analysis(&text),
        Err(e) => {
            warn!("Error in resume analysis: {e}");
            Analysis::Degraded(AnalysisFailure::Model(e.to_string()))
        }
    }
}

/// Extracts and analyses each resume in order, skipping those without text.
pub async fn analyze_batch(
    llm: &dyn LanguageModel,
    extractor: &dyn DocumentExtractor,
    jd_text: &str,
    resumes: &[StoredResume],
) -> Vec<MatchEntry> {
    let mut entries = Vec::with_capacity(resumes.len());

    for resume in resumes {
        let resume_text = extractor.extract(&resume.path, resume.kind).await;
        if resume_text.trim().is_empty() {
            warn!("No text extracted from {}, skipping", resume.filename);
            continue;
        }

        let analysis = analyze_resume(llm, jd_text, &resume_text).await;
        info!(
            "Analysed {} (degraded: {})",
            resume.filename,
            analysis.is_degraded()
        );
        entries.push(MatchEntry {
            filename: resume.filename.clone(),
            analysis,
        });
    }

    entries
}
