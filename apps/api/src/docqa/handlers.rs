//! Axum route handlers for the document Q&A server.

use askama::Template;
use axum::{
    extract::{Multipart, Query, State},
    response::Html,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::docqa::corpus::{build_corpus, scan_folders, Corpus, SourceFile};
use crate::docqa::prompts::build_qa_prompt;
use crate::docqa::relevance::{select_most_relevant, RelevanceError};
use crate::errors::AppError;
use crate::forms::FormData;
use crate::llm_client::{LanguageModel, LlmError};
use crate::matching::handlers::FlashQuery;
use crate::state::AppState;
use crate::views::DocQaPage;

pub const FILES_FIELD: &str = "files";
pub const QUERY_FIELD: &str = "query";
pub const FOLDER_FIELD: &str = "folder_input";

/// Failures shown in the response area instead of an answer.
#[derive(Debug, Error)]
pub enum AnswerError {
    #[error("{0}")]
    Relevance(#[from] RelevanceError),

    #[error("Error from Gemini: {0}")]
    Model(#[from] LlmError),
}

/// GET /
pub async fn handle_docqa_page(
    Query(query): Query<FlashQuery>,
) -> Result<Html<String>, AppError> {
    let page = DocQaPage {
        flash: query.error,
        ..DocQaPage::default()
    };
    Ok(Html(page.render()?))
}

/// POST /
pub async fn handle_docqa_submit(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let mut form = FormData::read(multipart).await?;
    let query = form.text(QUERY_FIELD).unwrap_or_default().to_string();
    let folder_input = form.text(FOLDER_FIELD).unwrap_or_default().to_string();

    let mut sources = Vec::new();
    for upload in form.take_files(FILES_FIELD) {
        let Some(kind) = upload.kind() else {
            warn!("Skipping unsupported upload {}", upload.original_name);
            continue;
        };
        let path = upload.persist(&state.config.upload_dir, "").await?;
        sources.push(SourceFile {
            path,
            kind,
            preview_url: Some(format!(
                "/static/uploads/{}",
                urlencoding::encode(&upload.safe_name())
            )),
        });
    }
    sources.extend(scan_folders(&folder_input).await);

    let corpus = build_corpus(state.extractor.as_ref(), &sources).await;
    info!(
        "Q&A corpus: {} file(s), {} document(s), {} image(s)",
        sources.len(),
        corpus.documents.len(),
        corpus.images.len()
    );

    let mut page = DocQaPage {
        query,
        folder_input,
        images: corpus.previews.clone(),
        ..DocQaPage::default()
    };

    if !corpus.documents.is_empty() {
        let outcome = answer_query(state.llm.as_ref(), &corpus, &page.query).await;
        match outcome {
            Ok(answer) => page.response = Some(answer),
            Err(e) => {
                warn!("Q&A request failed: {e}");
                page.error = Some(e.to_string());
            }
        }
    }

    Ok(Html(page.render()?))
}

/// Selects the most relevant document and asks the model about it.
pub async fn answer_query(
    llm: &dyn LanguageModel,
    corpus: &Corpus,
    query: &str,
) -> Result<String, AnswerError> {
    let selection = select_most_relevant(query, &corpus.documents)?;
    info!(
        "Selected document {} (score {:.3})",
        selection.index, selection.score
    );
    let prompt = build_qa_prompt(selection.text, query);
    Ok(llm.generate(&prompt, &corpus.images).await?)
}
