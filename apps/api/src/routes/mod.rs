pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};

use crate::docqa::handlers as docqa;
use crate::matching::handlers as matching;
use crate::state::AppState;

/// Router of the resume-match server.
pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/", get(matching::handle_index))
        .route("/upload", post(matching::handle_upload))
        .route("/results", get(matching::handle_results));
    finish(router, state)
}

/// Router of the document Q&A server.
pub fn build_docqa_router(state: AppState) -> Router {
    let router = Router::new().route(
        "/",
        get(docqa::handle_docqa_page).post(docqa::handle_docqa_submit),
    );
    finish(router, state)
}

/// Shared routes and layers: health, upload previews, body limit, request
/// timeout, the global in-flight limit and request tracing.
fn finish(router: Router<AppState>, state: AppState) -> Router {
    let config = state.config.clone();
    router
        .route("/health", get(health::health_handler))
        .nest_service("/static/uploads", ServeDir::new(&config.upload_dir))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(GlobalConcurrencyLimitLayer::new(
            config.max_concurrent_requests.max(1),
        ))
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    use async_trait::async_trait;

    use super::*;
    use crate::config::Config;
    use crate::llm_client::{ImageAttachment, LanguageModel, LlmError};
    use crate::matching::analyzer::tests::{analysis_json, MapExtractor, ScriptedModel};

    const BOUNDARY: &str = "jobfit-test-boundary";

    fn config(upload_dir: &Path) -> Config {
        Config {
            google_api_key: "test".to_string(),
            gemini_api_base: "http://127.0.0.1:9".to_string(),
            gemini_models: vec!["models/test".to_string()],
            llm_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
            max_concurrent_requests: 1,
            max_resumes: 5,
            max_upload_bytes: 1024 * 1024,
            upload_dir: upload_dir.to_path_buf(),
            tesseract_path: "tesseract".to_string(),
            ocr_lang: "eng".to_string(),
            port: 0,
            rust_log: "info".to_string(),
        }
    }

    fn state(
        upload_dir: &Path,
        llm: Arc<ScriptedModel>,
        texts: &[(&str, &str)],
    ) -> AppState {
        state_with(config(upload_dir), llm, texts)
    }

    fn state_with(
        config: Config,
        llm: Arc<dyn LanguageModel>,
        texts: &[(&str, &str)],
    ) -> AppState {
        let texts: HashMap<String, String> = texts
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppState {
            config: Arc::new(config),
            llm,
            extractor: Arc::new(MapExtractor(texts)),
        }
    }

    /// Answers after a fixed delay and records the peak number of
    /// overlapping calls.
    struct SlowModel {
        delay: Duration,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl SlowModel {
        fn new(delay: Duration) -> Self {
            Self {
                delay,
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LanguageModel for SlowModel {
        async fn generate(
            &self,
            _prompt: &str,
            _images: &[ImageAttachment],
        ) -> Result<String, LlmError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok("slow answer".to_string())
        }

        fn model_name(&self) -> &str {
            "slow"
        }
    }

    fn docqa_request() -> Request<Body> {
        post(
            "/",
            multipart(&[("files", "a.pdf", "%PDF")], &[("query", "rust")]),
        )
    }

    /// (field, filename, content) file parts plus (field, value) text parts.
    fn multipart(files: &[(&str, &str, &str)], fields: &[(&str, &str)]) -> Body {
        let mut body = String::new();
        for (field, filename, content) in files {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; \
                 filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n\
                 {content}\r\n"
            ));
        }
        for (field, value) in fields {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        Body::from(body)
    }

    fn post(uri: &str, body: Body) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(body)
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &axum::response::Response) -> String {
        let raw = response.headers()[header::LOCATION].to_str().unwrap();
        urlencoding::decode(raw).unwrap().into_owned()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state(dir.path(), Arc::new(ScriptedModel::new(vec![])), &[]));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("\"status\":\"ok\""));
    }

    #[tokio::test]
    async fn test_index_renders_flash() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state(dir.path(), Arc::new(ScriptedModel::new(vec![])), &[]));
        let response = app
            .oneshot(
                Request::get("/?error=Maximum%205%20resumes%20allowed")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Maximum 5 resumes allowed"));
    }

    #[tokio::test]
    async fn test_zero_resumes_rejected_and_nothing_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(ScriptedModel::new(vec![]));
        let app = build_router(state(dir.path(), llm.clone(), &[("jd_jd.pdf", "JD")]));

        let response = app
            .oneshot(post("/upload", multipart(&[("jd_file", "jd.pdf", "%PDF")], &[])))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/?error=Please upload at least one resume file");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_jd_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state(dir.path(), Arc::new(ScriptedModel::new(vec![])), &[]));
        let response = app
            .oneshot(post(
                "/upload",
                multipart(&[("resume_files", "a.pdf", "%PDF")], &[]),
            ))
            .await
            .unwrap();
        assert_eq!(location(&response), "/?error=Please upload a Job Description file");
    }

    #[tokio::test]
    async fn test_more_than_five_resumes_rejected_before_model() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(ScriptedModel::new(vec![]));
        let app = build_router(state(dir.path(), llm.clone(), &[]));

        let names: Vec<String> = (0..6).map(|i| format!("r{i}.pdf")).collect();
        let mut files = vec![("jd_file", "jd.pdf", "%PDF")];
        files.extend(names.iter().map(|n| ("resume_files", n.as_str(), "%PDF")));

        let response = app.oneshot(post("/upload", multipart(&files, &[]))).await.unwrap();

        assert_eq!(location(&response), "/?error=Maximum 5 resumes allowed");
        assert_eq!(llm.call_count(), 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_jd_format_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state(dir.path(), Arc::new(ScriptedModel::new(vec![])), &[]));
        let response = app
            .oneshot(post(
                "/upload",
                multipart(
                    &[("jd_file", "jd.docx", "x"), ("resume_files", "a.pdf", "%PDF")],
                    &[],
                ),
            ))
            .await
            .unwrap();
        assert_eq!(location(&response), "/?error=Invalid Job Description file format");
    }

    #[tokio::test]
    async fn test_unreadable_jd_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state(dir.path(), Arc::new(ScriptedModel::new(vec![])), &[]));
        let response = app
            .oneshot(post(
                "/upload",
                multipart(
                    &[("jd_file", "jd.pdf", "%PDF"), ("resume_files", "a.pdf", "%PDF")],
                    &[],
                ),
            ))
            .await
            .unwrap();
        assert_eq!(
            location(&response),
            "/?error=Could not extract text from Job Description"
        );
    }

    #[tokio::test]
    async fn test_upload_renders_results_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(ScriptedModel::new(vec![
            Ok(analysis_json("Ada Lovelace", "Yes")),
            Err("quota exceeded".to_string()),
        ]));
        let app = build_router(state(
            dir.path(),
            llm.clone(),
            &[
                ("jd_jd.pdf", "Senior Rust engineer"),
                ("resume_0_ada.pdf", "Ada resume"),
                ("resume_2_grace.pdf", "Grace resume"),
            ],
        ));

        let response = app
            .oneshot(post(
                "/upload",
                multipart(
                    &[
                        ("jd_file", "jd.pdf", "%PDF"),
                        ("resume_files", "ada.pdf", "%PDF"),
                        ("resume_files", "blank.pdf", "%PDF"),
                        ("resume_files", "grace.pdf", "%PDF"),
                    ],
                    &[],
                ),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(llm.call_count(), 2);
        let html = body_text(response).await;
        let ada = html.find("Ada Lovelace").unwrap();
        let failed = html.find("Analysis Error").unwrap();
        assert!(ada < failed);
        assert!(!html.contains("blank.pdf"));
        assert!(dir.path().join("resume_1_blank.pdf").exists());
    }

    #[tokio::test]
    async fn test_unsupported_resume_skipped_not_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(ScriptedModel::new(vec![Ok(analysis_json("Ada Lovelace", "Yes"))]));
        let app = build_router(state(
            dir.path(),
            llm.clone(),
            &[("jd_jd.pdf", "Senior Rust engineer"), ("resume_0_ada.pdf", "Ada resume")],
        ));

        let response = app
            .oneshot(post(
                "/upload",
                multipart(
                    &[
                        ("jd_file", "jd.pdf", "%PDF"),
                        ("resume_files", "ada.pdf", "%PDF"),
                        ("resume_files", "notes.docx", "PK"),
                    ],
                    &[],
                ),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(llm.call_count(), 1);
        let html = body_text(response).await;
        assert_eq!(html.matches("class=\"card").count(), 1);
        assert!(html.contains("Ada Lovelace"));
        assert!(!html.contains("notes.docx"));
        assert!(!dir.path().join("resume_1_notes.docx").exists());
    }

    #[tokio::test]
    async fn test_slow_request_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());
        config.request_timeout = Duration::from_millis(100);
        let llm = Arc::new(SlowModel::new(Duration::from_millis(500)));
        let app = build_docqa_router(state_with(config, llm, &[("a.pdf", "rust")]));

        let response = app.oneshot(docqa_request()).await.unwrap();

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn test_requests_are_served_one_at_a_time() {
        let dir = tempfile::tempdir().unwrap();
        let delay = Duration::from_millis(150);
        let llm = Arc::new(SlowModel::new(delay));
        let app = build_docqa_router(state_with(
            config(dir.path()),
            llm.clone(),
            &[("a.pdf", "rust")],
        ));

        let started = Instant::now();
        let (first, second) = tokio::join!(
            app.clone().oneshot(docqa_request()),
            app.clone().oneshot(docqa_request()),
        );

        assert_eq!(first.unwrap().status(), StatusCode::OK);
        assert_eq!(second.unwrap().status(), StatusCode::OK);
        assert_eq!(llm.peak.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() >= delay * 2);
    }

    #[tokio::test]
    async fn test_no_processable_resumes_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(ScriptedModel::new(vec![]));
        let app = build_router(state(dir.path(), llm.clone(), &[("jd_jd.pdf", "JD")]));
        let response = app
            .oneshot(post(
                "/upload",
                multipart(
                    &[("jd_file", "jd.pdf", "%PDF"), ("resume_files", "a.pdf", "%PDF")],
                    &[],
                ),
            ))
            .await
            .unwrap();
        assert_eq!(location(&response), "/?error=Could not process any resume files");
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_results_page_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state(dir.path(), Arc::new(ScriptedModel::new(vec![])), &[]));
        let response = app
            .oneshot(Request::get("/results").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(body_text(response).await.contains("No results"));
    }

    #[tokio::test]
    async fn test_docqa_answers_from_uploaded_documents() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(ScriptedModel::new(vec![Ok("Ada has 6 years of Rust".to_string())]));
        let app = build_docqa_router(state(
            dir.path(),
            llm.clone(),
            &[("ada.pdf", "Ada Lovelace rust engineer")],
        ));

        let response = app
            .oneshot(post(
                "/",
                multipart(
                    &[("files", "ada.pdf", "%PDF"), ("files", "notes.txt", "skip")],
                    &[("query", "Who knows rust?"), ("folder_input", "")],
                ),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("class=\"response\""));
        assert!(html.contains("Ada has 6 years of Rust"));
        assert!(dir.path().join("ada.pdf").exists());
        assert!(!dir.path().join("notes.txt").exists());
        assert!(llm.prompts.lock().unwrap()[0].contains("Ada Lovelace rust engineer"));
    }

    #[tokio::test]
    async fn test_docqa_without_documents_renders_no_response() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(ScriptedModel::new(vec![]));
        let app = build_docqa_router(state(dir.path(), llm.clone(), &[]));

        let response = app
            .oneshot(post("/", multipart(&[], &[("query", "anything")])))
            .await
            .unwrap();

        let html = body_text(response).await;
        assert!(!html.contains("class=\"response\""));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_docqa_blank_query_shows_error() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(ScriptedModel::new(vec![]));
        let app = build_docqa_router(state(dir.path(), llm.clone(), &[("a.pdf", "rust")]));

        let response = app
            .oneshot(post(
                "/",
                multipart(&[("files", "a.pdf", "%PDF")], &[("query", " ")]),
            ))
            .await
            .unwrap();

        assert!(body_text(response).await.contains("Please enter a query"));
        assert_eq!(llm.call_count(), 0);
    }
}
