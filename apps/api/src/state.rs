use std::sync::Arc;

use crate::config::Config;
use crate::extraction::DocumentExtractor;
use crate::llm_client::LanguageModel;

/// Shared application state injected into all route handlers via Axum extractors.
/// Built once at startup; nothing in it is mutated by requests.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Model chosen at startup. Stubbed in tests.
    pub llm: Arc<dyn LanguageModel>,
    /// Default: `FileExtractor` with a lazily probed OCR engine.
    pub extractor: Arc<dyn DocumentExtractor>,
}
