//! Process startup shared by both binaries.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extraction::{ocr::OcrEngine, FileExtractor};
use crate::llm_client::GeminiClient;
use crate::state::AppState;

/// Installs the global tracing subscriber. `RUST_LOG` takes precedence; the
/// configured level applies to this library, the calling binary and
/// `tower_http` otherwise.
pub fn init_tracing(config: &Config, bin_target: &str) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter(bin_target, &config.rust_log))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn default_filter(bin_target: &str, level: &str) -> String {
    let lib_target = env!("CARGO_CRATE_NAME");
    if bin_target == lib_target {
        format!("{lib_target}={level},tower_http={level}")
    } else {
        format!("{lib_target}={level},{bin_target}={level},tower_http={level}")
    }
}

/// Creates the uploads directory, selects the Gemini model and wires the
/// extractor. Fails when no candidate model is accessible.
pub async fn build_state(config: Config) -> Result<AppState> {
    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| {
            format!(
                "Cannot create uploads directory {}",
                config.upload_dir.display()
            )
        })?;

    let llm = GeminiClient::connect(
        config.google_api_key.clone(),
        config.gemini_api_base.clone(),
        &config.gemini_models,
        config.llm_timeout,
    )
    .await
    .context("Gemini model selection failed")?;

    let extractor = FileExtractor::new(OcrEngine::new(
        config.tesseract_path.clone(),
        config.ocr_lang.clone(),
    ));

    Ok(AppState {
        config: Arc::new(config),
        llm: Arc::new(llm),
        extractor: Arc::new(extractor),
    })
}

/// Binds `0.0.0.0:<port>` and serves until the process exits.
pub async fn serve(app: Router, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Cannot bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
