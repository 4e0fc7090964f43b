use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Model preference order for the resume-match server.
pub const MATCHER_MODELS: &[&str] = &[
    "models/gemini-2.5-flash",
    "models/gemini-1.5-pro",
    "models/gemini-pro",
];

/// Model preference order for the document Q&A server.
pub const DOCQA_MODELS: &[&str] = &["models/gemini-1.5-flash", "models/gemini-2.5-flash"];

const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Application configuration loaded from environment variables.
/// Built once at startup and shared with every handler through `AppState`.
#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: String,
    pub gemini_api_base: String,
    /// Candidate model identifiers, most preferred first.
    pub gemini_models: Vec<String>,
    pub llm_timeout: Duration,
    pub request_timeout: Duration,
    pub max_concurrent_requests: usize,
    pub max_resumes: usize,
    pub max_upload_bytes: usize,
    pub upload_dir: PathBuf,
    pub tesseract_path: String,
    pub ocr_lang: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    /// Reads the environment (and `.env` if present). `default_models` is the
    /// binary-specific preference list used when `GEMINI_MODELS` is unset.
    pub fn from_env(default_models: &[&str]) -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let gemini_models = match std::env::var("GEMINI_MODELS") {
            Ok(raw) => parse_model_list(&raw),
            Err(_) => default_models.iter().map(|m| m.to_string()).collect(),
        };
        if gemini_models.is_empty() {
            anyhow::bail!("GEMINI_MODELS must name at least one model");
        }

        Ok(Config {
            google_api_key: require_env("GOOGLE_API_KEY")?,
            gemini_api_base: std::env::var("GEMINI_API_BASE")
                .unwrap_or_else(|_| DEFAULT_GEMINI_API_BASE.to_string()),
            gemini_models,
            llm_timeout: Duration::from_secs(env_or("LLM_TIMEOUT_SECS", 120)?),
            request_timeout: Duration::from_secs(env_or("REQUEST_TIMEOUT_SECS", 300)?),
            max_concurrent_requests: env_or("MAX_CONCURRENT_REQUESTS", 1)?,
            max_resumes: env_or("MAX_RESUMES", 5)?,
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", 32 * 1024 * 1024)?,
            upload_dir: PathBuf::from(
                std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "static/uploads".to_string()),
            ),
            tesseract_path: std::env::var("TESSERACT_PATH")
                .unwrap_or_else(|_| "tesseract".to_string()),
            ocr_lang: std::env::var("OCR_LANG").unwrap_or_else(|_| "eng".to_string()),
            port: env_or("PORT", 5001)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        Err(_) => Ok(default),
    }
}

/// Splits a comma-separated model list, dropping blanks.
fn parse_model_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
        .collect()
}
