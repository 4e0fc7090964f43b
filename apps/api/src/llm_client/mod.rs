/// LLM Client — the single point of entry for all Gemini API calls in JobFit.
///
/// No other module may call the provider directly. Handlers talk to the
/// `LanguageModel` trait so tests can swap in a stub.
///
/// The model is chosen once at startup from a preference list; it never
/// changes for the lifetime of the process.
use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as Base64Engine, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

const API_KEY_HEADER: &str = "x-goog-api-key";
const JSON_FENCE_OPEN: &str = "```json";
const FENCE_CLOSE: &str = "```";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("No accessible Gemini model (tried: {tried})")]
    NoAccessibleModel { tried: String },
}

/// An image sent alongside the prompt for vision-capable models.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub mime_type: &'static str,
    pub data: bytes::Bytes,
}

impl ImageAttachment {
    /// Builds an attachment from a file extension; `None` for non-image types.
    pub fn from_extension(extension: &str, data: bytes::Bytes) -> Option<Self> {
        let mime_type = match extension.to_ascii_lowercase().as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            _ => return None,
        };
        Some(Self { mime_type, data })
    }
}

/// Text generation seam. Carried in `AppState` as `Arc<dyn LanguageModel>`.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Sends the prompt (plus any images) and returns the raw completion text.
    async fn generate(&self, prompt: &str, images: &[ImageAttachment])
        -> Result<String, LlmError>;

    /// Identifier of the model serving requests, for logs and pages.
    fn model_name(&self) -> &str;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text {
        text: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// Concatenates the text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Gemini REST client bound to a single, already-verified model.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl GeminiClient {
    /// Probes each candidate model in preference order and binds the client to
    /// the first one the key can access. Fails when none is accessible.
    pub async fn connect(
        api_key: String,
        api_base: String,
        candidates: &[String],
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(timeout).build()?;
        let api_base = api_base.trim_end_matches('/').to_string();

        for candidate in candidates {
            let model = normalize_model_name(candidate);
            match probe_model(&client, &api_key, &api_base, &model).await {
                Ok(()) => {
                    info!("Using Gemini model {model}");
                    return Ok(Self {
                        client,
                        api_key,
                        api_base,
                        model,
                    });
                }
                Err(e) => warn!("Gemini model {model} unavailable: {e}"),
            }
        }

        Err(LlmError::NoAccessibleModel {
            tried: candidates.join(", "),
        })
    }

    fn generate_url(&self) -> String {
        format!("{}/{}:generateContent", self.api_base, self.model)
    }

    /// Makes a raw call to `generateContent`, returning the full response.
    pub async fn call(
        &self,
        prompt: &str,
        images: &[ImageAttachment],
    ) -> Result<GenerateContentResponse, LlmError> {
        let request_body = build_request(prompt, images);

        let response = self
            .client
            .post(self.generate_url())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: provider_message(body),
            });
        }

        let body: GenerateContentResponse = response.json().await?;
        if let Some(usage) = &body.usage_metadata {
            debug!(
                "Gemini call succeeded: prompt_tokens={}, output_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }
        Ok(body)
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        images: &[ImageAttachment],
    ) -> Result<String, LlmError> {
        let started = Instant::now();
        let response = self.call(prompt, images).await?;
        info!(
            "Gemini API call took {:.2} seconds",
            started.elapsed().as_secs_f64()
        );
        response.text().ok_or(LlmError::EmptyContent)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

async fn probe_model(
    client: &Client,
    api_key: &str,
    api_base: &str,
    model: &str,
) -> Result<(), LlmError> {
    let response = client
        .get(format!("{api_base}/{model}"))
        .header(API_KEY_HEADER, api_key)
        .send()
        .await?;

    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(LlmError::Api {
        status: status.as_u16(),
        message: provider_message(body),
    })
}

fn build_request<'a>(prompt: &'a str, images: &[ImageAttachment]) -> GenerateContentRequest<'a> {
    let mut parts = vec![RequestPart::Text { text: prompt }];
    parts.extend(images.iter().map(|image| RequestPart::InlineData {
        inline_data: InlineData {
            mime_type: image.mime_type,
            data: Base64Engine.encode(&image.data),
        },
    }));
    GenerateContentRequest {
        contents: vec![RequestContent { role: "user", parts }],
    }
}

/// Pulls the provider's error message out of an error body, falling back to the raw body.
fn provider_message(body: String) -> String {
    serde_json::from_str::<GeminiError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

/// Strips a leading ```json marker and a trailing ``` marker from model output.
/// Each marker is removed independently; nothing else is touched.
pub fn strip_json_fences(text: &str) -> &str {
    let mut text = text.trim();
    if let Some(stripped) = text.strip_prefix(JSON_FENCE_OPEN) {
        text = stripped;
    }
    if let Some(stripped) = text.strip_suffix(FENCE_CLOSE) {
        text = stripped;
    }
    text.trim()
}

/// Model ids are addressed as `models/<name>` on the REST API.
fn normalize_model_name(model: &str) -> String {
    let model = model.trim();
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}
