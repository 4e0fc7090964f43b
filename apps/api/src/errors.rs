use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every variant except `Template` turns into a redirect back to the form
/// with a flash message; the page itself never shows a raw error body.
#[derive(Debug, Error)]
pub enum AppError {
    /// User-facing validation message, shown verbatim.
    #[error("{0}")]
    Validation(String),

    #[error("Upload error: {0}")]
    Upload(#[from] MultipartError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    /// Message shown to the user in the flash banner.
    pub fn flash_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            other => format!("An error occurred: {other}"),
        }
    }
}

/// Location of the form page carrying a flash message.
pub fn flash_location(message: &str) -> String {
    format!("/?error={}", urlencoding::encode(message))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Validation(msg) => tracing::info!("Rejected request: {msg}"),
            AppError::Template(e) => {
                tracing::error!("Template error: {e}");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred",
                )
                    .into_response();
            }
            AppError::Upload(e) => tracing::error!("Upload error: {e}"),
            AppError::Io(e) => tracing::error!("I/O error: {e}"),
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
        }

        Redirect::to(&flash_location(&self.flash_message())).into_response()
    }
}
