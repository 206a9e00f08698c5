//! Error types for the Elidune admin client

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Server error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Form is invalid: {0}")]
    InvalidForm(#[from] validator::ValidationErrors),

    #[error("Failed to load {kind} list: {message}")]
    ReferenceLoad { kind: String, message: String },

    #[error("Unable to load book: {0}")]
    RecordFetch(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error body returned by the Elidune server
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub error: String,
    pub message: String,
}

impl AppError {
    /// Build an error from a non-success HTTP response.
    ///
    /// The server's `message` is preferred; the raw body is used when it is
    /// not a JSON error document.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorResponse>(body)
            .map(|e| e.message)
            .unwrap_or_else(|_| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("Unknown error")
                        .to_string()
                } else {
                    trimmed.to_string()
                }
            });

        match status {
            StatusCode::NOT_FOUND => AppError::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                AppError::Validation(message)
            }
            _ => AppError::Api {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Single message suitable for an alert banner
    pub fn user_message(&self) -> String {
        match self {
            AppError::Http(e) if e.is_timeout() => "The server did not respond in time".to_string(),
            AppError::Http(_) => "Unable to reach the server".to_string(),
            AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::RecordFetch(msg)
            | AppError::Internal(msg) => msg.clone(),
            AppError::Api { message, .. } => message.clone(),
            AppError::InvalidForm(_) => "Please correct the highlighted fields".to_string(),
            AppError::ReferenceLoad { kind, .. } => format!("Unable to load the {} list", kind),
            AppError::Config(e) => e.to_string(),
        }
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
