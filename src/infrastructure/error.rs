use crate::domain::models::ValidationErrors;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("request failed"))]
    Http { status: u16, message: Option<String> },
    #[error("Invalid response payload: {0}")]
    InvalidPayload(String),
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),
}

impl InfraError {
    /// Message the backend attached to a rejected request, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Http {
                message: Some(message),
                ..
            } => Some(message.as_str()),
            _ => None,
        }
    }

    /// Transport failures and malformed bodies are handled the same way.
    pub fn is_remote_failure(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Http { .. } | Self::InvalidPayload(_)
        )
    }
}
