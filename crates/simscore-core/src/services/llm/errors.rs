//! Provider-agnostic LLM error types

use thiserror::Error;

use crate::services::google_ai::GoogleAiError;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Rate limit exceeded: {message}")]
    RateLimitExceeded { message: String },

    #[error("Request timeout after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Content blocked by safety filters")]
    ContentBlocked,

    #[error("Quota exceeded: {message}")]
    QuotaExceeded { message: String },

    #[error("Server error: {message}")]
    ServerError { message: String },

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Provider unavailable: {message}")]
    ProviderUnavailable { message: String },
}

impl LlmError {
    /// Transient failures a user might succeed with by re-running later
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LlmError::RateLimitExceeded { .. }
                | LlmError::Timeout { .. }
                | LlmError::NetworkError { .. }
                | LlmError::ServerError { .. }
                | LlmError::ProviderUnavailable { .. }
        )
    }

    pub fn user_message(&self) -> String {
        match self {
            LlmError::ConfigurationError { message } => {
                format!("Configuration error: {message}")
            }
            LlmError::AuthenticationFailed { .. } => {
                "Authentication failed. Please check your API key.".to_string()
            }
            LlmError::RateLimitExceeded { .. } => {
                "Rate limit exceeded. Please wait a moment and try again.".to_string()
            }
            LlmError::Timeout { timeout_secs } => {
                format!("Request timed out after {timeout_secs} seconds.")
            }
            LlmError::NetworkError { .. } => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            LlmError::ContentBlocked => "Content was blocked by safety filters.".to_string(),
            LlmError::QuotaExceeded { .. } => {
                "API quota exceeded. Please check your usage limits.".to_string()
            }
            LlmError::ServerError { .. } | LlmError::ProviderUnavailable { .. } => {
                "The evaluation service is experiencing issues. Please try again later."
                    .to_string()
            }
            LlmError::ParseError { .. } | LlmError::InvalidResponse { .. } => {
                "Received an invalid response from the evaluation service.".to_string()
            }
            LlmError::InvalidRequest { message } => format!("Invalid request: {message}"),
        }
    }
}

impl From<GoogleAiError> for LlmError {
    fn from(err: GoogleAiError) -> Self {
        match err {
            GoogleAiError::AuthenticationFailed { message } => {
                LlmError::AuthenticationFailed { message }
            }
            GoogleAiError::RateLimitExceeded { message } => LlmError::RateLimitExceeded { message },
            GoogleAiError::Timeout { timeout_ms } => LlmError::Timeout {
                timeout_secs: timeout_ms / 1000,
            },
            GoogleAiError::NetworkError { source } => LlmError::NetworkError {
                message: source.to_string(),
            },
            GoogleAiError::InvalidRequest { message } => LlmError::InvalidRequest { message },
            GoogleAiError::ContentBlocked => LlmError::ContentBlocked,
            GoogleAiError::QuotaExceeded { message } => LlmError::QuotaExceeded { message },
            GoogleAiError::ServerError { message, .. } => LlmError::ServerError { message },
            GoogleAiError::ParseError { message } => LlmError::ParseError { message },
            GoogleAiError::InvalidResponse { message } => LlmError::InvalidResponse { message },
            GoogleAiError::ServiceUnavailable { message } => {
                LlmError::ProviderUnavailable { message }
            }
            GoogleAiError::ConfigurationError { message } => {
                LlmError::ConfigurationError { message }
            }
        }
    }
}
