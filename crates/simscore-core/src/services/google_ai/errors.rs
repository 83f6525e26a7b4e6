use thiserror::Error;

#[derive(Debug, Error)]
pub enum GoogleAiError {
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Rate limit exceeded: {message}")]
    RateLimitExceeded { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Network error: {source}")]
    NetworkError { source: reqwest::Error },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Content blocked by safety filters")]
    ContentBlocked,

    #[error("Quota exceeded: {message}")]
    QuotaExceeded { message: String },

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}

impl GoogleAiError {
    pub fn is_authentication_error(&self) -> bool {
        matches!(self, GoogleAiError::AuthenticationFailed { .. })
    }

    pub fn is_timeout_error(&self) -> bool {
        matches!(self, GoogleAiError::Timeout { .. })
    }

    pub fn from_reqwest_error(error: reqwest::Error, timeout_ms: u64) -> Self {
        if error.is_timeout() {
            GoogleAiError::Timeout { timeout_ms }
        } else if let Some(status) = error.status() {
            let message = error.to_string();
            match status.as_u16() {
                401 => GoogleAiError::AuthenticationFailed { message },
                403 => GoogleAiError::QuotaExceeded { message },
                429 => GoogleAiError::RateLimitExceeded { message },
                code @ 500..=599 => GoogleAiError::ServerError {
                    status: code,
                    message,
                },
                _ => GoogleAiError::InvalidRequest { message },
            }
        } else {
            GoogleAiError::NetworkError { source: error }
        }
    }

    pub fn from_status_and_body(status: reqwest::StatusCode, body: &str) -> Self {
        let status_code = status.as_u16();

        // Prefer the structured `error.message` when the body is JSON
        let error_message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                value
                    .get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| body.to_string());

        match status_code {
            400 => GoogleAiError::InvalidRequest {
                message: error_message,
            },
            401 => GoogleAiError::AuthenticationFailed {
                message: error_message,
            },
            403 if error_message.to_lowercase().contains("quota") => {
                GoogleAiError::QuotaExceeded {
                    message: error_message,
                }
            }
            403 => GoogleAiError::AuthenticationFailed {
                message: error_message,
            },
            429 => GoogleAiError::RateLimitExceeded {
                message: error_message,
            },
            503 => GoogleAiError::ServiceUnavailable {
                message: error_message,
            },
            500..=599 => GoogleAiError::ServerError {
                status: status_code,
                message: error_message,
            },
            _ => GoogleAiError::InvalidRequest {
                message: format!("HTTP {status_code}: {error_message}"),
            },
        }
    }
}
