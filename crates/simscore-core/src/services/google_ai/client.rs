use reqwest::{Client, Response};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::timeout;

use super::errors::GoogleAiError;
use super::models::{GenerateContentRequest, GenerateContentResponse};
use crate::config::DEFAULT_LLM_TIMEOUT_SECS;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Clone)]
pub struct GoogleAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub max_concurrent_requests: usize,
}

impl Default for GoogleAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
            max_concurrent_requests: 15,
        }
    }
}

impl GoogleAiConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), GoogleAiError> {
        if self.api_key.trim().is_empty() {
            return Err(GoogleAiError::ConfigurationError {
                message: "Google AI API key is required".to_string(),
            });
        }

        if self.base_url.is_empty() {
            return Err(GoogleAiError::ConfigurationError {
                message: "Base URL cannot be empty".to_string(),
            });
        }

        if self.model.is_empty() {
            return Err(GoogleAiError::ConfigurationError {
                message: "Model name cannot be empty".to_string(),
            });
        }

        if self.max_concurrent_requests == 0 {
            return Err(GoogleAiError::ConfigurationError {
                message: "At least one concurrent request must be allowed".to_string(),
            });
        }

        Ok(())
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

/// HTTP client for the Gemini `generateContent` endpoint. Each call is a
/// single attempt; failures are returned to the caller as-is.
#[derive(Clone)]
pub struct GoogleAiClient {
    config: GoogleAiConfig,
    client: Client,
    rate_limiter: Arc<Semaphore>,
}

impl GoogleAiClient {
    pub fn new(config: GoogleAiConfig) -> Result<Self, GoogleAiError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GoogleAiError::ConfigurationError {
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        let rate_limiter = Arc::new(Semaphore::new(config.max_concurrent_requests));

        Ok(Self {
            config,
            client,
            rate_limiter,
        })
    }

    pub async fn generate_content(
        &self,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GoogleAiError> {
        let _permit =
            self.rate_limiter
                .acquire()
                .await
                .map_err(|_| GoogleAiError::RateLimitExceeded {
                    message: "Rate limiter closed".to_string(),
                })?;

        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        );
        let timeout_ms = self.config.timeout_ms();

        tracing::debug!(model = %self.config.model, "Sending generateContent request");

        let response = timeout(
            self.config.timeout,
            self.client
                .post(&url)
                .header("x-goog-api-key", &self.config.api_key)
                .json(&request)
                .send(),
        )
        .await
        .map_err(|_| GoogleAiError::Timeout { timeout_ms })?
        .map_err(|e| GoogleAiError::from_reqwest_error(e, timeout_ms))?;

        self.handle_response(response).await
    }

    async fn handle_response(
        &self,
        response: Response,
    ) -> Result<GenerateContentResponse, GoogleAiError> {
        let status = response.status();

        if status.is_success() {
            let response_text = response
                .text()
                .await
                .map_err(|e| GoogleAiError::from_reqwest_error(e, self.config.timeout_ms()))?;

            let parsed: GenerateContentResponse = serde_json::from_str(&response_text)
                .map_err(|e| GoogleAiError::ParseError {
                    message: format!("Failed to parse response: {e}"),
                })?;

            parsed.validate().map_err(|message| {
                if message.contains("safety") {
                    GoogleAiError::ContentBlocked
                } else {
                    GoogleAiError::InvalidResponse { message }
                }
            })?;

            Ok(parsed)
        } else {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            Err(GoogleAiError::from_status_and_body(status, &error_body))
        }
    }

    pub fn config(&self) -> &GoogleAiConfig {
        &self.config
    }

    pub async fn test_connection(&self) -> Result<(), GoogleAiError> {
        let request = GenerateContentRequest::new("Reply with OK.".to_string());
        self.generate_content(request).await?;
        Ok(())
    }
}
