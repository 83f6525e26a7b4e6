//! Google AI adapter implementing the LlmClient trait

use async_trait::async_trait;
use std::time::Duration;

use crate::services::google_ai::{
    GenerateContentRequest, GenerationConfig, GoogleAiClient, GoogleAiConfig,
};

use super::super::errors::LlmError;
use super::super::traits::LlmClient;
use super::super::types::{GenerateRequest, GenerateResponse, LlmConfig, TokenUsage};

pub struct GoogleAiAdapter {
    client: GoogleAiClient,
    model_name: String,
}

impl GoogleAiAdapter {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let api_key = config.api_key.ok_or_else(|| LlmError::ConfigurationError {
            message: "Google AI API key is required".to_string(),
        })?;

        let mut gai_config =
            GoogleAiConfig::new(api_key).with_timeout(Duration::from_secs(config.timeout_secs));

        if let Some(model) = config.model {
            gai_config = gai_config.with_model(model);
        }
        if let Some(base_url) = config.base_url {
            gai_config = gai_config.with_base_url(base_url);
        }

        let model_name = gai_config.model.clone();
        let client = GoogleAiClient::new(gai_config).map_err(LlmError::from)?;

        Ok(Self { client, model_name })
    }

    pub fn from_client(client: GoogleAiClient) -> Self {
        let model_name = client.config().model.clone();
        Self { client, model_name }
    }
}

#[async_trait]
impl LlmClient for GoogleAiAdapter {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, LlmError> {
        let mut generation_config = GenerationConfig::default();
        if let Some(temperature) = request.temperature {
            generation_config.temperature = Some(temperature);
        }
        if let Some(max_tokens) = request.max_tokens {
            generation_config.max_output_tokens = Some(max_tokens);
        }

        let mut gai_request =
            GenerateContentRequest::new(request.prompt).with_generation_config(generation_config);
        if let Some(system_prompt) = request.system_prompt {
            gai_request = gai_request.with_system_instruction(system_prompt);
        }

        let response = self
            .client
            .generate_content(gai_request)
            .await
            .map_err(LlmError::from)?;

        let text = response
            .extract_text()
            .ok_or_else(|| LlmError::InvalidResponse {
                message: "No text content in response".to_string(),
            })?;

        Ok(GenerateResponse {
            text,
            token_usage: response.usage_metadata.as_ref().map(|usage| TokenUsage {
                input_tokens: usage.prompt_token_count,
                output_tokens: usage.candidates_token_count,
                total_tokens: usage.total_token_count,
            }),
            model_used: Some(self.model_name.clone()),
            finish_reason: response.finish_reason(),
        })
    }

    fn provider_name(&self) -> &'static str {
        "google-ai"
    }

    fn model_name(&self) -> String {
        self.model_name.clone()
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        self.client.test_connection().await.map_err(LlmError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_creation_fails_without_api_key() {
        let result = GoogleAiAdapter::new(LlmConfig::default());
        match result {
            Err(LlmError::ConfigurationError { message }) => assert!(message.contains("API key")),
            _ => panic!("Expected ConfigurationError"),
        }
    }

    #[test]
    fn test_adapter_uses_configured_model() {
        let config = LlmConfig::google_ai("test-key".to_string())
            .with_model("gemini-2.5-pro".to_string());
        let adapter = GoogleAiAdapter::new(config).unwrap();

        assert_eq!(adapter.provider_name(), "google-ai");
        assert_eq!(adapter.model_name(), "gemini-2.5-pro");
    }

    #[test]
    fn test_adapter_from_client() {
        let client = GoogleAiClient::new(GoogleAiConfig::new("test-key".to_string())).unwrap();
        let adapter = GoogleAiAdapter::from_client(client);
        assert!(!adapter.model_name().is_empty());
    }
}
