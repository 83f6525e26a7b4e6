//! LLM client trait definition

use super::errors::LlmError;
use super::types::{GenerateRequest, GenerateResponse};
use async_trait::async_trait;

/// Provider-agnostic completion service used by the session evaluator
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate one completion for the request
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, LlmError>;

    /// Provider name for logging
    fn provider_name(&self) -> &'static str;

    /// Model identifier being used
    fn model_name(&self) -> String;

    /// Check if the client is configured and can make requests
    async fn health_check(&self) -> Result<(), LlmError>;

    /// Rough token estimate, ~4 characters per token
    fn estimate_tokens(&self, text: &str) -> u32 {
        u32::try_from((text.len() / 4).max(1)).unwrap_or(u32::MAX)
    }
}
