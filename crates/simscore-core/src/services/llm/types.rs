//! Provider-agnostic request/response types

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_LLM_TIMEOUT_SECS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LlmProvider {
    /// Google AI API (Gemini models via REST API)
    #[default]
    GoogleAi,
}

impl std::str::FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "google" | "google-ai" | "googleai" | "gemini" => Ok(LlmProvider::GoogleAi),
            _ => Err(format!("Unknown LLM provider: {s}. Valid options: google-ai")),
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmProvider::GoogleAi => write!(f, "google-ai"),
        }
    }
}

/// Request for a single, non-streaming completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,

    /// Maximum tokens to generate (provider default when unset)
    pub max_tokens: Option<u32>,

    /// Sampling temperature, 0.0 - 1.0
    pub temperature: Option<f32>,

    /// System instruction sent separately from the user turn
    pub system_prompt: Option<String>,
}

impl GenerateRequest {
    pub fn new(prompt: String) -> Self {
        Self {
            prompt,
            max_tokens: None,
            temperature: None,
            system_prompt: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: String) -> Self {
        self.system_prompt = Some(system_prompt);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GenerateResponse {
    pub text: String,
    pub token_usage: Option<TokenUsage>,
    pub model_used: Option<String>,
    pub finish_reason: Option<String>,
}

impl GenerateResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TokenUsage {
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

/// Configuration for LLM client creation
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: Option<String>,
    pub timeout_secs: u64,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::GoogleAi,
            model: None,
            timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
            api_key: None,
            base_url: None,
        }
    }
}

impl LlmConfig {
    pub fn google_ai(api_key: String) -> Self {
        Self {
            provider: LlmProvider::GoogleAi,
            api_key: Some(api_key),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }
}
