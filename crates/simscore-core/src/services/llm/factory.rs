//! LLM client factory

use std::sync::Arc;

use crate::config::Config;

use super::adapters::GoogleAiAdapter;
use super::errors::LlmError;
use super::traits::LlmClient;
use super::types::{LlmConfig, LlmProvider};

pub struct LlmClientFactory;

impl LlmClientFactory {
    pub fn create(config: LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
        match config.provider {
            LlmProvider::GoogleAi => {
                let adapter = GoogleAiAdapter::new(config)?;
                Ok(Arc::new(adapter))
            }
        }
    }

    /// Build a client from the config file, with environment overrides
    /// (`GOOGLE_AI_API_KEY`, `SIMSCORE_LLM_MODEL`, `SIMSCORE_LLM_TIMEOUT`)
    pub fn from_config(config: &Config) -> Result<Arc<dyn LlmClient>, LlmError> {
        let api_key = crate::config::get_google_ai_api_key()
            .map_err(|e| LlmError::ConfigurationError {
                message: e.to_string(),
            })?
            .or_else(|| config.api.google_ai_api_key.clone())
            .ok_or_else(|| LlmError::ConfigurationError {
                message: "GOOGLE_AI_API_KEY is required for the google-ai provider".to_string(),
            })?;

        let mut llm_config = LlmConfig::google_ai(api_key).with_timeout(config.llm_timeout_secs());
        if let Some(model) = config.llm_model() {
            llm_config = llm_config.with_model(model);
        }

        Self::create(llm_config)
    }
}
