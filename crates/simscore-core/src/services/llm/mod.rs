//! LLM provider abstraction layer
//!
//! The evaluator talks to an `LlmClient`; `GoogleAiAdapter` is the production
//! implementation over the Gemini REST API.

pub mod adapters;
pub mod errors;
pub mod factory;
pub mod traits;
pub mod types;

pub use adapters::GoogleAiAdapter;
pub use errors::LlmError;
pub use factory::LlmClientFactory;
pub use traits::LlmClient;
pub use types::{GenerateRequest, GenerateResponse, LlmConfig, LlmProvider, TokenUsage};

#[cfg(test)]
pub use traits::MockLlmClient;
