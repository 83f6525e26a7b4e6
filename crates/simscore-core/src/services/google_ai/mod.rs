pub mod client;
pub mod errors;
pub mod models;

pub use client::{GoogleAiClient, GoogleAiConfig, DEFAULT_MODEL};
pub use errors::GoogleAiError;
pub use models::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
    SafetySetting, UsageMetadata,
};
