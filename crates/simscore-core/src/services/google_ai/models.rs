use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_settings: Option<Vec<SafetySetting>>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Content {
    pub parts: Vec<Part>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Content {
    pub fn text(role: Option<&str>, text: String) -> Self {
        Self {
            parts: vec![Part::Text { text }],
            role: role.map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(untagged)]
pub enum Part {
    Text { text: String },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_count: Option<u32>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: Some(0.7),
            max_output_tokens: Some(2048),
            top_p: Some(0.8),
            top_k: Some(40),
            candidate_count: Some(1),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SafetySetting {
    pub category: String,
    pub threshold: String,
}

impl SafetySetting {
    fn block_medium(category: &str) -> Self {
        Self {
            category: category.to_string(),
            threshold: "BLOCK_MEDIUM_AND_ABOVE".to_string(),
        }
    }

    /// Medical dialogue routinely mentions injury and self-harm, so only
    /// harassment and hate speech are filtered
    pub fn clinical_defaults() -> Vec<Self> {
        vec![
            Self::block_medium("HARM_CATEGORY_HARASSMENT"),
            Self::block_medium("HARM_CATEGORY_HATE_SPEECH"),
        ]
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
    pub safety_ratings: Option<Vec<SafetyRating>>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SafetyRating {
    pub category: String,
    pub probability: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: Option<u32>,
    pub candidates_token_count: Option<u32>,
    pub total_token_count: Option<u32>,
}

impl GenerateContentRequest {
    pub fn new(text: String) -> Self {
        Self {
            contents: vec![Content::text(Some("user"), text)],
            system_instruction: None,
            generation_config: Some(GenerationConfig::default()),
            safety_settings: Some(SafetySetting::clinical_defaults()),
        }
    }

    pub fn with_system_instruction(mut self, instruction: String) -> Self {
        self.system_instruction = Some(Content::text(None, instruction));
        self
    }

    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate
    pub fn extract_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .map(|part| match part {
                Part::Text { text } => text.as_str(),
            })
            .collect();
        Some(text)
    }

    pub fn finish_reason(&self) -> Option<String> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.finish_reason.clone())
    }

    pub fn validate(&self) -> Result<(), String> {
        let candidate = self
            .candidates
            .first()
            .ok_or_else(|| "No candidates in response".to_string())?;

        match candidate.finish_reason.as_deref() {
            None | Some("STOP") | Some("MAX_TOKENS") => {}
            Some("SAFETY") => return Err("Response blocked by safety filters".to_string()),
            Some("RECITATION") => return Err("Response blocked due to recitation".to_string()),
            Some(reason) => return Err(format!("Unexpected finish reason: {reason}")),
        }

        match &candidate.content {
            Some(content) if !content.parts.is_empty() => Ok(()),
            _ => Err("No content parts in response".to_string()),
        }
    }
}
