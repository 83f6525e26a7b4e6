use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Clinician,
    Patient,
    System,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::Clinician => write!(f, "Clinician"),
            Speaker::Patient => write!(f, "Patient"),
            Speaker::System => write!(f, "System"),
        }
    }
}

/// One utterance in a simulation transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub speaker: Speaker,
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ConversationTurn {
    pub fn new(speaker: Speaker, content: impl Into<String>) -> Self {
        Self {
            speaker,
            content: content.into(),
            timestamp: None,
        }
    }
}

/// Render a transcript as `Speaker: text` lines, skipping empty turns
pub fn format_transcript(turns: &[ConversationTurn]) -> String {
    turns
        .iter()
        .filter(|turn| !turn.content.trim().is_empty())
        .map(|turn| format!("{}: {}", turn.speaker, turn.content.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}
