use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Case difficulty, a fixed three-level scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Intermediate,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Intermediate, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "intermediate" => Ok(Difficulty::Intermediate),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(format!("Unknown difficulty: {s}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demographics {
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
}

impl Demographics {
    pub fn describe(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(age) = self.age {
            parts.push(format!("{age}-year-old"));
        }
        if let Some(sex) = self.sex.as_deref().filter(|s| !s.trim().is_empty()) {
            parts.push(sex.trim().to_string());
        }
        if let Some(job) = self.occupation.as_deref().filter(|s| !s.trim().is_empty()) {
            parts.push(format!("({})", job.trim()));
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// Clinical ground truth for a simulated case, fed to the evaluator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseDossier {
    pub case_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub demographics: Demographics,
    #[serde(default)]
    pub chief_complaint: Option<String>,
    #[serde(default)]
    pub hidden_diagnosis: Option<String>,
    #[serde(default)]
    pub history_of_presenting_illness: Option<String>,
    #[serde(default)]
    pub past_medical_history: Vec<String>,
    #[serde(default)]
    pub medications: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub social_history: Option<String>,
    #[serde(default)]
    pub family_history: Option<String>,
    /// Criterion name to expected behaviour
    #[serde(default)]
    pub evaluation_criteria: Option<BTreeMap<String, String>>,
}

impl CaseDossier {
    /// The non-blank hidden diagnosis, if any
    pub fn diagnosis(&self) -> Option<&str> {
        self.hidden_diagnosis
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }

    /// The evaluation criteria, if present and non-empty
    pub fn criteria(&self) -> Option<&BTreeMap<String, String>> {
        self.evaluation_criteria.as_ref().filter(|c| !c.is_empty())
    }

    /// True when the dossier carries what the evaluator needs to score a session
    pub fn is_scorable(&self) -> bool {
        self.diagnosis().is_some() && self.criteria().is_some()
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.case_id)
    }
}
