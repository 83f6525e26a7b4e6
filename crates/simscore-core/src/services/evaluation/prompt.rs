use crate::models::{format_transcript, CaseDossier, ClinicalCategory, ConversationTurn};

/// Prompt pair sent to the completion service for one evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationPrompt {
    /// Examiner instructions with the dossier, transcript and output format
    pub system: String,
    /// Short user turn asking for the evaluation
    pub instruction: String,
}

const EVALUATION_INSTRUCTION: &str =
    "Evaluate the clinician's performance in the transcript above using exactly the required format.";

pub fn build_evaluation_prompt(case: &CaseDossier, transcript: &[ConversationTurn]) -> EvaluationPrompt {
    let mut system = String::from(
        "You are an experienced clinical educator assessing a clinician's reasoning during a \
         simulated patient encounter. Judge only what is present in the transcript. Do not \
         assume questions were asked or findings were considered unless the transcript shows it.\n\n",
    );

    system.push_str("CASE DOSSIER\n");
    push_field(&mut system, "Case", Some(case.display_title()));
    push_field(&mut system, "Specialty", case.specialty.as_deref());
    push_field(
        &mut system,
        "Difficulty",
        case.difficulty.map(|d| d.as_str()),
    );
    push_field(
        &mut system,
        "Patient",
        case.demographics.describe().as_deref(),
    );
    push_field(&mut system, "Chief complaint", case.chief_complaint.as_deref());
    push_field(&mut system, "Hidden diagnosis", case.diagnosis());
    push_field(
        &mut system,
        "History of presenting illness",
        case.history_of_presenting_illness.as_deref(),
    );
    push_list(&mut system, "Past medical history", &case.past_medical_history);
    push_list(&mut system, "Medications", &case.medications);
    push_list(&mut system, "Allergies", &case.allergies);
    push_field(&mut system, "Social history", case.social_history.as_deref());
    push_field(&mut system, "Family history", case.family_history.as_deref());

    if let Some(criteria) = case.criteria() {
        system.push_str("\nEVALUATION CRITERIA\n");
        for (name, expectation) in criteria {
            system.push_str(&format!("- {name}: {expectation}\n"));
        }
    }

    system.push_str("\nTRANSCRIPT\n");
    let formatted = format_transcript(transcript);
    if formatted.is_empty() {
        system.push_str("(no dialogue recorded)\n");
    } else {
        system.push_str(&formatted);
        system.push('\n');
    }

    system.push('\n');
    system.push_str(&output_format());

    EvaluationPrompt {
        system,
        instruction: EVALUATION_INSTRUCTION.to_string(),
    }
}

fn push_field(out: &mut String, name: &str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        out.push_str(&format!("{name}: {value}\n"));
    }
}

fn push_list(out: &mut String, name: &str, items: &[String]) {
    let items: Vec<&str> = items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .collect();
    if !items.is_empty() {
        out.push_str(&format!("{name}: {}\n", items.join(", ")));
    }
}

/// The line grammar the metric extractor reads back
fn output_format() -> String {
    let mut format = String::from(
        "Respond in exactly this format. Ratings must be one of: Poor, Below Average, Good, \
         Very Good, Excellent.\n\nCLINICAL REASONING EVALUATION\n\n",
    );

    for (idx, category) in ClinicalCategory::ALL.iter().enumerate() {
        format.push_str(&format!(
            "{}. {}: (Rating: <rating>)\n<one or two sentences citing the transcript>\n",
            idx + 1,
            category.label()
        ));
    }

    format.push_str(
        "\nDIAGNOSTIC ACCURACY: <Reached | Partially Reached | Missed>\n\n\
         ANALYSIS:\n<one paragraph on key strengths and the most important gaps>\n\n\
         Overall Clinical Reasoning Score: <integer 0-100>%\n\
         Performance Label: <Excellent (90-100) | Proficient (75-89) | Developing (60-74) | \
         Needs Improvement (below 60)>\n",
    );
    format
}
