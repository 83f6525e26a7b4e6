use anyhow::Result;

use simscore_core::database::EvaluationRepository;

use super::{open_database, print_json};

pub async fn handle_show_command(session_id: String) -> Result<()> {
    let db_manager = open_database().await?;
    let repo = EvaluationRepository::new(&db_manager);

    match repo.get_by_session(&session_id).await? {
        Some(record) => print_json(&record),
        None => anyhow::bail!("No evaluation stored for session '{session_id}'"),
    }
}
