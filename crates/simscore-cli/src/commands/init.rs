use anyhow::{Context, Result};
use console::style;

use simscore_core::database::{config, DatabaseManager};

pub async fn handle_init_command() -> Result<()> {
    config::ensure_config_dir()?;

    let db_path = config::get_default_db_path()?;

    if db_path.exists() {
        println!(
            "{} Database already exists at: {}",
            style("✓").green(),
            db_path.display()
        );
        return Ok(());
    }

    println!("Initializing SimScore database...");
    println!("  Creating database at: {}", db_path.display());

    let db_manager = DatabaseManager::new(&db_path)
        .await
        .with_context(|| "Failed to create database manager")?;
    db_manager.health_check().await?;

    println!(
        "{} Database initialized successfully at: {}",
        style("✓").green(),
        db_path.display()
    );
    println!();
    println!("Next steps:");
    println!(
        "  {}",
        style("simscore config set google-ai-api-key YOUR_KEY").cyan()
    );
    println!(
        "  {}",
        style("simscore evaluate case.json transcript.json --user YOUR_ID").cyan()
    );

    Ok(())
}
