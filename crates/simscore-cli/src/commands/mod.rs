pub mod analytics;
pub mod config;
pub mod evaluate;
pub mod extract;
pub mod init;
pub mod show;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use simscore_core::database::{config as db_config, DatabaseManager};
use simscore_core::models::Difficulty;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the SimScore database
    Init,

    /// Evaluate a finished simulation session and store the result
    ///
    /// Examples:
    ///   simscore evaluate case.json transcript.json --user u-42
    ///   simscore evaluate case.json transcript.json --user u-42 --session s-1001 --json
    Evaluate {
        /// Case dossier JSON file
        case: PathBuf,
        /// Transcript JSON file (array of {speaker, content})
        transcript: PathBuf,
        /// User who ran the session
        #[arg(short, long)]
        user: String,
        /// Session ID (generated when omitted)
        #[arg(short, long)]
        session: Option<String>,
        /// Print the stored record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract metrics from an evaluation text file without storing them
    Extract {
        /// File containing the evaluation text
        file: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a user's performance trends
    Trends {
        /// User ID
        user: String,
        /// Only sessions from the last N days
        #[arg(long)]
        since_days: Option<u32>,
        /// Filter by specialty
        #[arg(long)]
        specialty: Option<String>,
        /// Filter by difficulty (easy, intermediate, hard)
        #[arg(long)]
        difficulty: Option<Difficulty>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare a user's average score with their peers
    Compare {
        /// User ID
        user: String,
        /// Restrict the cohort to one specialty
        #[arg(long)]
        specialty: Option<String>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Reflection prompts and recommendations for a finished session
    Guidance {
        /// Session ID
        session_id: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the stored evaluation for a session
    Show {
        /// Session ID
        session_id: String,
    },

    /// Manage configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key to get
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set
        value: String,
    },
    /// Remove a configuration value
    Unset {
        /// Configuration key to remove
        key: String,
    },
    /// List all configuration values
    List,
    /// Show the path to the config file
    Path,
}

/// Route and execute CLI commands
pub async fn run_command(command: Commands) -> Result<()> {
    match command {
        Commands::Init => self::init::handle_init_command().await,

        Commands::Evaluate {
            case,
            transcript,
            user,
            session,
            json,
        } => self::evaluate::handle_evaluate_command(case, transcript, user, session, json).await,

        Commands::Extract { file, json } => self::extract::handle_extract_command(file, json),

        Commands::Trends {
            user,
            since_days,
            specialty,
            difficulty,
            json,
        } => {
            self::analytics::handle_trends_command(user, since_days, specialty, difficulty, json)
                .await
        }

        Commands::Compare {
            user,
            specialty,
            json,
        } => self::analytics::handle_compare_command(user, specialty, json).await,

        Commands::Guidance { session_id, json } => {
            self::analytics::handle_guidance_command(session_id, json).await
        }

        Commands::Show { session_id } => self::show::handle_show_command(session_id).await,

        Commands::Config { command } => match command {
            ConfigCommands::Get { key } => self::config::handle_config_get(key),
            ConfigCommands::Set { key, value } => self::config::handle_config_set(key, value),
            ConfigCommands::Unset { key } => self::config::handle_config_unset(key),
            ConfigCommands::List => self::config::handle_config_list(),
            ConfigCommands::Path => self::config::handle_config_path(),
        },
    }
}

/// Open the default database, creating it on first use
pub(crate) async fn open_database() -> Result<Arc<DatabaseManager>> {
    db_config::ensure_config_dir()?;
    let db_path = db_config::get_default_db_path()?;
    let db_manager = DatabaseManager::new(&db_path)
        .await
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;
    Ok(Arc::new(db_manager))
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
