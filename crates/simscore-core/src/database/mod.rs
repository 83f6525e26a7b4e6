pub mod config;
pub mod connection;
pub mod evaluation_repo;

pub use config::{ensure_config_dir, get_config_dir, get_default_db_path};
pub use connection::DatabaseManager;
pub use evaluation_repo::{format_timestamp, window_start, EvaluationRepository};
