pub mod database;
pub mod models;
pub mod services;

pub mod config;
pub mod env;
pub mod error;
pub mod logging;

// Re-exports for convenience
pub use database::DatabaseManager;
pub use error::{Result, SimScoreError};
pub use logging::{init_logging, LoggingConfig};
