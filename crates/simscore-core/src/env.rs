//! Environment variable constants used throughout the application
//!
//! This module centralizes all environment variable names to ensure consistency
//! and make it easier to manage configuration across the codebase.

/// Logging configuration
pub mod logging {
    /// Log level configuration (e.g., "debug", "info", "warn", "error")
    pub const LOG_LEVEL: &str = "SIMSCORE_LOG_LEVEL";

    /// Log file path for file-based logging
    pub const LOG_FILE: &str = "SIMSCORE_LOG_FILE";

    /// Emit logs as JSON lines
    pub const LOG_JSON: &str = "SIMSCORE_LOG_JSON";

    /// Disable colored output (follows the NO_COLOR standard)
    pub const NO_COLOR: &str = "NO_COLOR";
}

/// Database configuration
pub mod database {
    /// Path to the SQLite database file
    pub const SIMSCORE_DB: &str = "SIMSCORE_DB";
}

/// External API configuration
pub mod apis {
    /// Google AI API key used by the evaluation service
    pub const GOOGLE_AI_API_KEY: &str = "GOOGLE_AI_API_KEY";
}

/// LLM provider configuration
pub mod llm {
    /// Model identifier for evaluation requests
    pub const SIMSCORE_LLM_MODEL: &str = "SIMSCORE_LLM_MODEL";

    /// Request timeout for the completion service (seconds)
    pub const SIMSCORE_LLM_TIMEOUT: &str = "SIMSCORE_LLM_TIMEOUT";
}

/// Analytics configuration
pub mod analytics {
    /// Rolling window used to build peer cohorts (days)
    pub const PEER_WINDOW_DAYS: &str = "SIMSCORE_PEER_WINDOW_DAYS";

    /// Cohort size below which percentiles are flagged as unreliable
    pub const MIN_COHORT_SIZE: &str = "SIMSCORE_MIN_COHORT_SIZE";

    /// Lifetime of cached trend computations (seconds)
    pub const CACHE_TTL_SECS: &str = "SIMSCORE_CACHE_TTL_SECS";
}
