use thiserror::Error;

/// Custom error types for SimScore
#[derive(Error, Debug)]
pub enum SimScoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Service error: {message}")]
    Service { message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Time parsing error: {0}")]
    Time(#[from] chrono::ParseError),

    #[error("Validation error: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Already exists: {resource}")]
    AlreadyExists { resource: String },

    #[error("External service error: {service}: {message}")]
    ExternalService { service: String, message: String },

    #[error("Unknown error: {message}")]
    Unknown { message: String },
}

impl SimScoreError {
    /// Create an invalid configuration error
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a service error
    pub fn service<S: Into<String>>(message: S) -> Self {
        Self::Service {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an already exists error
    pub fn already_exists<S: Into<String>>(resource: S) -> Self {
        Self::AlreadyExists {
            resource: resource.into(),
        }
    }

    /// Create an external service error
    pub fn external_service<S: Into<String>>(service: S, message: S) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create an unknown error
    pub fn unknown<S: Into<String>>(message: S) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            SimScoreError::Database(_) => "database",
            SimScoreError::Migration(_) => "migration",
            SimScoreError::Io(_) => "io",
            SimScoreError::Json(_) => "json",
            SimScoreError::InvalidConfig { .. } => "config",
            SimScoreError::Service { .. } => "service",
            SimScoreError::Network(_) => "network",
            SimScoreError::Time(_) => "time",
            SimScoreError::Validation { .. } => "validation",
            SimScoreError::NotFound { .. } => "not_found",
            SimScoreError::AlreadyExists { .. } => "already_exists",
            SimScoreError::ExternalService { .. } => "external",
            SimScoreError::Unknown { .. } => "unknown",
        }
    }
}

/// Convert anyhow::Error to SimScoreError
impl From<anyhow::Error> for SimScoreError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<SimScoreError>() {
            Ok(inner) => inner,
            Err(other) => SimScoreError::Unknown {
                message: other.to_string(),
            },
        }
    }
}

/// Result type alias for SimScore
pub type Result<T> = std::result::Result<T, SimScoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helper_constructors_and_categories() {
        assert_eq!(SimScoreError::not_found("session s1").category(), "not_found");
        assert_eq!(
            SimScoreError::already_exists("session s1").category(),
            "already_exists"
        );
        assert_eq!(
            SimScoreError::validation("difficulty", "unknown level").to_string(),
            "Validation error: difficulty: unknown level"
        );
    }

    #[test]
    fn test_anyhow_roundtrip_keeps_variant() {
        let err: anyhow::Error = SimScoreError::not_found("case c9").into();
        let back = SimScoreError::from(err);
        assert!(matches!(back, SimScoreError::NotFound { .. }));

        let plain = SimScoreError::from(anyhow::anyhow!("boom"));
        assert!(matches!(plain, SimScoreError::Unknown { .. }));
    }
}
