//! Crate-wide error and result types

use thiserror::Error;

/// Errors surfaced by the admin console service
#[derive(Debug, Error)]
pub enum AdminError {
    /// Document store failure (connection, query, or write)
    #[error("database error: {0}")]
    Database(String),

    /// Credential, token, or gate failure
    #[error("authentication error: {0}")]
    Auth(String),

    /// A referenced document does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Request payload rejected before any write was attempted
    #[error("validation error: {0}")]
    Validation(String),

    /// Bad or missing configuration at startup
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = AdminError::NotFound("study folder");
        assert_eq!(err.to_string(), "study folder not found");
    }

    #[test]
    fn test_validation_display() {
        let err = AdminError::Validation("name is required".into());
        assert_eq!(err.to_string(), "validation error: name is required");
    }
}
