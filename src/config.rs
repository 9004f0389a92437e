//! Configuration for the admin console
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use uuid::Uuid;

/// Parlo admin console - CRUD API over the app's document store
#[derive(Parser, Debug, Clone)]
#[command(name = "parlo-admin")]
#[command(about = "Admin console API for the Parlo language-learning app")]
pub struct Args {
    /// Unique node identifier for this instance
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "parlo")]
    pub mongodb_db: String,

    /// JWT secret for token signing (required in production)
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: Option<String>,

    /// JWT token expiry in seconds
    #[arg(long, env = "JWT_EXPIRY_SECONDS", default_value = "3600")]
    pub jwt_expiry_seconds: u64,

    /// Enable development mode (insecure JWT fallback, optional MongoDB)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Get effective JWT secret (uses a fixed insecure secret in dev mode)
    pub fn effective_jwt_secret(&self) -> Option<String> {
        if let Some(ref secret) = self.jwt_secret {
            return Some(secret.clone());
        }
        if self.dev_mode {
            Some("dev-only-insecure-secret".to_string())
        } else {
            None
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode && self.jwt_secret.is_none() {
            return Err("JWT_SECRET is required in production mode".to_string());
        }

        if self.jwt_expiry_seconds == 0 {
            return Err("JWT_EXPIRY_SECONDS must be greater than zero".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args::parse_from(["parlo-admin"])
    }

    #[test]
    fn test_validate_requires_jwt_secret_in_production() {
        let args = base_args();
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validate_allows_missing_secret_in_dev_mode() {
        let mut args = base_args();
        args.dev_mode = true;
        assert!(args.validate().is_ok());
        assert_eq!(
            args.effective_jwt_secret().as_deref(),
            Some("dev-only-insecure-secret")
        );
    }

    #[test]
    fn test_explicit_secret_wins_over_dev_fallback() {
        let mut args = base_args();
        args.dev_mode = true;
        args.jwt_secret = Some("configured-secret-value".into());
        assert_eq!(
            args.effective_jwt_secret().as_deref(),
            Some("configured-secret-value")
        );
    }

    #[test]
    fn test_validate_rejects_zero_expiry() {
        let mut args = base_args();
        args.dev_mode = true;
        args.jwt_expiry_seconds = 0;
        assert!(args.validate().is_err());
    }
}
