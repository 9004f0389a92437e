//! JWT issuing and validation for console sessions

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::AdminError;

/// Fixed secret used when running in dev mode
const DEV_SECRET: &str = "dev-only-insecure-secret";

/// Claims embedded in console session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User document id (hex ObjectId)
    pub sub: String,

    /// Account email
    pub email: String,

    /// Admin flag copied from the user document at sign-in
    pub is_admin: bool,

    /// Issued-at, seconds since epoch
    pub iat: u64,

    /// Expiry, seconds since epoch
    pub exp: u64,
}

/// Result of token verification
#[derive(Debug, Default)]
pub struct TokenValidationResult {
    pub valid: bool,
    pub claims: Option<Claims>,
    pub error: Option<String>,
}

/// Signs and verifies console session tokens (HS256)
pub struct JwtValidator {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry_seconds: u64,
}

impl JwtValidator {
    /// Create a validator from a shared secret
    pub fn new(secret: String, expiry_seconds: u64) -> Result<Self, AdminError> {
        if secret.len() < 16 {
            return Err(AdminError::Auth(
                "JWT secret must be at least 16 characters".into(),
            ));
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiry_seconds,
        })
    }

    /// Dev-mode validator with a fixed insecure secret
    pub fn new_dev() -> Self {
        Self {
            encoding: EncodingKey::from_secret(DEV_SECRET.as_bytes()),
            decoding: DecodingKey::from_secret(DEV_SECRET.as_bytes()),
            expiry_seconds: 86400,
        }
    }

    /// Issue a token for a verified admin session.
    /// Returns the encoded token and its expiry timestamp.
    pub fn issue_token(
        &self,
        user_id: &str,
        email: &str,
        is_admin: bool,
    ) -> Result<(String, u64), AdminError> {
        let now = unix_now();
        let exp = now + self.expiry_seconds;

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            is_admin,
            iat: now,
            exp,
        };

        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AdminError::Auth(format!("Failed to sign token: {}", e)))?;

        Ok((token, exp))
    }

    /// Verify a token and extract its claims
    pub fn verify_token(&self, token: &str) -> TokenValidationResult {
        match decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256)) {
            Ok(data) => TokenValidationResult {
                valid: true,
                claims: Some(data.claims),
                error: None,
            },
            Err(e) => TokenValidationResult {
                valid: false,
                claims: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Extract a bearer token from an Authorization header value
pub fn extract_token_from_header(header: Option<&str>) -> Option<&str> {
    header?.strip_prefix("Bearer ")
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify_round_trip() {
        let jwt = JwtValidator::new_dev();
        let (token, exp) = jwt.issue_token("66f0a1b2c3d4e5f6a7b8c9d0", "admin@parlo.app", true)
            .unwrap();

        assert!(exp > unix_now());

        let result = jwt.verify_token(&token);
        assert!(result.valid);

        let claims = result.claims.unwrap();
        assert_eq!(claims.sub, "66f0a1b2c3d4e5f6a7b8c9d0");
        assert_eq!(claims.email, "admin@parlo.app");
        assert!(claims.is_admin);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = JwtValidator::new("first-signing-secret".into(), 3600).unwrap();
        let verifier = JwtValidator::new("other-signing-secret".into(), 3600).unwrap();

        let (token, _) = issuer.issue_token("abc", "admin@parlo.app", true).unwrap();
        let result = verifier.verify_token(&token);

        assert!(!result.valid);
        assert!(result.claims.is_none());
        assert!(result.error.is_some());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Craft a token whose expiry is well past the default leeway
        let now = unix_now();
        let claims = Claims {
            sub: "abc".into(),
            email: "admin@parlo.app".into(),
            is_admin: true,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(DEV_SECRET.as_bytes()),
        )
        .unwrap();

        let jwt = JwtValidator::new_dev();
        let result = jwt.verify_token(&token);
        assert!(!result.valid);
    }

    #[test]
    fn test_short_secret_rejected() {
        assert!(JwtValidator::new("short".into(), 3600).is_err());
    }

    #[test]
    fn test_extract_token_from_header() {
        assert_eq!(
            extract_token_from_header(Some("Bearer abc.def.ghi")),
            Some("abc.def.ghi")
        );
        assert_eq!(extract_token_from_header(Some("Basic dXNlcg==")), None);
        assert_eq!(extract_token_from_header(None), None);
    }
}
