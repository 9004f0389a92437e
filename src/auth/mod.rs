//! Authentication and authorization for the admin console
//!
//! Provides:
//! - JWT token generation and validation
//! - Password hashing with Argon2
//! - The admin gate applied after identity confirmation

pub mod gate;
pub mod jwt;
pub mod password;

pub use gate::{evaluate_gate, GateDecision};
pub use jwt::{extract_token_from_header, Claims, JwtValidator, TokenValidationResult};
pub use password::{hash_password, verify_password};
