//! parlo-admin - Admin console API for the Parlo language-learning app
//!
//! CRUD services over the app's MongoDB collections (users, study plan
//! hierarchy, vocabulary), an admin-gated authentication flow, and the
//! dashboard aggregate, exposed as a JSON HTTP API.

pub mod auth;
pub mod config;
pub mod db;
pub mod routes;
pub mod server;
pub mod services;
pub mod types;

pub use types::{AdminError, Result};
