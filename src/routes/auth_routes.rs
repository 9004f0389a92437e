//! HTTP routes for console authentication
//!
//! - POST /auth/login  - verify credentials, apply the admin gate, issue a JWT
//! - POST /auth/logout - acknowledge sign-out (clients discard the token)
//! - GET  /auth/me     - current session info from the token
//!
//! The gate runs after identity is confirmed: a valid password on a
//! non-admin account is still rejected and no token is issued.

use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::{evaluate_gate, verify_password, GateDecision};
use crate::routes::{
    error_response, error_to_response, get_jwt_validator, json_response, parse_json_body,
    require_admin, require_db, FullBody, SuccessResponse,
};
use crate::server::AppState;
use crate::services::UserService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub expires_at: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user_id: String,
    pub email: String,
    pub is_admin: bool,
}

/// Dispatch /auth/* requests; returns None for unknown subpaths
pub async fn handle_auth_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Option<Response<FullBody>> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    match (method, path.as_str()) {
        (Method::POST, "/auth/login") => Some(handle_login(req, state).await),
        (Method::POST, "/auth/logout") => Some(handle_logout()),
        (Method::GET, "/auth/me") => Some(handle_me(req, state)),
        _ => None,
    }
}

async fn handle_login(req: Request<Incoming>, state: Arc<AppState>) -> Response<FullBody> {
    let body: LoginRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &format!("Invalid JSON body: {}", e),
                None,
            )
        }
    };

    if body.email.is_empty() || body.password.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Missing required fields: email, password",
            None,
        );
    }

    let jwt = match get_jwt_validator(&state) {
        Ok(j) => j,
        Err(resp) => return resp,
    };

    let mongo = match require_db(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let users = UserService::new(mongo.clone());
    let user = match users.get_by_email(&body.email).await {
        Ok(u) => u,
        Err(e) => return error_to_response(&e),
    };

    // Identity confirmation first; generic error prevents user enumeration
    let Some(user) = user else {
        warn!("Login failed - user not found: {}", body.email);
        return error_response(
            StatusCode::UNAUTHORIZED,
            "Invalid credentials",
            Some("INVALID_CREDENTIALS"),
        );
    };

    if user.password_hash.is_empty() {
        warn!("Login failed - no console credential: {}", body.email);
        return error_response(
            StatusCode::UNAUTHORIZED,
            "Invalid credentials",
            Some("INVALID_CREDENTIALS"),
        );
    }

    let password_valid = match verify_password(&body.password, &user.password_hash) {
        Ok(valid) => valid,
        Err(e) => {
            warn!("Password verification error: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication error",
                Some("AUTH_ERROR"),
            );
        }
    };

    if !password_valid {
        warn!("Login failed - invalid password: {}", body.email);
        return error_response(
            StatusCode::UNAUTHORIZED,
            "Invalid credentials",
            Some("INVALID_CREDENTIALS"),
        );
    }

    // Identity is confirmed; the gate now decides whether a session exists
    if evaluate_gate(Some(&user)) == GateDecision::Rejected {
        warn!("Sign-in rejected - not an administrator: {}", body.email);
        return error_response(
            StatusCode::FORBIDDEN,
            "Access denied. Only administrators may use this console.",
            Some("NOT_ADMIN"),
        );
    }

    let user_id = user._id.map(|o| o.to_hex()).unwrap_or_default();

    let (token, expires_at) = match jwt.issue_token(&user_id, &user.email, true) {
        Ok(pair) => pair,
        Err(e) => return error_to_response(&e),
    };

    if let Some(id) = user._id {
        if let Err(e) = users.touch_last_login(id).await {
            warn!("Failed to stamp last login for {}: {}", user_id, e);
        }
    }

    info!("Admin signed in: {}", user.email);

    json_response(
        StatusCode::OK,
        &LoginResponse {
            token,
            user_id,
            name: user.name,
            email: user.email,
            expires_at,
        },
    )
}

fn handle_logout() -> Response<FullBody> {
    json_response(
        StatusCode::OK,
        &SuccessResponse {
            success: true,
            message: "Signed out".to_string(),
        },
    )
}

fn handle_me(req: Request<Incoming>, state: Arc<AppState>) -> Response<FullBody> {
    let claims = match require_admin(&req, &state) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    json_response(
        StatusCode::OK,
        &MeResponse {
            user_id: claims.sub,
            email: claims.email,
            is_admin: claims.is_admin,
        },
    )
}
