//! HTTP routes for the admin console
//!
//! Shared response/auth helpers live here; each entity family gets its own
//! route module with a single dispatcher the server delegates to.

pub mod admin_users;
pub mod auth_routes;
pub mod dashboard;
pub mod health;
pub mod study;
pub mod vocabulary;

pub use admin_users::handle_admin_users_request;
pub use auth_routes::handle_auth_request;
pub use dashboard::handle_dashboard_stats;
pub use health::health_check;
pub use study::handle_study_request;
pub use vocabulary::handle_vocabulary_request;

use bson::oid::ObjectId;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::auth::{extract_token_from_header, Claims, JwtValidator};
use crate::db::MongoClient;
use crate::server::AppState;
use crate::types::AdminError;

pub type FullBody = Full<Bytes>;

/// Error payload returned on every failure path
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Acknowledgement payload for mutations with no body to return
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

pub(crate) fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<FullBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(json)))
        .unwrap()
}

pub(crate) fn error_response(
    status: StatusCode,
    error: &str,
    code: Option<&str>,
) -> Response<FullBody> {
    json_response(
        status,
        &ErrorResponse {
            error: error.to_string(),
            code: code.map(|c| c.to_string()),
        },
    )
}

/// Map a service error onto the response taxonomy: not-found → 404,
/// validation → 400 (rejected before any write), everything else → 500
pub(crate) fn error_to_response(err: &AdminError) -> Response<FullBody> {
    match err {
        AdminError::NotFound(what) => error_response(
            StatusCode::NOT_FOUND,
            &format!("{} not found", what),
            Some("NOT_FOUND"),
        ),
        AdminError::Validation(message) => {
            error_response(StatusCode::BAD_REQUEST, message, Some("VALIDATION"))
        }
        AdminError::Auth(message) => {
            warn!("Auth failure: {}", message);
            error_response(
                StatusCode::UNAUTHORIZED,
                "Authentication error",
                Some("AUTH_ERROR"),
            )
        }
        other => {
            warn!("Request failed: {}", other);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error",
                Some("DB_ERROR"),
            )
        }
    }
}

/// CORS preflight response for the browser dashboard
pub(crate) fn preflight_response() -> Response<FullBody> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Origin", "*")
        .header(
            "Access-Control-Allow-Methods",
            "GET, POST, PUT, DELETE, OPTIONS",
        )
        .header("Access-Control-Allow-Headers", "Authorization, Content-Type")
        .body(Full::new(Bytes::new()))
        .unwrap()
}

pub(crate) async fn parse_json_body<T: DeserializeOwned>(
    req: Request<Incoming>,
) -> Result<T, String> {
    let bytes = req
        .into_body()
        .collect()
        .await
        .map_err(|e| e.to_string())?
        .to_bytes();
    serde_json::from_slice(&bytes).map_err(|e| e.to_string())
}

#[allow(clippy::result_large_err)]
pub(crate) fn parse_object_id(raw: &str) -> Result<ObjectId, Response<FullBody>> {
    ObjectId::parse_str(raw).map_err(|_| {
        error_response(
            StatusCode::BAD_REQUEST,
            "Invalid document id",
            Some("INVALID_ID"),
        )
    })
}

#[allow(clippy::result_large_err)]
pub(crate) fn require_db(state: &AppState) -> Result<&MongoClient, Response<FullBody>> {
    state.mongo.as_ref().ok_or_else(|| {
        error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Database not available",
            Some("DB_UNAVAILABLE"),
        )
    })
}

#[allow(clippy::result_large_err)]
pub(crate) fn get_jwt_validator(state: &AppState) -> Result<JwtValidator, Response<FullBody>> {
    match state.args.effective_jwt_secret() {
        Some(secret) => {
            JwtValidator::new(secret, state.args.jwt_expiry_seconds).map_err(|e| {
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &format!("JWT config error: {e}"),
                    Some("JWT_CONFIG_ERROR"),
                )
            })
        }
        None => Err(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "JWT secret not configured",
            Some("JWT_CONFIG_ERROR"),
        )),
    }
}

/// Validate the bearer token and the admin flag it carries.
/// Every route beyond /health and /auth/login goes through this.
#[allow(clippy::result_large_err)]
pub(crate) fn require_admin(
    req: &Request<Incoming>,
    state: &AppState,
) -> Result<Claims, Response<FullBody>> {
    let auth_header = req
        .headers()
        .get(hyper::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let token = match extract_token_from_header(auth_header) {
        Some(t) => t,
        None => {
            return Err(error_response(
                StatusCode::UNAUTHORIZED,
                "No token provided",
                Some("NO_TOKEN"),
            ))
        }
    };

    let jwt = get_jwt_validator(state)?;
    let result = jwt.verify_token(token);

    if !result.valid {
        return Err(error_response(
            StatusCode::UNAUTHORIZED,
            result.error.as_deref().unwrap_or("Invalid token"),
            Some("INVALID_TOKEN"),
        ));
    }

    let claims = match result.claims {
        Some(c) => c,
        None => {
            return Err(error_response(
                StatusCode::UNAUTHORIZED,
                "Invalid token",
                Some("INVALID_TOKEN"),
            ))
        }
    };

    if !claims.is_admin {
        return Err(error_response(
            StatusCode::FORBIDDEN,
            "Admin permission required",
            Some("FORBIDDEN"),
        ));
    }

    Ok(claims)
}

/// Render a bson timestamp for JSON responses
pub(crate) fn format_timestamp(value: Option<bson::DateTime>) -> Option<String> {
    value.map(|d| d.to_string())
}
