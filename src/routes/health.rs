//! Liveness endpoint

use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::routes::{json_response, FullBody};
use crate::server::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    database: &'static str,
}

/// GET /health - returns 200 whenever the process is up
pub fn health_check(state: &AppState) -> Response<FullBody> {
    let database = if state.mongo.is_some() {
        "connected"
    } else {
        "unavailable"
    };

    json_response(
        StatusCode::OK,
        &HealthResponse {
            status: "ok",
            service: "parlo-admin",
            version: env!("CARGO_PKG_VERSION"),
            database,
        },
    )
}
