//! Dashboard aggregate endpoint

use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use std::sync::Arc;

use crate::routes::{error_to_response, json_response, require_admin, require_db, FullBody};
use crate::server::AppState;
use crate::services::DashboardService;

/// GET /dashboard/stats - console home-screen numbers
pub async fn handle_dashboard_stats(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<FullBody> {
    if let Err(resp) = require_admin(&req, &state) {
        return resp;
    }

    let mongo = match require_db(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    match DashboardService::new(mongo.clone()).stats().await {
        Ok(stats) => json_response(StatusCode::OK, &stats),
        Err(e) => error_to_response(&e),
    }
}
