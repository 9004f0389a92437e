//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling; requests are routed by
//! hand with a `match` over method and path.

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::config::Args;
use crate::db::MongoClient;
use crate::routes;
use crate::routes::FullBody;
use crate::types::AdminError;

/// Shared application state
///
/// The Mongo handle is constructed once in `main` and passed down here;
/// nothing in the crate reaches for a global client.
pub struct AppState {
    pub args: Args,
    pub mongo: Option<MongoClient>,
}

impl AppState {
    pub fn new(args: Args, mongo: Option<MongoClient>) -> Self {
        Self { args, mongo }
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<(), AdminError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "parlo-admin listening on {} as node {}",
        state.args.listen, state.args.node_id
    );

    if state.args.dev_mode {
        warn!("Development mode enabled - insecure JWT secret fallback active");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new()
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<FullBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    debug!("[{}] {} {}", addr, method, path);

    // Auth routes consume the request
    if path.starts_with("/auth") {
        if let Some(response) = routes::handle_auth_request(req, Arc::clone(&state)).await {
            return Ok(response);
        }
        return Ok(not_found_response(&path));
    }

    let response = match (method, path.as_str()) {
        // Liveness probe
        (Method::GET, "/health") | (Method::GET, "/healthz") => {
            routes::health_check(&state)
        }

        // CORS preflight for the browser dashboard
        (Method::OPTIONS, _) => routes::preflight_response(),

        // Dashboard aggregate
        (Method::GET, "/dashboard/stats") => {
            routes::handle_dashboard_stats(req, Arc::clone(&state)).await
        }

        // Study plan hierarchy
        (_, p) if p.starts_with("/study") => {
            routes::handle_study_request(req, Arc::clone(&state), &path).await
        }

        // Vocabulary categories and questions
        (_, p) if p.starts_with("/vocabulary") => {
            routes::handle_vocabulary_request(req, Arc::clone(&state), &path).await
        }

        // User management
        (_, p) if p.starts_with("/admin/users") => {
            routes::handle_admin_users_request(req, Arc::clone(&state), &path).await
        }

        _ => not_found_response(&path),
    };

    Ok(response)
}

fn not_found_response(path: &str) -> Response<FullBody> {
    routes::error_response(
        StatusCode::NOT_FOUND,
        &format!("No route for {}", path),
        None,
    )
}
