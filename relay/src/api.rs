use crate::handler::ProfileHandler;
use crate::metrics_defs::{REQUEST_DURATION, REQUESTS_INFLIGHT, UPSTREAM_ERRORS};
use axum::{
    Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::any,
};
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Routes of the public relay listener.
pub fn router(handler: ProfileHandler) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", any(hello))
        .route("/discord", any(discord_redirect))
        // The catch-all below does not match an empty identifier
        .route("/discord/", any(profile_without_id))
        .route("/discord/{*id}", any(profile))
        .fallback(hello)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(handler)
}

async fn hello() -> &'static str {
    tracing::info!("Hello World");
    "Hello World"
}

async fn discord_redirect() -> impl IntoResponse {
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, "/discord/")])
}

async fn profile(State(handler): State<ProfileHandler>, Path(id): Path<String>) -> Response {
    lookup(&handler, &id).await
}

async fn profile_without_id(State(handler): State<ProfileHandler>) -> Response {
    lookup(&handler, "").await
}

async fn lookup(handler: &ProfileHandler, id: &str) -> Response {
    let started = Instant::now();
    let _inflight = InflightGuard::new();

    let response = match handler.lookup(id).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(id, error = %e, "Profile lookup failed");
            shared::counter!(UPSTREAM_ERRORS, "error" => e.kind()).increment(1);
            e.into_response()
        }
    };

    shared::histogram!(REQUEST_DURATION, "status" => response.status().as_str().to_owned())
        .record(started.elapsed().as_secs_f64());
    response
}

// Decrements on drop, so lookups cancelled by a disconnecting client are counted too
struct InflightGuard;

impl InflightGuard {
    fn new() -> Self {
        shared::gauge!(REQUESTS_INFLIGHT).increment(1.0);
        InflightGuard
    }
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        shared::gauge!(REQUESTS_INFLIGHT).decrement(1.0);
    }
}
