pub mod config;
pub mod dtos;
pub mod grpc;
pub mod handlers;
pub mod models;
pub mod server;
pub mod services;
pub mod storage;
pub mod tls;
pub mod utils;

use std::sync::Arc;

use service_core::axum::{
    middleware::from_fn,
    routing::{get, post},
    Json, Router,
};
use service_core::middleware::tracing::request_id_middleware;
use tower_http::trace::TraceLayer;

use crate::services::AuthService;

/// State shared by every gateway handler and the gRPC service.
#[derive(Clone)]
pub struct AppState {
    pub service_name: String,
    pub service_version: String,
    pub auth_service: Arc<AuthService>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/auth/login", post(handlers::auth::login))
        .route("/v1/auth/register", post(handlers::auth::register))
        .route("/v1/auth/is-admin", post(handlers::auth::is_admin))
        .route("/v1/tenants", post(handlers::tenant::register_tenant))
        .with_state(state)
        // Add tracing layer
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &service_core::axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            },
        ))
        // Add tracing middleware for request_id
        .layer(from_fn(request_id_middleware))
}

/// Service health check
async fn health_check(
    service_core::axum::extract::State(state): service_core::axum::extract::State<AppState>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": state.service_name,
        "version": state.service_version,
    }))
}
