//! Route configuration and setup

use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use clipgate_core::Config;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    // Multipart framing overhead on top of the payload itself.
    let body_limit = config.upload.max_video_size_bytes + 1024 * 1024;

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/openapi.json", get(openapi_spec))
        .route("/api/videos/upload", post(handlers::video_upload::upload_video))
        .route(
            "/api/videos/uploads/{job_id}",
            get(handlers::jobs::upload_status),
        )
        .route("/api/videos/{id}", get(handlers::video_get::get_video))
        .route("/api/videos/{id}/link", get(handlers::video_link::video_link))
        .route(
            "/api/videos/{id}/thumbnails/{file}/link",
            get(handlers::video_link::thumbnail_link),
        )
        .nest(
            "/docs",
            utoipa_rapidoc::RapiDoc::new("/api/openapi.json")
                .path("/docs")
                .into(),
        )
        // The tower-http limit below is authoritative; axum's built-in 2 MB
        // extractor limit would otherwise cap multipart uploads.
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.base.cors_origins.contains(&"*".to_string()) {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins: Result<Vec<HeaderValue>, _> = config
            .base
            .cors_origins
            .iter()
            .map(|o| o.parse())
            .collect();

        CorsLayer::new()
            .allow_origin(origins.unwrap_or_default())
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}

async fn openapi_spec() -> impl IntoResponse {
    Json(crate::api_doc::get_openapi_spec())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Liveness probe. The service holds no connections worth checking; if the
/// router answers, it is healthy.
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse { status: "healthy" })
}
