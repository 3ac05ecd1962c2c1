//! API routes.

use std::sync::Arc;

use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::detections::ingest_detections;
use crate::handlers::frames::ingest_frame;
use crate::handlers::sessions::{create_session, end_session};
use crate::handlers::speech::synthesize_text;
use crate::handlers::{health, ready};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let session_routes = Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/:session_id", delete(end_session));

    // Per-frame ingest: label records or a raw frame for the detector
    let ingest_routes = Router::new()
        .route("/sessions/:session_id/detections", post(ingest_detections))
        .route("/sessions/:session_id/frames", post(ingest_frame));

    let speech_routes = Router::new().route("/speech", post(synthesize_text));

    let rate_limiter = Arc::new(RateLimiterCache::new(state.config.rate_limit_rps));

    // Frame ingest runs at camera frequency and stays outside the
    // per-IP quota.
    let limited_routes = Router::new()
        .merge(session_routes)
        .merge(speech_routes)
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ));

    let api_routes = Router::new().merge(limited_routes).merge(ingest_routes);

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
