//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "sight_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "sight_http_request_duration_seconds";

    // Session metrics
    pub const SESSIONS_ACTIVE: &str = "sight_sessions_active";

    // Announcement metrics
    pub const ANNOUNCEMENTS_TOTAL: &str = "sight_announcements_total";
    pub const SYNTHESIS_FAILURES_TOTAL: &str = "sight_synthesis_failures_total";

    // Ingestion metrics
    pub const FRAMES_INGESTED_TOTAL: &str = "sight_frames_ingested_total";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "sight_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Update the active sessions gauge.
pub fn set_active_sessions(count: i64) {
    gauge!(names::SESSIONS_ACTIVE).set(count as f64);
}

/// Record an announcement decision outcome.
pub fn record_announcement(outcome: &str) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::ANNOUNCEMENTS_TOTAL, &labels).increment(1);
}

/// Record a failed synthesis call.
pub fn record_synthesis_failure() {
    counter!(names::SYNTHESIS_FAILURES_TOTAL).increment(1);
}

/// Record an ingested frame.
pub fn record_frame_ingested() {
    counter!(names::FRAMES_INGESTED_TOTAL).increment(1);
}

/// Record a rate limit hit.
pub fn record_rate_limit_hit(path: &str) {
    let labels = [("path", sanitize_path(path))];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// HTTP metrics middleware.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    record_http_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}

/// Collapse per-session path segments so metric cardinality stays bounded.
fn sanitize_path(path: &str) -> String {
    let path = regex_lite::Regex::new(
        r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}",
    )
    .unwrap()
    .replace_all(path, ":session_id");
    regex_lite::Regex::new(r"/sessions/[A-Za-z0-9_-]+")
        .unwrap()
        .replace_all(&path, "/sessions/:session_id")
        .to_string()
}
