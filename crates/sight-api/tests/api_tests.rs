//! API integration tests.
//!
//! These drive the full router with stub collaborators, so every layer
//! except the real sidecars is exercised.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use sight_api::{create_router, ApiConfig, AppState};
use sight_detect::{DetectError, DetectResult, Detector};
use sight_models::Detection;
use sight_speech::{ArtifactRef, SpeechError, SpeechResult, SpeechSynthesizer};

struct StubDetector {
    detections: Vec<Detection>,
    healthy: bool,
}

impl StubDetector {
    fn returning(detections: Vec<Detection>) -> Self {
        Self {
            detections,
            healthy: true,
        }
    }
}

#[async_trait]
impl Detector for StubDetector {
    async fn detect(&self, image_base64: &str) -> DetectResult<Vec<Detection>> {
        if image_base64 == "broken" {
            return Err(DetectError::Unavailable("sidecar down".to_string()));
        }
        Ok(self.detections.clone())
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }
}

struct StubSpeech {
    fail: AtomicBool,
    calls: AtomicU64,
}

impl StubSpeech {
    fn new() -> Self {
        Self {
            fail: AtomicBool::new(false),
            calls: AtomicU64::new(0),
        }
    }

    fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechSynthesizer for StubSpeech {
    async fn synthesize(&self, _text: &str) -> SpeechResult<ArtifactRef> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(SpeechError::RequestFailed {
                status: 503,
                body: "tts down".to_string(),
            });
        }
        Ok(ArtifactRef::from_string(format!("announcement_{n}")))
    }
}

fn test_app(speech: Arc<StubSpeech>) -> Router {
    let config = ApiConfig {
        cooldown_window: Duration::from_millis(5000),
        ..ApiConfig::default()
    };
    let detector = Arc::new(StubDetector::returning(vec![Detection::labeled(
        "person", 0.9,
    )]));
    let state = AppState::with_collaborators(config, detector, speech);
    create_router(state, None)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn ingest(app: &Router, session: &str, classes: &[&str]) -> (StatusCode, Value) {
    let detections: Vec<Value> = classes.iter().map(|c| json!({"class_name": c})).collect();
    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/sessions/{session}/detections"),
            json!({ "detections": detections }),
        ))
        .await
        .unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app(Arc::new(StubSpeech::new()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_ready_endpoint() {
    let app = test_app(Arc::new(StubSpeech::new()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/ready")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["checks"]["detector"]["status"], "ok");
}

#[tokio::test(start_paused = true)]
async fn test_detection_announce_flow() {
    let app = test_app(Arc::new(StubSpeech::new()));

    // First frame emits immediately.
    let (status, body) = ingest(&app, "cam-1", &["cat"]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "emitted");
    assert_eq!(body["text"], "I now see cat. ");
    assert!(body["artifact"].as_str().unwrap().starts_with("announcement_"));

    // Within the cooldown the new label only accumulates.
    tokio::time::advance(Duration::from_millis(1000)).await;
    let (status, body) = ingest(&app, "cam-1", &["dog"]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "queued");

    // Past the cooldown only the delta is announced.
    tokio::time::advance(Duration::from_millis(5000)).await;
    let (_, body) = ingest(&app, "cam-1", &[]).await;
    assert_eq!(body["status"], "emitted");
    assert_eq!(body["text"], "I now see dog. ");

    // Nothing new afterwards.
    tokio::time::advance(Duration::from_millis(6000)).await;
    let (_, body) = ingest(&app, "cam-1", &[]).await;
    assert_eq!(body["status"], "no_change");
}

#[tokio::test(start_paused = true)]
async fn test_sessions_are_isolated() {
    let app = test_app(Arc::new(StubSpeech::new()));

    let (_, body) = ingest(&app, "cam-1", &["cat"]).await;
    assert_eq!(body["status"], "emitted");

    // A different session has its own baseline and cooldown.
    let (_, body) = ingest(&app, "cam-2", &["cat"]).await;
    assert_eq!(body["status"], "emitted");
    assert_eq!(body["text"], "I now see cat. ");
}

#[tokio::test]
async fn test_malformed_payload_is_empty_frame() {
    let app = test_app(Arc::new(StubSpeech::new()));

    // Unparseable body collapses to an empty frame: cooldown has never
    // run, nothing accumulated, so the evaluation lands on no_change.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/sessions/cam-1/detections")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "no_change");
}

#[tokio::test(start_paused = true)]
async fn test_synthesis_failure_is_retried_after_cooldown() {
    let speech = Arc::new(StubSpeech::new());
    let app = test_app(Arc::clone(&speech));

    speech.set_failing(true);
    let (status, body) = ingest(&app, "cam-1", &["cat"]).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["status"], "error");

    // Baseline was not advanced; the same diff goes out once the
    // synthesizer recovers.
    speech.set_failing(false);
    tokio::time::advance(Duration::from_millis(6000)).await;
    let (status, body) = ingest(&app, "cam-1", &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "emitted");
    assert_eq!(body["text"], "I now see cat. ");
    assert_eq!(speech.calls(), 2);
}

#[tokio::test]
async fn test_create_and_end_session() {
    let app = test_app(Arc::new(StubSpeech::new()));

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/sessions",
            json!({"cooldown_ms": 1000, "accumulation": "per_frame"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["cooldown_ms"], 1000);
    assert_eq!(body["accumulation"], "per_frame");
    let session_id = body["session_id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/sessions/{session_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Ending twice is a 404: the state is gone.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/sessions/{session_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_session_rejects_bad_cooldown() {
    let app = test_app(Arc::new(StubSpeech::new()));

    let response = app
        .oneshot(post_json("/api/sessions", json!({"cooldown_ms": 5})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_frame_ingest_runs_detector() {
    let app = test_app(Arc::new(StubSpeech::new()));

    let response = app
        .oneshot(post_json(
            "/api/sessions/cam-1/frames",
            json!({"image": "data:image/jpeg;base64,ZnJhbWU="}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["detections"][0]["label"], "person");
    assert_eq!(body["announcement"]["status"], "emitted");
    assert_eq!(body["announcement"]["text"], "I now see person. ");
}

#[tokio::test]
async fn test_frame_ingest_surfaces_detector_failure() {
    let app = test_app(Arc::new(StubSpeech::new()));

    let response = app
        .oneshot(post_json(
            "/api/sessions/cam-1/frames",
            json!({"image": "broken"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_speech_endpoint() {
    let app = test_app(Arc::new(StubSpeech::new()));

    let response = app
        .clone()
        .oneshot(post_json("/api/speech", json!({"text": "hello there"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["artifact"].as_str().unwrap().starts_with("announcement_"));

    let response = app
        .oneshot(post_json("/api/speech", json!({"text": "   "})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
