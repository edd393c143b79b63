//! Common test utilities for integration tests
//!
//! Stands up a mock analysis backend and the pieces a view needs.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use form_coach_client::processor::ViewTiming;
use form_coach_client::{HistoryStore, VideoProcessor, VideoUpload, WorkoutClient};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock backend plus a client pointed at it
pub struct TestBackend {
    pub server: MockServer,
    pub client: Arc<WorkoutClient>,
}

impl TestBackend {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let client = WorkoutClient::new(&server.uri()).expect("Failed to build client");

        Self {
            server,
            client: Arc::new(client),
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Answer health checks with `status`
    pub async fn mount_health(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path("/api/health"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({"status": "ok"})))
            .mount(&self.server)
            .await;
    }

    /// Answer workout uploads with `status` and `body`
    pub async fn mount_process(&self, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path("/api/process-workout"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }
}

/// A successful analysis response with backend-relative media paths
pub fn workout_response(session_id: &str, metrics: Value) -> Value {
    json!({
        "session_id": session_id,
        "status": "completed",
        "metrics": metrics,
        "annotated_video_url": format!("/api/video/{}/annotated", session_id),
        "csv_url": format!("/api/csv/{}", session_id),
    })
}

pub fn test_video() -> VideoUpload {
    VideoUpload::new("jump.mp4", "video/mp4", b"fake-video-bytes".to_vec())
        .expect("Failed to build upload")
}

/// View timings short enough for real-time tests
pub fn fast_timing() -> ViewTiming {
    ViewTiming {
        tick_interval: Duration::from_millis(20),
        progress_step: 5,
        progress_cap: 90,
        reward_delay: Duration::from_millis(20),
        coins_delay: Duration::from_millis(30),
        overlay_duration: Duration::from_millis(80),
        retry_delay: Duration::from_millis(50),
    }
}

/// Processor wired to `backend`, with history in a fresh temp dir
pub fn processor(backend: &TestBackend) -> (VideoProcessor<WorkoutClient>, HistoryStore, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let history = HistoryStore::new(dir.path().join("workout_history.json"));
    let processor = VideoProcessor::new(Arc::clone(&backend.client), history.clone())
        .with_timing(fast_timing());

    (processor, history, dir)
}
