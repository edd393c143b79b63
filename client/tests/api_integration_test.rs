//! Integration tests for the backend client against a mock server

mod common;

use std::time::{Duration, Instant};

use common::{test_video, workout_response, TestBackend};
use form_coach_client::{ClientError, WorkoutBackend, WorkoutClient};
use form_coach_shared::ProcessingMode;
use rstest::rstest;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

#[rstest]
#[case(200, true)]
#[case(500, false)]
#[case(503, false)]
#[tokio::test]
async fn test_health_reflects_status_code(#[case] status: u16, #[case] healthy: bool) {
    let backend = TestBackend::start().await;
    backend.mount_health(status).await;

    assert_eq!(backend.client.check_health().await, healthy);
}

#[tokio::test]
async fn test_health_unreachable_is_unhealthy() {
    let client = WorkoutClient::new("http://127.0.0.1:1").unwrap();
    assert!(!client.check_health().await);
}

#[tokio::test]
async fn test_health_slow_response_is_unhealthy() {
    let backend = TestBackend::start().await;

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
        .mount(&backend.server)
        .await;

    let started = Instant::now();
    assert!(!backend.client.check_health().await);
    assert!(started.elapsed() < Duration::from_secs(15));
}

#[tokio::test]
async fn test_process_sends_multipart_fields() {
    let backend = TestBackend::start().await;

    Mock::given(method("POST"))
        .and(path("/api/process-workout"))
        .and(body_string_contains("name=\"video\""))
        .and(body_string_contains("filename=\"jump.mp4\""))
        .and(body_string_contains("name=\"activity\""))
        .and(body_string_contains("Vertical Jump"))
        .and(body_string_contains("name=\"mode\""))
        .and(body_string_contains("fake-video-bytes"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(workout_response("s1", json!({"total_jumps": 3}))),
        )
        .expect(1)
        .mount(&backend.server)
        .await;

    let result = backend
        .client
        .process_workout(test_video(), "Vertical Jump", ProcessingMode::Video)
        .await
        .unwrap();

    assert_eq!(result.session_id, "s1");
    assert_eq!(result.metrics.get_f64("total_jumps"), Some(3.0));
}

#[tokio::test]
async fn test_process_rewrites_media_urls() {
    let backend = TestBackend::start().await;
    backend
        .mount_process(200, workout_response("abc", json!({})))
        .await;

    let result = backend
        .client
        .process_workout(test_video(), "Push-ups", ProcessingMode::Video)
        .await
        .unwrap();

    assert_eq!(
        result.annotated_video_url,
        format!("{}/api/video/abc/annotated", backend.uri())
    );
    assert_eq!(result.csv_url, format!("{}/api/csv/abc", backend.uri()));
}

#[tokio::test]
async fn test_process_surfaces_backend_detail() {
    let backend = TestBackend::start().await;
    backend
        .mount_process(400, json!({"detail": "corrupt file"}))
        .await;

    let err = backend
        .client
        .process_workout(test_video(), "Push-ups", ProcessingMode::Video)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Backend { status: 400, .. }));
    assert_eq!(err.user_message(), "corrupt file");
}

#[rstest]
#[case(json!({}))]
#[case(json!({"detail": [{"msg": "field required"}]}))]
#[tokio::test]
async fn test_process_without_detail_uses_default_message(#[case] body: serde_json::Value) {
    let backend = TestBackend::start().await;
    backend.mount_process(500, body).await;

    let err = backend
        .client
        .process_workout(test_video(), "Push-ups", ProcessingMode::Video)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Failed to process workout");
}

#[tokio::test]
async fn test_live_mode_is_rejected_before_upload() {
    let backend = TestBackend::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend.server)
        .await;

    let err = backend
        .client
        .process_workout(test_video(), "Push-ups", ProcessingMode::Live)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::UnsupportedMode(ProcessingMode::Live)));
}

#[tokio::test]
async fn test_fetch_csv_log() {
    let backend = TestBackend::start().await;

    Mock::given(method("GET"))
        .and(path("/api/csv/s1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("frame,knee_angle\n1,170.2\n2,95.4\n"),
        )
        .mount(&backend.server)
        .await;

    let log = backend.client.fetch_csv_log("/api/csv/s1").await.unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(
        log.column("knee_angle").collect::<Vec<_>>(),
        vec!["170.2", "95.4"]
    );

    // The absolute form handed out in results works too
    let absolute = format!("{}/api/csv/s1", backend.uri());
    assert_eq!(backend.client.fetch_csv_log(&absolute).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_fetch_csv_log_not_found() {
    let backend = TestBackend::start().await;

    Mock::given(method("GET"))
        .and(path("/api/csv/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "CSV not found"})))
        .mount(&backend.server)
        .await;

    let err = backend
        .client
        .fetch_csv_log("/api/csv/missing")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "CSV not found");
}
