//! End-to-end tests for the processing view against a mock backend

mod common;

use std::time::Duration;

use common::{processor, test_video, workout_response, TestBackend};
use form_coach_client::{ProcessingResult, ViewEvent};
use form_coach_shared::Posture;
use serde_json::json;

#[tokio::test]
async fn test_vertical_jump_workout_is_saved() {
    let backend = TestBackend::start().await;
    backend
        .mount_process(
            200,
            workout_response(
                "vj1",
                json!({"jump_height_m": 0.5, "total_jumps": 3, "unrelated": 7}),
            ),
        )
        .await;
    let (processor, history, _dir) = processor(&backend);

    let mut handle = processor.start(test_video(), "Vertical Jump");
    let snapshot = handle.settled().await;

    assert_eq!(snapshot.progress, 100);
    let outcome = match snapshot.result {
        Some(ProcessingResult::Good(outcome)) => outcome,
        other => panic!("expected good posture, got {:?}", other),
    };
    let lines: Vec<String> = outcome
        .formatted_metrics
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(lines, vec!["Jump Height (m): 0.5", "Total Jumps: 3"]);
    assert_eq!(
        outcome.video_url,
        format!("{}/api/video/vj1/annotated", backend.uri())
    );
    assert_eq!(handle.coins_on_offer(), Some(50));

    let record = handle.submit_workout().await.unwrap();
    assert_eq!(record.posture, Posture::Good);
    assert_eq!(record.coins_earned, 50);

    let saved = history.load_all().await.unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].activity_name, "Vertical Jump");
    assert_eq!(saved[0].coins_earned, 50);
    assert_eq!(
        saved[0].badges_earned,
        vec!["Form Analyzer", "Consistency Champion"]
    );

    assert_eq!(handle.next_event().await, Some(ViewEvent::Completed(record)));
    handle.close().await;
}

#[tokio::test]
async fn test_low_accuracy_earns_fewer_coins() {
    let backend = TestBackend::start().await;
    backend
        .mount_process(
            200,
            workout_response("p1", json!({"reps_completed": 8, "form_accuracy_percent": 55})),
        )
        .await;
    let (processor, history, _dir) = processor(&backend);

    let handle = processor.start(test_video(), "Push-ups");
    let snapshot = handle.settled().await;

    assert!(matches!(snapshot.result, Some(ProcessingResult::Bad(_))));
    let record = handle.submit_workout().await.unwrap();
    assert_eq!(record.coins_earned, 25);
    assert_eq!(history.total_coins().await.unwrap(), 25);
}

#[tokio::test]
async fn test_reward_overlays_play_and_hide() {
    let backend = TestBackend::start().await;
    backend
        .mount_process(200, workout_response("r1", json!({"total_jumps": 1})))
        .await;
    let (processor, _history, _dir) = processor(&backend);

    let handle = processor.start(test_video(), "Vertical Jump");
    let mut rx = handle.subscribe();

    rx.wait_for(|s| s.overlay.badge_visible).await.unwrap();
    rx.wait_for(|s| s.overlay.coins_visible).await.unwrap();
    rx.wait_for(|s| !s.overlay.is_visible()).await.unwrap();
    assert!(handle.snapshot().can_submit());
}

#[tokio::test]
async fn test_failure_toasts_then_retries() {
    let backend = TestBackend::start().await;
    backend
        .mount_process(400, json!({"detail": "corrupt file"}))
        .await;
    let (processor, history, _dir) = processor(&backend);

    let mut handle = processor.start(test_video(), "Push-ups");
    let snapshot = handle.settled().await;
    assert_eq!(
        snapshot.result,
        Some(ProcessingResult::Poor {
            message: "corrupt file".to_string()
        })
    );
    assert!(!snapshot.can_submit());

    assert_eq!(
        handle.next_event().await,
        Some(ViewEvent::Toast("corrupt file".to_string()))
    );
    let retry = tokio::time::timeout(Duration::from_secs(2), handle.next_event())
        .await
        .unwrap();
    assert_eq!(retry, Some(ViewEvent::Retry));

    assert!(handle.submit_workout().await.is_err());
    assert!(history.load_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_backend_down_shows_fallback_message() {
    let backend = TestBackend::start().await;
    backend.mount_process(500, json!({})).await;
    let (processor, _history, _dir) = processor(&backend);

    let mut handle = processor.start(test_video(), "Sit-ups");
    handle.settled().await;

    assert_eq!(
        handle.next_event().await,
        Some(ViewEvent::Toast("Failed to process workout".to_string()))
    );
}
