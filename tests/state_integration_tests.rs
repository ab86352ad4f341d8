//! Integration tests for StateManager with state change events
//!
//! These tests verify that the StateManager correctly:
//! - Emits state change events on mutations
//! - Supports multiple subscribers
//! - Tracks overlapping requests per channel
//! - Drops stale copy-marker clears after a result replacement

use cheathub::models::{ApiToken, Channel, CheatFile, GameResult, Notification, Severity};
use cheathub::{StateChange, StateManager};
use std::sync::Arc;
use tokio::time::{Duration, timeout};

fn sample_result(ids: &[&str]) -> GameResult {
    GameResult {
        name: "Game X".to_string(),
        titleid: "0100A3D008C5C000".to_string(),
        slug: "game-x".to_string(),
        banner: None,
        image: None,
        count: ids.len() as i64,
        cheats: ids
            .iter()
            .map(|id| CheatFile {
                id: id.to_string(),
                credits: "alice".to_string(),
                buildid: "421C5411B487EB4D".to_string(),
                description: None,
                titles: Vec::new(),
                content: format!("content {}", id),
            })
            .collect(),
    }
}

#[tokio::test]
async fn test_token_events_emitted() {
    let state = Arc::new(StateManager::new());
    let mut rx = state.subscribe();

    state.set_token(ApiToken::new("abc123", "2030-01-01T00:00:00Z"));

    let event = timeout(Duration::from_millis(100), rx.recv())
        .await
        .expect("Timeout waiting for event")
        .expect("Channel closed");

    assert!(
        matches!(event, StateChange::TokenChanged { present: true }),
        "Expected TokenChanged event, got: {:?}",
        event
    );
    assert_eq!(state.token().unwrap().token, "abc123");
}

#[tokio::test]
async fn test_multiple_subscribers_receive_events() {
    let state = Arc::new(StateManager::new());
    let mut rx1 = state.subscribe();
    let mut rx2 = state.subscribe();

    state.set_notification(Notification::new(Channel::Query, Severity::Info, "hello"));

    for rx in [&mut rx1, &mut rx2] {
        let event = timeout(Duration::from_millis(100), rx.recv())
            .await
            .expect("Timeout waiting for event")
            .expect("Channel closed");
        assert_eq!(
            event,
            StateChange::NotificationPosted {
                channel: Channel::Query,
                severity: Severity::Info,
                text: "hello".to_string(),
            }
        );
    }
}

#[test]
fn test_no_event_when_nothing_changes() {
    let state = StateManager::new();
    let changes = state.update(|_| {});
    assert!(changes.is_empty());
}

#[test]
fn test_overlapping_requests_keep_channel_busy() {
    let state = StateManager::new();

    let first = state.begin_request(Channel::Query);
    let second = state.begin_request(Channel::Query);
    assert!(state.read(|s| s.is_querying()));
    assert!(!state.read(|s| s.is_authenticating()));

    drop(first);
    assert!(state.read(|s| s.is_querying()));

    drop(second);
    assert!(!state.read(|s| s.is_querying()));
}

#[test]
fn test_replacing_result_resets_disclosure() {
    let state = StateManager::new();
    state.replace_game_result(Some(sample_result(&["1", "2"])));
    state.toggle_expand("1");
    state.mark_copied("2");

    let changes = state.replace_game_result(Some(sample_result(&["3"])));

    assert!(changes.contains(&StateChange::GameResultChanged {
        name: Some("Game X".to_string()),
        cheats: 1,
    }));
    let snapshot = state.snapshot();
    assert!(snapshot.disclosure.is_empty());
}

#[test]
fn test_stale_copy_clear_is_ignored() {
    let state = StateManager::new();
    state.replace_game_result(Some(sample_result(&["1"])));

    let generation = state.mark_copied("1");
    state.replace_game_result(Some(sample_result(&["1"])));
    state.mark_copied("1");

    // The clear scheduled for the first result must not touch the second
    let changes = state.clear_copied("1", generation);
    assert!(changes.is_empty());
    assert!(state.read(|s| s.disclosure.is_copied("1")));
}

#[test]
fn test_clear_notification_only_matching_seq() {
    let state = StateManager::new();
    state.set_notification(
        Notification::new(Channel::Auth, Severity::Success, "first").with_seq(1),
    );
    state.set_notification(
        Notification::new(Channel::Auth, Severity::Error, "second").with_seq(2),
    );

    assert!(state.clear_notification(Channel::Auth, Some(1)).is_empty());
    assert_eq!(
        state.read(|s| s.notification(Channel::Auth).map(|n| n.text.clone())),
        Some("second".to_string())
    );

    let changes = state.clear_notification(Channel::Auth, Some(2));
    assert_eq!(
        changes,
        vec![StateChange::NotificationCleared {
            channel: Channel::Auth
        }]
    );
}

#[tokio::test]
async fn test_concurrent_updates_from_tasks() {
    let state = Arc::new(StateManager::new());
    let mut handles = Vec::new();

    for i in 0..10 {
        let state = Arc::clone(&state);
        handles.push(tokio::spawn(async move {
            let _guard = state.begin_request(if i % 2 == 0 {
                Channel::Auth
            } else {
                Channel::Query
            });
            tokio::task::yield_now().await;
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    let snapshot = state.snapshot();
    assert_eq!(snapshot.auth_in_flight, 0);
    assert_eq!(snapshot.query_in_flight, 0);
}
