//! Integration tests for the push connection lifecycle.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use chainview_client::session::WatchSessionProvider;
use chainview_core::config::{RealtimeConfig, StoreConfig};
use chainview_core::error::ErrorKind;
use chainview_entity::session::AuthState;
use chainview_realtime::connection::{ConnectionManager, ConnectionState};
use chainview_realtime::metrics::EngineMetrics;
use chainview_realtime::store::NotificationStore;

use helpers::{ConnectionHarness, MockTransport, new_notification_frame, notification};

#[tokio::test(start_paused = true)]
async fn test_backoff_doubles_then_stops_at_ceiling() {
    let h = ConnectionHarness::new();
    let mut status = h.manager.subscribe_status();

    h.manager.connect().unwrap();
    status.wait_for(|s| s.exhausted).await.unwrap();

    let opens = h.transport.open_times();
    assert_eq!(opens.len(), 6);
    let gaps: Vec<u64> = opens.windows(2).map(|w| (w[1] - w[0]).as_secs()).collect();
    assert_eq!(gaps, vec![2, 4, 8, 16, 32]);

    tokio::time::sleep(Duration::from_secs(3600)).await;
    assert_eq!(h.transport.open_count(), 6);

    let s = h.manager.status();
    assert_eq!(s.state, ConnectionState::Disconnected);
    assert_eq!(s.reconnect_attempts, 5);
    assert!(s.last_error.unwrap().contains("connection refused"));
    assert_eq!(h.metrics.snapshot().reconnects_scheduled, 5);
}

#[tokio::test(start_paused = true)]
async fn test_unexpected_closure_schedules_reconnect_in_two_seconds() {
    let h = ConnectionHarness::new();
    let first = h.transport.script_channel();
    let _second = h.transport.script_channel();
    let mut status = h.manager.subscribe_status();

    h.manager.connect().unwrap();
    status.wait_for(|s| s.is_connected()).await.unwrap();

    first.close();
    let after_close = status
        .wait_for(|s| s.state == ConnectionState::Disconnected)
        .await
        .unwrap()
        .clone();
    assert_eq!(after_close.reconnect_attempts, 1);
    assert!(after_close.last_error.is_some());
    assert!(!after_close.exhausted);

    status.wait_for(|s| s.is_connected()).await.unwrap();
    let opens = h.transport.open_times();
    assert_eq!(opens.len(), 2);
    assert_eq!(opens[1] - opens[0], Duration::from_secs(2));
    assert_eq!(h.manager.status().reconnect_attempts, 0);
    assert_eq!(h.metrics.snapshot().connections_opened, 2);
}

#[tokio::test(start_paused = true)]
async fn test_stream_error_takes_the_closure_path() {
    let h = ConnectionHarness::new();
    let channel = h.transport.script_channel();
    let mut status = h.manager.subscribe_status();

    h.manager.connect().unwrap();
    status.wait_for(|s| s.is_connected()).await.unwrap();

    channel.fail("frame decode failure");
    let s = status
        .wait_for(|s| s.state == ConnectionState::Disconnected)
        .await
        .unwrap()
        .clone();
    assert_eq!(s.reconnect_attempts, 1);
    assert!(s.last_error.unwrap().contains("frame decode failure"));
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_cancels_pending_reconnect() {
    let h = ConnectionHarness::new();
    let first = h.transport.script_channel();
    let mut status = h.manager.subscribe_status();

    h.manager.connect().unwrap();
    status.wait_for(|s| s.is_connected()).await.unwrap();
    first.close();
    status
        .wait_for(|s| s.state == ConnectionState::Disconnected && s.reconnect_attempts == 1)
        .await
        .unwrap();

    h.manager.disconnect().await;
    tokio::time::sleep(Duration::from_secs(60)).await;

    assert_eq!(h.transport.open_count(), 1);
    assert_eq!(h.manager.status().state, ConnectionState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_closes_channel_and_is_idempotent() {
    let h = ConnectionHarness::new();
    let channel = h.transport.script_channel();
    let mut status = h.manager.subscribe_status();

    h.manager.connect().unwrap();
    status.wait_for(|s| s.is_connected()).await.unwrap();

    h.manager.disconnect().await;
    assert!(channel.closed_by_client());
    assert_eq!(h.manager.status().state, ConnectionState::Disconnected);

    h.manager.disconnect().await;
    assert_eq!(h.manager.status().state, ConnectionState::Disconnected);
    assert_eq!(h.metrics.snapshot().reconnects_scheduled, 0);
}

#[tokio::test(start_paused = true)]
async fn test_connect_is_noop_while_connected() {
    let h = ConnectionHarness::new();
    let _channel = h.transport.script_channel();
    let mut status = h.manager.subscribe_status();

    h.manager.connect().unwrap();
    status.wait_for(|s| s.is_connected()).await.unwrap();
    h.manager.connect().unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(h.transport.open_count(), 1);
    assert!(h.manager.status().is_connected());
}

#[tokio::test(start_paused = true)]
async fn test_manual_connect_after_exhaustion_starts_over() {
    let h = ConnectionHarness::new();
    let mut status = h.manager.subscribe_status();

    h.manager.connect().unwrap();
    status.wait_for(|s| s.exhausted).await.unwrap();

    let _channel = h.transport.script_channel();
    h.manager.connect().unwrap();
    status.wait_for(|s| s.is_connected()).await.unwrap();

    let s = h.manager.status();
    assert_eq!(s.reconnect_attempts, 0);
    assert!(!s.exhausted);
    assert!(s.last_error.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_malformed_payloads_are_dropped_without_closing() {
    let h = ConnectionHarness::new();
    let channel = h.transport.script_channel();
    let mut status = h.manager.subscribe_status();
    let mut events = h.manager.subscribe_events();

    h.manager.connect().unwrap();
    status.wait_for(|s| s.is_connected()).await.unwrap();

    channel.send_text("{not json");
    channel.send_text(r#"{"type":"presence_changed","user_id":"u2"}"#);
    channel.send_text(new_notification_frame(&notification("n1")));

    let event = events.recv().await.unwrap();
    assert_eq!(event.event_type(), "new_notification");
    assert_eq!(h.store.len(), 1);
    assert_eq!(h.store.unread_count(), 1);
    assert!(h.manager.status().is_connected());

    let metrics = h.metrics.snapshot();
    assert_eq!(metrics.events_dropped, 2);
    assert_eq!(metrics.events_applied, 1);
}

#[tokio::test]
async fn test_connect_requires_a_session() {
    let (_tx, rx) = watch::channel(AuthState::LoggedOut);
    let manager = ConnectionManager::new(
        RealtimeConfig::default(),
        Arc::new(MockTransport::new()),
        Arc::new(NotificationStore::new(&StoreConfig::default())),
        Arc::new(WatchSessionProvider::new(rx)),
        Arc::new(EngineMetrics::new()),
    );

    let err = manager.connect().unwrap_err();
    assert_eq!(err.kind, ErrorKind::Session);
    assert_eq!(manager.status().state, ConnectionState::Disconnected);
}
