//! Integration tests for the session-scoped engine.

mod helpers;

use std::sync::Arc;

use tokio::sync::watch;

use chainview_client::session::WatchSessionProvider;
use chainview_core::config::AppConfig;
use chainview_entity::session::{AuthSession, AuthState};
use chainview_realtime::NotificationEngine;
use chainview_realtime::connection::ConnectionState;

use helpers::{MockApi, MockTransport, id, new_notification_frame, notification, read, session};

fn engine(
    api: Arc<MockApi>,
    transport: Arc<MockTransport>,
    auth: watch::Receiver<AuthState>,
) -> Arc<NotificationEngine> {
    Arc::new(NotificationEngine::new(
        &AppConfig::default(),
        api,
        transport,
        Arc::new(WatchSessionProvider::new(auth)),
    ))
}

#[tokio::test(start_paused = true)]
async fn test_start_loads_first_page_and_connects() {
    let api = Arc::new(MockApi::with_page(vec![notification("n1"), read("n2")]));
    let transport = Arc::new(MockTransport::new());
    let channel = transport.script_channel();
    let (_auth_tx, auth_rx) = watch::channel(AuthState::LoggedIn(session()));
    let engine = engine(api.clone(), transport.clone(), auth_rx);

    engine.start(&session()).await.unwrap();
    engine
        .subscribe_connection()
        .wait_for(|s| s.is_connected())
        .await
        .unwrap();

    assert_eq!(engine.notifications().len(), 2);
    assert_eq!(engine.unread_count(), 1);
    assert!(!engine.is_loading());
    assert!(engine.error().is_none());
    assert_eq!(api.calls(), vec!["list:1"]);

    let mut events = engine.subscribe_events();
    channel.send_text(new_notification_frame(&notification("n3")));
    events.recv().await.unwrap();
    assert_eq!(engine.unread_count(), 2);
    assert_eq!(engine.notifications()[0].id, id("n3"));

    engine.mark_all_as_read().await.unwrap();
    assert_eq!(engine.unread_count(), 0);
    assert_eq!(engine.metrics().events_applied, 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_initial_load_does_not_fail_start() {
    let api = Arc::new(MockApi::new());
    let transport = Arc::new(MockTransport::new());
    let _channel = transport.script_channel();
    let (_auth_tx, auth_rx) = watch::channel(AuthState::LoggedIn(session()));
    let engine = engine(api, transport, auth_rx);

    engine.start(&session()).await.unwrap();

    assert!(engine.notifications().is_empty());
    assert!(engine.error().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_auth_state_drives_start_and_teardown() {
    let api = Arc::new(MockApi::with_page(vec![notification("n1")]));
    let transport = Arc::new(MockTransport::new());
    let channel = transport.script_channel();
    let (auth_tx, auth_rx) = watch::channel(AuthState::LoggedOut);
    let engine = engine(api, transport.clone(), auth_rx.clone());
    let mut connection = engine.subscribe_connection();

    let task = engine.clone().bind_auth(auth_rx);
    auth_tx.send_replace(AuthState::LoggedIn(session()));
    connection.wait_for(|s| s.is_connected()).await.unwrap();
    assert_eq!(engine.notifications().len(), 1);

    auth_tx.send_replace(AuthState::LoggedOut);
    connection
        .wait_for(|s| s.state == ConnectionState::Disconnected)
        .await
        .unwrap();
    drop(auth_tx);
    task.await.unwrap();

    assert!(engine.notifications().is_empty());
    assert_eq!(engine.unread_count(), 0);
    assert!(engine.store().ticket().is_none());
    assert!(channel.closed_by_client());
    assert_eq!(transport.open_count(), 1);
    assert_eq!(engine.metrics().reconnects_scheduled, 0);
}

#[tokio::test(start_paused = true)]
async fn test_start_for_another_user_closes_previous_channel() {
    let api = Arc::new(MockApi::new());
    let transport = Arc::new(MockTransport::new());
    let first = transport.script_channel();
    let second = transport.script_channel();
    let (auth_tx, auth_rx) = watch::channel(AuthState::LoggedIn(session()));
    let engine = engine(api, transport.clone(), auth_rx);
    let mut connection = engine.subscribe_connection();

    engine.start(&session()).await.unwrap();
    connection.wait_for(|s| s.is_connected()).await.unwrap();

    let other = AuthSession::new("user-2", "company-2", "other-token");
    auth_tx.send_replace(AuthState::LoggedIn(other.clone()));
    engine.start(&other).await.unwrap();
    connection.wait_for(|s| s.is_connected()).await.unwrap();

    assert!(first.closed_by_client());
    assert!(!second.closed_by_client());
    assert_eq!(transport.open_count(), 2);

    // Anything still sent on the first channel goes nowhere.
    first.send_text(new_notification_frame(&notification("n-user1")));
    tokio::time::sleep(std::time::Duration::from_secs(1)).await;

    assert!(engine.store().get(&id("n-user1")).is_none());
    assert_eq!(
        engine.store().ticket().map(|t| t.user_id.to_string()),
        Some("user-2".to_string())
    );
    assert_eq!(engine.metrics().events_applied, 0);
}
