//! Chainview notification daemon
//!
//! Keeps one user's notifications in sync with the backend and logs every
//! change until interrupted.

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use chainview_client::http::HttpNotificationApi;
use chainview_client::session::WatchSessionProvider;
use chainview_core::config::AppConfig;
use chainview_core::error::AppError;
use chainview_entity::session::{AuthSession, AuthState};
use chainview_realtime::NotificationEngine;
use chainview_realtime::connection::WebSocketTransport;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Daemon error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from `CHAINVIEW_CONFIG_DIR` and the environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let dir = std::env::var("CHAINVIEW_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let env = std::env::var("CHAINVIEW_ENV").unwrap_or_else(|_| "development".to_string());

    AppConfig::load_from(&dir, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Session identity from the `CHAINVIEW_*` identity variables
fn session_from_env() -> Result<AuthSession, AppError> {
    let var = |name: &str| {
        std::env::var(name)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AppError::authentication(format!("{name} is not set")))
    };

    Ok(AuthSession::new(
        var("CHAINVIEW_USER_ID")?,
        var("CHAINVIEW_COMPANY_ID")?,
        var("CHAINVIEW_ACCESS_TOKEN")?,
    ))
}

/// Main daemon run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Chainview notification daemon v{}", env!("CARGO_PKG_VERSION"));

    let session = session_from_env()?;
    let (auth_tx, auth_rx) = watch::channel(AuthState::LoggedIn(session));
    let provider = Arc::new(WatchSessionProvider::new(auth_rx.clone()));

    let api = Arc::new(HttpNotificationApi::new(&config.api, provider.clone())?);
    let transport = Arc::new(WebSocketTransport::new(&config.realtime));
    let engine = Arc::new(NotificationEngine::new(&config, api, transport, provider));

    let mut changes = engine.subscribe_changes();
    let mut connection = engine.subscribe_connection();
    let auth_task = engine.clone().bind_auth(auth_rx);

    let watcher = tokio::spawn({
        let engine = engine.clone();
        async move {
            loop {
                tokio::select! {
                    changed = changes.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let summary = engine.summary();
                        tracing::info!(
                            unread = summary.unread_count,
                            high_priority = summary.high_priority_count,
                            urgent = summary.urgent_count,
                            held = engine.notifications().len(),
                            "Notifications changed"
                        );
                    }
                    changed = connection.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let status = connection.borrow_and_update().clone();
                        if status.exhausted {
                            tracing::warn!(
                                attempts = status.reconnect_attempts,
                                last_error = status.last_error.as_deref().unwrap_or(""),
                                "Push channel gave up reconnecting"
                            );
                        } else {
                            tracing::info!(state = %status.state, "Push channel state changed");
                        }
                    }
                }
            }
        }
    });

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, stopping engine...");

    auth_tx.send_replace(AuthState::LoggedOut);
    drop(auth_tx);
    let _ = auth_task.await;
    watcher.abort();

    let metrics = engine.metrics();
    tracing::info!(
        events_applied = metrics.events_applied,
        events_dropped = metrics.events_dropped,
        connections_opened = metrics.connections_opened,
        mutations_failed = metrics.mutations_failed,
        "Chainview notification daemon shut down"
    );
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
