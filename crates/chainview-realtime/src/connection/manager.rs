//! Connection manager: owns the push channel and its reconnect timer.
//!
//! One supervisor task per `connect()` opens the channel, pumps inbound
//! frames into the store, and sleeps out the backoff between attempts.
//! `disconnect()` cancels the supervisor, which closes the channel and
//! drops any pending timer with it.

use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use chainview_client::session::SessionProvider;
use chainview_core::config::RealtimeConfig;
use chainview_core::error::AppError;
use chainview_core::result::AppResult;
use chainview_core::types::id::ConnectionId;

use crate::message::serializer::decode_event;
use crate::message::types::PushEvent;
use crate::metrics::EngineMetrics;
use crate::store::NotificationStore;

use super::backoff::ReconnectPolicy;
use super::state::{CloseOutcome, ConnectionFsm, ConnectionState, ConnectionStatus};
use super::transport::{PushStream, PushTransport};

/// Maintains one logical push connection per session.
#[derive(Debug)]
pub struct ConnectionManager {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    /// Opens channels.
    transport: Arc<dyn PushTransport>,
    /// Where inbound events are merged.
    store: Arc<NotificationStore>,
    /// Identity used to address the channel.
    session: Arc<dyn SessionProvider>,
    /// Metrics.
    metrics: Arc<EngineMetrics>,
    /// Configuration.
    config: RealtimeConfig,
    /// Transition logic; the lock is never held across an await.
    fsm: Mutex<ConnectionFsm>,
    /// Publishes every status change.
    status_tx: watch::Sender<ConnectionStatus>,
    /// Fan-out of applied events.
    events_tx: broadcast::Sender<PushEvent>,
    /// The running supervisor, if any.
    supervisor: Mutex<Option<Supervisor>>,
}

#[derive(Debug)]
struct Supervisor {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl ConnectionManager {
    /// Creates a disconnected manager.
    pub fn new(
        config: RealtimeConfig,
        transport: Arc<dyn PushTransport>,
        store: Arc<NotificationStore>,
        session: Arc<dyn SessionProvider>,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        let fsm = ConnectionFsm::new(ReconnectPolicy::from_config(&config));
        let (status_tx, _) = watch::channel(fsm.status().clone());
        let (events_tx, _) = broadcast::channel(config.event_buffer_size.max(1));

        Self {
            inner: Arc::new(Inner {
                transport,
                store,
                session,
                metrics,
                config,
                fsm: Mutex::new(fsm),
                status_tx,
                events_tx,
                supervisor: Mutex::new(None),
            }),
        }
    }

    /// Open the push channel for the current session.
    ///
    /// A no-op while connecting or connected. From `disconnected` (including
    /// while a reconnect timer is pending, or after retries ran out) it
    /// starts over with the attempt counter at zero.
    ///
    /// Must be called within a Tokio runtime.
    pub fn connect(&self) -> AppResult<()> {
        if self.inner.session.current_session().is_none() {
            return Err(AppError::session(
                "No authenticated session; cannot open push channel",
            ));
        }

        let mut slot = self.inner.supervisor.lock().unwrap_or_else(|e| e.into_inner());
        let state = self.status().state;
        if let Some(running) = slot.as_ref() {
            if !running.handle.is_finished() && state != ConnectionState::Disconnected {
                debug!(%state, "Push channel already active; connect ignored");
                return Ok(());
            }
        }
        if let Some(previous) = slot.take() {
            previous.cancel.cancel();
        }

        self.inner.update(|fsm| fsm.begin_connect());
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(supervise(self.inner.clone(), cancel.clone()));
        *slot = Some(Supervisor { cancel, handle });
        Ok(())
    }

    /// Close the channel and cancel any pending reconnect. Idempotent.
    pub async fn disconnect(&self) {
        let running = self
            .inner
            .supervisor
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();

        if let Some(Supervisor { cancel, handle }) = running {
            cancel.cancel();
            if let Err(e) = handle.await {
                warn!(error = %e, "Push supervisor ended abnormally");
            }
        }

        let was = self.status().state;
        self.inner.update(|fsm| {
            fsm.on_closed(true, None);
        });
        if was != ConnectionState::Disconnected {
            info!(from = %was, "Push channel disconnected");
        }
    }

    /// Current status.
    pub fn status(&self) -> ConnectionStatus {
        self.inner.status_tx.borrow().clone()
    }

    /// Receiver observing every status change.
    pub fn subscribe_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.inner.status_tx.subscribe()
    }

    /// Receiver for events after they were merged into the store.
    pub fn subscribe_events(&self) -> broadcast::Receiver<PushEvent> {
        self.inner.events_tx.subscribe()
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        let running = self
            .inner
            .supervisor
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(running) = running {
            running.cancel.cancel();
        }
    }
}

impl Inner {
    /// Apply a transition and publish the result.
    fn update<R>(&self, f: impl FnOnce(&mut ConnectionFsm) -> R) -> R {
        let mut fsm = self.fsm.lock().unwrap_or_else(|e| e.into_inner());
        let out = f(&mut fsm);
        self.status_tx.send_replace(fsm.status().clone());
        out
    }

    /// [`update`](Self::update) unless `cancel` fired; a cancelled
    /// supervisor must not overwrite the state of whoever replaced it.
    fn transition<R>(
        &self,
        cancel: &CancellationToken,
        f: impl FnOnce(&mut ConnectionFsm) -> R,
    ) -> Option<R> {
        let mut fsm = self.fsm.lock().unwrap_or_else(|e| e.into_inner());
        if cancel.is_cancelled() {
            return None;
        }
        let out = f(&mut fsm);
        self.status_tx.send_replace(fsm.status().clone());
        Some(out)
    }

    /// Read frames until the channel ends. `None` means cancelled.
    async fn pump(&self, stream: &mut dyn PushStream, cancel: &CancellationToken) -> Option<String> {
        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => return None,
                next = stream.next_message() => next,
            };
            match next {
                Some(Ok(raw)) => self.handle_frame(&raw),
                Some(Err(e)) => return Some(e.to_string()),
                None => return Some("push channel closed by server".to_string()),
            }
        }
    }

    /// Merge one frame. Malformed frames are dropped; the channel stays up.
    fn handle_frame(&self, raw: &str) {
        let event = match decode_event(raw, self.config.max_message_bytes) {
            Ok(event) => event,
            Err(e) => {
                self.metrics.event_dropped();
                warn!(error = %e, len = raw.len(), "Dropping malformed push payload");
                return;
            }
        };

        let outcome = self.store.apply_inbound_event(&event);
        self.metrics.event_applied();
        debug!(
            event_type = event.event_type(),
            inserted = outcome.inserted,
            updated = outcome.updated,
            removed = outcome.removed,
            summary_replaced = outcome.summary_replaced,
            "Push event applied"
        );
        // No receivers is fine.
        let _ = self.events_tx.send(event);
    }
}

/// Connect, pump, and back off until cancelled or out of attempts.
async fn supervise(inner: Arc<Inner>, cancel: CancellationToken) {
    loop {
        let Some(session) = inner.session.current_session() else {
            inner.transition(&cancel, |fsm| fsm.on_closed(true, None));
            warn!("Session ended; push channel not reopened");
            return;
        };

        let opened = tokio::select! {
            _ = cancel.cancelled() => return,
            opened = inner.transport.open(&session) => opened,
        };

        let reason = match opened {
            Ok(mut stream) => {
                let conn_id = ConnectionId::new();
                if inner.transition(&cancel, |fsm| fsm.on_open()).is_none() {
                    stream.close().await;
                    return;
                }
                inner.metrics.connection_opened();
                info!(conn_id = %conn_id, user_id = %session.user_id, "Push channel connected");

                match inner.pump(stream.as_mut(), &cancel).await {
                    Some(reason) => {
                        debug!(conn_id = %conn_id, reason = %reason, "Push channel ended");
                        reason
                    }
                    None => {
                        stream.close().await;
                        debug!(conn_id = %conn_id, "Push channel closed on request");
                        return;
                    }
                }
            }
            Err(e) => e.to_string(),
        };

        let Some(outcome) = inner.transition(&cancel, |fsm| fsm.on_closed(false, Some(reason.clone())))
        else {
            return;
        };

        match outcome {
            CloseOutcome::Retry { attempt, delay } => {
                inner.metrics.reconnect_scheduled();
                warn!(
                    attempt,
                    delay_secs = delay.as_secs(),
                    reason = %reason,
                    "Push channel lost; reconnect scheduled"
                );
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = tokio::time::sleep(delay) => {}
                }
                if inner.transition(&cancel, |fsm| fsm.begin_retry()).is_none() {
                    return;
                }
            }
            CloseOutcome::GaveUp { attempts } => {
                warn!(attempts, reason = %reason, "Push channel reconnect attempts exhausted");
                return;
            }
            CloseOutcome::Stopped => return,
        }
    }
}
