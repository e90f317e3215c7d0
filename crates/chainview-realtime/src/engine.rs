//! The session-scoped sync engine.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use chainview_client::api::NotificationApi;
use chainview_client::session::SessionProvider;
use chainview_core::config::AppConfig;
use chainview_core::result::AppResult;
use chainview_core::types::id::{NotificationId, UserId};
use chainview_core::types::pagination::{PageInfo, PageRequest};
use chainview_entity::notification::{Notification, NotificationFilter, NotificationSummary};
use chainview_entity::session::{AuthSession, AuthState};

use crate::connection::manager::ConnectionManager;
use crate::connection::state::ConnectionStatus;
use crate::connection::transport::PushTransport;
use crate::message::types::PushEvent;
use crate::metrics::{EngineMetrics, MetricsSnapshot};
use crate::notification::dispatcher::MutationDispatcher;
use crate::notification::fetcher::NotificationFetcher;
use crate::store::{NotificationStore, StoreSnapshot};

/// Ties the store, connection manager, dispatcher, and fetcher together
/// for one authenticated user at a time.
///
/// The presentation layer reads through the accessors and acts through the
/// action methods; nothing else writes to the store.
#[derive(Debug)]
pub struct NotificationEngine {
    store: Arc<NotificationStore>,
    connection: ConnectionManager,
    dispatcher: MutationDispatcher,
    fetcher: NotificationFetcher,
    metrics: Arc<EngineMetrics>,
    page_size: u64,
}

impl NotificationEngine {
    /// Build an idle engine. Nothing is fetched or opened until [`start`].
    ///
    /// [`start`]: Self::start
    pub fn new(
        config: &AppConfig,
        api: Arc<dyn NotificationApi>,
        transport: Arc<dyn PushTransport>,
        session: Arc<dyn SessionProvider>,
    ) -> Self {
        let metrics = Arc::new(EngineMetrics::new());
        let store = Arc::new(NotificationStore::new(&config.store));
        let connection = ConnectionManager::new(
            config.realtime.clone(),
            transport,
            store.clone(),
            session,
            metrics.clone(),
        );

        Self {
            dispatcher: MutationDispatcher::new(api.clone(), store.clone(), metrics.clone()),
            fetcher: NotificationFetcher::new(api, store.clone(), metrics.clone()),
            store,
            connection,
            metrics,
            page_size: config.api.page_size,
        }
    }

    /// Begin a session for `session`'s user: fresh store, push channel,
    /// first page.
    ///
    /// Any channel still open from an earlier session is closed first, so
    /// its events cannot reach the new user's store.
    ///
    /// A failed first load is recorded in the store's error flag and does
    /// not fail the start; only a push channel that cannot be started does.
    pub async fn start(&self, session: &AuthSession) -> AppResult<()> {
        self.connection.disconnect().await;
        self.store.begin_session(session.user_id.clone());
        self.connection.connect()?;

        if let Err(e) = self
            .load_notifications(&NotificationFilter::all(), 1)
            .await
        {
            warn!(user_id = %session.user_id, error = %e, "Initial notification load failed");
        }

        info!(
            user_id = %session.user_id,
            unread = self.store.unread_count(),
            "Notification engine started"
        );
        Ok(())
    }

    /// Close the push channel and drop everything held.
    pub async fn shutdown(&self) {
        self.connection.disconnect().await;
        self.store.clear();
        info!("Notification engine stopped");
    }

    /// Follow the host application's auth state: start on login, tear down
    /// on logout, restart when a different user logs in.
    ///
    /// The task ends (after tearing down) when the sender is dropped.
    pub fn bind_auth(self: Arc<Self>, mut auth: watch::Receiver<AuthState>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut active: Option<UserId> = None;
            loop {
                let state = auth.borrow_and_update().clone();
                match state.session() {
                    Some(session) if active.as_ref() != Some(&session.user_id) => {
                        if active.is_some() {
                            self.shutdown().await;
                        }
                        if let Err(e) = self.start(session).await {
                            warn!(user_id = %session.user_id, error = %e, "Failed to start notification engine");
                        }
                        active = Some(session.user_id.clone());
                    }
                    // Same user; a refreshed token is read through the provider.
                    Some(_) => {}
                    None => {
                        if active.take().is_some() {
                            self.shutdown().await;
                        }
                    }
                }

                if auth.changed().await.is_err() {
                    break;
                }
            }

            if active.is_some() {
                self.shutdown().await;
            }
        })
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Held notifications, most recent first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.store.notifications()
    }

    /// Current summary.
    pub fn summary(&self) -> NotificationSummary {
        self.store.summary()
    }

    /// Unread count.
    pub fn unread_count(&self) -> u64 {
        self.store.unread_count()
    }

    /// High-priority count.
    pub fn high_priority_count(&self) -> u64 {
        self.store.high_priority_count()
    }

    /// Consistent copy of everything above.
    pub fn snapshot(&self) -> StoreSnapshot {
        self.store.snapshot()
    }

    /// Push channel status.
    pub fn connection_status(&self) -> ConnectionStatus {
        self.connection.status()
    }

    /// Whether a list fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    /// Last fetch error.
    pub fn error(&self) -> Option<String> {
        self.store.error()
    }

    /// Observe store revisions.
    pub fn subscribe_changes(&self) -> watch::Receiver<u64> {
        self.store.subscribe()
    }

    /// Observe connection status.
    pub fn subscribe_connection(&self) -> watch::Receiver<ConnectionStatus> {
        self.connection.subscribe_status()
    }

    /// Observe push events after they were applied.
    pub fn subscribe_events(&self) -> broadcast::Receiver<PushEvent> {
        self.connection.subscribe_events()
    }

    /// Counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// The store, for read-only use.
    pub fn store(&self) -> &Arc<NotificationStore> {
        &self.store
    }

    // ── Actions ──────────────────────────────────────────────────────

    /// Load page `page` (1-based) with the configured page size.
    pub async fn load_notifications(&self, filter: &NotificationFilter, page: u64) -> AppResult<PageInfo> {
        self.fetcher
            .load(filter, PageRequest::new(page, self.page_size))
            .await
    }

    /// Refresh the summary alone.
    pub async fn refresh_summary(&self) -> AppResult<()> {
        self.fetcher.refresh_summary().await
    }

    /// See [`MutationDispatcher::mark_as_read`].
    pub async fn mark_as_read(&self, id: &NotificationId) -> AppResult<()> {
        self.dispatcher.mark_as_read(id).await
    }

    /// See [`MutationDispatcher::mark_as_unread`].
    pub async fn mark_as_unread(&self, id: &NotificationId) -> AppResult<()> {
        self.dispatcher.mark_as_unread(id).await
    }

    /// See [`MutationDispatcher::archive_notification`].
    pub async fn archive_notification(&self, id: &NotificationId) -> AppResult<()> {
        self.dispatcher.archive_notification(id).await
    }

    /// See [`MutationDispatcher::delete_notification`].
    pub async fn delete_notification(&self, id: &NotificationId) -> AppResult<()> {
        self.dispatcher.delete_notification(id).await
    }

    /// See [`MutationDispatcher::mark_all_as_read`].
    pub async fn mark_all_as_read(&self) -> AppResult<usize> {
        self.dispatcher.mark_all_as_read().await
    }

    /// Open the push channel (manual retry after exhaustion included).
    pub fn connect(&self) -> AppResult<()> {
        self.connection.connect()
    }

    /// Close the push channel.
    pub async fn disconnect(&self) {
        self.connection.disconnect().await
    }
}
