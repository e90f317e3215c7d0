//! Paginated list and summary retrieval.

use std::sync::Arc;

use tracing::{debug, warn};

use chainview_client::api::NotificationApi;
use chainview_core::error::AppError;
use chainview_core::result::AppResult;
use chainview_core::types::pagination::{PageInfo, PageRequest};
use chainview_entity::notification::NotificationFilter;

use crate::metrics::EngineMetrics;
use crate::store::{NotificationStore, SessionTicket};

/// Loads pages and summaries into the store.
///
/// Each call captures the session ticket before awaiting; a response that
/// comes back after the session changed is discarded.
#[derive(Debug, Clone)]
pub struct NotificationFetcher {
    api: Arc<dyn NotificationApi>,
    store: Arc<NotificationStore>,
    metrics: Arc<EngineMetrics>,
}

impl NotificationFetcher {
    /// Create a new fetcher
    pub fn new(
        api: Arc<dyn NotificationApi>,
        store: Arc<NotificationStore>,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        Self { api, store, metrics }
    }

    /// Fetch one page. The first page replaces the held list, later pages
    /// append to it.
    pub async fn load(&self, filter: &NotificationFilter, page: PageRequest) -> AppResult<PageInfo> {
        let ticket = self.ticket()?;
        self.store.set_loading(true);

        let fetched = match self.api.list(filter, page).await {
            Ok(fetched) => fetched,
            Err(e) => {
                if self.store.fail_load_for(&ticket, e.to_string()) {
                    warn!(page = page.page, error = %e, "Notification fetch failed");
                } else {
                    self.discard("list");
                }
                return Err(e);
            }
        };

        let count = fetched.notifications.len();
        let pagination = fetched.pagination;
        if !self
            .store
            .apply_page_for(&ticket, fetched.notifications, fetched.summary, page.is_first())
        {
            self.discard("list");
            return Err(AppError::session("Session changed while the page was loading"));
        }

        self.metrics.page_loaded();
        debug!(
            page = page.page,
            count,
            total = pagination.total,
            "Notification page loaded"
        );
        Ok(pagination)
    }

    /// Fetch the summary alone and write it wholesale.
    pub async fn refresh_summary(&self) -> AppResult<()> {
        let ticket = self.ticket()?;
        let summary = self.api.summary().await?;
        let unread = summary.unread_count;
        if !self.store.replace_summary_for(&ticket, summary) {
            self.discard("summary");
            return Err(AppError::session("Session changed while the summary was loading"));
        }
        debug!(unread, "Notification summary refreshed");
        Ok(())
    }

    fn ticket(&self) -> AppResult<SessionTicket> {
        self.store
            .ticket()
            .ok_or_else(|| AppError::session("No active notification session"))
    }

    fn discard(&self, what: &'static str) {
        self.metrics.stale_response();
        debug!(response = what, "Discarding response for a previous session");
    }
}
