//! Mutation dispatcher: optimistic store write, then the network call.

use std::sync::Arc;

use tracing::{debug, warn};

use chainview_client::api::{BulkOperation, NotificationApi};
use chainview_core::result::AppResult;
use chainview_core::types::id::NotificationId;
use chainview_entity::notification::NotificationStatus;

use crate::metrics::EngineMetrics;
use crate::store::NotificationStore;

/// Applies user actions to the store immediately and confirms them with
/// the backend afterwards.
///
/// A failed confirmation is logged and returned to the caller. The local
/// change is kept; the next authoritative summary corrects any drift.
#[derive(Debug, Clone)]
pub struct MutationDispatcher {
    /// Backend.
    api: Arc<dyn NotificationApi>,
    /// Store.
    store: Arc<NotificationStore>,
    /// Metrics.
    metrics: Arc<EngineMetrics>,
}

impl MutationDispatcher {
    /// Create a new dispatcher
    pub fn new(
        api: Arc<dyn NotificationApi>,
        store: Arc<NotificationStore>,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        Self { api, store, metrics }
    }

    /// Mark one notification read.
    pub async fn mark_as_read(&self, id: &NotificationId) -> AppResult<()> {
        self.store.apply_local_status_change(id, NotificationStatus::Read);
        let result = self.api.mark_read(id).await;
        self.settle("mark_read", id, result)
    }

    /// Mark one notification unread.
    pub async fn mark_as_unread(&self, id: &NotificationId) -> AppResult<()> {
        self.store.apply_local_status_change(id, NotificationStatus::Unread);
        let result = self.api.mark_unread(id).await;
        self.settle("mark_unread", id, result)
    }

    /// Archive one notification.
    pub async fn archive_notification(&self, id: &NotificationId) -> AppResult<()> {
        self.store.apply_local_status_change(id, NotificationStatus::Archived);
        let result = self.api.archive(id).await;
        self.settle("archive", id, result)
    }

    /// Delete one notification.
    pub async fn delete_notification(&self, id: &NotificationId) -> AppResult<()> {
        self.store.apply_removal(id);
        let result = self.api.delete(id).await;
        self.settle("delete", id, result)
    }

    /// Mark every currently unread notification read.
    ///
    /// The id set is captured before anything changes and is exactly what
    /// the bulk call carries; notifications arriving while the call is in
    /// flight stay unread. Returns how many ids were sent.
    pub async fn mark_all_as_read(&self) -> AppResult<usize> {
        let ids = self.store.unread_ids();
        if ids.is_empty() {
            debug!("No unread notifications; mark-all-read skipped");
            return Ok(0);
        }

        for id in &ids {
            self.store.apply_local_status_change(id, NotificationStatus::Read);
        }

        match self.api.bulk(BulkOperation::MarkRead, &ids).await {
            Ok(()) => {
                debug!(count = ids.len(), "Marked all notifications read");
                Ok(ids.len())
            }
            Err(e) => {
                self.metrics.mutation_failed();
                warn!(
                    operation = BulkOperation::MarkRead.as_str(),
                    count = ids.len(),
                    transient = e.is_transient(),
                    error = %e,
                    "Bulk mutation failed; optimistic change kept"
                );
                Err(e)
            }
        }
    }

    fn settle(&self, action: &'static str, id: &NotificationId, result: AppResult<()>) -> AppResult<()> {
        match &result {
            Ok(()) => debug!(action, notification_id = %id, "Mutation confirmed"),
            Err(e) => {
                self.metrics.mutation_failed();
                warn!(
                    action,
                    notification_id = %id,
                    transient = e.is_transient(),
                    error = %e,
                    "Mutation failed; optimistic change kept"
                );
            }
        }
        result
    }
}
