//! Notification backend contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use chainview_core::result::AppResult;
use chainview_core::types::id::NotificationId;
use chainview_core::types::pagination::{PageInfo, PageRequest};
use chainview_entity::notification::{Notification, NotificationFilter, NotificationSummary};

/// One page of the bulk fetch plus the server's summary at fetch time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPage {
    /// Notifications on this page, most recent first.
    pub notifications: Vec<Notification>,
    /// Authoritative aggregate snapshot.
    pub summary: NotificationSummary,
    /// Pagination metadata.
    pub pagination: PageInfo,
}

/// Operation names accepted by the bulk mutation endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkOperation {
    /// Mark every listed id read.
    MarkRead,
    /// Mark every listed id unread.
    MarkUnread,
    /// Archive every listed id.
    Archive,
    /// Delete every listed id.
    Delete,
}

impl BulkOperation {
    /// Return the operation as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MarkRead => "mark_read",
            Self::MarkUnread => "mark_unread",
            Self::Archive => "archive",
            Self::Delete => "delete",
        }
    }
}

/// REST operations the sync engine depends on.
///
/// Implementations must be cheap to share; the engine holds one behind an
/// `Arc` for the lifetime of a session.
#[async_trait]
pub trait NotificationApi: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch one page of notifications, optionally filtered.
    async fn list(&self, filter: &NotificationFilter, page: PageRequest) -> AppResult<NotificationPage>;

    /// Fetch the aggregate snapshot alone.
    async fn summary(&self) -> AppResult<NotificationSummary>;

    /// Mark one notification read.
    async fn mark_read(&self, id: &NotificationId) -> AppResult<()>;

    /// Mark one notification unread.
    async fn mark_unread(&self, id: &NotificationId) -> AppResult<()>;

    /// Archive one notification.
    async fn archive(&self, id: &NotificationId) -> AppResult<()>;

    /// Delete one notification.
    async fn delete(&self, id: &NotificationId) -> AppResult<()>;

    /// Apply `operation` to every id in `ids`.
    async fn bulk(&self, operation: BulkOperation, ids: &[NotificationId]) -> AppResult<()>;
}
