//! Read-only views handed to the presentation layer.

use serde::Serialize;

use chainview_core::types::id::{SessionId, UserId};
use chainview_entity::notification::{Notification, NotificationSummary};

/// Identifies the session a piece of asynchronous work was started in.
///
/// Captured before an await and checked after it, so a response that
/// outlives a logout (or a login as someone else) is discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTicket {
    /// Client-side session identifier.
    pub session_id: SessionId,
    /// The user the session belongs to.
    pub user_id: UserId,
}

/// A consistent copy of the store at one revision.
#[derive(Debug, Clone, Serialize)]
pub struct StoreSnapshot {
    /// Held notifications, most recent first.
    pub notifications: Vec<Notification>,
    /// Current summary.
    pub summary: NotificationSummary,
    /// Whether a list fetch is in flight.
    pub loading: bool,
    /// Last fetch error, cleared by the next successful fetch.
    pub error: Option<String>,
    /// Monotonic change counter.
    pub revision: u64,
}
