//! Inbound push event definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chainview_core::types::id::NotificationId;
use chainview_entity::notification::{Notification, NotificationSummary};

/// Events delivered by the server over the push channel.
///
/// Every variant may carry a freshly computed summary; when present it is
/// authoritative and replaces the store's running estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushEvent {
    /// A notification was created for the user.
    NewNotification {
        /// The full record.
        notification: Notification,
        /// Summary after the insert.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        summary: Option<NotificationSummary>,
        /// Server delivery time.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<DateTime<Utc>>,
    },
    /// Notifications were marked read (possibly from another device).
    NotificationRead {
        /// Affected ids.
        notification_ids: Vec<NotificationId>,
        /// Summary after the change.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        summary: Option<NotificationSummary>,
        /// Server delivery time.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<DateTime<Utc>>,
    },
    /// Notifications were deleted.
    NotificationDeleted {
        /// Affected ids.
        notification_ids: Vec<NotificationId>,
        /// Summary after the change.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        summary: Option<NotificationSummary>,
        /// Server delivery time.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<DateTime<Utc>>,
    },
    /// The aggregate changed without a record-level event.
    SummaryUpdated {
        /// The new summary.
        summary: NotificationSummary,
        /// Server delivery time.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<DateTime<Utc>>,
    },
}

impl PushEvent {
    /// Wire name of the event type, for logging.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::NewNotification { .. } => "new_notification",
            Self::NotificationRead { .. } => "notification_read",
            Self::NotificationDeleted { .. } => "notification_deleted",
            Self::SummaryUpdated { .. } => "summary_updated",
        }
    }

    /// The authoritative summary carried by this event, if any.
    pub fn summary(&self) -> Option<&NotificationSummary> {
        match self {
            Self::NewNotification { summary, .. }
            | Self::NotificationRead { summary, .. }
            | Self::NotificationDeleted { summary, .. } => summary.as_ref(),
            Self::SummaryUpdated { summary, .. } => Some(summary),
        }
    }

    /// Server delivery time, if sent.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::NewNotification { timestamp, .. }
            | Self::NotificationRead { timestamp, .. }
            | Self::NotificationDeleted { timestamp, .. }
            | Self::SummaryUpdated { timestamp, .. } => *timestamp,
        }
    }
}
