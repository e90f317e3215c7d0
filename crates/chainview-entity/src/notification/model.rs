//! Notification entity model.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chainview_core::types::id::{CompanyId, NotificationId, UserId};

use super::channel::{DeliveryChannel, DeliveryState};
use super::kind::NotificationKind;
use super::priority::NotificationPriority;
use super::status::NotificationStatus;

/// A notification delivered to a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// The recipient user.
    pub user_id: UserId,
    /// The recipient's company.
    pub company_id: CompanyId,
    /// What the notification is about.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub message: String,
    /// Channels the notification was sent over.
    #[serde(default)]
    pub channels: BTreeSet<DeliveryChannel>,
    /// Priority level.
    #[serde(default)]
    pub priority: NotificationPriority,
    /// Read status.
    #[serde(default)]
    pub status: NotificationStatus,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
    /// When the notification was read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
    /// When the notification was archived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
    /// Link the notification points at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
    /// Label for the action link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_label: Option<String>,
    /// Delivery progress per channel.
    #[serde(default)]
    pub delivery_status: BTreeMap<DeliveryChannel, DeliveryState>,
    /// Additional structured data (JSON).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Notification {
    /// Check if the notification has not been read.
    pub fn is_unread(&self) -> bool {
        self.status == NotificationStatus::Unread
    }

    /// Whether this notification counts toward the high-priority bucket.
    pub fn is_high_priority(&self) -> bool {
        self.priority == NotificationPriority::High
    }

    /// Whether this notification counts toward the urgent bucket.
    pub fn is_urgent(&self) -> bool {
        self.priority == NotificationPriority::Urgent
    }

    /// Move to `next`, keeping the timestamps consistent with the status.
    ///
    /// `read` always carries `read_at`, `unread` never does, and archiving
    /// keeps whatever `read_at` was there. Returns the previous status.
    pub fn set_status(&mut self, next: NotificationStatus, now: DateTime<Utc>) -> NotificationStatus {
        let previous = self.status;
        if previous == next {
            return previous;
        }

        match next {
            NotificationStatus::Unread => {
                self.read_at = None;
                self.archived_at = None;
            }
            NotificationStatus::Read => {
                self.read_at = self.read_at.or(Some(now));
                self.archived_at = None;
            }
            NotificationStatus::Archived => {
                self.archived_at = Some(now);
            }
        }
        self.status = next;
        previous
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A minimal unread notification for tests.
    pub fn notification(id: &str) -> Notification {
        Notification {
            id: NotificationId::new(id),
            user_id: UserId::new("user-1"),
            company_id: CompanyId::new("company-1"),
            kind: NotificationKind::OrderConfirmed,
            title: format!("Order {id} confirmed"),
            message: "Your order was confirmed".to_string(),
            channels: BTreeSet::from([DeliveryChannel::InApp]),
            priority: NotificationPriority::Medium,
            status: NotificationStatus::Unread,
            created_at: Utc::now(),
            read_at: None,
            archived_at: None,
            action_url: None,
            action_label: None,
            delivery_status: BTreeMap::new(),
            metadata: None,
        }
    }
}
