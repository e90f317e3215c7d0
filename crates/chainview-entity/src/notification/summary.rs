//! Aggregate notification counts.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chainview_core::types::id::NotificationId;

use super::kind::NotificationKind;
use super::model::Notification;
use super::status::NotificationStatus;

/// Count-based snapshot of the current user's notifications.
///
/// The server computes this authoritatively; between authoritative
/// snapshots the store keeps it approximately right with the `record_*`
/// methods below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationSummary {
    /// Total notifications.
    #[serde(default)]
    pub total_count: u64,
    /// Notifications with status `unread`.
    #[serde(default)]
    pub unread_count: u64,
    /// Notifications with priority `high`.
    #[serde(default)]
    pub high_priority_count: u64,
    /// Notifications with priority `urgent`.
    #[serde(default)]
    pub urgent_count: u64,
    /// Notification count per kind.
    #[serde(default, rename = "by_type")]
    pub by_kind: BTreeMap<NotificationKind, u64>,
    /// Most recent notifications, newest first.
    #[serde(default, rename = "recent_notifications")]
    pub recent: Vec<Notification>,
    /// When the snapshot was computed or last adjusted.
    pub last_updated: DateTime<Utc>,
}

impl Default for NotificationSummary {
    fn default() -> Self {
        Self {
            total_count: 0,
            unread_count: 0,
            high_priority_count: 0,
            urgent_count: 0,
            by_kind: BTreeMap::new(),
            recent: Vec::new(),
            last_updated: Utc::now(),
        }
    }
}

impl NotificationSummary {
    /// Account for a notification the store just gained.
    pub fn record_insert(&mut self, notification: &Notification, recent_limit: usize) {
        self.total_count += 1;
        if notification.is_unread() {
            self.unread_count += 1;
        }
        if notification.is_high_priority() {
            self.high_priority_count += 1;
        }
        if notification.is_urgent() {
            self.urgent_count += 1;
        }
        *self.by_kind.entry(notification.kind).or_insert(0) += 1;

        self.recent.retain(|n| n.id != notification.id);
        self.recent.insert(0, notification.clone());
        self.recent.truncate(recent_limit);
        self.last_updated = Utc::now();
    }

    /// Account for a notification the store just dropped.
    pub fn record_removal(&mut self, notification: &Notification) {
        self.total_count = self.total_count.saturating_sub(1);
        if notification.is_unread() {
            self.unread_count = self.unread_count.saturating_sub(1);
        }
        if notification.is_high_priority() {
            self.high_priority_count = self.high_priority_count.saturating_sub(1);
        }
        if notification.is_urgent() {
            self.urgent_count = self.urgent_count.saturating_sub(1);
        }
        if let Some(count) = self.by_kind.get_mut(&notification.kind) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.by_kind.remove(&notification.kind);
            }
        }
        self.recent.retain(|n| n.id != notification.id);
        self.last_updated = Utc::now();
    }

    /// Account for a status transition of a held notification.
    pub fn record_status_change(&mut self, from: NotificationStatus, to: NotificationStatus) {
        self.adjust_unread(from.unread_delta(to));
    }

    /// Account for a held record being overwritten by a newer copy of itself.
    ///
    /// The total is unchanged; the buckets follow whatever changed.
    pub fn record_replacement(&mut self, old: &Notification, new: &Notification) {
        self.record_status_change(old.status, new.status);
        if old.is_high_priority() != new.is_high_priority() {
            if new.is_high_priority() {
                self.high_priority_count += 1;
            } else {
                self.high_priority_count = self.high_priority_count.saturating_sub(1);
            }
        }
        if old.is_urgent() != new.is_urgent() {
            if new.is_urgent() {
                self.urgent_count += 1;
            } else {
                self.urgent_count = self.urgent_count.saturating_sub(1);
            }
        }
        if old.kind != new.kind {
            if let Some(count) = self.by_kind.get_mut(&old.kind) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    self.by_kind.remove(&old.kind);
                }
            }
            *self.by_kind.entry(new.kind).or_insert(0) += 1;
        }
        self.refresh_recent(new);
        self.last_updated = Utc::now();
    }

    /// Apply a signed delta to the unread count, clamping at zero.
    pub fn adjust_unread(&mut self, delta: i64) {
        if delta == 0 {
            return;
        }
        self.unread_count = if delta < 0 {
            self.unread_count.saturating_sub(delta.unsigned_abs())
        } else {
            self.unread_count.saturating_add(delta.unsigned_abs())
        };
        self.last_updated = Utc::now();
    }

    /// Replace the copy in `recent` after the record changed elsewhere.
    pub fn refresh_recent(&mut self, notification: &Notification) {
        if let Some(slot) = self.recent.iter_mut().find(|n| n.id == notification.id) {
            *slot = notification.clone();
        }
    }

    /// Whether `id` is among the recent notifications.
    pub fn mentions(&self, id: &NotificationId) -> bool {
        self.recent.iter().any(|n| &n.id == id)
    }
}
