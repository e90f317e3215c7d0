//! The reconciliation store and its merge operations.
//!
//! Fetch results, optimistic mutations, and push events all write through
//! the operations below. Each one takes the lock once, applies its whole
//! effect, and releases it, so no caller ever observes a half-merged state.

use std::collections::HashSet;
use std::sync::RwLock;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, trace};

use chainview_core::config::StoreConfig;
use chainview_core::types::id::{NotificationId, SessionId, UserId};
use chainview_entity::notification::{Notification, NotificationStatus, NotificationSummary};

use crate::message::types::PushEvent;

use super::snapshot::{SessionTicket, StoreSnapshot};

/// What an inbound event did to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InboundOutcome {
    /// Records added.
    pub inserted: usize,
    /// Held records changed in place.
    pub updated: usize,
    /// Records removed.
    pub removed: usize,
    /// Whether the event's summary replaced the local one.
    pub summary_replaced: bool,
}

/// Session-scoped cache of notifications and their summary.
#[derive(Debug)]
pub struct NotificationStore {
    /// Guarded state; never held across an await.
    state: RwLock<StoreState>,
    /// Publishes the revision after every change.
    changes: watch::Sender<u64>,
    /// Size of the summary's recent list.
    recent_limit: usize,
}

#[derive(Debug, Default)]
struct StoreState {
    session: Option<SessionTicket>,
    notifications: Vec<Notification>,
    summary: NotificationSummary,
    loading: bool,
    error: Option<String>,
    revision: u64,
    dirty: bool,
}

impl StoreState {
    fn position(&self, id: &NotificationId) -> Option<usize> {
        self.notifications.iter().position(|n| &n.id == id)
    }

    fn replace_page(
        &mut self,
        notifications: Vec<Notification>,
        summary: NotificationSummary,
        is_first_page: bool,
    ) {
        let mut seen: HashSet<NotificationId> = if is_first_page {
            self.notifications.clear();
            HashSet::new()
        } else {
            self.notifications.iter().map(|n| n.id.clone()).collect()
        };

        let offered = notifications.len();
        let before = self.notifications.len();
        self.notifications
            .extend(notifications.into_iter().filter(|n| seen.insert(n.id.clone())));
        let skipped = offered - (self.notifications.len() - before);
        if skipped > 0 {
            trace!(skipped, "Skipped page entries already held");
        }

        self.summary = summary;
        self.dirty = true;
    }

    fn set_status(&mut self, id: &NotificationId, next: NotificationStatus) -> Option<NotificationStatus> {
        let idx = self.position(id)?;
        let previous = self.notifications[idx].set_status(next, Utc::now());
        if previous != next {
            self.summary.record_status_change(previous, next);
            self.summary.refresh_recent(&self.notifications[idx]);
            self.dirty = true;
        }
        Some(previous)
    }

    fn remove(&mut self, id: &NotificationId) -> Option<Notification> {
        let idx = self.position(id)?;
        let removed = self.notifications.remove(idx);
        self.summary.record_removal(&removed);
        self.dirty = true;
        Some(removed)
    }

    fn reset(&mut self, session: Option<SessionTicket>) {
        let revision = self.revision;
        *self = Self {
            session,
            revision,
            dirty: true,
            ..Self::default()
        };
    }
}

impl NotificationStore {
    /// Creates an empty store with no session.
    pub fn new(config: &StoreConfig) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            state: RwLock::new(StoreState::default()),
            changes,
            recent_limit: config.recent_limit,
        }
    }

    fn write<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> R {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        let out = f(&mut state);
        if state.dirty {
            state.dirty = false;
            state.revision += 1;
            self.changes.send_replace(state.revision);
        }
        out
    }

    fn read<R>(&self, f: impl FnOnce(&StoreState) -> R) -> R {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        f(&state)
    }

    // ── Session lifecycle ────────────────────────────────────────────

    /// Start a fresh session for `user_id`, dropping everything held.
    pub fn begin_session(&self, user_id: UserId) -> SessionTicket {
        let ticket = SessionTicket {
            session_id: SessionId::new(),
            user_id,
        };
        self.write(|state| state.reset(Some(ticket.clone())));
        debug!(session_id = %ticket.session_id, user_id = %ticket.user_id, "Notification store session started");
        ticket
    }

    /// Drop everything held and forget the session (logout).
    pub fn clear(&self) {
        self.write(|state| state.reset(None));
        debug!("Notification store cleared");
    }

    /// The current session, if any.
    pub fn ticket(&self) -> Option<SessionTicket> {
        self.read(|state| state.session.clone())
    }

    /// Whether `ticket` still names the current session.
    pub fn is_current(&self, ticket: &SessionTicket) -> bool {
        self.read(|state| state.session.as_ref() == Some(ticket))
    }

    // ── Merge operations ─────────────────────────────────────────────

    /// Write a fetched page.
    ///
    /// The first page replaces the held list; later pages append in server
    /// order, skipping ids already held (e.g. delivered by push meanwhile).
    /// The summary is always replaced wholesale.
    pub fn replace_with_page(
        &self,
        notifications: Vec<Notification>,
        summary: NotificationSummary,
        is_first_page: bool,
    ) {
        self.write(|state| state.replace_page(notifications, summary, is_first_page));
    }

    /// [`replace_with_page`](Self::replace_with_page) if `ticket` is still
    /// current; also settles the loading and error flags.
    ///
    /// Returns `false` (and changes nothing) for a stale ticket.
    pub fn apply_page_for(
        &self,
        ticket: &SessionTicket,
        notifications: Vec<Notification>,
        summary: NotificationSummary,
        is_first_page: bool,
    ) -> bool {
        self.write(|state| {
            if state.session.as_ref() != Some(ticket) {
                return false;
            }
            state.replace_page(notifications, summary, is_first_page);
            state.loading = false;
            state.error = None;
            true
        })
    }

    /// Replace the summary with an authoritative snapshot.
    pub fn replace_summary(&self, summary: NotificationSummary) {
        self.write(|state| {
            state.summary = summary;
            state.dirty = true;
        });
    }

    /// [`replace_summary`](Self::replace_summary) if `ticket` is still current.
    pub fn replace_summary_for(&self, ticket: &SessionTicket, summary: NotificationSummary) -> bool {
        self.write(|state| {
            if state.session.as_ref() != Some(ticket) {
                return false;
            }
            state.summary = summary;
            state.dirty = true;
            true
        })
    }

    /// Optimistically move one notification to `status`.
    ///
    /// Unknown ids are a no-op. The unread count moves by exactly the delta
    /// the transition implies. Returns the previous status.
    pub fn apply_local_status_change(
        &self,
        id: &NotificationId,
        status: NotificationStatus,
    ) -> Option<NotificationStatus> {
        let previous = self.write(|state| state.set_status(id, status));
        trace!(notification_id = %id, ?previous, next = ?status, "Local status change");
        previous
    }

    /// Remove one notification, adjusting the counts it contributed to.
    pub fn apply_removal(&self, id: &NotificationId) -> Option<Notification> {
        let removed = self.write(|state| state.remove(id));
        trace!(notification_id = %id, found = removed.is_some(), "Local removal");
        removed
    }

    /// Merge one push event.
    ///
    /// Record-level effects are applied first; a summary carried by the
    /// event then replaces the local estimate outright.
    pub fn apply_inbound_event(&self, event: &PushEvent) -> InboundOutcome {
        let recent_limit = self.recent_limit;
        self.write(|state| {
            let mut outcome = InboundOutcome::default();

            match event {
                PushEvent::NewNotification { notification, .. } => {
                    match state.position(&notification.id) {
                        Some(idx) => {
                            let old = std::mem::replace(&mut state.notifications[idx], notification.clone());
                            state.summary.record_replacement(&old, notification);
                            outcome.updated += 1;
                        }
                        None => {
                            state.notifications.insert(0, notification.clone());
                            state.summary.record_insert(notification, recent_limit);
                            outcome.inserted += 1;
                        }
                    }
                    state.dirty = true;
                }
                PushEvent::NotificationRead { notification_ids, .. } => {
                    for id in notification_ids {
                        // An archived record stays archived; it keeps its read_at.
                        let archived = state
                            .position(id)
                            .is_some_and(|idx| state.notifications[idx].status == NotificationStatus::Archived);
                        if archived {
                            continue;
                        }
                        if let Some(previous) = state.set_status(id, NotificationStatus::Read) {
                            if previous != NotificationStatus::Read {
                                outcome.updated += 1;
                            }
                        }
                    }
                }
                PushEvent::NotificationDeleted { notification_ids, .. } => {
                    for id in notification_ids {
                        if state.remove(id).is_some() {
                            outcome.removed += 1;
                        }
                    }
                }
                PushEvent::SummaryUpdated { .. } => {}
            }

            if let Some(summary) = event.summary() {
                state.summary = summary.clone();
                state.dirty = true;
                outcome.summary_replaced = true;
            }

            outcome
        })
    }

    // ── Flags ────────────────────────────────────────────────────────

    /// Mark a list fetch as started or finished.
    pub fn set_loading(&self, loading: bool) {
        self.write(|state| {
            if state.loading != loading {
                state.loading = loading;
                state.dirty = true;
            }
        });
    }

    /// Set or clear the error flag.
    pub fn set_error(&self, error: Option<String>) {
        self.write(|state| {
            if state.error != error {
                state.error = error;
                state.dirty = true;
            }
        });
    }

    /// Record a failed fetch for the current session; clears `loading`.
    pub fn fail_load_for(&self, ticket: &SessionTicket, message: impl Into<String>) -> bool {
        let message = message.into();
        self.write(|state| {
            if state.session.as_ref() != Some(ticket) {
                return false;
            }
            state.loading = false;
            state.error = Some(message);
            state.dirty = true;
            true
        })
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Unread count from the summary.
    pub fn unread_count(&self) -> u64 {
        self.read(|state| state.summary.unread_count)
    }

    /// High-priority count from the summary.
    pub fn high_priority_count(&self) -> u64 {
        self.read(|state| state.summary.high_priority_count)
    }

    /// Urgent count from the summary.
    pub fn urgent_count(&self) -> u64 {
        self.read(|state| state.summary.urgent_count)
    }

    /// Copy of the summary.
    pub fn summary(&self) -> NotificationSummary {
        self.read(|state| state.summary.clone())
    }

    /// Copy of the held notifications, most recent first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.read(|state| state.notifications.clone())
    }

    /// One held notification.
    pub fn get(&self, id: &NotificationId) -> Option<Notification> {
        self.read(|state| state.position(id).map(|idx| state.notifications[idx].clone()))
    }

    /// Ids of held notifications that are currently unread, in list order.
    pub fn unread_ids(&self) -> Vec<NotificationId> {
        self.read(|state| {
            state
                .notifications
                .iter()
                .filter(|n| n.is_unread())
                .map(|n| n.id.clone())
                .collect()
        })
    }

    /// Number of held notifications.
    pub fn len(&self) -> usize {
        self.read(|state| state.notifications.len())
    }

    /// Whether no notifications are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a list fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.read(|state| state.loading)
    }

    /// Last fetch error.
    pub fn error(&self) -> Option<String> {
        self.read(|state| state.error.clone())
    }

    /// Current revision; bumps on every change.
    pub fn revision(&self) -> u64 {
        self.read(|state| state.revision)
    }

    /// Consistent copy of everything the presentation layer reads.
    pub fn snapshot(&self) -> StoreSnapshot {
        self.read(|state| StoreSnapshot {
            notifications: state.notifications.clone(),
            summary: state.summary.clone(),
            loading: state.loading,
            error: state.error.clone(),
            revision: state.revision,
        })
    }

    /// Receiver that observes the revision after every change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }
}
