//! Shared test doubles for the sync engine: an in-memory backend and a
//! scripted push transport.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Notify, mpsc};
use tokio::time::Instant;

use chainview_client::api::{BulkOperation, NotificationApi, NotificationPage};
use chainview_core::config::{RealtimeConfig, StoreConfig};
use chainview_core::error::AppError;
use chainview_core::result::AppResult;
use chainview_core::types::id::{CompanyId, NotificationId, UserId};
use chainview_core::types::pagination::{PageInfo, PageRequest};
use chainview_entity::notification::{
    DeliveryChannel, Notification, NotificationFilter, NotificationKind, NotificationPriority,
    NotificationStatus, NotificationSummary,
};
use chainview_entity::session::AuthSession;
use chainview_realtime::connection::{ConnectionManager, PushStream, PushTransport};
use chainview_realtime::metrics::EngineMetrics;
use chainview_realtime::store::NotificationStore;

pub const USER: &str = "user-1";

pub fn session() -> AuthSession {
    AuthSession::new(USER, "company-1", "test-token")
}

pub fn id(raw: &str) -> NotificationId {
    NotificationId::new(raw)
}

/// An unread, medium-priority notification.
pub fn notification(raw_id: &str) -> Notification {
    Notification {
        id: NotificationId::new(raw_id),
        user_id: UserId::new(USER),
        company_id: CompanyId::new("company-1"),
        kind: NotificationKind::TransparencyUpdated,
        title: format!("Update {raw_id}"),
        message: "Supplier transparency score changed".to_string(),
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

pub fn read(raw_id: &str) -> Notification {
    let mut n = notification(raw_id);
    n.set_status(NotificationStatus::Read, Utc::now());
    n
}

pub fn summary_of(list: &[Notification]) -> NotificationSummary {
    let mut summary = NotificationSummary::default();
    for n in list.iter().rev() {
        summary.record_insert(n, 5);
    }
    summary
}

pub fn page_of(list: Vec<Notification>) -> NotificationPage {
    let total = list.len() as u64;
    NotificationPage {
        summary: summary_of(&list),
        notifications: list,
        pagination: PageInfo {
            page: 1,
            limit: 20,
            total,
            pages: 1,
        },
    }
}

/// A store with an active session holding `list`.
pub fn seeded_store(list: Vec<Notification>) -> Arc<NotificationStore> {
    let store = Arc::new(NotificationStore::new(&StoreConfig::default()));
    store.begin_session(UserId::new(USER));
    let summary = summary_of(&list);
    store.replace_with_page(list, summary, true);
    store
}

pub fn new_notification_frame(n: &Notification) -> String {
    serde_json::json!({
        "type": "new_notification",
        "notification": n,
        "timestamp": Utc::now(),
    })
    .to_string()
}

// ── Backend ─────────────────────────────────────────────────────────

/// In-memory backend that records every call.
#[derive(Debug, Default)]
pub struct MockApi {
    pub calls: Mutex<Vec<String>>,
    pub bulk_requests: Mutex<Vec<(BulkOperation, Vec<NotificationId>)>>,
    pub page: Mutex<Option<NotificationPage>>,
    pub fail_mutations: AtomicBool,
    pub fail_list: AtomicBool,
    /// Set by `bulk` once it is in flight.
    pub bulk_entered: Notify,
    /// When present, `bulk` waits for a permit before returning.
    pub bulk_gate: Option<Notify>,
    /// Set by `list` once it is in flight.
    pub list_entered: Notify,
    /// When present, `list` waits for a permit before returning.
    pub list_gate: Option<Notify>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(list: Vec<Notification>) -> Self {
        let api = Self::default();
        *api.page.lock().unwrap() = Some(page_of(list));
        api
    }

    pub fn with_bulk_gate(mut self) -> Self {
        self.bulk_gate = Some(Notify::new());
        self
    }

    pub fn with_list_gate(mut self) -> Self {
        self.list_gate = Some(Notify::new());
        self
    }

    pub fn release_list(&self) {
        if let Some(gate) = &self.list_gate {
            gate.notify_one();
        }
    }

    pub fn release_bulk(&self) {
        if let Some(gate) = &self.bulk_gate {
            gate.notify_one();
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn mutation_result(&self) -> AppResult<()> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            Err(AppError::network("connection reset"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl NotificationApi for MockApi {
    async fn list(&self, _filter: &NotificationFilter, page: PageRequest) -> AppResult<NotificationPage> {
        self.record(format!("list:{}", page.page));
        self.list_entered.notify_one();
        if let Some(gate) = &self.list_gate {
            gate.notified().await;
        }
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(AppError::network("timed out"));
        }
        self.page
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AppError::not_found("no page configured"))
    }

    async fn summary(&self) -> AppResult<NotificationSummary> {
        self.record("summary".to_string());
        let page = self.page.lock().unwrap().clone();
        Ok(page.map(|p| p.summary).unwrap_or_default())
    }

    async fn mark_read(&self, id: &NotificationId) -> AppResult<()> {
        self.record(format!("read:{id}"));
        self.mutation_result()
    }

    async fn mark_unread(&self, id: &NotificationId) -> AppResult<()> {
        self.record(format!("unread:{id}"));
        self.mutation_result()
    }

    async fn archive(&self, id: &NotificationId) -> AppResult<()> {
        self.record(format!("archive:{id}"));
        self.mutation_result()
    }

    async fn delete(&self, id: &NotificationId) -> AppResult<()> {
        self.record(format!("delete:{id}"));
        self.mutation_result()
    }

    async fn bulk(&self, operation: BulkOperation, ids: &[NotificationId]) -> AppResult<()> {
        self.record(format!("bulk:{}", operation.as_str()));
        self.bulk_requests
            .lock()
            .unwrap()
            .push((operation, ids.to_vec()));
        self.bulk_entered.notify_one();
        if let Some(gate) = &self.bulk_gate {
            gate.notified().await;
        }
        self.mutation_result()
    }
}

// ── Push transport ──────────────────────────────────────────────────

/// Test side of one scripted push channel.
#[derive(Debug)]
pub struct ChannelHandle {
    tx: mpsc::UnboundedSender<AppResult<String>>,
    closed_by_client: Arc<AtomicBool>,
}

impl ChannelHandle {
    pub fn send_text(&self, raw: impl Into<String>) {
        let _ = self.tx.send(Ok(raw.into()));
    }

    pub fn fail(&self, message: &str) {
        let _ = self.tx.send(Err(AppError::network(message.to_string())));
    }

    /// Server-side close.
    pub fn close(self) {
        drop(self.tx);
    }

    pub fn closed_by_client(&self) -> bool {
        self.closed_by_client.load(Ordering::SeqCst)
    }
}

struct MockStream {
    rx: mpsc::UnboundedReceiver<AppResult<String>>,
    closed_by_client: Arc<AtomicBool>,
}

#[async_trait]
impl PushStream for MockStream {
    async fn next_message(&mut self) -> Option<AppResult<String>> {
        self.rx.recv().await
    }

    async fn close(&mut self) {
        self.closed_by_client.store(true, Ordering::SeqCst);
    }
}

/// Transport whose opens follow a script; an empty script refuses.
#[derive(Debug, Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Option<(mpsc::UnboundedReceiver<AppResult<String>>, Arc<AtomicBool>)>>>,
    opens: Mutex<Vec<Instant>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful open and return its handle.
    pub fn script_channel(&self) -> ChannelHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let closed_by_client = Arc::new(AtomicBool::new(false));
        self.script
            .lock()
            .unwrap()
            .push_back(Some((rx, closed_by_client.clone())));
        ChannelHandle { tx, closed_by_client }
    }

    /// Queue a refused open.
    pub fn script_refusal(&self) {
        self.script.lock().unwrap().push_back(None);
    }

    pub fn open_times(&self) -> Vec<Instant> {
        self.opens.lock().unwrap().clone()
    }

    pub fn open_count(&self) -> usize {
        self.opens.lock().unwrap().len()
    }
}

#[async_trait]
impl PushTransport for MockTransport {
    async fn open(&self, _session: &AuthSession) -> AppResult<Box<dyn PushStream>> {
        self.opens.lock().unwrap().push(Instant::now());
        let next = self.script.lock().unwrap().pop_front().flatten();
        match next {
            Some((rx, closed_by_client)) => Ok(Box::new(MockStream { rx, closed_by_client })),
            None => Err(AppError::network("connection refused")),
        }
    }
}

/// A connection manager wired to a fresh store and the given transport.
pub struct ConnectionHarness {
    pub manager: ConnectionManager,
    pub transport: Arc<MockTransport>,
    pub store: Arc<NotificationStore>,
    pub metrics: Arc<EngineMetrics>,
}

impl ConnectionHarness {
    pub fn new() -> Self {
        let transport = Arc::new(MockTransport::new());
        let store = seeded_store(Vec::new());
        let metrics = Arc::new(EngineMetrics::new());
        let manager = ConnectionManager::new(
            RealtimeConfig::default(),
            transport.clone(),
            store.clone(),
            Arc::new(session()),
            metrics.clone(),
        );
        Self {
            manager,
            transport,
            store,
            metrics,
        }
    }
}
