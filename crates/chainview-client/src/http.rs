//! reqwest-backed implementation of [`NotificationApi`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use chainview_core::config::ApiConfig;
use chainview_core::error::{AppError, ErrorKind};
use chainview_core::result::AppResult;
use chainview_core::types::id::NotificationId;
use chainview_core::types::pagination::PageRequest;
use chainview_entity::notification::{NotificationFilter, NotificationSummary};

use crate::api::{BulkOperation, NotificationApi, NotificationPage};
use crate::dto::{ApiResponse, BulkRequest};
use crate::session::SessionProvider;

/// HTTP client for the notification REST endpoints.
#[derive(Debug, Clone)]
pub struct HttpNotificationApi {
    /// Shared connection pool.
    client: Client,
    /// Base URL, always ending in `/`.
    base_url: Url,
    /// Identity source for the bearer token.
    session: Arc<dyn SessionProvider>,
}

impl HttpNotificationApi {
    /// Creates a new client from configuration.
    pub fn new(config: &ApiConfig, session: Arc<dyn SessionProvider>) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            client,
            base_url: normalize_base(&config.base_url)?,
            session,
        })
    }

    /// Resolve a path relative to the base URL.
    fn url(&self, path: &str) -> AppResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::configuration(format!("Invalid endpoint path '{path}': {e}")))
    }

    /// Start an authenticated request.
    fn request(&self, method: Method, url: Url) -> AppResult<RequestBuilder> {
        let session = self
            .session
            .current_session()
            .ok_or_else(|| AppError::authentication("No active session"))?;
        Ok(self
            .client
            .request(method, url)
            .bearer_auth(session.access_token))
    }

    /// Send a request and unwrap the `{success, data}` envelope.
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> AppResult<Option<T>> {
        let response = builder
            .send()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Network, format!("Request failed: {e}"), e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Network, "Failed to read response body", e))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ApiResponse<serde_json::Value>>(&body)
                .ok()
                .and_then(|r| r.error)
                .map(|e| e.describe())
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
            warn!(status = status.as_u16(), detail = %detail, "Backend rejected request");
            return Err(AppError::from_status(status.as_u16(), detail));
        }

        if body.trim().is_empty() {
            return Ok(None);
        }

        let envelope: ApiResponse<T> = serde_json::from_str(&body)?;
        if !envelope.success {
            let detail = envelope.error.unwrap_or_default().describe();
            return Err(AppError::external_service(detail));
        }
        Ok(envelope.data)
    }

    /// Send a request whose response carries no payload.
    async fn send_empty(&self, builder: RequestBuilder) -> AppResult<()> {
        self.send::<serde_json::Value>(builder).await.map(|_| ())
    }

    /// Issue a per-id PATCH such as `notifications/{id}/read`.
    async fn patch_action(&self, id: &NotificationId, action: &str) -> AppResult<()> {
        let url = self.url(&format!("notifications/{}/{action}", encode_component(id.as_str())))?;
        debug!(notification_id = %id, action, "Sending notification mutation");
        self.send_empty(self.request(Method::PATCH, url)?).await
    }
}

#[async_trait]
impl NotificationApi for HttpNotificationApi {
    async fn list(&self, filter: &NotificationFilter, page: PageRequest) -> AppResult<NotificationPage> {
        let mut url = self.url("notifications")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("page", &page.page.to_string());
            query.append_pair("limit", &page.limit.to_string());
            for (key, value) in filter.query_pairs() {
                query.append_pair(key, value);
            }
        }

        self.send::<NotificationPage>(self.request(Method::GET, url)?)
            .await?
            .ok_or_else(|| AppError::external_service("Notification list response had no data"))
    }

    async fn summary(&self) -> AppResult<NotificationSummary> {
        let url = self.url("notifications/summary")?;
        self.send::<NotificationSummary>(self.request(Method::GET, url)?)
            .await?
            .ok_or_else(|| AppError::external_service("Summary response had no data"))
    }

    async fn mark_read(&self, id: &NotificationId) -> AppResult<()> {
        self.patch_action(id, "read").await
    }

    async fn mark_unread(&self, id: &NotificationId) -> AppResult<()> {
        self.patch_action(id, "unread").await
    }

    async fn archive(&self, id: &NotificationId) -> AppResult<()> {
        self.patch_action(id, "archive").await
    }

    async fn delete(&self, id: &NotificationId) -> AppResult<()> {
        let url = self.url(&format!("notifications/{}", encode_component(id.as_str())))?;
        self.send_empty(self.request(Method::DELETE, url)?).await
    }

    async fn bulk(&self, operation: BulkOperation, ids: &[NotificationId]) -> AppResult<()> {
        let url = self.url("notifications/bulk")?;
        let body = BulkRequest {
            operation,
            notification_ids: ids,
        };
        debug!(operation = operation.as_str(), count = ids.len(), "Sending bulk mutation");
        self.send_empty(self.request(Method::POST, url)?.json(&body)).await
    }
}

/// Parse the base URL and make sure relative joins keep its last segment.
fn normalize_base(raw: &str) -> AppResult<Url> {
    let mut raw = raw.trim().to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }
    Url::parse(&raw).map_err(|e| AppError::configuration(format!("Invalid api.base_url '{raw}': {e}")))
}

/// Unreserved characters (RFC 3986) stay literal; everything else is escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode an opaque value for use in a path segment or query string.
pub fn encode_component(segment: &str) -> String {
    utf8_percent_encode(segment, COMPONENT).to_string()
}
