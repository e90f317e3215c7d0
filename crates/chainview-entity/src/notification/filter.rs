//! Filters for list queries.

use serde::{Deserialize, Serialize};

use super::kind::NotificationKind;
use super::status::NotificationStatus;

/// Optional status/kind filters for the bulk fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationFilter {
    /// Only notifications in this status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<NotificationStatus>,
    /// Only notifications of this kind.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<NotificationKind>,
}

impl NotificationFilter {
    /// No filtering.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to one status.
    pub fn with_status(mut self, status: NotificationStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restrict to one kind.
    pub fn with_kind(mut self, kind: NotificationKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Query-string pairs for the list endpoint.
    pub fn query_pairs(&self) -> Vec<(&'static str, &'static str)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str()));
        }
        if let Some(kind) = self.kind {
            pairs.push(("type", kind.as_str()));
        }
        pairs
    }
}
