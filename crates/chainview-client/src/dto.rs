//! Wire envelopes for the REST backend.

use serde::{Deserialize, Serialize};

use chainview_core::types::id::NotificationId;

use crate::api::BulkOperation;

/// Standard response wrapper: `{ "success": bool, "data": T, "error": .. }`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data, absent on failure and for body-less operations.
    pub data: Option<T>,
    /// Failure details.
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

/// Error body returned by the backend.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    /// Machine-readable error code.
    #[serde(default)]
    pub code: Option<String>,
    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// Best-effort human-readable description.
    pub fn describe(&self) -> String {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => format!("{code}: {message}"),
            (None, Some(message)) => message.clone(),
            (Some(code), None) => code.clone(),
            (None, None) => "unspecified backend error".to_string(),
        }
    }
}

/// Body of the bulk mutation request.
#[derive(Debug, Clone, Serialize)]
pub struct BulkRequest<'a> {
    /// Operation to apply.
    pub operation: BulkOperation,
    /// Target ids.
    pub notification_ids: &'a [NotificationId],
}
