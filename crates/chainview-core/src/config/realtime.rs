//! Push channel configuration.

use serde::{Deserialize, Serialize};

/// Push channel (WebSocket) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// WebSocket endpoint; the user id is appended as a query parameter.
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// Automatic reconnect attempts before giving up.
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
    /// Base of the exponential backoff; attempt `n` waits `base^n` seconds.
    #[serde(default = "default_backoff_base")]
    pub backoff_base_seconds: u64,
    /// Capacity of the applied-event broadcast channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer_size: usize,
    /// Inbound frames larger than this are dropped.
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            backoff_base_seconds: default_backoff_base(),
            event_buffer_size: default_event_buffer(),
            max_message_bytes: default_max_message_bytes(),
        }
    }
}

fn default_ws_url() -> String {
    "ws://localhost:8000/ws/notifications".to_string()
}

fn default_max_reconnect_attempts() -> u32 {
    5
}

fn default_backoff_base() -> u64 {
    2
}

fn default_event_buffer() -> usize {
    256
}

fn default_max_message_bytes() -> usize {
    65_536
}
