//! Delivery channels and per-channel delivery state.

use serde::{Deserialize, Serialize};

/// A channel a notification was sent over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryChannel {
    /// Shown inside the web application.
    InApp,
    /// Sent by email.
    Email,
    /// Sent by text message.
    Sms,
    /// Sent as a device push notification.
    Push,
}

/// Delivery progress on one channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryState {
    /// Queued, not yet handed off.
    #[default]
    Pending,
    /// Handed off to the channel provider.
    Sent,
    /// Confirmed delivered.
    Delivered,
    /// Delivery failed.
    Failed,
}
