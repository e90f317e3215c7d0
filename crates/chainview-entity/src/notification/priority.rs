//! Notification priority levels.

use serde::{Deserialize, Deserializer, Serialize};

/// How prominently a notification should be surfaced.
///
/// Decoding is lenient: a priority this client does not know is read as
/// [`NotificationPriority::Medium`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPriority {
    /// Background events
    Low,
    /// Everyday events
    #[default]
    Medium,
    /// Counted in the summary's high-priority bucket
    High,
    /// Counted in the summary's urgent bucket
    Urgent,
}

impl NotificationPriority {
    /// Parse a wire value, falling back to `Medium`.
    pub fn from_str_value(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            "urgent" => Self::Urgent,
            _ => Self::Medium,
        }
    }

    /// Return the priority as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl std::fmt::Display for NotificationPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NotificationPriority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_str_value(&raw))
    }
}
