//! Notification read status.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a notification from the recipient's side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    /// Not yet seen.
    #[default]
    Unread,
    /// Seen.
    Read,
    /// Moved out of the inbox.
    Archived,
}

impl NotificationStatus {
    /// Return the status as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unread => "unread",
            Self::Read => "read",
            Self::Archived => "archived",
        }
    }

    /// Change in the unread count implied by moving from `self` to `next`.
    ///
    /// unread→read and unread→archived are −1, read/archived→unread is +1,
    /// every other transition (including same→same) is 0.
    pub fn unread_delta(self, next: Self) -> i64 {
        i64::from(next == Self::Unread) - i64::from(self == Self::Unread)
    }
}

impl std::fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NotificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unread" => Ok(Self::Unread),
            "read" => Ok(Self::Read),
            "archived" => Ok(Self::Archived),
            other => Err(format!("unknown notification status '{other}'")),
        }
    }
}
