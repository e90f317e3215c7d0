//! Connection state machine.
//!
//! `disconnected -> connecting -> connected -> disconnected -> ...`
//!
//! Every channel failure, handshake errors included, goes through
//! [`ConnectionFsm::on_closed`], so there is no error state that can drift
//! from the connection state.

use std::time::Duration;

use serde::Serialize;

use super::backoff::ReconnectPolicy;

/// Where the push channel is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No channel open.
    #[default]
    Disconnected,
    /// Handshake in progress.
    Connecting,
    /// Channel open and receiving.
    Connected,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
        }
    }
}

/// Published connection status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    /// Current state.
    pub state: ConnectionState,
    /// Reconnect attempts since the last successful open.
    pub reconnect_attempts: u32,
    /// Why the channel last closed unexpectedly.
    pub last_error: Option<String>,
    /// Automatic retries are exhausted; only a manual connect resumes.
    pub exhausted: bool,
}

impl ConnectionStatus {
    /// Whether the channel is open.
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }
}

/// What to do after the channel closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// Closed on request; nothing scheduled.
    Stopped,
    /// Reconnect after `delay`.
    Retry {
        /// 1-based attempt number.
        attempt: u32,
        /// Wait before the attempt.
        delay: Duration,
    },
    /// Ceiling reached; nothing scheduled.
    GaveUp {
        /// Attempts made.
        attempts: u32,
    },
}

/// Transition logic, free of I/O and timers.
#[derive(Debug, Clone)]
pub struct ConnectionFsm {
    status: ConnectionStatus,
    policy: ReconnectPolicy,
}

impl ConnectionFsm {
    /// Starts disconnected with no attempts made.
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            status: ConnectionStatus::default(),
            policy,
        }
    }

    /// Current status.
    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    /// Manual `connect()`: a fresh start with the attempt counter reset.
    pub fn begin_connect(&mut self) {
        self.status = ConnectionStatus {
            state: ConnectionState::Connecting,
            ..ConnectionStatus::default()
        };
    }

    /// A scheduled reconnect timer fired.
    pub fn begin_retry(&mut self) {
        self.status.state = ConnectionState::Connecting;
    }

    /// Handshake succeeded.
    pub fn on_open(&mut self) {
        self.status = ConnectionStatus {
            state: ConnectionState::Connected,
            ..ConnectionStatus::default()
        };
    }

    /// The channel closed or failed to open.
    ///
    /// Unless `explicit`, schedules the next attempt while the ceiling
    /// allows it.
    pub fn on_closed(&mut self, explicit: bool, reason: Option<String>) -> CloseOutcome {
        self.status.state = ConnectionState::Disconnected;
        if explicit {
            return CloseOutcome::Stopped;
        }

        self.status.last_error = reason;
        let attempt = self.status.reconnect_attempts + 1;
        match self.policy.delay_for(attempt) {
            Some(delay) => {
                self.status.reconnect_attempts = attempt;
                CloseOutcome::Retry { attempt, delay }
            }
            None => {
                self.status.exhausted = true;
                CloseOutcome::GaveUp {
                    attempts: self.status.reconnect_attempts,
                }
            }
        }
    }
}
