//! Session/identity provider contract.

use tokio::sync::watch;

use chainview_entity::session::{AuthSession, AuthState};

/// Supplies the current session identity.
///
/// The engine asks on every request instead of caching, so a token refresh
/// in the host application is picked up immediately.
pub trait SessionProvider: Send + Sync + std::fmt::Debug + 'static {
    /// The current session, or `None` when logged out.
    fn current_session(&self) -> Option<AuthSession>;
}

/// Session provider backed by the host application's auth-state channel.
#[derive(Debug, Clone)]
pub struct WatchSessionProvider {
    rx: watch::Receiver<AuthState>,
}

impl WatchSessionProvider {
    /// Wrap an auth-state receiver.
    pub fn new(rx: watch::Receiver<AuthState>) -> Self {
        Self { rx }
    }
}

impl SessionProvider for WatchSessionProvider {
    fn current_session(&self) -> Option<AuthSession> {
        self.rx.borrow().session().cloned()
    }
}

/// A fixed session, for CLI use and tests.
impl SessionProvider for AuthSession {
    fn current_session(&self) -> Option<AuthSession> {
        Some(self.clone())
    }
}
