//! Session identity supplied by the host application.

use serde::{Deserialize, Serialize};

use chainview_core::types::id::{CompanyId, UserId};

/// The identity of a logged-in user, as far as the notification engine
/// needs it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    /// The authenticated user; addresses the push channel.
    pub user_id: UserId,
    /// The user's company.
    pub company_id: CompanyId,
    /// Bearer token for REST calls and the push handshake.
    pub access_token: String,
}

impl AuthSession {
    /// Create a new session identity.
    pub fn new(
        user_id: impl Into<UserId>,
        company_id: impl Into<CompanyId>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            company_id: company_id.into(),
            access_token: access_token.into(),
        }
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("user_id", &self.user_id)
            .field("company_id", &self.company_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Authentication state published by the host application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    /// No user is logged in.
    #[default]
    LoggedOut,
    /// A user is logged in.
    LoggedIn(AuthSession),
}

impl AuthState {
    /// The session, if logged in.
    pub fn session(&self) -> Option<&AuthSession> {
        match self {
            Self::LoggedIn(session) => Some(session),
            Self::LoggedOut => None,
        }
    }
}
