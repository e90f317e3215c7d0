//! Transport seam for the push channel.

use async_trait::async_trait;

use chainview_core::result::AppResult;
use chainview_entity::session::AuthSession;

/// Opens push channels addressed to a user.
#[async_trait]
pub trait PushTransport: Send + Sync + std::fmt::Debug + 'static {
    /// Perform the handshake for `session`'s user.
    async fn open(&self, session: &AuthSession) -> AppResult<Box<dyn PushStream>>;
}

/// One open push channel.
#[async_trait]
pub trait PushStream: Send + 'static {
    /// Next text payload.
    ///
    /// `None` means the peer closed the channel; `Some(Err(_))` is a
    /// transport failure. Either ends the channel.
    async fn next_message(&mut self) -> Option<AppResult<String>>;

    /// Close the channel from this side. Best effort.
    async fn close(&mut self);
}
