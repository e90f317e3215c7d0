//! WebSocket push transport.

use async_trait::async_trait;
use futures::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::{AUTHORIZATION, HeaderValue};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, warn};

use chainview_client::http::encode_component;
use chainview_core::config::RealtimeConfig;
use chainview_core::error::{AppError, ErrorKind};
use chainview_core::result::AppResult;
use chainview_core::types::id::UserId;
use chainview_entity::session::AuthSession;

use super::transport::{PushStream, PushTransport};

/// Opens `ws_url?user_id=<id>` with the session's bearer token.
#[derive(Debug, Clone)]
pub struct WebSocketTransport {
    ws_url: String,
}

impl WebSocketTransport {
    /// Creates a transport for the configured endpoint.
    pub fn new(config: &RealtimeConfig) -> Self {
        Self {
            ws_url: config.ws_url.clone(),
        }
    }

    /// Endpoint addressed to `user_id`.
    pub fn endpoint_for(&self, user_id: &UserId) -> String {
        let separator = if self.ws_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}user_id={}",
            self.ws_url,
            separator,
            encode_component(user_id.as_str())
        )
    }
}

#[async_trait]
impl PushTransport for WebSocketTransport {
    async fn open(&self, session: &AuthSession) -> AppResult<Box<dyn PushStream>> {
        let endpoint = self.endpoint_for(&session.user_id);
        let mut request = endpoint.as_str().into_client_request().map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Invalid push endpoint {endpoint}"),
                e,
            )
        })?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", session.access_token)).map_err(|e| {
            AppError::with_source(
                ErrorKind::Authentication,
                "Access token is not a valid header value",
                e,
            )
        })?;
        request.headers_mut().insert(AUTHORIZATION, bearer);

        let (socket, response) = connect_async(request).await.map_err(|e| {
            AppError::with_source(ErrorKind::Network, format!("Push handshake failed: {e}"), e)
        })?;
        debug!(status = %response.status(), user_id = %session.user_id, "Push handshake complete");

        Ok(Box::new(WebSocketChannel { socket }))
    }
}

struct WebSocketChannel {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl PushStream for WebSocketChannel {
    async fn next_message(&mut self) -> Option<AppResult<String>> {
        loop {
            match self.socket.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.to_string())),
                Ok(Message::Binary(bytes)) => match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => return Some(Ok(text)),
                    Err(_) => {
                        warn!(len = bytes.len(), "Ignoring non-UTF-8 binary push frame");
                    }
                },
                Ok(Message::Close(frame)) => {
                    debug!(?frame, "Server closed push channel");
                    return None;
                }
                // Control frames; tungstenite answers pings itself.
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => {}
                Err(e) => {
                    return Some(Err(AppError::with_source(
                        ErrorKind::Network,
                        format!("Push channel error: {e}"),
                        e,
                    )));
                }
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.socket.close(None).await {
            debug!(error = %e, "Push channel close was not clean");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_appends_encoded_user_id() {
        let transport = WebSocketTransport::new(&RealtimeConfig {
            ws_url: "wss://push.example.test/ws/notifications".into(),
            ..RealtimeConfig::default()
        });
        assert_eq!(
            transport.endpoint_for(&UserId::new("user 7")),
            "wss://push.example.test/ws/notifications?user_id=user%207"
        );
    }

    #[test]
    fn test_endpoint_keeps_existing_query() {
        let transport = WebSocketTransport::new(&RealtimeConfig {
            ws_url: "ws://localhost:8000/ws?v=2".into(),
            ..RealtimeConfig::default()
        });
        assert_eq!(
            transport.endpoint_for(&UserId::new("u1")),
            "ws://localhost:8000/ws?v=2&user_id=u1"
        );
    }
}
