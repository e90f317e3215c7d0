//! Push channel lifecycle: state machine, reconnect policy, transport seam,
//! and the manager that drives them.

pub mod backoff;
pub mod manager;
pub mod state;
pub mod transport;
pub mod websocket;

pub use backoff::ReconnectPolicy;
pub use manager::ConnectionManager;
pub use state::{CloseOutcome, ConnectionFsm, ConnectionState, ConnectionStatus};
pub use transport::{PushStream, PushTransport};
pub use websocket::WebSocketTransport;
