//! # chainview-realtime
//!
//! Client-side notification synchronization engine. Provides:
//!
//! - A reconciliation store merging fetches, push events, and optimistic writes
//! - A push connection manager with bounded exponential reconnect backoff
//! - An optimistic mutation dispatcher and a paginated list fetcher
//! - A session-scoped engine tying them together, driven by auth state

pub mod connection;
pub mod engine;
pub mod message;
pub mod metrics;
pub mod notification;
pub mod store;

pub use connection::manager::ConnectionManager;
pub use connection::state::{ConnectionState, ConnectionStatus};
pub use engine::NotificationEngine;
pub use message::types::PushEvent;
pub use notification::dispatcher::MutationDispatcher;
pub use notification::fetcher::NotificationFetcher;
pub use store::NotificationStore;
