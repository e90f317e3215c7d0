//! # chainview-client
//!
//! Request/response side of the notification backend:
//!
//! - [`NotificationApi`], the contract the sync engine fetches and mutates through
//! - [`HttpNotificationApi`], its reqwest implementation
//! - [`SessionProvider`], the host application's identity source

pub mod api;
pub mod dto;
pub mod http;
pub mod session;

pub use api::{BulkOperation, NotificationApi, NotificationPage};
pub use http::HttpNotificationApi;
pub use session::{SessionProvider, WatchSessionProvider};
