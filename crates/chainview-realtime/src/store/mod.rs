//! Reconciliation store: the single in-memory cache of notifications and
//! their summary for the current session.

pub mod reconcile;
pub mod snapshot;

pub use reconcile::{InboundOutcome, NotificationStore};
pub use snapshot::{SessionTicket, StoreSnapshot};
