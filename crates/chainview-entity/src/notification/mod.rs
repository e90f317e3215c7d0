//! Notification domain entities.

pub mod channel;
pub mod filter;
pub mod kind;
pub mod model;
pub mod priority;
pub mod status;
pub mod summary;

pub use channel::{DeliveryChannel, DeliveryState};
pub use filter::NotificationFilter;
pub use kind::NotificationKind;
pub use model::Notification;
pub use priority::NotificationPriority;
pub use status::NotificationStatus;
pub use summary::NotificationSummary;
