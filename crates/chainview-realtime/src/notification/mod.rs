//! User-initiated notification work: optimistic mutations and paginated
//! fetches, both writing through the reconciliation store.

pub mod dispatcher;
pub mod fetcher;

pub use dispatcher::MutationDispatcher;
pub use fetcher::NotificationFetcher;
