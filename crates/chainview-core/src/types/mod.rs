//! Core type definitions used across the Chainview workspace.

pub mod id;
pub mod pagination;

pub use id::*;
pub use pagination::{PageInfo, PageRequest};
