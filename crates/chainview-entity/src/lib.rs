//! # chainview-entity
//!
//! Domain entity models for Chainview Notify. Every struct in this crate
//! is a value object exchanged with the backend or held by the
//! reconciliation store; all derive `Debug`, `Clone`, `Serialize`, and
//! `Deserialize`.

pub mod notification;
pub mod session;
