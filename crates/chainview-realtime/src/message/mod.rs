//! Push channel message types, decoding, and validation.

pub mod serializer;
pub mod types;
pub mod validator;

pub use types::PushEvent;
