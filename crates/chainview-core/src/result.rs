//! Convenience result type alias for Chainview.

use crate::error::AppError;

/// A specialized `Result` type for Chainview operations.
pub type AppResult<T> = Result<T, AppError>;
