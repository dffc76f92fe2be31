//! HTTP-facing error handling

pub mod error;

pub use error::{ApiError, ApiResult};
