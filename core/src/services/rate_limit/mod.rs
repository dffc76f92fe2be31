//! Fixed-window rate limiting

pub mod service;
pub mod traits;

#[cfg(test)]
mod tests;

pub use service::FixedWindowRateLimiter;
pub use traits::RateLimiterTrait;
