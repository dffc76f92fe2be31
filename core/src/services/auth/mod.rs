//! Authentication service module
//!
//! This module provides the mobile-number login flow:
//! - OTP requests with rate limiting
//! - OTP login with find-or-create user provisioning
//! - Token refresh
//! - Rate-limit and profile lookups

mod config;
mod service;
mod types;

#[cfg(test)]
mod tests;

pub use config::AuthServiceConfig;
pub use service::AuthService;
pub use types::SendOtpResult;
