//! Shared utilities and common types for the OTP auth server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types and loading
//! - Response envelope
//! - Utility functions (mobile number validation and masking)

pub mod config;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, ConfigError, DatabaseConfig, Environment, JwtAlgorithm, JwtConfig,
    LogFormat, LoggingConfig, OtpConfig, RateLimitConfig, ServerConfig,
};
pub use types::{ApiResponse, ResultCode};
pub use utils::phone;
