//! Rate limiting configuration module

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fixed-window rate limit applied per mobile number and purpose
/// (sending an OTP, verifying an OTP).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    pub enabled: bool,

    /// Attempts allowed inside one window
    pub max_attempts: u32,

    /// Window length in seconds
    pub window_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            window_seconds: 600, // 10 minutes
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }
}
