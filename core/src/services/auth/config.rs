//! Configuration for the authentication service

use std::time::Duration;

use otp_shared::config::AppConfig;

/// Configuration for the authentication service
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    /// Count OTP sends and logins against the rate limiter
    pub rate_limit_enabled: bool,
    /// Attempts per window, for each purpose
    pub max_attempts: u32,
    /// Rate-limit window length
    pub rate_limit_window: Duration,
    /// Digits of generated OTP codes
    pub otp_digits: u32,
    /// Deadline for each public operation
    pub request_timeout: Duration,
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self {
            rate_limit_enabled: true,
            max_attempts: 3,
            rate_limit_window: Duration::from_secs(600),
            otp_digits: 6,
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl From<&AppConfig> for AuthServiceConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            rate_limit_enabled: config.rate_limit.enabled,
            max_attempts: config.rate_limit.max_attempts,
            rate_limit_window: config.rate_limit.window(),
            otp_digits: config.otp.digits,
            request_timeout: config.server.request_timeout(),
        }
    }
}
