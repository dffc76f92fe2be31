//! Configuration for the OTP manager

use std::time::Duration;

use otp_shared::config::OtpConfig;

/// OTP manager configuration
#[derive(Debug, Clone)]
pub struct OtpServiceConfig {
    /// Digits per generated code
    pub digits: u32,
    /// Lifetime of a challenge
    pub expiry: Duration,
    /// Give a consumed challenge a fresh full TTL instead of keeping its expiry
    pub reset_expiry_on_use: bool,
}

impl Default for OtpServiceConfig {
    fn default() -> Self {
        Self {
            digits: 6,
            expiry: Duration::from_secs(120),
            reset_expiry_on_use: false,
        }
    }
}

impl From<&OtpConfig> for OtpServiceConfig {
    fn from(config: &OtpConfig) -> Self {
        Self {
            digits: config.digits,
            expiry: config.expiry(),
            reset_expiry_on_use: config.reset_expiry_on_use,
        }
    }
}
