//! One-time passcode configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest digit count whose range still fits in a `u64`
pub const MAX_OTP_DIGITS: u32 = 18;

/// OTP generation and lifetime settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OtpConfig {
    /// Number of digits in a generated code
    pub digits: u32,

    /// Lifetime of an issued challenge in seconds
    pub expire_seconds: u64,

    /// Give a consumed challenge a fresh full TTL instead of keeping its
    /// original expiry
    pub reset_expiry_on_use: bool,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            digits: 6,
            expire_seconds: 120,
            reset_expiry_on_use: false,
        }
    }
}

impl OtpConfig {
    pub fn expiry(&self) -> Duration {
        Duration::from_secs(self.expire_seconds)
    }
}
