//! Result types of the authentication service

use chrono::{DateTime, Utc};

/// Outcome of a successful OTP request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOtpResult {
    /// When the issued code stops being accepted
    pub expires_at: DateTime<Utc>,
    /// OTP requests left in the current window (`None` when limiting is off)
    pub remaining_attempts: Option<u32>,
    /// Whether the delivery stub accepted the code
    pub delivered: bool,
}
