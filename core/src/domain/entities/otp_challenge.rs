//! OTP challenge entity stored in the cache under `otp:{mobile_number}`.

use constant_time_eq::constant_time_eq;
use serde::{Deserialize, Serialize};

/// Cache key prefix for OTP challenges
pub const OTP_KEY_PREFIX: &str = "otp";

/// A one-time passcode issued to a mobile number
///
/// The expiry is not part of the value; it lives in the store TTL.
/// A challenge moves from unused to used exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpChallenge {
    /// The numeric code sent to the user
    #[serde(rename = "value")]
    pub code: String,

    /// Whether the code has already been consumed
    pub used: bool,
}

impl OtpChallenge {
    /// Creates a fresh, unused challenge
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            used: false,
        }
    }

    /// Cache key for the challenge of a mobile number
    pub fn cache_key(mobile_number: &str) -> String {
        format!("{}:{}", OTP_KEY_PREFIX, mobile_number)
    }

    /// Compares a candidate code in constant time
    pub fn matches(&self, candidate: &str) -> bool {
        constant_time_eq(self.code.as_bytes(), candidate.as_bytes())
    }

    /// Returns the consumed form of this challenge
    pub fn into_used(self) -> Self {
        Self { used: true, ..self }
    }
}
