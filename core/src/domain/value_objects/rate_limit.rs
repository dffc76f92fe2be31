//! Rate-limit outcomes and status snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An attempt admitted by the rate limiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allowed {
    /// Attempts still available in the current window
    pub remaining: u32,
    /// When the current window ends
    pub reset_at: DateTime<Utc>,
}

/// Read-only view of a mobile number's send window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitInfo {
    pub mobile_number: String,
    pub max_attempts: u32,
    pub remaining_attempts: u32,
    pub window_seconds: u64,
    pub reset_time: DateTime<Utc>,
    pub is_limited: bool,
}
