//! Fixed-window counter stored in the cache.
//!
//! Start and count are kept in one value. Stores decide and write an
//! attempt in one atomic step through [`RateLimitWindow::consume`].

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Cache key prefix for rate-limit windows
pub const RATE_LIMIT_KEY_PREFIX: &str = "rate_limit";

/// What a rate-limited attempt is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitPurpose {
    /// Requesting a new OTP
    OtpSend,
    /// Submitting an OTP to log in
    OtpVerify,
}

impl RateLimitPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateLimitPurpose::OtpSend => "otp-send",
            RateLimitPurpose::OtpVerify => "otp-verify",
        }
    }

    /// Cache key of the window for a mobile number and this purpose
    pub fn key_for(&self, mobile_number: &str) -> String {
        format!("{}:{}:{}", RATE_LIMIT_KEY_PREFIX, self.as_str(), mobile_number)
    }
}

impl std::fmt::Display for RateLimitPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of counting one attempt against the stored window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowAttempt {
    /// The attempt was counted; holds the window after counting
    Counted(RateLimitWindow),
    /// The window is exhausted and was left as is
    Refused(RateLimitWindow),
}

impl WindowAttempt {
    pub fn window(&self) -> RateLimitWindow {
        match self {
            WindowAttempt::Counted(w) | WindowAttempt::Refused(w) => *w,
        }
    }
}

/// One window of attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitWindow {
    /// Window start as unix milliseconds
    pub window_start_ms: i64,

    /// Attempts consumed inside the window
    pub attempt_count: u32,
}

impl RateLimitWindow {
    /// Opens a window at `now` with its first attempt counted
    pub fn start(now: DateTime<Utc>) -> Self {
        Self {
            window_start_ms: now.timestamp_millis(),
            attempt_count: 1,
        }
    }

    pub fn window_start(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.window_start_ms)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// End of the window, when attempts become available again
    pub fn reset_at(&self, window: Duration) -> DateTime<Utc> {
        self.window_start() + window
    }

    /// A window has elapsed once `now - start >= window`
    pub fn is_elapsed(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now - self.window_start() >= window
    }

    pub fn is_exhausted(&self, max_attempts: u32) -> bool {
        self.attempt_count >= max_attempts
    }

    pub fn remaining(&self, max_attempts: u32) -> u32 {
        max_attempts.saturating_sub(self.attempt_count)
    }

    /// The same window with one more attempt counted
    pub fn incremented(&self) -> Self {
        Self {
            attempt_count: self.attempt_count.saturating_add(1),
            ..*self
        }
    }

    /// Decide one attempt against `current`. An absent or elapsed window is
    /// replaced by a new one opened at `now`.
    pub fn consume(current: Option<Self>, now: DateTime<Utc>, window: Duration, max_attempts: u32) -> WindowAttempt {
        match current {
            Some(w) if !w.is_elapsed(now, window) => {
                if w.is_exhausted(max_attempts) {
                    WindowAttempt::Refused(w)
                } else {
                    WindowAttempt::Counted(w.incremented())
                }
            }
            _ => WindowAttempt::Counted(Self::start(now)),
        }
    }

    /// Whether `next` continues this window rather than opening a new one
    pub fn same_window(&self, next: &Self) -> bool {
        self.window_start_ms == next.window_start_ms
    }
}
