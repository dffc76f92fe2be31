//! Domain entities representing core business objects.

pub mod otp_challenge;
pub mod rate_limit_window;
pub mod token;
pub mod user;

// Re-export commonly used types
pub use otp_challenge::{OtpChallenge, OTP_KEY_PREFIX};
pub use rate_limit_window::{RateLimitPurpose, RateLimitWindow, WindowAttempt, RATE_LIMIT_KEY_PREFIX};
pub use token::{Claims, IdentityClaims, TokenKind, TokenPair};
pub use user::{User, ADMIN_ROLE, DEFAULT_ROLE};
