//! Business services containing domain logic and use cases.

pub mod auth;
pub mod cache;
pub mod clock;
pub mod otp;
pub mod rate_limit;
pub mod token;

// Re-export commonly used types
pub use auth::{AuthService, AuthServiceConfig, SendOtpResult};
pub use cache::{CacheEntry, CacheStore, CasTtl, InMemoryCacheStore};
pub use clock::{Clock, ManualClock, SystemClock};
pub use otp::{IssuedChallenge, OtpCodeGenerator, OtpDelivery, OtpManager, OtpProvider, OtpServiceConfig};
pub use rate_limit::{FixedWindowRateLimiter, RateLimiterTrait};
pub use token::{ClaimsSigner, JwtSigner, TokenProvider, TokenService, TokenServiceConfig};
