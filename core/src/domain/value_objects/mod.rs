//! Value objects representing immutable domain concepts.

pub mod rate_limit;
pub mod user_page;

// Re-export commonly used types
pub use rate_limit::{Allowed, RateLimitInfo};
pub use user_page::{UserPage, UserQuery, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
