//! `/api/v1/users` handlers
//!
//! - OTP requests and rate-limit status
//! - Login by mobile number and OTP
//! - Token refresh
//! - Profile lookup and the admin user listing

pub mod get_user;
pub mod list_users;
pub mod login_by_mobile;
pub mod rate_limit;
pub mod refresh_token;
pub mod send_otp;

pub use get_user::get_user;
pub use list_users::list_users;
pub use login_by_mobile::login_by_mobile;
pub use rate_limit::rate_limit_info;
pub use refresh_token::refresh_token;
pub use send_otp::send_otp;
