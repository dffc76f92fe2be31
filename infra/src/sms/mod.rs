//! OTP delivery
//!
//! Only a logging stub is provided; a real SMS gateway would implement
//! `otp_core::services::otp::OtpDelivery` the same way.

pub mod mock_sms;

pub use mock_sms::LoggingOtpDelivery;
