//! OTP challenge issuance and validation

pub mod config;
pub mod generator;
pub mod service;
pub mod traits;


pub use config::OtpServiceConfig;
pub use generator::OtpCodeGenerator;
pub use service::OtpManager;
pub use traits::{IssuedChallenge, OtpDelivery, OtpProvider};
