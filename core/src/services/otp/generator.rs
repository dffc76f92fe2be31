//! Numeric OTP code generation

use rand::{rngs::OsRng, Rng};

use crate::errors::{DomainResult, ValidationError};
use otp_shared::config::MAX_OTP_DIGITS;

/// Draws codes uniformly from `[10^(d-1), 10^d - 1]` using the OS CSPRNG
#[derive(Debug, Clone, Copy)]
pub struct OtpCodeGenerator {
    digits: u32,
}

impl OtpCodeGenerator {
    pub fn new(digits: u32) -> DomainResult<Self> {
        if digits == 0 || digits > MAX_OTP_DIGITS {
            return Err(ValidationError::InvalidFormat {
                field: format!("otp digits must be between 1 and {}", MAX_OTP_DIGITS),
            }
            .into());
        }
        Ok(Self { digits })
    }

    pub fn digits(&self) -> u32 {
        self.digits
    }

    pub fn generate(&self) -> String {
        let low = 10u64.pow(self.digits - 1);
        let high = 10u64.pow(self.digits) - 1;
        OsRng.gen_range(low..=high).to_string()
    }
}
