//! Logging OTP delivery stub
//!
//! Stands in for an SMS gateway: every delivery is recorded as a structured
//! log event. The code itself is only logged when explicitly enabled, which
//! the server does in development.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{info, warn};

use otp_core::errors::{DomainResult, InfraError};
use otp_core::services::otp::OtpDelivery;
use otp_shared::phone::mask_mobile_number;

/// Delivery stub that logs instead of sending
#[derive(Default)]
pub struct LoggingOtpDelivery {
    /// Number of codes handed to the stub
    message_count: AtomicU64,
    /// Include the code in the log event
    log_codes: bool,
    /// Report every delivery as failed
    simulate_failure: AtomicBool,
}

impl LoggingOtpDelivery {
    pub fn new(log_codes: bool) -> Self {
        Self {
            log_codes,
            ..Self::default()
        }
    }

    pub fn get_message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    pub fn set_simulate_failure(&self, simulate: bool) {
        self.simulate_failure.store(simulate, Ordering::SeqCst);
    }
}

#[async_trait]
impl OtpDelivery for LoggingOtpDelivery {
    async fn deliver(&self, mobile_number: &str, code: &str) -> DomainResult<()> {
        let masked_phone = mask_mobile_number(mobile_number);

        if self.simulate_failure.load(Ordering::SeqCst) {
            warn!(target: "sms_service", phone = %masked_phone, "Simulated OTP delivery failure");
            return Err(InfraError::Timeout {
                operation: "sms delivery".to_string(),
            }
            .into());
        }

        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;
        if self.log_codes {
            info!(
                target: "sms_service",
                provider = "log",
                phone = %masked_phone,
                code = %code,
                message_number = count,
                "OTP delivered (stub)"
            );
        } else {
            info!(
                target: "sms_service",
                provider = "log",
                phone = %masked_phone,
                message_number = count,
                "OTP delivered (stub)"
            );
        }
        Ok(())
    }
}
