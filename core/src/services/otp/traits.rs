//! Traits for OTP storage and delivery

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::DomainResult;

/// A challenge accepted by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssuedChallenge {
    pub expires_at: DateTime<Utc>,
}

/// Stores and checks OTP challenges
#[async_trait]
pub trait OtpProvider: Send + Sync {
    /// Store `code` for `mobile_number` unless a challenge is already there.
    ///
    /// Fails with `OtpConflict` while an unused challenge is live and with
    /// `OtpAlreadyUsed` while a consumed one lingers.
    async fn issue_challenge(&self, mobile_number: &str, code: &str) -> DomainResult<IssuedChallenge>;

    /// Consume the challenge of `mobile_number` if `candidate` matches.
    ///
    /// Fails with `OtpNotFound`, `OtpAlreadyUsed` or `OtpMismatch`.
    async fn validate_challenge(&self, mobile_number: &str, candidate: &str) -> DomainResult<()>;
}

/// Gets a code to the user. Failures are reported but never undo the challenge.
#[async_trait]
pub trait OtpDelivery: Send + Sync {
    async fn deliver(&self, mobile_number: &str, code: &str) -> DomainResult<()>;
}
