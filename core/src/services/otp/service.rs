//! Cache-backed OTP manager

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::entities::OtpChallenge;
use crate::errors::{AuthError, DomainError, DomainResult, InfraError};
use crate::services::cache::{CacheStore, CasTtl, MAX_CAS_ATTEMPTS};
use crate::services::clock::Clock;
use otp_shared::phone::mask_mobile_number;

use super::config::OtpServiceConfig;
use super::traits::{IssuedChallenge, OtpProvider};

/// OTP manager storing one challenge per mobile number in a [`CacheStore`]
///
/// Both operations are a read followed by a compare-and-set against the value
/// that was read, so concurrent callers cannot overwrite or double-consume a
/// challenge.
pub struct OtpManager<C: CacheStore> {
    cache: Arc<C>,
    clock: Arc<dyn Clock>,
    config: OtpServiceConfig,
}

impl<C: CacheStore> OtpManager<C> {
    pub fn new(cache: Arc<C>, clock: Arc<dyn Clock>, config: OtpServiceConfig) -> Self {
        Self { cache, clock, config }
    }

    pub fn config(&self) -> &OtpServiceConfig {
        &self.config
    }

    fn decode(raw: &str) -> DomainResult<OtpChallenge> {
        Ok(serde_json::from_str(raw)?)
    }

    fn expires_at(&self) -> DomainResult<chrono::DateTime<chrono::Utc>> {
        let expiry = chrono::Duration::from_std(self.config.expiry).map_err(|e| DomainError::Internal {
            message: format!("otp expiry out of range: {}", e),
        })?;
        Ok(self.clock.now() + expiry)
    }
}

#[async_trait]
impl<C: CacheStore> OtpProvider for OtpManager<C> {
    async fn issue_challenge(&self, mobile_number: &str, code: &str) -> DomainResult<IssuedChallenge> {
        let key = OtpChallenge::cache_key(mobile_number);
        let payload = serde_json::to_string(&OtpChallenge::new(code))?;

        for _ in 0..MAX_CAS_ATTEMPTS {
            if let Some(raw) = self.cache.get(&key).await? {
                let existing = Self::decode(&raw)?;
                let error = if existing.used {
                    AuthError::OtpAlreadyUsed
                } else {
                    AuthError::OtpConflict
                };
                tracing::info!(
                    phone = %mask_mobile_number(mobile_number),
                    event = "otp_issue_rejected",
                    used = existing.used,
                    "Challenge already present for mobile number"
                );
                return Err(error.into());
            }

            let expires_at = self.expires_at()?;
            if self
                .cache
                .compare_and_set(&key, None, &payload, CasTtl::Reset(self.config.expiry))
                .await?
            {
                tracing::info!(
                    phone = %mask_mobile_number(mobile_number),
                    event = "otp_issued",
                    expires_at = %expires_at,
                    "Issued OTP challenge"
                );
                return Ok(IssuedChallenge { expires_at });
            }
            // Another request stored a challenge between our read and write; re-read it
        }

        Err(InfraError::Contention { key }.into())
    }

    async fn validate_challenge(&self, mobile_number: &str, candidate: &str) -> DomainResult<()> {
        let key = OtpChallenge::cache_key(mobile_number);

        for _ in 0..MAX_CAS_ATTEMPTS {
            let raw = match self.cache.get(&key).await? {
                Some(raw) => raw,
                None => return Err(AuthError::OtpNotFound.into()),
            };
            let challenge = Self::decode(&raw)?;

            if challenge.used {
                return Err(AuthError::OtpAlreadyUsed.into());
            }
            if !challenge.matches(candidate) {
                tracing::warn!(
                    phone = %mask_mobile_number(mobile_number),
                    event = "otp_mismatch",
                    "Submitted OTP does not match"
                );
                return Err(AuthError::OtpMismatch.into());
            }

            let consumed = serde_json::to_string(&challenge.into_used())?;
            let ttl = if self.config.reset_expiry_on_use {
                CasTtl::Reset(self.config.expiry)
            } else {
                CasTtl::Keep
            };
            if self.cache.compare_and_set(&key, Some(&raw), &consumed, ttl).await? {
                tracing::info!(
                    phone = %mask_mobile_number(mobile_number),
                    event = "otp_consumed",
                    "OTP validated and marked as used"
                );
                return Ok(());
            }
            // Lost the race: the challenge was consumed or expired meanwhile
        }

        Err(InfraError::Contention { key }.into())
    }
}
