//! Main authentication service implementation

use std::future::Future;
use std::sync::Arc;

use crate::domain::entities::{Claims, IdentityClaims, RateLimitPurpose, TokenPair, User, ADMIN_ROLE};
use crate::domain::value_objects::{Allowed, RateLimitInfo, UserPage, UserQuery};
use crate::errors::{AuthError, DomainError, DomainResult, InfraError, ValidationError};
use crate::repositories::UserRepository;
use crate::services::clock::Clock;
use crate::services::otp::{OtpCodeGenerator, OtpDelivery, OtpProvider};
use crate::services::rate_limit::RateLimiterTrait;
use crate::services::token::TokenProvider;
use otp_shared::phone::{is_valid_mobile_number, mask_mobile_number, normalize_mobile_number};

use super::config::AuthServiceConfig;
use super::types::SendOtpResult;

/// Authentication service sequencing rate limiting, OTP challenges, user
/// provisioning and token issuance for mobile-number login
pub struct AuthService<O, R, T, U, D>
where
    O: OtpProvider,
    R: RateLimiterTrait,
    T: TokenProvider,
    U: UserRepository,
    D: OtpDelivery,
{
    /// OTP challenge store
    otp_provider: Arc<O>,
    /// Rate limiter for preventing abuse
    rate_limiter: Arc<R>,
    /// Token issuer
    token_provider: Arc<T>,
    /// User repository for database operations
    user_repository: Arc<U>,
    /// Delivery stub for generated codes
    delivery: Arc<D>,
    code_generator: OtpCodeGenerator,
    clock: Arc<dyn Clock>,
    /// Service configuration
    config: AuthServiceConfig,
}

impl<O, R, T, U, D> AuthService<O, R, T, U, D>
where
    O: OtpProvider,
    R: RateLimiterTrait,
    T: TokenProvider,
    U: UserRepository,
    D: OtpDelivery,
{
    /// Create a new authentication service
    ///
    /// Fails if the configured OTP digit count cannot be generated.
    pub fn new(
        otp_provider: Arc<O>,
        rate_limiter: Arc<R>,
        token_provider: Arc<T>,
        user_repository: Arc<U>,
        delivery: Arc<D>,
        clock: Arc<dyn Clock>,
        config: AuthServiceConfig,
    ) -> DomainResult<Self> {
        Ok(Self {
            otp_provider,
            rate_limiter,
            token_provider,
            user_repository,
            delivery,
            code_generator: OtpCodeGenerator::new(config.otp_digits)?,
            clock,
            config,
        })
    }

    pub fn config(&self) -> &AuthServiceConfig {
        &self.config
    }

    /// Generate an OTP for a mobile number and hand it to the delivery stub
    ///
    /// This method:
    /// 1. Validates the mobile number format
    /// 2. Counts the request against the "otp-send" rate limit
    /// 3. Generates a code and stores it as the number's only challenge
    /// 4. Delivers the code; a delivery failure is logged and the challenge kept
    ///
    /// # Returns
    ///
    /// * `Ok(SendOtpResult)` - Challenge expiry and remaining send attempts
    /// * `Err(DomainError)` - Validation, rate limit, OTP conflict or infrastructure failure
    pub async fn send_otp(&self, mobile_number: &str) -> DomainResult<SendOtpResult> {
        let mobile = self.validated_mobile(mobile_number)?;

        self.with_deadline("send_otp", async {
            let allowed = self.consume_attempt(RateLimitPurpose::OtpSend, &mobile).await?;

            let code = self.code_generator.generate();
            let issued = self.otp_provider.issue_challenge(&mobile, &code).await?;

            let delivered = match self.delivery.deliver(&mobile, &code).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(
                        phone = %mask_mobile_number(&mobile),
                        error = %e,
                        event = "otp_delivery_failed",
                        "OTP delivery failed; challenge kept until it expires"
                    );
                    false
                }
            };

            Ok(SendOtpResult {
                expires_at: issued.expires_at,
                remaining_attempts: allowed.map(|a| a.remaining),
                delivered,
            })
        })
        .await
    }

    /// Log in with a mobile number and OTP, provisioning the user on first login
    ///
    /// This method:
    /// 1. Validates the mobile number format
    /// 2. Counts the attempt against the "otp-verify" rate limit
    /// 3. Validates and consumes the OTP challenge
    /// 4. Finds the user or creates it with the default role
    /// 5. Issues an access/refresh token pair
    pub async fn login_by_mobile(&self, mobile_number: &str, otp: &str) -> DomainResult<TokenPair> {
        let mobile = self.validated_mobile(mobile_number)?;

        self.with_deadline("login_by_mobile", async {
            self.consume_attempt(RateLimitPurpose::OtpVerify, &mobile).await?;
            self.otp_provider.validate_challenge(&mobile, otp).await?;

            let user = self.resolve_identity(&mobile).await?;
            if !user.enabled {
                tracing::warn!(
                    phone = %mask_mobile_number(&mobile),
                    user_id = user.id,
                    event = "login_disabled_account",
                    "Login rejected for disabled account"
                );
                return Err(AuthError::AccountDisabled.into());
            }

            let tokens = self.token_provider.generate_token_pair(&IdentityClaims::from(&user))?;
            tracing::info!(
                phone = %mask_mobile_number(&mobile),
                user_id = user.id,
                event = "login_succeeded",
                "User logged in by mobile"
            );
            Ok(tokens)
        })
        .await
    }

    /// Find the user of a mobile number or provision it
    ///
    /// Creation relies on the repository's unique constraint: a request that
    /// loses the race to create gets `UserAlreadyExists` and reads the
    /// winner's row instead.
    pub async fn resolve_identity(&self, mobile_number: &str) -> DomainResult<User> {
        if self.user_repository.exists_by_mobile(mobile_number).await? {
            if let Some(user) = self.user_repository.find_by_mobile(mobile_number).await? {
                return Ok(user);
            }
        }

        match self
            .user_repository
            .create_with_default_role(mobile_number, self.clock.now())
            .await
        {
            Ok(created) => {
                tracing::info!(
                    phone = %mask_mobile_number(mobile_number),
                    user_id = created.id,
                    event = "user_provisioned",
                    "Provisioned new user with default role"
                );
            }
            Err(DomainError::Auth(AuthError::UserAlreadyExists)) => {
                tracing::debug!(
                    phone = %mask_mobile_number(mobile_number),
                    "User created concurrently; using existing record"
                );
            }
            Err(e) => {
                tracing::error!(
                    phone = %mask_mobile_number(mobile_number),
                    error = %e,
                    event = "user_provisioning_failed",
                    "Failed to provision user"
                );
                return Err(e);
            }
        }

        // Re-read for one consistent view of id and roles
        self.user_repository
            .find_by_mobile(mobile_number)
            .await?
            .ok_or_else(|| {
                AuthError::IdentityProvisioningFailure {
                    reason: "user missing after creation".to_string(),
                }
                .into()
            })
    }

    /// Exchange a refresh token for a new token pair
    pub async fn refresh_token(&self, refresh_token: &str) -> DomainResult<TokenPair> {
        self.token_provider.refresh(refresh_token).map_err(|e| {
            tracing::warn!(error = %e, event = "refresh_rejected", "Refresh token rejected");
            e
        })
    }

    /// Claims of a valid access token
    pub fn verify_access_token(&self, access_token: &str) -> DomainResult<Claims> {
        self.token_provider.verify_access_token(access_token)
    }

    /// Current OTP send window of a mobile number
    pub async fn otp_rate_limit_info(&self, mobile_number: &str) -> DomainResult<RateLimitInfo> {
        let mobile = self.validated_mobile(mobile_number)?;

        self.with_deadline("otp_rate_limit_info", async {
            let key = RateLimitPurpose::OtpSend.key_for(&mobile);
            let max_attempts = self.config.max_attempts;
            let window = self.config.rate_limit_window;

            let remaining_attempts = self.rate_limiter.remaining_attempts(&key, max_attempts, window).await?;
            let reset_time = self.rate_limiter.reset_time(&key, window).await?;

            Ok(RateLimitInfo {
                mobile_number: mobile.clone(),
                max_attempts,
                remaining_attempts,
                window_seconds: window.as_secs(),
                reset_time,
                is_limited: self.config.rate_limit_enabled && remaining_attempts == 0,
            })
        })
        .await
    }

    /// Fetch a user profile; callers may read their own or, as admin, anyone's
    pub async fn get_user(&self, mobile_number: &str, requester: &Claims) -> DomainResult<User> {
        let mobile = self.validated_mobile(mobile_number)?;
        if requester.mobile_number != mobile && !requester.has_role(ADMIN_ROLE) {
            return Err(AuthError::InsufficientPermissions.into());
        }

        self.with_deadline("get_user", async {
            self.user_repository
                .find_by_mobile(&mobile)
                .await?
                .ok_or_else(|| AuthError::UserNotFound.into())
        })
        .await
    }

    /// List registered users page by page; admin only
    pub async fn list_users(&self, query: &UserQuery, requester: &Claims) -> DomainResult<UserPage> {
        if !requester.has_role(ADMIN_ROLE) {
            return Err(AuthError::InsufficientPermissions.into());
        }
        if let Some(prefix) = &query.mobile_prefix {
            if prefix.len() > 11 || !prefix.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ValidationError::InvalidFormat {
                    field: "mobile_number".to_string(),
                }
                .into());
            }
        }

        let page = self
            .with_deadline("list_users", self.user_repository.list_users(query))
            .await?;
        tracing::debug!(
            requester = requester.user_id,
            page = page.page,
            returned = page.users.len(),
            total = page.total,
            "Listed users"
        );
        Ok(page)
    }

    fn validated_mobile(&self, mobile_number: &str) -> DomainResult<String> {
        let normalized = normalize_mobile_number(mobile_number);
        if !is_valid_mobile_number(&normalized) {
            return Err(ValidationError::InvalidMobileNumber {
                mobile_number: mask_mobile_number(mobile_number),
            }
            .into());
        }
        Ok(normalized)
    }

    async fn consume_attempt(&self, purpose: RateLimitPurpose, mobile: &str) -> DomainResult<Option<Allowed>> {
        if !self.config.rate_limit_enabled {
            return Ok(None);
        }

        let key = purpose.key_for(mobile);
        match self
            .rate_limiter
            .check_and_consume(&key, self.config.max_attempts, self.config.rate_limit_window)
            .await
        {
            Ok(allowed) => Ok(Some(allowed)),
            Err(e) => {
                if let DomainError::Auth(AuthError::RateLimited { reset_at }) = &e {
                    tracing::warn!(
                        phone = %mask_mobile_number(mobile),
                        purpose = %purpose,
                        reset_at = %reset_at,
                        event = "rate_limit_exceeded",
                        "Request rejected by rate limiter"
                    );
                }
                Err(e)
            }
        }
    }

    /// Run `operation` under the configured deadline; on expiry the future is
    /// dropped, which rolls back any uncommitted transaction it holds
    async fn with_deadline<F, V>(&self, operation: &'static str, fut: F) -> DomainResult<V>
    where
        F: Future<Output = DomainResult<V>>,
    {
        match tokio::time::timeout(self.config.request_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(
                    operation = operation,
                    timeout_ms = self.config.request_timeout.as_millis() as u64,
                    event = "operation_timeout",
                    "Operation exceeded its deadline"
                );
                Err(InfraError::Timeout {
                    operation: operation.to_string(),
                }
                .into())
            }
        }
    }
}
