//! Configuration for the token service

use chrono::Duration;

use otp_shared::config::JwtConfig;

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Lifetime of access tokens
    pub access_token_ttl: Duration,
    /// Lifetime of refresh tokens
    pub refresh_token_ttl: Duration,
    /// `iss` claim written and required
    pub issuer: String,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            access_token_ttl: Duration::minutes(15),
            refresh_token_ttl: Duration::days(7),
            issuer: "otp-auth".to_string(),
        }
    }
}

impl From<&JwtConfig> for TokenServiceConfig {
    fn from(config: &JwtConfig) -> Self {
        Self {
            access_token_ttl: Duration::seconds(config.access_ttl_seconds),
            refresh_token_ttl: Duration::seconds(config.refresh_ttl_seconds),
            issuer: config.issuer.clone(),
        }
    }
}
