//! Session token settings

use serde::{Deserialize, Serialize};

/// Placeholder secret; production configs must override it
pub const DEFAULT_JWT_SECRET: &str = "change-me-otp-auth-development-secret";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum JwtAlgorithm {
    /// Shared secret
    #[default]
    HS256,
    /// PEM key pair read from `private_key_path` / `public_key_path`
    RS256,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct JwtConfig {
    pub algorithm: JwtAlgorithm,
    pub secret: String,
    pub private_key_path: Option<String>,
    pub public_key_path: Option<String>,
    pub access_ttl_seconds: i64,
    pub refresh_ttl_seconds: i64,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            algorithm: JwtAlgorithm::HS256,
            secret: DEFAULT_JWT_SECRET.into(),
            private_key_path: None,
            public_key_path: None,
            access_ttl_seconds: 15 * 60,
            refresh_ttl_seconds: 7 * 24 * 60 * 60,
            issuer: "otp-auth".into(),
        }
    }
}

impl JwtConfig {
    /// HS256 with the given secret and default lifetimes
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Self::default()
        }
    }

    pub fn with_lifetimes(mut self, access_ttl_seconds: i64, refresh_ttl_seconds: i64) -> Self {
        self.access_ttl_seconds = access_ttl_seconds;
        self.refresh_ttl_seconds = refresh_ttl_seconds;
        self
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret == DEFAULT_JWT_SECRET
    }
}
