//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - Token signing and lifetimes
//! - `cache` - Redis connection settings
//! - `database` - MySQL connection pool settings
//! - `environment` - Deployment environment detection
//! - `logging` - Log level and output format
//! - `otp` - Passcode length and lifetime
//! - `rate_limit` - Fixed-window limit for OTP send/verify
//! - `server` - HTTP server settings and request deadline
//!
//! Values are layered: built-in defaults for the detected environment,
//! then `config/default.toml`, then `config/{environment}.toml`, then
//! `APP__SECTION__KEY` environment variables. A `.env` file is read first.

pub mod auth;
pub mod cache;
pub mod database;
pub mod environment;
pub mod logging;
pub mod otp;
pub mod rate_limit;
pub mod server;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::{JwtAlgorithm, JwtConfig, DEFAULT_JWT_SECRET};
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use environment::Environment;
pub use logging::{LogFormat, LoggingConfig};
pub use otp::{OtpConfig, MAX_OTP_DIGITS};
pub use rate_limit::RateLimitConfig;
pub use server::ServerConfig;

/// Minimum HS256 secret length accepted in production
const MIN_PRODUCTION_SECRET_LEN: usize = 32;

/// Errors raised while assembling or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Complete application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub otp: OtpConfig,
    pub rate_limit: RateLimitConfig,
    pub jwt: JwtConfig,
    pub logging: LoggingConfig,

    /// Run on in-process stores instead of Redis and MySQL
    pub in_memory_stores: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl AppConfig {
    /// Built-in defaults for an environment
    pub fn for_environment(env: Environment) -> Self {
        Self {
            environment: env,
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            otp: OtpConfig::default(),
            rate_limit: RateLimitConfig::default(),
            jwt: JwtConfig::default(),
            logging: LoggingConfig::for_environment(env),
            in_memory_stores: false,
        }
    }

    /// Load and validate configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env is the normal case outside local development
        let _ = dotenvy::dotenv();

        let env = Environment::from_env();
        let defaults = config::Config::try_from(&Self::for_environment(env))?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&env.config_file()).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the services cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.otp.digits == 0 || self.otp.digits > MAX_OTP_DIGITS {
            return Err(ConfigError::Invalid {
                field: "otp.digits",
                reason: format!("must be between 1 and {}", MAX_OTP_DIGITS),
            });
        }
        if self.otp.expire_seconds == 0 {
            return Err(ConfigError::Invalid {
                field: "otp.expire_seconds",
                reason: String::from("must be greater than zero"),
            });
        }
        if self.rate_limit.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "rate_limit.max_attempts",
                reason: String::from("must be greater than zero"),
            });
        }
        if self.rate_limit.window_seconds == 0 {
            return Err(ConfigError::Invalid {
                field: "rate_limit.window_seconds",
                reason: String::from("must be greater than zero"),
            });
        }
        if self.jwt.access_ttl_seconds <= 0 || self.jwt.refresh_ttl_seconds <= self.jwt.access_ttl_seconds {
            return Err(ConfigError::Invalid {
                field: "jwt",
                reason: String::from("refresh expiry must exceed a positive access expiry"),
            });
        }
        if self.server.request_timeout_seconds == 0 {
            return Err(ConfigError::Invalid {
                field: "server.request_timeout_seconds",
                reason: String::from("must be greater than zero"),
            });
        }
        if self.environment.is_production()
            && self.jwt.algorithm == JwtAlgorithm::HS256
            && (self.jwt.uses_default_secret() || self.jwt.secret.len() < MIN_PRODUCTION_SECRET_LEN)
        {
            return Err(ConfigError::Invalid {
                field: "jwt.secret",
                reason: format!("production requires a secret of at least {} bytes", MIN_PRODUCTION_SECRET_LEN),
            });
        }
        Ok(())
    }
}
