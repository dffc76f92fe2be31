//! # Infrastructure Layer
//!
//! Concrete backends for the ports defined in `otp_core`:
//! - **Cache**: Redis-backed `CacheStore` with Lua scripts for the atomic primitives
//! - **Database**: MySQL `UserRepository` using SQLx, with embedded migrations
//! - **SMS**: a logging OTP delivery stub

use otp_core::errors::{DomainError, InfraError};

/// Cache module - Redis client and cache store
pub mod cache;

/// Database module - MySQL implementations using SQLx
pub mod database;

/// SMS module - OTP delivery
pub mod sms;

pub use cache::{RedisCacheStore, RedisClient};
pub use database::{DatabasePool, MySqlUserRepository};
pub use sms::LoggingOtpDelivery;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection or query error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failure at startup
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// A backend did not answer in time
    #[error("Timed out during {operation}")]
    Timeout { operation: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::Database(e) => InfraError::Database {
                message: e.to_string(),
            }
            .into(),
            InfrastructureError::Migration(e) => InfraError::Database {
                message: e.to_string(),
            }
            .into(),
            InfrastructureError::Cache(e) => InfraError::Cache {
                message: e.to_string(),
            }
            .into(),
            InfrastructureError::Timeout { operation } => InfraError::Timeout { operation }.into(),
            InfrastructureError::Config(message) => DomainError::Internal { message },
        }
    }
}
