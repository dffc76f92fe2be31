//! Domain-specific error types for the login flow
//!
//! This module provides error type definitions for OTP challenges, rate
//! limiting, user provisioning, token management, validation and the
//! infrastructure underneath them. User-facing wording is decided in the
//! presentation layer.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Authentication-related errors
///
/// Business-rule outcomes of the login flow. None of these are retriable
/// before the condition they describe has passed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Rate limit exceeded, try again after {reset_at}")]
    RateLimited { reset_at: DateTime<Utc> },

    #[error("An unused OTP already exists")]
    OtpConflict,

    #[error("OTP already used")]
    OtpAlreadyUsed,

    #[error("OTP not found or expired")]
    OtpNotFound,

    #[error("OTP does not match")]
    OtpMismatch,

    #[error("Identity provisioning failed: {reason}")]
    IdentityProvisioningFailure { reason: String },

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("User not found")]
    UserNotFound,

    #[error("Account disabled")]
    AccountDisabled,

    #[error("Insufficient permissions")]
    InsufficientPermissions,
}

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token invalid")]
    Invalid,

    #[error("Token expired")]
    Expired,

    #[error("Token generation failed: {reason}")]
    GenerationFailed { reason: String },
}

/// Validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid mobile number: {mobile_number}")]
    InvalidMobileNumber { mobile_number: String },

    #[error("Invalid format: {field}")]
    InvalidFormat { field: String },
}

/// Infrastructure errors
///
/// Failures of the cache, the database or the clock budget around them.
/// These are never translated into business outcomes; callers may retry
/// with backoff.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InfraError {
    #[error("Cache error: {message}")]
    Cache { message: String },

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Operation timed out: {operation}")]
    Timeout { operation: String },

    #[error("Stored value could not be decoded: {message}")]
    Serialization { message: String },

    #[error("Too much contention on key {key}")]
    Contention { key: String },
}
