//! # OTP Core
//!
//! Core business logic for mobile-number OTP login.
//! This crate contains domain entities, business services, repository interfaces,
//! and error types; storage backends live in the infrastructure crate.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
