//! HTTP API for mobile-number OTP login

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod telemetry;

pub use app::{build_auth_service, configure_app, AppState, CacheBackedAuthService};
