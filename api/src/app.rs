//! Application state and route configuration
//!
//! The auth service is generic over its collaborators, so the state and the
//! route table are too. The binary instantiates them once for the in-memory
//! stores and once for Redis plus MySQL.

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::{web, HttpRequest, HttpResponse};
use std::sync::Arc;

use otp_core::repositories::UserRepository;
use otp_core::services::auth::{AuthService, AuthServiceConfig};
use otp_core::services::cache::CacheStore;
use otp_core::services::clock::Clock;
use otp_core::services::otp::{OtpDelivery, OtpManager, OtpProvider, OtpServiceConfig};
use otp_core::services::rate_limit::{FixedWindowRateLimiter, RateLimiterTrait};
use otp_core::services::token::{JwtSigner, TokenProvider, TokenService, TokenServiceConfig};
use otp_core::errors::DomainResult;
use otp_shared::config::AppConfig;
use otp_shared::types::{ApiResponse, ResultCode};

use crate::handlers::ApiError;
use crate::routes::users;

/// Auth service assembled from the cache-backed OTP manager and rate limiter
pub type CacheBackedAuthService<C, U, D> =
    AuthService<OtpManager<C>, FixedWindowRateLimiter<C>, TokenService<JwtSigner>, U, D>;

/// Application state that holds shared services
pub struct AppState<O, R, T, U, D>
where
    O: OtpProvider,
    R: RateLimiterTrait,
    T: TokenProvider,
    U: UserRepository,
    D: OtpDelivery,
{
    pub auth_service: Arc<AuthService<O, R, T, U, D>>,
}

impl<O, R, T, U, D> AppState<O, R, T, U, D>
where
    O: OtpProvider,
    R: RateLimiterTrait,
    T: TokenProvider,
    U: UserRepository,
    D: OtpDelivery,
{
    pub fn new(auth_service: AuthService<O, R, T, U, D>) -> Self {
        Self {
            auth_service: Arc::new(auth_service),
        }
    }
}

/// Wire the OTP manager, rate limiter and token service over one cache
pub fn build_auth_service<C, U, D>(
    config: &AppConfig,
    cache: Arc<C>,
    users: Arc<U>,
    delivery: Arc<D>,
    clock: Arc<dyn Clock>,
) -> DomainResult<CacheBackedAuthService<C, U, D>>
where
    C: CacheStore,
    U: UserRepository,
    D: OtpDelivery,
{
    let otp = OtpManager::new(cache.clone(), clock.clone(), OtpServiceConfig::from(&config.otp));
    let limiter = FixedWindowRateLimiter::new(cache, clock.clone());
    let tokens = TokenService::new(
        JwtSigner::from_config(&config.jwt)?,
        clock.clone(),
        TokenServiceConfig::from(&config.jwt),
    );

    AuthService::new(
        Arc::new(otp),
        Arc::new(limiter),
        Arc::new(tokens),
        users,
        delivery,
        clock,
        AuthServiceConfig::from(config),
    )
}

/// Register every route and the JSON error handler
pub fn configure_app<O, R, T, U, D>(cfg: &mut web::ServiceConfig)
where
    O: OtpProvider + 'static,
    R: RateLimiterTrait + 'static,
    T: TokenProvider + 'static,
    U: UserRepository + 'static,
    D: OtpDelivery + 'static,
{
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/api/v1/users")
                .route("", web::get().to(users::list_users::<O, R, T, U, D>))
                .route("/", web::get().to(users::list_users::<O, R, T, U, D>))
                .route("/send-otp", web::post().to(users::send_otp::<O, R, T, U, D>))
                .route(
                    "/send-otp/{mobile_number}/rate-limit",
                    web::get().to(users::rate_limit_info::<O, R, T, U, D>),
                )
                .route("/login-by-mobile", web::post().to(users::login_by_mobile::<O, R, T, U, D>))
                .route("/refresh-token", web::post().to(users::refresh_token::<O, R, T, U, D>))
                .route("/{mobile_number}", web::get().to(users::get_user::<O, R, T, U, D>)),
        )
        .default_service(web::route().to(not_found));
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::InvalidRequest(format!("Malformed request body: {}", err)).into()
}

fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::InvalidRequest(format!("Malformed query string: {}", err)).into()
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "otp-auth",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::<()>::error(
        ResultCode::NotFoundError,
        "The requested resource was not found",
    ))
}
