use actix_web::{web, HttpResponse};

use otp_core::repositories::UserRepository;
use otp_core::services::otp::{OtpDelivery, OtpProvider};
use otp_core::services::rate_limit::RateLimiterTrait;
use otp_core::services::token::TokenProvider;
use otp_shared::types::ApiResponse;

use crate::app::AppState;
use crate::dto::RateLimitInfoResponse;
use crate::handlers::ApiResult;

/// Handler for GET /api/v1/users/send-otp/{mobile_number}/rate-limit
///
/// Read-only: does not count as an attempt.
pub async fn rate_limit_info<O, R, T, U, D>(
    state: web::Data<AppState<O, R, T, U, D>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse>
where
    O: OtpProvider + 'static,
    R: RateLimiterTrait + 'static,
    T: TokenProvider + 'static,
    U: UserRepository + 'static,
    D: OtpDelivery + 'static,
{
    let info = state.auth_service.otp_rate_limit_info(&path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(RateLimitInfoResponse::from(info))))
}
