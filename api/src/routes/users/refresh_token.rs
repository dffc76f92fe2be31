use actix_web::{web, HttpResponse};
use validator::Validate;

use otp_core::repositories::UserRepository;
use otp_core::services::otp::{OtpDelivery, OtpProvider};
use otp_core::services::rate_limit::RateLimiterTrait;
use otp_core::services::token::TokenProvider;
use otp_shared::types::ApiResponse;

use crate::app::AppState;
use crate::dto::{RefreshTokenRequest, TokenDetailResponse};
use crate::handlers::ApiResult;

/// Handler for POST /api/v1/users/refresh-token
pub async fn refresh_token<O, R, T, U, D>(
    state: web::Data<AppState<O, R, T, U, D>>,
    request: web::Json<RefreshTokenRequest>,
) -> ApiResult<HttpResponse>
where
    O: OtpProvider + 'static,
    R: RateLimiterTrait + 'static,
    T: TokenProvider + 'static,
    U: UserRepository + 'static,
    D: OtpDelivery + 'static,
{
    request.validate()?;

    let tokens = state.auth_service.refresh_token(&request.refresh_token).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(TokenDetailResponse::from(tokens))))
}
