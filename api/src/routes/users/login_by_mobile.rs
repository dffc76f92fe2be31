use actix_web::{web, HttpResponse};
use validator::Validate;

use otp_core::repositories::UserRepository;
use otp_core::services::otp::{OtpDelivery, OtpProvider};
use otp_core::services::rate_limit::RateLimiterTrait;
use otp_core::services::token::TokenProvider;
use otp_shared::types::ApiResponse;

use crate::app::AppState;
use crate::dto::{LoginByMobileRequest, TokenDetailResponse};
use crate::handlers::ApiResult;

/// Handler for POST /api/v1/users/login-by-mobile
///
/// # Request Body
///
/// ```json
/// { "mobileNumber": "09111112222", "otp": "123456" }
/// ```
///
/// Creates the user on first login and answers 201 with a token pair.
pub async fn login_by_mobile<O, R, T, U, D>(
    state: web::Data<AppState<O, R, T, U, D>>,
    request: web::Json<LoginByMobileRequest>,
) -> ApiResult<HttpResponse>
where
    O: OtpProvider + 'static,
    R: RateLimiterTrait + 'static,
    T: TokenProvider + 'static,
    U: UserRepository + 'static,
    D: OtpDelivery + 'static,
{
    request.validate()?;

    let tokens = state
        .auth_service
        .login_by_mobile(&request.mobile_number, &request.otp)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(TokenDetailResponse::from(tokens))))
}
