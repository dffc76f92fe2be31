use actix_web::{web, HttpResponse};
use validator::Validate;

use otp_core::repositories::UserRepository;
use otp_core::services::otp::{OtpDelivery, OtpProvider};
use otp_core::services::rate_limit::RateLimiterTrait;
use otp_core::services::token::TokenProvider;
use otp_shared::types::ApiResponse;

use crate::app::AppState;
use crate::dto::{SendOtpRequest, SendOtpResponse};
use crate::handlers::ApiResult;

/// Handler for POST /api/v1/users/send-otp
///
/// # Request Body
///
/// ```json
/// { "mobileNumber": "09111112222" }
/// ```
///
/// Answers 201 with the code's expiry; the code itself only goes to the
/// delivery channel.
pub async fn send_otp<O, R, T, U, D>(
    state: web::Data<AppState<O, R, T, U, D>>,
    request: web::Json<SendOtpRequest>,
) -> ApiResult<HttpResponse>
where
    O: OtpProvider + 'static,
    R: RateLimiterTrait + 'static,
    T: TokenProvider + 'static,
    U: UserRepository + 'static,
    D: OtpDelivery + 'static,
{
    request.validate()?;

    let result = state.auth_service.send_otp(&request.mobile_number).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(SendOtpResponse::from(result))))
}
