use actix_web::{web, HttpResponse};

use otp_core::repositories::UserRepository;
use otp_core::services::otp::{OtpDelivery, OtpProvider};
use otp_core::services::rate_limit::RateLimiterTrait;
use otp_core::services::token::TokenProvider;
use otp_shared::types::ApiResponse;

use crate::app::AppState;
use crate::dto::UserResponse;
use crate::handlers::ApiResult;
use crate::middleware::BearerToken;

/// Handler for GET /api/v1/users/{mobile_number}
///
/// Requires an access token for the same mobile number or one carrying the
/// `admin` role.
pub async fn get_user<O, R, T, U, D>(
    state: web::Data<AppState<O, R, T, U, D>>,
    path: web::Path<String>,
    token: BearerToken,
) -> ApiResult<HttpResponse>
where
    O: OtpProvider + 'static,
    R: RateLimiterTrait + 'static,
    T: TokenProvider + 'static,
    U: UserRepository + 'static,
    D: OtpDelivery + 'static,
{
    let claims = state.auth_service.verify_access_token(token.as_str())?;
    let user = state.auth_service.get_user(&path, &claims).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(UserResponse::from(user))))
}
