use actix_web::{web, HttpResponse};
use validator::Validate;

use otp_core::domain::value_objects::UserQuery;
use otp_core::repositories::UserRepository;
use otp_core::services::otp::{OtpDelivery, OtpProvider};
use otp_core::services::rate_limit::RateLimiterTrait;
use otp_core::services::token::TokenProvider;
use otp_shared::types::ApiResponse;

use crate::app::AppState;
use crate::dto::{ListUsersQuery, UserListResponse};
use crate::handlers::ApiResult;
use crate::middleware::BearerToken;

/// Handler for GET /api/v1/users?page=1&page_size=10&mobile_number=0912
///
/// Admin only. Users come back ordered by id; `mobile_number` filters by
/// prefix and `total` counts every match.
pub async fn list_users<O, R, T, U, D>(
    state: web::Data<AppState<O, R, T, U, D>>,
    query: web::Query<ListUsersQuery>,
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
    query.validate()?;

    let page = state
        .auth_service
        .list_users(&UserQuery::from(query.into_inner()), &claims)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(UserListResponse::from(page))))
}
