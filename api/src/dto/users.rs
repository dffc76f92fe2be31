//! DTOs of the `/api/v1/users` endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use otp_core::domain::entities::{TokenPair, User};
use otp_core::domain::value_objects::{RateLimitInfo, UserPage, UserQuery, DEFAULT_PAGE_SIZE};
use otp_core::services::auth::SendOtpResult;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpRequest {
    #[validate(length(min = 10, max = 16))]
    pub mobile_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginByMobileRequest {
    #[validate(length(min = 10, max = 16))]
    pub mobile_number: String,
    #[validate(length(min = 1, max = 18))]
    pub otp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpResponse {
    pub expire_time: DateTime<Utc>,
    /// Absent when rate limiting is disabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_attempts: Option<u32>,
}

impl From<SendOtpResult> for SendOtpResponse {
    fn from(result: SendOtpResult) -> Self {
        Self {
            expire_time: result.expires_at,
            remaining_attempts: result.remaining_attempts,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDetailResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_expire_time: DateTime<Utc>,
    pub refresh_token_expire_time: DateTime<Utc>,
}

impl From<TokenPair> for TokenDetailResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            access_token_expire_time: pair.access_expires_at,
            refresh_token_expire_time: pair.refresh_expires_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub mobile_number: String,
    pub enabled: bool,
    pub registered_at: DateTime<Utc>,
    pub roles: Vec<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            mobile_number: user.mobile_number,
            enabled: user.enabled,
            registered_at: user.registered_at,
            roles: user.roles,
        }
    }
}

/// Query string of the user listing; every parameter is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ListUsersQuery {
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[serde(alias = "pageSize")]
    #[validate(range(min = 1, max = 100))]
    pub page_size: Option<u32>,
    /// Prefix of the mobile numbers to list
    #[serde(alias = "mobileNumber")]
    #[validate(length(max = 11))]
    pub mobile_number: Option<String>,
}

impl From<ListUsersQuery> for UserQuery {
    fn from(query: ListUsersQuery) -> Self {
        UserQuery::new(
            query.page.unwrap_or(1),
            query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            query.mobile_number,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl From<UserPage> for UserListResponse {
    fn from(page: UserPage) -> Self {
        Self {
            users: page.users.into_iter().map(UserResponse::from).collect(),
            total: page.total,
            page: page.page,
            page_size: page.page_size,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitInfoResponse {
    pub mobile_number: String,
    pub max_attempts: u32,
    pub remaining_attempts: u32,
    pub window_seconds: u64,
    pub reset_time: DateTime<Utc>,
    pub is_limited: bool,
}

impl From<RateLimitInfo> for RateLimitInfoResponse {
    fn from(info: RateLimitInfo) -> Self {
        Self {
            mobile_number: info.mobile_number,
            max_attempts: info.max_attempts,
            remaining_attempts: info.remaining_attempts,
            window_seconds: info.window_seconds,
            reset_time: info.reset_time,
            is_limited: info.is_limited,
        }
    }
}
