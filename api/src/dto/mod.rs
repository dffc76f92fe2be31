//! Request and response bodies

pub mod users;

pub use users::{
    ListUsersQuery, LoginByMobileRequest, RateLimitInfoResponse, RefreshTokenRequest, SendOtpRequest,
    SendOtpResponse, TokenDetailResponse, UserListResponse, UserResponse,
};
