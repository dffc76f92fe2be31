//! Mapping of domain errors to HTTP responses
//!
//! OTP failures share one generic message so responses do not reveal whether
//! a challenge exists. Infrastructure failures are logged in full and
//! reported without detail.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::fmt;
use validator::ValidationErrors;

use otp_core::errors::{AuthError, DomainError, InfraError, TokenError, ValidationError};
use otp_shared::types::{ApiResponse, ResultCode};

pub type ApiResult<T> = Result<T, ApiError>;

/// Error returned by handlers
#[derive(Debug)]
pub enum ApiError {
    Domain(DomainError),
    /// Request body failed DTO validation
    InvalidRequest(String),
    /// Missing or malformed `Authorization` header
    Unauthorized,
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors.field_errors().keys().map(|k| k.to_string()).collect();
        fields.sort_unstable();
        ApiError::InvalidRequest(format!("Invalid request fields: {}", fields.join(", ")))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Domain(err) => write!(f, "{}", err),
            ApiError::InvalidRequest(message) => write!(f, "{}", message),
            ApiError::Unauthorized => write!(f, "Missing or invalid Authorization header"),
        }
    }
}

impl ApiError {
    /// HTTP status, result code and client-facing message
    fn parts(&self) -> (StatusCode, ResultCode, String) {
        match self {
            ApiError::InvalidRequest(message) => {
                (StatusCode::BAD_REQUEST, ResultCode::ValidationError, message.clone())
            }
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ResultCode::AuthError,
                "Authentication required".to_string(),
            ),
            ApiError::Domain(err) => domain_parts(err),
        }
    }
}

fn domain_parts(err: &DomainError) -> (StatusCode, ResultCode, String) {
    match err {
        DomainError::Auth(auth) => match auth {
            AuthError::RateLimited { reset_at } => (
                StatusCode::TOO_MANY_REQUESTS,
                ResultCode::LimiterError,
                format!("Too many requests, try again after {}", reset_at.to_rfc3339()),
            ),
            AuthError::OtpConflict => (
                StatusCode::CONFLICT,
                ResultCode::ConflictError,
                "An OTP was already sent and is still valid".to_string(),
            ),
            AuthError::OtpAlreadyUsed | AuthError::OtpNotFound | AuthError::OtpMismatch => (
                StatusCode::BAD_REQUEST,
                ResultCode::ValidationError,
                "Invalid or expired OTP".to_string(),
            ),
            AuthError::AccountDisabled => (
                StatusCode::FORBIDDEN,
                ResultCode::ForbiddenError,
                "Account disabled".to_string(),
            ),
            AuthError::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                ResultCode::ForbiddenError,
                "Insufficient permissions".to_string(),
            ),
            AuthError::UserNotFound => (
                StatusCode::NOT_FOUND,
                ResultCode::NotFoundError,
                "User not found".to_string(),
            ),
            AuthError::IdentityProvisioningFailure { .. } | AuthError::UserAlreadyExists => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ResultCode::InternalError,
                "Could not complete login".to_string(),
            ),
        },
        DomainError::Token(token) => match token {
            TokenError::Expired => (StatusCode::UNAUTHORIZED, ResultCode::AuthError, "Token expired".to_string()),
            TokenError::Invalid => (StatusCode::UNAUTHORIZED, ResultCode::AuthError, "Token invalid".to_string()),
            TokenError::GenerationFailed { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ResultCode::InternalError,
                "Could not issue tokens".to_string(),
            ),
        },
        DomainError::Validation(validation) => {
            let message = match validation {
                ValidationError::InvalidMobileNumber { .. } => "Invalid mobile number".to_string(),
                ValidationError::InvalidFormat { field } => format!("Invalid format: {}", field),
            };
            (StatusCode::BAD_REQUEST, ResultCode::ValidationError, message)
        }
        DomainError::Infrastructure(InfraError::Timeout { .. }) => (
            StatusCode::GATEWAY_TIMEOUT,
            ResultCode::InternalError,
            "The request timed out, please retry".to_string(),
        ),
        DomainError::Infrastructure(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            ResultCode::InternalError,
            "Service temporarily unavailable, please retry".to_string(),
        ),
        DomainError::Internal { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ResultCode::InternalError,
            "An internal error occurred".to_string(),
        ),
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.parts().0
    }

    fn error_response(&self) -> HttpResponse {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }
        HttpResponse::build(status).json(ApiResponse::<()>::error(code, message))
    }
}
