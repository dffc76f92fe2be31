//! API response envelope

use serde::{Deserialize, Serialize};

/// Standard API response wrapper
///
/// Every endpoint answers with this envelope so clients can branch on
/// `success` and `resultCode` without inspecting the HTTP status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Response data (present on success)
    pub result: Option<T>,

    /// Whether the request was successful
    pub success: bool,

    /// Application-level result code
    pub result_code: ResultCode,

    /// Error message (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn success(result: T) -> Self {
        Self {
            result: Some(result),
            success: true,
            result_code: ResultCode::Success,
            error: None,
        }
    }

    /// Create an error response
    pub fn error(result_code: ResultCode, error: impl Into<String>) -> Self {
        Self {
            result: None,
            success: false,
            result_code,
            error: Some(error.into()),
        }
    }
}

/// Application result codes carried next to the HTTP status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum ResultCode {
    Success,
    ValidationError,
    AuthError,
    ForbiddenError,
    NotFoundError,
    ConflictError,
    LimiterError,
    InternalError,
}

impl From<ResultCode> for u16 {
    fn from(code: ResultCode) -> Self {
        match code {
            ResultCode::Success => 0,
            ResultCode::ValidationError => 40001,
            ResultCode::AuthError => 40101,
            ResultCode::ForbiddenError => 40301,
            ResultCode::NotFoundError => 40401,
            ResultCode::ConflictError => 40901,
            ResultCode::LimiterError => 42901,
            ResultCode::InternalError => 50001,
        }
    }
}

impl TryFrom<u16> for ResultCode {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ResultCode::Success),
            40001 => Ok(ResultCode::ValidationError),
            40101 => Ok(ResultCode::AuthError),
            40301 => Ok(ResultCode::ForbiddenError),
            40401 => Ok(ResultCode::NotFoundError),
            40901 => Ok(ResultCode::ConflictError),
            42901 => Ok(ResultCode::LimiterError),
            50001 => Ok(ResultCode::InternalError),
            other => Err(format!("unknown result code {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_shape() {
        let json = serde_json::to_value(ApiResponse::success("ok")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["resultCode"], 0);
        assert_eq!(json["result"], "ok");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_error_envelope_shape() {
        let response: ApiResponse<()> = ApiResponse::error(ResultCode::LimiterError, "slow down");
        let json = serde_json::to_value(response).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["resultCode"], 42901);
        assert_eq!(json["error"], "slow down");
        assert!(json["result"].is_null());
    }
}
