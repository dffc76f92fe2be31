//! Bearer token extraction
//!
//! The token is only pulled out of the `Authorization` header here; handlers
//! verify it through the auth service so the signing setup lives in one place.

use actix_web::{dev::Payload, http::header::AUTHORIZATION, FromRequest, HttpRequest};
use std::future::{ready, Ready};

use crate::handlers::ApiError;

/// Raw token from an `Authorization: Bearer <token>` header
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl BearerToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromRequest for BearerToken {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_bearer_token(req).map(BearerToken).ok_or(ApiError::Unauthorized))
    }
}

fn extract_bearer_token(req: &HttpRequest) -> Option<String> {
    let token = req
        .headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?
        .trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_extracts_bearer_token() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer abc.def.ghi"))
            .to_http_request();
        assert_eq!(extract_bearer_token(&req).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_rejects_other_schemes() {
        let basic = TestRequest::default()
            .insert_header((AUTHORIZATION, "Basic dXNlcjpwYXNz"))
            .to_http_request();
        assert!(extract_bearer_token(&basic).is_none());

        let empty = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer "))
            .to_http_request();
        assert!(extract_bearer_token(&empty).is_none());

        assert!(extract_bearer_token(&TestRequest::default().to_http_request()).is_none());
    }
}
