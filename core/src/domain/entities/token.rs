//! Token entities for JWT-based sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::User;

/// Which half of a token pair a token is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// The identity a token pair is issued for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaims {
    pub user_id: i64,
    pub mobile_number: String,
    pub roles: Vec<String>,
}

impl From<&User> for IdentityClaims {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            mobile_number: user.mobile_number.clone(),
            roles: user.roles.clone(),
        }
    }
}

/// Claims structure for JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Numeric user id
    pub user_id: i64,

    /// Mobile number the user logged in with
    pub mobile_number: String,

    /// Role names at issuance time
    pub roles: Vec<String>,

    /// Access or refresh
    pub token_type: TokenKind,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Issuer
    pub iss: String,

    /// JWT ID (unique identifier for the token)
    pub jti: String,
}

impl Claims {
    /// Builds claims for `identity` valid from `issued_at` until `expires_at`
    pub fn new(
        identity: &IdentityClaims,
        token_type: TokenKind,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        issuer: &str,
    ) -> Self {
        Self {
            sub: identity.user_id.to_string(),
            user_id: identity.user_id,
            mobile_number: identity.mobile_number.clone(),
            roles: identity.roles.clone(),
            token_type,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            iss: issuer.to_string(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Checks if the claims have expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// The identity carried by these claims
    pub fn identity(&self) -> IdentityClaims {
        IdentityClaims {
            user_id: self.user_id,
            mobile_number: self.mobile_number.clone(),
            roles: self.roles.clone(),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Token pair returned after successful authentication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access token (JWT)
    pub access_token: String,

    /// Refresh token (JWT)
    pub refresh_token: String,

    /// When the access token stops being accepted
    pub access_expires_at: DateTime<Utc>,

    /// When the refresh token stops being accepted
    pub refresh_expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_claims_carry_identity() {
        let identity = IdentityClaims {
            user_id: 42,
            mobile_number: "09111112222".to_string(),
            roles: vec!["default".to_string()],
        };
        let now = Utc::now();
        let claims = Claims::new(&identity, TokenKind::Access, now, now + Duration::minutes(15), "otp-auth");

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.identity(), identity);
        assert!(claims.has_role("default"));
        assert!(!claims.is_expired_at(now));
        assert!(claims.is_expired_at(now + Duration::minutes(15)));
    }

    #[test]
    fn test_each_claims_get_unique_id() {
        let identity = IdentityClaims {
            user_id: 1,
            mobile_number: "09111112222".to_string(),
            roles: vec![],
        };
        let now = Utc::now();
        let a = Claims::new(&identity, TokenKind::Refresh, now, now, "otp-auth");
        let b = Claims::new(&identity, TokenKind::Refresh, now, now, "otp-auth");
        assert_ne!(a.jti, b.jti);
    }
}
